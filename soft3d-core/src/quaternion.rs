//! Orientation quaternions.

use crate::matrix::Mat4;
use crate::vector::Vec3;

/// An orientation in 3D space, stored as a real part `w` plus an imaginary
/// 3-vector `v`.
///
/// Rotation use assumes unit magnitude; this is not enforced automatically,
/// [`Quaternion::normalize`] is explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub v: Vec3,
}

impl Quaternion {
    /// The identity quaternion (no rotation).
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        v: Vec3::ZERO,
    };

    pub const fn new(w: f64, v: Vec3) -> Self {
        Self { w, v }
    }

    /// Creates a quaternion rotating by `angle` radians around `axis`.
    ///
    /// `axis` must be a unit vector.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let half = angle / 2.0;
        Self {
            w: half.cos(),
            v: axis * half.sin(),
        }
    }

    /// Creates a quaternion from Euler angles around the coordinate axes
    /// (zyx rotation order, in radians).
    pub fn from_euler(angles: Vec3) -> Self {
        let (cx, sx) = ((angles.x / 2.0).cos(), (angles.x / 2.0).sin());
        let (cy, sy) = ((angles.y / 2.0).cos(), (angles.y / 2.0).sin());
        let (cz, sz) = ((angles.z / 2.0).cos(), (angles.z / 2.0).sin());

        Self {
            w: cx * cy * cz + sx * sy * sz,
            v: Vec3::new(
                sx * cy * cz - cx * sy * sz,
                cx * sy * cz + sx * cy * sz,
                cx * cy * sz - sx * sy * cz,
            ),
        }
    }

    /// Hamilton product of two quaternions.
    ///
    /// Composition order matters: applying rotation `b` then `a` is
    /// `a.multiply(b)`.
    pub fn multiply(self, other: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * other.w - self.v.dot(other.v),
            other.v * self.w + self.v * other.w + self.v.cross(other.v),
        )
    }

    /// The conjugate quaternion.
    ///
    /// For unit quaternions this equals the inverse.
    pub fn conjugate(self) -> Quaternion {
        Quaternion::new(self.w, -self.v)
    }

    /// The inverse quaternion. For unit quaternions prefer
    /// [`Quaternion::conjugate`].
    pub fn inverse(self) -> Quaternion {
        let conjugate = self.conjugate();
        let mag_squared = self.magnitude() * self.magnitude();
        Quaternion::new(conjugate.w / mag_squared, conjugate.v * (1.0 / mag_squared))
    }

    pub fn dot(self, other: Quaternion) -> f64 {
        self.w * other.w + self.v.dot(other.v)
    }

    pub fn magnitude(self) -> f64 {
        (self.w * self.w + self.v.dot(self.v)).sqrt()
    }

    /// Scales the quaternion so that its magnitude is 1.
    pub fn normalize(self) -> Quaternion {
        let magnitude = self.magnitude();
        Quaternion::new(self.w / magnitude, self.v * (1.0 / magnitude))
    }

    /// The axis of rotation.
    ///
    /// Returns a zero vector for the exact identity, where the axis is
    /// undefined.
    pub fn axis(self) -> Vec3 {
        if self.w != 1.0 {
            let half_sin = (self.angle() / 2.0).sin();
            self.v * (1.0 / half_sin)
        } else {
            Vec3::ZERO
        }
    }

    /// The angle around the axis of rotation, in radians.
    pub fn angle(self) -> f64 {
        2.0 * self.w.acos()
    }

    /// The orientation as Euler angles `(roll, pitch, yaw)` in radians
    /// (zyx rotation order).
    pub fn euler_angles(self) -> Vec3 {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);
        let pitch = (2.0 * (w * y - x * z)).asin();

        // Roll and yaw collapse onto one axis when pitch hits +-90 degrees
        // (gimbal lock); the split below is then arbitrary, pick roll = 0.
        if pitch.abs() == std::f64::consts::FRAC_PI_2 {
            let yaw = pitch.signum() * -2.0 * x.atan2(w);
            Vec3::new(0.0, pitch, yaw)
        } else {
            let roll = (2.0 * (w * x + y * z)).atan2(w * w - x * x - y * y + z * z);
            let yaw = (2.0 * (w * z + x * y)).atan2(w * w + x * x - y * y - z * z);
            Vec3::new(roll, pitch, yaw)
        }
    }

    /// Whether two quaternions describe the same orientation, within
    /// floating-point tolerance.
    ///
    /// `q` and `-q` rotate identically, so this compares via the dot
    /// product rather than component equality.
    pub fn same_orientation(self, other: Quaternion) -> bool {
        self.dot(other).abs() > 1.0 - 1e-6
    }

    /// The orientation as a 4x4 rotation matrix.
    pub fn rotation_matrix(self) -> Mat4 {
        let (w, x, y, z) = (self.w, self.v.x, self.v.y, self.v.z);
        Mat4::new([
            [
                1.0 - 2.0 * y * y - 2.0 * z * z,
                2.0 * x * y - 2.0 * w * z,
                2.0 * x * z + 2.0 * w * y,
                0.0,
            ],
            [
                2.0 * x * y + 2.0 * w * z,
                1.0 - 2.0 * x * x - 2.0 * z * z,
                2.0 * y * z - 2.0 * w * x,
                0.0,
            ],
            [
                2.0 * x * z - 2.0 * w * y,
                2.0 * y * z + 2.0 * w * x,
                1.0 - 2.0 * x * x - 2.0 * y * y,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
    }

    #[test]
    fn conjugate_product_is_identity() {
        let q = Quaternion::from_euler(Vec3::new(0.3, -1.2, 0.7));
        let p = q.multiply(q.conjugate());
        assert_relative_eq!(p.w, 1.0, epsilon = 1e-9);
        assert_vec_eq(p.v, Vec3::ZERO);
    }

    #[test]
    fn rotate_then_unrotate_round_trips() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 1.1);
        let v = Vec3::new(0.5, -2.0, 3.0);
        assert_vec_eq(v.rotate(q).rotate(q.conjugate()), v);
    }

    #[test]
    fn quarter_turn_about_z_maps_x_to_y() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        assert_vec_eq(
            Vec3::new(1.0, 0.0, 0.0).rotate(q),
            Vec3::new(0.0, 1.0, 0.0),
        );
    }

    #[test]
    fn composition_applies_right_operand_first() {
        let yaw = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        let pitch = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2);
        // pitch after yaw: x -> y (yaw), y unaffected by pitch about y.
        let composed = pitch.multiply(yaw);
        assert_vec_eq(
            Vec3::new(1.0, 0.0, 0.0).rotate(composed),
            Vec3::new(0.0, 1.0, 0.0),
        );
    }

    #[test]
    fn inverse_matches_conjugate_for_unit_quaternions() {
        let q = Quaternion::from_euler(Vec3::new(0.4, 0.1, -0.9));
        let inverse = q.inverse();
        let conjugate = q.conjugate();
        assert_relative_eq!(inverse.w, conjugate.w, epsilon = 1e-9);
        assert_vec_eq(inverse.v, conjugate.v);

        // A scaled quaternion still inverts to the identity.
        let scaled = Quaternion::new(q.w * 3.0, q.v * 3.0);
        let product = scaled.multiply(scaled.inverse());
        assert_relative_eq!(product.w, 1.0, epsilon = 1e-9);
        assert_vec_eq(product.v, Vec3::ZERO);
    }

    #[test]
    fn normalize_restores_unit_magnitude() {
        let q = Quaternion::new(2.0, Vec3::new(1.0, -2.0, 0.5));
        assert_relative_eq!(q.normalize().magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn axis_of_identity_is_zero() {
        assert_eq!(Quaternion::IDENTITY.axis(), Vec3::ZERO);
    }

    #[test]
    fn axis_angle_round_trip() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        let q = Quaternion::from_axis_angle(axis, 0.8);
        assert_relative_eq!(q.angle(), 0.8, epsilon = 1e-9);
        assert_vec_eq(q.axis(), axis);
    }

    #[test]
    fn euler_round_trip() {
        let angles = Vec3::new(0.2, 0.4, -0.6);
        let q = Quaternion::from_euler(angles);
        assert_vec_eq(q.euler_angles(), angles);
    }

    #[test]
    fn rotation_matrix_matches_conjugation() {
        let q = Quaternion::from_euler(Vec3::new(0.5, -0.3, 1.2));
        let v = Vec3::new(1.0, 2.0, 3.0);
        let by_matrix = q.rotation_matrix().transform(v, 1.0).truncate();
        assert_vec_eq(by_matrix, v.rotate(q));
    }

    #[test]
    fn negated_quaternion_has_same_orientation() {
        let q = Quaternion::from_euler(Vec3::new(0.1, 0.2, 0.3));
        let negated = Quaternion::new(-q.w, -q.v);
        assert!(q.same_orientation(negated));
        assert!(!q.same_orientation(Quaternion::from_euler(Vec3::new(1.0, 0.0, 0.0))));
    }

    #[test]
    fn half_turn_composition_matches_full_rotation() {
        let axis = Vec3::new(0.0, 1.0, 0.0);
        let half = Quaternion::from_axis_angle(axis, PI / 4.0);
        let full = Quaternion::from_axis_angle(axis, PI / 2.0);
        assert!(half.multiply(half).same_orientation(full));
    }
}
