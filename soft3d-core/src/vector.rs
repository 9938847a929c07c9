//! Fixed-size vector value types.

use std::ops::{Add, Mul, Neg, Sub};

use crate::quaternion::Quaternion;

/// A point or direction in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Dot product with another vector.
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product, with `self` first in the product.
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Component-wise scale by another vector.
    pub fn scale_by(self, scalars: Vec3) -> Vec3 {
        Vec3::new(self.x * scalars.x, self.y * scalars.y, self.z * scalars.z)
    }

    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Scales the vector so that its magnitude is 1.
    ///
    /// A zero vector produces NaN components; callers are responsible for
    /// avoiding the zero-magnitude case.
    pub fn normalize(self) -> Vec3 {
        let magnitude = self.magnitude();
        Vec3::new(self.x / magnitude, self.y / magnitude, self.z / magnitude)
    }

    /// Rotates the point around the origin by a rotation quaternion,
    /// via the conjugation `q * (0, p) * q⁻¹`.
    pub fn rotate(self, rotation: Quaternion) -> Vec3 {
        rotation
            .multiply(Quaternion::new(0.0, self))
            .multiply(rotation.conjugate())
            .v
    }

    /// Lifts the point into homogeneous coordinates with `w = 1`.
    pub fn to_homogeneous(self) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, 1.0)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, scalar: f64) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// A point in homogeneous clip space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Drops the fourth coordinate.
    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn dot(self, other: Vec4) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scales the vector so that its magnitude is 1.
    ///
    /// A zero vector produces NaN components, as with [`Vec3::normalize`].
    pub fn normalize(self) -> Vec4 {
        let magnitude = self.magnitude();
        Vec4::new(
            self.x / magnitude,
            self.y / magnitude,
            self.z / magnitude,
            self.w / magnitude,
        )
    }
}

impl Add for Vec4 {
    type Output = Vec4;

    fn add(self, other: Vec4) -> Vec4 {
        Vec4::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Vec4 {
    type Output = Vec4;

    fn sub(self, other: Vec4) -> Vec4 {
        Vec4::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Mul<f64> for Vec4 {
    type Output = Vec4;

    fn mul(self, scalar: f64) -> Vec4 {
        Vec4::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
            self.w * scalar,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_product_follows_right_hand_rule() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(x), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn cross_product_is_orthogonal_to_operands() {
        let a = Vec3::new(1.5, -2.0, 0.25);
        let b = Vec3::new(0.5, 4.0, -1.0);
        let c = a.cross(b);
        assert_relative_eq!(c.dot(a), 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.dot(b), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_yields_unit_magnitude() {
        let v = Vec3::new(3.0, -4.0, 12.0).normalize();
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn component_scale() {
        let v = Vec3::new(1.0, 2.0, 3.0).scale_by(Vec3::new(2.0, 0.5, -1.0));
        assert_eq!(v, Vec3::new(2.0, 1.0, -3.0));
    }

    #[test]
    fn homogeneous_round_trip() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let h = v.to_homogeneous();
        assert_eq!(h.w, 1.0);
        assert_eq!(h.truncate(), v);
    }

    #[test]
    fn vec4_arithmetic() {
        let a = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vec4::new(0.5, -1.0, 2.0, 0.0);
        assert_eq!(a + b, Vec4::new(1.5, 1.0, 5.0, 4.0));
        assert_eq!(a - b, Vec4::new(0.5, 3.0, 1.0, 4.0));
        assert_eq!(a * 2.0, Vec4::new(2.0, 4.0, 6.0, 8.0));
        assert_relative_eq!(a.dot(b), 4.5, epsilon = 1e-12);
        assert_relative_eq!(
            Vec4::new(2.0, 0.0, 0.0, 0.0).normalize().magnitude(),
            1.0,
            epsilon = 1e-12
        );
    }
}
