//! Fixed-size matrices, row-major, acting on column vectors.

use std::ops::Mul;

use crate::vector::{Vec3, Vec4};

/// A 3x3 matrix, used for rotation blocks and barycentric bases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    m: [[f64; 3]; 3],
}

impl Mat3 {
    pub const fn new(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Transposes the matrix (swaps rows and columns).
    pub fn transpose(self) -> Mat3 {
        let mut t = [[0.0; 3]; 3];
        for (row, t_row) in t.iter_mut().enumerate() {
            for (col, value) in t_row.iter_mut().enumerate() {
                *value = self.m[col][row];
            }
        }
        Mat3::new(t)
    }

    /// The minor of the element at `row`, `col`: the determinant of the
    /// 2x2 matrix left after deleting that row and column.
    fn minor(self, row: usize, col: usize) -> f64 {
        let a1 = self.m[if row == 0 { 1 } else { 0 }][if col == 0 { 1 } else { 0 }];
        let a2 = self.m[if row == 0 { 1 } else { 0 }][if col == 2 { 1 } else { 2 }];
        let b1 = self.m[if row == 2 { 1 } else { 2 }][if col == 0 { 1 } else { 0 }];
        let b2 = self.m[if row == 2 { 1 } else { 2 }][if col == 2 { 1 } else { 2 }];
        a1 * b2 - a2 * b1
    }

    /// The matrix of signed minors.
    pub fn cofactor_matrix(self) -> Mat3 {
        let mut c = [[0.0; 3]; 3];
        for (row, c_row) in c.iter_mut().enumerate() {
            for (col, value) in c_row.iter_mut().enumerate() {
                let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
                *value = sign * self.minor(row, col);
            }
        }
        Mat3::new(c)
    }

    /// The adjugate: the transposed cofactor matrix.
    pub fn adjugate(self) -> Mat3 {
        self.cofactor_matrix().transpose()
    }

    pub fn determinant(self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse, computed as adjugate over determinant.
    ///
    /// Undefined for singular matrices; callers must guarantee a non-zero
    /// determinant (always true for rotation matrices derived from unit
    /// quaternions).
    pub fn inverse(self) -> Mat3 {
        self.adjugate().scale(1.0 / self.determinant())
    }

    /// Scales every element of the matrix.
    pub fn scale(self, scalar: f64) -> Mat3 {
        let mut s = self.m;
        for row in &mut s {
            for value in row.iter_mut() {
                *value *= scalar;
            }
        }
        Mat3::new(s)
    }

    /// Builds the matrix that converts 2D screen positions to barycentric
    /// coordinates for the triangle `a`, `b`, `c` (only x and y are used).
    ///
    /// Multiplying the result by `(1, px, py)` yields weights summing to 1
    /// for any point in the triangle's plane. The construction divides by
    /// twice the triangle's signed area; callers must have already rejected
    /// zero-area triangles (see [`doubled_area`]).
    pub fn barycentric_basis(a: Vec3, b: Vec3, c: Vec3) -> Mat3 {
        Mat3::new([
            [b.x * c.y - c.x * b.y, b.y - c.y, c.x - b.x],
            [c.x * a.y - a.x * c.y, c.y - a.y, a.x - c.x],
            [a.x * b.y - b.x * a.y, a.y - b.y, b.x - a.x],
        ])
        .scale(1.0 / doubled_area(a, b, c))
    }
}

/// Twice the signed area of the screen-space triangle `a`, `b`, `c`
/// (only x and y are used).
pub fn doubled_area(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, other: Mat3) -> Mat3 {
        let mut product = [[0.0; 3]; 3];
        for (row, p_row) in product.iter_mut().enumerate() {
            for (col, value) in p_row.iter_mut().enumerate() {
                for i in 0..3 {
                    *value += self.m[row][i] * other.m[i][col];
                }
            }
        }
        Mat3::new(product)
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        Vec3::new(
            v.x * self.m[0][0] + v.y * self.m[0][1] + v.z * self.m[0][2],
            v.x * self.m[1][0] + v.y * self.m[1][1] + v.z * self.m[1][2],
            v.x * self.m[2][0] + v.y * self.m[2][1] + v.z * self.m[2][2],
        )
    }
}

/// A 4x4 matrix with an explicit homogeneous row and column, used for
/// general transforms and projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    m: [[f64; 4]; 4],
}

impl Mat4 {
    pub const fn new(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    pub const fn identity() -> Self {
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// A transform that translates by `translation`.
    pub fn from_translation(translation: Vec3) -> Mat4 {
        Mat4::identity().with_translation(translation)
    }

    /// A transform that scales each axis by the given factors.
    pub fn from_scale(scale: Vec3) -> Mat4 {
        Mat4::new([
            [scale.x, 0.0, 0.0, 0.0],
            [0.0, scale.y, 0.0, 0.0],
            [0.0, 0.0, scale.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Adds `translation` to the matrix's translation column, so the shift
    /// applies after the existing transform.
    pub fn with_translation(self, translation: Vec3) -> Mat4 {
        let mut m = self.m;
        m[0][3] += translation.x;
        m[1][3] += translation.y;
        m[2][3] += translation.z;
        Mat4::new(m)
    }

    /// The upper-left 3x3 rotation block.
    pub fn rotation(self) -> Mat3 {
        let mut r = [[0.0; 3]; 3];
        for (row, r_row) in r.iter_mut().enumerate() {
            for (col, value) in r_row.iter_mut().enumerate() {
                *value = self.m[row][col];
            }
        }
        Mat3::new(r)
    }

    /// Applies the transform to a 3D point with the given homogeneous
    /// coordinate. For positions, `w` is 1.
    pub fn transform(self, v: Vec3, w: f64) -> Vec4 {
        let m = &self.m;
        Vec4::new(
            v.x * m[0][0] + v.y * m[0][1] + v.z * m[0][2] + w * m[0][3],
            v.x * m[1][0] + v.y * m[1][1] + v.z * m[1][2] + w * m[1][3],
            v.x * m[2][0] + v.y * m[2][1] + v.z * m[2][2] + w * m[2][3],
            v.x * m[3][0] + v.y * m[3][1] + v.z * m[3][2] + w * m[3][3],
        )
    }

    /// Transposes the matrix (swaps rows and columns).
    pub fn transpose(self) -> Mat4 {
        let mut t = [[0.0; 4]; 4];
        for (row, t_row) in t.iter_mut().enumerate() {
            for (col, value) in t_row.iter_mut().enumerate() {
                *value = self.m[col][row];
            }
        }
        Mat4::new(t)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, other: Mat4) -> Mat4 {
        let mut product = [[0.0; 4]; 4];
        for (row, p_row) in product.iter_mut().enumerate() {
            for (col, value) in p_row.iter_mut().enumerate() {
                for i in 0..4 {
                    *value += self.m[row][i] * other.m[i][col];
                }
            }
        }
        Mat4::new(product)
    }
}
