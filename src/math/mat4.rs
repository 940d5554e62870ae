//! 4x4 transformation matrix using the row-vector convention.
//!
//! # Convention
//! - Values are stored flat in **row-major** order: `values[row * 4 + col]`
//! - Vectors are **row vectors** on the left: `v * Mat4`
//! - Translation is stored in the **last row**
//! - Transforms chain **left-to-right**: `v * (A * B)` applies A first, then B
//!
//! # Example
//! ```ignore
//! let transform = rotation * scale;  // rotation applied first, then scale
//! let result = vertex * transform;   // transform the vertex
//! ```

use std::fmt;
use std::ops::Mul;

use super::vec4::Vec4;

/// 4x4 matrix stored as sixteen row-major doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    values: [f64; 16],
}

impl Mat4 {
    pub const fn new(values: [f64; 16]) -> Self {
        Mat4 { values }
    }

    #[rustfmt::skip]
    pub const fn identity() -> Self {
        Mat4::new([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Creates a translation matrix.
    ///
    /// Translation is stored in the last row (row-vector convention).
    #[rustfmt::skip]
    pub const fn translation(x: f64, y: f64, z: f64) -> Self {
        Mat4::new([
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            x,   y,   z,   1.0,
        ])
    }

    /// Creates a uniform scale matrix. `w` is left unscaled.
    #[rustfmt::skip]
    pub const fn uniform_scaling(s: f64) -> Self {
        Mat4::new([
            s,   0.0, 0.0, 0.0,
            0.0, s,   0.0, 0.0,
            0.0, 0.0, s,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the horizontal (X) axis. Angle in radians.
    #[rustfmt::skip]
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the vertical (Y) axis. Angle in radians.
    #[rustfmt::skip]
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            c,   0.0, -s,  0.0,
            0.0, 1.0, 0.0, 0.0,
            s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the depth (Z) axis. Angle in radians.
    #[rustfmt::skip]
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Mat4::new([
            c,   -s,  0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Transforms `v` as a row vector: `v' = v * self`.
    ///
    /// Output component `c` reads column `c` of the flat array at stride 4,
    /// weighted by `x, y, z, w` in that order.
    #[inline]
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let m = &self.values;
        Vec4::new(
            v.x * m[0] + v.y * m[4] + v.z * m[8] + v.w * m[12],
            v.x * m[1] + v.y * m[5] + v.z * m[9] + v.w * m[13],
            v.x * m[2] + v.y * m[6] + v.z * m[10] + v.w * m[14],
            v.x * m[3] + v.y * m[7] + v.z * m[11] + v.w * m[15],
        )
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * 4 + col]
    }

    pub fn values(&self) -> &[f64; 16] {
        &self.values
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Matrix multiplication: `C[r][c] = sum_k A[r][k] * B[k][c]`.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [0.0f64; 16];

        for row in 0..4 {
            for col in 0..4 {
                for k in 0..4 {
                    result[row * 4 + col] += self.values[row * 4 + k] * rhs.values[k * 4 + col];
                }
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: Vec4 * Mat4 (row vector).
impl Mul<Mat4> for Vec4 {
    type Output = Vec4;

    fn mul(self, m: Mat4) -> Self::Output {
        m.transform(self)
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..4 {
            for col in 0..4 {
                write!(f, "{}", self.get(row, col))?;
                if col != 3 {
                    write!(f, ",")?;
                }
            }
            if row != 3 {
                write!(f, ";\n ")?;
            }
        }
        write!(f, "]")
    }
}
