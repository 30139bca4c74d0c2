//! 2x2 rotation matrix
//!
//! Bodies store their orientation as an angle; shapes need it as a matrix
//! when computing world-space vertices and bounding boxes.

use crate::Vec2;

/// 2x2 matrix stored row-major
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat2 {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
}

impl Mat2 {
    /// Identity matrix
    pub const IDENTITY: Self = Self {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
    };

    /// Create a rotation matrix for the given angle in radians
    pub fn rotation(radians: f64) -> Self {
        let (sn, cs) = radians.sin_cos();
        Self {
            m00: cs,
            m01: -sn,
            m10: sn,
            m11: cs,
        }
    }

    /// Multiply a vector by this matrix
    #[inline]
    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m01 * v.y,
            self.m10 * v.x + self.m11 * v.y,
        )
    }

    /// Transpose (the inverse for a pure rotation)
    #[inline]
    pub fn transpose(&self) -> Self {
        Self {
            m00: self.m00,
            m01: self.m10,
            m10: self.m01,
            m11: self.m11,
        }
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_identity() {
        let v = Vec2::new(3.0, -2.0);
        assert_eq!(Mat2::IDENTITY.mul_vec(v), v);
        assert_eq!(Mat2::default(), Mat2::IDENTITY);
    }

    #[test]
    fn test_quarter_turn() {
        let r = Mat2::rotation(std::f64::consts::FRAC_PI_2);
        let v = r.mul_vec(Vec2::X);
        assert!(v.x.abs() < EPSILON);
        assert!((v.y - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_transpose_inverts_rotation() {
        let r = Mat2::rotation(0.7);
        let v = Vec2::new(1.5, -4.0);
        let back = r.transpose().mul_vec(r.mul_vec(v));
        assert!((back.x - v.x).abs() < EPSILON);
        assert!((back.y - v.y).abs() < EPSILON);
    }
}
