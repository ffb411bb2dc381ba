/// 4x4 homogeneous transforms for positioning pieces and faces
use approx::AbsDiffEq;
use nalgebra::{Matrix4, Vector4};
use std::fmt;
use std::ops::Mul;
use strum::{Display, EnumIter};

/// Principal rotation axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Axis {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    #[strum(serialize = "z")]
    Z,
}

impl Axis {
    /// Index of this axis in an `(x, y, z)` triple
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A 4x4 matrix acting on homogeneous column vectors.
///
/// Every operation returns a new matrix; nothing is shared between
/// instances. Public coefficient accessors are row-major.
#[derive(Clone, Copy, PartialEq)]
pub struct Mat4(Matrix4<f64>);

impl Mat4 {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    /// Build from 16 coefficients in row-major order
    pub fn from_row_major(m: [f64; 16]) -> Self {
        Self(Matrix4::from_row_slice(&m))
    }

    /// Embed an exact integer rotation in the upper-left 3x3 block
    pub fn from_rotation3(r: &[[i8; 3]; 3]) -> Self {
        Self(Matrix4::from_fn(|i, j| match (i, j) {
            (3, 3) => 1.0,
            (3, _) | (_, 3) => 0.0,
            _ => f64::from(r[i][j]),
        }))
    }

    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        Mat4(a.0 * b.0)
    }

    /// Coefficient at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }

    /// The 16 coefficients in row-major order
    pub fn row_major(&self) -> [f64; 16] {
        let mut m = [0.0; 16];
        for i in 0..4 {
            for j in 0..4 {
                m[i * 4 + j] = self.0[(i, j)];
            }
        }
        m
    }

    /// The 16 coefficients in column-major order, as CSS `matrix3d` expects
    pub fn column_major(&self) -> [f64; 16] {
        let mut m = [0.0; 16];
        m.copy_from_slice(self.0.as_slice());
        m
    }

    pub fn as_matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    pub fn translate(&self, tx: f64, ty: f64, tz: f64) -> Mat4 {
        Mat4(self.0 * Matrix4::new_translation(&nalgebra::Vector3::new(tx, ty, tz)))
    }

    pub fn scale(&self, sx: f64, sy: f64, sz: f64) -> Mat4 {
        Mat4(self.0 * Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(sx, sy, sz)))
    }

    /// Compose with a rotation of `degrees` about `axis`.
    ///
    /// With `pre` false the result is `self * R`, rotating in the local
    /// frame; with `pre` true it is `R * self`, rotating in the parent frame.
    pub fn rotate(&self, axis: Axis, degrees: f64, pre: bool) -> Mat4 {
        let r = elementary_rotation(axis, degrees);
        if pre {
            Mat4(r * self.0)
        } else {
            Mat4(self.0 * r)
        }
    }

    pub fn pre_rotate(&self, axis: Axis, degrees: f64) -> Mat4 {
        self.rotate(axis, degrees, true)
    }

    pub fn rotate_x(&self, degrees: f64) -> Mat4 {
        self.rotate(Axis::X, degrees, false)
    }

    pub fn rotate_y(&self, degrees: f64) -> Mat4 {
        self.rotate(Axis::Y, degrees, false)
    }

    pub fn rotate_z(&self, degrees: f64) -> Mat4 {
        self.rotate(Axis::Z, degrees, false)
    }

    /// Apply to a point and divide through by the resulting `w`.
    ///
    /// # Panics
    ///
    /// Panics if `w` comes out as zero. Only perspective matrices can do that
    /// and none are built by this crate.
    pub fn transform_vertex(&self, v: [f64; 3]) -> [f64; 3] {
        let t = self.0 * Vector4::new(v[0], v[1], v[2], 1.0);
        assert!(t.w != 0.0, "vertex projected to w = 0");
        [t.x / t.w, t.y / t.w, t.z / t.w]
    }

    pub fn determinant(&self) -> f64 {
        (0..4).map(|j| self.0[(0, j)] * self.cofactor(0, j)).sum()
    }

    /// Inverse by adjugate over determinant, or `None` when singular
    pub fn try_invert(&self) -> Option<Mat4> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        // Adjugate is the transposed cofactor matrix
        Some(Mat4(Matrix4::from_fn(|i, j| self.cofactor(j, i) / det)))
    }

    /// # Panics
    ///
    /// Panics if the matrix is singular.
    pub fn invert(&self) -> Mat4 {
        match self.try_invert() {
            Some(inverse) => inverse,
            None => panic!("cannot invert a singular matrix"),
        }
    }

    fn cofactor(&self, row: usize, col: usize) -> f64 {
        let mut minor = [[0.0; 3]; 3];
        for (mi, i) in (0..4).filter(|&i| i != row).enumerate() {
            for (mj, j) in (0..4).filter(|&j| j != col).enumerate() {
                minor[mi][mj] = self.0[(i, j)];
            }
        }
        let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
        sign * det3(&minor)
    }
}

fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Right-handed rotation about a principal axis
#[rustfmt::skip]
fn elementary_rotation(axis: Axis, degrees: f64) -> Matrix4<f64> {
    let (s, c) = degrees.to_radians().sin_cos();
    match axis {
        Axis::X => Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, -s, 0.0,
            0.0, s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ),
        Axis::Y => Matrix4::new(
            c, 0.0, s, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -s, 0.0, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ),
        Axis::Z => Matrix4::new(
            c, -s, 0.0, 0.0,
            s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ),
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Mat4 {
    fn from(m: Matrix4<f64>) -> Self {
        Self(m)
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        Mat4::multiply(&self, &rhs)
    }
}

impl fmt::Debug for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.row_major().chunks(4)).finish()
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        1e-9
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use strum::IntoEnumIterator;

    fn sample() -> Mat4 {
        Mat4::identity()
            .translate(155.0, 105.0, -12.5)
            .rotate_x(-25.0)
            .rotate_y(-35.0)
            .scale(2.0, 0.5, 3.0)
            .rotate(Axis::Z, 17.0, true)
    }

    #[test]
    fn test_identity_composition() {
        let m = sample();
        assert_abs_diff_eq!(m * Mat4::identity(), m);
        assert_abs_diff_eq!(Mat4::identity() * m, m);
    }

    #[test]
    fn test_multiply_matches_definition() {
        let a = Mat4::from_row_major([
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 0.0, 0.0, 0.0, 1.0,
        ]);
        let b = sample();
        let c = Mat4::multiply(&a, &b);
        for i in 0..4 {
            for j in 0..4 {
                let expected: f64 = (0..4).map(|k| a.get(i, k) * b.get(k, j)).sum();
                assert!((c.get(i, j) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let matrices = [
            sample(),
            Mat4::identity().translate(-3.0, 7.0, 90.0),
            Mat4::identity().scale(4.0, 4.0, 0.25).rotate_z(33.0),
            Mat4::identity().rotate_y(90.0).translate(90.0, 0.0, -90.0).rotate_x(-90.0),
        ];
        for m in matrices {
            assert_abs_diff_eq!(m * m.invert(), Mat4::identity(), epsilon = 1e-9);
            assert_abs_diff_eq!(m.invert() * m, Mat4::identity(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_agrees_with_nalgebra() {
        let m = sample();
        let expected = m.as_matrix().try_inverse().unwrap();
        assert_abs_diff_eq!(m.invert(), Mat4::from(expected), epsilon = 1e-9);
    }

    #[test]
    fn test_singular_matrix() {
        let flat = Mat4::identity().scale(1.0, 0.0, 1.0);
        assert_eq!(flat.determinant(), 0.0);
        assert!(flat.try_invert().is_none());
    }

    #[test]
    #[should_panic(expected = "singular")]
    fn test_invert_singular_panics() {
        Mat4::identity().scale(0.0, 1.0, 1.0).invert();
    }

    #[test]
    fn test_rotation_closure() {
        let start = sample();
        for axis in Axis::iter() {
            for degrees in [90.0, -90.0] {
                let mut m = start;
                for _ in 0..4 {
                    m = m.rotate(axis, degrees, false);
                }
                assert_abs_diff_eq!(m, start, epsilon = 1e-9);

                let mut m = start;
                for _ in 0..4 {
                    m = m.pre_rotate(axis, degrees);
                }
                assert_abs_diff_eq!(m, start, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_right_handed_rotations() {
        let p = Mat4::identity().rotate_z(90.0).transform_vertex([1.0, 0.0, 0.0]);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-12);

        let p = Mat4::identity().rotate_x(90.0).transform_vertex([0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(p[2], 1.0, epsilon = 1e-12);

        let p = Mat4::identity().rotate_y(90.0).transform_vertex([0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pre_and_post_order() {
        let t = Mat4::identity().translate(10.0, 0.0, 0.0);
        // Post: rotate in local frame, translation untouched
        let post = t.rotate_z(90.0).transform_vertex([0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(post[0], 10.0, epsilon = 1e-12);
        // Pre: rotation carries the translation around the origin
        let pre = t.pre_rotate(Axis::Z, 90.0).transform_vertex([0.0, 0.0, 0.0]);
        assert_abs_diff_eq!(pre[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pre[1], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_vertex_translation_and_scale() {
        let m = Mat4::identity().translate(1.0, 2.0, 3.0).scale(2.0, 2.0, 2.0);
        assert_eq!(m.transform_vertex([1.0, 1.0, 1.0]), [3.0, 4.0, 5.0]);
    }

    #[test]
    #[should_panic(expected = "w = 0")]
    fn test_transform_vertex_zero_w_panics() {
        let degenerate = Mat4::from_row_major([
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        degenerate.transform_vertex([1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_column_major_is_transpose() {
        let m = sample();
        let rows = m.row_major();
        let cols = m.column_major();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(rows[i * 4 + j], cols[j * 4 + i]);
            }
        }
        // Bottom row stays affine
        assert_eq!(&rows[12..], &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_integer_rotation_embedding() {
        let quarter_z = [[0, -1, 0], [1, 0, 0], [0, 0, 1]];
        assert_abs_diff_eq!(
            Mat4::from_rotation3(&quarter_z),
            Mat4::identity().rotate_z(90.0),
            epsilon = 1e-12
        );
    }
}
