//! Fluent 4x4 matrix builder.
//!
//! Every `add_*` call left-multiplies its elementary matrix onto the accumulated one
//! (`matrix = elementary * matrix`), so transforms added first are applied to a point
//! first:
//!
//! ```
//! use corelib::{transform::Transform, vec3};
//!
//! let m = Transform::new().add_translation(1.0, 0.0, 0.0).add_scale_evenly(2.0);
//! let p = m.transform_point(vec3(0.0, 0.0, 0.0));
//! assert!((p.x - 2.0).abs() < 1e-6);
//! ```

use crate::error::{CoreError, CoreResult};
use crate::{Mat4, Vec3, Vec4};

/// Width / height of the default 1000x800 window.
pub const DEFAULT_ASPECT_RATIO: f32 = 1000.0 / 800.0;

/// Builds a matrix from row-major rows (`rows[i]` is row `i`).
#[inline]
pub fn from_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows).transpose()
}

/// Row-major view of a matrix, the layout handed to the upload boundary.
#[inline]
pub fn to_rows(m: &Mat4) -> [[f32; 4]; 4] {
    m.transpose().to_cols_array_2d()
}

/// Perspective projection parameters. Angles are in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fov_deg: f32,
    pub near_z: f32,
    pub far_z: f32,
    /// Viewport width / height.
    pub aspect: f32,
}

impl Projection {
    pub fn new(fov_deg: f32, near_z: f32, far_z: f32, aspect: f32) -> Self {
        Self {
            fov_deg,
            near_z,
            far_z,
            aspect,
        }
    }

    #[inline]
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Rejects parameters that would produce a singular or non-finite matrix.
    pub fn validate(&self) -> CoreResult<()> {
        let finite = [self.fov_deg, self.near_z, self.far_z, self.aspect]
            .iter()
            .all(|f| f.is_finite());
        if !finite
            || self.fov_deg <= 0.0
            || self.fov_deg >= 360.0
            || self.near_z == self.far_z
            || self.aspect == 0.0
        {
            return Err(CoreError::DegenerateProjection {
                fov_deg: self.fov_deg,
                near_z: self.near_z,
                far_z: self.far_z,
                aspect: self.aspect,
            });
        }
        Ok(())
    }

    /// The projection matrix on its own. Unchecked.
    pub fn matrix(&self) -> Mat4 {
        let d = 1.0 / (self.fov_deg.to_radians() / 2.0).tan();
        let z_range = self.near_z - self.far_z;
        let a = (-self.far_z - self.near_z) / z_range;
        let b = (2.0 * self.far_z * self.near_z) / z_range;

        // The last row copies z into w for the homogeneous divide.
        from_rows([
            [d / self.aspect, 0.0, 0.0, 0.0],
            [0.0, d, 0.0, 0.0],
            [0.0, 0.0, a, b],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(90.0, 1.0, 10.0, DEFAULT_ASPECT_RATIO)
    }
}

/// Accumulates elementary transforms into one matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
#[must_use]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    #[inline]
    pub const fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    #[inline]
    fn prepend(mut self, m: Mat4) -> Self {
        self.matrix = m * self.matrix;
        self
    }

    pub fn add_rotation_x(self, degrees: f32) -> Self {
        self.prepend(Mat4::from_rotation_x(degrees.to_radians()))
    }

    pub fn add_rotation_y(self, degrees: f32) -> Self {
        self.prepend(Mat4::from_rotation_y(degrees.to_radians()))
    }

    pub fn add_rotation_z(self, degrees: f32) -> Self {
        self.prepend(Mat4::from_rotation_z(degrees.to_radians()))
    }

    pub fn add_translation(self, x: f32, y: f32, z: f32) -> Self {
        self.add_translation_vec(Vec3::new(x, y, z))
    }

    pub fn add_translation_vec(self, offset: Vec3) -> Self {
        self.prepend(Mat4::from_translation(offset))
    }

    pub fn add_scale(self, x: f32, y: f32, z: f32) -> Self {
        self.prepend(Mat4::from_scale(Vec3::new(x, y, z)))
    }

    pub fn add_scale_evenly(self, amount: f32) -> Self {
        self.add_scale(amount, amount, amount)
    }

    /// Left-multiplies an externally built matrix, e.g. a camera view matrix.
    pub fn add_matrix(self, matrix: Mat4) -> Self {
        self.prepend(matrix)
    }

    /// Adds a perspective projection. Degenerate parameters are not checked and
    /// produce inf/NaN entries; see [`Transform::try_add_perspective`].
    pub fn add_perspective(self, projection: &Projection) -> Self {
        self.prepend(projection.matrix())
    }

    pub fn try_add_perspective(self, projection: &Projection) -> CoreResult<Self> {
        projection.validate()?;
        Ok(self.add_perspective(projection))
    }

    /// Multiplies the upper-left 3x3 block by `v`, ignoring translation.
    #[inline]
    pub fn mult_vec3_from_right(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// Applies the full matrix to the homogeneous point `(p, 1)`.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec4 {
        self.matrix * p.extend(1.0)
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    #[inline]
    pub fn rows(&self) -> [[f32; 4]; 4] {
        to_rows(&self.matrix)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.matrix
    }
}
