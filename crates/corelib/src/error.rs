//! Errors reported by the checked math operations.

use thiserror::Error;

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum CoreError {
    /// Target and up are parallel (or zero), so no right vector exists.
    #[error("Degenerate camera basis: target is parallel to the up vector")]
    DegenerateBasis,
    #[error(
        "Degenerate projection: fov={fov_deg}°, near_z={near_z}, far_z={far_z}, aspect={aspect}"
    )]
    DegenerateProjection {
        fov_deg: f32,
        near_z: f32,
        far_z: f32,
        aspect: f32,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
