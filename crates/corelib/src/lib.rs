//! Core math: matrix builder, projection, free-fly camera.

pub use glam::{Mat4, Vec3, Vec4, vec3};

pub mod camera;
pub mod error;
pub mod transform;

pub use camera::{Camera, CameraCommand, model_view_projection, try_model_view_projection};
pub use error::{CoreError, CoreResult};
pub use transform::{Projection, Transform};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        assert_eq!(Transform::new().matrix(), Mat4::IDENTITY);
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matrix() {
        let t = Transform::new()
            .add_translation(1.0, 0.0, 0.0)
            .add_scale_evenly(2.0);
        let p = t.transform_point(vec3(0.0, 0.0, 0.0));
        assert!((p.x - 2.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!(p.z.abs() < 1e-6);
        assert!((p.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_round_trip_is_identity() {
        let t = Transform::new().add_rotation_y(90.0).add_rotation_y(-90.0);
        for v in [Vec3::X, Vec3::Y, Vec3::Z, vec3(0.3, -2.0, 7.5)] {
            assert!(t.mult_vec3_from_right(v).abs_diff_eq(v, 1e-5));
        }
    }

    #[test]
    fn camera_mvp_is_finite() {
        let mut cam = Camera::new(vec3(0.0, 0.0, -4.0));
        cam.rotate_right();
        cam.rotate_down();
        let model = Transform::new().add_rotation_z(30.0).matrix();
        let mvp = model_view_projection(model, &cam, &Projection::default());
        assert!(mvp.to_cols_array().iter().all(|f| f.is_finite()));
    }
}
