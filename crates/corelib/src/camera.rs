//! Free-fly camera driven by discrete per-frame commands.
//!
//! Camera space is +X right, +Y up, +Z forward. With the default orientation
//! (target `+Z`, up `+Y`) turning left swings the target toward `-X` and pitching up
//! raises its Y component.

use crate::error::{CoreError, CoreResult};
use crate::transform::{Projection, Transform, from_rows};
use crate::{Mat4, Vec3};

pub const DEFAULT_MOVE_SPEED: f32 = 0.1;
/// Degrees per command.
pub const DEFAULT_TURN_SPEED: f32 = 1.5;

/// One logical camera input. The platform layer decides which keys map to which.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraCommand {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    RotateLeft,
    RotateRight,
    RotateUp,
    RotateDown,
}

impl CameraCommand {
    pub const ALL: [CameraCommand; 10] = [
        CameraCommand::MoveForward,
        CameraCommand::MoveBackward,
        CameraCommand::MoveLeft,
        CameraCommand::MoveRight,
        CameraCommand::MoveUp,
        CameraCommand::MoveDown,
        CameraCommand::RotateLeft,
        CameraCommand::RotateRight,
        CameraCommand::RotateUp,
        CameraCommand::RotateDown,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Vec3,
    /// Look direction; not kept normalized.
    target: Vec3,
    /// Fixed world up, never pitched.
    up: Vec3,
    move_speed: f32,
    turn_speed: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            target: Vec3::Z,
            up: Vec3::Y,
            move_speed: DEFAULT_MOVE_SPEED,
            turn_speed: DEFAULT_TURN_SPEED,
        }
    }

    #[inline]
    pub fn with_speeds(mut self, move_speed: f32, turn_speed: f32) -> Self {
        self.move_speed = move_speed;
        self.turn_speed = turn_speed;
        self
    }

    #[inline]
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    #[inline]
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    #[inline]
    pub fn turn_speed(&self) -> f32 {
        self.turn_speed
    }

    pub fn apply(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::MoveForward => self.move_forward(),
            CameraCommand::MoveBackward => self.move_backward(),
            CameraCommand::MoveLeft => self.move_left(),
            CameraCommand::MoveRight => self.move_right(),
            CameraCommand::MoveUp => self.move_up(),
            CameraCommand::MoveDown => self.move_down(),
            CameraCommand::RotateLeft => self.rotate_left(),
            CameraCommand::RotateRight => self.rotate_right(),
            CameraCommand::RotateUp => self.rotate_up(),
            CameraCommand::RotateDown => self.rotate_down(),
        }
    }

    pub fn move_forward(&mut self) {
        self.position += self.target * self.move_speed;
    }

    pub fn move_backward(&mut self) {
        self.position -= self.target * self.move_speed;
    }

    /// Strafes left. Produces a NaN position when target is parallel to up.
    pub fn move_left(&mut self) {
        self.position += self.target.cross(self.up).normalize() * self.move_speed;
    }

    /// Strafes right. Produces a NaN position when target is parallel to up.
    pub fn move_right(&mut self) {
        self.position += self.up.cross(self.target).normalize() * self.move_speed;
    }

    pub fn try_move_left(&mut self) -> CoreResult<()> {
        let dir = self
            .target
            .cross(self.up)
            .try_normalize()
            .ok_or(CoreError::DegenerateBasis)?;
        self.position += dir * self.move_speed;
        Ok(())
    }

    pub fn try_move_right(&mut self) -> CoreResult<()> {
        let dir = self
            .up
            .cross(self.target)
            .try_normalize()
            .ok_or(CoreError::DegenerateBasis)?;
        self.position += dir * self.move_speed;
        Ok(())
    }

    pub fn move_up(&mut self) {
        self.position += self.up * self.move_speed;
    }

    pub fn move_down(&mut self) {
        self.position -= self.up * self.move_speed;
    }

    pub fn rotate_left(&mut self) {
        self.yaw(-self.turn_speed);
    }

    pub fn rotate_right(&mut self) {
        self.yaw(self.turn_speed);
    }

    pub fn rotate_up(&mut self) {
        self.pitch(-self.turn_speed);
    }

    pub fn rotate_down(&mut self) {
        self.pitch(self.turn_speed);
    }

    fn yaw(&mut self, degrees: f32) {
        self.target = Transform::new()
            .add_rotation_y(degrees)
            .mult_vec3_from_right(self.target);
    }

    // Un-yaw onto the YZ plane, pitch about X, re-yaw.
    fn pitch(&mut self, degrees: f32) {
        let alpha = self.target.x.atan2(self.target.z).to_degrees();
        self.target = Transform::new()
            .add_rotation_y(-alpha)
            .add_rotation_x(degrees)
            .add_rotation_y(alpha)
            .mult_vec3_from_right(self.target);
    }

    /// Rows of the world-to-camera rotation: right, corrected up, forward.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let n = self.target.normalize();
        let u = self.up.cross(n).normalize();
        let v = n.cross(u).normalize();
        (u, v, n)
    }

    /// View matrix: translate by `-position`, then rotate into the camera basis.
    pub fn get_matrix(&self) -> Mat4 {
        let (u, v, n) = self.basis();
        let rotation = from_rows([
            [u.x, u.y, u.z, 0.0],
            [v.x, v.y, v.z, 0.0],
            [n.x, n.y, n.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        rotation * Mat4::from_translation(-self.position)
    }

    pub fn try_get_matrix(&self) -> CoreResult<Mat4> {
        let degenerate = self.target.try_normalize().is_none()
            || self.up.cross(self.target).try_normalize().is_none();
        if degenerate {
            return Err(CoreError::DegenerateBasis);
        }
        Ok(self.get_matrix())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Model transform, then camera view, then perspective.
pub fn model_view_projection(model: Mat4, camera: &Camera, projection: &Projection) -> Mat4 {
    Transform::new()
        .add_matrix(model)
        .add_matrix(camera.get_matrix())
        .add_perspective(projection)
        .matrix()
}

/// Checked [`model_view_projection`]: fails when the camera basis is degenerate.
pub fn try_model_view_projection(
    model: Mat4,
    camera: &Camera,
    projection: &Projection,
) -> CoreResult<Mat4> {
    let view = camera.try_get_matrix()?;
    Ok(Transform::new()
        .add_matrix(model)
        .add_matrix(view)
        .add_perspective(projection)
        .matrix())
}
