//! Key-to-command mapping.

use corelib::{Camera, CameraCommand};
use winit::keyboard::KeyCode;

use crate::input::HeldKeys;

#[derive(Clone, Debug)]
pub struct KeyBindings {
    commands: Vec<(KeyCode, CameraCommand)>,
    pub quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            commands: vec![
                (KeyCode::KeyW, CameraCommand::MoveForward),
                (KeyCode::KeyS, CameraCommand::MoveBackward),
                (KeyCode::KeyA, CameraCommand::MoveLeft),
                (KeyCode::KeyD, CameraCommand::MoveRight),
                (KeyCode::Space, CameraCommand::MoveUp),
                (KeyCode::ShiftLeft, CameraCommand::MoveDown),
                (KeyCode::ArrowLeft, CameraCommand::RotateLeft),
                (KeyCode::ArrowRight, CameraCommand::RotateRight),
                (KeyCode::ArrowUp, CameraCommand::RotateUp),
                (KeyCode::ArrowDown, CameraCommand::RotateDown),
            ],
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    pub fn command_for(&self, key: KeyCode) -> Option<CameraCommand> {
        self.commands
            .iter()
            .find(|(k, _)| *k == key)
            .map(|&(_, cmd)| cmd)
    }

    /// Every command whose key is held, in binding order.
    pub fn held_commands<'a>(
        &'a self,
        keys: &'a HeldKeys,
    ) -> impl Iterator<Item = CameraCommand> + 'a {
        self.commands
            .iter()
            .filter(|(key, _)| keys.is_held(*key))
            .map(|&(_, cmd)| cmd)
    }

    #[inline]
    pub fn is_quit(&self, key: KeyCode) -> bool {
        key == self.quit
    }
}

/// Runs each command once against the camera and returns how many were applied.
/// Strafes that would leave the position undefined are skipped.
pub fn apply_held(camera: &mut Camera, commands: impl IntoIterator<Item = CameraCommand>) -> usize {
    let mut applied = 0;
    for cmd in commands {
        let result = match cmd {
            CameraCommand::MoveLeft => camera.try_move_left(),
            CameraCommand::MoveRight => camera.try_move_right(),
            other => {
                camera.apply(other);
                Ok(())
            }
        };
        match result {
            Ok(()) => applied += 1,
            Err(e) => log::debug!("Skipped {:?}: {}", cmd, e),
        }
    }
    applied
}
