//! Held-key tracking fed by window events.

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keys currently held down, polled once per frame.
#[derive(Debug, Default)]
pub struct HeldKeys {
    keys: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event and update key state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press(key),
                        ElementState::Released => self.release(key),
                    }
                }
            }
            // Releases are not delivered to unfocused windows.
            WindowEvent::Focused(false) => self.clear(),
            _ => {}
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        if self.keys.insert(key) {
            log::debug!("Key down: {:?}", key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.keys.remove(&key) {
            log::debug!("Key up: {:?}", key);
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[inline]
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = HeldKeys::new();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyW);
        assert!(keys.is_held(KeyCode::KeyW));
        assert!(!keys.is_held(KeyCode::KeyS));
        keys.release(KeyCode::KeyW);
        assert!(!keys.is_held(KeyCode::KeyW));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut keys = HeldKeys::new();
        keys.press(KeyCode::KeyA);
        keys.press(KeyCode::ArrowUp);
        keys.handle_event(&WindowEvent::Focused(false));
        assert!(!keys.is_held(KeyCode::KeyA));
        assert!(!keys.is_held(KeyCode::ArrowUp));
    }

    #[test]
    fn focus_gain_keeps_state() {
        let mut keys = HeldKeys::new();
        keys.press(KeyCode::KeyA);
        keys.handle_event(&WindowEvent::Focused(true));
        assert!(keys.is_held(KeyCode::KeyA));
    }
}
