use winit::keyboard::{KeyCode, PhysicalKey};

use crate::sim::{Key, PressedKeys};

pub(crate) fn key_from_physical(key: PhysicalKey) -> Option<Key> {
    match key {
        PhysicalKey::Code(code) => key_from_code(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

pub(crate) fn key_from_code(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Space => Key::Space,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::ControlRight => Key::RightControl,
        _ => return None,
    };
    Some(key)
}

/// Held-key state accumulated from window events between ticks.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    pub(crate) quit_requested: bool,
    pressed: PressedKeys,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    pub(crate) fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_key(&mut self, physical_key: PhysicalKey, is_pressed: bool) {
        if physical_key == PhysicalKey::Code(KeyCode::Escape) && is_pressed {
            self.mark_quit_requested();
        }
        if let Some(key) = key_from_physical(physical_key) {
            self.pressed.set(key, is_pressed);
        }
    }

    /// Held keys stay down across ticks until released.
    pub(crate) fn pressed(&self) -> &PressedKeys {
        &self.pressed
    }

    pub(crate) fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    pub(crate) fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_arrows_and_digits_map_to_keys() {
        assert_eq!(key_from_code(KeyCode::KeyW), Some(Key::W));
        assert_eq!(key_from_code(KeyCode::ArrowUp), Some(Key::Up));
        assert_eq!(key_from_code(KeyCode::Digit7), Some(Key::Digit7));
        assert_eq!(key_from_code(KeyCode::NumpadEnter), Some(Key::Enter));
    }

    #[test]
    fn unmapped_codes_are_ignored() {
        assert_eq!(key_from_code(KeyCode::F12), None);
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::F12), true);
        assert!(input.pressed().is_empty());
    }

    #[test]
    fn held_key_stays_down_until_released() {
        let mut input = InputCollector::new(640, 480);
        input.handle_key(PhysicalKey::Code(KeyCode::KeyS), true);
        assert!(input.pressed().is_down(Key::S));
        assert!(input.pressed().is_down(Key::S));

        input.handle_key(PhysicalKey::Code(KeyCode::KeyS), false);
        assert!(!input.pressed().is_down(Key::S));
    }

    #[test]
    fn escape_requests_quit_and_is_still_reported_as_key() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.pressed().is_down(Key::Escape));
    }

    #[test]
    fn release_all_clears_held_keys() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::ArrowDown), true);
        input.handle_key(PhysicalKey::Code(KeyCode::Space), true);
        input.release_all();
        assert!(input.pressed().is_empty());
    }

    #[test]
    fn window_size_tracks_resizes() {
        let mut input = InputCollector::new(640, 480);
        input.set_window_size(800, 600);
        assert_eq!(input.window_size(), (800, 600));
    }
}
