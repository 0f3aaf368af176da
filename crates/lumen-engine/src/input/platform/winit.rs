use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};
use winit::window::Window;

use crate::input::keys::*;
use crate::input::{InputEvent, KeyCode, KeyState, MouseButton, MouseButtonState};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem, including
/// keys without a code in the engine's key space.
pub(crate) fn translate_window_event(window: &Window, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(window, *position);
            Some(InputEvent::CursorMoved { x, y })
        }

        WindowEvent::MouseInput { state, button, .. } => {
            let state = match state {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            };
            Some(InputEvent::MouseButton {
                button: map_mouse_button(*button),
                state,
            })
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                MouseScrollDelta::PixelDelta(p) => to_logical(window, *p),
            };
            Some(InputEvent::Scroll { dx, dy })
        }

        WindowEvent::KeyboardInput { event, .. } => {
            // Repeats keep the key held; nothing to record.
            if event.repeat {
                return None;
            }

            let code = map_key(event.physical_key)?;
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };
            Some(InputEvent::Key { code, state })
        }

        _ => None,
    }
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> (f64, f64) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x, logical.y)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

/// Maps a physical key onto the engine key space.
pub(crate) fn map_key(pk: PhysicalKey) -> Option<KeyCode> {
    let PhysicalKey::Code(code) = pk else {
        return None;
    };

    let key = match code {
        WinitKeyCode::Space => KEY_SPACE,
        WinitKeyCode::Quote => KEY_APOSTROPHE,
        WinitKeyCode::Comma => KEY_COMMA,
        WinitKeyCode::Minus => KEY_MINUS,
        WinitKeyCode::Period => KEY_PERIOD,
        WinitKeyCode::Slash => KEY_SLASH,
        WinitKeyCode::Semicolon => KEY_SEMICOLON,
        WinitKeyCode::Equal => KEY_EQUAL,
        WinitKeyCode::BracketLeft => KEY_LEFT_BRACKET,
        WinitKeyCode::Backslash => KEY_BACKSLASH,
        WinitKeyCode::BracketRight => KEY_RIGHT_BRACKET,
        WinitKeyCode::Backquote => KEY_GRAVE_ACCENT,

        WinitKeyCode::Digit0 => KEY_0,
        WinitKeyCode::Digit1 => KEY_1,
        WinitKeyCode::Digit2 => KEY_2,
        WinitKeyCode::Digit3 => KEY_3,
        WinitKeyCode::Digit4 => KEY_4,
        WinitKeyCode::Digit5 => KEY_5,
        WinitKeyCode::Digit6 => KEY_6,
        WinitKeyCode::Digit7 => KEY_7,
        WinitKeyCode::Digit8 => KEY_8,
        WinitKeyCode::Digit9 => KEY_9,

        WinitKeyCode::KeyA => KEY_A,
        WinitKeyCode::KeyB => KEY_B,
        WinitKeyCode::KeyC => KEY_C,
        WinitKeyCode::KeyD => KEY_D,
        WinitKeyCode::KeyE => KEY_E,
        WinitKeyCode::KeyF => KEY_F,
        WinitKeyCode::KeyG => KEY_G,
        WinitKeyCode::KeyH => KEY_H,
        WinitKeyCode::KeyI => KEY_I,
        WinitKeyCode::KeyJ => KEY_J,
        WinitKeyCode::KeyK => KEY_K,
        WinitKeyCode::KeyL => KEY_L,
        WinitKeyCode::KeyM => KEY_M,
        WinitKeyCode::KeyN => KEY_N,
        WinitKeyCode::KeyO => KEY_O,
        WinitKeyCode::KeyP => KEY_P,
        WinitKeyCode::KeyQ => KEY_Q,
        WinitKeyCode::KeyR => KEY_R,
        WinitKeyCode::KeyS => KEY_S,
        WinitKeyCode::KeyT => KEY_T,
        WinitKeyCode::KeyU => KEY_U,
        WinitKeyCode::KeyV => KEY_V,
        WinitKeyCode::KeyW => KEY_W,
        WinitKeyCode::KeyX => KEY_X,
        WinitKeyCode::KeyY => KEY_Y,
        WinitKeyCode::KeyZ => KEY_Z,

        WinitKeyCode::Escape => KEY_ESCAPE,
        WinitKeyCode::Enter => KEY_ENTER,
        WinitKeyCode::Tab => KEY_TAB,
        WinitKeyCode::Backspace => KEY_BACKSPACE,
        WinitKeyCode::Insert => KEY_INSERT,
        WinitKeyCode::Delete => KEY_DELETE,
        WinitKeyCode::ArrowRight => KEY_RIGHT,
        WinitKeyCode::ArrowLeft => KEY_LEFT,
        WinitKeyCode::ArrowDown => KEY_DOWN,
        WinitKeyCode::ArrowUp => KEY_UP,
        WinitKeyCode::PageUp => KEY_PAGE_UP,
        WinitKeyCode::PageDown => KEY_PAGE_DOWN,
        WinitKeyCode::Home => KEY_HOME,
        WinitKeyCode::End => KEY_END,
        WinitKeyCode::CapsLock => KEY_CAPS_LOCK,
        WinitKeyCode::ScrollLock => KEY_SCROLL_LOCK,
        WinitKeyCode::NumLock => KEY_NUM_LOCK,
        WinitKeyCode::PrintScreen => KEY_PRINT_SCREEN,
        WinitKeyCode::Pause => KEY_PAUSE,

        WinitKeyCode::F1 => KEY_F1,
        WinitKeyCode::F2 => KEY_F2,
        WinitKeyCode::F3 => KEY_F3,
        WinitKeyCode::F4 => KEY_F4,
        WinitKeyCode::F5 => KEY_F5,
        WinitKeyCode::F6 => KEY_F6,
        WinitKeyCode::F7 => KEY_F7,
        WinitKeyCode::F8 => KEY_F8,
        WinitKeyCode::F9 => KEY_F9,
        WinitKeyCode::F10 => KEY_F10,
        WinitKeyCode::F11 => KEY_F11,
        WinitKeyCode::F12 => KEY_F12,

        WinitKeyCode::Numpad0 => KEY_KP_0,
        WinitKeyCode::Numpad1 => KEY_KP_1,
        WinitKeyCode::Numpad2 => KEY_KP_2,
        WinitKeyCode::Numpad3 => KEY_KP_3,
        WinitKeyCode::Numpad4 => KEY_KP_4,
        WinitKeyCode::Numpad5 => KEY_KP_5,
        WinitKeyCode::Numpad6 => KEY_KP_6,
        WinitKeyCode::Numpad7 => KEY_KP_7,
        WinitKeyCode::Numpad8 => KEY_KP_8,
        WinitKeyCode::Numpad9 => KEY_KP_9,
        WinitKeyCode::NumpadDecimal => KEY_KP_DECIMAL,
        WinitKeyCode::NumpadDivide => KEY_KP_DIVIDE,
        WinitKeyCode::NumpadMultiply => KEY_KP_MULTIPLY,
        WinitKeyCode::NumpadSubtract => KEY_KP_SUBTRACT,
        WinitKeyCode::NumpadAdd => KEY_KP_ADD,
        WinitKeyCode::NumpadEnter => KEY_KP_ENTER,
        WinitKeyCode::NumpadEqual => KEY_KP_EQUAL,

        WinitKeyCode::ShiftLeft => KEY_LEFT_SHIFT,
        WinitKeyCode::ControlLeft => KEY_LEFT_CONTROL,
        WinitKeyCode::AltLeft => KEY_LEFT_ALT,
        WinitKeyCode::SuperLeft => KEY_LEFT_SUPER,
        WinitKeyCode::ShiftRight => KEY_RIGHT_SHIFT,
        WinitKeyCode::ControlRight => KEY_RIGHT_CONTROL,
        WinitKeyCode::AltRight => KEY_RIGHT_ALT,
        WinitKeyCode::SuperRight => KEY_RIGHT_SUPER,
        WinitKeyCode::ContextMenu => KEY_MENU,

        _ => return None,
    };

    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn letters_map_to_ascii() {
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::KeyA)), Some(65));
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::KeyZ)), Some(90));
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::Digit1)), Some(49));
    }

    #[test]
    fn named_keys_map_into_upper_range() {
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::Escape)), Some(KEY_ESCAPE));
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::SuperRight)), Some(KEY_RIGHT_SUPER));
    }

    #[test]
    fn every_mapped_code_fits_key_space() {
        let sample = [
            WinitKeyCode::ContextMenu,
            WinitKeyCode::NumpadEqual,
            WinitKeyCode::F12,
            WinitKeyCode::Backquote,
        ];
        for code in sample {
            let k = map_key(PhysicalKey::Code(code)).map(usize::from);
            assert!(matches!(k, Some(v) if v < KEY_COUNT));
        }
    }

    #[test]
    fn unidentified_keys_are_dropped() {
        assert_eq!(map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)), None);
        assert_eq!(map_key(PhysicalKey::Code(WinitKeyCode::F24)), None);
    }

    #[test]
    fn mouse_buttons_use_glfw_indices() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left).index(), 0);
        assert_eq!(map_mouse_button(WinitMouseButton::Right).index(), 1);
        assert_eq!(map_mouse_button(WinitMouseButton::Middle).index(), 2);
    }
}
