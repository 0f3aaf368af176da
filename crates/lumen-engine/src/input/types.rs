/// Key code in the GLFW-compatible numbering used by [`InputState`](super::InputState).
///
/// Printable keys use their uppercase ASCII value (`A` = 65); named keys start
/// at 256. See [`keys`](super::keys) for the constants.
pub type KeyCode = u16;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

impl KeyState {
    #[inline]
    pub fn is_pressed(self) -> bool {
        self == KeyState::Pressed
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// Button index in the GLFW numbering (left 0, right 1, middle 2).
    pub fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(v) => v as usize,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

impl MouseButtonState {
    #[inline]
    pub fn is_pressed(self) -> bool {
        self == MouseButtonState::Pressed
    }
}

/// Platform-agnostic input events.
///
/// The platform layer translates window-system events into these and hands them
/// to [`InputState::apply_event`](super::InputState::apply_event).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        code: KeyCode,
        state: KeyState,
    },

    /// Cursor position in logical pixels, origin top-left.
    CursorMoved {
        x: f64,
        y: f64,
    },

    MouseButton {
        button: MouseButton,
        state: MouseButtonState,
    },

    /// Scroll offset for this event; lines or logical pixels depending on the device.
    Scroll {
        dx: f64,
        dy: f64,
    },

    /// Window focus change.
    Focused(bool),
}
