use super::keys::{KEY_COUNT, MOUSE_BUTTON_COUNT};
use super::types::{InputEvent, KeyCode};

/// Keyboard and mouse state for one window.
///
/// Owned by the runtime and handed to the platform by `&mut` while events are
/// pumped; scenes read it through their update context. Mutators are plain
/// field assignments so dispatch during event polling is reentrant-safe.
#[derive(Debug, Clone)]
pub struct InputState {
    keys: [bool; KEY_COUNT],
    buttons: [bool; MOUSE_BUTTON_COUNT],

    x: f64,
    y: f64,
    last_x: f64,
    last_y: f64,

    scroll_x: f64,
    scroll_y: f64,

    dragging: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    /// Creates a state with nothing held and the cursor at the origin.
    ///
    /// Position and previous position start equal so the first frame reports a
    /// zero cursor delta.
    pub fn new() -> Self {
        Self {
            keys: [false; KEY_COUNT],
            buttons: [false; MOUSE_BUTTON_COUNT],
            x: 0.0,
            y: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            dragging: false,
        }
    }

    /// Applies a platform-agnostic event.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { code, state } => self.on_key(code, state.is_pressed()),
            InputEvent::CursorMoved { x, y } => self.on_mouse_move(x, y),
            InputEvent::MouseButton { button, state } => {
                self.on_mouse_button(button.index(), state.is_pressed())
            }
            InputEvent::Scroll { dx, dy } => self.on_scroll(dx, dy),
            InputEvent::Focused(focused) => {
                if !focused {
                    // Release everything on focus loss so keys do not stick when the
                    // release happens in another window.
                    self.keys = [false; KEY_COUNT];
                    self.buttons = [false; MOUSE_BUTTON_COUNT];
                    self.dragging = false;
                }
            }
        }
    }

    // ── mutators ──────────────────────────────────────────────────────────

    /// Sets the pressed flag for `code`. Codes outside the tracked range are ignored.
    pub fn on_key(&mut self, code: KeyCode, pressed: bool) {
        match self.keys.get_mut(code as usize) {
            Some(slot) => *slot = pressed,
            None => log::trace!("ignoring out-of-range key code {code}"),
        }
    }

    /// Moves the cursor. The previous current position becomes the last position.
    pub fn on_mouse_move(&mut self, x: f64, y: f64) {
        self.last_x = self.x;
        self.last_y = self.y;
        self.x = x;
        self.y = y;
        self.dragging = self.buttons.iter().any(|&b| b);
    }

    /// Sets the pressed flag for `button`. Indices past the tracked buttons are ignored.
    ///
    /// Any release clears the dragging flag, even when another button is still held.
    pub fn on_mouse_button(&mut self, button: usize, pressed: bool) {
        let Some(slot) = self.buttons.get_mut(button) else {
            log::trace!("ignoring out-of-range mouse button {button}");
            return;
        };

        *slot = pressed;
        if !pressed {
            self.dragging = false;
        }
    }

    /// Stores the scroll offset for the current frame.
    pub fn on_scroll(&mut self, dx: f64, dy: f64) {
        self.scroll_x = dx;
        self.scroll_y = dy;
    }

    /// Closes the frame: zeroes scroll and snapshots the cursor position.
    ///
    /// Called once per loop iteration, after the scene update.
    pub fn end_frame(&mut self) {
        self.scroll_x = 0.0;
        self.scroll_y = 0.0;
        self.last_x = self.x;
        self.last_y = self.y;
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.keys.get(code as usize).copied().unwrap_or(false)
    }

    pub fn mouse_button_down(&self, button: usize) -> bool {
        self.buttons.get(button).copied().unwrap_or(false)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Horizontal cursor delta, previous minus current.
    pub fn dx(&self) -> f64 {
        self.last_x - self.x
    }

    /// Vertical cursor delta, previous minus current.
    pub fn dy(&self) -> f64 {
        self.last_y - self.y
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keys::{KEY_A, KEY_B, KEY_ESCAPE};
    use crate::input::{KeyState, MouseButton, MouseButtonState};

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn key_press_then_release() {
        let mut input = InputState::new();

        input.on_key(KEY_A, true);
        assert!(input.is_key_pressed(KEY_A));
        assert!(!input.is_key_pressed(KEY_B));

        input.on_key(KEY_A, false);
        assert!(!input.is_key_pressed(KEY_A));
        assert!((0..KEY_COUNT as KeyCode).all(|k| !input.is_key_pressed(k)));
    }

    #[test]
    fn out_of_range_key_is_ignored() {
        let mut input = InputState::new();
        input.on_key(KEY_COUNT as KeyCode, true);
        input.on_key(u16::MAX, true);
        assert!(!input.is_key_pressed(KEY_COUNT as KeyCode));
        assert!((0..KEY_COUNT as KeyCode).all(|k| !input.is_key_pressed(k)));
    }

    #[test]
    fn key_events_dispatch() {
        let mut input = InputState::new();
        input.apply_event(InputEvent::Key { code: KEY_ESCAPE, state: KeyState::Pressed });
        assert!(input.is_key_pressed(KEY_ESCAPE));
        input.apply_event(InputEvent::Key { code: KEY_ESCAPE, state: KeyState::Released });
        assert!(!input.is_key_pressed(KEY_ESCAPE));
    }

    // ── cursor ────────────────────────────────────────────────────────────

    #[test]
    fn mouse_move_tracks_previous_position() {
        let mut input = InputState::new();
        input.on_mouse_move(10.0, 20.0);
        input.on_mouse_move(15.0, 18.0);

        assert_eq!((input.x(), input.y()), (15.0, 18.0));
        assert_eq!(input.dx(), -5.0);
        assert_eq!(input.dy(), 2.0);
    }

    #[test]
    fn end_frame_snapshots_position() {
        let mut input = InputState::new();
        input.on_mouse_move(4.0, 8.0);
        input.end_frame();
        assert_eq!(input.dx(), 0.0);
        assert_eq!(input.dy(), 0.0);
    }

    // ── buttons / dragging ────────────────────────────────────────────────

    #[test]
    fn move_with_button_held_is_dragging() {
        let mut input = InputState::new();
        input.on_mouse_move(1.0, 1.0);
        assert!(!input.is_dragging());

        input.on_mouse_button(0, true);
        assert!(!input.is_dragging());

        input.on_mouse_move(2.0, 2.0);
        assert!(input.is_dragging());
    }

    #[test]
    fn release_clears_dragging_even_with_other_button_held() {
        let mut input = InputState::new();
        input.on_mouse_button(0, true);
        input.on_mouse_button(1, true);
        input.on_mouse_move(3.0, 3.0);
        assert!(input.is_dragging());

        input.on_mouse_button(1, false);
        assert!(!input.is_dragging());
        assert!(input.mouse_button_down(0));
        assert!(!input.mouse_button_down(1));
    }

    #[test]
    fn out_of_range_button_is_ignored() {
        let mut input = InputState::new();
        input.on_mouse_button(0, true);
        input.on_mouse_move(1.0, 0.0);
        input.on_mouse_button(MOUSE_BUTTON_COUNT, false);

        assert!(input.is_dragging());
        assert!(!input.mouse_button_down(MOUSE_BUTTON_COUNT));
    }

    #[test]
    fn extra_mouse_buttons_do_not_register() {
        let mut input = InputState::new();
        input.apply_event(InputEvent::MouseButton {
            button: MouseButton::Back,
            state: MouseButtonState::Pressed,
        });
        assert!((0..MOUSE_BUTTON_COUNT).all(|b| !input.mouse_button_down(b)));
    }

    // ── scroll ────────────────────────────────────────────────────────────

    #[test]
    fn scroll_is_per_frame() {
        let mut input = InputState::new();
        input.on_scroll(1.0, -2.0);
        input.on_scroll(0.5, 3.0);
        assert_eq!((input.scroll_x(), input.scroll_y()), (0.5, 3.0));

        input.end_frame();
        assert_eq!((input.scroll_x(), input.scroll_y()), (0.0, 0.0));
        input.end_frame();
        assert_eq!((input.scroll_x(), input.scroll_y()), (0.0, 0.0));
    }

    // ── focus ─────────────────────────────────────────────────────────────

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = InputState::new();
        input.on_key(KEY_A, true);
        input.on_mouse_button(2, true);
        input.on_mouse_move(5.0, 5.0);

        input.apply_event(InputEvent::Focused(false));

        assert!(!input.is_key_pressed(KEY_A));
        assert!(!input.mouse_button_down(2));
        assert!(!input.is_dragging());
    }
}
