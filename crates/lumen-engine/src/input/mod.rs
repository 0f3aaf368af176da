//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform::winit` translates window events into `InputEvent`s.

pub mod keys;
pub(crate) mod platform;
mod state;
mod types;

pub use state::InputState;
pub use types::{InputEvent, KeyCode, KeyState, MouseButton, MouseButtonState};
