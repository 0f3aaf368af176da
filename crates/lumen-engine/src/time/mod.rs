//! Time subsystem.
//!
//! Frame timing without coupling to the runtime:
//! - one `FrameClock` per render loop
//! - read `current()` before updating, call `end_frame(now)` after presenting

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
