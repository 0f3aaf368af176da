//! Window + runtime loop.
//!
//! [`Platform`] abstracts the OS window and its graphics context;
//! [`WinitPlatform`] is the winit/wgpu implementation. [`Runtime`] owns a
//! platform, the input state and the active scene, and runs the frame loop.

mod config;
mod platform;
mod runtime;
mod winit_platform;

pub use config::{RuntimeConfig, WindowConfig};
pub use platform::Platform;
pub use runtime::{Runtime, SceneFactory};
pub use winit_platform::WinitPlatform;
