//! Lumen engine crate.
//!
//! A small real-time rendering harness: one window, one frame loop and one
//! active scene that draws an indexed mesh with a shader program.

pub mod device;
pub mod input;
pub mod render;
pub mod resources;
pub mod scene;
pub mod time;
pub mod window;

pub mod logging;
pub mod paint;

mod error;

pub use error::{Error, Result};
