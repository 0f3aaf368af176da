//! Color model shared by the runtime (clear color) and geometry (vertex colors).

mod color;

pub use color::Color;
