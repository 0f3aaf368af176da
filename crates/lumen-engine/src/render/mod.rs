//! Render core: shader programs, indexed geometry and the vertex format they share.
//!
//! Everything here talks to the GPU through [`GraphicsDevice`](crate::device::GraphicsDevice)
//! only, so it runs unchanged against the wgpu device or a recording one.

mod geometry;
mod shader;
mod vertex;

pub use geometry::GeometryBuffer;
pub use shader::ShaderProgram;
pub use vertex::Vertex;
