//! Text resource loading.
//!
//! Shader sources are fetched by name through [`ResourceLoader`]. Names are
//! slash-separated relative paths such as `shaders/quad.vert.wgsl`.

mod loader;

pub use loader::{DirResources, EmbeddedResources, Layered, ResourceError, ResourceLoader};
