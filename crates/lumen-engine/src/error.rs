use crate::device::{DeviceError, ShaderStage};
use crate::resources::ResourceError;

/// Errors surfaced by the render core.
///
/// Every variant is terminal for the operation that produced it: nothing is
/// retried and no partially built GPU state is kept around.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("{stage} shader '{name}' failed to compile")]
    ShaderCompile {
        stage: ShaderStage,
        name: String,
        #[source]
        source: DeviceError,
    },

    #[error("shaders '{vertex}' and '{fragment}' failed to link")]
    ShaderLink {
        vertex: String,
        fragment: String,
        #[source]
        source: DeviceError,
    },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{triangles} triangles exceed the u32 index range")]
    TooManyTriangles { triangles: usize },

    #[error("unknown scene id {0}")]
    UnknownScene(u32),

    #[error(transparent)]
    Device(#[from] DeviceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
