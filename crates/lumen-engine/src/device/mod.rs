//! GPU device layer.
//!
//! This module is responsible for:
//! - the [`GraphicsDevice`] interface the render core is written against
//! - its wgpu implementation, [`WgpuDevice`] (Instance/Adapter/Device/Queue,
//!   Surface configuration, frame acquisition and presentation)
//! - WGSL compile/link checks that turn shader errors into logs

mod api;
mod bind_state;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod wgpu_device;
mod wgsl;

#[cfg(test)]
pub(crate) mod recording;

pub use api::{
    BufferHandle, BufferTarget, BufferUsage, GraphicsDevice, ProgramHandle, ShaderHandle,
    ShaderStage, VertexArrayHandle, VertexAttribute,
};
pub use error::{DeviceError, SurfaceErrorAction};
pub use init::GpuInit;
pub use wgpu_device::WgpuDevice;
