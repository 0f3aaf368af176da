use crate::device::{
    BufferHandle, BufferTarget, BufferUsage, GraphicsDevice, VertexArrayHandle,
};
use crate::error::{Error, Result};

use super::Vertex;

#[derive(Debug, Copy, Clone)]
struct GpuObjects {
    vertex_array: VertexArrayHandle,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

/// Indexed triangle mesh with its device-side buffers.
///
/// Construction validates that every index names an existing vertex. Device
/// objects are created by [`init`](Self::init) and deleted by
/// [`release`](Self::release).
#[derive(Debug)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<[u32; 3]>,
    index_count: u32,
    gpu: Option<GpuObjects>,
}

/// Index count of `triangles` triangles, if it fits a `u32` draw.
fn checked_index_count(triangles: usize) -> Option<u32> {
    triangles.checked_mul(3).and_then(|n| u32::try_from(n).ok())
}

impl GeometryBuffer {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = vertices.len();
        if let Some(&index) = indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(Error::IndexOutOfRange { index, vertex_count });
        }
        let index_count = checked_index_count(indices.len())
            .ok_or(Error::TooManyTriangles { triangles: indices.len() })?;

        Ok(Self {
            vertices,
            indices,
            index_count,
            gpu: None,
        })
    }

    /// Uploads vertices and indices and records the attribute layout in a new
    /// vertex array. Calling it again on initialized geometry does nothing.
    pub fn init(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if self.gpu.is_some() {
            return Ok(());
        }

        let vertex_array = device.create_vertex_array();
        let vertex_buffer = device.create_buffer();
        let index_buffer = device.create_buffer();
        let objects = GpuObjects {
            vertex_array,
            vertex_buffer,
            index_buffer,
        };

        if let Err(e) = self.upload(device, objects) {
            device.bind_vertex_array(None);
            Self::delete_objects(device, objects);
            return Err(e);
        }

        log::debug!(
            "geometry uploaded: {} vertices, {} triangles",
            self.vertices.len(),
            self.indices.len()
        );
        self.gpu = Some(objects);
        Ok(())
    }

    fn upload(&self, device: &mut dyn GraphicsDevice, objects: GpuObjects) -> Result<()> {
        device.bind_vertex_array(Some(objects.vertex_array));

        device.bind_buffer(BufferTarget::Array, Some(objects.vertex_buffer));
        device.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(&self.vertices),
            BufferUsage::Static,
        )?;

        device.bind_buffer(BufferTarget::ElementArray, Some(objects.index_buffer));
        device.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(&self.indices),
            BufferUsage::Static,
        )?;

        for attribute in Vertex::attributes() {
            device.vertex_attrib_pointer(attribute)?;
            device.enable_vertex_attrib(attribute.location);
        }

        device.bind_buffer(BufferTarget::Array, None);
        device.bind_vertex_array(None);
        Ok(())
    }

    /// Draws every triangle with whatever program is currently active.
    pub fn draw(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        let Some(objects) = self.gpu else {
            log::warn!("draw on uninitialized geometry skipped");
            return Ok(());
        };

        device.bind_vertex_array(Some(objects.vertex_array));
        for attribute in Vertex::attributes() {
            device.enable_vertex_attrib(attribute.location);
        }

        let drawn = device.draw_indexed(self.index_count());

        for attribute in Vertex::attributes() {
            device.disable_vertex_attrib(attribute.location);
        }
        device.bind_vertex_array(None);

        drawn.map_err(Error::from)
    }

    /// Deletes the device objects. The CPU-side mesh is kept, so `init` may be
    /// called again.
    pub fn release(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(objects) = self.gpu.take() {
            Self::delete_objects(device, objects);
        }
    }

    fn delete_objects(device: &mut dyn GraphicsDevice, objects: GpuObjects) {
        device.delete_buffer(objects.vertex_buffer);
        device.delete_buffer(objects.index_buffer);
        device.delete_vertex_array(objects.vertex_array);
    }

    /// Three indices per triangle.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }
}
