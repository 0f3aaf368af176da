use crate::paint::Color;

use super::DeviceError;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Compiled shader stage object.
    ShaderHandle
);
handle!(
    /// Linked program object.
    ProgramHandle
);
handle!(
    /// Vertex-array object: attribute layout plus the bound index buffer.
    VertexArrayHandle
);
handle!(
    /// Buffer object.
    BufferHandle
);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data. The binding is global device state.
    Array,
    /// Index data. The binding is recorded in the bound vertex array.
    ElementArray,
}

/// Expected update frequency of buffer contents.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    Static,
}

/// Float vertex attribute layout inside the currently bound array buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components (1–4).
    pub components: u32,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the first component inside a vertex.
    pub offset: u32,
}

/// Device-driver interface used by the render core.
///
/// The interface is a small bind-to-edit state machine: programs and vertex
/// arrays are made current with `use_program`/`bind_vertex_array`, buffer data
/// and attribute pointers apply to whatever is bound, and `draw_indexed` reads
/// the current bindings. All calls are synchronous and happen on the thread
/// that owns the window.
pub trait GraphicsDevice {
    /// Sets the color used by [`clear`](Self::clear).
    fn set_clear_color(&mut self, color: Color);

    /// Clears the framebuffer for the current frame.
    fn clear(&mut self);

    /// Compiles one shader stage. The error carries the full compiler log.
    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, DeviceError>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Links a vertex and a fragment stage into a program.
    ///
    /// The stages are not consumed; callers delete them once linking is done.
    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, DeviceError>;

    fn delete_program(&mut self, program: ProgramHandle);

    /// Makes `program` the active program, or clears it with `None`.
    fn use_program(&mut self, program: Option<ProgramHandle>);

    fn create_vertex_array(&mut self) -> VertexArrayHandle;

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    fn create_buffer(&mut self) -> BufferHandle;

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);

    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError>;

    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Describes an attribute of the bound vertex array, sourced from the bound
    /// array buffer.
    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute) -> Result<(), DeviceError>;

    fn enable_vertex_attrib(&mut self, location: u32);

    fn disable_vertex_attrib(&mut self, location: u32);

    /// Draws `index_count` `u32` indices as a triangle list using the active
    /// program and the bound vertex array.
    fn draw_indexed(&mut self, index_count: u32) -> Result<(), DeviceError>;
}
