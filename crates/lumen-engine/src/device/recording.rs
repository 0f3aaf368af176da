//! In-memory [`GraphicsDevice`] that records every call, for tests.

use std::collections::BTreeSet;

use crate::paint::Color;

use super::{
    BufferHandle, BufferTarget, BufferUsage, DeviceError, GraphicsDevice, ProgramHandle,
    ShaderHandle, ShaderStage, VertexArrayHandle, VertexAttribute,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    SetClearColor(Color),
    Clear,
    CreateShader(ShaderStage, ShaderHandle),
    DeleteShader(ShaderHandle),
    LinkProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    CreateVertexArray(VertexArrayHandle),
    BindVertexArray(Option<VertexArrayHandle>),
    DeleteVertexArray(VertexArrayHandle),
    CreateBuffer(BufferHandle),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    DeleteBuffer(BufferHandle),
    VertexAttribPointer(VertexAttribute),
    EnableVertexAttrib(u32),
    DisableVertexAttrib(u32),
    DrawIndexed(u32),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingDevice {
    pub calls: Vec<Call>,
    /// Makes `create_shader` fail for this stage.
    pub fail_compile: Option<ShaderStage>,
    /// Makes `link_program` fail.
    pub fail_link: bool,

    pub current_program: Option<ProgramHandle>,
    pub current_vertex_array: Option<VertexArrayHandle>,

    next_id: u32,
    live: BTreeSet<u32>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of device objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.live.len()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn draws(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::DrawIndexed(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn attribute_pointers(&self) -> Vec<VertexAttribute> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::VertexAttribPointer(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.live.insert(self.next_id);
        self.next_id
    }
}

impl GraphicsDevice for RecordingDevice {
    fn set_clear_color(&mut self, color: Color) {
        self.calls.push(Call::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn create_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderHandle, DeviceError> {
        if self.fail_compile == Some(stage) {
            return Err(DeviceError::Compile {
                stage,
                log: "error: expected ';' at 3:14".to_string(),
            });
        }
        let h = ShaderHandle(self.alloc());
        self.calls.push(Call::CreateShader(stage, h));
        Ok(h)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.live.remove(&shader.0);
        self.calls.push(Call::DeleteShader(shader));
    }

    fn link_program(
        &mut self,
        _vertex: ShaderHandle,
        _fragment: ShaderHandle,
    ) -> Result<ProgramHandle, DeviceError> {
        if self.fail_link {
            return Err(DeviceError::Link {
                log: "fragment input 0 not written".to_string(),
            });
        }
        let h = ProgramHandle(self.alloc());
        self.calls.push(Call::LinkProgram(h));
        Ok(h)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.live.remove(&program.0);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
        self.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.current_program = program;
        self.calls.push(Call::UseProgram(program));
    }

    fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let h = VertexArrayHandle(self.alloc());
        self.calls.push(Call::CreateVertexArray(h));
        h
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.current_vertex_array = vertex_array;
        self.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.live.remove(&vertex_array.0);
        self.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&mut self) -> BufferHandle {
        let h = BufferHandle(self.alloc());
        self.calls.push(Call::CreateBuffer(h));
        h
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        self.calls.push(Call::BindBuffer(target, buffer));
    }

    fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError> {
        self.calls.push(Call::BufferData { target, len: data.len(), usage });
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.live.remove(&buffer.0);
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute) -> Result<(), DeviceError> {
        self.calls.push(Call::VertexAttribPointer(attribute));
        Ok(())
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.calls.push(Call::EnableVertexAttrib(location));
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.calls.push(Call::DisableVertexAttrib(location));
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), DeviceError> {
        self.calls.push(Call::DrawIndexed(index_count));
        Ok(())
    }
}
