//! CPU-side model of the device's bind state.
//!
//! Tracks objects, current bindings, per-vertex-array attribute layout and
//! element buffer, and turns the bindings at draw time into a [`DrawBinding`].
//! Holds no GPU objects; the wgpu device keeps those keyed by the same handles.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{
    BufferHandle, BufferTarget, DeviceError, ProgramHandle, VertexArrayHandle, VertexAttribute,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct AttributeBinding {
    attribute: VertexAttribute,
    buffer: BufferHandle,
}

#[derive(Debug, Default)]
struct VertexArrayObject {
    attributes: BTreeMap<u32, AttributeBinding>,
    enabled: BTreeSet<u32>,
    element_buffer: Option<BufferHandle>,
}

/// Pipeline-relevant part of the bindings at draw time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub program: ProgramHandle,
    pub stride: u32,
    /// `(location, components, offset)` per enabled attribute, sorted by location.
    pub attributes: Vec<(u32, u32, u32)>,
}

/// Everything a draw reads, resolved from the current bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DrawBinding {
    pub key: PipelineKey,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
}

/// Built pipelines keyed by the bindings they were built for.
#[derive(Debug)]
pub(crate) struct PipelineCache<P> {
    entries: HashMap<PipelineKey, P>,
}

impl<P> Default for PipelineCache<P> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<P> PipelineCache<P> {
    pub fn get(&self, key: &PipelineKey) -> Option<&P> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: PipelineKey, pipeline: P) {
        self.entries.insert(key, pipeline);
    }

    /// Drops every pipeline built for `program`.
    pub fn evict_program(&mut self, program: ProgramHandle) {
        self.entries.retain(|k, _| k.program != program);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug)]
pub(crate) struct BindState {
    next_id: u32,

    /// Program → vertex input locations.
    programs: HashMap<ProgramHandle, BTreeSet<u32>>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexArrayObject>,
    /// Buffer → byte length of its current contents.
    buffers: HashMap<BufferHandle, u64>,

    current_program: Option<ProgramHandle>,
    current_vertex_array: Option<VertexArrayHandle>,
    array_buffer: Option<BufferHandle>,
}

impl Default for BindState {
    fn default() -> Self {
        Self {
            next_id: 1,
            programs: HashMap::new(),
            vertex_arrays: HashMap::new(),
            buffers: HashMap::new(),
            current_program: None,
            current_vertex_array: None,
            array_buffer: None,
        }
    }
}

impl BindState {
    /// Next object id. Never zero.
    pub fn next_raw(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    // ── programs ──────────────────────────────────────────────────────────

    pub fn add_program(&mut self, vertex_inputs: BTreeSet<u32>) -> ProgramHandle {
        let id = ProgramHandle(self.next_raw());
        self.programs.insert(id, vertex_inputs);
        id
    }

    pub fn remove_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    pub fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.current_program = program;
    }

    #[cfg(test)]
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    pub fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let id = VertexArrayHandle(self.next_raw());
        self.vertex_arrays.insert(id, VertexArrayObject::default());
        id
    }

    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.current_vertex_array = vertex_array;
    }

    pub fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.vertex_arrays.remove(&vertex_array);
        if self.current_vertex_array == Some(vertex_array) {
            self.current_vertex_array = None;
        }
    }

    #[cfg(test)]
    pub fn current_vertex_array(&self) -> Option<VertexArrayHandle> {
        self.current_vertex_array
    }

    fn bound_vertex_array_mut(&mut self) -> Option<&mut VertexArrayObject> {
        let id = self.current_vertex_array?;
        self.vertex_arrays.get_mut(&id)
    }

    pub fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute) -> Result<(), DeviceError> {
        if !(1..=4).contains(&attribute.components) {
            return Err(DeviceError::Unsupported(format!(
                "{}-component attribute",
                attribute.components
            )));
        }
        let buffer = self.array_buffer.ok_or(DeviceError::NothingBound("array buffer"))?;
        let vao = self
            .bound_vertex_array_mut()
            .ok_or(DeviceError::NothingBound("vertex array"))?;

        vao.attributes
            .insert(attribute.location, AttributeBinding { attribute, buffer });
        Ok(())
    }

    pub fn set_attrib_enabled(&mut self, location: u32, enabled: bool) {
        let Some(vao) = self.bound_vertex_array_mut() else {
            log::warn!("vertex attribute {location} toggled with no vertex array bound");
            return;
        };
        if enabled {
            vao.enabled.insert(location);
        } else {
            vao.enabled.remove(&location);
        }
    }

    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferHandle {
        let id = BufferHandle(self.next_raw());
        self.buffers.insert(id, 0);
        id
    }

    pub fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        if self.array_buffer == Some(buffer) {
            self.array_buffer = None;
        }
    }

    /// Binds `buffer` to `target`. The element-array binding is stored in the
    /// bound vertex array.
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => match self.bound_vertex_array_mut() {
                Some(vao) => vao.element_buffer = buffer,
                None => log::warn!("element array buffer bound with no vertex array bound; ignored"),
            },
        }
    }

    /// The buffer currently bound to `target`.
    pub fn bound_buffer(&self, target: BufferTarget) -> Result<BufferHandle, DeviceError> {
        let bound = match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self
                .current_vertex_array
                .and_then(|id| self.vertex_arrays.get(&id))
                .and_then(|vao| vao.element_buffer),
        };

        bound.ok_or(DeviceError::NothingBound(match target {
            BufferTarget::Array => "array buffer",
            BufferTarget::ElementArray => "element array buffer",
        }))
    }

    pub fn set_buffer_len(&mut self, buffer: BufferHandle, len: u64) -> Result<(), DeviceError> {
        let slot = self
            .buffers
            .get_mut(&buffer)
            .ok_or(DeviceError::InvalidHandle { kind: "buffer", raw: buffer.raw() })?;
        *slot = len;
        Ok(())
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Validates the bindings for a draw of `index_count` `u32` indices.
    pub fn resolve_draw(&self, index_count: u32) -> Result<DrawBinding, DeviceError> {
        let program = self.current_program.ok_or(DeviceError::NothingBound("program"))?;
        let vertex_inputs = self
            .programs
            .get(&program)
            .ok_or(DeviceError::InvalidHandle { kind: "program", raw: program.raw() })?;

        let vao_id = self
            .current_vertex_array
            .ok_or(DeviceError::NothingBound("vertex array"))?;
        let vao = self
            .vertex_arrays
            .get(&vao_id)
            .ok_or(DeviceError::InvalidHandle { kind: "vertex array", raw: vao_id.raw() })?;

        let mut source: Option<(BufferHandle, u32)> = None;
        let mut attributes = Vec::with_capacity(vao.enabled.len());
        for location in &vao.enabled {
            let binding = vao.attributes.get(location).ok_or_else(|| {
                DeviceError::Unsupported(format!("attribute {location} enabled without a pointer"))
            })?;

            let a = binding.attribute;
            match source {
                None => source = Some((binding.buffer, a.stride)),
                Some(s) if s == (binding.buffer, a.stride) => {}
                Some(_) => {
                    return Err(DeviceError::Unsupported(
                        "enabled attributes must share one buffer and stride".to_string(),
                    ));
                }
            }
            attributes.push((a.location, a.components, a.offset));
        }

        let enabled: BTreeSet<u32> = attributes.iter().map(|a| a.0).collect();
        if let Some(missing) = vertex_inputs.difference(&enabled).next() {
            return Err(DeviceError::Unsupported(format!(
                "vertex input location {missing} has no enabled attribute"
            )));
        }

        let (vertex_buffer, stride) = source.ok_or(DeviceError::NothingBound("vertex attribute"))?;
        let index_buffer = vao
            .element_buffer
            .ok_or(DeviceError::NothingBound("element array buffer"))?;

        let index_len = self.buffers.get(&index_buffer).copied().unwrap_or(0);
        if u64::from(index_count) * 4 > index_len {
            return Err(DeviceError::Unsupported(format!(
                "{index_count} indices exceed the {index_len}-byte element buffer"
            )));
        }

        Ok(DrawBinding {
            key: PipelineKey {
                program,
                stride,
                attributes,
            },
            vertex_buffer,
            index_buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION: VertexAttribute = VertexAttribute { location: 0, components: 3, stride: 28, offset: 0 };
    const COLOR: VertexAttribute = VertexAttribute { location: 1, components: 4, stride: 28, offset: 12 };

    struct Mesh {
        program: ProgramHandle,
        vao: VertexArrayHandle,
        vbo: BufferHandle,
        ebo: BufferHandle,
    }

    /// Program with inputs 0/1 and a vertex array holding 6 indices, everything bound.
    fn bound_mesh(state: &mut BindState) -> Mesh {
        let program = state.add_program(BTreeSet::from([0, 1]));
        let vao = state.create_vertex_array();
        let vbo = state.create_buffer();
        let ebo = state.create_buffer();

        state.bind_vertex_array(Some(vao));
        state.bind_buffer(BufferTarget::Array, Some(vbo));
        state.set_buffer_len(vbo, 4 * 28).unwrap();
        state.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        state.set_buffer_len(ebo, 6 * 4).unwrap();
        for a in [POSITION, COLOR] {
            state.vertex_attrib_pointer(a).unwrap();
            state.set_attrib_enabled(a.location, true);
        }
        state.use_program(Some(program));

        Mesh { program, vao, vbo, ebo }
    }

    // ── draw resolution ───────────────────────────────────────────────────

    #[test]
    fn resolves_full_binding() {
        let mut state = BindState::default();
        let mesh = bound_mesh(&mut state);

        let draw = state.resolve_draw(6).unwrap();
        assert_eq!(draw.key.program, mesh.program);
        assert_eq!(draw.key.stride, 28);
        assert_eq!(draw.key.attributes, vec![(0, 3, 0), (1, 4, 12)]);
        assert_eq!(draw.vertex_buffer, mesh.vbo);
        assert_eq!(draw.index_buffer, mesh.ebo);
    }

    #[test]
    fn draw_needs_program_and_vertex_array() {
        let mut state = BindState::default();
        bound_mesh(&mut state);

        state.use_program(None);
        assert_eq!(state.resolve_draw(6), Err(DeviceError::NothingBound("program")));

        let mut state = BindState::default();
        bound_mesh(&mut state);
        state.bind_vertex_array(None);
        assert_eq!(state.resolve_draw(6), Err(DeviceError::NothingBound("vertex array")));
    }

    #[test]
    fn disabled_shader_input_is_rejected() {
        let mut state = BindState::default();
        bound_mesh(&mut state);
        state.set_attrib_enabled(1, false);

        assert!(matches!(state.resolve_draw(6), Err(DeviceError::Unsupported(m)) if m.contains("location 1")));
    }

    #[test]
    fn enabled_attribute_without_pointer_is_rejected() {
        let mut state = BindState::default();
        bound_mesh(&mut state);
        state.set_attrib_enabled(5, true);

        assert!(matches!(state.resolve_draw(6), Err(DeviceError::Unsupported(m)) if m.contains("attribute 5")));
    }

    #[test]
    fn mixed_strides_are_rejected() {
        let mut state = BindState::default();
        bound_mesh(&mut state);
        state
            .vertex_attrib_pointer(VertexAttribute { stride: 32, ..COLOR })
            .unwrap();

        assert!(matches!(state.resolve_draw(6), Err(DeviceError::Unsupported(_))));
    }

    #[test]
    fn index_count_is_bounded_by_element_buffer() {
        let mut state = BindState::default();
        bound_mesh(&mut state);

        assert!(state.resolve_draw(6).is_ok());
        assert!(matches!(state.resolve_draw(7), Err(DeviceError::Unsupported(m)) if m.contains("24-byte")));
    }

    #[test]
    fn attribute_pointer_needs_array_buffer_and_valid_components() {
        let mut state = BindState::default();
        let vao = state.create_vertex_array();
        state.bind_vertex_array(Some(vao));

        assert_eq!(state.vertex_attrib_pointer(POSITION), Err(DeviceError::NothingBound("array buffer")));

        let vbo = state.create_buffer();
        state.bind_buffer(BufferTarget::Array, Some(vbo));
        assert!(matches!(
            state.vertex_attrib_pointer(VertexAttribute { components: 5, ..POSITION }),
            Err(DeviceError::Unsupported(_))
        ));
    }

    // ── element buffer per vertex array ───────────────────────────────────

    #[test]
    fn element_binding_belongs_to_the_vertex_array() {
        let mut state = BindState::default();
        let mesh = bound_mesh(&mut state);

        let other = state.create_vertex_array();
        state.bind_vertex_array(Some(other));
        assert_eq!(
            state.bound_buffer(BufferTarget::ElementArray),
            Err(DeviceError::NothingBound("element array buffer"))
        );

        state.bind_vertex_array(Some(mesh.vao));
        assert_eq!(state.bound_buffer(BufferTarget::ElementArray), Ok(mesh.ebo));
        // The array-buffer binding is global.
        assert_eq!(state.bound_buffer(BufferTarget::Array), Ok(mesh.vbo));
    }

    #[test]
    fn element_binding_without_vertex_array_is_ignored() {
        let mut state = BindState::default();
        let ebo = state.create_buffer();
        state.bind_buffer(BufferTarget::ElementArray, Some(ebo));

        let vao = state.create_vertex_array();
        state.bind_vertex_array(Some(vao));
        assert!(state.bound_buffer(BufferTarget::ElementArray).is_err());
    }

    // ── deletion ──────────────────────────────────────────────────────────

    #[test]
    fn deleting_bound_objects_clears_bindings() {
        let mut state = BindState::default();
        let mesh = bound_mesh(&mut state);

        state.remove_program(mesh.program);
        state.delete_vertex_array(mesh.vao);
        state.delete_buffer(mesh.vbo);

        assert_eq!(state.current_program(), None);
        assert_eq!(state.current_vertex_array(), None);
        assert!(state.bound_buffer(BufferTarget::Array).is_err());
        assert!(state.set_buffer_len(mesh.vbo, 4).is_err());
    }

    #[test]
    fn ids_are_unique_and_nonzero() {
        let mut state = BindState::default();
        let a = state.create_buffer();
        let b = state.create_vertex_array();
        let c = state.add_program(BTreeSet::new());
        let ids = BTreeSet::from([a.raw(), b.raw(), c.raw()]);
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&0));
    }

    // ── pipeline cache ────────────────────────────────────────────────────

    #[test]
    fn deleting_a_program_evicts_only_its_pipelines() {
        let mut state = BindState::default();
        let mesh = bound_mesh(&mut state);
        let other = state.add_program(BTreeSet::from([0, 1]));

        let mut cache = PipelineCache::default();
        let key = state.resolve_draw(6).unwrap().key;
        cache.insert(key.clone(), "mesh");
        state.use_program(Some(other));
        let other_key = state.resolve_draw(6).unwrap().key;
        cache.insert(other_key.clone(), "other");
        assert_eq!(cache.len(), 2);

        cache.evict_program(mesh.program);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.get(&other_key), Some(&"other"));
    }
}
