use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::paint::Color;

use super::bind_state::{BindState, PipelineCache, PipelineKey};
use super::frame::GpuFrame;
use super::gpu::Gpu;
use super::wgsl::{self, StageInterface};
use super::{
    BufferHandle, BufferTarget, BufferUsage, DeviceError, GpuInit, GraphicsDevice, ProgramHandle,
    ShaderHandle, ShaderStage, SurfaceErrorAction, VertexArrayHandle, VertexAttribute,
};

struct ShaderObject {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    interface: StageInterface,
}

struct ProgramObject {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
}

/// Pipeline description independent of where the vertex data comes from.
struct PipelineSpec<'a> {
    label: &'static str,
    program: &'a ProgramObject,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
}

/// [`GraphicsDevice`] backed by wgpu.
///
/// Bind state (active program, bound vertex array, array-buffer binding) lives on
/// the CPU side in [`BindState`]. Draws turn that state into a cached render
/// pipeline and record one render pass into the frame's encoder. The frame is
/// acquired lazily by the first clear or draw of an iteration and submitted by
/// [`present`](Self::present).
///
/// Shader modules and pipelines are created inside validation error scopes, so
/// wgpu validation failures come back as [`DeviceError`]s.
pub struct WgpuDevice {
    gpu: Gpu,
    shader_caps: naga::valid::Capabilities,

    clear_color: Color,
    frame: Option<GpuFrame>,
    /// Set when acquiring this iteration's frame failed; draws are skipped until present.
    frame_skipped: bool,
    lost: bool,

    state: BindState,
    shaders: HashMap<ShaderHandle, ShaderObject>,
    programs: HashMap<ProgramHandle, ProgramObject>,
    /// Buffers with non-empty contents.
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    pipelines: PipelineCache<wgpu::RenderPipeline>,
}

impl WgpuDevice {
    /// Creates the wgpu context for `window`. Blocks until the adapter and device are ready.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window, init))?;
        let shader_caps = wgsl::capabilities(gpu.device().features());

        Ok(Self {
            gpu,
            shader_caps,
            clear_color: Color::BLACK,
            frame: None,
            frame_skipped: false,
            lost: false,
            state: BindState::default(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            pipelines: PipelineCache::default(),
        })
    }

    /// Reconfigures the surface for a new drawable size.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Submits this iteration's commands and presents the frame.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            log::trace!("presenting frame with {} draw call(s)", frame.draw_calls);
            frame.present(self.gpu.queue());
        }
        self.frame_skipped = false;
    }

    /// True once the surface reported an unrecoverable error.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu.surface_format()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    /// Runs `f` inside a validation error scope and returns what the scope caught.
    fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<String>) {
        let device = self.gpu.device();
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(device);
        let error = pollster::block_on(scope.pop()).map(|e| e.to_string());
        (value, error)
    }

    fn ensure_frame(&mut self) -> Option<&mut GpuFrame> {
        if self.frame.is_none() && !self.frame_skipped {
            match self.gpu.begin_frame() {
                Ok(frame) => self.frame = Some(frame),
                Err(err) => {
                    let reason = err.to_string();
                    match self.gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => {
                            log::error!("surface lost: {reason}");
                            self.lost = true;
                        }
                        SurfaceErrorAction::Reconfigured => {
                            log::debug!("surface reconfigured after '{reason}'; skipping frame")
                        }
                        SurfaceErrorAction::SkipFrame => log::debug!("skipping frame: {reason}"),
                    }
                    self.frame_skipped = true;
                }
            }
        }
        self.frame.as_mut()
    }

    fn wgpu_buffer(&self, handle: BufferHandle, what: &'static str) -> Result<wgpu::Buffer, DeviceError> {
        self.buffers
            .get(&handle)
            .cloned()
            .ok_or(DeviceError::NothingBound(what))
    }

    fn build_pipeline(&self, spec: PipelineSpec<'_>) -> (wgpu::RenderPipeline, Option<String>) {
        let format = self.gpu.surface_format();
        self.validated(|device| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(spec.label),
                layout: Some(&spec.program.layout),

                vertex: wgpu::VertexState {
                    module: &spec.program.vertex,
                    entry_point: None,
                    compilation_options: Default::default(),
                    buffers: spec.buffers,
                },

                fragment: Some(wgpu::FragmentState {
                    module: &spec.program.fragment,
                    entry_point: None,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        })
    }

    /// Builds a throwaway pipeline feeding every vertex input from its own
    /// tightly packed buffer, so stage and target mismatches surface at link time.
    fn check_program(
        &self,
        program: &ProgramObject,
        inputs: &BTreeMap<u32, u32>,
    ) -> Result<(), String> {
        let attributes = inputs
            .iter()
            .map(|(&location, &components)| {
                float_format(components).map(|format| wgpu::VertexAttribute {
                    format,
                    offset: 0,
                    shader_location: location,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = attributes
            .iter()
            .map(|a| wgpu::VertexBufferLayout {
                array_stride: a.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: std::slice::from_ref(a),
            })
            .collect();

        let limit = self.gpu.device().limits().max_vertex_buffers as usize;
        if buffers.len() > limit {
            log::debug!(
                "{} vertex inputs exceed {limit} buffers; link-time pipeline check skipped",
                buffers.len()
            );
            return Ok(());
        }

        let (_, error) = self.build_pipeline(PipelineSpec {
            label: "lumen link check",
            program,
            buffers: &buffers,
        });
        error.map_or(Ok(()), Err)
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) -> Result<wgpu::RenderPipeline, DeviceError> {
        if let Some(p) = self.pipelines.get(key) {
            return Ok(p.clone());
        }

        let program = self
            .programs
            .get(&key.program)
            .ok_or(DeviceError::InvalidHandle { kind: "program", raw: key.program.raw() })?;

        let attributes = key
            .attributes
            .iter()
            .map(|&(location, components, offset)| {
                Ok(wgpu::VertexAttribute {
                    format: float_format(components)?,
                    offset: u64::from(offset),
                    shader_location: location,
                })
            })
            .collect::<Result<Vec<_>, DeviceError>>()?;

        let (pipeline, error) = self.build_pipeline(PipelineSpec {
            label: "lumen program pipeline",
            program,
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: u64::from(key.stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &attributes,
            }],
        });
        if let Some(log) = error {
            return Err(DeviceError::Pipeline { log });
        }

        log::debug!(
            "built pipeline for program {} (stride {}, {} attribute(s))",
            key.program.raw(),
            key.stride,
            key.attributes.len()
        );

        self.pipelines.insert(key.clone(), pipeline.clone());
        Ok(pipeline)
    }
}

fn float_format(components: u32) -> Result<wgpu::VertexFormat, DeviceError> {
    match components {
        1 => Ok(wgpu::VertexFormat::Float32),
        2 => Ok(wgpu::VertexFormat::Float32x2),
        3 => Ok(wgpu::VertexFormat::Float32x3),
        4 => Ok(wgpu::VertexFormat::Float32x4),
        n => Err(DeviceError::Unsupported(format!("{n}-component attribute"))),
    }
}

impl GraphicsDevice for WgpuDevice {
    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        let color = self.clear_color;
        let Some(frame) = self.ensure_frame() else { return };

        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, DeviceError> {
        let interface = wgsl::check_stage(stage, source, self.shader_caps)
            .map_err(|log| DeviceError::Compile { stage, log })?;

        let (module, error) = self.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "lumen vertex stage",
                    ShaderStage::Fragment => "lumen fragment stage",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        });
        if let Some(log) = error {
            return Err(DeviceError::Compile { stage, log });
        }

        let id = ShaderHandle(self.state.next_raw());
        self.shaders.insert(id, ShaderObject { stage, module, interface });
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, DeviceError> {
        let lookup = |h: ShaderHandle, stage: ShaderStage| {
            let s = self
                .shaders
                .get(&h)
                .ok_or(DeviceError::InvalidHandle { kind: "shader", raw: h.raw() })?;
            if s.stage != stage {
                return Err(DeviceError::StageMismatch(h));
            }
            Ok(s)
        };

        let vs = lookup(vertex, ShaderStage::Vertex)?;
        let fs = lookup(fragment, ShaderStage::Fragment)?;

        wgsl::check_link(&vs.interface, &fs.interface).map_err(|log| DeviceError::Link { log })?;

        let layout = self
            .gpu
            .device()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("lumen program layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let object = ProgramObject {
            vertex: vs.module.clone(),
            fragment: fs.module.clone(),
            layout,
        };
        let vertex_inputs = vs.interface.inputs.clone();
        let float_inputs = vs.interface.float_input_components.clone();

        self.check_program(&object, &float_inputs)
            .map_err(|log| DeviceError::Link { log })?;

        let id = self.state.add_program(vertex_inputs);
        self.programs.insert(id, object);
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.pipelines.evict_program(program);
        self.state.remove_program(program);
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.state.use_program(program);
    }

    fn create_vertex_array(&mut self) -> VertexArrayHandle {
        self.state.create_vertex_array()
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.state.bind_vertex_array(vertex_array);
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.state.delete_vertex_array(vertex_array);
    }

    fn create_buffer(&mut self) -> BufferHandle {
        self.state.create_buffer()
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        self.state.bind_buffer(target, buffer);
    }

    fn buffer_data(
        &mut self,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), DeviceError> {
        let handle = self.state.bound_buffer(target)?;
        self.state.set_buffer_len(handle, data.len() as u64)?;

        if let Some(old) = self.buffers.remove(&handle) {
            old.destroy();
        }
        if data.is_empty() {
            return Ok(());
        }

        let role = match target {
            BufferTarget::Array => wgpu::BufferUsages::VERTEX,
            BufferTarget::ElementArray => wgpu::BufferUsages::INDEX,
        };
        let extra = match usage {
            BufferUsage::Static => wgpu::BufferUsages::empty(),
        };
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("lumen buffer"),
                contents: data,
                usage: role | extra,
            });

        self.buffers.insert(handle, buffer);
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        if let Some(b) = self.buffers.remove(&buffer) {
            b.destroy();
        }
        self.state.delete_buffer(buffer);
    }

    fn vertex_attrib_pointer(&mut self, attribute: VertexAttribute) -> Result<(), DeviceError> {
        self.state.vertex_attrib_pointer(attribute)
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        self.state.set_attrib_enabled(location, true);
    }

    fn disable_vertex_attrib(&mut self, location: u32) {
        self.state.set_attrib_enabled(location, false);
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<(), DeviceError> {
        if index_count == 0 {
            return Ok(());
        }

        let draw = self.state.resolve_draw(index_count)?;
        let vertex_buffer = self.wgpu_buffer(draw.vertex_buffer, "array buffer data")?;
        let index_buffer = self.wgpu_buffer(draw.index_buffer, "element array buffer data")?;
        let pipeline = self.ensure_pipeline(&draw.key)?;

        let Some(frame) = self.ensure_frame() else {
            return Ok(());
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen draw"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&pipeline);
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..index_count, 0, 0..1);
        }

        frame.draw_calls += 1;
        Ok(())
    }
}
