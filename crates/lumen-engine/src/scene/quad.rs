use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::input::keys::{KEY_1, KEY_2};
use crate::paint::Color;
use crate::render::{GeometryBuffer, ShaderProgram, Vertex};
use crate::resources::ResourceLoader;
use crate::time::FrameTime;

use super::{Scene, SceneCtx, SceneId};

/// What a [`QuadScene`] draws and how.
#[derive(Debug, Clone)]
pub struct QuadSceneConfig {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub vertices: Vec<Vertex>,
    /// Counter-clockwise index triples into `vertices`.
    pub triangles: Vec<[u32; 3]>,
    pub clear_color: Color,
}

impl QuadSceneConfig {
    /// Four-colored unit quad on white.
    pub fn level_editor() -> Self {
        Self {
            vertex_shader: "shaders/quad.vert.wgsl".to_string(),
            fragment_shader: "shaders/quad.frag.wgsl".to_string(),
            vertices: quad_vertices(),
            triangles: QUAD_TRIANGLES.to_vec(),
            clear_color: Color::WHITE,
        }
    }

    /// Same quad with inverted colors on a dark background.
    pub fn level() -> Self {
        Self {
            fragment_shader: "shaders/invert.frag.wgsl".to_string(),
            clear_color: Color::new(0.08, 0.08, 0.1, 1.0),
            ..Self::level_editor()
        }
    }
}

const QUAD_TRIANGLES: [[u32; 3]; 2] = [[2, 1, 0], [0, 1, 3]];

fn quad_vertices() -> Vec<Vertex> {
    vec![
        // bottom right, top left, top right, bottom left
        Vertex::new([0.5, -0.5, 0.0], Color::new(1.0, 0.0, 0.0, 1.0)),
        Vertex::new([-0.5, 0.5, 0.0], Color::new(0.0, 1.0, 0.0, 1.0)),
        Vertex::new([0.5, 0.5, 0.0], Color::new(0.0, 0.0, 1.0, 1.0)),
        Vertex::new([-0.5, -0.5, 0.0], Color::new(1.0, 1.0, 0.0, 1.0)),
    ]
}

/// One shader program drawing one indexed mesh.
///
/// Keys `1` and `2` request the level editor and level scenes respectively.
#[derive(Debug)]
pub struct QuadScene {
    id: SceneId,
    config: QuadSceneConfig,
    program: Option<ShaderProgram>,
    geometry: Option<GeometryBuffer>,
}

impl QuadScene {
    pub fn new(id: SceneId, config: QuadSceneConfig) -> Self {
        Self {
            id,
            config,
            program: None,
            geometry: None,
        }
    }

    fn build(
        &self,
        device: &mut dyn GraphicsDevice,
        resources: &dyn ResourceLoader,
    ) -> Result<(ShaderProgram, GeometryBuffer)> {
        let mut geometry =
            GeometryBuffer::new(self.config.vertices.clone(), self.config.triangles.clone())?;
        let mut program = ShaderProgram::load(
            resources,
            &self.config.vertex_shader,
            &self.config.fragment_shader,
        )?;

        program.compile(device)?;
        if let Err(e) = geometry.init(device) {
            program.release(device);
            return Err(e);
        }

        Ok((program, geometry))
    }

    fn requested_scene(&self, ctx: &SceneCtx<'_>) -> Option<SceneId> {
        let target = if ctx.input.is_key_pressed(KEY_1) {
            SceneId::LevelEditor
        } else if ctx.input.is_key_pressed(KEY_2) {
            SceneId::Level
        } else {
            return None;
        };

        (target != self.id).then_some(target)
    }
}

impl Scene for QuadScene {
    fn init(&mut self, device: &mut dyn GraphicsDevice, resources: &dyn ResourceLoader) -> Result<()> {
        self.release(device);

        let (program, geometry) = self.build(device, resources)?;
        self.program = Some(program);
        self.geometry = Some(geometry);

        log::info!("scene '{}' initialized", self.id);
        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneCtx<'_>, _time: FrameTime) -> Result<()> {
        ctx.set_clear_color(self.config.clear_color);

        if let (Some(program), Some(geometry)) = (self.program.as_mut(), self.geometry.as_ref()) {
            program.bind(ctx.device);
            let drawn = geometry.draw(ctx.device);
            program.detach(ctx.device);
            drawn?;
        }

        if let Some(next) = self.requested_scene(ctx) {
            ctx.request_scene(next);
        }
        Ok(())
    }

    fn release(&mut self, device: &mut dyn GraphicsDevice) {
        let had_resources = self.program.is_some() || self.geometry.is_some();

        if let Some(mut program) = self.program.take() {
            program.release(device);
        }
        if let Some(mut geometry) = self.geometry.take() {
            geometry.release(device);
        }

        if had_resources {
            log::debug!("scene '{}' released its GPU resources", self.id);
        }
    }
}
