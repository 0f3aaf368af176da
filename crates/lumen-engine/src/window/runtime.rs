use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::input::InputState;
use crate::paint::Color;
use crate::resources::ResourceLoader;
use crate::scene::{self, Scene, SceneCommand, SceneCommands, SceneCtx, SceneId};
use crate::time::FrameClock;

use super::{Platform, RuntimeConfig};

/// Builds a scene for an id. The runtime uses [`scene::create`] unless told otherwise.
pub type SceneFactory = Box<dyn FnMut(SceneId) -> Box<dyn Scene>>;

struct ActiveScene {
    id: SceneId,
    scene: Box<dyn Scene>,
}

/// Frame loop driving one active scene on a [`Platform`].
///
/// Per iteration: poll events into the input state, clear, update the scene
/// (from the second iteration on), present, advance the clock, end the input
/// frame and apply whatever the scene requested.
pub struct Runtime<P: Platform> {
    platform: P,
    resources: Box<dyn ResourceLoader>,
    factory: SceneFactory,

    input: InputState,
    clock: FrameClock,
    clear_color: Color,
    initial_scene: SceneId,
    commands: SceneCommands,

    active: Option<ActiveScene>,
}

impl<P: Platform> Runtime<P> {
    pub fn new(platform: P, resources: Box<dyn ResourceLoader>, config: RuntimeConfig) -> Self {
        Self::with_factory(platform, resources, config, Box::new(scene::create))
    }

    pub fn with_factory(
        platform: P,
        resources: Box<dyn ResourceLoader>,
        config: RuntimeConfig,
        factory: SceneFactory,
    ) -> Self {
        let clock = match config.max_dt {
            Some(max) => FrameClock::with_max_dt(0.0, max),
            None => FrameClock::new(0.0),
        };

        Self {
            platform,
            resources,
            factory,
            input: InputState::new(),
            clock,
            clear_color: config.clear_color,
            initial_scene: config.initial_scene,
            commands: SceneCommands::default(),
            active: None,
        }
    }

    /// Activates the initial scene and starts timing from now.
    pub fn initialize(&mut self) -> Result<()> {
        self.change_scene(self.initial_scene.as_u32())?;
        self.clock.reset(self.platform.now());
        Ok(())
    }

    /// Initializes, loops until the platform wants to close, then tears down.
    ///
    /// The active scene is released and the platform shut down even when the
    /// loop ends with an error.
    pub fn run(&mut self) -> Result<()> {
        let result = self.initialize().and_then(|()| self.run_loop());

        self.release_active();
        self.platform.shutdown();

        if let Err(e) = &result {
            log::error!("runtime stopped: {e}");
        }
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.platform.should_close() {
            self.run_frame()?;
        }
        Ok(())
    }

    /// Runs one loop iteration.
    pub fn run_frame(&mut self) -> Result<()> {
        self.platform.poll_events(&mut self.input);

        let device = self.platform.device();
        device.set_clear_color(self.clear_color);
        device.clear();

        // No delta on the first iteration.
        if let (Some(time), Some(active)) = (self.clock.current(), self.active.as_mut()) {
            let mut ctx = SceneCtx {
                device: self.platform.device(),
                input: &self.input,
                clear_color: &mut self.clear_color,
                commands: &mut self.commands,
            };
            active.scene.update(&mut ctx, time)?;
        }

        self.platform.swap_buffers();
        self.clock.end_frame(self.platform.now());
        self.input.end_frame();

        self.apply_commands()
    }

    /// Replaces the active scene with the scene for `id`.
    ///
    /// The previous scene's GPU resources are released first. If the new scene
    /// fails to initialize, no scene is active afterwards.
    pub fn change_scene(&mut self, id: u32) -> Result<()> {
        let id = SceneId::try_from(id)?;
        let mut scene = (self.factory)(id);

        self.release_active();

        let device: &mut dyn GraphicsDevice = self.platform.device();
        if let Err(e) = scene.init(device, self.resources.as_ref()) {
            scene.release(device);
            log::error!("scene '{id}' failed to initialize: {e}");
            return Err(e);
        }

        log::info!("active scene: '{id}'");
        self.active = Some(ActiveScene { id, scene });
        Ok(())
    }

    fn apply_commands(&mut self) -> Result<()> {
        let commands: Vec<SceneCommand> = self.commands.drain().collect();
        for command in commands {
            match command {
                SceneCommand::ChangeScene(id) => self.change_scene(id.as_u32())?,
                SceneCommand::Close => self.platform.request_close(),
            }
        }
        Ok(())
    }

    fn release_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.scene.release(self.platform.device());
        }
    }

    pub fn active_scene(&self) -> Option<SceneId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}
