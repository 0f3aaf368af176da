use crate::device::GraphicsDevice;
use crate::input::InputState;
use crate::paint::Color;

use super::SceneId;

/// Request recorded by a scene during `update`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SceneCommand {
    ChangeScene(SceneId),
    Close,
}

/// Commands are buffered and applied by the runtime after `update` returns.
#[derive(Debug, Default)]
pub struct SceneCommands {
    commands: Vec<SceneCommand>,
}

impl SceneCommands {
    pub fn change_scene(&mut self, id: SceneId) {
        self.commands.push(SceneCommand::ChangeScene(id));
    }

    pub fn close(&mut self) {
        self.commands.push(SceneCommand::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = SceneCommand> + '_ {
        self.commands.drain(..)
    }
}

/// Per-frame context handed to [`Scene::update`](super::Scene::update).
pub struct SceneCtx<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub input: &'a InputState,
    pub clear_color: &'a mut Color,
    pub commands: &'a mut SceneCommands,
}

impl<'a> SceneCtx<'a> {
    /// Color used to clear the framebuffer from the next frame on.
    pub fn set_clear_color(&mut self, color: Color) {
        *self.clear_color = color;
    }

    pub fn request_scene(&mut self, id: SceneId) {
        self.commands.change_scene(id);
    }

    pub fn request_close(&mut self) {
        self.commands.close();
    }
}
