//! Scenes: the unit of content the runtime drives each frame.
//!
//! A scene owns its GPU resources. The runtime calls [`Scene::init`] once when the
//! scene becomes active, [`Scene::update`] every frame after the first, and
//! [`Scene::release`] when the scene is replaced or the loop ends.

mod ctx;
mod id;
mod quad;

pub use ctx::{SceneCommand, SceneCommands, SceneCtx};
pub use id::{create, SceneId};
pub use quad::{QuadScene, QuadSceneConfig};

use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::resources::ResourceLoader;
use crate::time::FrameTime;

pub trait Scene {
    /// Builds GPU resources. On error, anything created so far has been released.
    fn init(&mut self, device: &mut dyn GraphicsDevice, resources: &dyn ResourceLoader) -> Result<()>;

    /// Advances and draws one frame.
    ///
    /// Must leave the device with no program and no vertex array bound.
    fn update(&mut self, ctx: &mut SceneCtx<'_>, time: FrameTime) -> Result<()>;

    /// Deletes every GPU object the scene owns. Safe to call more than once.
    fn release(&mut self, device: &mut dyn GraphicsDevice);
}
