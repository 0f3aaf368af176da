use winit::dpi::LogicalSize;

use crate::device::GpuInit;
use crate::paint::Color;
use crate::scene::SceneId;

/// OS window and graphics context configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: LogicalSize<f64>,
    pub resizable: bool,
    /// Close the window when Escape is pressed. The close button always closes it.
    pub close_on_escape: bool,
    pub gpu: GpuInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            size: LogicalSize::new(800.0, 600.0),
            resizable: true,
            close_on_escape: true,
            gpu: GpuInit::default(),
        }
    }
}

/// Frame loop configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Clear color until a scene sets its own.
    pub clear_color: Color,
    pub initial_scene: SceneId,
    /// Upper bound for a frame's delta time in seconds. `None` leaves it unclamped.
    pub max_dt: Option<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::WHITE,
            initial_scene: SceneId::LevelEditor,
            max_dt: None,
        }
    }
}
