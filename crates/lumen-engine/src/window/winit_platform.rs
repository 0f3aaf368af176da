use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::device::WgpuDevice;
use crate::input::keys::KEY_ESCAPE;
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputEvent, InputState, KeyState};

use super::{Platform, WindowConfig};

/// Waits for `resumed` and creates the window there.
struct Bootstrap {
    attributes: Option<WindowAttributes>,
    window: Option<Result<Window, OsError>>,
}

impl ApplicationHandler for Bootstrap {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.attributes.take() {
            self.window = Some(event_loop.create_window(attributes));
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}
}

/// Handler for one `poll_events` call.
struct Pump<'a> {
    window: &'a Window,
    device: &'a mut WgpuDevice,
    input: &'a mut InputState,
    close_on_escape: bool,
    close_requested: bool,
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, _: &ActiveEventLoop) {}

    fn window_event(&mut self, _: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.window.id() {
            return;
        }

        if let Some(ev) = translate_window_event(self.window, &event) {
            if self.close_on_escape
                && ev == (InputEvent::Key { code: KEY_ESCAPE, state: KeyState::Pressed })
            {
                log::debug!("escape pressed, closing");
                self.close_requested = true;
            }
            self.input.apply_event(ev);
        }

        if matches!(event, WindowEvent::CloseRequested) {
            self.close_requested = true;
        }
        if let Some(size) = surface_size(&event) {
            self.device.resize(size);
        }
    }
}

/// New drawable size carried by `event`.
///
/// Scale-factor changes are followed by a `Resized` with the final size, so
/// only `Resized` reconfigures the surface.
fn surface_size(event: &WindowEvent) -> Option<PhysicalSize<u32>> {
    match event {
        WindowEvent::Resized(size) => Some(*size),
        _ => None,
    }
}

/// [`Platform`] backed by a winit window and a [`WgpuDevice`].
///
/// The event loop is pumped once per frame instead of owning the thread, so the
/// frame loop stays an ordinary `while` loop.
pub struct WinitPlatform {
    // Drop order: device (and its surface) before the window and the loop.
    device: WgpuDevice,
    window: Arc<Window>,
    event_loop: EventLoop<()>,

    close_on_escape: bool,
    close_requested: bool,
    start: Instant,
}

impl WinitPlatform {
    /// Creates the event loop, the window and its graphics context.
    pub fn open(config: WindowConfig) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.size)
            .with_resizable(config.resizable);

        let mut bootstrap = Bootstrap {
            attributes: Some(attributes),
            window: None,
        };

        let window = loop {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut bootstrap)
            {
                bail!("event loop exited with code {code} before the window was created");
            }
            if let Some(window) = bootstrap.window.take() {
                break window.context("failed to create window")?;
            }
        };
        let window = Arc::new(window);

        let size = window.inner_size();
        log::info!("window '{}' opened ({}x{} px)", config.title, size.width, size.height);

        let device = WgpuDevice::new(window.clone(), config.gpu)
            .context("failed to initialize the graphics device")?;

        Ok(Self {
            device,
            window,
            event_loop,
            close_on_escape: config.close_on_escape,
            close_requested: false,
            start: Instant::now(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Platform for WinitPlatform {
    type Device = WgpuDevice;

    fn device(&mut self) -> &mut WgpuDevice {
        &mut self.device
    }

    fn poll_events(&mut self, input: &mut InputState) {
        let mut pump = Pump {
            window: &self.window,
            device: &mut self.device,
            input,
            close_on_escape: self.close_on_escape,
            close_requested: false,
        };

        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut pump);
        let close_requested = pump.close_requested;

        if close_requested {
            self.request_close();
        }
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited with code {code}");
            self.request_close();
        }
    }

    fn should_close(&self) -> bool {
        self.close_requested || self.device.is_lost()
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn swap_buffers(&mut self) {
        self.window.pre_present_notify();
        self.device.present();
    }

    fn shutdown(&mut self) {
        self.close_requested = true;
        self.window.set_visible(false);
        log::info!("window closed");
    }
}
