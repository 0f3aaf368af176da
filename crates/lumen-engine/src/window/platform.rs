use crate::device::GraphicsDevice;
use crate::input::InputState;

/// OS window plus the graphics context bound to it.
///
/// Everything runs on the thread that opened the platform. Input is delivered
/// synchronously from [`poll_events`](Self::poll_events) into the state the
/// caller passes in.
pub trait Platform {
    type Device: GraphicsDevice;

    fn device(&mut self) -> &mut Self::Device;

    /// Processes pending OS events, feeding input events into `input`.
    fn poll_events(&mut self, input: &mut InputState);

    fn should_close(&self) -> bool;

    fn request_close(&mut self);

    /// Monotonic time in seconds.
    fn now(&self) -> f64;

    /// Presents the frame rendered since the last swap.
    fn swap_buffers(&mut self);

    /// Tears down the window. The platform is unusable afterwards.
    fn shutdown(&mut self);
}
