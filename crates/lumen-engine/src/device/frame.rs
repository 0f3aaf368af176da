/// A single acquired surface frame.
///
/// Short-lived: created by the first clear or draw of an iteration and finished
/// by `present`. Holding the surface texture prevents acquisition of the next one.
pub(crate) struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    pub draw_calls: u32,
}

impl GpuFrame {
    /// Submits the recorded commands and presents the surface texture.
    pub fn present(self, queue: &wgpu::Queue) {
        queue.submit(std::iter::once(self.encoder.finish()));
        drop(self.view);
        self.surface_texture.present();
    }
}
