/// One acquired swapchain image plus the encoder recording into it.
///
/// Dropping the surface texture after submission presents it, so keep this
/// short-lived.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
