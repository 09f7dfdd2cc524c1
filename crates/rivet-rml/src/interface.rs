use std::path::Path;

use rivet_engine::coords::Vec2;
use rivet_engine::gfx::Vertex;

use crate::error::AdapterError;
use crate::handle::{GeometryHandle, TextureHandle};

/// Texture size in texels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// What the UI library calls to get pixels on screen.
///
/// Geometry uses the fixed [`Vertex`] format with 32-bit indices. A texture
/// argument of [`TextureHandle::NONE`] means untextured.
pub trait RenderInterface {
    /// Draws geometry the caller will not keep. The data is copied; drawing
    /// happens at the next frame flush, in call order.
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Vec2,
    );

    /// Uploads geometry once for repeated drawing.
    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
    ) -> GeometryHandle;

    fn render_compiled_geometry(&mut self, geometry: GeometryHandle, translation: Vec2);

    fn release_compiled_geometry(&mut self, geometry: GeometryHandle);

    fn enable_scissor_region(&mut self, enable: bool);

    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Decodes an image file into a texture.
    fn load_texture(&mut self, source: &Path) -> Result<(TextureHandle, Dimensions), AdapterError>;

    /// Creates a texture from tightly packed RGBA8 pixels.
    fn generate_texture(
        &mut self,
        pixels: &[u8],
        dimensions: Dimensions,
    ) -> Result<TextureHandle, AdapterError>;

    fn release_texture(&mut self, texture: TextureHandle);
}
