use bytemuck::{Pod, Zeroable};

/// 8-bit RGBA color, straight (non-premultiplied) alpha.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks `0xRRGGBBAA`.
    #[inline]
    pub const fn from_u32(rgba: u32) -> Self {
        Self::new((rgba >> 24) as u8, (rgba >> 16) as u8, (rgba >> 8) as u8, rgba as u8)
    }

    #[inline]
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }
}

/// The single vertex format of the protocol.
///
/// Layout (20 bytes):
///
///  offset  0  position   [f32; 2]   loc 0
///  offset  8  color      [u8; 4]    loc 1 (normalized)
///  offset 12  tex_coord  [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Rgba8,
    pub tex_coord: [f32; 2],
}

impl Vertex {
    #[inline]
    pub const fn new(position: [f32; 2], color: Rgba8, tex_coord: [f32; 2]) -> Self {
        Self { position, color, tex_coord }
    }

    pub(crate) const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Unorm8x4,  // color
        2 => Float32x2  // tex_coord
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
