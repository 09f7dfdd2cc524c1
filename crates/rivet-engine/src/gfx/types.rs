use super::handle::{
    DynamicIndexBufferHandle, DynamicVertexBufferHandle, IndexBufferHandle, VertexBufferHandle,
};

/// Numbered render pass. Views render in ascending id order.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u16);

/// Rectangle in physical pixels.
///
/// As a scissor, the all-zero rect means "no clipping".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ViewRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl ViewRect {
    pub const NONE: ViewRect = ViewRect::new(0, 0, 0, 0);

    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// True when every component is zero.
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamps to a `width x height` target. Returns `None` when nothing remains.
    pub fn clamp_to(self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (self.x as u32).min(width);
        let y0 = (self.y as u32).min(height);
        let x1 = (self.x as u32 + self.width as u32).min(width);
        let y1 = (self.y as u32 + self.height as u32).min(height);
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some((x0, y0, x1 - x0, y1 - y0))
        }
    }
}

/// What happens to a view's target when its pass begins.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ViewClear {
    /// Keep whatever earlier views drew.
    #[default]
    None,
    /// Clear to `0xRRGGBBAA`.
    Color(u32),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Blend {
    /// No blending; source replaces destination.
    #[default]
    Replace,
    /// `src * src_alpha + dst * (1 - src_alpha)`.
    Normal,
}

/// Fixed-function state for one draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderState {
    pub rgb_write: bool,
    pub alpha_write: bool,
    /// Request multisampling. Backends without a multisampled target ignore it.
    pub msaa: bool,
    pub blend: Blend,
}

impl RenderState {
    /// RGB + alpha write, MSAA, normal alpha blending: the state every UI draw uses.
    pub const UI: RenderState = RenderState {
        rgb_write: true,
        alpha_write: true,
        msaa: true,
        blend: Blend::Normal,
    };
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            rgb_write: true,
            alpha_write: true,
            msaa: false,
            blend: Blend::Replace,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AddressMode {
    #[default]
    Repeat,
    Clamp,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FilterMode {
    #[default]
    Linear,
    Point,
}

/// Sampling behavior baked into a texture at creation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SamplerFlags {
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl SamplerFlags {
    /// U/V clamp, point min/mag filtering.
    pub const CLAMP_POINT: SamplerFlags = SamplerFlags {
        address_u: AddressMode::Clamp,
        address_v: AddressMode::Clamp,
        min_filter: FilterMode::Point,
        mag_filter: FilterMode::Point,
    };
}

/// 2D RGBA8 texture description. Pixel data is tightly packed, 4 bytes per texel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub sampler: SamplerFlags,
}

impl TextureDesc {
    /// Byte length a pixel buffer for this texture must have.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Shader program: a WGSL module plus its vertex and fragment entry points.
///
/// `textured` programs read a texture + sampler at `@group(1)`; every program
/// reads its transform at `@group(0) @binding(0)`.
#[derive(Debug, Copy, Clone)]
pub struct ProgramDesc<'a> {
    pub label: &'a str,
    pub wgsl: &'a str,
    pub vertex_entry: &'a str,
    pub fragment_entry: &'a str,
    pub textured: bool,
}

/// Vertex source for the next draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexSource {
    Static(VertexBufferHandle),
    Dynamic(DynamicVertexBufferHandle),
}

/// Index source for the next draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexSource {
    Static(IndexBufferHandle),
    Dynamic(DynamicIndexBufferHandle),
}
