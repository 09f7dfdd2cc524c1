//! Toy UI context that drives every [`RenderInterface`] entry point.

use std::path::PathBuf;

use rivet_engine::coords::{Rect, Vec2};
use rivet_rml::{Dimensions, GeometryHandle, RenderInterface, Rgba8, TextureHandle, Vertex};

use crate::mouse::UiInputSink;

const PANEL: Rect = Rect::new(40.0, 40.0, 240.0, 240.0);
const BUTTON: Rect = Rect::new(40.0, 320.0, 200.0, 48.0);
const STRIP: Rect = Rect::new(320.0, 40.0, 480.0, 64.0);
const IMAGE_AT: Vec2 = Vec2::new(320.0, 140.0);

const STRIP_CELL: f32 = 48.0;
const STRIP_MARKER: Rgba8 = Rgba8::new(0xFF, 0xFF, 0xFF, 0xFF);
const STRIP_SPEED: f32 = 60.0;

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

pub(crate) const BUTTON_IDLE: Rgba8 = Rgba8::new(0x40, 0x40, 0x48, 0xFF);
pub(crate) const BUTTON_HOVER: Rgba8 = Rgba8::new(0x60, 0x60, 0x70, 0xFF);
pub(crate) const BUTTON_PRESSED: Rgba8 = Rgba8::new(0x20, 0x20, 0x28, 0xFF);

const TINTS: [Rgba8; 3] = [
    Rgba8::new(0xF0, 0x90, 0x30, 0xFF),
    Rgba8::new(0x30, 0xC0, 0x70, 0xFF),
    Rgba8::new(0xC0, 0x40, 0xC0, 0xFF),
];

const STRIP_PALETTE: [Rgba8; 4] = [
    Rgba8::new(0xE0, 0x50, 0x50, 0xFF),
    Rgba8::new(0xE0, 0xC0, 0x40, 0xFF),
    Rgba8::new(0x50, 0xB0, 0xE0, 0xFF),
    Rgba8::new(0x80, 0x60, 0xD0, 0xC0),
];

/// Axis-aligned quad at the origin; `uv` spans the whole texture.
fn quad(size: Vec2, color: Rgba8) -> ([Vertex; 4], [u32; 6]) {
    let v = |x: f32, y: f32, u: f32, t: f32| Vertex::new([x, y], color, [u, t]);
    (
        [
            v(0.0, 0.0, 0.0, 0.0),
            v(size.x, 0.0, 1.0, 0.0),
            v(size.x, size.y, 1.0, 1.0),
            v(0.0, size.y, 0.0, 1.0),
        ],
        [0, 1, 2, 0, 2, 3],
    )
}

/// RGBA8 checkerboard, `size` x `size` texels.
fn checker(size: u32, cell: u32, a: Rgba8, b: Rgba8) -> Vec<u8> {
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let c = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
            out.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }
    out
}

#[derive(Debug, Copy, Clone)]
struct Panel {
    texture: TextureHandle,
    geometry: GeometryHandle,
}

#[derive(Debug, Copy, Clone)]
struct Image {
    texture: TextureHandle,
    geometry: GeometryHandle,
}

#[derive(Debug)]
pub struct DemoUi {
    asset_path: PathBuf,

    pointer: Vec2,
    pressed: bool,
    scroll_paused: bool,
    scroll: f32,

    clicks: usize,
    panel: Option<Panel>,
    /// One compiled cell per palette color.
    strip: Vec<GeometryHandle>,
    /// `None` until the first render; then `Some(None)` when no image loaded.
    image: Option<Option<Image>>,
}

impl DemoUi {
    pub fn new(asset_path: impl Into<PathBuf>) -> Self {
        Self {
            asset_path: asset_path.into(),
            pointer: Vec2::new(-1.0, -1.0),
            pressed: false,
            scroll_paused: false,
            scroll: 0.0,
            clicks: 0,
            panel: None,
            strip: Vec::new(),
            image: None,
        }
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    pub fn update(&mut self, dt: f32) {
        if !self.scroll_paused {
            self.scroll = (self.scroll + dt * STRIP_SPEED) % (STRIP_CELL * STRIP_PALETTE.len() as f32);
        }
    }

    pub fn render<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) {
        let panel = self.panel(ri);
        ri.render_compiled_geometry(panel.geometry, PANEL.origin);

        self.render_button(ri);
        self.render_strip(ri);

        if let Some(image) = self.image(ri) {
            ri.render_compiled_geometry(image.geometry, IMAGE_AT);
        }
    }

    /// Releases everything this context created.
    pub fn release<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) {
        if let Some(panel) = self.panel.take() {
            ri.release_compiled_geometry(panel.geometry);
            ri.release_texture(panel.texture);
        }
        for cell in self.strip.drain(..) {
            ri.release_compiled_geometry(cell);
        }
        if let Some(Some(image)) = self.image.take() {
            ri.release_compiled_geometry(image.geometry);
            ri.release_texture(image.texture);
        }
    }

    fn panel<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) -> Panel {
        if let Some(panel) = self.panel {
            return panel;
        }

        let tint = TINTS[self.clicks % TINTS.len()];
        let pixels = checker(CHECKER_SIZE, CHECKER_CELL, tint, Rgba8::WHITE);
        let texture = match ri.generate_texture(&pixels, Dimensions::new(CHECKER_SIZE, CHECKER_SIZE)) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("checker texture: {err}");
                TextureHandle::NONE
            }
        };

        let (vertices, indices) = quad(PANEL.size, Rgba8::WHITE);
        let geometry = ri.compile_geometry(&vertices, &indices, texture);

        let panel = Panel { texture, geometry };
        self.panel = Some(panel);
        panel
    }

    fn image<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) -> Option<Image> {
        if let Some(image) = self.image {
            return image;
        }

        let image = if self.asset_path.is_file() {
            match ri.load_texture(&self.asset_path) {
                Ok((texture, dims)) => {
                    let size = Vec2::new(dims.width as f32, dims.height as f32);
                    let (vertices, indices) = quad(size, Rgba8::WHITE);
                    let geometry = ri.compile_geometry(&vertices, &indices, texture);
                    Some(Image { texture, geometry })
                }
                Err(err) => {
                    log::warn!("{err}: {}", error_source(&err));
                    None
                }
            }
        } else {
            log::info!("no image at {}, skipping", self.asset_path.display());
            None
        };

        self.image = Some(image);
        image
    }

    fn render_button<R: RenderInterface + ?Sized>(&self, ri: &mut R) {
        let color = match (BUTTON.contains(self.pointer), self.pressed) {
            (true, true) => BUTTON_PRESSED,
            (true, false) => BUTTON_HOVER,
            (false, _) => BUTTON_IDLE,
        };
        let (vertices, indices) = quad(BUTTON.size, color);
        ri.render_geometry(&vertices, &indices, TextureHandle::NONE, BUTTON.origin);
    }

    fn strip_cells<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) -> &[GeometryHandle] {
        if self.strip.is_empty() {
            let size = Vec2::new(STRIP_CELL - 4.0, STRIP.size.y);
            self.strip = STRIP_PALETTE
                .iter()
                .map(|color| {
                    let (vertices, indices) = quad(size, *color);
                    ri.compile_geometry(&vertices, &indices, TextureHandle::NONE)
                })
                .collect();
        }
        &self.strip
    }

    /// Compiled cells plus an immediate marker on the leading cell edge; the
    /// marker straddles the left border and relies on the scissor.
    fn render_strip<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) {
        let first = (self.scroll / STRIP_CELL) as usize;
        let offset = self.scroll % STRIP_CELL;
        let count = (STRIP.size.x / STRIP_CELL) as usize + 2;

        let (x, y, w, h) = STRIP.to_pixels();
        ri.set_scissor_region(x, y, w, h);
        ri.enable_scissor_region(true);

        let cells = self.strip_cells(ri).to_vec();
        for i in 0..count {
            let cell = cells[(first + i) % cells.len()];
            let at = Vec2::new(STRIP.origin.x + i as f32 * STRIP_CELL - offset, STRIP.origin.y);
            ri.render_compiled_geometry(cell, at);
        }

        let (vertices, indices) = quad(Vec2::new(4.0, STRIP.size.y), STRIP_MARKER);
        let marker = Vec2::new(STRIP.origin.x - offset - 2.0, STRIP.origin.y);
        ri.render_geometry(&vertices, &indices, TextureHandle::NONE, marker);

        ri.enable_scissor_region(false);
    }

    /// Counts a button click and drops the panel so the next frame rebuilds
    /// it with the next tint.
    pub fn click<R: RenderInterface + ?Sized>(&mut self, ri: &mut R) {
        self.clicks += 1;
        log::info!("button clicked ({} total)", self.clicks);
        if let Some(panel) = self.panel.take() {
            ri.release_compiled_geometry(panel.geometry);
            ri.release_texture(panel.texture);
        }
    }
}

fn error_source(err: &dyn std::error::Error) -> String {
    err.source().map(|s| s.to_string()).unwrap_or_default()
}

/// Input sink that records a button click for the next frame.
#[derive(Debug)]
pub struct DemoInput<'a> {
    pub ui: &'a mut DemoUi,
    pub clicked: bool,
}

impl UiInputSink for DemoInput<'_> {
    fn mouse_move(&mut self, position: Vec2, _modifiers: u8) {
        self.ui.pointer = position;
    }

    fn mouse_button_down(&mut self, button: u8, _modifiers: u8) {
        match button {
            0 => self.ui.pressed = true,
            1 => self.ui.scroll_paused = !self.ui.scroll_paused,
            _ => {}
        }
    }

    fn mouse_button_up(&mut self, button: u8, _modifiers: u8) {
        if button == 0 {
            if self.ui.pressed && BUTTON.contains(self.ui.pointer) {
                self.clicked = true;
            }
            self.ui.pressed = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_engine::gfx::{
        GfxBackend, GfxCall, ProgramDesc, RecordingGfx, ViewId, ViewRect,
    };
    use rivet_rml::{RmlAdapter, RmlConfig};

    fn adapter(gfx: &mut RecordingGfx) -> RmlAdapter<&mut RecordingGfx> {
        let desc = |label, textured| ProgramDesc {
            label,
            wgsl: "",
            vertex_entry: "vs_main",
            fragment_entry: "fs",
            textured,
        };
        let color = gfx.create_program(&desc("color", false));
        let texture = gfx.create_program(&desc("texture", true));
        RmlAdapter::new(gfx, RmlConfig::new(ViewId(1), 1280, 720, color, texture))
    }

    fn missing_asset() -> PathBuf {
        PathBuf::from("does/not/exist.png")
    }

    fn uploaded_colors(gfx: &RecordingGfx) -> Vec<Rgba8> {
        gfx.calls()
            .iter()
            .filter_map(|c| match c {
                GfxCall::UpdateDynamicVertexBuffer { vertices, .. } => Some(vertices[0].color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_frame_creates_panel_and_skips_missing_image() {
        let mut gfx = RecordingGfx::new();
        let mut ri = adapter(&mut gfx);
        let mut ui = DemoUi::new(missing_asset());

        ui.render(&mut ri);
        ri.flush_frame();

        assert_eq!(ri.texture_count(), 1);
        assert_eq!(ri.geometry_count(), 1 + STRIP_PALETTE.len());

        ui.render(&mut ri);
        assert_eq!(ri.texture_count(), 1);
    }

    #[test]
    fn strip_is_clipped_and_scissor_restored() {
        let mut gfx = RecordingGfx::new();
        let mut ri = adapter(&mut gfx);
        let mut ui = DemoUi::new(missing_asset());

        ui.render(&mut ri);
        ri.flush_frame();

        // Scissor in effect at each submit; the queued marker flushes late.
        let mut current = ViewRect::NONE;
        let mut clipped = 0;
        for call in ri.backend().calls() {
            match call {
                GfxCall::SetViewScissor { rect, .. } => current = *rect,
                GfxCall::Submit(_) if current == ViewRect::new(320, 40, 480, 64) => clipped += 1,
                _ => {}
            }
        }
        assert_eq!(clipped, (STRIP.size.x / STRIP_CELL) as usize + 2 + 1);
        assert_eq!(ri.backend().scissor_calls().last().map(|(_, r)| r), Some(ViewRect::NONE));
    }

    #[test]
    fn hover_changes_button_color() {
        let mut gfx = RecordingGfx::new();
        let mut ri = adapter(&mut gfx);
        let mut ui = DemoUi::new(missing_asset());

        ui.render(&mut ri);
        ri.flush_frame();
        assert_eq!(uploaded_colors(ri.backend())[0], BUTTON_IDLE);

        ri.backend_mut().clear_calls();
        DemoInput { ui: &mut ui, clicked: false }.mouse_move(Vec2::new(50.0, 330.0), 0);
        ui.render(&mut ri);
        ri.flush_frame();
        assert_eq!(uploaded_colors(ri.backend())[0], BUTTON_HOVER);
    }

    #[test]
    fn click_rebuilds_panel_texture() {
        let mut gfx = RecordingGfx::new();
        let mut ri = adapter(&mut gfx);
        let mut ui = DemoUi::new(missing_asset());
        ui.render(&mut ri);
        ri.flush_frame();

        let mut input = DemoInput { ui: &mut ui, clicked: false };
        input.mouse_move(Vec2::new(60.0, 340.0), 0);
        input.mouse_button_down(0, 0);
        input.mouse_button_up(0, 0);
        let clicked = input.clicked;
        assert!(clicked);

        ri.backend_mut().clear_calls();
        ui.click(&mut ri);
        ui.render(&mut ri);

        let calls = ri.backend().calls();
        assert!(calls.iter().any(|c| matches!(c, GfxCall::DestroyTexture(_))));
        assert!(calls.iter().any(|c| matches!(c, GfxCall::CreateTexture { .. })));
        assert_eq!(ri.texture_count(), 1);
        assert_eq!(ui.clicks(), 1);
    }

    #[test]
    fn release_empties_adapter_tables() {
        let mut gfx = RecordingGfx::new();
        let mut ri = adapter(&mut gfx);
        let mut ui = DemoUi::new(missing_asset());

        ui.render(&mut ri);
        ui.release(&mut ri);
        assert_eq!(ri.texture_count(), 0);
        assert_eq!(ri.geometry_count(), 0);
    }

    #[test]
    fn right_click_pauses_scrolling() {
        let mut ui = DemoUi::new(missing_asset());
        ui.update(0.5);
        let before = ui.scroll;
        assert!(before > 0.0);

        DemoInput { ui: &mut ui, clicked: false }.mouse_button_down(1, 0);
        ui.update(0.5);
        assert_eq!(ui.scroll, before);
    }

    #[test]
    fn checker_alternates_cells() {
        let px = checker(4, 2, Rgba8::BLACK, Rgba8::WHITE);
        assert_eq!(px.len(), 64);
        assert_eq!(&px[0..4], &[0, 0, 0, 255]);
        assert_eq!(&px[8..12], &[255, 255, 255, 255]);
    }
}
