use std::path::PathBuf;

use rivet_engine::coords::Viewport;
use rivet_engine::core::{App, AppControl, FrameCtx};
use rivet_engine::gfx::{GfxBackend, ProgramDesc, RenderCtx, ViewClear, ViewId, ViewRect, WgpuGfx};
use rivet_engine::time::FrameStats;
use rivet_rml::{RmlAdapter, RmlConfig};

use crate::mouse::MouseForwarder;
use crate::ui::{DemoInput, DemoUi};

const UI_SHADER: &str = include_str!("../shaders/ui.wgsl");

/// Scene pass; nothing draws here but it owns the background clear.
const SCENE_VIEW: ViewId = ViewId(0);
/// UI overlay pass.
const UI_VIEW: ViewId = ViewId(1);

const SCENE_CLEAR: u32 = 0xFFFF_FFFF;
const UI_CLEAR: u32 = 0x3070_F0FF;

/// Frames between frame-time log lines.
const STATS_EVERY: u64 = 120;

pub struct DemoApp {
    viewport: Viewport,
    stats: FrameStats,
    mouse: MouseForwarder,
    ui: DemoUi,
    /// Created on the first frame, once a device exists.
    adapter: Option<RmlAdapter<WgpuGfx>>,
}

impl DemoApp {
    pub fn new() -> Self {
        let image = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join("logo.png");
        Self {
            viewport: Viewport::default(),
            stats: FrameStats::default(),
            mouse: MouseForwarder::new(),
            ui: DemoUi::new(image),
            adapter: None,
        }
    }
}

fn create_adapter(rctx: &RenderCtx<'_>, viewport: Viewport) -> RmlAdapter<WgpuGfx> {
    let mut gfx = WgpuGfx::new(rctx);

    let program = |label, fragment_entry, textured| ProgramDesc {
        label,
        wgsl: UI_SHADER,
        vertex_entry: "vs_main",
        fragment_entry,
        textured,
    };
    let color = gfx.create_program(&program("ui color", "fs_color", false));
    let texture = gfx.create_program(&program("ui texture", "fs_texture", true));

    gfx.set_view_clear(SCENE_VIEW, ViewClear::Color(SCENE_CLEAR));
    gfx.set_view_clear(UI_VIEW, ViewClear::Color(UI_CLEAR));

    log::info!("UI renderer ready ({}x{})", viewport.width, viewport.height);
    RmlAdapter::new(
        gfx,
        RmlConfig::new(UI_VIEW, viewport.width, viewport.height, color, texture),
    )
}

impl App for DemoApp {
    fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.resize(viewport.width, viewport.height);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.stats.push(ctx.time.dt);
        if ctx.time.frame_index % STATS_EVERY == 0 {
            log::debug!(
                "frame time {:.2} ms ({:.0} fps)",
                self.stats.average_ms(),
                self.stats.fps()
            );
        }

        if self.viewport.is_empty() {
            self.viewport = ctx.gpu.viewport();
        }
        let viewport = self.viewport;
        let adapter = self
            .adapter
            .get_or_insert_with(|| create_adapter(&ctx.gpu.render_ctx(), viewport));

        // Scene view: full-window rect and one empty submit so the pass runs.
        let clamp = |v: u32| v.min(u16::MAX as u32) as u16;
        let color_program = adapter.color_program();
        let gfx = adapter.backend_mut();
        gfx.set_view_rect(
            SCENE_VIEW,
            ViewRect::new(0, 0, clamp(viewport.width), clamp(viewport.height)),
        );
        gfx.submit(SCENE_VIEW, color_program);

        let mut input = DemoInput { ui: &mut self.ui, clicked: false };
        self.mouse.forward(ctx.input, &mut input);
        if input.clicked {
            self.ui.click(adapter);
            ctx.window.set_title(&format!("rivet ({} clicks)", self.ui.clicks()));
        }

        self.ui.update(ctx.time.dt);
        self.ui.render(adapter);
        adapter.flush_frame();

        let control = ctx.render(|rctx, target| adapter.backend_mut().render(rctx, target));
        if control == AppControl::Continue && adapter.backend().pending_draws() > 0 {
            // Skipped frame (surface lost or outdated).
            adapter.backend_mut().discard_frame();
        }
        control
    }
}

impl Drop for DemoApp {
    fn drop(&mut self) {
        if let Some(adapter) = self.adapter.as_mut() {
            self.ui.release(adapter);
        }
    }
}
