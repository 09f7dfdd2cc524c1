use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::gfx::{RenderCtx, RenderTarget};
use crate::input::{InputFrame, InputState};
use crate::time::FrameTime;

use super::app::AppControl;

/// The application window.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable size in physical pixels.
    pub fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(size.width, size.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-frame context passed to [`super::App::on_frame`].
///
/// `'a` is the callback duration; `'w` is the window borrow carried by `Gpu<'w>`.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next frame, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents.
    ///
    /// Nothing clears the target implicitly; clearing belongs to the views
    /// `draw` renders. A lost or outdated surface skips the frame; an
    /// out-of-memory surface returns [`AppControl::Exit`].
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        if self.gpu.viewport().is_empty() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        {
            let rctx = self.gpu.render_ctx();
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.present(frame);

        AppControl::Continue
    }
}
