use winit::event::WindowEvent;

use crate::coords::Viewport;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`crate::window::Runtime`].
pub trait App {
    /// Raw window events, after the runtime has updated its input state.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// The drawable size changed (physical pixels). Not called for 0x0.
    fn on_resize(&mut self, viewport: Viewport) {
        let _ = viewport;
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
