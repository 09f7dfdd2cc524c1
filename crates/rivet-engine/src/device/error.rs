/// What the runtime should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame may render.
    Reconfigured,
    /// Skip this frame and try again on the next redraw.
    SkipFrame,
    /// Unrecoverable (usually out of memory).
    Fatal,
}
