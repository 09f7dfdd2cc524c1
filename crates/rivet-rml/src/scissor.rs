use rivet_engine::gfx::ViewRect;

/// Folds the UI library's two scissor calls (enable / set region) into
/// single view-scissor updates.
///
/// Each method returns the rect to apply to the view, or `None` when the
/// backend must not be touched.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct ScissorState {
    enabled: bool,
    region: ViewRect,
}

impl ScissorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enabling applies the stored region, or "no clip" when none was set.
    /// Disabling applies "no clip" and keeps the stored region for later.
    pub fn enable(&mut self, enabled: bool) -> ViewRect {
        self.enabled = enabled;
        if enabled { self.region } else { ViewRect::NONE }
    }

    /// Stores the region; returns it for immediate application only while
    /// clipping is enabled. Components are clamped into `0..=u16::MAX`.
    pub fn set_region(&mut self, x: i32, y: i32, width: i32, height: i32) -> Option<ViewRect> {
        self.region = ViewRect::new(clamp_u16(x), clamp_u16(y), clamp_u16(width), clamp_u16(height));
        self.enabled.then_some(self.region)
    }

    /// The rect the view currently carries: the region while enabled,
    /// otherwise "no clip".
    #[inline]
    pub fn applied(&self) -> ViewRect {
        if self.enabled { self.region } else { ViewRect::NONE }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn region(&self) -> ViewRect {
        self.region
    }
}

fn clamp_u16(v: i32) -> u16 {
    v.clamp(0, u16::MAX as i32) as u16
}
