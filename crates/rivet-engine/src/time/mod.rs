//! Frame timing.
//!
//! One [`FrameClock`] per render loop; `tick()` once per presented frame.
//! [`FrameStats`] smooths the resulting deltas for on-screen/diagnostic use.

mod frame_clock;
mod frame_stats;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_stats::FrameStats;
