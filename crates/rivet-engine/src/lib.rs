//! Rivet engine crate.
//!
//! Owns the platform + GPU runtime pieces and the view/submit draw-call
//! protocol (`gfx`) that higher layers render through.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod gfx;
