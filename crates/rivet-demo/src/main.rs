//! Rivet demo: a window with a white scene view and a blue UI overlay drawn
//! through the render-interface adapter.
//!
//! `RUST_LOG=debug` prints a frame-time line every couple of seconds. Put a
//! `logo.png` under `crates/rivet-demo/assets/` to see an image panel.

mod app;
mod mouse;
mod ui;

use anyhow::Result;
use rivet_engine::device::GpuInit;
use rivet_engine::logging::{init_logging, LoggingConfig};
use rivet_engine::window::{Runtime, RuntimeConfig};

use app::DemoApp;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    log::info!("starting rivet demo");

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), DemoApp::new())
}
