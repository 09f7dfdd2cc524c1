//! Render interface adapter.
//!
//! Lets a retained-mode UI library draw through the rivet draw-call protocol
//! ([`rivet_engine::gfx::GfxBackend`]). The library talks to
//! [`RenderInterface`]; [`RmlAdapter`] implements it by
//!
//! - mapping library-facing texture and geometry handles onto backend
//!   resources ([`ResourceTable`]),
//! - queueing immediate geometry and submitting it in order once per frame
//!   ([`RmlAdapter::flush_frame`]),
//! - folding the two-call scissor protocol into single view-scissor updates
//!   ([`ScissorState`]).

mod adapter;
mod error;
mod handle;
mod interface;
mod queue;
mod scissor;
mod table;

pub use adapter::{RmlAdapter, RmlConfig, SAMPLER_UNIFORM};
pub use error::AdapterError;
pub use handle::{GeometryHandle, TextureHandle};
pub use interface::{Dimensions, RenderInterface};
pub use scissor::ScissorState;
pub use table::ResourceTable;

/// Re-exported so UI code can build geometry without depending on the engine.
pub use rivet_engine::coords::Vec2;
pub use rivet_engine::gfx::{Rgba8, Vertex};
