//! View/submit draw-call protocol.
//!
//! Clients never touch wgpu directly. They create resources through a
//! [`GfxBackend`], receive small copyable handles back, set per-draw state
//! (buffers, texture, transform, render state) and `submit` it to a numbered
//! view. Views are rendered in ascending id order when the frame is flushed.
//!
//! Per-draw state is consumed by `submit`: after a submit the next draw starts
//! from a clean slate (identity transform, no buffers, no texture, default
//! state). View state (rect, scissor, clear, transform) persists.
//!
//! Two backends ship here:
//! - [`WgpuGfx`] renders through wgpu.
//! - [`RecordingGfx`] records every call; used to test protocol clients.

mod backend;
mod handle;
mod recording;
mod types;
mod vertex;
mod wgpu_backend;

pub use backend::GfxBackend;
pub use handle::{
    DynamicIndexBufferHandle, DynamicVertexBufferHandle, IndexBufferHandle, ProgramHandle,
    TextureHandle, UniformHandle, VertexBufferHandle,
};
pub use recording::{GfxCall, RecordingGfx, Submission};
pub use types::{
    AddressMode, Blend, FilterMode, IndexSource, ProgramDesc, RenderState, SamplerFlags,
    TextureDesc, VertexSource, ViewClear, ViewId, ViewRect,
};
pub use vertex::{Rgba8, Vertex};
pub use wgpu_backend::{RenderCtx, RenderTarget, WgpuGfx};
