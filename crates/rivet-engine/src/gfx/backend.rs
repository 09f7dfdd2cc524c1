use crate::coords::Mat4;

use super::handle::{
    DynamicIndexBufferHandle, DynamicVertexBufferHandle, IndexBufferHandle, ProgramHandle,
    TextureHandle, UniformHandle, VertexBufferHandle,
};
use super::types::{
    IndexSource, ProgramDesc, RenderState, TextureDesc, VertexSource, ViewClear, ViewId, ViewRect,
};
use super::vertex::Vertex;

/// The draw-call protocol.
///
/// Resource creation is infallible from the caller's point of view: device
/// loss and allocation failure are fatal and surface through the backend's
/// own error handling, not through return values.
///
/// Destroying an unknown handle is ignored (with a log message).
pub trait GfxBackend {
    // ── buffers ──────────────────────────────────────────────────────────

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> VertexBufferHandle;
    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle);

    fn create_index_buffer(&mut self, indices: &[u32]) -> IndexBufferHandle;
    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle);

    /// Creates an empty dynamic vertex buffer. `capacity` is a sizing hint;
    /// updates larger than it grow the buffer.
    fn create_dynamic_vertex_buffer(&mut self, capacity: u32) -> DynamicVertexBufferHandle;

    /// Replaces the buffer contents. Draws submitted before this call keep
    /// the contents they were submitted with.
    fn update_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle, vertices: &[Vertex]);
    fn destroy_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle);

    fn create_dynamic_index_buffer(&mut self, capacity: u32) -> DynamicIndexBufferHandle;
    fn update_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle, indices: &[u32]);
    fn destroy_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle);

    // ── textures / uniforms / programs ───────────────────────────────────

    /// Creates an RGBA8 texture. `pixels.len()` must equal `desc.byte_len()`.
    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> TextureHandle;
    fn destroy_texture(&mut self, handle: TextureHandle);

    /// Creates a named sampler slot for [`GfxBackend::set_texture`].
    fn create_sampler_uniform(&mut self, name: &str) -> UniformHandle;
    fn destroy_uniform(&mut self, handle: UniformHandle);

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> ProgramHandle;
    fn destroy_program(&mut self, handle: ProgramHandle);

    // ── view state ───────────────────────────────────────────────────────

    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear);

    /// Viewport of the view. The empty rect means "whole target".
    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect);

    /// Scissor applied to draws subsequently submitted to `view`.
    /// [`ViewRect::NONE`] disables clipping.
    fn set_view_scissor(&mut self, view: ViewId, rect: ViewRect);

    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4);

    // ── per-draw state (consumed by submit) ──────────────────────────────

    /// Model transform for the next draw.
    fn set_transform(&mut self, model: &Mat4);
    fn set_vertex_buffer(&mut self, source: VertexSource);
    fn set_index_buffer(&mut self, source: IndexSource);
    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle);
    fn set_state(&mut self, state: RenderState);

    /// Records one draw into `view` with the accumulated per-draw state and
    /// resets that state.
    fn submit(&mut self, view: ViewId, program: ProgramHandle);
}

/// Lends a backend to a client that owns its `GfxBackend` by value.
impl<T: GfxBackend + ?Sized> GfxBackend for &mut T {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> VertexBufferHandle {
        (**self).create_vertex_buffer(vertices)
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        (**self).destroy_vertex_buffer(handle)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> IndexBufferHandle {
        (**self).create_index_buffer(indices)
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        (**self).destroy_index_buffer(handle)
    }

    fn create_dynamic_vertex_buffer(&mut self, capacity: u32) -> DynamicVertexBufferHandle {
        (**self).create_dynamic_vertex_buffer(capacity)
    }

    fn update_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle, vertices: &[Vertex]) {
        (**self).update_dynamic_vertex_buffer(handle, vertices)
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle) {
        (**self).destroy_dynamic_vertex_buffer(handle)
    }

    fn create_dynamic_index_buffer(&mut self, capacity: u32) -> DynamicIndexBufferHandle {
        (**self).create_dynamic_index_buffer(capacity)
    }

    fn update_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle, indices: &[u32]) {
        (**self).update_dynamic_index_buffer(handle, indices)
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle) {
        (**self).destroy_dynamic_index_buffer(handle)
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> TextureHandle {
        (**self).create_texture_2d(desc, pixels)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        (**self).destroy_texture(handle)
    }

    fn create_sampler_uniform(&mut self, name: &str) -> UniformHandle {
        (**self).create_sampler_uniform(name)
    }

    fn destroy_uniform(&mut self, handle: UniformHandle) {
        (**self).destroy_uniform(handle)
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> ProgramHandle {
        (**self).create_program(desc)
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        (**self).destroy_program(handle)
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear) {
        (**self).set_view_clear(view, clear)
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        (**self).set_view_rect(view, rect)
    }

    fn set_view_scissor(&mut self, view: ViewId, rect: ViewRect) {
        (**self).set_view_scissor(view, rect)
    }

    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4) {
        (**self).set_view_transform(view, view_mtx, proj)
    }

    fn set_transform(&mut self, model: &Mat4) {
        (**self).set_transform(model)
    }

    fn set_vertex_buffer(&mut self, source: VertexSource) {
        (**self).set_vertex_buffer(source)
    }

    fn set_index_buffer(&mut self, source: IndexSource) {
        (**self).set_index_buffer(source)
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        (**self).set_texture(stage, sampler, texture)
    }

    fn set_state(&mut self, state: RenderState) {
        (**self).set_state(state)
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        (**self).submit(view, program)
    }
}
