use std::collections::BTreeSet;

use crate::coords::Mat4;

use super::backend::GfxBackend;
use super::handle::{
    DynamicIndexBufferHandle, DynamicVertexBufferHandle, IndexBufferHandle, ProgramHandle,
    TextureHandle, UniformHandle, VertexBufferHandle,
};
use super::types::{
    IndexSource, ProgramDesc, RenderState, TextureDesc, VertexSource, ViewClear, ViewId, ViewRect,
};
use super::vertex::Vertex;

/// One recorded protocol call.
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    CreateVertexBuffer { handle: VertexBufferHandle, len: usize },
    DestroyVertexBuffer(VertexBufferHandle),
    CreateIndexBuffer { handle: IndexBufferHandle, len: usize },
    DestroyIndexBuffer(IndexBufferHandle),
    CreateDynamicVertexBuffer { handle: DynamicVertexBufferHandle, capacity: u32 },
    UpdateDynamicVertexBuffer { handle: DynamicVertexBufferHandle, vertices: Vec<Vertex> },
    DestroyDynamicVertexBuffer(DynamicVertexBufferHandle),
    CreateDynamicIndexBuffer { handle: DynamicIndexBufferHandle, capacity: u32 },
    UpdateDynamicIndexBuffer { handle: DynamicIndexBufferHandle, indices: Vec<u32> },
    DestroyDynamicIndexBuffer(DynamicIndexBufferHandle),
    CreateTexture { handle: TextureHandle, desc: TextureDesc, len: usize },
    DestroyTexture(TextureHandle),
    CreateSamplerUniform { handle: UniformHandle, name: String },
    DestroyUniform(UniformHandle),
    CreateProgram { handle: ProgramHandle, label: String, textured: bool },
    DestroyProgram(ProgramHandle),
    SetViewClear { view: ViewId, clear: ViewClear },
    SetViewRect { view: ViewId, rect: ViewRect },
    SetViewScissor { view: ViewId, rect: ViewRect },
    SetViewTransform { view: ViewId, view_mtx: Mat4, proj: Mat4 },
    SetTransform(Mat4),
    SetVertexBuffer(VertexSource),
    SetIndexBuffer(IndexSource),
    SetTexture { stage: u8, sampler: UniformHandle, texture: TextureHandle },
    SetState(RenderState),
    Submit(Submission),
}

/// Snapshot of the per-draw state at `submit` time.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub view: ViewId,
    pub program: ProgramHandle,
    pub vertices: Option<VertexSource>,
    pub indices: Option<IndexSource>,
    pub texture: Option<(u8, UniformHandle, TextureHandle)>,
    pub transform: Mat4,
    pub state: RenderState,
}

#[derive(Debug, Default)]
struct PendingDraw {
    vertices: Option<VertexSource>,
    indices: Option<IndexSource>,
    texture: Option<(u8, UniformHandle, TextureHandle)>,
    transform: Option<Mat4>,
    state: Option<RenderState>,
}

#[derive(Debug, Default)]
struct Live {
    next: u32,
    handles: BTreeSet<u32>,
}

impl Live {
    fn alloc(&mut self) -> u32 {
        let h = self.next;
        self.next += 1;
        self.handles.insert(h);
        h
    }

    fn free(&mut self, kind: &str, h: u32) {
        if !self.handles.remove(&h) {
            log::warn!("RecordingGfx: destroy of unknown {kind} {h}");
        }
    }
}

/// Backend that performs no GPU work and records every call in order.
///
/// Handles are allocated per kind starting at 0 and never reused, which keeps
/// assertions in tests stable.
#[derive(Debug, Default)]
pub struct RecordingGfx {
    calls: Vec<GfxCall>,
    pending: PendingDraw,

    vertex_buffers: Live,
    index_buffers: Live,
    dynamic_vertex_buffers: Live,
    dynamic_index_buffers: Live,
    textures: Live,
    uniforms: Live,
    programs: Live,
}

impl RecordingGfx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<GfxCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.calls.iter().filter_map(|c| match c {
            GfxCall::Submit(s) => Some(s),
            _ => None,
        })
    }

    pub fn scissor_calls(&self) -> impl Iterator<Item = (ViewId, ViewRect)> + '_ {
        self.calls.iter().filter_map(|c| match c {
            GfxCall::SetViewScissor { view, rect } => Some((*view, *rect)),
            _ => None,
        })
    }

    pub fn live_vertex_buffers(&self) -> usize {
        self.vertex_buffers.handles.len()
    }

    pub fn live_index_buffers(&self) -> usize {
        self.index_buffers.handles.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.handles.len()
    }

    pub fn live_uniforms(&self) -> usize {
        self.uniforms.handles.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.handles.len()
    }

    pub fn live_dynamic_buffers(&self) -> usize {
        self.dynamic_vertex_buffers.handles.len() + self.dynamic_index_buffers.handles.len()
    }

    fn record(&mut self, call: GfxCall) {
        self.calls.push(call);
    }
}

impl GfxBackend for RecordingGfx {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> VertexBufferHandle {
        let handle = VertexBufferHandle::from_raw(self.vertex_buffers.alloc());
        self.record(GfxCall::CreateVertexBuffer { handle, len: vertices.len() });
        handle
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        self.vertex_buffers.free("vertex buffer", handle.raw());
        self.record(GfxCall::DestroyVertexBuffer(handle));
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> IndexBufferHandle {
        let handle = IndexBufferHandle::from_raw(self.index_buffers.alloc());
        self.record(GfxCall::CreateIndexBuffer { handle, len: indices.len() });
        handle
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        self.index_buffers.free("index buffer", handle.raw());
        self.record(GfxCall::DestroyIndexBuffer(handle));
    }

    fn create_dynamic_vertex_buffer(&mut self, capacity: u32) -> DynamicVertexBufferHandle {
        let handle = DynamicVertexBufferHandle::from_raw(self.dynamic_vertex_buffers.alloc());
        self.record(GfxCall::CreateDynamicVertexBuffer { handle, capacity });
        handle
    }

    fn update_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle, vertices: &[Vertex]) {
        self.record(GfxCall::UpdateDynamicVertexBuffer { handle, vertices: vertices.to_vec() });
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle) {
        self.dynamic_vertex_buffers.free("dynamic vertex buffer", handle.raw());
        self.record(GfxCall::DestroyDynamicVertexBuffer(handle));
    }

    fn create_dynamic_index_buffer(&mut self, capacity: u32) -> DynamicIndexBufferHandle {
        let handle = DynamicIndexBufferHandle::from_raw(self.dynamic_index_buffers.alloc());
        self.record(GfxCall::CreateDynamicIndexBuffer { handle, capacity });
        handle
    }

    fn update_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle, indices: &[u32]) {
        self.record(GfxCall::UpdateDynamicIndexBuffer { handle, indices: indices.to_vec() });
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle) {
        self.dynamic_index_buffers.free("dynamic index buffer", handle.raw());
        self.record(GfxCall::DestroyDynamicIndexBuffer(handle));
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> TextureHandle {
        let handle = TextureHandle::from_raw(self.textures.alloc());
        self.record(GfxCall::CreateTexture { handle, desc: *desc, len: pixels.len() });
        handle
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.textures.free("texture", handle.raw());
        self.record(GfxCall::DestroyTexture(handle));
    }

    fn create_sampler_uniform(&mut self, name: &str) -> UniformHandle {
        let handle = UniformHandle::from_raw(self.uniforms.alloc());
        self.record(GfxCall::CreateSamplerUniform { handle, name: name.to_string() });
        handle
    }

    fn destroy_uniform(&mut self, handle: UniformHandle) {
        self.uniforms.free("uniform", handle.raw());
        self.record(GfxCall::DestroyUniform(handle));
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> ProgramHandle {
        let handle = ProgramHandle::from_raw(self.programs.alloc());
        self.record(GfxCall::CreateProgram {
            handle,
            label: desc.label.to_string(),
            textured: desc.textured,
        });
        handle
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        self.programs.free("program", handle.raw());
        self.record(GfxCall::DestroyProgram(handle));
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear) {
        self.record(GfxCall::SetViewClear { view, clear });
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        self.record(GfxCall::SetViewRect { view, rect });
    }

    fn set_view_scissor(&mut self, view: ViewId, rect: ViewRect) {
        self.record(GfxCall::SetViewScissor { view, rect });
    }

    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4) {
        self.record(GfxCall::SetViewTransform { view, view_mtx: *view_mtx, proj: *proj });
    }

    fn set_transform(&mut self, model: &Mat4) {
        self.pending.transform = Some(*model);
        self.record(GfxCall::SetTransform(*model));
    }

    fn set_vertex_buffer(&mut self, source: VertexSource) {
        self.pending.vertices = Some(source);
        self.record(GfxCall::SetVertexBuffer(source));
    }

    fn set_index_buffer(&mut self, source: IndexSource) {
        self.pending.indices = Some(source);
        self.record(GfxCall::SetIndexBuffer(source));
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        self.pending.texture = Some((stage, sampler, texture));
        self.record(GfxCall::SetTexture { stage, sampler, texture });
    }

    fn set_state(&mut self, state: RenderState) {
        self.pending.state = Some(state);
        self.record(GfxCall::SetState(state));
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        let pending = std::mem::take(&mut self.pending);
        self.record(GfxCall::Submit(Submission {
            view,
            program,
            vertices: pending.vertices,
            indices: pending.indices,
            texture: pending.texture,
            transform: pending.transform.unwrap_or(Mat4::IDENTITY),
            state: pending.state.unwrap_or_default(),
        }));
    }
}
