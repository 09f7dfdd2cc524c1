//! wgpu implementation of [`GfxBackend`].
//!
//! Submitted draws are recorded per view and replayed by [`WgpuGfx::render`]
//! once per frame. Dynamic buffer contents are copied into per-frame arenas at
//! submit time, so updating a dynamic buffer between two submits within one
//! frame does what the caller expects.

mod ctx;
mod pipeline;
mod slots;
mod transient;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::coords::Mat4;

use super::backend::GfxBackend;
use super::handle::{
    DynamicIndexBufferHandle, DynamicVertexBufferHandle, IndexBufferHandle, ProgramHandle,
    TextureHandle, UniformHandle, VertexBufferHandle,
};
use super::types::{
    IndexSource, ProgramDesc, RenderState, SamplerFlags, TextureDesc, VertexSource, ViewClear,
    ViewId, ViewRect,
};
use super::vertex::Vertex;

pub use ctx::{RenderCtx, RenderTarget};

use pipeline::{Layouts, Program};
use slots::Slots;
use transient::TransientBuffer;

struct StaticBuffer {
    buffer: wgpu::Buffer,
    len: u32,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Default)]
struct View {
    rect: ViewRect,
    scissor: ViewRect,
    clear: ViewClear,
    view_mtx: Mat4,
    proj: Mat4,
    draws: Vec<Draw>,
}

enum DrawVertices {
    Static { buffer: wgpu::Buffer, count: u32 },
    Transient { base: u32, count: u32 },
}

enum DrawIndices {
    Static { buffer: wgpu::Buffer, count: u32 },
    Transient { first: u32, count: u32 },
}

struct Draw {
    pipeline: wgpu::RenderPipeline,
    vertices: DrawVertices,
    indices: Option<DrawIndices>,
    texture: Option<wgpu::BindGroup>,
    model: Mat4,
    scissor: ViewRect,
}

/// Per-draw state accumulated between submits.
#[derive(Default)]
struct Pending {
    model: Mat4,
    vertices: Option<VertexSource>,
    indices: Option<IndexSource>,
    texture: Option<TextureHandle>,
    state: RenderState,
}

/// Renders the draw-call protocol through wgpu.
pub struct WgpuGfx {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,

    layouts: Layouts,
    transform_stride: u64,

    vertex_buffers: Slots<StaticBuffer>,
    index_buffers: Slots<StaticBuffer>,
    dynamic_vertices: Slots<Vec<Vertex>>,
    dynamic_indices: Slots<Vec<u32>>,
    textures: Slots<GpuTexture>,
    samplers: HashMap<SamplerFlags, wgpu::Sampler>,
    uniforms: Slots<String>,
    programs: Slots<Program>,
    pipelines: HashMap<(ProgramHandle, RenderState), wgpu::RenderPipeline>,

    views: BTreeMap<ViewId, View>,
    pending: Pending,

    // Per-frame arenas, filled at submit and uploaded at render.
    frame_vertices: Vec<Vertex>,
    frame_indices: Vec<u32>,

    transient_vertices: TransientBuffer,
    transient_indices: TransientBuffer,
    transforms: TransientBuffer,
    transform_bind_group: Option<wgpu::BindGroup>,
}

impl WgpuGfx {
    /// Creates a backend rendering into targets of `ctx.surface_format`.
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let device = ctx.device.clone();
        let layouts = Layouts::new(&device);
        let transform_stride = pipeline::transform_stride(&device);

        log::debug!(
            "WgpuGfx: surface format {:?}, transform stride {} bytes",
            ctx.surface_format,
            transform_stride
        );

        Self {
            queue: ctx.queue.clone(),
            surface_format: ctx.surface_format,
            layouts,
            transform_stride,

            vertex_buffers: Slots::default(),
            index_buffers: Slots::default(),
            dynamic_vertices: Slots::default(),
            dynamic_indices: Slots::default(),
            textures: Slots::default(),
            samplers: HashMap::new(),
            uniforms: Slots::default(),
            programs: Slots::default(),
            pipelines: HashMap::new(),

            views: BTreeMap::new(),
            pending: Pending::default(),

            frame_vertices: Vec::new(),
            frame_indices: Vec::new(),

            transient_vertices: TransientBuffer::new(
                "rivet transient vbo",
                wgpu::BufferUsages::VERTEX,
                64 * std::mem::size_of::<Vertex>() as u64,
            ),
            transient_indices: TransientBuffer::new(
                "rivet transient ibo",
                wgpu::BufferUsages::INDEX,
                256 * std::mem::size_of::<u32>() as u64,
            ),
            transforms: TransientBuffer::new(
                "rivet transform ubo",
                wgpu::BufferUsages::UNIFORM,
                16 * transform_stride,
            ),
            transform_bind_group: None,

            device,
        }
    }

    /// Number of draws recorded for the current frame, across all views.
    pub fn pending_draws(&self) -> usize {
        self.views.values().map(|v| v.draws.len()).sum()
    }

    /// Replays every recorded draw into `target` and starts a new frame.
    ///
    /// Views render in ascending id order. A view with a clear color is
    /// cleared even when it has no draws.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if !ctx.viewport.is_empty() {
            // Uploads mutate; encoding only borrows.
            self.upload_frame();
            self.encode(ctx.viewport.width, ctx.viewport.height, target);
        }
        self.end_frame();
    }

    fn encode(&self, tw: u32, th: u32, target: &mut RenderTarget<'_>) {
        let Some(transform_bg) = self.transform_bind_group.as_ref() else { return };
        let transient_vbo = self.transient_vertices.buffer();
        let transient_ibo = self.transient_indices.buffer();

        let mut draw_index: u64 = 0;

        for (id, view) in &self.views {
            if view.draws.is_empty() && view.clear == ViewClear::None {
                continue;
            }

            let load = match view.clear {
                ViewClear::None => wgpu::LoadOp::Load,
                ViewClear::Color(rgba) => wgpu::LoadOp::Clear(clear_color(rgba)),
            };

            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rivet view pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let area = if view.rect.is_empty() {
                Some((0, 0, tw, th))
            } else {
                view.rect.clamp_to(tw, th)
            };
            let Some((vx, vy, vw, vh)) = area else {
                log::trace!("view {} lies outside the target", id.0);
                draw_index += view.draws.len() as u64;
                continue;
            };
            rpass.set_viewport(vx as f32, vy as f32, vw as f32, vh as f32, 0.0, 1.0);

            for draw in &view.draws {
                let offset = draw_index * self.transform_stride;
                draw_index += 1;

                let clip = if draw.scissor.is_none() {
                    Some((vx, vy, vw, vh))
                } else {
                    draw.scissor.clamp_to(tw, th)
                };
                let Some((sx, sy, sw, sh)) = clip else { continue };
                rpass.set_scissor_rect(sx, sy, sw, sh);

                rpass.set_pipeline(&draw.pipeline);
                rpass.set_bind_group(0, transform_bg, &[offset as u32]);
                if let Some(texture) = draw.texture.as_ref() {
                    rpass.set_bind_group(1, texture, &[]);
                }

                let (base_vertex, vertex_count) = match &draw.vertices {
                    DrawVertices::Static { buffer, count } => {
                        rpass.set_vertex_buffer(0, buffer.slice(..));
                        (0u32, *count)
                    }
                    DrawVertices::Transient { base, count } => {
                        let Some(vbo) = transient_vbo else { continue };
                        rpass.set_vertex_buffer(0, vbo.slice(..));
                        (*base, *count)
                    }
                };

                match &draw.indices {
                    None => {
                        rpass.draw(base_vertex..base_vertex + vertex_count, 0..1);
                    }
                    Some(DrawIndices::Static { buffer, count }) => {
                        rpass.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..*count, base_vertex as i32, 0..1);
                    }
                    Some(DrawIndices::Transient { first, count }) => {
                        let Some(ibo) = transient_ibo else { continue };
                        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(*first..*first + *count, base_vertex as i32, 0..1);
                    }
                }
            }
        }
    }

    /// Drops every recorded draw without rendering it.
    pub fn discard_frame(&mut self) {
        self.end_frame();
    }

    fn end_frame(&mut self) {
        for view in self.views.values_mut() {
            view.draws.clear();
        }
        self.frame_vertices.clear();
        self.frame_indices.clear();
    }

    fn upload_frame(&mut self) {
        self.transient_vertices.upload(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&self.frame_vertices),
        );
        self.transient_indices.upload(
            &self.device,
            &self.queue,
            bytemuck::cast_slice(&self.frame_indices),
        );

        // One mvp per draw, `transform_stride` apart, in render order.
        let stride = self.transform_stride as usize;
        let draw_count = self.pending_draws().max(1);
        let mut bytes = vec![0u8; draw_count * stride];
        let mut slot = 0usize;
        for view in self.views.values() {
            let view_proj = view.proj.mul(&view.view_mtx);
            for draw in &view.draws {
                let mvp = view_proj.mul(&draw.model);
                let at = slot * stride;
                bytes[at..at + std::mem::size_of::<Mat4>()].copy_from_slice(bytemuck::bytes_of(&mvp));
                slot += 1;
            }
        }

        let grew = self.transforms.upload(&self.device, &self.queue, &bytes);
        if grew || self.transform_bind_group.is_none() {
            self.transform_bind_group = self.transforms.buffer().map(|buffer| {
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("rivet transform bg"),
                    layout: &self.layouts.transform,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer,
                            offset: 0,
                            size: NonZeroU64::new(std::mem::size_of::<Mat4>() as u64),
                        }),
                    }],
                })
            });
        }
    }

    fn sampler(&mut self, flags: SamplerFlags) -> wgpu::Sampler {
        self.samplers
            .entry(flags)
            .or_insert_with(|| pipeline::create_sampler(&self.device, flags))
            .clone()
    }

    fn resolve_vertices(&mut self, source: VertexSource) -> Option<DrawVertices> {
        match source {
            VertexSource::Static(h) => {
                let Some(b) = self.vertex_buffers.get(h.raw()) else {
                    log::warn!("submit: unknown vertex buffer {:?}", h);
                    return None;
                };
                Some(DrawVertices::Static { buffer: b.buffer.clone(), count: b.len })
            }
            VertexSource::Dynamic(h) => {
                let Some(data) = self.dynamic_vertices.get(h.raw()) else {
                    log::warn!("submit: unknown dynamic vertex buffer {:?}", h);
                    return None;
                };
                let base = self.frame_vertices.len() as u32;
                self.frame_vertices.extend_from_slice(data);
                Some(DrawVertices::Transient { base, count: data.len() as u32 })
            }
        }
    }

    fn resolve_indices(&mut self, source: IndexSource) -> Option<DrawIndices> {
        match source {
            IndexSource::Static(h) => {
                let Some(b) = self.index_buffers.get(h.raw()) else {
                    log::warn!("submit: unknown index buffer {:?}", h);
                    return None;
                };
                Some(DrawIndices::Static { buffer: b.buffer.clone(), count: b.len })
            }
            IndexSource::Dynamic(h) => {
                let Some(data) = self.dynamic_indices.get(h.raw()) else {
                    log::warn!("submit: unknown dynamic index buffer {:?}", h);
                    return None;
                };
                let first = self.frame_indices.len() as u32;
                self.frame_indices.extend_from_slice(data);
                Some(DrawIndices::Transient { first, count: data.len() as u32 })
            }
        }
    }
}

fn clear_color(rgba: u32) -> wgpu::Color {
    let c = |shift: u32| ((rgba >> shift) & 0xff) as f64 / 255.0;
    wgpu::Color { r: c(24), g: c(16), b: c(8), a: c(0) }
}

fn static_buffer(
    device: &wgpu::Device,
    label: &str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
    len: u32,
) -> StaticBuffer {
    // Zero-sized buffers cannot be bound; keep a word of padding.
    let pad = [0u8; 4];
    let contents = if contents.is_empty() { &pad[..] } else { contents };
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage,
    });
    StaticBuffer { buffer, len }
}

impl GfxBackend for WgpuGfx {
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> VertexBufferHandle {
        let b = static_buffer(
            &self.device,
            "rivet vbo",
            bytemuck::cast_slice(vertices),
            wgpu::BufferUsages::VERTEX,
            vertices.len() as u32,
        );
        VertexBufferHandle::from_raw(self.vertex_buffers.insert(b))
    }

    fn destroy_vertex_buffer(&mut self, handle: VertexBufferHandle) {
        if self.vertex_buffers.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown vertex buffer {:?}", handle);
        }
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> IndexBufferHandle {
        let b = static_buffer(
            &self.device,
            "rivet ibo",
            bytemuck::cast_slice(indices),
            wgpu::BufferUsages::INDEX,
            indices.len() as u32,
        );
        IndexBufferHandle::from_raw(self.index_buffers.insert(b))
    }

    fn destroy_index_buffer(&mut self, handle: IndexBufferHandle) {
        if self.index_buffers.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown index buffer {:?}", handle);
        }
    }

    fn create_dynamic_vertex_buffer(&mut self, capacity: u32) -> DynamicVertexBufferHandle {
        let idx = self.dynamic_vertices.insert(Vec::with_capacity(capacity as usize));
        DynamicVertexBufferHandle::from_raw(idx)
    }

    fn update_dynamic_vertex_buffer(
        &mut self,
        handle: DynamicVertexBufferHandle,
        vertices: &[Vertex],
    ) {
        match self.dynamic_vertices.get_mut(handle.raw()) {
            Some(data) => {
                data.clear();
                data.extend_from_slice(vertices);
            }
            None => log::warn!("update of unknown dynamic vertex buffer {:?}", handle),
        }
    }

    fn destroy_dynamic_vertex_buffer(&mut self, handle: DynamicVertexBufferHandle) {
        if self.dynamic_vertices.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown dynamic vertex buffer {:?}", handle);
        }
    }

    fn create_dynamic_index_buffer(&mut self, capacity: u32) -> DynamicIndexBufferHandle {
        let idx = self.dynamic_indices.insert(Vec::with_capacity(capacity as usize));
        DynamicIndexBufferHandle::from_raw(idx)
    }

    fn update_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle, indices: &[u32]) {
        match self.dynamic_indices.get_mut(handle.raw()) {
            Some(data) => {
                data.clear();
                data.extend_from_slice(indices);
            }
            None => log::warn!("update of unknown dynamic index buffer {:?}", handle),
        }
    }

    fn destroy_dynamic_index_buffer(&mut self, handle: DynamicIndexBufferHandle) {
        if self.dynamic_indices.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown dynamic index buffer {:?}", handle);
        }
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc, pixels: &[u8]) -> TextureHandle {
        let (width, height) = if desc.width == 0 || desc.height == 0 {
            log::warn!("create_texture_2d: {}x{} texture clamped to 1x1", desc.width, desc.height);
            (1, 1)
        } else {
            (desc.width, desc.height)
        };

        let expected = width as usize * height as usize * 4;
        let mut owned;
        let data = if pixels.len() == expected {
            pixels
        } else {
            log::error!(
                "create_texture_2d: {} bytes of pixel data for a {}x{} texture (expected {})",
                pixels.len(),
                width,
                height,
                expected
            );
            owned = pixels.to_vec();
            owned.resize(expected, 0);
            &owned[..]
        };

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("rivet texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.sampler(desc.sampler);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rivet texture bg"),
            layout: &self.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let idx = self.textures.insert(GpuTexture { _texture: texture, bind_group });
        TextureHandle::from_raw(idx)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown texture {:?}", handle);
        }
    }

    fn create_sampler_uniform(&mut self, name: &str) -> UniformHandle {
        UniformHandle::from_raw(self.uniforms.insert(name.to_owned()))
    }

    fn destroy_uniform(&mut self, handle: UniformHandle) {
        if self.uniforms.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown uniform {:?}", handle);
        }
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> ProgramHandle {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.wgsl.into()),
        });

        let program = Program {
            label: desc.label.to_owned(),
            module,
            vertex_entry: desc.vertex_entry.to_owned(),
            fragment_entry: desc.fragment_entry.to_owned(),
            textured: desc.textured,
        };
        ProgramHandle::from_raw(self.programs.insert(program))
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        if self.programs.remove(handle.raw()).is_none() {
            log::warn!("destroy of unknown program {:?}", handle);
            return;
        }
        self.pipelines.retain(|(program, _), _| *program != handle);
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ViewClear) {
        self.views.entry(view).or_default().clear = clear;
    }

    fn set_view_rect(&mut self, view: ViewId, rect: ViewRect) {
        self.views.entry(view).or_default().rect = rect;
    }

    fn set_view_scissor(&mut self, view: ViewId, rect: ViewRect) {
        self.views.entry(view).or_default().scissor = rect;
    }

    fn set_view_transform(&mut self, view: ViewId, view_mtx: &Mat4, proj: &Mat4) {
        let v = self.views.entry(view).or_default();
        v.view_mtx = *view_mtx;
        v.proj = *proj;
    }

    fn set_transform(&mut self, model: &Mat4) {
        self.pending.model = *model;
    }

    fn set_vertex_buffer(&mut self, source: VertexSource) {
        self.pending.vertices = Some(source);
    }

    fn set_index_buffer(&mut self, source: IndexSource) {
        self.pending.indices = Some(source);
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        if stage != 0 {
            log::warn!("set_texture: only stage 0 is supported (got {})", stage);
            return;
        }
        if self.uniforms.get(sampler.raw()).is_none() {
            log::warn!("set_texture: unknown sampler uniform {:?}", sampler);
            return;
        }
        self.pending.texture = Some(texture);
    }

    fn set_state(&mut self, state: RenderState) {
        self.pending.state = state;
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        let pending = std::mem::take(&mut self.pending);

        // A submit without vertices only touches the view, so its clear runs.
        let Some(source) = pending.vertices else {
            log::trace!("submit: touch on view {}", view.0);
            self.views.entry(view).or_default();
            return;
        };

        let Some(prog) = self.programs.get(program.raw()) else {
            log::warn!("submit: unknown program {:?}", program);
            return;
        };
        let textured = prog.textured;

        let texture = if textured {
            let bind_group = pending
                .texture
                .and_then(|t| self.textures.get(t.raw()))
                .map(|t| t.bind_group.clone());
            if bind_group.is_none() {
                log::warn!("submit: textured program {:?} without a bound texture", program);
                return;
            }
            bind_group
        } else {
            None
        };

        let pipeline = match self.pipelines.entry((program, pending.state)) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e) => {
                log::debug!("building pipeline for {:?} with {:?}", program, pending.state);
                e.insert(pipeline::create_pipeline(
                    &self.device,
                    &self.layouts,
                    prog,
                    pending.state,
                    self.surface_format,
                ))
                .clone()
            }
        };

        let Some(vertices) = self.resolve_vertices(source) else { return };
        let indices = match pending.indices {
            Some(source) => match self.resolve_indices(source) {
                Some(indices) => Some(indices),
                None => return,
            },
            None => None,
        };

        let empty = match (&vertices, &indices) {
            (DrawVertices::Static { count, .. } | DrawVertices::Transient { count, .. }, None) => {
                *count == 0
            }
            (_, Some(DrawIndices::Static { count, .. } | DrawIndices::Transient { count, .. })) => {
                *count == 0
            }
        };
        if empty {
            log::trace!("submit: empty draw dropped");
            return;
        }

        let v = self.views.entry(view).or_default();
        let scissor = v.scissor;
        v.draws.push(Draw {
            pipeline,
            vertices,
            indices,
            texture,
            model: pending.model,
            scissor,
        });
    }
}
