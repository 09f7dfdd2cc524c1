use std::path::Path;

use rivet_engine::coords::{Mat4, Vec2};
use rivet_engine::gfx::{
    self, DynamicIndexBufferHandle, DynamicVertexBufferHandle, GfxBackend, IndexBufferHandle,
    IndexSource, ProgramHandle, RenderState, SamplerFlags, TextureDesc, UniformHandle,
    VertexBufferHandle, VertexSource, Vertex, ViewId, ViewRect,
};

use crate::error::AdapterError;
use crate::handle::{GeometryHandle, TextureHandle};
use crate::interface::{Dimensions, RenderInterface};
use crate::queue::GeometryQueue;
use crate::scissor::ScissorState;
use crate::table::ResourceTable;

/// Name of the sampler uniform textured programs read.
pub const SAMPLER_UNIFORM: &str = "s_texColor";

const DYNAMIC_VERTEX_CAPACITY: u32 = 4096;
const DYNAMIC_INDEX_CAPACITY: u32 = 8192;

/// Adapter construction parameters.
#[derive(Debug, Copy, Clone)]
pub struct RmlConfig {
    /// View every UI draw is submitted to.
    pub view: ViewId,
    /// Size of the UI area in pixels.
    pub width: u32,
    pub height: u32,
    /// Program for untextured geometry.
    pub color_program: ProgramHandle,
    /// Program for textured geometry; reads [`SAMPLER_UNIFORM`] at stage 0.
    pub texture_program: ProgramHandle,
    /// When set, the adapter owns the view's rect and transform.
    pub configure_view: bool,
}

impl RmlConfig {
    pub fn new(
        view: ViewId,
        width: u32,
        height: u32,
        color_program: ProgramHandle,
        texture_program: ProgramHandle,
    ) -> Self {
        Self {
            view,
            width,
            height,
            color_program,
            texture_program,
            configure_view: true,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct TextureRecord {
    texture: gfx::TextureHandle,
    dimensions: Dimensions,
}

#[derive(Debug, Copy, Clone)]
struct GeometryRecord {
    vertices: VertexBufferHandle,
    indices: Option<IndexBufferHandle>,
    /// Re-resolved on every draw; the texture may be released first.
    texture: TextureHandle,
}

/// [`RenderInterface`] implemented over a [`GfxBackend`].
///
/// Owns every backend resource it creates and destroys them on drop.
pub struct RmlAdapter<G: GfxBackend> {
    backend: G,
    config: RmlConfig,

    textures: ResourceTable<TextureRecord>,
    geometry: ResourceTable<GeometryRecord>,
    queue: GeometryQueue,
    scissor: ScissorState,

    dynamic_vertices: DynamicVertexBufferHandle,
    dynamic_indices: DynamicIndexBufferHandle,
    sampler: UniformHandle,
}

impl<G: GfxBackend> RmlAdapter<G> {
    pub fn new(mut backend: G, config: RmlConfig) -> Self {
        let dynamic_vertices = backend.create_dynamic_vertex_buffer(DYNAMIC_VERTEX_CAPACITY);
        let dynamic_indices = backend.create_dynamic_index_buffer(DYNAMIC_INDEX_CAPACITY);
        let sampler = backend.create_sampler_uniform(SAMPLER_UNIFORM);

        let mut adapter = Self {
            backend,
            config,
            textures: ResourceTable::new(),
            geometry: ResourceTable::new(),
            queue: GeometryQueue::default(),
            scissor: ScissorState::new(),
            dynamic_vertices,
            dynamic_indices,
            sampler,
        };

        if config.configure_view {
            adapter.apply_view(config.view);
        }
        log::debug!(
            "RmlAdapter: view {}, {}x{}",
            config.view.0,
            config.width,
            config.height
        );
        adapter
    }

    /// Sets the orthographic UI projection and full-size rect on `view`
    /// (the adapter's own view when `None`).
    pub fn set_view_parameters(&mut self, view: Option<ViewId>) {
        self.apply_view(view.unwrap_or(self.config.view));
    }

    /// Records a new UI size, re-applying view parameters when the adapter
    /// manages its view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        if self.config.configure_view {
            self.apply_view(self.config.view);
        }
    }

    #[inline]
    pub fn view(&self) -> ViewId {
        self.config.view
    }

    pub fn set_view(&mut self, view: ViewId) {
        self.config.view = view;
    }

    #[inline]
    pub fn color_program(&self) -> ProgramHandle {
        self.config.color_program
    }

    pub fn set_color_program(&mut self, program: ProgramHandle) {
        self.config.color_program = program;
    }

    #[inline]
    pub fn texture_program(&self) -> ProgramHandle {
        self.config.texture_program
    }

    pub fn set_texture_program(&mut self, program: ProgramHandle) {
        self.config.texture_program = program;
    }

    /// Submits every queued immediate draw in enqueue order and empties the
    /// queue. An empty queue makes no backend calls.
    ///
    /// Each draw is clipped by the scissor that was in effect when it was
    /// recorded; the live scissor is restored afterwards.
    pub fn flush_frame(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        let items = self.queue.take();
        log::trace!("flush_frame: {} immediate draws", items.len());

        let view = self.config.view;
        let live = self.scissor.applied();
        let mut applied = live;

        for item in items {
            if item.scissor != applied {
                self.backend.set_view_scissor(view, item.scissor);
                applied = item.scissor;
            }

            self.backend
                .update_dynamic_vertex_buffer(self.dynamic_vertices, &item.vertices);

            let indices = if item.indices.is_empty() {
                None
            } else {
                self.backend
                    .update_dynamic_index_buffer(self.dynamic_indices, &item.indices);
                Some(IndexSource::Dynamic(self.dynamic_indices))
            };

            let texture = self.resolve_texture(item.texture);
            self.submit(
                VertexSource::Dynamic(self.dynamic_vertices),
                indices,
                texture,
                item.translation,
            );
        }

        if applied != live {
            self.backend.set_view_scissor(view, live);
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    /// Immediate draws waiting for [`flush_frame`](Self::flush_frame).
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Size of a live texture.
    pub fn texture_dimensions(&self, texture: TextureHandle) -> Option<Dimensions> {
        self.textures.get(texture.raw()).map(|r| r.dimensions)
    }

    pub fn scissor(&self) -> ScissorState {
        self.scissor
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut G {
        &mut self.backend
    }

    fn apply_view(&mut self, view: ViewId) {
        let (w, h) = (self.config.width, self.config.height);
        let clamp = |v: u32| v.min(u16::MAX as u32) as u16;

        self.backend
            .set_view_rect(view, ViewRect::new(0, 0, clamp(w), clamp(h)));
        let proj = Mat4::ortho(0.0, w as f32, h as f32, 0.0, -1.0, 1.0);
        self.backend.set_view_transform(view, &Mat4::IDENTITY, &proj);
    }

    /// Maps a UI texture handle onto the backend texture. `NONE` and unknown
    /// handles mean untextured.
    fn resolve_texture(&self, texture: TextureHandle) -> Option<gfx::TextureHandle> {
        if texture.is_none() {
            return None;
        }
        let resolved = self.textures.get(texture.raw()).map(|r| r.texture);
        if resolved.is_none() {
            log::debug!("unknown texture {}; drawing untextured", texture.raw());
        }
        resolved
    }

    fn submit(
        &mut self,
        vertices: VertexSource,
        indices: Option<IndexSource>,
        texture: Option<gfx::TextureHandle>,
        translation: Vec2,
    ) {
        let b = &mut self.backend;
        b.set_transform(&Mat4::translation_2d(translation));
        b.set_vertex_buffer(vertices);
        if let Some(indices) = indices {
            b.set_index_buffer(indices);
        }

        let program = match texture {
            Some(texture) => {
                b.set_texture(0, self.sampler, texture);
                self.config.texture_program
            }
            None => self.config.color_program,
        };

        b.set_state(RenderState::UI);
        b.submit(self.config.view, program);
    }
}

impl<G: GfxBackend> RenderInterface for RmlAdapter<G> {
    fn render_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
        translation: Vec2,
    ) {
        let texture = match self.resolve_texture(texture) {
            Some(_) => texture,
            None => TextureHandle::NONE,
        };
        if !self.queue.push(vertices, indices, texture, translation, self.scissor.applied()) {
            log::trace!("render_geometry: no vertices, nothing queued");
        }
    }

    fn compile_geometry(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        texture: TextureHandle,
    ) -> GeometryHandle {
        let texture = match self.resolve_texture(texture) {
            Some(_) => texture,
            None => TextureHandle::NONE,
        };

        let vb = self.backend.create_vertex_buffer(vertices);
        let ib = (!indices.is_empty()).then(|| self.backend.create_index_buffer(indices));

        let handle = self.geometry.insert(GeometryRecord {
            vertices: vb,
            indices: ib,
            texture,
        });
        log::trace!(
            "compile_geometry: {} -> {} vertices, {} indices",
            handle,
            vertices.len(),
            indices.len()
        );
        GeometryHandle::from_raw(handle)
    }

    fn render_compiled_geometry(&mut self, geometry: GeometryHandle, translation: Vec2) {
        let Some(record) = self.geometry.get(geometry.raw()).copied() else {
            log::debug!("render_compiled_geometry: unknown geometry {}", geometry.raw());
            return;
        };

        let texture = self.resolve_texture(record.texture);
        self.submit(
            VertexSource::Static(record.vertices),
            record.indices.map(IndexSource::Static),
            texture,
            translation,
        );
    }

    fn release_compiled_geometry(&mut self, geometry: GeometryHandle) {
        let Some(record) = self.geometry.remove(geometry.raw()) else { return };
        self.backend.destroy_vertex_buffer(record.vertices);
        if let Some(ib) = record.indices {
            self.backend.destroy_index_buffer(ib);
        }
    }

    fn enable_scissor_region(&mut self, enable: bool) {
        let rect = self.scissor.enable(enable);
        self.backend.set_view_scissor(self.config.view, rect);
    }

    fn set_scissor_region(&mut self, x: i32, y: i32, width: i32, height: i32) {
        if let Some(rect) = self.scissor.set_region(x, y, width, height) {
            self.backend.set_view_scissor(self.config.view, rect);
        }
    }

    fn load_texture(&mut self, source: &Path) -> Result<(TextureHandle, Dimensions), AdapterError> {
        let image = image::open(source)
            .map_err(|err| AdapterError::ImageLoad {
                path: source.to_path_buf(),
                source: err,
            })?
            .into_rgba8();

        let dimensions = Dimensions::new(image.width(), image.height());
        if dimensions.is_empty() {
            return Err(AdapterError::EmptyImage { path: source.to_path_buf() });
        }

        let handle = self.generate_texture(image.as_raw(), dimensions)?;
        log::debug!(
            "loaded {} ({}x{}) as texture {}",
            source.display(),
            dimensions.width,
            dimensions.height,
            handle.raw()
        );
        Ok((handle, dimensions))
    }

    fn generate_texture(
        &mut self,
        pixels: &[u8],
        dimensions: Dimensions,
    ) -> Result<TextureHandle, AdapterError> {
        let expected = dimensions.width as usize * dimensions.height as usize * 4;
        if dimensions.is_empty() || pixels.len() != expected {
            log::warn!(
                "generate_texture: {} bytes for {}x{}, expected {expected}",
                pixels.len(),
                dimensions.width,
                dimensions.height
            );
            return Err(AdapterError::InvalidTextureData {
                width: dimensions.width,
                height: dimensions.height,
                len: pixels.len(),
            });
        }

        let desc = TextureDesc {
            width: dimensions.width,
            height: dimensions.height,
            sampler: SamplerFlags::CLAMP_POINT,
        };
        let texture = self.backend.create_texture_2d(&desc, pixels);
        let handle = self.textures.insert(TextureRecord { texture, dimensions });
        Ok(TextureHandle::from_raw(handle))
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if let Some(record) = self.textures.remove(texture.raw()) {
            self.backend.destroy_texture(record.texture);
        }
    }
}

impl<G: GfxBackend> Drop for RmlAdapter<G> {
    fn drop(&mut self) {
        let geometry = self.geometry.drain();
        let textures = self.textures.drain();
        log::debug!(
            "RmlAdapter: releasing {} geometries, {} textures",
            geometry.len(),
            textures.len()
        );

        for (_, record) in geometry {
            self.backend.destroy_vertex_buffer(record.vertices);
            if let Some(ib) = record.indices {
                self.backend.destroy_index_buffer(ib);
            }
        }
        for (_, record) in textures {
            self.backend.destroy_texture(record.texture);
        }

        self.backend.destroy_dynamic_vertex_buffer(self.dynamic_vertices);
        self.backend.destroy_dynamic_index_buffer(self.dynamic_indices);
        self.backend.destroy_uniform(self.sampler);
    }
}
