//! Pipeline, layout and sampler construction shared by the wgpu backend.

use std::num::NonZeroU64;

use crate::coords::Mat4;
use crate::gfx::types::{AddressMode, Blend, FilterMode, RenderState, SamplerFlags};
use crate::gfx::vertex::Vertex;

// ── blend ─────────────────────────────────────────────────────────────────

fn straight_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

fn color_target(format: wgpu::TextureFormat, state: RenderState) -> wgpu::ColorTargetState {
    let mut write_mask = wgpu::ColorWrites::empty();
    if state.rgb_write {
        write_mask |= wgpu::ColorWrites::COLOR;
    }
    if state.alpha_write {
        write_mask |= wgpu::ColorWrites::ALPHA;
    }

    let blend = match state.blend {
        Blend::Replace => Some(wgpu::BlendState::REPLACE),
        Blend::Normal => Some(straight_alpha_blend()),
    };

    wgpu::ColorTargetState { format, blend, write_mask }
}

// ── layouts ───────────────────────────────────────────────────────────────

/// Bind group layouts and the two pipeline layouts every program uses.
pub(super) struct Layouts {
    pub transform: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
    pub color_pipeline: wgpu::PipelineLayout,
    pub textured_pipeline: wgpu::PipelineLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let transform = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rivet transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rivet texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let color_pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rivet color pipeline layout"),
            bind_group_layouts: &[&transform],
            immediate_size: 0,
        });

        let textured_pipeline = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rivet textured pipeline layout"),
            bind_group_layouts: &[&transform, &texture],
            immediate_size: 0,
        });

        Self {
            transform,
            texture,
            color_pipeline,
            textured_pipeline,
        }
    }
}

// ── programs ──────────────────────────────────────────────────────────────

/// Compiled program: shader module plus entry points.
pub(super) struct Program {
    pub label: String,
    pub module: wgpu::ShaderModule,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub textured: bool,
}

pub(super) fn create_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    program: &Program,
    state: RenderState,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = if program.textured {
        &layouts.textured_pipeline
    } else {
        &layouts.color_pipeline
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&program.label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: &program.module,
            entry_point: Some(program.vertex_entry.as_str()),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &program.module,
            entry_point: Some(program.fragment_entry.as_str()),
            compilation_options: Default::default(),
            targets: &[Some(color_target(format, state))],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // UI geometry arrives with either winding.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── samplers ──────────────────────────────────────────────────────────────

pub(super) fn create_sampler(device: &wgpu::Device, flags: SamplerFlags) -> wgpu::Sampler {
    fn address(mode: AddressMode) -> wgpu::AddressMode {
        match mode {
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        }
    }

    fn filter(mode: FilterMode) -> wgpu::FilterMode {
        match mode {
            FilterMode::Linear => wgpu::FilterMode::Linear,
            FilterMode::Point => wgpu::FilterMode::Nearest,
        }
    }

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("rivet sampler"),
        address_mode_u: address(flags.address_u),
        address_mode_v: address(flags.address_v),
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter(flags.mag_filter),
        min_filter: filter(flags.min_filter),
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

/// Byte stride between per-draw transforms in the uniform buffer.
pub(super) fn transform_stride(device: &wgpu::Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment as u64;
    let size = std::mem::size_of::<Mat4>() as u64;
    size.div_ceil(align) * align
}
