use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::UniformSet;

use super::ctx::{RenderCtx, RenderTarget};
use super::offscreen::OffscreenTarget;
use super::uniforms::{EffectUniform, LUMINANCE_WEIGHTS};

const SCREEN_WGSL: &str = include_str!("shaders/screen.wgsl");

/// Screen shader with the greyscale weights injected from [`LUMINANCE_WEIGHTS`].
pub(crate) fn screen_shader_source() -> String {
    let [r, g, b] = LUMINANCE_WEIGHTS;
    format!("const LUMINANCE: vec3<f32> = vec3<f32>({r:?}, {g:?}, {b:?});\n{SCREEN_WGSL}")
}

/// Post-process applied by the composite pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Effect {
    #[default]
    PassThrough,
    Greyscale,
}

impl Effect {
    /// Value of the `effect` uniform.
    pub fn as_uniform(self) -> i32 {
        match self {
            Effect::PassThrough => 0,
            Effect::Greyscale => 1,
        }
    }

    pub fn from_enabled(greyscale: bool) -> Self {
        if greyscale { Effect::Greyscale } else { Effect::PassThrough }
    }
}

/// Draws the offscreen result onto the swapchain through a full-screen quad.
///
/// The swapchain is cleared to white first. No depth attachment is used.
pub struct CompositeRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    effect_ubo: wgpu::Buffer,

    quad_vbo: wgpu::Buffer,
}

impl CompositeRenderer {
    /// Binds the single-sample view of `source`.
    pub fn new(device: &wgpu::Device, source: &OffscreenTarget) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("statuary composite bgl"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<EffectUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("statuary composite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let effect_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("statuary composite effect ubo"),
            contents: bytemuck::bytes_of(&EffectUniform::new(Effect::PassThrough.as_uniform())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("statuary composite bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source.sampled_view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: effect_ubo.as_entire_binding(),
                },
            ],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("statuary composite quad vbo"),
            contents: bytemuck::cast_slice(&SCREEN_QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout,
            bind_group,
            effect_ubo,
            quad_vbo,
        }
    }

    /// Records the composite pass into `target`.
    ///
    /// `params` must hold the `effect` int. `viewport` is in physical pixels
    /// and is clamped to the surface.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        params: &UniformSet,
        viewport: (u32, u32),
    ) -> Result<()> {
        let effect = EffectUniform::from_set(params)?;

        self.ensure_pipeline(ctx);
        ctx.queue
            .write_buffer(&self.effect_ubo, 0, bytemuck::bytes_of(&effect));

        let Some(pipeline) = self.pipeline.as_ref() else { return Ok(()) };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("statuary composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let w = viewport.0.min(ctx.surface_size.0);
        let h = viewport.1.min(ctx.surface_size.1);
        if w == 0 || h == 0 {
            return Ok(());
        }
        rpass.set_viewport(0.0, 0.0, w as f32, h as f32, 0.0, 1.0);

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.draw(0..SCREEN_QUAD.len() as u32, 0..1);

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("statuary screen shader"),
            source: wgpu::ShaderSource::Wgsl(screen_shader_source().into()),
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("statuary composite pipeline layout"),
                bind_group_layouts: &[&self.bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("statuary composite pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[ScreenVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ScreenVertex {
    pos: [f32; 2], // NDC
    uv: [f32; 2],  // top-left origin
}

impl ScreenVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2  // uv
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ScreenVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles covering NDC. Texture rows start at the top, so NDC +Y
/// maps to v = 0.
const SCREEN_QUAD: [ScreenVertex; 6] = [
    ScreenVertex { pos: [-1.0, 1.0], uv: [0.0, 0.0] },
    ScreenVertex { pos: [-1.0, -1.0], uv: [0.0, 1.0] },
    ScreenVertex { pos: [1.0, -1.0], uv: [1.0, 1.0] },
    ScreenVertex { pos: [-1.0, 1.0], uv: [0.0, 0.0] },
    ScreenVertex { pos: [1.0, -1.0], uv: [1.0, 1.0] },
    ScreenVertex { pos: [1.0, 1.0], uv: [1.0, 0.0] },
];
