use anyhow::Result;

use crate::scene::{DrawCmd, DrawList, MeshId, UniformSet};

use super::ctx::RenderCtx;
use super::mesh::{Model, Vertex};
use super::offscreen::{OffscreenTarget, OFFSCREEN_COLOR_FORMAT, OFFSCREEN_DEPTH_FORMAT};
use super::uniforms::{CameraUniform, LightUniforms, ModelUniform};

const COMMON_WGSL: &str = include_str!("shaders/common.wgsl");
const BLENDING_WGSL: &str = include_str!("shaders/blending.wgsl");
const LIGHT_SOURCE_WGSL: &str = include_str!("shaders/light_source.wgsl");
const LIT_WGSL: &str = include_str!("shaders/lit.wgsl");

/// Renders a [`DrawList`] into an [`OffscreenTarget`].
///
/// Pipelines:
/// - billboard: alpha blended (src-alpha, one-minus-src-alpha), depth tested and written
/// - light marker: unlit, samples the marker mesh's diffuse map
/// - lit: Phong with the point lights and spotlight from the light uniform set
///
/// Bind groups: 0 camera, 1 model (dynamic offset per command),
/// 2 material, 3 lights (lit pipeline only).
///
/// Commands are drawn in list order. Pipelines are created lazily and rebuilt
/// when the target's sample count changes.
pub struct SceneRenderer {
    /// Clear color of the scene pass.
    pub clear_color: wgpu::Color,

    camera_bgl: wgpu::BindGroupLayout,
    model_bgl: wgpu::BindGroupLayout,
    material_bgl: wgpu::BindGroupLayout,
    lights_bgl: wgpu::BindGroupLayout,

    pipeline_samples: Option<u32>,
    billboard_pipeline: Option<wgpu::RenderPipeline>,
    marker_pipeline: Option<wgpu::RenderPipeline>,
    lit_pipeline: Option<wgpu::RenderPipeline>,

    camera_ubo: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lights_ubo: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,

    model_ubo: Option<wgpu::Buffer>,
    model_bind_group: Option<wgpu::BindGroup>,
    model_capacity: usize,
    model_stride: u64,

    billboard: GpuModel,
    marker: GpuModel,
    models: Vec<GpuModel>,

    warned_missing_mesh: bool,
}

/// A model plus one material bind group per material.
struct GpuModel {
    model: Model,
    materials: Vec<wgpu::BindGroup>,
}

/// Pipeline selector for a draw command.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Pass {
    Billboard,
    Marker,
    Lit,
}

impl SceneRenderer {
    /// `billboard` is drawn for every `DrawCmd::Billboard`, `marker` for every
    /// `DrawCmd::LightMarker`.
    pub fn new(device: &wgpu::Device, billboard: Model, marker: Model) -> Self {
        let camera_bgl = uniform_layout(
            device,
            "statuary camera bgl",
            wgpu::ShaderStages::VERTEX,
            false,
            std::mem::size_of::<CameraUniform>() as u64,
        );
        let model_bgl = uniform_layout(
            device,
            "statuary model bgl",
            wgpu::ShaderStages::VERTEX,
            true,
            std::mem::size_of::<ModelUniform>() as u64,
        );
        let lights_bgl = uniform_layout(
            device,
            "statuary lights bgl",
            wgpu::ShaderStages::FRAGMENT,
            false,
            std::mem::size_of::<LightUniforms>() as u64,
        );
        let material_bgl = material_layout(device);

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("statuary camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("statuary camera bind group"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        let lights_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("statuary lights ubo"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("statuary lights bind group"),
            layout: &lights_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_ubo.as_entire_binding(),
            }],
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let model_stride = align_to(std::mem::size_of::<ModelUniform>() as u64, alignment);

        let billboard = GpuModel::new(device, &material_bgl, billboard);
        let marker = GpuModel::new(device, &material_bgl, marker);

        Self {
            clear_color: wgpu::Color::BLACK,
            camera_bgl,
            model_bgl,
            material_bgl,
            lights_bgl,
            pipeline_samples: None,
            billboard_pipeline: None,
            marker_pipeline: None,
            lit_pipeline: None,
            camera_ubo,
            camera_bind_group,
            lights_ubo,
            lights_bind_group,
            model_ubo: None,
            model_bind_group: None,
            model_capacity: 0,
            model_stride,
            billboard,
            marker,
            models: Vec::new(),
            warned_missing_mesh: false,
        }
    }

    /// Registers a model for `DrawCmd::Opaque` and returns its handle.
    pub fn add_model(&mut self, device: &wgpu::Device, model: Model) -> MeshId {
        self.models.push(GpuModel::new(device, &self.material_bgl, model));
        MeshId(self.models.len() - 1)
    }

    /// Records the scene pass into `encoder`.
    ///
    /// `camera` must hold `projection` and `view`; `lights` must hold every
    /// name the lit shader reads. Missing names fail before anything is
    /// recorded.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenTarget,
        draw_list: &DrawList,
        camera: &UniformSet,
        lights: &UniformSet,
    ) -> Result<()> {
        let camera_u = CameraUniform::from_set(camera)?;
        let lights_u = LightUniforms::from_set(lights)?;

        self.ensure_pipelines(ctx, target.sample_count());
        self.ensure_model_capacity(ctx, draw_list.len());

        ctx.queue
            .write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&camera_u));
        ctx.queue
            .write_buffer(&self.lights_ubo, 0, bytemuck::bytes_of(&lights_u));
        self.write_model_uniforms(ctx, draw_list);

        // Now take immutable borrows.
        let Some(billboard_pipeline) = self.billboard_pipeline.as_ref() else { return Ok(()) };
        let Some(marker_pipeline) = self.marker_pipeline.as_ref() else { return Ok(()) };
        let Some(lit_pipeline) = self.lit_pipeline.as_ref() else { return Ok(()) };
        let Some(model_bind_group) = self.model_bind_group.as_ref() else { return Ok(()) };

        let mut missing_mesh = None;

        {
            let mut rpass = target.begin_pass(encoder, self.clear_color);
            rpass.set_bind_group(0, &self.camera_bind_group, &[]);

            let mut current = None;
            for (i, cmd) in draw_list.iter().enumerate() {
                let (pass, gpu_model) = match cmd {
                    DrawCmd::Billboard { .. } => (Pass::Billboard, &self.billboard),
                    DrawCmd::LightMarker { .. } => (Pass::Marker, &self.marker),
                    DrawCmd::Opaque { mesh, .. } => match self.models.get(mesh.0) {
                        Some(m) => (Pass::Lit, m),
                        None => {
                            missing_mesh = Some(*mesh);
                            continue;
                        }
                    },
                };

                if current != Some(pass) {
                    match pass {
                        Pass::Billboard => rpass.set_pipeline(billboard_pipeline),
                        Pass::Marker => rpass.set_pipeline(marker_pipeline),
                        Pass::Lit => {
                            rpass.set_pipeline(lit_pipeline);
                            rpass.set_bind_group(3, &self.lights_bind_group, &[]);
                        }
                    }
                    current = Some(pass);
                }

                let offset = (i as u64 * self.model_stride) as u32;
                rpass.set_bind_group(1, model_bind_group, &[offset]);

                for mesh in &gpu_model.model.meshes {
                    let Some(material) = gpu_model.materials.get(mesh.material) else { continue };
                    rpass.set_bind_group(2, material, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }
        }

        if let Some(mesh) = missing_mesh {
            if !self.warned_missing_mesh {
                log::warn!("SceneRenderer: unknown mesh {mesh:?}; draw skipped");
                self.warned_missing_mesh = true;
            }
        }

        Ok(())
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>, sample_count: u32) {
        if self.pipeline_samples == Some(sample_count) && self.lit_pipeline.is_some() {
            return;
        }

        let unlit_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("statuary unlit pipeline layout"),
                bind_group_layouts: &[&self.camera_bgl, &self.model_bgl, &self.material_bgl],
                immediate_size: 0,
            });
        let lit_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("statuary lit pipeline layout"),
                bind_group_layouts: &[
                    &self.camera_bgl,
                    &self.model_bgl,
                    &self.material_bgl,
                    &self.lights_bgl,
                ],
                immediate_size: 0,
            });

        self.billboard_pipeline = Some(create_pipeline(
            ctx.device,
            "statuary billboard",
            BLENDING_WGSL,
            &unlit_layout,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            sample_count,
        ));
        self.marker_pipeline = Some(create_pipeline(
            ctx.device,
            "statuary light marker",
            LIGHT_SOURCE_WGSL,
            &unlit_layout,
            None,
            sample_count,
        ));
        self.lit_pipeline = Some(create_pipeline(
            ctx.device,
            "statuary lit",
            LIT_WGSL,
            &lit_layout,
            None,
            sample_count,
        ));

        self.pipeline_samples = Some(sample_count);
        log::debug!("scene pipelines built for {sample_count} sample(s)");
    }

    fn ensure_model_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.model_capacity && self.model_ubo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(16);
        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("statuary model ubo"),
            size: new_cap as u64 * self.model_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("statuary model bind group"),
            layout: &self.model_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
        });

        self.model_ubo = Some(ubo);
        self.model_bind_group = Some(bind_group);
        self.model_capacity = new_cap;
    }

    fn write_model_uniforms(&self, ctx: &RenderCtx<'_>, draw_list: &DrawList) {
        let Some(ubo) = self.model_ubo.as_ref() else { return };
        if draw_list.is_empty() {
            return;
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; draw_list.len() * stride];
        for (i, cmd) in draw_list.iter().enumerate() {
            let u = ModelUniform::new(cmd.model());
            let src = bytemuck::bytes_of(&u);
            bytes[i * stride..i * stride + src.len()].copy_from_slice(src);
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }
}

impl GpuModel {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, model: Model) -> Self {
        let materials = model
            .materials
            .iter()
            .map(|m| {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("statuary material bind group"),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&m.diffuse.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&m.specular.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&m.diffuse.sampler),
                        },
                    ],
                })
            })
            .collect();

        Self { model, materials }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    dynamic: bool,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        }],
    })
}

fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("statuary material bgl"),
        entries: &[
            texture(0),
            texture(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Prepends the shared camera/object/material declarations.
fn scene_shader_source(shader_src: &str) -> String {
    format!("{COMMON_WGSL}\n{shader_src}")
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader_src: &str,
    layout: &wgpu::PipelineLayout,
    blend: Option<wgpu::BlendState>,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(scene_shader_source(shader_src).into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: OFFSCREEN_COLOR_FORMAT,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        // No culling: billboards and the floor are single-sided quads.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: OFFSCREEN_DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },

        multiview_mask: None,
        cache: None,
    })
}

fn align_to(value: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── shaders ───────────────────────────────────────────────────────────

    #[test]
    fn scene_shaders_validate_with_common_prelude() {
        for (name, src) in [
            ("blending", BLENDING_WGSL),
            ("light_source", LIGHT_SOURCE_WGSL),
            ("lit", LIT_WGSL),
        ] {
            let module = naga::front::wgsl::parse_str(&scene_shader_source(src))
                .unwrap_or_else(|e| panic!("{name}: parse error: {e}"));

            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::all(),
            );
            validator
                .validate(&module)
                .unwrap_or_else(|e| panic!("{name}: validation error: {e:?}"));

            for (stage, entry) in [(naga::ShaderStage::Vertex, "vs_main"), (naga::ShaderStage::Fragment, "fs_main")] {
                assert!(
                    module.entry_points.iter().any(|ep| ep.name == entry && ep.stage == stage),
                    "{name}: missing {entry}"
                );
            }
        }
    }

    // ── alignment ─────────────────────────────────────────────────────────

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(128, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn align_zero_is_identity() {
        assert_eq!(align_to(100, 0), 100);
    }
}
