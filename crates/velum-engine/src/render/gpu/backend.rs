use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::batch::{QuadInstance, RectInstance};
use crate::render::{CommandRecorder, GpuDevice, RenderCtx, RenderTarget};
use crate::shader::{ShaderFactory, ShaderId, ShaderProgram};

use super::common::{
    premul_alpha_blend, viewport_ubo_min_binding_size, QuadVertex, ViewportUniform, QUAD_INDICES,
    QUAD_VERTICES,
};
use super::GpuTextures;

struct Pipeline {
    id: ShaderId,
    pipeline: wgpu::RenderPipeline,
    textured: bool,
}

/// wgpu implementation of [`GpuDevice`] and [`ShaderFactory`].
///
/// Device calls made during a frame are recorded. [`WgpuBackend::encode`]
/// uploads all recorded instances with one buffer write and replays the
/// draws in a single render pass, in call order.
///
/// Bindings:
/// - group 0: viewport uniform (all programs)
/// - group 1: texture + sampler (texture and font programs)
pub struct WgpuBackend {
    device: wgpu::Device,
    surface_format: wgpu::TextureFormat,
    textures: Rc<RefCell<GpuTextures>>,

    pipelines: Vec<Pipeline>,
    viewport_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: u64,

    recorder: CommandRecorder,
}

impl WgpuBackend {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        textures: Rc<RefCell<GpuTextures>>,
    ) -> Self {
        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("velum viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: viewport_ubo_min_binding_size(),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("velum texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("velum sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("velum viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("velum viewport bind group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("velum quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("velum quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            device: device.clone(),
            surface_format,
            textures,
            pipelines: Vec::new(),
            viewport_layout,
            texture_layout,
            sampler,
            viewport_ubo,
            viewport_bind_group,
            quad_vbo,
            quad_ibo,
            instance_vbo: None,
            instance_capacity: 0,
            recorder: CommandRecorder::new(),
        }
    }

    /// Calls recorded since the last `encode`.
    #[inline]
    pub fn recorded(&self) -> &CommandRecorder {
        &self.recorder
    }

    /// Replays the recorded frame into `target` and clears the recording.
    pub fn encode(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.recorder.is_empty() {
            self.recorder.clear();
            return;
        }

        if ctx.surface_format != self.surface_format {
            log::warn!(
                "pipelines target {:?} but the frame is {:?}; dropping recorded draws",
                self.surface_format,
                ctx.surface_format
            );
            self.recorder.clear();
            return;
        }

        ctx.queue.write_buffer(
            &self.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(ctx.viewport)),
        );

        self.ensure_instance_capacity(ctx, self.recorder.staged().len() as u64);
        let Some(instance_vbo) = self.instance_vbo.as_ref() else {
            self.recorder.clear();
            return;
        };
        ctx.queue.write_buffer(instance_vbo, 0, self.recorder.staged());

        let texture_groups = self.texture_bind_groups(ctx);

        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("velum batch pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, &self.viewport_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
            rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

            for segment in self.recorder.segments() {
                let Some(pipeline) = self.pipelines.iter().find(|p| p.id == segment.program) else {
                    log::warn!("no pipeline for {}; skipping segment", segment.program);
                    continue;
                };
                if segment.bytes.is_empty() {
                    continue;
                }

                rpass.set_pipeline(&pipeline.pipeline);
                rpass.set_vertex_buffer(1, instance_vbo.slice(segment.bytes.clone()));

                for draw in &segment.draws {
                    if pipeline.textured {
                        let group = draw.texture.and_then(|id| texture_groups.get(&id));
                        let Some(group) = group else {
                            log::warn!("texture {:?} is not resident; skipping draw", draw.texture);
                            continue;
                        };
                        rpass.set_bind_group(1, group, &[]);
                    }
                    rpass.draw_indexed(0..6, 0, draw.instances.clone());
                }
            }
        }

        self.recorder.clear();
    }

    fn texture_bind_groups(&self, ctx: &RenderCtx<'_>) -> HashMap<u32, wgpu::BindGroup> {
        let textures = self.textures.borrow();
        self.recorder
            .texture_ids()
            .into_iter()
            .filter_map(|id| {
                let entry = textures.get(id)?;
                let group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("velum texture bind group"),
                    layout: &self.texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&entry.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });
                Some((id, group))
            })
            .collect()
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required: u64) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(4096);
        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("velum instance vbo"),
            size: new_cap,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }

    fn create_program(
        &mut self,
        name: &'static str,
        source: &'static str,
        instance_layout: wgpu::VertexBufferLayout<'static>,
        textured: bool,
    ) -> ShaderProgram {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layouts: &[&wgpu::BindGroupLayout] = if textured {
            &[&self.viewport_layout, &self.texture_layout]
        } else {
            &[&self.viewport_layout]
        };
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(name),
            bind_group_layouts: layouts,
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), instance_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(premul_alpha_blend()),
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

        let id = ShaderId(self.pipelines.len() as u32 + 1);
        self.pipelines.push(Pipeline { id, pipeline, textured });
        ShaderProgram { id, name: name.to_owned() }
    }
}

impl ShaderFactory for WgpuBackend {
    fn create_texture_shader(&mut self) -> ShaderProgram {
        self.create_program(
            "texture-shader",
            include_str!("shaders/texture.wgsl"),
            QuadInstance::layout(),
            true,
        )
    }

    fn create_font_shader(&mut self) -> ShaderProgram {
        self.create_program(
            "font-shader",
            include_str!("shaders/glyph.wgsl"),
            QuadInstance::layout(),
            true,
        )
    }

    fn create_rect_shader(&mut self) -> ShaderProgram {
        self.create_program(
            "rectangle-shader",
            include_str!("shaders/rect.wgsl"),
            RectInstance::layout(),
            false,
        )
    }
}

impl GpuDevice for WgpuBackend {
    fn use_program(&mut self, program: ShaderId) {
        self.recorder.use_program(program);
    }

    fn upload_instances(&mut self, bytes: &[u8]) {
        self.recorder.upload_instances(bytes);
    }

    fn bind_texture(&mut self, texture_id: u32) {
        self.recorder.bind_texture(texture_id);
    }

    fn draw_instances(&mut self, instances: Range<u32>) {
        self.recorder.draw_instances(instances);
    }
}
