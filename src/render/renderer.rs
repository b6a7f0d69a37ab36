use glam::Vec2;
use tracing::debug;
use wgpu::util::DeviceExt as _;

use crate::{
    assets::{NoiseImage, load_noise},
    field::{slice::FieldSlice, store::FlowField},
    foundation::{
        config::FlowConfig,
        error::{FlowError, FlowResult},
    },
    playback::ActiveFrame,
    render::{
        camera::{CameraMatrices, Viewport},
        gpu::GpuContext,
        mesh::{QUAD_INDICES, QuadVertex, quad_vertices},
    },
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const VELOCITY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;
const VELOCITY_TEXEL_BYTES: u32 = 8;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    projection_matrix: [[f32; 4]; 4],
    modelview_matrix: [[f32; 4]; 4],
    cell_dim: [f32; 2],
    _pad: [f32; 2],
}

impl Globals {
    fn new(camera: &CameraMatrices, cell_dim: Vec2) -> Self {
        Self {
            projection_matrix: camera.projection.to_cols_array_2d(),
            modelview_matrix: camera.view.to_cols_array_2d(),
            cell_dim: cell_dim.to_array(),
            _pad: [0.0; 2],
        }
    }
}

struct DepthTarget {
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// GPU side of the viewer: the field quad, velocity and noise textures, and
/// the flow pipeline.
///
/// The velocity texture always holds one time step; [`FrameRenderer::draw`]
/// refreshes it only when the [`ActiveFrame`] has moved.
pub struct FrameRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    globals: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    target_format: wgpu::TextureFormat,
    velocity_texture: wgpu::Texture,
    velocity_extent: wgpu::Extent3d,
    _noise_texture: wgpu::Texture,
    depth: Option<DepthTarget>,
    cell_dim: Vec2,
    clear: wgpu::Color,
    uploads: u64,
}

impl FrameRenderer {
    /// One-time GPU resource creation for a `target_format` color target.
    ///
    /// A missing noise image or a pipeline that fails validation is fatal.
    #[tracing::instrument(skip_all, fields(format = ?target_format))]
    pub fn setup(
        gpu: &GpuContext,
        target_format: wgpu::TextureFormat,
        config: &FlowConfig,
    ) -> FlowResult<Self> {
        let noise = load_noise(&config.noise_path)?;
        Self::setup_with_noise(gpu, target_format, config, &noise)
    }

    /// Like [`FrameRenderer::setup`] with an already decoded noise image.
    pub fn setup_with_noise(
        gpu: &GpuContext,
        target_format: wgpu::TextureFormat,
        config: &FlowConfig,
        noise: &NoiseImage,
    ) -> FlowResult<Self> {
        let device = &gpu.device;
        let layout = &config.layout;
        layout.validate()?;

        let vertices = quad_vertices(layout);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flowvis_quad_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("flowvis_quad_indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let velocity_extent = wgpu::Extent3d {
            width: dim_u32(layout.x_cells, "x_cells")?,
            height: dim_u32(layout.y_cells, "y_cells")?,
            depth_or_array_layers: 1,
        };
        gpu.check_texture_size("velocity", velocity_extent.width, velocity_extent.height)?;
        gpu.check_texture_size("noise", noise.width, noise.height)?;
        let velocity_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("flowvis_velocity"),
            size: velocity_extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: VELOCITY_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let velocity_view = velocity_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let velocity_sampler = device.create_sampler(&gpu.caps.velocity_sampler_desc());

        let noise_extent = wgpu::Extent3d {
            width: noise.width,
            height: noise.height,
            depth_or_array_layers: 1,
        };
        let noise_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("flowvis_noise"),
            size: noise_extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &noise_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &noise.rgba8,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(noise.width * 4),
                rows_per_image: Some(noise.height),
            },
            noise_extent,
        );
        let noise_view = noise_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let noise_sampler = device.create_sampler(&gpu.caps.noise_sampler_desc());

        let cell_dim = layout.cell_dim();
        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flowvis_globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flowvis_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<Globals>() as u64
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: gpu.caps.velocity_sample_type(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(gpu.caps.velocity_sampler_binding()),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flowvis_bg"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&velocity_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&velocity_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&noise_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&noise_sampler),
                },
            ],
        });

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flowvis_vs"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flow_vs.wgsl").into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("flowvis_fs"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/flow_fs.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flowvis_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("flowvis_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(FlowError::gpu(format!("flow pipeline failed validation: {err}")));
        }

        let [r, g, b, a] = config.clear_color();
        tracing::info!(
            width = velocity_extent.width,
            height = velocity_extent.height,
            noise_width = noise.width,
            noise_height = noise.height,
            "flow renderer ready"
        );

        Ok(Self {
            pipeline,
            bind_group,
            globals,
            vertex_buffer,
            index_buffer,
            index_count: QUAD_INDICES.len() as u32,
            target_format,
            velocity_texture,
            velocity_extent,
            _noise_texture: noise_texture,
            depth: None,
            cell_dim,
            clear: wgpu::Color { r, g, b, a },
            uploads: 0,
        })
    }

    /// Number of velocity uploads performed so far.
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Draw one frame into `target`, whose size must equal `viewport` and
    /// whose format must be the one the renderer was set up for.
    ///
    /// Refreshes the velocity texture first when `frame` is stale, so no
    /// geometry is ever drawn against an outdated time step.
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        target: &wgpu::Texture,
        field: &FlowField,
        frame: &mut ActiveFrame,
        camera: &CameraMatrices,
        viewport: Viewport,
    ) -> FlowResult<()> {
        if (target.width(), target.height()) != (viewport.width, viewport.height) {
            return Err(FlowError::validation(format!(
                "viewport {}x{} does not match render target {}x{}",
                viewport.width,
                viewport.height,
                target.width(),
                target.height()
            )));
        }
        if target.format() != self.target_format {
            return Err(FlowError::validation(format!(
                "render target is {:?}, pipeline was built for {:?}",
                target.format(),
                self.target_format
            )));
        }

        let texture = &self.velocity_texture;
        let extent = self.velocity_extent;
        let uploaded = frame.sync(|t| {
            let slice = field.slice(t)?;
            upload_velocity(&gpu.queue, texture, extent, slice)
        })?;
        if uploaded {
            self.uploads += 1;
            debug!(t = frame.time_index(), "velocity texture refreshed");
        }

        self.ensure_depth(gpu, viewport)?;
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let Some(depth) = self.depth.as_ref() else {
            return Err(FlowError::gpu("depth target not initialized"));
        };

        let globals = Globals::new(camera, self.cell_dim);
        gpu.queue
            .write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flowvis_frame_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("flowvis_frame_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_viewport(
                0.0,
                0.0,
                viewport.width as f32,
                viewport.height as f32,
                0.0,
                1.0,
            );
            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.bind_group, &[]);
            rp.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rp.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rp.draw_indexed(0..self.index_count, 0, 0..1);
        }
        gpu.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn ensure_depth(&mut self, gpu: &GpuContext, viewport: Viewport) -> FlowResult<()> {
        let fits = self
            .depth
            .as_ref()
            .map(|d| d.width == viewport.width && d.height == viewport.height)
            .unwrap_or(false);
        if fits {
            return Ok(());
        }
        gpu.check_texture_size("depth", viewport.width, viewport.height)?;
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("flowvis_depth"),
            size: wgpu::Extent3d {
                width: viewport.width,
                height: viewport.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget {
            width: viewport.width,
            height: viewport.height,
            _texture: texture,
            view,
        });
        Ok(())
    }
}

fn upload_velocity(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    extent: wgpu::Extent3d,
    slice: FieldSlice<'_>,
) -> FlowResult<()> {
    if slice.width() != extent.width as usize || slice.height() != extent.height as usize {
        return Err(FlowError::validation(format!(
            "field slice is {}x{}, velocity texture is {}x{}",
            slice.width(),
            slice.height(),
            extent.width,
            extent.height
        )));
    }
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        slice.as_bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(extent.width * VELOCITY_TEXEL_BYTES),
            rows_per_image: Some(extent.height),
        },
        extent,
    );
    Ok(())
}

fn dim_u32(v: usize, name: &str) -> FlowResult<u32> {
    u32::try_from(v).map_err(|_| FlowError::validation(format!("{name}={v} exceeds u32")))
}
