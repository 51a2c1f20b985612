use std::{borrow::Cow, sync::Arc};

use anyhow::Context;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    config::AppConfig,
    math::Matrix4,
    rendering::{
        depth_texture::DepthTexture,
        draw_list::DrawList,
        shader_loader::{
            PipelineFactory, ProgramSources, ShaderLoader, FRAGMENT_ENTRY_POINT,
            VERTEX_ENTRY_POINT,
        },
        vertex::{Vertex, VERTEX_LAYOUT},
    },
};

const MATRIX_SIZE: u64 = std::mem::size_of::<Matrix4>() as u64;
const INITIAL_DRAWS: u64 = 16;
const INITIAL_VERTICES: u64 = 256;

/// One transform per draw, bound with a dynamic offset.
struct TransformBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: u64,
    staging: Vec<u8>,
}

impl TransformBuffer {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: u64) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = MATRIX_SIZE.div_ceil(alignment) * alignment;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform uniform buffer"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(MATRIX_SIZE),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        transforms: impl ExactSizeIterator<Item = Matrix4>,
    ) {
        let count = transforms.len() as u64;
        if count == 0 {
            return;
        }
        if count > self.capacity {
            log::debug!("Growing transform buffer to {} draws", count.next_power_of_two());
            *self = Self::new(device, layout, count.next_power_of_two());
        }

        self.staging.clear();
        self.staging.resize((self.stride * count) as usize, 0);
        for (i, transform) in transforms.enumerate() {
            let offset = i * self.stride as usize;
            self.staging[offset..offset + MATRIX_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&transform));
        }

        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    fn offset(&self, index: usize) -> u32 {
        (index as u64 * self.stride) as u32
    }
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    depth_texture: DepthTexture,
    shader_loader: ShaderLoader,

    transform_layout: wgpu::BindGroupLayout,
    transforms: TransformBuffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: u64,

    clear_color: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, config: &AppConfig) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no supported formats")?;

        let present_mode = if config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        log::info!(
            "Surface {}x{} {:?}, {:?}",
            surface_config.width,
            surface_config.height,
            surface_format,
            present_mode
        );

        let depth_texture = DepthTexture::new(&device, &surface_config, "Depth Texture");

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&transform_layout],
            push_constant_ranges: &[],
        });

        let factory: PipelineFactory = Arc::new(
            move |device: &wgpu::Device, sources: &ProgramSources| {
                create_pipeline(device, &pipeline_layout, surface_format, sources)
            },
        );

        let shader_loader = ShaderLoader::new(&device, &config.shaders, factory)?;

        let transforms = TransformBuffer::new(&device, &transform_layout, INITIAL_DRAWS);
        let vertex_buffer = create_vertex_buffer(&device, INITIAL_VERTICES);

        Ok(Self {
            window,
            size,
            surface,
            surface_config,
            device,
            queue,
            depth_texture,
            shader_loader,
            transform_layout,
            transforms,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTICES,
            clear_color: config.clear_color,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_texture.resize(&self.device, &self.surface_config);
        }
    }

    pub fn render(&mut self, draw_list: &DrawList) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        let (vertices, ranges) = draw_list.triangle_lists();
        self.upload_vertices(&vertices);
        self.transforms.upload(
            &self.device,
            &self.queue,
            &self.transform_layout,
            draw_list.commands().iter().map(|command| command.transform),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_texture.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !vertices.is_empty() {
                render_pass.set_pipeline(self.shader_loader.pipeline());
                render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

                for (index, range) in ranges.into_iter().enumerate() {
                    if range.is_empty() {
                        continue;
                    }
                    render_pass.set_bind_group(
                        0,
                        &self.transforms.bind_group,
                        &[self.transforms.offset(index)],
                    );
                    render_pass.draw(range, 0..1);
                }
            }
        }

        self.queue.submit([encoder.finish()]);
        output.present();

        log::trace!(
            "Frame: {} draws, {} vertices",
            draw_list.commands().len(),
            vertices.len()
        );

        Ok(())
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }

        let needed = vertices.len() as u64;
        if needed > self.vertex_capacity {
            self.vertex_capacity = needed.next_power_of_two();
            log::debug!("Growing vertex buffer to {} vertices", self.vertex_capacity);
            self.vertex_buffer = create_vertex_buffer(&self.device, self.vertex_capacity);
        }

        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene vertex buffer"),
        size: capacity * std::mem::size_of::<Vertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    sources: &ProgramSources,
) -> wgpu::RenderPipeline {
    let vertex_label = sources.vertex.label();
    let fragment_label = sources.fragment.label();

    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&vertex_label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(sources.vertex.code.as_str())),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&fragment_label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(sources.fragment.code.as_str())),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Scene Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(VERTEX_ENTRY_POINT),
            buffers: &[VERTEX_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(FRAGMENT_ENTRY_POINT),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
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
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
