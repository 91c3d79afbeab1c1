use bytemuck::{Pod, Zeroable};
use cadence_common::Viewport;
use cadence_render::{Gpu, GpuTexture, MeshData, RenderError, ShaderSource, TextureImage};
use cadence_scene::{Material, TextureId};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::layout::UniformBlock;
use crate::resources::{MeshBuffers, WgpuMesh, WgpuProgram, WgpuTexture};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    tex_coord: [f32; 2],
    normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x2,
        2 => Float32x3,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

fn interleave(data: &MeshData) -> Vec<Vertex> {
    (0..data.vertex_count())
        .map(|i| Vertex {
            position: [data.positions[i * 3], data.positions[i * 3 + 1], data.positions[i * 3 + 2]],
            tex_coord: [data.tex_coords[i * 2], data.tex_coords[i * 2 + 1]],
            normal: [data.normals[i * 3], data.normals[i * 3 + 1], data.normals[i * 3 + 2]],
        })
        .collect()
}

/// Dynamic-offset uniform buffer holding one [`UniformBlock`] per draw.
struct UniformRing {
    layout: wgpu::BindGroupLayout,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl UniformRing {
    fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<UniformBlock>() as u64),
                },
                count: None,
            }],
        });
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let stride = wgpu::util::align_to(size_of::<UniformBlock>() as u64, alignment);
        let (buffer, bind_group) = Self::allocate(device, &layout, stride, capacity);
        Self {
            layout,
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<UniformBlock>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Write one block per draw, growing the buffer when a frame has more
    /// draws than fit.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, blocks: &[UniformBlock]) {
        if blocks.is_empty() {
            return;
        }
        if blocks.len() > self.capacity {
            self.capacity = blocks.len().next_power_of_two();
            let (buffer, bind_group) = Self::allocate(device, &self.layout, self.stride, self.capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            tracing::debug!(capacity = self.capacity, "uniform buffer grown");
        }
        let stride = self.stride as usize;
        let mut staging = vec![0u8; stride * blocks.len()];
        for (i, block) in blocks.iter().enumerate() {
            let bytes = bytemuck::bytes_of(block);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &staging);
    }

    fn offset(&self, draw: usize) -> u32 {
        (draw as u64 * self.stride) as u32
    }
}

struct PendingDraw {
    pipeline: Arc<wgpu::RenderPipeline>,
    vertex: Arc<wgpu::Buffer>,
    index: Arc<wgpu::Buffer>,
    index_count: u32,
    texture: Arc<wgpu::BindGroup>,
}

/// Work recorded between two presents.
#[derive(Default)]
struct Frame {
    clear: bool,
    draws: Vec<PendingDraw>,
    blocks: Vec<UniformBlock>,
}

/// wgpu device and window surface implementing [`Gpu`].
///
/// Draw calls are recorded as they are issued and encoded into a single render
/// pass by [`present_frame`](Self::present_frame).
pub struct WgpuGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    viewport: Viewport,
    depth_view: wgpu::TextureView,
    uniforms: UniformRing,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    white: Arc<wgpu::BindGroup>,
    next_texture: u64,
    frame: Frame,
}

impl WgpuGpu {
    /// Pick an adapter for `surface`, open a device and configure the surface.
    pub fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        viewport: Viewport,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::Backend("no compatible GPU adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cadence_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::Backend(format!("device request failed: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniforms = UniformRing::new(&device, 16);
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
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
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&uniforms.layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let depth_view = create_depth_view(&device, viewport);

        let adapter_info = adapter.get_info();
        tracing::info!(
            backend = adapter_info.backend.to_str(),
            adapter = %adapter_info.name,
            ?format,
            "GPU initialized"
        );

        let white = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &TextureImage::checkerboard(1, 1, [255; 4], [255; 4]),
            "white_texture",
        )
        .1;

        Ok(Self {
            device,
            queue,
            surface,
            config,
            viewport,
            depth_view,
            uniforms,
            texture_layout,
            pipeline_layout,
            sampler,
            white,
            next_texture: 0,
            frame: Frame::default(),
        })
    }

    /// Encode everything recorded since the last present and show it.
    ///
    /// A lost or outdated surface is reconfigured and the frame dropped.
    pub fn present_frame(&mut self) -> Result<(), RenderError> {
        let frame = std::mem::take(&mut self.frame);
        if self.viewport.is_empty() {
            return Ok(());
        }

        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                tracing::debug!("surface reconfigured, frame dropped");
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, frame dropped");
                return Ok(());
            }
            Err(e) => return Err(RenderError::Backend(format!("surface error: {e}"))),
        };

        self.uniforms.upload(&self.device, &self.queue, &frame.blocks);

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let (color_load, depth_load) = if frame.clear {
                (wgpu::LoadOp::Clear(CLEAR_COLOR), wgpu::LoadOp::Clear(1.0))
            } else {
                (wgpu::LoadOp::Load, wgpu::LoadOp::Load)
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (i, draw) in frame.draws.iter().enumerate() {
                pass.set_pipeline(&draw.pipeline);
                pass.set_bind_group(0, &self.uniforms.bind_group, &[self.uniforms.offset(i)]);
                pass.set_bind_group(1, draw.texture.as_ref(), &[]);
                pass.set_vertex_buffer(0, draw.vertex.slice(..));
                pass.set_index_buffer(draw.index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn compile(&self, program: &str, stage: &'static str, text: &str) -> Result<wgpu::ShaderModule, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(stage),
            source: wgpu::ShaderSource::Wgsl(text.into()),
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(RenderError::ShaderCompile {
                program: program.to_owned(),
                stage,
                log: err.to_string(),
            }),
            None => Ok(module),
        }
    }
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    image: &TextureImage,
    label: &str,
) -> (wgpu::Texture, Arc<wgpu::BindGroup>) {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        image.pixels(),
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, Arc::new(bind_group))
}

fn create_depth_view(device: &wgpu::Device, viewport: Viewport) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl Gpu for WgpuGpu {
    type Program = WgpuProgram;
    type Mesh = WgpuMesh;
    type Texture = WgpuTexture;

    fn create_program(&mut self, source: &ShaderSource) -> Result<WgpuProgram, RenderError> {
        let vertex = self.compile(&source.name, "vertex", &source.vertex)?;
        let fragment = self.compile(&source.name, "fragment", &source.fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(source.name.as_str()),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                program: source.name.clone(),
                stage: "link",
                log: err.to_string(),
            });
        }

        tracing::info!(program = %source.name, "program linked");
        Ok(WgpuProgram::new(source.name.clone(), Some(Arc::new(pipeline))))
    }

    fn create_texture(&mut self, image: &TextureImage) -> Result<WgpuTexture, RenderError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if image.width() > limit || image.height() > limit {
            return Err(RenderError::InvalidTexture(format!(
                "{}x{} exceeds the device limit of {limit}",
                image.width(),
                image.height()
            )));
        }
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        let (texture, bind_group) = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            image,
            "mesh_texture",
        );
        Ok(WgpuTexture {
            id,
            texture: Some(texture),
            bind_group: Some(bind_group),
        })
    }

    fn create_mesh(
        &mut self,
        data: &MeshData,
        mut material: Material,
        texture: Option<WgpuTexture>,
    ) -> Result<WgpuMesh, RenderError> {
        if let Err(e) = data.validate() {
            if let Some(mut texture) = texture {
                texture.release();
            }
            return Err(e);
        }
        let vertices = interleave(data);
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_vertex_buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("mesh_index_buffer"),
                contents: bytemuck::cast_slice(&data.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        material.texture = texture.as_ref().map(GpuTexture::id);
        Ok(WgpuMesh {
            material,
            index_count: data.index_count() as u32,
            buffers: Some(MeshBuffers {
                vertex: Arc::new(vertex),
                index: Arc::new(index),
            }),
            texture,
        })
    }

    fn clear(&mut self) {
        self.frame.clear = true;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if viewport.is_empty() {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, viewport);
        tracing::debug!(width = viewport.width, height = viewport.height, "surface reconfigured");
    }

    fn draw(&mut self, program: &WgpuProgram, mesh: &WgpuMesh) {
        let (Some(pipeline), Some(buffers)) = (&program.pipeline, &mesh.buffers) else {
            tracing::warn!(program = %program.name, "draw with released program or mesh skipped");
            return;
        };
        if !program.bound {
            tracing::warn!(program = %program.name, "draw with unbound program skipped");
            return;
        }
        let texture = mesh
            .texture
            .as_ref()
            .and_then(|t| t.bind_group.clone())
            .unwrap_or_else(|| self.white.clone());
        self.frame.blocks.push(program.block);
        self.frame.draws.push(PendingDraw {
            pipeline: pipeline.clone(),
            vertex: buffers.vertex.clone(),
            index: buffers.index.clone(),
            index_count: mesh.index_count,
            texture,
        });
    }
}
