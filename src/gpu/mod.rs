//! `wgpu` implementation of [`ShadingBackend`].
//!
//! Uniform sets pushed during a frame are staged on the CPU and written into
//! one dynamic-offset uniform buffer at `end_frame`, one aligned slot per
//! draw. The whole frame is then recorded into a single render pass.

use std::num::NonZeroU64;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{ShadingBackend, Viewport};
use crate::error::{GpuError, Result, SceneError};
use crate::lighting::{Light, Material};
use crate::mesh::SphereMesh;
use crate::shader::{
    ShaderSources, ShadingModel, FRAGMENT_ENTRY, VERTEX_ENTRY, VERTEX_NORMAL_LOCATION,
    VERTEX_POSITION_LOCATION,
};
use crate::transform::TransformSet;
use crate::uniforms::SceneUniforms;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Draw slots allocated up front; the buffer doubles when a frame needs more.
const INITIAL_DRAW_SLOTS: usize = 64;

/// Pipelines for one shading model, with and without depth testing.
struct Program {
    model: ShadingModel,
    depth_tested: wgpu::RenderPipeline,
    unordered: wgpu::RenderPipeline,
}

struct MeshBuffers {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    vertex_count: u32,
}

pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    program: Option<Program>,
    mesh: Option<MeshBuffers>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_slots: usize,
    depth_texture: wgpu::TextureView,
    depth_test: bool,
    clear_color: wgpu::Color,
    current: SceneUniforms,
    pending: Vec<SceneUniforms>,
    in_frame: bool,
}

impl WgpuBackend {
    pub async fn new(window: Arc<Window>) -> std::result::Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Using {} ({:?}), surface format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            surface_format
        );

        let depth_texture = create_depth_texture(&device, &config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(SceneUniforms::SIZE as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = wgpu::util::align_to(SceneUniforms::SIZE as u64, alignment);
        let (uniform_buffer, uniform_bind_group) = create_uniform_slots(
            &device,
            &bind_group_layout,
            uniform_stride,
            INITIAL_DRAW_SLOTS,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            bind_group_layout,
            pipeline_layout,
            program: None,
            mesh: None,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_slots: INITIAL_DRAW_SLOTS,
            depth_texture,
            depth_test: false,
            clear_color: wgpu::Color::BLACK,
            current: SceneUniforms::default(),
            pending: Vec::new(),
            in_frame: false,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    fn create_pipeline(
        &self,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        depth_compare: wgpu::CompareFunction,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let attribute = |location| {
            [wgpu::VertexAttribute {
                offset: 0,
                shader_location: location,
                format: wgpu::VertexFormat::Float32x3,
            }]
        };
        let position_attributes = attribute(VERTEX_POSITION_LOCATION);
        let normal_attributes = attribute(VERTEX_NORMAL_LOCATION);
        let stride = (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress;

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &position_attributes,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &normal_attributes,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_compare != wgpu::CompareFunction::Always,
                depth_compare,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn ensure_uniform_slots(&mut self, draws: usize) {
        if draws <= self.uniform_slots {
            return;
        }
        let slots = draws.next_power_of_two();
        let (buffer, bind_group) = create_uniform_slots(
            &self.device,
            &self.bind_group_layout,
            self.uniform_stride,
            slots,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_slots = slots;
        log::debug!("Grew uniform buffer to {} draw slots", slots);
    }

    fn write_uniforms(&self) {
        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; stride * self.pending.len()];
        for (slot, uniforms) in bytes.chunks_mut(stride).zip(&self.pending) {
            slot[..SceneUniforms::SIZE].copy_from_slice(bytemuck::bytes_of(uniforms));
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    fn submit(&self) -> Result<()> {
        let (Some(program), Some(mesh)) = (&self.program, &self.mesh) else {
            return Ok(());
        };

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost; reconfiguring and skipping frame");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(SceneError::Render(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let pipeline = if self.depth_test {
                &program.depth_tested
            } else {
                &program.unordered
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_vertex_buffer(0, mesh.positions.slice(..));
            render_pass.set_vertex_buffer(1, mesh.normals.slice(..));
            for draw in 0..self.pending.len() {
                let offset = (draw as u64 * self.uniform_stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.draw(0..mesh.vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl ShadingBackend for WgpuBackend {
    fn configure(&mut self, model: ShadingModel, sources: &ShaderSources) -> Result<()> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
        });
        let fragment = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
        });
        let depth_tested = self.create_pipeline(
            &vertex,
            &fragment,
            wgpu::CompareFunction::Less,
            "Scene Pipeline (depth tested)",
        );
        let unordered = self.create_pipeline(
            &vertex,
            &fragment,
            wgpu::CompareFunction::Always,
            "Scene Pipeline",
        );

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(SceneError::ConfigurationFailure {
                model,
                message: error.to_string(),
            });
        }

        self.program = Some(Program {
            model,
            depth_tested,
            unordered,
        });
        Ok(())
    }

    fn upload_mesh(&mut self, mesh: &SphereMesh) -> Result<()> {
        let vertex_count = u32::try_from(mesh.vertex_count())
            .map_err(|_| SceneError::InvalidArgument("mesh too large to draw".into()))?;

        let positions = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Positions"),
            contents: bytemuck::cast_slice(mesh.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normals = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Normals"),
            contents: bytemuck::cast_slice(mesh.normals()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        self.mesh = Some(MeshBuffers {
            positions,
            normals,
            vertex_count,
        });
        Ok(())
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    fn enable_depth_test(&mut self) {
        self.depth_test = true;
    }

    fn begin_frame(&mut self, viewport: Viewport) -> Result<()> {
        if self.in_frame {
            return Err(SceneError::Render("begin_frame called twice".into()));
        }
        if viewport.width != self.config.width || viewport.height != self.config.height {
            self.resize(viewport.width, viewport.height);
        }
        self.in_frame = true;
        self.pending.clear();
        Ok(())
    }

    fn set_light(&mut self, light: &Light) {
        self.current.set_light(light);
    }

    fn set_material(&mut self, material: &Material) {
        self.current.set_material(material);
    }

    fn set_transforms(&mut self, transforms: &TransformSet) {
        self.current.set_transforms(transforms);
    }

    fn draw_mesh(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(SceneError::Render("draw outside of a frame".into()));
        }
        match (&self.program, &self.mesh) {
            (Some(_), Some(_)) => {
                self.pending.push(self.current);
                Ok(())
            }
            _ => Err(SceneError::Render("draw before program and mesh are ready".into())),
        }
    }

    fn end_frame(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(SceneError::Render("end_frame without begin_frame".into()));
        }
        self.in_frame = false;

        self.ensure_uniform_slots(self.pending.len());
        if !self.pending.is_empty() {
            self.write_uniforms();
        }
        let result = self.submit();
        if let (Err(e), Some(program)) = (&result, &self.program) {
            log::error!("{} frame failed: {}", program.model, e);
        }
        result
    }
}

fn create_uniform_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    slots: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Uniform Buffer"),
        size: stride * slots as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(SceneUniforms::SIZE as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
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
