use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, SurfaceConfiguration, Texture,
    TextureView,
};

use super::gpu_context::GpuContext;
use super::window_host::WindowHost;
use crate::camera::{CameraUniform, PerspectiveCamera};
use crate::scene::{ObjectKind, Scene, VisualObject};
use crate::traits::{GraphicsBackend, RenderSurface, SurfaceId, WindowDimensions};

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const POSITION_STRIDE: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
const QUAD_VERTICES: u32 = 6;

/// Per-object uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: point size, rest unused
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn from_object(object: &VisualObject) -> Self {
        Self {
            model: object.model_matrix().to_cols_array_2d(),
            color: object.material.rgba(),
            params: [object.material.point_size, 0.0, 0.0, 0.0],
        }
    }
}

/// Presentation options for the wgpu surface
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Requested MSAA samples; lowered to what the adapter supports
    pub sample_count: u32,
    pub clear_color: wgpu::Color,
    pub present_mode: wgpu::PresentMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_count: 4,
            clear_color: wgpu::Color::TRANSPARENT,
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

/// Creates one wgpu device and surface per mount, presenting into the host's window
pub struct WgpuBackend {
    settings: RenderSettings,
    surfaces_created: u64,
}

impl WgpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            surfaces_created: 0,
        }
    }
}

impl GraphicsBackend<WindowHost> for WgpuBackend {
    type Surface = WgpuSurface;

    fn create_surface(
        &mut self,
        host: &WindowHost,
        dimensions: WindowDimensions,
    ) -> Result<WgpuSurface> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(host.window()))
            .context("Failed to create window surface")?;
        let gpu = pollster::block_on(GpuContext::for_surface(&instance, &surface))?;

        self.surfaces_created += 1;
        WgpuSurface::new(
            SurfaceId(self.surfaces_created),
            gpu,
            surface,
            dimensions,
            self.settings,
        )
    }
}

/// Multisampled color target resolved into the surface texture
struct MsaaTarget {
    texture: Texture,
    view: TextureView,
}

enum DrawCall {
    Lines {
        vertex_buffer: Buffer,
        index_buffer: Buffer,
        index_count: u32,
    },
    Points {
        instance_buffer: Buffer,
        instance_count: u32,
    },
}

/// GPU-side copy of one visual object
struct GpuObject {
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    draw: DrawCall,
}

impl GpuObject {
    fn new(device: &Device, layout: &BindGroupLayout, object: &VisualObject) -> Self {
        let label = object.name();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ObjectUniform::from_object(object)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let draw = match &object.kind {
            ObjectKind::ParticleField(field) => DrawCall::Points {
                instance_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Particle Instances"),
                    contents: bytemuck::cast_slice(&field.to_instance_data()),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                instance_count: field.len() as u32,
            },
            ObjectKind::WireframeSolid { geometry, .. } => {
                let indices = geometry.line_indices();
                DrawCall::Lines {
                    vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Wireframe Vertices"),
                        contents: bytemuck::cast_slice(&geometry.positions()),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Wireframe Indices"),
                        contents: bytemuck::cast_slice(&indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                    index_count: indices.len() as u32,
                }
            }
        };

        Self {
            uniform_buffer,
            bind_group,
            draw,
        }
    }

    fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        lines: &RenderPipeline,
        points: &RenderPipeline,
    ) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        match &self.draw {
            DrawCall::Lines {
                vertex_buffer,
                index_buffer,
                index_count,
            } => {
                pass.set_pipeline(lines);
                pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..*index_count, 0, 0..1);
            }
            DrawCall::Points {
                instance_buffer,
                instance_count,
            } => {
                pass.set_pipeline(points);
                pass.set_vertex_buffer(0, instance_buffer.slice(..));
                pass.draw(0..QUAD_VERTICES, 0..*instance_count);
            }
        }
    }

    fn destroy(self) {
        self.uniform_buffer.destroy();
        match self.draw {
            DrawCall::Lines {
                vertex_buffer,
                index_buffer,
                ..
            } => {
                vertex_buffer.destroy();
                index_buffer.destroy();
            }
            DrawCall::Points { instance_buffer, .. } => instance_buffer.destroy(),
        }
    }
}

/// Everything released by `dispose`
struct GpuResources {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: SurfaceConfiguration,
    settings: RenderSettings,
    sample_count: u32,
    msaa: Option<MsaaTarget>,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    object_layout: BindGroupLayout,
    line_pipeline: RenderPipeline,
    point_pipeline: RenderPipeline,
    objects: Vec<GpuObject>,
}

/// Window surface drawing the ambient scene with alpha-blended lines and points
pub struct WgpuSurface {
    id: SurfaceId,
    resources: Option<GpuResources>,
}

impl WgpuSurface {
    fn new(
        id: SurfaceId,
        gpu: GpuContext,
        surface: wgpu::Surface<'static>,
        dimensions: WindowDimensions,
        settings: RenderSettings,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(gpu.adapter());
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        // Transparent clear only shows through with a premultiplied compositor
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| caps.alpha_modes.contains(mode))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: dimensions.width,
            height: dimensions.height,
            present_mode: settings.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(gpu.device(), &config);

        let sample_count = gpu.supported_sample_count(format, settings.sample_count);
        let msaa = Self::create_msaa_target(gpu.device(), &config, sample_count);
        log::debug!(
            "Surface {:?} configured: {:?}, {:?}, {}x MSAA",
            id,
            format,
            alpha_mode,
            sample_count
        );

        let device = gpu.device();
        let camera_layout = Self::uniform_layout(device, "Camera Bind Group Layout");
        let object_layout = Self::uniform_layout(device, "Object Bind Group Layout");

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[<CameraUniform as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Ambient Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/ambient.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Ambient Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            PipelineKind::Lines,
            format,
            sample_count,
        );
        let point_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            PipelineKind::Points,
            format,
            sample_count,
        );

        Ok(Self {
            id,
            resources: Some(GpuResources {
                gpu,
                surface,
                config,
                settings,
                sample_count,
                msaa,
                camera_buffer,
                camera_bind_group,
                object_layout,
                line_pipeline,
                point_pipeline,
                objects: Vec::new(),
            }),
        })
    }

    fn resources(&self) -> Result<&GpuResources> {
        self.resources
            .as_ref()
            .ok_or_else(|| anyhow!("Surface {:?} used after dispose", self.id))
    }

    fn uniform_layout(device: &Device, label: &str) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn create_pipeline(
        device: &Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        kind: PipelineKind,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> RenderPipeline {
        let (label, entry_point, step_mode, topology) = match kind {
            PipelineKind::Lines => (
                "Wireframe Pipeline",
                "vs_line",
                wgpu::VertexStepMode::Vertex,
                wgpu::PrimitiveTopology::LineList,
            ),
            PipelineKind::Points => (
                "Particle Pipeline",
                "vs_point",
                wgpu::VertexStepMode::Instance,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(entry_point),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: POSITION_STRIDE,
                    step_mode,
                    attributes: &POSITION_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_msaa_target(
        device: &Device,
        config: &SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<MsaaTarget> {
        if sample_count <= 1 {
            return None;
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Target"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Some(MsaaTarget { texture, view })
    }
}

/// How a failed `get_current_texture` is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcquireFailure {
    Reconfigure,
    SkipFrame,
    Fatal,
}

impl AcquireFailure {
    fn classify(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigure,
            wgpu::SurfaceError::Timeout => Self::SkipFrame,
            _ => Self::Fatal,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PipelineKind {
    Lines,
    Points,
}

impl RenderSurface for WgpuSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn upload(&mut self, scene: &Scene) -> Result<()> {
        let id = self.id;
        let resources = self
            .resources
            .as_mut()
            .ok_or_else(|| anyhow!("Surface {:?} used after dispose", id))?;

        let objects: Vec<GpuObject> = scene
            .objects()
            .iter()
            .map(|object| GpuObject::new(resources.gpu.device(), &resources.object_layout, object))
            .collect();

        for stale in std::mem::replace(&mut resources.objects, objects) {
            stale.destroy();
        }
        log::debug!("Uploaded {} objects to surface {:?}", scene.len(), id);
        Ok(())
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        let resources = self.resources()?;
        if resources.objects.len() != scene.len() {
            bail!(
                "Scene has {} objects but {} were uploaded",
                scene.len(),
                resources.objects.len()
            );
        }

        let queue = resources.gpu.queue();
        queue.write_buffer(
            &resources.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform()]),
        );
        for (object, gpu_object) in scene.objects().iter().zip(&resources.objects) {
            queue.write_buffer(
                &gpu_object.uniform_buffer,
                0,
                bytemuck::cast_slice(&[ObjectUniform::from_object(object)]),
            );
        }

        let frame = match resources.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e) => match AcquireFailure::classify(&e) {
                AcquireFailure::Reconfigure => {
                    log::debug!("Surface {:?} outdated, reconfiguring", self.id);
                    resources.surface.configure(resources.gpu.device(), &resources.config);
                    return Ok(());
                }
                AcquireFailure::SkipFrame => {
                    log::warn!("Surface {:?} timed out, skipping frame", self.id);
                    return Ok(());
                }
                AcquireFailure::Fatal => {
                    return Err(anyhow!("Failed to acquire surface texture: {}", e));
                }
            },
        };
        let surface_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (target, resolve_target, store) = match &resources.msaa {
            Some(msaa) => (&msaa.view, Some(&surface_view), wgpu::StoreOp::Discard),
            None => (&surface_view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = resources
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Ambient Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Ambient Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(resources.settings.clear_color),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &resources.camera_bind_group, &[]);
            for gpu_object in &resources.objects {
                gpu_object.draw(
                    &mut render_pass,
                    &resources.line_pipeline,
                    &resources.point_pipeline,
                );
            }
        }

        queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn resize(&mut self, dimensions: WindowDimensions) {
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        if dimensions.is_empty() {
            return;
        }

        resources.config.width = dimensions.width;
        resources.config.height = dimensions.height;
        resources.surface.configure(resources.gpu.device(), &resources.config);

        if let Some(old) = resources.msaa.take() {
            old.texture.destroy();
        }
        resources.msaa = Self::create_msaa_target(
            resources.gpu.device(),
            &resources.config,
            resources.sample_count,
        );
    }

    fn dispose(&mut self) {
        let Some(resources) = self.resources.take() else {
            return;
        };

        for object in resources.objects {
            object.destroy();
        }
        resources.camera_buffer.destroy();
        if let Some(msaa) = resources.msaa {
            msaa.texture.destroy();
        }
        // Surface drops before the device it was configured with
        drop(resources.surface);
        drop(resources.gpu);
        log::debug!("Surface {:?} disposed", self.id);
    }
}

impl Drop for WgpuSurface {
    fn drop(&mut self) {
        self.dispose();
    }
}
