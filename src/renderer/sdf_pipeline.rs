//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in fragment shader using signed distance fields.

use bytemuck::{Pod, Zeroable};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::render::Frame;
use crate::render::scene::colors;

/// Maximum number of explosion rings
const MAX_RINGS: usize = 4;
/// Maximum number of raindrops
const MAX_DROPS: usize = 256;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],     // offset 0
    time: f32,                // offset 8
    flash: f32,               // offset 12
    balloon_center: [f32; 2], // offset 16
    balloon_radius: f32,      // offset 24 - 0 = no balloon
    balloon_alpha: f32,       // offset 28
    ring_count: u32,          // offset 32
    drop_count: u32,          // offset 36
    scale: f32,               // offset 40 - device pixels per CSS pixel
    _pad: u32,                // offset 44
    balloon_color: [f32; 4],  // offset 48
    rain_color: [f32; 4],     // offset 64
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct RingData {
    center: [f32; 2],
    radius: f32,
    _pad: f32,
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DropData {
    pos: [f32; 2],
    length: f32,
    _pad: f32,
}

/// Why the canvas could not be set up
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not compatible with the adapter")]
    IncompatibleSurface,
}

/// Pick the surface format. Scene colors are CSS sRGB values, so a
/// non-sRGB format is preferred to write them unconverted.
pub fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    rings_buffer: wgpu::Buffer,
    drops_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    /// Device pixel ratio
    pub scale: f32,
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        scale: f32,
    ) -> Result<Self, RendererError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format =
            choose_surface_format(&surface_caps.formats).ok_or(RendererError::IncompatibleSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(RendererError::IncompatibleSurface)?;

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                time: 0.0,
                flash: 0.0,
                balloon_center: [0.0, 0.0],
                balloon_radius: 0.0,
                balloon_alpha: 0.0,
                ring_count: 0,
                drop_count: 0,
                scale,
                _pad: 0,
                balloon_color: colors::BALLOON,
                rain_color: colors::RAIN,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let rings_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rings"),
            size: (std::mem::size_of::<RingData>() * MAX_RINGS) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let drops_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("drops"),
            size: (std::mem::size_of::<DropData>() * MAX_DROPS) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(1),
                storage_entry(2),
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: rings_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: drops_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            rings_buffer,
            drops_buffer,
            bind_group,
            size: (width, height),
            scale,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32, scale: f32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.scale = scale;
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload a scene frame and draw it
    pub fn render(&mut self, frame: &Frame, time: f64) -> Result<(), wgpu::SurfaceError> {
        let ring_count = frame.rings.len().min(MAX_RINGS);
        let drop_count = frame.drops.len().min(MAX_DROPS);

        let (balloon_center, balloon_radius, balloon_color) = match &frame.balloon {
            Some(b) => ([b.center.x, b.center.y], b.radius, b.color),
            None => ([0.0, 0.0], 0.0, colors::BALLOON),
        };

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            time: (time / 1000.0) as f32,
            flash: frame.flash,
            balloon_center,
            balloon_radius,
            balloon_alpha: balloon_color[3],
            ring_count: ring_count as u32,
            drop_count: drop_count as u32,
            scale: self.scale,
            _pad: 0,
            balloon_color,
            rain_color: colors::RAIN,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        if ring_count > 0 {
            let rings: Vec<RingData> = frame
                .rings
                .iter()
                .take(MAX_RINGS)
                .map(|r| RingData {
                    center: [r.center.x, r.center.y],
                    radius: r.radius,
                    _pad: 0.0,
                    color: r.color,
                })
                .collect();
            self.queue
                .write_buffer(&self.rings_buffer, 0, bytemuck::cast_slice(&rings));
        }

        if drop_count > 0 {
            let drops: Vec<DropData> = frame
                .drops
                .iter()
                .take(MAX_DROPS)
                .map(|d| DropData {
                    pos: [d.x, d.y],
                    length: d.length,
                    _pad: 0.0,
                })
                .collect();
            self.queue
                .write_buffer(&self.drops_buffer, 0, bytemuck::cast_slice(&drops));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_prefers_linear_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(
            choose_surface_format(&[TextureFormat::Rgba8UnormSrgb]),
            Some(TextureFormat::Rgba8UnormSrgb)
        );
    }

    #[test]
    fn test_no_formats_is_an_error_not_a_panic() {
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<Globals>(), 80);
        assert_eq!(std::mem::size_of::<RingData>(), 32);
        assert_eq!(std::mem::size_of::<DropData>(), 16);
    }
}
