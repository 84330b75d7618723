//! WebGPU renderer: two textured panorama spheres for the cross-fade
//! plus a vertex-colored pass for the clickable overlays.

use glam::{Mat4, Vec3};
use pano_core::color::hex_rgb;
use pano_core::constants::PANORAMA_RADIUS;
use pano_core::{OverlaySet, OverlayShape};
use web_sys as web;
use wgpu::util::DeviceExt;

const SPHERE_SEGMENTS: u32 = 64;
const SPHERE_RINGS: u32 = 32;
const MARKER_DISC_SEGMENTS: u32 = 24;
const OVERLAY_VB_CAPACITY: usize = 16 * 1024;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    opacity: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SphereVertex {
    pos: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

/// One panorama surface: its own uniform buffer so the pair can fade
/// with independent opacities in a single submit.
struct PanoSlot {
    uniforms: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sphere_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    sphere_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    sphere_vb: wgpu::Buffer,
    sphere_ib: wgpu::Buffer,
    sphere_index_count: u32,
    overlay_uniforms: wgpu::Buffer,
    overlay_bind_group: wgpu::BindGroup,
    overlay_vb: wgpu::Buffer,
    slots: [PanoSlot; 2],
    current: usize,
    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sphere_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere_shader"),
            source: wgpu::ShaderSource::Wgsl(SPHERE_WGSL.into()),
        });
        let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("overlay_shader"),
            source: wgpu::ShaderSource::Wgsl(OVERLAY_WGSL.into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("pano_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sphere_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sphere_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let overlay_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay_bgl"),
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
        });

        let (sphere_vertices, sphere_indices) = sphere_mesh(PANORAMA_RADIUS);
        let sphere_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vb"),
            contents: bytemuck::cast_slice(&sphere_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_ib"),
            contents: bytemuck::cast_slice(&sphere_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let make_uniforms = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<Uniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let slots = [
            PanoSlot {
                uniforms: make_uniforms("pano_uniforms_a"),
                bind_group: None,
            },
            PanoSlot {
                uniforms: make_uniforms("pano_uniforms_b"),
                bind_group: None,
            },
        ];

        let overlay_uniforms = make_uniforms("overlay_uniforms");
        let overlay_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay_bg"),
            layout: &overlay_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: overlay_uniforms.as_entire_binding(),
            }],
        });
        let overlay_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay_vb"),
            size: (std::mem::size_of::<OverlayVertex>() * OVERLAY_VB_CAPACITY) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sphere_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere_pl"),
            bind_group_layouts: &[&sphere_bgl],
            push_constant_ranges: &[],
        });
        let sphere_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sphere_pipeline"),
            layout: Some(&sphere_layout),
            vertex: wgpu::VertexState {
                module: &sphere_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SphereVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            // The camera sits inside the sphere; nothing to cull.
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &sphere_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let overlay_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay_pl"),
            bind_group_layouts: &[&overlay_bgl],
            push_constant_ranges: &[],
        });
        let overlay_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay_pipeline"),
            layout: Some(&overlay_layout),
            vertex: wgpu::VertexState {
                module: &overlay_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<OverlayVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &overlay_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sphere_pipeline,
            overlay_pipeline,
            sphere_bgl,
            sampler,
            sphere_vb,
            sphere_ib,
            sphere_index_count: sphere_indices.len() as u32,
            overlay_uniforms,
            overlay_bind_group,
            overlay_vb,
            slots,
            current: 0,
            width,
            height,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Upload a panorama into the incoming slot.
    pub fn upload_incoming(&mut self, bitmap: &web::ImageBitmap) {
        let incoming = 1 - self.current;
        self.upload_to_slot(incoming, bitmap);
    }

    /// Upload directly into the visible slot (initial scene).
    pub fn upload_current(&mut self, bitmap: &web::ImageBitmap) {
        self.upload_to_slot(self.current, bitmap);
    }

    fn upload_to_slot(&mut self, slot: usize, bitmap: &web::ImageBitmap) {
        let size = wgpu::Extent3d {
            width: bitmap.width().max(1),
            height: bitmap.height().max(1),
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("panorama"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::ImageBitmap(bitmap.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pano_bg"),
            layout: &self.sphere_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.slots[slot].uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.slots[slot].bind_group = Some(bind_group);
    }

    /// Promote the incoming slot once a fade has landed.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    pub fn render(
        &mut self,
        view_proj: Mat4,
        current_opacity: f32,
        incoming_opacity: f32,
        overlay_vertices: &[OverlayVertex],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        let vp = view_proj.to_cols_array_2d();
        let incoming = 1 - self.current;
        self.queue.write_buffer(
            &self.slots[self.current].uniforms,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: vp,
                opacity: current_opacity,
                _pad: [0.0; 3],
            }),
        );
        self.queue.write_buffer(
            &self.slots[incoming].uniforms,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: vp,
                opacity: incoming_opacity,
                _pad: [0.0; 3],
            }),
        );
        self.queue.write_buffer(
            &self.overlay_uniforms,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: vp,
                opacity: 1.0,
                _pad: [0.0; 3],
            }),
        );
        let overlay_count = overlay_vertices.len().min(OVERLAY_VB_CAPACITY);
        if overlay_count > 0 {
            self.queue.write_buffer(
                &self.overlay_vb,
                0,
                bytemuck::cast_slice(&overlay_vertices[..overlay_count]),
            );
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("rpass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(&self.sphere_pipeline);
        rpass.set_vertex_buffer(0, self.sphere_vb.slice(..));
        rpass.set_index_buffer(self.sphere_ib.slice(..), wgpu::IndexFormat::Uint32);
        if current_opacity > 0.0 {
            if let Some(bg) = &self.slots[self.current].bind_group {
                rpass.set_bind_group(0, bg, &[]);
                rpass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }
        }
        if incoming_opacity > 0.0 {
            if let Some(bg) = &self.slots[incoming].bind_group {
                rpass.set_bind_group(0, bg, &[]);
                rpass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }
        }
        if overlay_count > 0 {
            rpass.set_pipeline(&self.overlay_pipeline);
            rpass.set_bind_group(0, &self.overlay_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.overlay_vb.slice(..));
            rpass.draw(0..overlay_count as u32, 0..1);
        }
        drop(rpass);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

/// Flatten the overlay set into world-space colored triangles, in
/// render order.
pub fn overlay_vertices(overlays: &OverlaySet) -> Vec<OverlayVertex> {
    let mut sorted: Vec<_> = overlays.iter().collect();
    sorted.sort_by_key(|o| o.render_order);

    let mut out = Vec::new();
    for overlay in sorted {
        let model = Mat4::from_scale_rotation_translation(
            overlay.scale,
            overlay.rotation,
            overlay.position,
        );
        let rgb = hex_rgb(overlay.color);
        let color = [rgb[0], rgb[1], rgb[2], overlay.opacity];
        let mut push = |x: f32, y: f32| {
            let world = model.transform_point3(Vec3::new(x, y, 0.0));
            out.push(OverlayVertex {
                pos: world.to_array(),
                color,
            });
        };
        match &overlay.shape {
            OverlayShape::Quad { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                push(-hw, -hh);
                push(hw, -hh);
                push(hw, hh);
                push(-hw, -hh);
                push(hw, hh);
                push(-hw, hh);
            }
            OverlayShape::Marker { radius } => {
                for i in 0..MARKER_DISC_SEGMENTS {
                    let a0 = i as f32 / MARKER_DISC_SEGMENTS as f32 * std::f32::consts::TAU;
                    let a1 = (i + 1) as f32 / MARKER_DISC_SEGMENTS as f32 * std::f32::consts::TAU;
                    push(0.0, 0.0);
                    push(radius * a0.cos(), radius * a0.sin());
                    push(radius * a1.cos(), radius * a1.sin());
                }
            }
            OverlayShape::Mesh(mesh) => {
                for &index in &mesh.indices {
                    let v = mesh.vertices[index as usize];
                    push(v[0], v[1]);
                }
            }
        }
    }
    out
}

/// Inward-facing UV sphere with equirectangular texture mapping.
fn sphere_mesh(radius: f32) -> (Vec<SphereVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for ring in 0..=SPHERE_RINGS {
        let v = ring as f32 / SPHERE_RINGS as f32;
        let phi = v * std::f32::consts::PI;
        for seg in 0..=SPHERE_SEGMENTS {
            let u = seg as f32 / SPHERE_SEGMENTS as f32;
            let theta = u * std::f32::consts::TAU;
            // Horizontal flip so the image reads correctly from inside.
            vertices.push(SphereVertex {
                pos: [
                    -radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ],
                uv: [u, v],
            });
        }
    }
    let stride = SPHERE_SEGMENTS + 1;
    for ring in 0..SPHERE_RINGS {
        for seg in 0..SPHERE_SEGMENTS {
            let a = ring * stride + seg;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    (vertices, indices)
}

const SPHERE_WGSL: &str = r#"
struct Uniforms {
  view_proj: mat4x4<f32>,
  opacity: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var pano: texture_2d<f32>;
@group(0) @binding(2) var pano_sampler: sampler;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
  var out: VsOut;
  out.pos = u.view_proj * vec4<f32>(pos, 1.0);
  out.uv = uv;
  return out;
}

@fragment
fn fs_main(inf: VsOut) -> @location(0) vec4<f32> {
  let rgba = textureSample(pano, pano_sampler, inf.uv);
  return vec4<f32>(rgba.rgb, rgba.a * u.opacity);
}
"#;

const OVERLAY_WGSL: &str = r#"
struct Uniforms {
  view_proj: mat4x4<f32>,
  opacity: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
  var out: VsOut;
  out.pos = u.view_proj * vec4<f32>(pos, 1.0);
  out.color = color;
  return out;
}

@fragment
fn fs_main(inf: VsOut) -> @location(0) vec4<f32> {
  return vec4<f32>(inf.color.rgb, inf.color.a * u.opacity);
}
"#;
