//! WebGPU renderer for SeaOfNet.
//!
//! One render pass per frame:
//! - the background field as a full-screen triangle, then
//! - one MSDF glyph quad per [`GlyphInstance`], each draw re-binding its
//!   pipeline, bind group and vertex buffer.
//!
//! Glyph instances live in a storage buffer indexed by `instance_index`.
//! Until the atlas image arrives the glyph texture is a single blue pixel.

use bytemuck::{Pod, Zeroable};
use seanet_core::error::{AssetKind, SeaError};
use seanet_core::sdf::pixel_projection;
use std::fmt;

#[cfg(target_arch = "wasm32")]
use seanet_core::sdf::{GLYPH_INSTANCE_BYTES, GlyphInstance};

// ---------------------------------------------------------------------------
// Platform-agnostic types (available on all targets for type checking)
// ---------------------------------------------------------------------------

/// Texel shown before the atlas image is decoded (opaque blue).
pub const PLACEHOLDER_TEXEL: [u8; 4] = [0, 0, 255, 255];

/// Glyph instances the storage buffer holds before its first growth.
pub const INITIAL_INSTANCE_CAPACITY: usize = 1024;

/// One corner of the unit glyph quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Two triangles spanning `(0, 0)..(1, -1)`; uv runs top-left to
/// bottom-right.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [0.0, 0.0], uv: [0.0, 0.0] },
    QuadVertex { position: [0.0, -1.0], uv: [0.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [1.0, -1.0], uv: [1.0, 1.0] },
    QuadVertex { position: [1.0, 0.0], uv: [1.0, 0.0] },
    QuadVertex { position: [0.0, 0.0], uv: [0.0, 0.0] },
];

/// Per-frame uniform block of the glyph pass (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub projection: [[f32; 4]; 4],
}

impl FrameUniforms {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            projection: pixel_projection(width as f32, height as f32).to_cols_array_2d(),
        }
    }
}

/// Instance capacity able to hold `needed` glyphs, growing by doubling.
#[must_use]
pub fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity = capacity.saturating_mul(2);
    }
    capacity
}

/// What the last frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub glyph_draws: u32,
    pub background: bool,
}

/// Renderer initialization or frame errors.
#[derive(Debug, Clone)]
pub enum RendererError {
    /// WebGPU adapter not available.
    NoAdapter,
    /// Device request failed.
    DeviceError(String),
    /// Surface creation, configuration or acquisition failed.
    SurfaceError(String),
    /// The atlas image could not be decoded.
    AtlasDecode(String),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdapter => write!(f, "WebGPU adapter not available"),
            Self::DeviceError(msg) => write!(f, "WebGPU device error: {msg}"),
            Self::SurfaceError(msg) => write!(f, "WebGPU surface error: {msg}"),
            Self::AtlasDecode(msg) => write!(f, "atlas image decode error: {msg}"),
        }
    }
}

impl std::error::Error for RendererError {}

impl From<RendererError> for SeaError {
    fn from(err: RendererError) -> Self {
        match err {
            RendererError::AtlasDecode(reason) => Self::AssetParse {
                asset: AssetKind::AtlasImage,
                reason,
            },
            other => Self::RenderContextUnavailable(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// WGSL shaders (inline)
// ---------------------------------------------------------------------------

#[cfg(any(target_arch = "wasm32", test))]
const GLYPH_SHADER_WGSL: &str = r#"
struct Frame {
    projection: mat4x4<f32>,
}

struct GlyphInstance {
    model_view: mat4x4<f32>,
    uv_transform: mat4x4<f32>,
    color: vec4<f32>,
    // (weight, slope, 0, 0)
    params: vec4<f32>,
}

@group(0) @binding(0) var<uniform> frame: Frame;
@group(0) @binding(1) var<storage, read> glyphs: array<GlyphInstance>;
@group(0) @binding(2) var atlas: texture_2d<f32>;
@group(0) @binding(3) var atlas_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) @interpolate(flat) color: vec4<f32>,
    @location(2) @interpolate(flat) params: vec4<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @builtin(instance_index) instance_index: u32,
) -> VertexOutput {
    let glyph = glyphs[instance_index];
    var out: VertexOutput;
    out.position = frame.projection * glyph.model_view * vec4<f32>(position, 0.0, 1.0);
    out.uv = (glyph.uv_transform * vec4<f32>(uv, 0.0, 1.0)).xy;
    out.color = glyph.color;
    out.params = glyph.params;
    return out;
}

fn median3(r: f32, g: f32, b: f32) -> f32 {
    return max(min(r, g), min(max(r, g), b));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(atlas, atlas_sampler, in.uv).rgb;
    let sig_dist = median3(texel.r, texel.g, texel.b);
    let weight = in.params.x;
    let slope = in.params.y;
    let alpha = smoothstep(weight - slope, weight + slope, sig_dist);
    if (alpha < 0.001) {
        discard;
    }
    return vec4<f32>(in.color.rgb * alpha, 1.0);
}
"#;

#[cfg(any(target_arch = "wasm32", test))]
const BACKGROUND_SHADER_WGSL: &str = r#"
struct BgUniforms {
    mouse: vec2<f32>,
    time: f32,
    radius: f32,
    viewport: vec2<f32>,
    _pad: vec2<f32>,
}

@group(0) @binding(0) var<uniform> bg: BgUniforms;

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> @builtin(position) vec4<f32> {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    return vec4<f32>(corners[vertex_index], 0.0, 1.0);
}

fn hash2(p: vec2<f32>) -> f32 {
    var p3 = fract(vec3<f32>(p.x, p.y, p.x) * 0.1031);
    p3 = p3 + dot(p3, p3.yzx + 33.33);
    return fract((p3.x + p3.y) * p3.z);
}

@fragment
fn fs_main(@builtin(position) coord: vec4<f32>) -> @location(0) vec4<f32> {
    // Bottom-left origin, like the cursor uniform.
    let frag = vec2<f32>(coord.x, bg.viewport.y - coord.y);
    let pos = frag * (2.0 * 0.152) + vec2<f32>(bg.time * 30.0 + 50.0);
    let noise = hash2(pos);

    let circle = smoothstep(0.2, 1.0, distance(bg.mouse, frag) / bg.radius);
    let wave = mix(1.0, 0.2, fract((frag.y + 40.0 * bg.time) / 300.0));
    let fac = mix(0.8, 1.1, circle * wave);

    let level = floor(noise * fac + 0.5) * 0.4;
    return vec4<f32>(level, level, level, 1.0);
}
"#;

// ---------------------------------------------------------------------------
// WebGPU implementation (wasm32 only)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "wasm32")]
mod gpu {
    use super::*;
    use seanet_core::background::BackgroundUniforms;
    use web_sys::HtmlCanvasElement;
    use wgpu::util::DeviceExt;

    struct AtlasTexture {
        _texture: wgpu::Texture,
        view: wgpu::TextureView,
    }

    /// WebGPU renderer owning all GPU resources.
    pub struct WebGpuRenderer {
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        surface_config: wgpu::SurfaceConfiguration,
        glyph_pipeline: wgpu::RenderPipeline,
        glyph_bind_group_layout: wgpu::BindGroupLayout,
        glyph_bind_group: wgpu::BindGroup,
        frame_buffer: wgpu::Buffer,
        instance_buffer: wgpu::Buffer,
        instance_capacity: usize,
        quad_buffer: wgpu::Buffer,
        atlas: AtlasTexture,
        atlas_sampler: wgpu::Sampler,
        background_pipeline: wgpu::RenderPipeline,
        background_bind_group: wgpu::BindGroup,
        background_buffer: wgpu::Buffer,
        last_stats: FrameStats,
    }

    fn create_atlas_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> AtlasTexture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph_atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        AtlasTexture {
            _texture: texture,
            view,
        }
    }

    fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glyph_instances"),
            size: (capacity.max(1) * GLYPH_INSTANCE_BYTES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_glyph_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        frame_buffer: &wgpu::Buffer,
        instance_buffer: &wgpu::Buffer,
        atlas_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph_bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: instance_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    impl WebGpuRenderer {
        /// Initialize the WebGPU renderer on the given canvas.
        pub async fn init(
            canvas: HtmlCanvasElement,
            width: u32,
            height: u32,
        ) -> Result<Self, RendererError> {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::BROWSER_WEBGPU,
                ..Default::default()
            });

            let surface = instance
                .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
                .map_err(|e| RendererError::SurfaceError(e.to_string()))?;

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|_| RendererError::NoAdapter)?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("seanet"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| RendererError::DeviceError(e.to_string()))?;

            let surface_caps = surface.get_capabilities(&adapter);
            // The shaders write linear values straight to the canvas.
            let format = surface_caps
                .formats
                .iter()
                .copied()
                .find(|f| !f.is_srgb())
                .or_else(|| surface_caps.formats.first().copied())
                .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);

            let surface_config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: width.max(1),
                height: height.max(1),
                present_mode: wgpu::PresentMode::Fifo,
                desired_maximum_frame_latency: 2,
                alpha_mode: surface_caps
                    .alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(wgpu::CompositeAlphaMode::Auto),
                view_formats: vec![],
            };
            surface.configure(&device, &surface_config);

            // -- Glyph pipeline ------------------------------------------------

            let glyph_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("glyph_shader"),
                source: wgpu::ShaderSource::Wgsl(GLYPH_SHADER_WGSL.into()),
            });

            let glyph_bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("glyph_bgl"),
                    entries: &[
                        uniform_entry(0, wgpu::ShaderStages::VERTEX),
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::VERTEX,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let glyph_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("glyph_pl"),
                bind_group_layouts: &[&glyph_bind_group_layout],
                immediate_size: 0,
            });

            let glyph_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("glyph_pipeline"),
                layout: Some(&glyph_layout),
                vertex: wgpu::VertexState {
                    module: &glyph_shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &glyph_shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
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

            let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("frame_uniforms"),
                contents: bytemuck::bytes_of(&FrameUniforms::new(width, height)),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("glyph_quad"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let instance_capacity = INITIAL_INSTANCE_CAPACITY;
            let instance_buffer = create_instance_buffer(&device, instance_capacity);

            let atlas = create_atlas_texture(&device, &queue, 1, 1, &PLACEHOLDER_TEXEL);
            let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("glyph_atlas_sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            });

            let glyph_bind_group = create_glyph_bind_group(
                &device,
                &glyph_bind_group_layout,
                &frame_buffer,
                &instance_buffer,
                &atlas.view,
                &atlas_sampler,
            );

            // -- Background pipeline -------------------------------------------

            let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("background_shader"),
                source: wgpu::ShaderSource::Wgsl(BACKGROUND_SHADER_WGSL.into()),
            });
            let background_bgl =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("background_bgl"),
                    entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
                });
            let background_layout =
                device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("background_pl"),
                    bind_group_layouts: &[&background_bgl],
                    immediate_size: 0,
                });
            let background_pipeline =
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("background_pipeline"),
                    layout: Some(&background_layout),
                    vertex: wgpu::VertexState {
                        module: &background_shader,
                        entry_point: Some("vs_main"),
                        buffers: &[],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &background_shader,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                });
            let background_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("background_uniforms"),
                size: std::mem::size_of::<BackgroundUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let background_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("background_bg"),
                layout: &background_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: background_buffer.as_entire_binding(),
                }],
            });

            tracing::debug!(?format, width, height, "renderer initialized");

            Ok(Self {
                device,
                queue,
                surface,
                surface_config,
                glyph_pipeline,
                glyph_bind_group_layout,
                glyph_bind_group,
                frame_buffer,
                instance_buffer,
                instance_capacity,
                quad_buffer,
                atlas,
                atlas_sampler,
                background_pipeline,
                background_bind_group,
                background_buffer,
                last_stats: FrameStats::default(),
            })
        }

        fn rebuild_glyph_bind_group(&mut self) {
            self.glyph_bind_group = create_glyph_bind_group(
                &self.device,
                &self.glyph_bind_group_layout,
                &self.frame_buffer,
                &self.instance_buffer,
                &self.atlas.view,
                &self.atlas_sampler,
            );
        }

        /// Reconfigure the surface for a new canvas size in pixels.
        pub fn resize(&mut self, width: u32, height: u32) {
            let (width, height) = (width.max(1), height.max(1));
            if width == self.surface_config.width && height == self.surface_config.height {
                return;
            }
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
            self.queue.write_buffer(
                &self.frame_buffer,
                0,
                bytemuck::bytes_of(&FrameUniforms::new(width, height)),
            );
        }

        /// Replace the placeholder texel with the decoded atlas image.
        pub fn upload_atlas(&mut self, width: u32, height: u32, rgba: &[u8]) {
            self.atlas = create_atlas_texture(&self.device, &self.queue, width, height, rgba);
            self.rebuild_glyph_bind_group();
            tracing::debug!(width, height, "atlas texture uploaded");
        }

        fn ensure_instance_capacity(&mut self, needed: usize) {
            if needed <= self.instance_capacity {
                return;
            }
            self.instance_capacity = grown_capacity(self.instance_capacity, needed);
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            self.rebuild_glyph_bind_group();
        }

        /// Encode and submit one frame: background (if any), then glyphs.
        pub fn render_frame(
            &mut self,
            background: Option<&BackgroundUniforms>,
            glyphs: &[GlyphInstance],
        ) -> Result<FrameStats, RendererError> {
            let output = self
                .surface
                .get_current_texture()
                .map_err(|e| RendererError::SurfaceError(e.to_string()))?;
            let view = output
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            if let Some(uniforms) = background {
                self.queue
                    .write_buffer(&self.background_buffer, 0, bytemuck::bytes_of(uniforms));
            }
            self.ensure_instance_capacity(glyphs.len());
            if !glyphs.is_empty() {
                self.queue
                    .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(glyphs));
            }

            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame"),
                });

            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("scene_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });

                if background.is_some() {
                    pass.set_pipeline(&self.background_pipeline);
                    pass.set_bind_group(0, &self.background_bind_group, &[]);
                    pass.draw(0..3, 0..1);
                }

                for i in 0..glyphs.len() as u32 {
                    pass.set_pipeline(&self.glyph_pipeline);
                    pass.set_bind_group(0, &self.glyph_bind_group, &[]);
                    pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                    pass.draw(0..6, i..i + 1);
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
            output.present();

            self.last_stats = FrameStats {
                glyph_draws: glyphs.len() as u32,
                background: background.is_some(),
            };
            Ok(self.last_stats)
        }

        #[must_use]
        pub fn last_stats(&self) -> FrameStats {
            self.last_stats
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use gpu::WebGpuRenderer;
