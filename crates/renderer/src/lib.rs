//! Renderer: wgpu init + depth + one indexed mesh drawn with an MVP uniform.
//! wgpu = 26.x, winit = 0.30.x

use std::num::NonZeroU64;
use std::sync::Arc;

use anyhow::{Context, Result};
use asset::{MeshData, ShaderSource, Topology, shader};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::{
    util::DeviceExt,
    BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState, Buffer,
    BufferBindingType, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor,
    DepthBiasState, DepthStencilState, Device, DeviceDescriptor, Extent3d, Features,
    FragmentState, Instance, InstanceDescriptor, Limits, LoadOp, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, PrimitiveTopology, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, ShaderStages, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView, TextureViewDescriptor, VertexBufferLayout, VertexState, VertexStepMode,
};

use winit::{dpi::PhysicalSize, window::Window};

/// Vertex: position + color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 3],
}
impl Vertex {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
}

impl From<&asset::MeshVertex> for Vertex {
    fn from(v: &asset::MeshVertex) -> Self {
        Self {
            pos: v.position,
            color: v.color,
        }
    }
}

/// Transform UBO (16-byte aligned), column-major as WGSL expects.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

impl TransformUniform {
    /// Row-major rows in, column-major columns out.
    fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self {
            mvp: clip_matrix(rows).to_cols_array_2d(),
        }
    }
}

/// Remaps OpenGL clip z in [-w, w] to wgpu's [0, w].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

/// The matrix the shader actually sees for a row-major MVP from the core.
#[inline]
pub fn clip_matrix(rows: [[f32; 4]; 4]) -> Mat4 {
    OPENGL_TO_WGPU * corelib::transform::from_rows(rows)
}

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.3,
    b: 0.4,
    a: 1.0,
};

/// The bundled WGSL pair used when no shader path is configured.
pub fn builtin_shader() -> ShaderSource {
    ShaderSource::new("basic.wgsl", include_str!("shaders/basic.wgsl"))
}

fn primitive_topology(topology: Topology) -> PrimitiveTopology {
    match topology {
        Topology::Triangles => PrimitiveTopology::TriangleList,
        Topology::Lines => PrimitiveTopology::LineList,
    }
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline & geometry
    pipeline: RenderPipeline,
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,

    // Transform
    transform_bg: BindGroup,
    transform_buf: Buffer,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an Arc<Window>, ready to draw `mesh`.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        mesh: &MeshData,
        shader_src: &ShaderSource,
    ) -> Result<Self> {
        anyhow::ensure!(mesh.is_valid(), "Mesh has no drawable primitives");
        shader_src.validate()?;

        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(&InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("freecam3d Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        // Configure surface
        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        // Depth texture
        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some(shader_src.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(shader_src.code.as_str().into()),
        });

        // ==== Transform BGL/BG ====
        let transform_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Transform BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<TransformUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        // Identity until the first upload_mvp().
        let transform_init = TransformUniform {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
        };
        let transform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform UBO"),
            contents: bytemuck::bytes_of(&transform_init),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let transform_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Transform BG"),
            layout: &transform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buf.as_entire_binding(),
            }],
        });

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Mesh PipelineLayout"),
            bind_group_layouts: &[&transform_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some(shader::VERTEX_ENTRY),
                buffers: &[Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some(shader::FRAGMENT_ENTRY),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            // The triangle is visible from both sides while the camera flies around it.
            primitive: wgpu::PrimitiveState {
                topology: primitive_topology(mesh.topology),
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ==== Geometry ====
        let vertices: Vec<Vertex> = mesh.vertices.iter().map(Vertex::from).collect();
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh IB"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        log::info!(
            "Uploaded mesh: {} vertices, {} indices ({:?})",
            vertices.len(),
            mesh.indices.len(),
            mesh.topology
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
            transform_bg,
            transform_buf,
            depth_view,
            width,
            height,
        })
    }

    /// Viewport width / height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Upload boundary: `rows` is the row-major, OpenGL-depth MVP from the core. It is
    /// remapped to wgpu's depth range and stored column-major for WGSL.
    pub fn upload_mvp(&self, rows: [[f32; 4]; 4]) {
        let uniform = TransformUniform::from_rows(rows);
        self.queue
            .write_buffer(&self.transform_buf, 0, bytemuck::bytes_of(&uniform));
    }

    /// Render one frame: clear + draw the mesh with the last uploaded MVP.
    pub fn render(&mut self) -> Result<(), SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None, // required in 0.26
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(CLEAR_COLOR),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.transform_bg, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
            rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{Camera, Projection, Transform, model_view_projection, transform::to_rows, vec3};

    fn clip_at_depth(depth: f32) -> glam::Vec4 {
        let model = Transform::new().add_translation(0.0, 0.0, depth).matrix();
        let mvp = model_view_projection(model, &Camera::default(), &Projection::default());
        let u = TransformUniform::from_rows(to_rows(&mvp));
        Mat4::from_cols_array_2d(&u.mvp) * vec3(0.0, 0.0, 0.0).extend(1.0)
    }

    #[test]
    fn uniform_is_transposed_at_upload() {
        let rows = Transform::new().add_translation(1.0, 2.0, 3.0).rows();
        let u = TransformUniform::from_rows(rows);
        // column 3 holds the translation; z is remapped as 0.5 * z + 0.5 * w
        assert_eq!(u.mvp[3], [1.0, 2.0, 2.0, 1.0]);
        assert_eq!(u.mvp[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_matches_glam_layout() {
        let m = Transform::new()
            .add_rotation_y(30.0)
            .add_perspective(&Projection::default())
            .matrix();
        let u = TransformUniform::from_rows(to_rows(&m));
        assert_eq!(u.mvp, (OPENGL_TO_WGPU * m).to_cols_array_2d());
    }

    #[test]
    fn near_and_far_planes_land_on_wgpu_depth_bounds() {
        let near = clip_at_depth(1.0);
        assert!((near.z / near.w).abs() < 1e-5, "{near:?}");
        let far = clip_at_depth(10.0);
        assert!((far.z / far.w - 1.0).abs() < 1e-5, "{far:?}");
    }

    #[test]
    fn just_past_near_plane_is_kept() {
        let clip = clip_at_depth(1.5);
        assert!(clip.z >= 0.0 && clip.z <= clip.w, "{clip:?}");
    }

    #[test]
    fn in_front_of_near_plane_is_clipped() {
        let clip = clip_at_depth(0.5);
        assert!(clip.z < 0.0, "{clip:?}");
    }

    #[test]
    fn uniform_size_is_one_mat4() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 64);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn builtin_shader_declares_entry_points() {
        builtin_shader().validate().unwrap();
    }

    #[test]
    fn topology_mapping() {
        assert_eq!(
            primitive_topology(Topology::Lines),
            PrimitiveTopology::LineList
        );
        assert_eq!(
            primitive_topology(Topology::Triangles),
            PrimitiveTopology::TriangleList
        );
    }
}
