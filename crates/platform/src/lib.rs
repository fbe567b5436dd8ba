//! Platform layer: windowing, input polling & the per-frame loop.
//!
//! Each redraw applies every held camera command once, rebuilds the MVP from the
//! camera, uploads it and draws. Escape or closing the window ends the loop.

pub mod bindings;
pub mod input;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use asset::{MeshData, MeshKind, ShaderSource};
use corelib::{Camera, Mat4, Projection, Transform, Vec3, transform, try_model_view_projection};
use renderer::GpuState;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::bindings::{KeyBindings, apply_held};
use crate::input::HeldKeys;

/// Everything the loop needs to know up front.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub backends: wgpu::Backends,
    pub mesh: MeshKind,
    pub shader: ShaderSource,
    /// Aspect is replaced by the live window ratio each frame.
    pub projection: Projection,
    pub move_speed: f32,
    pub turn_speed: f32,
    pub camera_start: Vec3,
    /// Where the mesh sits in world space.
    pub model_offset: Vec3,
    /// Model spin about Y, degrees per second.
    pub spin_deg_per_sec: f32,
    pub show_fps: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            title: "3D Rendering Program".to_string(),
            width: 1000,
            height: 800,
            backends: wgpu::Backends::all(),
            mesh: MeshKind::default(),
            shader: renderer::builtin_shader(),
            projection: Projection::default(),
            move_speed: corelib::camera::DEFAULT_MOVE_SPEED,
            turn_speed: corelib::camera::DEFAULT_TURN_SPEED,
            camera_start: Vec3::ZERO,
            model_offset: Vec3::new(0.0, 0.0, 3.0),
            spin_deg_per_sec: 45.0,
            show_fps: false,
        }
    }
}

impl RunConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.camera_start).with_speeds(self.move_speed, self.turn_speed)
    }

    /// Spin first, then move the mesh into place.
    pub fn model_matrix(&self, elapsed_secs: f32) -> Mat4 {
        Transform::new()
            .add_rotation_y(elapsed_secs * self.spin_deg_per_sec)
            .add_translation_vec(self.model_offset)
            .into()
    }
}

/// Counts frames and reports the rate roughly once per second.
#[derive(Debug)]
pub struct FpsCounter {
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self { frames: 0, since: now }
    }

    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.since);
        if elapsed < Self::WINDOW {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.since = now;
        Some(fps)
    }
}

struct App {
    config: RunConfig,
    mesh: MeshData,
    bindings: KeyBindings,
    keys: HeldKeys,
    camera: Camera,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    start: Instant,
    fps: FpsCounter,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let now = Instant::now();
        Self {
            mesh: config.mesh.build(),
            camera: config.camera(),
            bindings: KeyBindings::default(),
            keys: HeldKeys::new(),
            window: None,
            gpu: None,
            start: now,
            fps: FpsCounter::new(now),
            error: None,
            config,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            &self.mesh,
            &self.config.shader,
        ))?;
        log::info!("Renderer ready, drawing {}", self.config.mesh);

        self.window = Some(window);
        self.gpu = Some(gpu);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        apply_held(&mut self.camera, self.bindings.held_commands(&self.keys));

        let now = Instant::now();
        let model = self
            .config
            .model_matrix(now.duration_since(self.start).as_secs_f32());
        let projection = self.config.projection.with_aspect(gpu.aspect());
        // A vertical target has no basis; keep drawing with the last good MVP.
        match try_model_view_projection(model, &self.camera, &projection) {
            Ok(mvp) => gpu.upload_mvp(transform::to_rows(&mvp)),
            Err(e) => log::debug!("Keeping previous MVP: {e}"),
        }

        match gpu.render() {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface {e:?}, reconfiguring.");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow::anyhow!("Surface out of memory"));
                return;
            }
            Err(e) => log::warn!("Frame skipped: {e:?}"),
        }

        if self.config.show_fps {
            if let Some(fps) = self.fps.tick(now) {
                log::info!("FPS: {fps:.1}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.keys.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } if self.bindings.is_quit(key) => {
                log::info!("Quit key pressed. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(cmd) = self.bindings.command_for(key) {
                    log::debug!("{key:?} -> {cmd:?}");
                }
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open the window and run the frame loop until quit.
pub fn run(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::{model_view_projection, vec3};

    #[test]
    fn default_config_is_1000x800() {
        let cfg = RunConfig::default();
        assert_eq!((cfg.width, cfg.height), (1000, 800));
        assert_eq!(cfg.projection.aspect, 1.25);
        let cam = cfg.camera();
        assert_eq!(cam.move_speed(), 0.1);
        assert_eq!(cam.turn_speed(), 1.5);
    }

    #[test]
    fn model_matrix_spins_then_translates() {
        let cfg = RunConfig::default();
        // 2s at 45°/s is a quarter turn: +X swings to -Z before the offset
        let m = cfg.model_matrix(2.0);
        let p = m * vec3(1.0, 0.0, 0.0).extend(1.0);
        assert!(p.truncate().abs_diff_eq(vec3(0.0, 0.0, 2.0), 1e-5), "{p:?}");
    }

    #[test]
    fn initial_frame_keeps_mesh_in_view() {
        let cfg = RunConfig::default();
        let mvp = model_view_projection(cfg.model_matrix(0.0), &cfg.camera(), &cfg.projection);
        let mesh = cfg.mesh.build();
        for v in &mesh.vertices {
            // what the shader sees, in wgpu's clip volume
            let clip = renderer::clip_matrix(transform::to_rows(&mvp))
                * Vec3::from(v.position).extend(1.0);
            assert!(clip.w > 0.0);
            assert!(clip.x.abs() <= clip.w && clip.y.abs() <= clip.w, "{clip:?}");
            assert!(clip.z >= 0.0 && clip.z <= clip.w, "{clip:?} outside wgpu depth range");
        }
    }

    #[test]
    fn fps_counter_reports_once_per_window() {
        let t0 = Instant::now();
        let mut fps = FpsCounter::new(t0);
        for i in 1..60 {
            assert!(fps.tick(t0 + Duration::from_millis(i * 16)).is_none());
        }
        let rate = fps.tick(t0 + Duration::from_secs(1)).unwrap();
        assert!((rate - 60.0).abs() < 1e-3);
        assert!(fps.tick(t0 + Duration::from_millis(1010)).is_none());
    }
}
