//! Windowed viewer.
//!
//! Runs an engine inside a winit window. The engine draws into a CPU
//! [`Canvas`], and [`GpuState`] presents it. Frames are paced by the window's
//! redraw requests: [`WindowHost`] holds the engine's frame request until the
//! frame clock's next deadline, sleeping with `ControlFlow::WaitUntil` in the
//! meantime, then calls `request_redraw`. Each `RedrawRequested` event ticks
//! the engine and presents the latest canvas.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineBuilder};
use crate::error::ViewerError;
use crate::gpu::GpuState;
use crate::scheduler::{AnimationHost, FrameRequest};
use crate::surface::{Canvas, SurfaceSize};

const TITLE_REFRESH: Duration = Duration::from_millis(500);

/// [`AnimationHost`] backed by a window's redraw requests.
pub struct WindowHost {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl WindowHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window, next_id: 0, pending: None }
    }

    /// Turn the outstanding request into a redraw once `due` has passed.
    ///
    /// Returns the instant to wake at if a request is waiting but not yet due.
    pub fn dispatch(&mut self, now: Instant, due: Instant) -> Option<Instant> {
        if self.pending.is_none() {
            return None;
        }
        if now < due {
            return Some(due);
        }
        self.pending = None;
        self.window.request_redraw();
        None
    }
}

impl AnimationHost for WindowHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

/// A window showing one swarm.
///
/// Use method chaining to configure, then call `.run()` to start.
pub struct Viewer {
    phrases: Vec<String>,
    config: EngineConfig,
    title: String,
    width: u32,
    height: u32,
    render_scale: f32,
}

impl Viewer {
    /// Create a viewer cycling through `phrases`.
    pub fn new<I, T>(phrases: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            phrases: phrases.into_iter().map(Into::into).collect(),
            config: EngineConfig::default(),
            title: "glyphswarm".to_string(),
            width: 1280,
            height: 720,
            render_scale: 1.0,
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Set the canvas resolution relative to the window.
    ///
    /// Values below 1 draw into a smaller canvas that is stretched to fill
    /// the window.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale.clamp(0.1, 2.0);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Run the viewer. This blocks until the window is closed.
    pub fn run(self) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App {
            viewer: self,
            running: None,
            error: None,
        };
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn canvas_size(&self, window: PhysicalSize<u32>) -> SurfaceSize {
        let scale = |v: u32| (v as f32 * self.render_scale).round() as u32;
        SurfaceSize::new(scale(window.width), scale(window.height))
    }
}

/// Everything that exists once the window is open.
struct Running {
    window: Arc<Window>,
    gpu: GpuState,
    engine: Engine<Canvas, WindowHost>,
    started: Instant,
    last_title: Instant,
    uploaded_frame: u64,
}

struct App {
    viewer: Viewer,
    running: Option<Running>,
    error: Option<ViewerError>,
}

impl App {
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, ViewerError> {
        let viewer = &self.viewer;
        let window_attrs = Window::default_attributes()
            .with_title(viewer.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(viewer.width, viewer.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let physical = window.inner_size();
        let canvas_size = viewer.canvas_size(physical);

        let gpu = pollster::block_on(GpuState::new(window.clone(), canvas_size))?;
        let mut engine = EngineBuilder::new()
            .with_config(viewer.config.clone())
            .with_phrases(viewer.phrases.iter().cloned())
            .with_animation_host(WindowHost::new(window.clone()))
            .mount(Canvas::new(canvas_size))?;
        engine.set_displayed_size(displayed(physical));

        log::info!(
            "window {}x{}, canvas {}x{}, {} particles",
            physical.width,
            physical.height,
            canvas_size.width,
            canvas_size.height,
            engine.pool().len()
        );

        let now = Instant::now();
        Ok(Running {
            window,
            gpu,
            engine,
            started: now,
            last_title: now,
            uploaded_frame: 0,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                running.engine.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                running.gpu.resize(physical_size);
                running.engine.resize(self.viewer.canvas_size(physical_size));
                running.engine.set_displayed_size(displayed(physical_size));
            }
            WindowEvent::CursorMoved { .. } | WindowEvent::CursorLeft { .. } => {
                running.engine.handle_window_event(&event);
            }
            WindowEvent::RedrawRequested => {
                let now_ms = running.started.elapsed().as_secs_f64() * 1000.0;
                running.engine.tick(now_ms);

                let frame = running.engine.stats().frames;
                if frame != running.uploaded_frame {
                    running.uploaded_frame = frame;
                    running.gpu.upload(running.engine.surface());
                }
                match running.gpu.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let config = &running.gpu.config;
                        let size = PhysicalSize::new(config.width, config.height);
                        running.gpu.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        running.engine.teardown();
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("render error: {:?}", e),
                }

                if running.last_title.elapsed() >= TITLE_REFRESH {
                    running.last_title = Instant::now();
                    let stats = running.engine.stats();
                    running.window.set_title(&format!(
                        "{} - {:.0} fps - {} particles - {} lines",
                        self.viewer.title, stats.fps, stats.particles, stats.segments
                    ));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = &mut self.running else {
            return;
        };
        let now = Instant::now();
        let due = match running.engine.clock().next_frame_ms() {
            Some(ms) => running.started + Duration::from_secs_f64(ms.max(0.0) / 1000.0),
            None => now,
        };
        match running.engine.host_mut().dispatch(now, due) {
            Some(wake) => event_loop.set_control_flow(ControlFlow::WaitUntil(wake)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

fn displayed(size: PhysicalSize<u32>) -> Vec2 {
    Vec2::new(size.width as f32, size.height as f32)
}
