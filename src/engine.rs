//! Engine builder and per-frame loop.
//!
//! An [`Engine`] owns everything one swarm needs: the particle pool, the
//! transition controller, the proximity graph, the pointer tracker, the frame
//! clock and a seeded random source. Engines hold no global state, so any
//! number can run side by side on different surfaces.
//!
//! # Lifecycle
//!
//! ```ignore
//! let mut engine = EngineBuilder::new()
//!     .with_phrases(["Hello", "World"])
//!     .with_animation_host(host)
//!     .mount(Canvas::new(SurfaceSize::new(800, 600)))?;
//!
//! // Whenever the host delivers a frame:
//! engine.tick(timestamp_ms);
//!
//! engine.pointer_move(Vec2::new(120.0, 80.0), Vec2::new(800.0, 600.0));
//! engine.resize(SurfaceSize::new(1024, 768));
//! engine.teardown();
//! ```
//!
//! # Frame order
//!
//! Each processed frame runs, in order: clear, transition advance (and
//! retarget when a transition starts), particle update, proximity graph build
//! and line drawing, then the two particle batches.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use winit::event::WindowEvent;

use crate::config::EngineConfig;
use crate::connections::ProximityGraph;
use crate::error::EngineError;
use crate::input::PointerTracker;
use crate::pool::ParticlePool;
use crate::rasterizer::TextRasterizer;
use crate::render::Renderer;
use crate::scheduler::{AnimationHost, FrameRequest};
use crate::surface::{Surface, SurfaceSize};
use crate::time::FrameClock;
use crate::transition::{TransitionController, TransitionEvent};

// ============================================================================
// Builder
// ============================================================================

/// Configures and mounts an [`Engine`].
///
/// Use method chaining to configure, then call `.mount()` with a surface.
pub struct EngineBuilder<H: AnimationHost> {
    config: EngineConfig,
    phrases: Vec<String>,
    host: Option<H>,
}

impl<H: AnimationHost> EngineBuilder<H> {
    /// Create a builder with default settings and no phrases.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            phrases: Vec::new(),
            host: None,
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the phrases to cycle through, in order.
    pub fn with_phrases<I, T>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.phrases = phrases.into_iter().map(Into::into).collect();
        self
    }

    /// Append a single phrase.
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrases.push(phrase.into());
        self
    }

    /// Set the host that delivers frames.
    pub fn with_animation_host(mut self, host: H) -> Self {
        self.host = Some(host);
        self
    }

    /// Mount onto `surface` and request the first frame.
    ///
    /// The first phrase is rasterized and the pool created before this
    /// returns. On a zero-sized surface that step waits for the first
    /// non-empty [`Engine::resize`].
    pub fn mount<S: Surface>(self, surface: S) -> Result<Engine<S, H>, EngineError> {
        if self.phrases.is_empty() {
            return Err(EngineError::NoPhrases);
        }
        let host = self.host.ok_or(EngineError::NoAnimationHost)?;

        let mut state = EngineState::new(self.config, self.phrases);
        let size = surface.size();
        if size.is_empty() {
            log::debug!("mounted on an empty surface, waiting for resize");
        } else {
            state.initialize(size);
        }

        let mut engine = Engine {
            state,
            surface,
            host,
            pending: None,
            torn_down: false,
        };
        engine.schedule();
        Ok(engine)
    }
}

impl<H: AnimationHost> Default for EngineBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// State
// ============================================================================

/// Snapshot of engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineStats {
    /// Frames processed since mount.
    pub frames: u64,
    /// Host frames dropped by the frame-rate cap.
    pub skipped: u64,
    /// Processed frames per second.
    pub fps: f32,
    pub particles: usize,
    /// Segments drawn in the last frame.
    pub segments: usize,
    /// Frames that hit a caught error.
    pub frame_errors: u64,
}

/// Everything an engine owns apart from its surface and host.
pub struct EngineState {
    config: EngineConfig,
    phrases: Vec<String>,
    rasterizer: TextRasterizer,
    pool: ParticlePool,
    controller: TransitionController,
    graph: ProximityGraph,
    renderer: Renderer,
    pointer: PointerTracker,
    clock: FrameClock,
    rng: SmallRng,
    /// Surface size the pool's coordinates are expressed in.
    layout_size: SurfaceSize,
    frame_errors: u64,
}

impl EngineState {
    fn new(config: EngineConfig, phrases: Vec<String>) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            rasterizer: TextRasterizer::new(config.raster.clone()),
            pool: ParticlePool::new(config.pool.clone()),
            controller: TransitionController::new(config.transition.clone(), phrases.len()),
            graph: ProximityGraph::new(config.connections.clone(), config.pool.group_count),
            renderer: Renderer::new(config.visuals.clone()),
            pointer: PointerTracker::new(config.pointer_radius),
            clock: FrameClock::new(config.frame_interval_ms()),
            rng,
            layout_size: SurfaceSize::default(),
            frame_errors: 0,
            config,
            phrases,
        }
    }

    /// Create the pool from the current phrase.
    fn initialize(&mut self, size: SurfaceSize) {
        let phrase = &self.phrases[self.controller.current_index()];
        let points = self.rasterizer.sample(phrase, size, &mut self.rng);
        if points.is_empty() {
            log::warn!("{}", EngineError::EmptyPointCloud { phrase: phrase.clone() });
        }
        self.pool.initialize(&points, size, &mut self.rng);
        self.layout_size = size;
        log::debug!(
            "phrase {:?} sampled to {} points on {}x{}",
            phrase,
            points.len(),
            size.width,
            size.height
        );
    }

    /// Point the pool at phrase `index`. Targets are kept if it samples empty.
    fn retarget(&mut self, index: usize) -> Result<(), EngineError> {
        let phrase = &self.phrases[index];
        let points = self.rasterizer.sample(phrase, self.layout_size, &mut self.rng);
        if points.is_empty() {
            return Err(EngineError::EmptyPointCloud { phrase: phrase.clone() });
        }
        self.pool.retarget(&points, &mut self.rng);
        Ok(())
    }

    /// Run one processed frame.
    fn frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        dt_ms: f32,
    ) -> Result<(), EngineError> {
        let size = surface.size();
        if size.is_empty() || self.pool.is_empty() {
            return Ok(());
        }

        self.renderer.clear(surface);

        let mut result = Ok(());
        match self.controller.advance(dt_ms) {
            Some(TransitionEvent::Started { next_index }) => result = self.retarget(next_index),
            Some(TransitionEvent::Completed { index }) => {
                log::debug!("now showing phrase {:?}", self.phrases[index]);
            }
            None => {}
        }

        self.pool.update(dt_ms, self.pointer.state(), &mut self.rng);

        let segments = self.graph.build(self.pool.particles(), size);
        self.renderer.draw_segments(surface, segments, self.controller.progress());
        self.renderer.draw_particles(surface, self.pool.particles());

        result
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A mounted swarm.
pub struct Engine<S: Surface, H: AnimationHost> {
    state: EngineState,
    surface: S,
    host: H,
    pending: Option<FrameRequest>,
    torn_down: bool,
}

impl<S: Surface, H: AnimationHost> Engine<S, H> {
    /// Host frame callback.
    ///
    /// Runs a frame if the frame-rate cap allows, then requests the next one.
    /// Errors raised during the frame are logged, never returned.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if self.torn_down {
            return;
        }
        self.pending = None;

        if let Some(dt_ms) = self.state.clock.tick(timestamp_ms) {
            if let Err(e) = self.state.frame(&mut self.surface, dt_ms) {
                self.state.frame_errors += 1;
                log::warn!("frame {}: {}", self.state.clock.frame(), e);
            }
        }

        self.schedule();
    }

    /// Pointer moved to `client`, in the surface's displayed units.
    pub fn pointer_move(&mut self, client: Vec2, displayed: Vec2) {
        if self.torn_down {
            return;
        }
        let backing = self.surface.size();
        self.state.pointer.pointer_move(client, displayed, backing);
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) {
        if self.torn_down {
            return;
        }
        self.state.pointer.pointer_leave();
    }

    /// Record how large the surface appears on screen, for raw window events.
    pub fn set_displayed_size(&mut self, displayed: Vec2) {
        let backing = self.surface.size();
        self.state.pointer.set_sizes(displayed, backing);
    }

    /// Feed a winit window event to the pointer tracker.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if self.torn_down {
            return;
        }
        self.state.pointer.handle_event(event);
    }

    /// Resize the surface's backing store and rescale the swarm to match.
    pub fn resize(&mut self, new_size: SurfaceSize) {
        if self.torn_down {
            return;
        }
        self.surface.resize(new_size);
        if new_size.is_empty() {
            return;
        }

        if self.state.pool.is_empty() {
            self.state.initialize(new_size);
        } else {
            self.state.pool.resize(new_size);
            self.state.layout_size = new_size;
        }
    }

    /// Stop the engine.
    ///
    /// Cancels the pending frame request and any in-flight transition. Every
    /// later call on the engine does nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        self.state.controller.cancel();
        self.torn_down = true;
        log::debug!("engine torn down after {} frames", self.state.clock.frame());
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    pub fn phrases(&self) -> &[String] {
        &self.state.phrases
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.state.pool
    }

    pub fn controller(&self) -> &TransitionController {
        &self.state.controller
    }

    pub fn graph(&self) -> &ProximityGraph {
        &self.state.graph
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.state.pointer
    }

    pub fn clock(&self) -> &FrameClock {
        &self.state.clock
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The outstanding frame request, if any.
    pub fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Current counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            frames: self.state.clock.frame(),
            skipped: self.state.clock.skipped(),
            fps: self.state.clock.fps(),
            particles: self.state.pool.len(),
            segments: self.state.graph.segments().len(),
            frame_errors: self.state.frame_errors,
        }
    }

    fn schedule(&mut self) {
        self.pending = Some(self.host.request_frame());
    }
}
