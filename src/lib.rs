//! # glyphswarm
//!
//! A particle swarm that spells out text. Each phrase is rasterized and
//! sampled into a point cloud, and a fixed pool of particles drifts toward
//! those points. Every few seconds the swarm re-forms into the next phrase.
//! Nearby particles are joined by faint lines, accent particles glow, and the
//! pointer pushes particles out of its way.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glyphswarm::prelude::*;
//!
//! fn main() -> Result<(), ViewerError> {
//!     Viewer::new(["Hello", "World"])
//!         .with_config(EngineConfig::default().with_durations(3000.0, 1200.0))
//!         .with_render_scale(0.75)
//!         .run()
//! }
//! ```
//!
//! ## Embedding
//!
//! The [`Engine`] does not own a window or a clock. A host provides:
//!
//! - a [`Surface`] to draw on ([`Canvas`] is a CPU implementation)
//! - an [`AnimationHost`] that delivers frames by calling [`Engine::tick`]
//!
//! ```ignore
//! let mut engine = EngineBuilder::new()
//!     .with_phrases(["Hi", "Yo"])
//!     .with_animation_host(ManualHost::new())
//!     .mount(Canvas::new(SurfaceSize::new(400, 300)))?;
//!
//! for frame in 0..600 {
//!     engine.tick(frame as f64 * 1000.0 / 60.0);
//! }
//! let pixels = engine.surface().pixels();
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Type |
//! |-------|------|
//! | Text to points | [`TextRasterizer`] |
//! | Particles | [`ParticlePool`] |
//! | Phrase timing | [`TransitionController`] |
//! | Connection lines | [`ProximityGraph`] |
//! | Drawing | [`Renderer`] |
//! | Pointer | [`PointerTracker`] |
//! | Frame pacing | [`FrameClock`] |
//!
//! ## Configuration
//!
//! [`EngineConfig`] holds every tunable and loads from partial JSON, so a
//! file only needs the fields it changes.

pub mod config;
pub mod connections;
pub mod engine;
pub mod error;
mod gpu;
pub mod input;
pub mod particle;
pub mod pool;
pub mod rasterizer;
pub mod render;
pub mod scheduler;
pub mod spatial;
pub mod surface;
pub mod time;
pub mod transition;
pub mod visuals;
mod window;

pub use config::EngineConfig;
pub use connections::{ConnectionConfig, ConnectionTier, ProximityGraph, Segment};
pub use engine::{Engine, EngineBuilder, EngineState, EngineStats};
pub use error::{EngineError, GpuError, ViewerError};
pub use glam::{Vec2, Vec3};
pub use input::{PointerState, PointerTracker};
pub use particle::Particle;
pub use pool::{ParticlePool, PoolConfig};
pub use rasterizer::{BitmapMapping, Point, RasterConfig, TextRasterizer};
pub use render::Renderer;
pub use scheduler::{AnimationHost, FrameRequest, ManualHost};
pub use surface::{Canvas, Surface, SurfaceSize};
pub use time::FrameClock;
pub use transition::{Phase, TransitionConfig, TransitionController, TransitionEvent};
pub use visuals::{BlendMode, Palette, VisualConfig};
pub use window::{Viewer, WindowHost};

/// Common imports.
///
/// ```ignore
/// use glyphswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, EngineBuilder, EngineStats};
    pub use crate::error::{EngineError, ViewerError};
    pub use crate::scheduler::{AnimationHost, FrameRequest, ManualHost};
    pub use crate::surface::{Canvas, Surface, SurfaceSize};
    pub use crate::visuals::{BlendMode, Palette, VisualConfig};
    pub use crate::window::Viewer;
    pub use crate::{Vec2, Vec3};
}
