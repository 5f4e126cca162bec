//! Engine configuration.
//!
//! [`EngineConfig`] collects every tunable the engine reads. Each section has
//! sensible defaults, and the whole tree deserializes from partial JSON so a
//! host only needs to spell out what it changes:
//!
//! ```ignore
//! let config = EngineConfig::from_json(r#"{ "target_fps": 30, "pool": { "min_particles": 1200 } }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::connections::ConnectionConfig;
use crate::error::EngineError;
use crate::pool::PoolConfig;
use crate::rasterizer::RasterConfig;
use crate::transition::TransitionConfig;
use crate::visuals::VisualConfig;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame-rate cap. Host frames arriving faster than this are skipped.
    pub target_fps: f32,
    /// Radius of the pointer repulsion field in surface pixels.
    pub pointer_radius: f32,
    /// Seed for the engine's random source. `None` seeds from entropy.
    pub seed: Option<u64>,
    pub raster: RasterConfig,
    pub pool: PoolConfig,
    pub transition: TransitionConfig,
    pub connections: ConnectionConfig,
    pub visuals: VisualConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            pointer_radius: 90.0,
            seed: None,
            raster: RasterConfig::default(),
            pool: PoolConfig::default(),
            transition: TransitionConfig::default(),
            connections: ConnectionConfig::default(),
            visuals: VisualConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the frame-rate cap.
    pub fn with_target_fps(mut self, fps: f32) -> Self {
        self.target_fps = fps.max(1.0);
        self
    }

    /// Set the pointer repulsion radius.
    pub fn with_pointer_radius(mut self, radius: f32) -> Self {
        self.pointer_radius = radius.max(0.0);
        self
    }

    /// Fix the random seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the minimum particle count.
    pub fn with_min_particles(mut self, count: usize) -> Self {
        self.pool.min_particles = count;
        self
    }

    /// Set how long a phrase stays on screen and how long re-forming takes.
    pub fn with_durations(mut self, display_ms: f32, transition_ms: f32) -> Self {
        self.transition.display_duration_ms = display_ms.max(0.0);
        self.transition.transition_duration_ms = transition_ms.max(0.0);
        self
    }

    /// Configure the connection graph.
    pub fn with_connections(mut self, max_connections: usize, distance: f32) -> Self {
        self.connections.max_connections = max_connections;
        self.connections.connection_distance = distance.max(0.0);
        self
    }

    /// Adjust visual settings in place.
    pub fn with_visuals<F: FnOnce(&mut VisualConfig)>(mut self, f: F) -> Self {
        f(&mut self.visuals);
        self
    }

    /// Interval between processed frames in milliseconds.
    pub fn frame_interval_ms(&self) -> f32 {
        1000.0 / self.target_fps.max(1.0)
    }
}
