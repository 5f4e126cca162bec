//! Frame timing driven by host timestamps.
//!
//! Hosts hand the engine a monotonic timestamp in milliseconds with every
//! frame. [`FrameClock`] decides which of those frames are processed (the
//! frame-rate cap), and tracks delta time, frame count and FPS for the
//! processed ones.
//!
//! # Example
//!
//! ```ignore
//! use glyphswarm::time::FrameClock;
//!
//! let mut clock = FrameClock::new(1000.0 / 60.0);
//!
//! // In the host's frame callback:
//! if let Some(dt_ms) = clock.tick(timestamp_ms) {
//!     // advance the simulation by dt_ms
//! }
//! println!("FPS: {:.1}", clock.fps());
//! ```

/// Host frames may arrive this early and still count as on time.
pub const FRAME_SLACK_MS: f64 = 1.0;

/// How often the FPS estimate is refreshed.
const FPS_UPDATE_INTERVAL_MS: f64 = 500.0;

/// Frame throttle and timing statistics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Minimum spacing between processed frames.
    interval_ms: f64,
    /// Timestamp of the first processed frame.
    start_ms: Option<f64>,
    /// Timestamp of the last processed frame.
    last_frame_ms: Option<f64>,
    /// Time since the first processed frame.
    elapsed_ms: f64,
    /// Time between the last two processed frames.
    delta_ms: f32,
    /// Processed frames since start.
    frame_count: u64,
    /// Host frames dropped by the throttle.
    skipped: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_ms: f64,
}

impl FrameClock {
    /// Create a clock that processes at most one frame per `interval_ms`.
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0) as f64,
            start_ms: None,
            last_frame_ms: None,
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            frame_count: 0,
            skipped: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_ms: 0.0,
        }
    }

    /// Offer a host frame at `timestamp_ms`.
    ///
    /// Returns the delta to simulate if the frame should be processed, or
    /// `None` if it arrived too soon after the last processed one. The first
    /// processed frame has a delta of zero. A timestamp that goes backwards
    /// rebases the clock and is processed with a delta of zero.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f32> {
        if !timestamp_ms.is_finite() {
            self.skipped += 1;
            return None;
        }

        let delta = match self.last_frame_ms {
            None => {
                self.start_ms = Some(timestamp_ms);
                self.fps_update_ms = timestamp_ms;
                0.0
            }
            Some(last) => {
                let since = timestamp_ms - last;
                if since < 0.0 {
                    log::debug!("host clock went backwards by {:.1}ms", -since);
                    self.fps_update_ms = timestamp_ms;
                    self.fps_frame_count = self.frame_count;
                    0.0
                } else if since < self.interval_ms - FRAME_SLACK_MS {
                    self.skipped += 1;
                    return None;
                } else {
                    since
                }
            }
        };

        self.last_frame_ms = Some(timestamp_ms);
        self.delta_ms = delta as f32;
        self.elapsed_ms += delta;
        self.frame_count += 1;

        let fps_elapsed = timestamp_ms - self.fps_update_ms;
        if fps_elapsed >= FPS_UPDATE_INTERVAL_MS {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = (frames_since as f64 * 1000.0 / fps_elapsed) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_update_ms = timestamp_ms;
        }

        Some(self.delta_ms)
    }

    /// Minimum spacing between processed frames.
    #[inline]
    pub fn interval_ms(&self) -> f32 {
        self.interval_ms as f32
    }

    /// Change the frame-rate cap.
    pub fn set_interval_ms(&mut self, interval_ms: f32) {
        self.interval_ms = interval_ms.max(0.0) as f64;
    }

    /// Sum of processed deltas.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Delta of the last processed frame.
    #[inline]
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Processed frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Host frames dropped by the throttle.
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Processed frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Earliest timestamp the next host frame will be processed at.
    ///
    /// `None` before the first processed frame, when any frame is on time.
    pub fn next_frame_ms(&self) -> Option<f64> {
        self.last_frame_ms.map(|last| last + (self.interval_ms - FRAME_SLACK_MS).max(0.0))
    }

    /// Forget all history. The next frame is treated as the first.
    pub fn reset(&mut self) {
        *self = Self::new(self.interval_ms as f32);
    }
}
