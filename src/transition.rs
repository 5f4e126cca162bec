//! Phrase transition timing.
//!
//! The controller alternates between two states:
//!
//! - **Stable**: the current phrase is on screen and progress is 1. Once the
//!   display duration has elapsed, the controller picks the next phrase and
//!   reports [`TransitionEvent::Started`].
//! - **Transitioning**: progress runs from 0 to 1 along an ease-in-out-cubic
//!   curve. When the transition duration has elapsed the next phrase becomes
//!   current and [`TransitionEvent::Completed`] is reported.
//!
//! All timing comes from the `dt_ms` values fed to [`TransitionController::advance`],
//! so the controller is deterministic and needs no timers.

use serde::{Deserialize, Serialize};

/// Transition timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// How long a phrase stays formed before the next one starts.
    pub display_duration_ms: f32,
    /// How long re-forming takes.
    pub transition_duration_ms: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            display_duration_ms: 4000.0,
            transition_duration_ms: 1500.0,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Stable,
    Transitioning {
        next_index: usize,
        /// Time spent in this transition so far.
        elapsed_ms: f32,
    },
}

/// Something the engine must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// A transition began. The phrase at `next_index` should be rasterized
    /// and the pool retargeted.
    Started { next_index: usize },
    /// A transition finished and `index` is now the current phrase.
    Completed { index: usize },
}

/// Ease-in-out cubic on `t` in `[0, 1]`.
///
/// Monotonic, with `ease_in_out_cubic(0) == 0` and `ease_in_out_cubic(1) == 1` exactly.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Times phrase changes.
#[derive(Debug, Clone)]
pub struct TransitionController {
    config: TransitionConfig,
    phrase_count: usize,
    current_index: usize,
    progress: f32,
    phase: Phase,
    /// Accumulated in-loop time.
    clock_ms: f64,
    last_change_ms: f64,
}

impl TransitionController {
    /// Create a controller cycling through `phrase_count` phrases, starting
    /// stable on phrase 0.
    pub fn new(config: TransitionConfig, phrase_count: usize) -> Self {
        Self {
            config,
            phrase_count: phrase_count.max(1),
            current_index: 0,
            progress: 1.0,
            phase: Phase::Stable,
            clock_ms: 0.0,
            last_change_ms: 0.0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Eased transition progress. 1 means stable.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning { .. })
    }

    /// In-loop time of the last phrase change.
    pub fn last_change_ms(&self) -> f64 {
        self.last_change_ms
    }

    /// Advance by `dt_ms` of in-loop time.
    ///
    /// At most one event is reported per call. Time that overshoots a
    /// deadline carries into the next phase, so a transition started late
    /// begins part-way through, and one whose whole duration has already
    /// passed completes on the following call even if that call's `dt_ms`
    /// is 0.
    pub fn advance(&mut self, dt_ms: f32) -> Option<TransitionEvent> {
        let dt_ms = dt_ms.max(0.0);
        self.clock_ms += dt_ms as f64;

        match self.phase {
            Phase::Stable => {
                let shown = (self.clock_ms - self.last_change_ms) as f32;
                let display = self.config.display_duration_ms;
                if shown < display {
                    return None;
                }
                let next_index = (self.current_index + 1) % self.phrase_count;
                let elapsed_ms = (shown - display).max(0.0);
                self.phase = Phase::Transitioning {
                    next_index,
                    elapsed_ms,
                };
                self.progress = self.eased(elapsed_ms);
                log::debug!("transition {} -> {} started", self.current_index, next_index);
                Some(TransitionEvent::Started { next_index })
            }
            Phase::Transitioning { next_index, elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                let duration = self.config.transition_duration_ms;
                if elapsed_ms >= duration {
                    self.current_index = next_index;
                    self.progress = 1.0;
                    self.phase = Phase::Stable;
                    self.last_change_ms = self.clock_ms - (elapsed_ms - duration) as f64;
                    return Some(TransitionEvent::Completed { index: next_index });
                }
                self.progress = self.progress.max(self.eased(elapsed_ms));
                self.phase = Phase::Transitioning {
                    next_index,
                    elapsed_ms,
                };
                None
            }
        }
    }

    /// Eased progress after `elapsed_ms` of transition.
    fn eased(&self, elapsed_ms: f32) -> f32 {
        let duration = self.config.transition_duration_ms;
        if duration <= 0.0 {
            return 0.0;
        }
        ease_in_out_cubic(elapsed_ms / duration)
    }

    /// Drop any in-flight transition without committing it.
    ///
    /// The current phrase stays current and progress returns to 1.
    pub fn cancel(&mut self) {
        if self.is_transitioning() {
            log::debug!("transition from {} cancelled", self.current_index);
        }
        self.phase = Phase::Stable;
        self.progress = 1.0;
        self.last_change_ms = self.clock_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(display: f32, transition: f32, count: usize) -> TransitionController {
        let config = TransitionConfig {
            display_duration_ms: display,
            transition_duration_ms: transition,
        };
        TransitionController::new(config, count)
    }

    fn controller(count: usize) -> TransitionController {
        timed(100.0, 50.0, count)
    }

    #[test]
    fn test_easing_endpoints_and_monotonic() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_cubic(i as f32 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_stays_stable_during_display() {
        let mut c = controller(2);
        assert_eq!(c.advance(60.0), None);
        assert_eq!(c.advance(30.0), None);
        assert_eq!(c.progress(), 1.0);
        assert!(!c.is_transitioning());
    }

    #[test]
    fn test_full_cycle() {
        let mut c = controller(3);
        assert_eq!(c.advance(100.0), Some(TransitionEvent::Started { next_index: 1 }));
        assert_eq!(c.progress(), 0.0);
        assert_eq!(c.current_index(), 0);

        assert_eq!(c.advance(25.0), None);
        assert!((c.progress() - 0.5).abs() < 1e-6);

        assert_eq!(c.advance(25.0), Some(TransitionEvent::Completed { index: 1 }));
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.phase(), Phase::Stable);
        assert_eq!(c.last_change_ms(), 150.0);
    }

    #[test]
    fn test_progress_non_decreasing_and_reaches_one() {
        let mut c = controller(2);
        c.advance(100.0);
        let mut last = c.progress();
        for _ in 0..20 {
            c.advance(3.3);
            assert!(c.progress() >= last);
            last = c.progress();
        }
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn test_wraps_around() {
        let mut c = controller(2);
        for _ in 0..2 {
            c.advance(100.0);
            c.advance(50.0);
        }
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_single_phrase_wraps_to_itself() {
        let mut c = controller(1);
        for _ in 0..5 {
            assert_eq!(c.advance(100.0), Some(TransitionEvent::Started { next_index: 0 }));
            assert_eq!(c.advance(50.0), Some(TransitionEvent::Completed { index: 0 }));
        }
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn test_zero_duration_transition_completes_next_call() {
        let mut c = timed(10.0, 0.0, 2);
        assert!(matches!(c.advance(10.0), Some(TransitionEvent::Started { .. })));
        assert_eq!(c.advance(0.0), Some(TransitionEvent::Completed { index: 1 }));
    }

    #[test]
    fn test_uneven_frames_finish_on_time() {
        let mut c = timed(4050.0, 1500.0, 2);
        // 41 x 100 ms overshoots the display time by 50 ms.
        for _ in 0..55 {
            c.advance(100.0);
        }
        assert!(c.is_transitioning());
        assert_eq!(c.advance(50.0), Some(TransitionEvent::Completed { index: 1 }));
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.last_change_ms(), 5550.0);
    }

    #[test]
    fn test_late_start_carries_overshoot() {
        let mut c = controller(2);
        assert_eq!(c.advance(125.0), Some(TransitionEvent::Started { next_index: 1 }));
        assert!((c.progress() - 0.5).abs() < 1e-6);
        assert_eq!(c.advance(25.0), Some(TransitionEvent::Completed { index: 1 }));
    }

    #[test]
    fn test_one_long_frame_completes_on_next_call() {
        let mut c = timed(4000.0, 1500.0, 2);
        assert_eq!(c.advance(16.0), None);
        assert_eq!(c.advance(5600.0), Some(TransitionEvent::Started { next_index: 1 }));
        assert_eq!(c.advance(0.0), Some(TransitionEvent::Completed { index: 1 }));
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.progress(), 1.0);
        // The 116 ms left over counts toward the next display period.
        assert_eq!(c.last_change_ms(), 5500.0);
    }

    #[test]
    fn test_cancel_drops_pending_swap() {
        let mut c = controller(2);
        c.advance(100.0);
        assert!(c.is_transitioning());
        c.cancel();
        assert!(!c.is_transitioning());
        assert_eq!(c.current_index(), 0);
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.advance(50.0), None);
    }
}
