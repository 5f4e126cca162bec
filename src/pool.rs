//! Fixed-size particle pool.
//!
//! The pool is created once from the first phrase's point cloud and never
//! changes size afterwards. Later phrases only move targets, so each new
//! phrase re-forms out of wherever the swarm currently is.
//!
//! Particle `i` is assigned point `i % points.len()`. Particles past the end
//! of the cloud reuse earlier points with a little jitter so duplicates don't
//! sit exactly on top of each other.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::input::PointerState;
use crate::particle::Particle;
use crate::rasterizer::Point;
use crate::surface::SurfaceSize;

/// Pool sizing and motion tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Minimum number of particles regardless of phrase size.
    pub min_particles: usize,
    /// Number of static connectivity groups.
    pub group_count: u32,
    /// Jitter applied to targets of particles reusing an earlier point.
    pub duplicate_jitter: f32,
    /// Radius range for regular particles.
    pub size_range: (f32, f32),
    /// Radius range for accent particles.
    pub accent_size_range: (f32, f32),
    /// Range of per-particle approach speed (fraction per reference frame).
    pub base_speed_range: (f32, f32),
    /// Pulse speed range in radians per millisecond.
    pub pulse_speed_range: (f32, f32),
    /// Beyond this distance from the target, approach speed is boosted.
    pub far_distance: f32,
    /// Multiplier applied while far from target.
    pub far_boost: f32,
    /// Within this distance a particle counts as settled.
    pub settle_epsilon: f32,
    /// Maximum per-frame random dither for settled particles.
    pub dither: f32,
    /// Peak pointer push per reference frame, in pixels.
    pub pointer_strength: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_particles: 800,
            group_count: 4,
            duplicate_jitter: 2.0,
            size_range: (0.8, 2.0),
            accent_size_range: (1.6, 2.8),
            base_speed_range: (0.035, 0.07),
            pulse_speed_range: (0.0015, 0.004),
            far_distance: 60.0,
            far_boost: 2.2,
            settle_epsilon: 0.6,
            dither: 0.25,
            pointer_strength: 4.0,
        }
    }
}

/// Owns the swarm.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    config: PoolConfig,
    particles: Vec<Particle>,
}

impl ParticlePool {
    pub fn new(config: PoolConfig) -> Self {
        Self { config, particles: Vec::new() }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Number of particles a cloud of `point_count` points produces.
    pub fn particle_count(&self, point_count: usize) -> usize {
        (point_count * 2).max(self.config.min_particles)
    }

    /// Create the swarm for `points` on a surface of `size`.
    ///
    /// Positions start uniformly random over the surface; targets are the
    /// assigned points. With an empty cloud each particle targets its own
    /// start position.
    pub fn initialize<R: Rng + ?Sized>(
        &mut self,
        points: &[Point],
        size: SurfaceSize,
        rng: &mut R,
    ) {
        let count = self.particle_count(points.len());
        let bounds = size.as_vec2();
        let groups = self.config.group_count.max(1);
        let (pulse_lo, pulse_hi) = self.config.pulse_speed_range;
        let (speed_lo, speed_hi) = self.config.base_speed_range;

        self.particles = (0..count)
            .map(|i| {
                let position = Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y);
                let (target, is_accent) = if points.is_empty() {
                    (position, false)
                } else {
                    let point = &points[i % points.len()];
                    (self.assigned_target(i, points, rng), point.is_accent)
                };
                let (lo, hi) = if is_accent {
                    self.config.accent_size_range
                } else {
                    self.config.size_range
                };
                Particle {
                    position,
                    target,
                    size: gen_between(rng, lo, hi),
                    is_accent,
                    pulse_phase: rng.gen_range(0.0..TAU),
                    pulse_speed: gen_between(rng, pulse_lo, pulse_hi),
                    group: i as u32 % groups,
                    base_speed: gen_between(rng, speed_lo, speed_hi),
                    owner: size,
                }
            })
            .collect();

        log::debug!("initialized {} particles from {} points", count, points.len());
    }

    /// Point particles at a new cloud without touching anything else.
    ///
    /// Does nothing if `points` is empty.
    pub fn retarget<R: Rng + ?Sized>(&mut self, points: &[Point], rng: &mut R) {
        if points.is_empty() {
            return;
        }
        for i in 0..self.particles.len() {
            let target = self.assigned_target(i, points, rng);
            self.particles[i].target = target;
        }
    }

    /// Advance every particle by `dt_ms`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        pointer: Option<&PointerState>,
        rng: &mut R,
    ) {
        for particle in &mut self.particles {
            particle.step(dt_ms, pointer, &self.config, rng);
        }
    }

    /// Rescale positions and targets after a surface resize.
    ///
    /// Each particle scales from the size it was laid out on, so relative
    /// layout is preserved. An empty `new` size is ignored.
    pub fn resize(&mut self, new: SurfaceSize) {
        if new.is_empty() {
            return;
        }
        for particle in &mut self.particles {
            particle.rescale(new);
        }
        log::debug!(
            "rescaled {} particles to {}x{}",
            self.particles.len(),
            new.width,
            new.height
        );
    }

    fn assigned_target<R: Rng + ?Sized>(&self, i: usize, points: &[Point], rng: &mut R) -> Vec2 {
        let base = points[i % points.len()].position;
        let j = self.config.duplicate_jitter;
        if i >= points.len() && j > 0.0 {
            base + Vec2::new(rng.gen_range(-j..j), rng.gen_range(-j..j))
        } else {
            base
        }
    }
}

/// Uniform sample in `lo..hi`, tolerating an empty or inverted range.
fn gen_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cloud(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point {
                position: Vec2::new(10.0 + i as f32, 20.0),
                is_accent: i % 10 == 0,
            })
            .collect()
    }

    #[test]
    fn test_count_respects_floor_and_double() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(50), SurfaceSize::new(400, 300), &mut rng);
        assert_eq!(pool.len(), 800);

        pool.initialize(&cloud(600), SurfaceSize::new(400, 300), &mut rng);
        assert_eq!(pool.len(), 1200);
    }

    #[test]
    fn test_cyclic_assignment_with_jitter() {
        let mut rng = SmallRng::seed_from_u64(2);
        let config = PoolConfig { min_particles: 0, ..Default::default() };
        let jitter = config.duplicate_jitter;
        let mut pool = ParticlePool::new(config);
        let points = cloud(5);
        pool.initialize(&points, SurfaceSize::new(400, 300), &mut rng);
        assert_eq!(pool.len(), 10);
        for (i, p) in pool.particles().iter().enumerate() {
            let base = points[i % 5].position;
            if i < 5 {
                assert_eq!(p.target, base);
            } else {
                assert!((p.target - base).abs().max_element() <= jitter);
            }
            assert_eq!(p.is_accent, points[i % 5].is_accent);
        }
    }

    #[test]
    fn test_initial_positions_inside_surface() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(10), SurfaceSize::new(400, 300), &mut rng);
        for p in pool.particles() {
            assert!(p.position.x >= 0.0 && p.position.x <= 400.0);
            assert!(p.position.y >= 0.0 && p.position.y <= 300.0);
        }
    }

    #[test]
    fn test_groups_are_balanced() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(10), SurfaceSize::new(400, 300), &mut rng);
        for g in 0..4 {
            let n = pool.particles().iter().filter(|p| p.group == g).count();
            assert_eq!(n, 200);
        }
    }

    #[test]
    fn test_retarget_keeps_everything_but_targets() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(30), SurfaceSize::new(400, 300), &mut rng);
        let before = pool.particles().to_vec();

        let other: Vec<Point> = (0..7)
            .map(|i| Point { position: Vec2::new(300.0, 10.0 * i as f32), is_accent: true })
            .collect();
        pool.retarget(&other, &mut rng);

        assert_eq!(pool.len(), before.len());
        for (i, (old, new)) in before.iter().zip(pool.particles()).enumerate() {
            assert_eq!(old.position, new.position);
            assert_eq!(old.size, new.size);
            assert_eq!(old.is_accent, new.is_accent);
            assert_eq!(old.group, new.group);
            if i < 7 {
                assert_eq!(new.target, other[i].position);
            }
        }
    }

    #[test]
    fn test_retarget_empty_is_noop() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(30), SurfaceSize::new(400, 300), &mut rng);
        let before = pool.particles().to_vec();
        pool.retarget(&[], &mut rng);
        assert_eq!(pool.particles(), &before[..]);
    }

    #[test]
    fn test_empty_cloud_targets_start_positions() {
        let mut rng = SmallRng::seed_from_u64(6);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&[], SurfaceSize::new(400, 300), &mut rng);
        assert_eq!(pool.len(), 800);
        assert!(pool.particles().iter().all(|p| p.position == p.target));
    }

    #[test]
    fn test_resize_same_size_is_identity() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut pool = ParticlePool::new(PoolConfig::default());
        let size = SurfaceSize::new(400, 300);
        pool.initialize(&cloud(30), size, &mut rng);
        pool.update(16.0, None, &mut rng);
        let before = pool.particles().to_vec();
        pool.resize(size);
        assert_eq!(pool.particles(), &before[..]);
    }

    #[test]
    fn test_resize_scales_positions_and_targets() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(30), SurfaceSize::new(400, 300), &mut rng);
        let before = pool.particles().to_vec();
        pool.resize(SurfaceSize::new(800, 150));
        for (old, new) in before.iter().zip(pool.particles()) {
            assert!((new.position.x - old.position.x * 2.0).abs() < 1e-3);
            assert!((new.position.y - old.position.y * 0.5).abs() < 1e-3);
            assert!((new.target.x - old.target.x * 2.0).abs() < 1e-3);
            assert!((new.target.y - old.target.y * 0.5).abs() < 1e-3);
            assert_eq!(new.owner, SurfaceSize::new(800, 150));
        }
    }

    #[test]
    fn test_resize_to_empty_keeps_layout() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut pool = ParticlePool::new(PoolConfig::default());
        pool.initialize(&cloud(30), SurfaceSize::new(400, 300), &mut rng);
        let before = pool.particles().to_vec();
        pool.resize(SurfaceSize::default());
        assert_eq!(pool.particles(), &before[..]);

        pool.resize(SurfaceSize::new(200, 150));
        pool.resize(SurfaceSize::new(400, 300));
        for (old, new) in before.iter().zip(pool.particles()) {
            assert!((old.position - new.position).length() < 1e-3);
        }
    }
}
