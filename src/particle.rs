//! Swarm particles and their per-frame motion.
//!
//! Motion is pure position interpolation toward a target plus instantaneous
//! pointer repulsion. No velocity is stored between frames.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::input::PointerState;
use crate::pool::PoolConfig;
use crate::surface::SurfaceSize;

/// Reference frame length used to normalize per-frame rates.
pub(crate) const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// A single swarm particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current position in surface pixels.
    pub position: Vec2,
    /// Point the particle is drifting toward.
    pub target: Vec2,
    /// Base radius in pixels.
    pub size: f32,
    /// Accent particles are drawn in the accent color with a glow.
    pub is_accent: bool,
    /// Current pulse phase in radians.
    pub pulse_phase: f32,
    /// Pulse advance in radians per millisecond.
    pub pulse_speed: f32,
    /// Static connectivity group label.
    pub group: u32,
    /// Fraction of the remaining distance covered per reference frame.
    pub base_speed: f32,
    /// Surface size `position` and `target` were expressed in.
    pub owner: SurfaceSize,
}

impl Particle {
    /// Radius including the pulse swell.
    #[inline]
    pub fn radius(&self, pulse_amount: f32) -> f32 {
        self.size * (1.0 + pulse_amount * self.pulse_phase.sin())
    }

    /// Advance this particle by `dt_ms`.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        pointer: Option<&PointerState>,
        config: &PoolConfig,
        rng: &mut R,
    ) {
        let frames = dt_ms.max(0.0) / REFERENCE_FRAME_MS;
        let to_target = self.target - self.position;
        let distance = to_target.length();

        if distance > config.settle_epsilon {
            let boost = if distance > config.far_distance { config.far_boost } else { 1.0 };
            let fraction = (self.base_speed * frames * boost).min(1.0);
            self.position += to_target * fraction;
        } else if config.dither > 0.0 && frames > 0.0 {
            let d = config.dither;
            self.position += Vec2::new(rng.gen_range(-d..d), rng.gen_range(-d..d));
        }

        if let Some(pointer) = pointer {
            let strength = config.pointer_strength * frames;
            self.position += repulsion(self.position, pointer, strength, rng);
        }

        self.pulse_phase = (self.pulse_phase + self.pulse_speed * dt_ms.max(0.0)) % TAU;
    }

    /// Scale position and target from the owner size to `new`.
    ///
    /// Nothing moves if either size is empty or they are equal.
    pub(crate) fn rescale(&mut self, new: SurfaceSize) {
        if self.owner.is_empty() || new.is_empty() || self.owner == new {
            return;
        }
        let ratio = new.as_vec2() / self.owner.as_vec2();
        self.position *= ratio;
        self.target *= ratio;
        self.owner = new;
    }
}

/// Displacement pushing a particle at `position` away from the pointer.
///
/// Magnitude is `(1 - d / radius) * strength`, capped at the radius so one
/// long frame cannot fling particles off-surface. Zero outside the radius.
/// A particle exactly under the pointer is pushed in a random direction.
pub fn repulsion<R: Rng + ?Sized>(
    position: Vec2,
    pointer: &PointerState,
    strength: f32,
    rng: &mut R,
) -> Vec2 {
    if pointer.radius <= 0.0 {
        return Vec2::ZERO;
    }
    let away = position - pointer.position;
    let distance = away.length();
    if distance >= pointer.radius {
        return Vec2::ZERO;
    }
    let magnitude = ((1.0 - distance / pointer.radius) * strength).min(pointer.radius);
    let direction = if distance > f32::EPSILON {
        away / distance
    } else {
        Vec2::from_angle(rng.gen_range(0.0..TAU))
    };
    direction * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn particle_at(position: Vec2, target: Vec2) -> Particle {
        Particle {
            position,
            target,
            size: 1.5,
            is_accent: false,
            pulse_phase: 0.0,
            pulse_speed: 0.002,
            group: 0,
            base_speed: 0.05,
            owner: SurfaceSize::new(400, 300),
        }
    }

    #[test]
    fn test_step_moves_toward_target() {
        let mut rng = SmallRng::seed_from_u64(1);
        let config = PoolConfig::default();
        let mut p = particle_at(Vec2::ZERO, Vec2::new(100.0, 0.0));
        p.step(REFERENCE_FRAME_MS, None, &config, &mut rng);
        assert!(p.position.x > 0.0 && p.position.x < 100.0);
        assert!(p.position.y.abs() < 1e-5);
    }

    #[test]
    fn test_far_particles_move_faster() {
        let mut rng = SmallRng::seed_from_u64(1);
        let config = PoolConfig::default();
        let mut far = particle_at(Vec2::ZERO, Vec2::new(config.far_distance * 4.0, 0.0));
        let mut near = particle_at(Vec2::ZERO, Vec2::new(config.far_distance * 0.5, 0.0));
        far.step(REFERENCE_FRAME_MS, None, &config, &mut rng);
        near.step(REFERENCE_FRAME_MS, None, &config, &mut rng);
        let far_fraction = far.position.x / far.target.x;
        let near_fraction = near.position.x / near.target.x;
        assert!(far_fraction > near_fraction);
    }

    #[test]
    fn test_huge_step_never_overshoots() {
        let mut rng = SmallRng::seed_from_u64(1);
        let config = PoolConfig::default();
        let mut p = particle_at(Vec2::ZERO, Vec2::new(500.0, 500.0));
        p.step(60_000.0, None, &config, &mut rng);
        assert!((p.position - p.target).length() < 1e-3);
    }

    #[test]
    fn test_settled_particle_dithers_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(9);
        let config = PoolConfig::default();
        let target = Vec2::new(50.0, 50.0);
        let mut p = particle_at(target, target);
        for _ in 0..10 {
            p.step(REFERENCE_FRAME_MS, None, &config, &mut rng);
        }
        assert!((p.position - target).length() < 10.0 * config.dither * 2.0);
    }

    #[test]
    fn test_repulsion_points_away() {
        let mut rng = SmallRng::seed_from_u64(2);
        let pointer = PointerState { position: Vec2::new(100.0, 100.0), radius: 50.0 };
        let position = Vec2::new(110.0, 95.0);
        let push = repulsion(position, &pointer, 3.0, &mut rng);
        assert!(push.dot(position - pointer.position) > 0.0);
    }

    #[test]
    fn test_repulsion_zero_outside_radius() {
        let mut rng = SmallRng::seed_from_u64(2);
        let pointer = PointerState { position: Vec2::ZERO, radius: 10.0 };
        assert_eq!(repulsion(Vec2::new(10.0, 0.0), &pointer, 3.0, &mut rng), Vec2::ZERO);
        assert_eq!(repulsion(Vec2::new(30.0, 5.0), &pointer, 3.0, &mut rng), Vec2::ZERO);
    }

    #[test]
    fn test_repulsion_at_pointer_is_finite() {
        let mut rng = SmallRng::seed_from_u64(2);
        let pointer = PointerState { position: Vec2::new(20.0, 20.0), radius: 40.0 };
        let push = repulsion(pointer.position, &pointer, 3.0, &mut rng);
        assert!(push.is_finite());
        assert!((push.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_step_with_pointer_pushes_away() {
        let mut rng = SmallRng::seed_from_u64(4);
        let config = PoolConfig::default();
        let start = Vec2::new(200.0, 150.0);
        // Settled, so only dither and repulsion act.
        let mut p = particle_at(start, start);
        let pointer = PointerState { position: Vec2::new(190.0, 150.0), radius: 60.0 };
        p.step(REFERENCE_FRAME_MS, Some(&pointer), &config, &mut rng);
        assert!((p.position - start).dot(start - pointer.position) > 0.0);
    }

    #[test]
    fn test_rescale_identity() {
        let mut p = particle_at(Vec2::new(12.5, 33.3), Vec2::new(99.9, 1.1));
        let before = p.clone();
        p.rescale(p.owner);
        assert_eq!(p, before);
    }

    #[test]
    fn test_rescale_uses_own_size() {
        let mut p = particle_at(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
        p.owner = SurfaceSize::new(200, 100);
        p.rescale(SurfaceSize::new(400, 400));
        assert_eq!(p.position, Vec2::new(200.0, 200.0));
        assert_eq!(p.target, Vec2::new(40.0, 40.0));
        assert_eq!(p.owner, SurfaceSize::new(400, 400));

        p.rescale(SurfaceSize::default());
        assert_eq!(p.position, Vec2::new(200.0, 200.0));
        assert_eq!(p.owner, SurfaceSize::new(400, 400));
    }
}
