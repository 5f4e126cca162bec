//! Connection lines between nearby particles.
//!
//! Finding every close pair each frame would cost O(n²), so discovery is
//! spread over several frames. Particles carry a static group label, and one
//! group is active per frame, round-robin. A pair is *owned* by its lower
//! group (ties go to the lower index), and is only searched for on the frame
//! its owner group is active. Search goes through a [`SpatialGrid`], so only
//! nearby candidates are distance-checked.
//!
//! Pairs found for a group are kept until that group is active again. Every
//! frame all kept pairs are re-measured at their *current* positions and
//! emitted if still in range, so lines track moving particles smoothly.
//!
//! Emission stops as soon as `max_connections` segments exist, and each
//! group's kept list is capped at the same number, which bounds draw cost
//! regardless of particle count. A search that hits the cap remembers the
//! particle it stopped at and starts there the next time its group is
//! active. Below the cap every pair is rediscovered once per `group_count`
//! frames; above it the searches walk the whole group over a few rotations.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::particle::Particle;
use crate::spatial::SpatialGrid;
use crate::surface::SurfaceSize;

/// Connection graph tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Maximum distance for a connection, in pixels.
    pub connection_distance: f32,
    /// Maximum segments emitted per frame.
    pub max_connections: usize,
    /// Alpha of a zero-length connection.
    pub max_alpha: f32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connection_distance: 28.0,
            max_connections: 600,
            max_alpha: 0.5,
        }
    }
}

/// Color tier of a segment, by how many endpoints are accents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionTier {
    Plain,
    Mixed,
    Accent,
}

impl ConnectionTier {
    pub fn from_accents(a: bool, b: bool) -> Self {
        match (a, b) {
            (false, false) => ConnectionTier::Plain,
            (true, true) => ConnectionTier::Accent,
            _ => ConnectionTier::Mixed,
        }
    }

    /// Index into a `[plain, mixed, accent]` color table.
    pub fn index(self) -> usize {
        match self {
            ConnectionTier::Plain => 0,
            ConnectionTier::Mixed => 1,
            ConnectionTier::Accent => 2,
        }
    }
}

/// One line to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
    pub tier: ConnectionTier,
    /// Particle indices of the endpoints.
    pub endpoints: (u32, u32),
}

/// Per-frame proximity graph.
#[derive(Debug, Clone)]
pub struct ProximityGraph {
    config: ConnectionConfig,
    group_count: u32,
    frame: u64,
    grid: SpatialGrid,
    /// Pairs found the last time each group was active.
    discovered: Vec<Vec<(u32, u32)>>,
    /// Particle index each group's next search starts from.
    cursors: Vec<usize>,
    /// Particle count the discovered pairs refer to.
    particle_count: usize,
    segments: Vec<Segment>,
    evaluations: usize,
}

impl ProximityGraph {
    pub fn new(config: ConnectionConfig, group_count: u32) -> Self {
        let group_count = group_count.max(1);
        Self {
            config,
            group_count,
            frame: 0,
            grid: SpatialGrid::new(),
            discovered: vec![Vec::new(); group_count as usize],
            cursors: vec![0; group_count as usize],
            particle_count: 0,
            segments: Vec::new(),
            evaluations: 0,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Segments from the last build.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distance checks performed during discovery in the last build.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Group that the next call to [`ProximityGraph::build`] will search.
    pub fn active_group(&self) -> u32 {
        (self.frame % self.group_count as u64) as u32
    }

    /// Compute this frame's segments.
    pub fn build(&mut self, particles: &[Particle], size: SurfaceSize) -> &[Segment] {
        self.segments.clear();
        self.evaluations = 0;
        let active = self.active_group();
        self.frame = self.frame.wrapping_add(1);

        let max = self.config.max_connections;
        let distance = self.config.connection_distance;
        if particles.len() < 2 || max == 0 || distance <= 0.0 {
            return &self.segments;
        }
        if particles.len() != self.particle_count {
            self.discovered.iter_mut().for_each(Vec::clear);
            self.cursors.iter_mut().for_each(|c| *c = 0);
            self.particle_count = particles.len();
        }

        self.discover(particles, size, active);
        self.emit(particles, active);
        &self.segments
    }

    /// Refresh the active group's pair list.
    ///
    /// The scan wraps around the particle list from the group's cursor. When
    /// the cap cuts it short, the cursor moves to the particle being searched
    /// so its remaining pairs come first next time. A particle that fills
    /// the cap on its own is skipped past, so the cursor always advances.
    fn discover(&mut self, particles: &[Particle], size: SurfaceSize, active: u32) {
        let max = self.config.max_connections;
        let distance_sq = self.config.connection_distance * self.config.connection_distance;
        self.grid.rebuild(
            particles.iter().map(|p| p.position),
            size,
            self.config.connection_distance,
        );

        let n = particles.len();
        let start = self.cursors[active as usize] % n;
        let found = &mut self.discovered[active as usize];
        found.clear();
        'scan: for i in (start..n).chain(0..start) {
            let p = &particles[i];
            if p.group != active {
                continue;
            }
            for j in self.grid.neighbors(p.position) {
                let q = &particles[j as usize];
                let owned = p.group < q.group || (p.group == q.group && (i as u32) < j);
                if !owned {
                    continue;
                }
                self.evaluations += 1;
                if (p.position - q.position).length_squared() < distance_sq {
                    found.push((i as u32, j));
                    if found.len() >= max {
                        let resume = if i == start { (i + 1) % n } else { i };
                        self.cursors[active as usize] = resume;
                        break 'scan;
                    }
                }
            }
        }
    }

    /// Re-measure every kept pair and emit the ones still in range.
    ///
    /// The freshly searched group goes first.
    fn emit(&mut self, particles: &[Particle], active: u32) {
        let max = self.config.max_connections;
        let distance = self.config.connection_distance;
        let distance_sq = distance * distance;
        for offset in 0..self.group_count {
            let group = ((active + offset) % self.group_count) as usize;
            for &(i, j) in &self.discovered[group] {
                if self.segments.len() >= max {
                    return;
                }
                let (Some(a), Some(b)) = (particles.get(i as usize), particles.get(j as usize))
                else {
                    continue;
                };
                let d_sq = a.position.distance_squared(b.position);
                if d_sq >= distance_sq {
                    continue;
                }
                let d = d_sq.sqrt();
                self.segments.push(Segment {
                    from: a.position,
                    to: b.position,
                    alpha: (1.0 - d / distance) * self.config.max_alpha,
                    tier: ConnectionTier::from_accents(a.is_accent, b.is_accent),
                    endpoints: (i, j),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    const SIZE: SurfaceSize = SurfaceSize::new(400, 300);

    fn scattered(n: usize, groups: u32, seed: u64) -> Vec<Particle> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|i| {
                let position = Vec2::new(rng.gen_range(0.0..400.0), rng.gen_range(0.0..300.0));
                Particle {
                    position,
                    target: position,
                    size: 1.0,
                    is_accent: rng.gen_bool(0.1),
                    pulse_phase: 0.0,
                    pulse_speed: 0.0,
                    group: i as u32 % groups,
                    base_speed: 0.05,
                    owner: SIZE,
                }
            })
            .collect()
    }

    fn brute_force_pairs(particles: &[Particle], distance: f32) -> HashSet<(u32, u32)> {
        let mut pairs = HashSet::new();
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                if particles[i].position.distance(particles[j].position) < distance {
                    pairs.insert((i as u32, j as u32));
                }
            }
        }
        pairs
    }

    fn normalized(seg: &Segment) -> (u32, u32) {
        let (a, b) = seg.endpoints;
        (a.min(b), a.max(b))
    }

    #[test]
    fn test_tiers() {
        assert_eq!(ConnectionTier::from_accents(false, false), ConnectionTier::Plain);
        assert_eq!(ConnectionTier::from_accents(true, false), ConnectionTier::Mixed);
        assert_eq!(ConnectionTier::from_accents(false, true), ConnectionTier::Mixed);
        assert_eq!(ConnectionTier::from_accents(true, true), ConnectionTier::Accent);
    }

    #[test]
    fn test_never_exceeds_max_connections() {
        let particles = scattered(2000, 4, 1);
        let config = ConnectionConfig {
            connection_distance: 40.0,
            max_connections: 50,
            max_alpha: 0.5,
        };
        let mut graph = ProximityGraph::new(config, 4);
        for _ in 0..12 {
            assert!(graph.build(&particles, SIZE).len() <= 50);
        }
    }

    #[test]
    fn test_full_coverage_after_one_rotation() {
        let particles = scattered(300, 4, 2);
        let config = ConnectionConfig {
            connection_distance: 30.0,
            max_connections: 100_000,
            max_alpha: 0.5,
        };
        let mut graph = ProximityGraph::new(config, 4);
        for _ in 0..4 {
            graph.build(&particles, SIZE);
        }
        // After every group has been active once, the kept pairs cover everything.
        let emitted: HashSet<(u32, u32)> = graph.segments().iter().map(normalized).collect();
        assert_eq!(emitted, brute_force_pairs(&particles, 30.0));
        assert_eq!(emitted.len(), graph.segments().len(), "no duplicate segments");
    }

    #[test]
    fn test_capped_discovery_covers_every_pair() {
        let particles = scattered(600, 4, 7);
        let config = ConnectionConfig {
            connection_distance: 40.0,
            max_connections: 400,
            max_alpha: 0.5,
        };
        let all = brute_force_pairs(&particles, 40.0);
        assert!(all.len() > 4 * 400, "only {} pairs", all.len());

        let mut graph = ProximityGraph::new(config, 4);
        let mut emitted = HashSet::new();
        for _ in 0..4 * 30 {
            let segs = graph.build(&particles, SIZE);
            assert!(segs.len() <= 400);
            emitted.extend(segs.iter().map(normalized));
        }
        assert_eq!(emitted, all);
    }

    #[test]
    fn test_cursor_advances_past_a_crowded_particle() {
        // Particle 0 alone owns more pairs than the cap.
        let mut particles = scattered(12, 1, 8);
        for (k, p) in particles.iter_mut().enumerate() {
            p.position = Vec2::new(100.0 + k as f32, 100.0);
        }
        let config = ConnectionConfig {
            connection_distance: 30.0,
            max_connections: 3,
            max_alpha: 0.5,
        };
        let mut graph = ProximityGraph::new(config, 1);
        let mut emitted = HashSet::new();
        for _ in 0..40 {
            emitted.extend(graph.build(&particles, SIZE).iter().map(normalized));
        }
        let owners: HashSet<u32> = emitted.iter().map(|&(a, _)| a).collect();
        assert!(owners.len() > 1);
    }

    #[test]
    fn test_discovery_is_amortized() {
        let particles = scattered(1200, 4, 3);
        let config = ConnectionConfig {
            connection_distance: 20.0,
            max_connections: 100_000,
            max_alpha: 0.5,
        };
        let mut graph = ProximityGraph::new(config, 4);
        graph.build(&particles, SIZE);
        let all_pairs = particles.len() * (particles.len() - 1) / 2;
        assert!(graph.evaluations() > 0);
        assert!(graph.evaluations() * 20 < all_pairs, "evaluations {}", graph.evaluations());
    }

    #[test]
    fn test_alpha_falls_with_distance() {
        let mut particles = scattered(2, 1, 4);
        particles[0].position = Vec2::new(100.0, 100.0);
        particles[1].position = Vec2::new(110.0, 100.0);
        let config = ConnectionConfig {
            connection_distance: 20.0,
            max_connections: 10,
            max_alpha: 0.6,
        };
        let mut graph = ProximityGraph::new(config, 1);
        let near = graph.build(&particles, SIZE)[0].alpha;
        assert!((near - 0.3).abs() < 1e-5);

        particles[1].position = Vec2::new(115.0, 100.0);
        let far = graph.build(&particles, SIZE)[0].alpha;
        assert!(far < near);
    }

    #[test]
    fn test_kept_pairs_follow_current_positions() {
        let mut particles = scattered(2, 2, 5);
        particles[0].position = Vec2::new(50.0, 50.0);
        particles[1].position = Vec2::new(60.0, 50.0);
        let config = ConnectionConfig::default();
        // Three groups, so frames 1 and 2 never search group 0 again.
        let mut graph = ProximityGraph::new(config, 3);
        // Frame 0 searches group 0, which owns the pair (groups 0 and 1).
        assert_eq!(graph.build(&particles, SIZE).len(), 1);

        particles[1].position = Vec2::new(62.0, 51.0);
        let segs = graph.build(&particles, SIZE);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].to, Vec2::new(62.0, 51.0));

        // Drifted out of range: dropped even before rediscovery.
        particles[1].position = Vec2::new(200.0, 200.0);
        assert!(graph.build(&particles, SIZE).is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut graph = ProximityGraph::new(ConnectionConfig::default(), 4);
        assert!(graph.build(&[], SIZE).is_empty());
        let one = scattered(1, 4, 6);
        assert!(graph.build(&one, SIZE).is_empty());
        let many = scattered(100, 4, 6);
        assert!(graph.build(&many, SurfaceSize::default()).len() <= 600);
    }
}
