//! Frame drawing.
//!
//! The renderer turns pool and graph state into [`Surface`] calls. A frame is
//! drawn in three passes, called by the engine at fixed points in the frame:
//!
//! 1. [`Renderer::clear`] before anything moves
//! 2. [`Renderer::draw_segments`] once the proximity graph is built
//! 3. [`Renderer::draw_particles`] last, so dots sit on top of lines
//!
//! Particles are drawn in two batches. Regular particles share one fill, set
//! once. Accent particles follow with their own fill, also set once, and each
//! draws its glow under its own dot. Blend switches around a glow are skipped
//! when the glow already uses alpha blending.

use crate::connections::Segment;
use crate::particle::Particle;
use crate::surface::Surface;
use crate::visuals::{BlendMode, VisualConfig};

/// Fraction of line alpha kept at transition progress 0.
const LINE_ALPHA_FLOOR: f32 = 0.35;

/// Draws frames onto a [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    visuals: VisualConfig,
}

impl Renderer {
    pub fn new(visuals: VisualConfig) -> Self {
        Self { visuals }
    }

    pub fn visuals(&self) -> &VisualConfig {
        &self.visuals
    }

    /// Wipe the surface to the background color.
    pub fn clear<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear(self.visuals.background_color);
    }

    /// Stroke connection lines. Lines fade while text re-forms.
    pub fn draw_segments<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        segments: &[Segment],
        progress: f32,
    ) {
        surface.set_blend_mode(BlendMode::Alpha);
        let fade = line_fade(progress);
        for seg in segments {
            let color = self.visuals.line_colors[seg.tier.index()];
            surface.stroke_line(seg.from, seg.to, self.visuals.line_width, color, seg.alpha * fade);
        }
    }

    /// Draw particles: regular batch first, then accents with their glows.
    pub fn draw_particles<S: Surface + ?Sized>(&self, surface: &mut S, particles: &[Particle]) {
        let v = &self.visuals;

        surface.set_blend_mode(BlendMode::Alpha);
        surface.set_fill(v.particle_color, v.particle_alpha);
        for p in particles.iter().filter(|p| !p.is_accent) {
            surface.fill_circle(p.position, p.radius(v.pulse_amount));
        }

        if !particles.iter().any(|p| p.is_accent) {
            return;
        }
        let switch_blend = v.glow_blend != BlendMode::Alpha;
        surface.set_fill(v.accent_color, 1.0);
        for p in particles.iter().filter(|p| p.is_accent) {
            let radius = p.radius(v.pulse_amount);
            if switch_blend {
                surface.set_blend_mode(v.glow_blend);
            }
            surface.radial_glow(p.position, radius * v.glow_scale, v.accent_color, v.glow_alpha);
            if switch_blend {
                surface.set_blend_mode(BlendMode::Alpha);
            }
            surface.fill_circle(p.position, radius);
        }
    }
}

/// Line alpha multiplier for a transition progress in `[0, 1]`.
pub fn line_fade(progress: f32) -> f32 {
    LINE_ALPHA_FLOOR + (1.0 - LINE_ALPHA_FLOOR) * progress.clamp(0.0, 1.0)
}
