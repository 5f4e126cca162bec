//! Visual configuration for swarm rendering.
//!
//! This module controls how particles and connection lines look, separate
//! from the motion settings in [`PoolConfig`](crate::pool::PoolConfig).
//!
//! # Usage
//!
//! ```ignore
//! let config = EngineConfig::default().with_visuals(|v| {
//!     v.palette(Palette::Neon);
//!     v.glow(5.0, 0.4);
//! });
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pre-defined color schemes for the swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// Cold whites and blues on near-black, with amber accents (default).
    #[default]
    Ice,

    /// Vibrant cyberpunk colors (pink, cyan, purple).
    Neon,

    /// Warm oranges and pinks.
    Sunset,

    /// Cool blues and teals.
    Ocean,

    /// Black through red, orange, yellow.
    Fire,
}

/// Concrete colors a palette resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScheme {
    pub background: Vec3,
    pub particle: Vec3,
    pub accent: Vec3,
    /// Line colors by tier: plain, mixed, accent.
    pub lines: [Vec3; 3],
}

impl Palette {
    /// Resolve this palette to concrete colors.
    pub fn scheme(&self) -> ColorScheme {
        match self {
            Palette::Ice => ColorScheme {
                background: Vec3::new(0.02, 0.02, 0.05), // Dark blue-black
                particle: Vec3::new(0.85, 0.92, 1.0),
                accent: Vec3::new(1.0, 0.62, 0.25),
                lines: [
                    Vec3::new(0.45, 0.6, 1.0),
                    Vec3::new(0.75, 0.62, 0.75),
                    Vec3::new(1.0, 0.62, 0.3),
                ],
            },
            Palette::Neon => ColorScheme {
                background: Vec3::new(0.03, 0.0, 0.06),
                particle: Vec3::new(0.0, 1.0, 1.0),   // Cyan
                accent: Vec3::new(1.0, 0.0, 0.5),     // Pink
                lines: [
                    Vec3::new(0.0, 0.5, 1.0),         // Blue
                    Vec3::new(0.5, 0.0, 1.0),         // Purple
                    Vec3::new(1.0, 0.0, 0.5),
                ],
            },
            Palette::Sunset => ColorScheme {
                background: Vec3::new(0.06, 0.0, 0.08),
                particle: Vec3::new(1.0, 0.9, 0.4),   // Yellow
                accent: Vec3::new(1.0, 0.2, 0.4),     // Pink
                lines: [
                    Vec3::new(1.0, 0.5, 0.2),         // Orange
                    Vec3::new(0.8, 0.3, 0.5),
                    Vec3::new(1.0, 0.2, 0.4),
                ],
            },
            Palette::Ocean => ColorScheme {
                background: Vec3::new(0.0, 0.02, 0.06),
                particle: Vec3::new(0.6, 0.9, 1.0),   // Cyan
                accent: Vec3::new(0.3, 1.0, 0.7),
                lines: [
                    Vec3::new(0.2, 0.6, 0.8),         // Light blue
                    Vec3::new(0.25, 0.8, 0.75),
                    Vec3::new(0.3, 1.0, 0.7),
                ],
            },
            Palette::Fire => ColorScheme {
                background: Vec3::new(0.04, 0.0, 0.0),
                particle: Vec3::new(1.0, 0.7, 0.0),   // Yellow-orange
                accent: Vec3::new(1.0, 1.0, 0.8),     // White-yellow
                lines: [
                    Vec3::new(0.5, 0.0, 0.0),         // Red
                    Vec3::new(1.0, 0.3, 0.0),         // Orange
                    Vec3::new(1.0, 0.85, 0.5),
                ],
            },
        }
    }
}

/// How overlapping draws combine on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Additive blending. Overlapping glows become brighter.
    Additive,
}

/// Configuration for swarm visuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Background clear color (RGB, 0.0-1.0).
    pub background_color: Vec3,
    /// Fill color for regular particles.
    pub particle_color: Vec3,
    /// Opacity of regular particles.
    pub particle_alpha: f32,
    /// Fill color for accent particles and their glow.
    pub accent_color: Vec3,
    /// Glow radius as a multiple of the accent particle's radius.
    pub glow_scale: f32,
    /// Opacity at the center of an accent glow.
    pub glow_alpha: f32,
    /// Blend mode used for accent glows.
    pub glow_blend: BlendMode,
    /// Connection line colors by tier: plain, mixed, accent.
    pub line_colors: [Vec3; 3],
    /// Connection line width in pixels.
    pub line_width: f32,
    /// How much the per-particle pulse swells the radius (0 = no pulse).
    pub pulse_amount: f32,
}

impl Default for VisualConfig {
    fn default() -> Self {
        let scheme = Palette::default().scheme();
        Self {
            background_color: scheme.background,
            particle_color: scheme.particle,
            particle_alpha: 0.9,
            accent_color: scheme.accent,
            glow_scale: 4.0,
            glow_alpha: 0.35,
            glow_blend: BlendMode::Additive,
            line_colors: scheme.lines,
            line_width: 0.8,
            pulse_amount: 0.25,
        }
    }
}

impl VisualConfig {
    /// Create a new visual config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a palette's colors.
    ///
    /// # Example
    ///
    /// ```ignore
    /// .with_visuals(|v| {
    ///     v.palette(Palette::Sunset);
    /// })
    /// ```
    pub fn palette(&mut self, palette: Palette) -> &mut Self {
        let scheme = palette.scheme();
        self.background_color = scheme.background;
        self.particle_color = scheme.particle;
        self.accent_color = scheme.accent;
        self.line_colors = scheme.lines;
        self
    }

    /// Configure the accent glow.
    ///
    /// * `scale` - Glow radius relative to the particle radius
    /// * `alpha` - Opacity at the glow center
    pub fn glow(&mut self, scale: f32, alpha: f32) -> &mut Self {
        self.glow_scale = scale.max(1.0);
        self.glow_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Set the connection line width.
    pub fn line_width(&mut self, width: f32) -> &mut Self {
        self.line_width = width.max(0.0);
        self
    }

    /// Set the pulse amount (0 disables pulsing).
    pub fn pulse(&mut self, amount: f32) -> &mut Self {
        self.pulse_amount = amount.max(0.0);
        self
    }
}
