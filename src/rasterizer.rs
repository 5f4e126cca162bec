//! Text rasterization into sparse point clouds.
//!
//! A phrase is drawn into an off-surface alpha bitmap using the built-in 8×8
//! bitmap font, then walked on a coarse grid. Every grid cell whose alpha
//! clears a threshold becomes one [`Point`] in surface coordinates.
//!
//! Two coordinate spaces are involved: the bitmap, whose origin is its own
//! top-left corner (including padding), and the surface. They are joined only
//! through [`BitmapMapping`].
//!
//! # Example
//!
//! ```ignore
//! let rasterizer = TextRasterizer::new(RasterConfig::default());
//! let points = rasterizer.sample("Hello", SurfaceSize::new(800, 400), &mut rng);
//! ```

use font8x8::{UnicodeFonts, BASIC_FONTS, GREEK_FONTS, LATIN_FONTS};
use glam::Vec2;
use image::{GrayImage, Luma};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::surface::SurfaceSize;

/// Glyph cells per side in the bitmap font.
const GLYPH_CELLS: u32 = 8;

/// Subsample offsets used to estimate edge coverage inside one bitmap pixel.
const SUBSAMPLES: [(f32, f32); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// One sample of a rasterized phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Position in surface pixels.
    pub position: Vec2,
    /// Whether the sample gets accent treatment.
    pub is_accent: bool,
}

/// Rasterizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Upper bound on font size as a fraction of surface width.
    pub max_width_fraction: f32,
    /// Fraction of surface width a long phrase may fill. Font size is capped
    /// at `width * line_fill / char_count`.
    pub line_fill: f32,
    /// Upper bound on font size as a fraction of surface height.
    pub max_height_fraction: f32,
    /// Below this font size nothing is rendered.
    pub min_font_size: f32,
    /// Padding around the measured text box in the bitmap, in pixels.
    pub padding: u32,
    /// Minimum alpha (exclusive) for a bitmap pixel to be sampled.
    pub alpha_threshold: u8,
    /// Sampling step is `font_size / step_divisor`, rounded.
    pub step_divisor: f32,
    /// Smallest sampling step in pixels.
    pub min_step: u32,
    /// Maximum random offset applied to each sample, in pixels.
    pub jitter: f32,
    /// Probability that a sample is marked as accent.
    pub accent_ratio: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_width_fraction: 0.16,
            line_fill: 0.9,
            max_height_fraction: 0.5,
            min_font_size: 4.0,
            padding: 16,
            alpha_threshold: 128,
            step_divisor: 12.0,
            min_step: 3,
            jitter: 1.2,
            accent_ratio: 0.06,
        }
    }
}

/// Affine map from bitmap pixels to surface pixels.
///
/// The bitmap is centered on the surface, so the map is a pure translation:
/// `surface = bitmap + origin`, where `origin` is the surface position of the
/// bitmap's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapMapping {
    pub origin: Vec2,
}

impl BitmapMapping {
    /// Mapping that centers a bitmap of `bitmap` size on a surface of `surface` size.
    pub fn centered(bitmap: Vec2, surface: SurfaceSize) -> Self {
        Self { origin: surface.center() - bitmap * 0.5 }
    }

    /// Convert a bitmap-space point to surface space.
    #[inline]
    pub fn to_surface(&self, bitmap_point: Vec2) -> Vec2 {
        bitmap_point + self.origin
    }
}

/// Renders phrases and samples them into point clouds.
#[derive(Debug, Clone, Default)]
pub struct TextRasterizer {
    config: RasterConfig,
}

impl TextRasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    /// Font size for `text` on a surface of `size`.
    ///
    /// Bounded by a fraction of the width, by the width divided by the
    /// character count (so long phrases shrink), and by a fraction of the height.
    pub fn font_size(&self, text: &str, size: SurfaceSize) -> f32 {
        let len = text.chars().count().max(1) as f32;
        let w = size.width as f32;
        let h = size.height as f32;
        (w * self.config.max_width_fraction)
            .min(w * self.config.line_fill / len)
            .min(h * self.config.max_height_fraction)
    }

    /// Sampling grid step for a font size. Larger fonts sample more coarsely.
    pub fn sample_step(&self, font_size: f32) -> u32 {
        let step = (font_size / self.config.step_divisor.max(f32::EPSILON)).round();
        (step as u32).max(self.config.min_step).max(1)
    }

    /// Draw `text` at `font_size` into an alpha bitmap.
    ///
    /// The bitmap is the measured text box plus padding on every side.
    pub fn render(&self, text: &str, font_size: f32) -> GrayImage {
        let glyphs: Vec<[u8; 8]> = text.chars().map(glyph_for_char).collect();
        let pad = self.config.padding;
        let text_w = (glyphs.len() as f32 * font_size).ceil() as u32;
        let text_h = font_size.ceil() as u32;
        let cell = font_size / GLYPH_CELLS as f32;

        GrayImage::from_fn(text_w + pad * 2, text_h + pad * 2, |x, y| {
            let hits = SUBSAMPLES
                .iter()
                .filter(|(sx, sy)| {
                    let lx = x as f32 + sx - pad as f32;
                    let ly = y as f32 + sy - pad as f32;
                    glyph_covers(&glyphs, lx, ly, cell)
                })
                .count();
            Luma([(hits * 255 / SUBSAMPLES.len()) as u8])
        })
    }

    /// Rasterize `text` and sample it into a point cloud centered on the surface.
    ///
    /// Returns an empty list when the surface is empty, the text is blank, or
    /// the font would be too small to produce any samples.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        text: &str,
        size: SurfaceSize,
        rng: &mut R,
    ) -> Vec<Point> {
        if size.is_empty() || text.trim().is_empty() {
            return Vec::new();
        }
        let font_size = self.font_size(text, size);
        if !(font_size >= self.config.min_font_size) {
            return Vec::new();
        }

        let bitmap = self.render(text, font_size);
        let mapping = BitmapMapping::centered(
            Vec2::new(bitmap.width() as f32, bitmap.height() as f32),
            size,
        );
        let step = self.sample_step(font_size) as usize;
        let jitter = self.config.jitter;
        let accent_ratio = self.config.accent_ratio.clamp(0.0, 1.0);

        let mut points = Vec::new();
        for y in (0..bitmap.height()).step_by(step) {
            for x in (0..bitmap.width()).step_by(step) {
                if bitmap.get_pixel(x, y).0[0] <= self.config.alpha_threshold {
                    continue;
                }
                let mut p = Vec2::new(x as f32, y as f32);
                if jitter > 0.0 {
                    p += Vec2::new(rng.gen_range(-jitter..jitter), rng.gen_range(-jitter..jitter));
                }
                points.push(Point {
                    position: mapping.to_surface(p),
                    is_accent: rng.gen_bool(accent_ratio),
                });
            }
        }
        points
    }
}

/// Whether text-local point (`lx`, `ly`) falls on a set glyph cell.
fn glyph_covers(glyphs: &[[u8; 8]], lx: f32, ly: f32, cell: f32) -> bool {
    if lx < 0.0 || ly < 0.0 || cell <= 0.0 {
        return false;
    }
    let col = (lx / cell) as usize;
    let row = (ly / cell) as usize;
    let cells = GLYPH_CELLS as usize;
    if row >= cells {
        return false;
    }
    match glyphs.get(col / cells) {
        // Bit 0 is the leftmost column.
        Some(rows) => (rows[row] >> (col % cells)) & 1 == 1,
        None => false,
    }
}

fn glyph_for_char(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}
