//! Drawable surfaces.
//!
//! The engine never touches pixels directly. It issues draw calls through the
//! [`Surface`] trait, which a host implements on top of whatever it renders
//! to. [`Canvas`] is the built-in CPU implementation backed by an
//! [`image::RgbaImage`]; the windowed viewer uploads its pixels to the GPU
//! every frame.
//!
//! Fill state is sticky, like a 2D canvas context: callers set the fill once
//! and then issue any number of [`Surface::fill_circle`] calls with it.

use glam::{Vec2, Vec3};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::visuals::BlendMode;

/// Backing-store size of a surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size as a float vector.
    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Center point in pixel coordinates.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.as_vec2() * 0.5
    }
}

/// A drawing target the renderer writes into.
pub trait Surface {
    /// Current backing-store size.
    fn size(&self) -> SurfaceSize;

    /// Reallocate the backing store. Contents are discarded.
    fn resize(&mut self, size: SurfaceSize);

    /// Fill the whole surface with an opaque color.
    fn clear(&mut self, color: Vec3);

    /// Set how subsequent draws combine with existing pixels.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Set the fill used by [`Surface::fill_circle`].
    fn set_fill(&mut self, color: Vec3, alpha: f32);

    /// Fill a circle with the current fill.
    fn fill_circle(&mut self, center: Vec2, radius: f32);

    /// Stroke a straight line segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, alpha: f32);

    /// Draw a radial gradient from `color` at `alpha` in the center to fully
    /// transparent at `radius`.
    fn radial_glow(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32);
}

/// CPU raster surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
    fill_color: Vec3,
    fill_alpha: f32,
    blend_mode: BlendMode,
}

impl Canvas {
    /// Create a canvas of the given size, cleared to transparent black.
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
            fill_color: Vec3::ONE,
            fill_alpha: 1.0,
            blend_mode: BlendMode::Alpha,
        }
    }

    /// Raw RGBA8 pixels, row-major, tightly packed.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// The backing image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Read one pixel. Returns `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.image.width() && y < self.image.height()).then(|| *self.image.get_pixel(x, y))
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Vec3, alpha: f32) {
        if alpha <= 0.0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let a = alpha.min(1.0);
        let mode = self.blend_mode;
        let px = self.image.get_pixel_mut(x, y);
        for (c, src) in color.to_array().into_iter().enumerate() {
            let dst = px.0[c] as f32 / 255.0;
            let out = match mode {
                BlendMode::Alpha => src * a + dst * (1.0 - a),
                BlendMode::Additive => dst + src * a,
            };
            px.0[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        px.0[3] = 255;
    }

    /// Inclusive pixel bounds of the box `min..max`, clamped to the canvas.
    fn bounds(&self, min: Vec2, max: Vec2) -> Option<(i32, i32, i32, i32)> {
        let w = self.image.width() as i32;
        let h = self.image.height() as i32;
        let x0 = (min.x.floor() as i32).max(0);
        let y0 = (min.y.floor() as i32).max(0);
        let x1 = (max.x.ceil() as i32).min(w - 1);
        let y1 = (max.y.ceil() as i32).min(h - 1);
        (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1))
    }
}

impl Surface for Canvas {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.image = RgbaImage::new(size.width, size.height);
    }

    fn clear(&mut self, color: Vec3) {
        let rgb = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        let px = Rgba([rgb.x as u8, rgb.y as u8, rgb.z as u8, 255]);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn set_fill(&mut self, color: Vec3, alpha: f32) {
        self.fill_color = color;
        self.fill_alpha = alpha;
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let reach = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.bounds(center - reach, center + reach) else {
            return;
        };
        let (color, alpha) = (self.fill_color, self.fill_alpha);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                // One-pixel antialiased edge.
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, alpha * coverage);
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Vec3, alpha: f32) {
        let half = width.max(0.0) * 0.5;
        let reach = Vec2::splat(half + 1.0);
        let Some((x0, y0, x1, y1)) = self.bounds(from.min(to) - reach, from.max(to) + reach) else {
            return;
        };
        let seg = to - from;
        let len_sq = seg.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - from).dot(seg) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = (p - (from + seg * t)).length();
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                self.blend_pixel(x, y, color, alpha * coverage);
            }
        }
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, color: Vec3, alpha: f32) {
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let reach = Vec2::splat(radius);
        let Some((x0, y0, x1, y1)) = self.bounds(center - reach, center + reach) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                let falloff = (1.0 - d / radius).max(0.0);
                self.blend_pixel(x, y, color, alpha * falloff * falloff);
            }
        }
    }
}
