//! A minimal immediate-mode 2D drawing surface.
//!
//! Compositing happens in sRGB with straight alpha ("source-over"), the way a browser
//! canvas blends, so decorations look the same as their stylesheet colors.

use crate::core::color::{Rgba, to_rgba8};
use crate::core::math::interpolation::lerp;
use image::RgbaImage;
use nalgebra::Point2;

/// Two-stop gradient laid along a stroked segment, from its start to its end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start: Rgba,
    pub end: Rgba,
}

impl LinearGradient {
    #[inline]
    pub fn at(&self, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }
}

/// Stroke with round caps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub gradient: LinearGradient,
}

/// Soft shadow drawn beneath a filled shape (`blur` matches the canvas `shadowBlur`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur: f32,
}

/// The drawing operations a 2D decoration needs from its output device.
pub trait Surface2D {
    fn size(&self) -> (usize, usize);

    /// Resets every pixel to fully transparent.
    fn clear(&mut self);

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, style: &StrokeStyle);

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, fill: Rgba, glow: Option<Glow>);

    /// Disc whose alpha fades linearly from `inner` at the center to zero at `radius`.
    fn fill_radial(&mut self, center: Point2<f32>, radius: f32, inner: Rgba);

    /// Snapshot of the surface, when it is backed by pixels.
    fn to_image(&self) -> Option<RgbaImage> {
        None
    }
}

/// Pixel-backed implementation of [`Surface2D`].
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Acquires a drawing surface. Returns `None` for a zero-sized request.
    pub fn new(width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: vec![Rgba::zeros(); width * height],
        })
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Source-over composite of `color` scaled by `coverage`.
    #[inline]
    fn blend(&mut self, x: usize, y: usize, color: Rgba, coverage: f32) {
        let src_a = (color.w * coverage).clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[y * self.width + x];
        let out_a = src_a + dst.w * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let rgb = (color.xyz() * src_a + dst.xyz() * dst.w * (1.0 - src_a)) / out_a;
        *dst = Rgba::new(rgb.x, rgb.y, rgb.z, out_a);
    }

    /// Clamped pixel range covering `center ± reach`.
    fn bounds(&self, min: Point2<f32>, max: Point2<f32>) -> (usize, usize, usize, usize) {
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.width - 1);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.height - 1);
        (x0, y0, x1, y1)
    }
}

impl Surface2D for Canvas {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::zeros());
    }

    fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, style: &StrokeStyle) {
        let half = style.width * 0.5;
        let reach = half + 1.0;
        let min = Point2::new(from.x.min(to.x) - reach, from.y.min(to.y) - reach);
        let max = Point2::new(from.x.max(to.x) + reach, from.y.max(to.y) + reach);
        let (x0, y0, x1, y1) = self.bounds(min, max);

        let dir = to - from;
        let len_sq = dir.norm_squared();

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 1e-12 {
                    (p - from).dot(&dir) / len_sq
                } else {
                    0.0
                };
                let nearest = from + dir * t.clamp(0.0, 1.0);
                let coverage = (half + 0.5 - (p - nearest).norm()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, style.gradient.at(t), coverage);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Point2<f32>, radius: f32, fill: Rgba, glow: Option<Glow>) {
        // The shadow is painted first, then the shape on top of it.
        if let Some(glow) = glow.filter(|g| g.blur > 0.0) {
            let sigma = glow.blur * 0.5;
            let reach = radius + 3.0 * sigma;
            let (x0, y0, x1, y1) = self.bounds(
                Point2::new(center.x - reach, center.y - reach),
                Point2::new(center.x + reach, center.y + reach),
            );
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let outside = ((p - center).norm() - radius).max(0.0);
                    if outside <= 3.0 * sigma {
                        let falloff = (-(outside * outside) / (2.0 * sigma * sigma)).exp();
                        self.blend(x, y, glow.color, falloff);
                    }
                }
            }
        }

        let reach = radius + 1.0;
        let (x0, y0, x1, y1) = self.bounds(
            Point2::new(center.x - reach, center.y - reach),
            Point2::new(center.x + reach, center.y + reach),
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - (p - center).norm()).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, fill, coverage);
                }
            }
        }
    }

    fn fill_radial(&mut self, center: Point2<f32>, radius: f32, inner: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let (x0, y0, x1, y1) = self.bounds(
            Point2::new(center.x - radius, center.y - radius),
            Point2::new(center.x + radius, center.y + radius),
        );
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = (p - center).norm() / radius;
                if t < 1.0 {
                    self.blend(x, y, inner, lerp(1.0, 0.0, t));
                }
            }
        }
    }

    fn to_image(&self) -> Option<RgbaImage> {
        let mut img = RgbaImage::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgba(to_rgba8(self.pixels[y as usize * self.width + x as usize]));
        }
        Some(img)
    }
}

/// Surface that records draw calls instead of producing pixels.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default, Clone)]
    pub struct DrawLog {
        pub clears: usize,
        pub lines: Vec<(Point2<f32>, Point2<f32>, StrokeStyle)>,
        pub circles: Vec<(Point2<f32>, f32, Option<Glow>)>,
        pub radials: Vec<(Point2<f32>, f32, Rgba)>,
    }

    /// Cloning shares the log, so a test can keep a handle after moving the surface.
    #[derive(Clone)]
    pub struct RecordingSurface {
        pub log: Rc<RefCell<DrawLog>>,
        size: (usize, usize),
    }

    impl RecordingSurface {
        pub fn new(width: usize, height: usize) -> Self {
            Self {
                log: Rc::default(),
                size: (width, height),
            }
        }

        pub fn draw_calls(&self) -> usize {
            let log = self.log.borrow();
            log.lines.len() + log.circles.len() + log.radials.len()
        }
    }

    impl Surface2D for RecordingSurface {
        fn size(&self) -> (usize, usize) {
            self.size
        }

        fn clear(&mut self) {
            let mut log = self.log.borrow_mut();
            log.clears += 1;
            log.lines.clear();
            log.circles.clear();
            log.radials.clear();
        }

        fn stroke_line(&mut self, from: Point2<f32>, to: Point2<f32>, style: &StrokeStyle) {
            self.log.borrow_mut().lines.push((from, to, *style));
        }

        fn fill_circle(&mut self, center: Point2<f32>, radius: f32, _fill: Rgba, glow: Option<Glow>) {
            self.log.borrow_mut().circles.push((center, radius, glow));
        }

        fn fill_radial(&mut self, center: Point2<f32>, radius: f32, inner: Rgba) {
            self.log.borrow_mut().radials.push((center, radius, inner));
        }
    }
}
