use crate::core::color::{Rgba, linear_to_srgb, to_rgba8};
use image::RgbaImage;
use std::cell::UnsafeCell;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// How a fragment is combined with the color already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over: `dst = src * a + dst * (1 - a)`.
    #[default]
    Normal,
    /// `dst = dst + src * a`. Used for glowing overlays.
    Additive,
}

/// Represents a 2D buffer containing linear RGBA color and depth information.
/// Thread-safe for parallel rendering using atomic depth and striped locking for color.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    /// Color buffer wrapped in UnsafeCell to allow interior mutability.
    /// Safety is guaranteed by `locks`.
    color_buffer: UnsafeCell<Vec<Rgba>>,

    /// Depth buffer stored as atomic bits of f32.
    depth_buffer: Vec<AtomicU32>,

    /// Striped locks to protect color writes.
    locks: Vec<Mutex<()>>,
}

// Thread safety is managed manually via atomics and striped locks.
unsafe impl Sync for FrameBuffer {}

const LOCK_STRIPES: usize = 1024;

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        let inf_bits = f32::INFINITY.to_bits();
        let depth_buffer = (0..size).map(|_| AtomicU32::new(inf_bits)).collect();
        let locks = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Rgba::zeros(); size]),
            depth_buffer,
            locks,
        }
    }

    /// Resets every sample to `color` and the depth buffer to infinity.
    pub fn clear(&mut self, color: Rgba) {
        self.color_buffer.get_mut().fill(color);
        let inf_bits = f32::INFINITY.to_bits();
        for depth in &mut self.depth_buffer {
            *depth.get_mut() = inf_bits;
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    /// Thread-safe depth test and update.
    /// Returns true if the new depth is closer than the stored value, which is then replaced.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let depth_atomic = &self.depth_buffer[self.index(x, y)];
        let new_bits = new_depth.to_bits();

        let mut current_bits = depth_atomic.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(current_bits) {
                return false;
            }
            match depth_atomic.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated_bits) => current_bits = updated_bits,
            }
        }
    }

    /// Read-only depth test, for fragments that must not occlude later ones.
    #[inline]
    pub fn depth_test(&self, x: usize, y: usize, depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let stored = self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed);
        depth < f32::from_bits(stored)
    }

    /// Thread-safe blend of a straight-alpha fragment into the buffer.
    #[inline]
    pub fn blend_pixel(&self, x: usize, y: usize, color: Rgba, mode: BlendMode) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.index(x, y);
        let _guard = self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // The stripe lock serializes all writers of this sample.
        let buffer = unsafe { &mut *self.color_buffer.get() };
        let dst = buffer[idx];
        let a = color.w.clamp(0.0, 1.0);
        let rgb = color.xyz();

        let out_rgb = match mode {
            BlendMode::Normal => rgb * a + dst.xyz() * (1.0 - a),
            BlendMode::Additive => dst.xyz() + rgb * a,
        };
        let out_a = match mode {
            BlendMode::Normal => a + dst.w * (1.0 - a),
            BlendMode::Additive => (dst.w + a).min(1.0),
        };
        buffer[idx] = Rgba::new(out_rgb.x, out_rgb.y, out_rgb.z, out_a);
    }

    /// Returns the resolved (supersample-averaged) linear color of an output pixel.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }

        // Only called once rendering for the frame has finished.
        let buffer = unsafe { &*self.color_buffer.get() };

        if self.sample_count == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let mut sum = Rgba::zeros();
        let start_x = x * self.sample_count;
        let start_y = y * self.sample_count;
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum += buffer[self.index(start_x + dx, start_y + dy)];
            }
        }
        Some(sum / (self.sample_count * self.sample_count) as f32)
    }

    /// Resolves the buffer into an sRGB image with straight alpha.
    pub fn to_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width as u32, self.height as u32);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            if let Some(linear) = self.get_pixel(x as usize, y as usize) {
                // Additive layers may push channels above 1.0; clamp happens in to_rgba8.
                let srgb = linear_to_srgb(linear.xyz());
                *pixel = image::Rgba(to_rgba8(Rgba::new(srgb.x, srgb.y, srgb.z, linear.w)));
            }
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_test_keeps_nearest() {
        let fb = FrameBuffer::new(4, 4, 1);
        assert!(fb.depth_test_and_update(1, 1, 0.5));
        assert!(!fb.depth_test_and_update(1, 1, 0.7));
        assert!(fb.depth_test_and_update(1, 1, 0.2));
        assert!(!fb.depth_test(1, 1, 0.3));
        assert!(fb.depth_test(1, 1, 0.1));
        assert!(!fb.depth_test_and_update(9, 9, 0.0));
    }

    #[test]
    fn normal_blend_mixes_by_alpha() {
        let mut fb = FrameBuffer::new(1, 1, 1);
        fb.clear(Rgba::new(0.0, 0.0, 1.0, 1.0));
        fb.blend_pixel(0, 0, Rgba::new(1.0, 0.0, 0.0, 0.25), BlendMode::Normal);
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c.x - 0.25).abs() < 1e-6);
        assert!((c.z - 0.75).abs() < 1e-6);
        assert!((c.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn additive_blend_only_adds() {
        let mut fb = FrameBuffer::new(1, 1, 1);
        fb.clear(Rgba::new(0.2, 0.2, 0.2, 1.0));
        fb.blend_pixel(0, 0, Rgba::new(0.0, 0.0, 0.0, 0.6), BlendMode::Additive);
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c.xyz() - nalgebra::Vector3::new(0.2, 0.2, 0.2)).norm() < 1e-6);
        fb.blend_pixel(0, 0, Rgba::new(1.0, 0.5, 0.0, 0.5), BlendMode::Additive);
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c.x - 0.7).abs() < 1e-6);
        assert!((c.y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn supersamples_are_averaged() {
        let fb = FrameBuffer::new(1, 1, 2);
        fb.blend_pixel(0, 0, Rgba::new(1.0, 1.0, 1.0, 1.0), BlendMode::Normal);
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c.x - 0.25).abs() < 1e-6);
        assert!((c.w - 0.25).abs() < 1e-6);
    }

    #[test]
    fn cleared_buffer_is_transparent() {
        let mut fb = FrameBuffer::new(3, 2, 1);
        fb.clear(Rgba::zeros());
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [0, 0, 0, 0]);
    }
}
