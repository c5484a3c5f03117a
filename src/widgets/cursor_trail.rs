use crate::core::canvas::{Glow, Surface2D};
use crate::core::color::Rgba;
use crate::ui::frame_loop::{Animated, FrameTick};
use crate::ui::input::PointerEvent;
use image::RgbaImage;
use nalgebra::{Point2, Vector3};
use std::collections::VecDeque;
use std::time::Duration;

/// Minimum time between two trail particles.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(50);
pub const LIFETIME: Duration = Duration::from_millis(300);

const DOT_RADIUS: f32 = 6.0;
const PARTICLE_RADIUS: f32 = 3.0;

/// Fades linearly from 1 at birth to 0 at [`LIFETIME`].
pub fn particle_opacity(age: Duration) -> f32 {
    (1.0 - age.as_secs_f32() / LIFETIME.as_secs_f32()).max(0.0)
}

#[derive(Debug, Clone, Copy)]
struct TrailParticle {
    position: Point2<f32>,
    born: Duration,
}

/// A glowing dot that follows the pointer and leaves a short fading trail.
pub struct CursorTrail<S: Surface2D> {
    surface: S,
    /// sRGB accent color.
    accent: Vector3<f32>,
    pointer: Option<Point2<f32>>,
    particles: VecDeque<TrailParticle>,
    last_spawn: Option<Duration>,
    now: Duration,
}

impl<S: Surface2D> CursorTrail<S> {
    pub fn new(surface: S, accent: Vector3<f32>) -> Self {
        Self {
            surface,
            accent,
            pointer: None,
            particles: VecDeque::new(),
            last_spawn: None,
            now: Duration::ZERO,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Opacities of the live particles, oldest first.
    pub fn opacities(&self) -> Vec<f32> {
        self.particles
            .iter()
            .map(|p| particle_opacity(self.now.saturating_sub(p.born)))
            .collect()
    }

    fn track(&mut self, position: Point2<f32>) {
        self.pointer = Some(position);
        let due = self
            .last_spawn
            .is_none_or(|last| self.now.saturating_sub(last) > SPAWN_INTERVAL);
        if due {
            self.particles.push_back(TrailParticle {
                position,
                born: self.now,
            });
            self.last_spawn = Some(self.now);
        }
    }

    fn color(&self, alpha: f32) -> Rgba {
        Rgba::new(self.accent.x, self.accent.y, self.accent.z, alpha)
    }

    fn draw(&mut self) {
        self.surface.clear();
        let particles: Vec<_> = self
            .particles
            .iter()
            .map(|p| (p.position, particle_opacity(self.now.saturating_sub(p.born))))
            .collect();
        for (position, opacity) in particles {
            let fill = self.color(opacity * 0.8);
            let glow = Glow {
                color: self.color(opacity * 0.4),
                blur: 4.0 * opacity,
            };
            self.surface
                .fill_circle(position, PARTICLE_RADIUS, fill, Some(glow));
        }
        if let Some(pointer) = self.pointer {
            let fill = self.color(1.0);
            let glow = Glow {
                color: self.color(0.6),
                blur: 10.0,
            };
            self.surface.fill_circle(pointer, DOT_RADIUS, fill, Some(glow));
        }
    }
}

impl<S: Surface2D> Animated for CursorTrail<S> {
    fn name(&self) -> &'static str {
        "cursor-trail"
    }

    fn frame(&mut self, tick: &FrameTick) {
        self.now = tick.elapsed;
        let now = self.now;
        self.particles.retain(|p| now.saturating_sub(p.born) < LIFETIME);
        self.draw();
    }

    fn pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(x, y) | PointerEvent::Move(x, y) => self.track(Point2::new(x, y)),
            PointerEvent::Leave => self.pointer = None,
            PointerEvent::Up => {}
        }
    }

    fn teardown(&mut self) {
        self.particles.clear();
        self.pointer = None;
        self.surface.clear();
    }

    fn image(&self) -> Option<RgbaImage> {
        self.surface.to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canvas::recording::RecordingSurface;

    fn tick(ms: u64) -> FrameTick {
        FrameTick {
            index: 0,
            delta: Duration::from_millis(16),
            elapsed: Duration::from_millis(ms),
        }
    }

    fn trail() -> CursorTrail<RecordingSurface> {
        CursorTrail::new(RecordingSurface::new(100, 100), Vector3::new(0.66, 0.33, 0.97))
    }

    #[test]
    fn opacity_fades_to_zero() {
        assert_eq!(particle_opacity(Duration::ZERO), 1.0);
        assert!((particle_opacity(Duration::from_millis(150)) - 0.5).abs() < 1e-6);
        assert_eq!(particle_opacity(Duration::from_millis(400)), 0.0);
    }

    #[test]
    fn spawning_is_throttled() {
        let mut trail = trail();
        trail.frame(&tick(0));
        trail.pointer(PointerEvent::Move(1.0, 1.0));
        trail.pointer(PointerEvent::Move(2.0, 2.0));
        assert_eq!(trail.particle_count(), 1);

        trail.frame(&tick(50));
        trail.pointer(PointerEvent::Move(3.0, 3.0));
        assert_eq!(trail.particle_count(), 1);

        trail.frame(&tick(51));
        trail.pointer(PointerEvent::Move(4.0, 4.0));
        assert_eq!(trail.particle_count(), 2);
    }

    #[test]
    fn particles_expire_after_their_lifetime() {
        let mut trail = trail();
        trail.frame(&tick(0));
        trail.pointer(PointerEvent::Move(10.0, 10.0));
        trail.frame(&tick(150));
        assert!((trail.opacities()[0] - 0.5).abs() < 1e-6);
        trail.frame(&tick(300));
        assert_eq!(trail.particle_count(), 0);
    }

    #[test]
    fn dot_hides_when_pointer_leaves() {
        let surface = RecordingSurface::new(100, 100);
        let log = surface.log.clone();
        let mut trail = CursorTrail::new(surface, Vector3::repeat(1.0));
        trail.frame(&tick(0));
        trail.pointer(PointerEvent::Move(20.0, 30.0));
        trail.frame(&tick(16));
        // One particle plus the dot.
        assert_eq!(log.borrow().circles.len(), 2);
        assert_eq!(log.borrow().circles[1].1, DOT_RADIUS);

        trail.pointer(PointerEvent::Leave);
        trail.frame(&tick(32));
        assert_eq!(log.borrow().circles.len(), 1);
    }
}
