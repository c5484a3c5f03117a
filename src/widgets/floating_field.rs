use crate::core::canvas::Surface2D;
use crate::core::color::{Rgba, hsl_to_srgb};
use crate::ui::frame_loop::{Animated, FrameTick};
use image::RgbaImage;
use nalgebra::{Point2, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ORB_COUNT: usize = 5;
pub const PARTICLE_COUNT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic ease-in-out.
    QuadInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// Endless back-and-forth tween from the rest position to `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float {
    pub offset: Vector2<f32>,
    /// Duration of one leg, in seconds.
    pub period: f32,
    pub delay: f32,
    pub ease: Ease,
}

impl Float {
    /// Displacement at `t` seconds.
    pub fn displacement(&self, t: f32) -> Vector2<f32> {
        let local = t - self.delay;
        if local <= 0.0 || self.period <= 0.0 {
            return Vector2::zeros();
        }
        let legs = local / self.period;
        let frac = legs.fract();
        // Odd legs run backwards.
        let progress = if (legs as u64) % 2 == 0 { frac } else { 1.0 - frac };
        self.offset * self.ease.apply(progress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    /// Rest position as a fraction of the surface size.
    pub anchor: Point2<f32>,
    pub diameter: f32,
    pub hue: f32,
    pub motion: Float,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mote {
    pub anchor: Point2<f32>,
    pub radius: f32,
    pub motion: Float,
}

/// Soft background orbs and small motes drifting up and down.
pub struct FloatingField<S: Surface2D> {
    surface: S,
    accent: Vector3<f32>,
    orbs: Vec<Orb>,
    motes: Vec<Mote>,
}

impl<S: Surface2D> FloatingField<S> {
    pub fn new(surface: S, accent: Vector3<f32>, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let orbs = (0..ORB_COUNT)
            .map(|i| Orb {
                anchor: Point2::new(rng.random::<f32>(), rng.random::<f32>()),
                diameter: rng.random_range(60.0..160.0),
                hue: rng.random_range(180.0..270.0),
                motion: Float {
                    offset: Vector2::new(rng.random_range(-10.0..10.0), -30.0),
                    period: rng.random_range(3.0..5.0),
                    delay: i as f32 * 0.5,
                    ease: Ease::QuadInOut,
                },
            })
            .collect();

        let motes = (0..PARTICLE_COUNT)
            .map(|i| Mote {
                anchor: Point2::new(rng.random::<f32>(), rng.random::<f32>()),
                radius: rng.random_range(1.0..2.0),
                motion: Float {
                    offset: Vector2::new(rng.random_range(-15.0..15.0), -50.0),
                    period: rng.random_range(4.0..7.0),
                    delay: i as f32 * 0.3,
                    ease: Ease::Linear,
                },
            })
            .collect();

        Self {
            surface,
            accent,
            orbs,
            motes,
        }
    }

    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    fn place(&self, anchor: Point2<f32>, motion: &Float, t: f32) -> Point2<f32> {
        let (w, h) = self.surface.size();
        Point2::new(anchor.x * w as f32, anchor.y * h as f32) + motion.displacement(t)
    }

    /// Redraws the field at `t` seconds.
    pub fn draw(&mut self, t: f32) {
        let orbs: Vec<_> = self
            .orbs
            .iter()
            .map(|o| {
                let c = hsl_to_srgb(o.hue, 1.0, 0.7);
                // Element opacity 0.2 over a 0.3 gradient center.
                let color = Rgba::new(c.x, c.y, c.z, 0.3 * 0.2);
                (self.place(o.anchor, &o.motion, t), o.diameter / 2.0, color)
            })
            .collect();
        let motes: Vec<_> = self
            .motes
            .iter()
            .map(|m| (self.place(m.anchor, &m.motion, t), m.radius))
            .collect();

        self.surface.clear();
        for (center, radius, color) in orbs {
            self.surface.fill_radial(center, radius, color);
        }
        let mote_color = Rgba::new(self.accent.x, self.accent.y, self.accent.z, 0.3);
        for (center, radius) in motes {
            self.surface.fill_circle(center, radius, mote_color, None);
        }
    }
}

impl<S: Surface2D> Animated for FloatingField<S> {
    fn name(&self) -> &'static str {
        "floating-field"
    }

    fn frame(&mut self, tick: &FrameTick) {
        self.draw(tick.elapsed.as_secs_f32());
    }

    fn teardown(&mut self) {
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

    fn field(seed: u64) -> FloatingField<RecordingSurface> {
        FloatingField::new(RecordingSurface::new(800, 600), Vector3::repeat(1.0), seed)
    }

    #[test]
    fn same_seed_same_field() {
        let a = field(7);
        let b = field(7);
        assert_eq!(a.orbs(), b.orbs());
        assert_eq!(a.motes(), b.motes());
        assert_ne!(a.orbs(), field(8).orbs());
    }

    #[test]
    fn randomness_stays_in_range() {
        let f = field(42);
        assert_eq!(f.orbs().len(), ORB_COUNT);
        assert_eq!(f.motes().len(), PARTICLE_COUNT);
        for (i, orb) in f.orbs().iter().enumerate() {
            assert!((60.0..160.0).contains(&orb.diameter));
            assert!((180.0..270.0).contains(&orb.hue));
            assert!((3.0..5.0).contains(&orb.motion.period));
            assert!(orb.motion.offset.x.abs() <= 10.0);
            assert_eq!(orb.motion.delay, i as f32 * 0.5);
        }
        for mote in f.motes() {
            assert!((4.0..7.0).contains(&mote.motion.period));
            assert_eq!(mote.motion.offset.y, -50.0);
        }
    }

    #[test]
    fn float_goes_out_and_back() {
        let motion = Float {
            offset: Vector2::new(10.0, -30.0),
            period: 2.0,
            delay: 1.0,
            ease: Ease::QuadInOut,
        };
        assert_eq!(motion.displacement(0.5), Vector2::zeros());
        assert!((motion.displacement(2.0) - Vector2::new(5.0, -15.0)).norm() < 1e-5);
        assert!((motion.displacement(2.999) - Vector2::new(10.0, -30.0)).norm() < 0.01);
        assert!((motion.displacement(4.0) - Vector2::new(5.0, -15.0)).norm() < 1e-5);
        assert!(motion.displacement(4.999).norm() < 0.01);
    }

    #[test]
    fn quad_in_out_is_symmetric() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let a = Ease::QuadInOut.apply(t);
            let b = 1.0 - Ease::QuadInOut.apply(1.0 - t);
            assert!((a - b).abs() < 1e-6);
        }
        assert_eq!(Ease::Linear.apply(0.25), 0.25);
    }

    #[test]
    fn each_frame_draws_every_element() {
        let surface = RecordingSurface::new(800, 600);
        let log = surface.log.clone();
        let mut f = FloatingField::new(surface, Vector3::repeat(1.0), 3);
        f.frame(&FrameTick {
            index: 0,
            delta: std::time::Duration::ZERO,
            elapsed: std::time::Duration::from_secs(2),
        });
        let log = log.borrow();
        assert_eq!(log.radials.len(), ORB_COUNT);
        assert_eq!(log.circles.len(), PARTICLE_COUNT);
    }
}
