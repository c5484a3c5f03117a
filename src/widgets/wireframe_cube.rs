use crate::core::canvas::{Glow, LinearGradient, StrokeStyle, Surface2D};
use crate::core::color::hex_rgba;
use crate::core::math::projection::{project_pinhole, rotate_y_then_x};
use crate::ui::frame_loop::{Animated, FrameTick};
use image::RgbaImage;
use log::debug;
use nalgebra::{Point2, Point3};

pub const SIZE: usize = 200;
pub const HALF_EDGE: f32 = 50.0;
/// Viewer distance. The projection divides by `DISTANCE + z`, which stays positive
/// as long as `HALF_EDGE * sqrt(3) < DISTANCE`.
pub const DISTANCE: f32 = 300.0;
pub const STEP: f32 = 0.02;
/// X rotation runs at this fraction of the Y rotation.
pub const X_RATIO: f32 = 0.7;

const LINE_WIDTH: f32 = 2.0;
const MARKER_RADIUS: f32 = 4.0;
const MARKER_BLUR: f32 = 10.0;
const GRADIENT_START: u32 = 0x8b5cf6;
const ACCENT: u32 = 0xa855f7;

pub const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn cube_vertices() -> [Point3<f32>; 8] {
    let h = HALF_EDGE;
    [
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ]
}

/// Draw calls issued by the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub lines: usize,
    pub markers: usize,
}

/// A continuously tumbling wireframe cube drawn with its own perspective projection.
pub struct WireframeCube<S: Surface2D> {
    surface: S,
    vertices: [Point3<f32>; 8],
    angle: f32,
    center: Point2<f32>,
    stats: FrameStats,
}

impl<S: Surface2D> WireframeCube<S> {
    /// Takes ownership of a drawing surface. Without a usable surface the cube is
    /// simply not mounted.
    pub fn mount(surface: Option<S>) -> Option<Self> {
        let Some(surface) = surface else {
            debug!("Wireframe cube: no drawing surface, skipping");
            return None;
        };
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            debug!("Wireframe cube: zero-sized surface, skipping");
            return None;
        }
        Some(Self {
            surface,
            vertices: cube_vertices(),
            angle: 0.0,
            center: Point2::new(width as f32 / 2.0, height as f32 / 2.0),
            stats: FrameStats::default(),
        })
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Current screen positions of the eight corners.
    pub fn projected(&self) -> [Point2<f32>; 8] {
        self.vertices.map(|v| {
            let rotated = rotate_y_then_x(&v, self.angle, self.angle * X_RATIO);
            project_pinhole(&rotated, DISTANCE, self.center)
        })
    }

    /// Advances the rotation one step and redraws.
    pub fn step(&mut self) -> FrameStats {
        self.angle += STEP;
        let projected = self.projected();

        self.surface.clear();
        let mut stats = FrameStats::default();

        let gradient = LinearGradient {
            start: hex_rgba(GRADIENT_START, 1.0),
            end: hex_rgba(ACCENT, 1.0),
        };
        for &(a, b) in &EDGES {
            let style = StrokeStyle {
                width: LINE_WIDTH,
                gradient,
            };
            self.surface.stroke_line(projected[a], projected[b], &style);
            stats.lines += 1;
        }

        let accent = hex_rgba(ACCENT, 1.0);
        let glow = Glow {
            color: accent,
            blur: MARKER_BLUR,
        };
        for p in projected {
            self.surface.fill_circle(p, MARKER_RADIUS, accent, Some(glow));
            stats.markers += 1;
        }

        self.stats = stats;
        stats
    }
}

impl<S: Surface2D> Animated for WireframeCube<S> {
    fn name(&self) -> &'static str {
        "wireframe-cube"
    }

    fn frame(&mut self, _tick: &FrameTick) {
        self.step();
    }

    fn teardown(&mut self) {
        self.surface.clear();
    }

    fn image(&self) -> Option<RgbaImage> {
        self.surface.to_image()
    }
}
