//! Hand-rolled rotation and pinhole projection for the wireframe cube.
//!
//! No matrix pipeline here: the cube is drawn on a plain 2D surface and only
//! needs a rotate-then-divide per vertex.

use nalgebra::{Point2, Point3};

/// Rotates `p` around the Y axis by `angle_y`, then around the X axis by `angle_x`.
///
/// The order is significant: swapping it changes the tumbling motion.
#[inline]
pub fn rotate_y_then_x(p: &Point3<f32>, angle_y: f32, angle_x: f32) -> Point3<f32> {
    let (sin_y, cos_y) = angle_y.sin_cos();
    let x = p.x * cos_y - p.z * sin_y;
    let z = p.x * sin_y + p.z * cos_y;

    let (sin_x, cos_x) = angle_x.sin_cos();
    let y = p.y * cos_x - z * sin_x;
    let z = p.y * sin_x + z * cos_x;

    Point3::new(x, y, z)
}

/// Pinhole projection: `scale = distance / (distance + z)`.
///
/// Unguarded: callers must keep `z > -distance` or the image inverts.
#[inline]
pub fn project_pinhole(p: &Point3<f32>, distance: f32, center: Point2<f32>) -> Point2<f32> {
    let scale = distance / (distance + p.z);
    Point2::new(center.x + p.x * scale, center.y + p.y * scale)
}
