use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights `(alpha, beta, gamma)` of `p` relative to triangle `(v1, v2, v3)`.
///
/// Returns `None` for degenerate (zero-area) triangles.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let rel = p - v1;

    let twice_area = e1.x * e2.y - e1.y * e2.x;
    if twice_area.abs() < EPSILON {
        return None;
    }
    let inv = 1.0 / twice_area;

    let beta = (rel.x * e2.y - rel.y * e2.x) * inv;
    let gamma = (e1.x * rel.y - e1.y * rel.x) * inv;

    Some(Vector3::new(1.0 - beta - gamma, beta, gamma))
}

/// True when all three weights are non-negative (within tolerance).
#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Perspective-correct barycentrics: each weight divided by its vertex `w`, renormalized.
///
/// Returns `None` when the weighted sum collapses toward zero.
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };
    let weighted = Vector3::new(bary.x * inv(w1), bary.y * inv(w2), bary.z * inv(w3));

    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_get_unit_weights() {
        let (a, b, c) = (
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        );
        let w = barycentric_coordinates(b, a, b, c).unwrap();
        assert!((w - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        let mid = barycentric_coordinates(Point2::new(1.0, 1.0), a, b, c).unwrap();
        assert!(is_inside_triangle(mid));
        let outside = barycentric_coordinates(Point2::new(5.0, 5.0), a, b, c).unwrap();
        assert!(!is_inside_triangle(outside));
    }

    #[test]
    fn degenerate_triangle_is_rejected() {
        let p = Point2::new(1.0, 1.0);
        assert!(barycentric_coordinates(p, p, p, Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn equal_depths_leave_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct_barycentric(bary, 2.0, 2.0, 2.0).unwrap();
        assert!((corrected - bary).norm() < 1e-6);
    }
}
