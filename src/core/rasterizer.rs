use crate::core::framebuffer::{BlendMode, FrameBuffer};
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::Shader;
use crate::scene::material::Material;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub enum CullMode {
    #[default]
    /// Drops triangles facing away from the viewer.
    Back,
    None,
}

/// Per-draw fixed-function state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    pub cull_mode: CullMode,
    pub blend: BlendMode,
    /// Whether passing fragments occlude later ones.
    pub depth_write: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            blend: BlendMode::Normal,
            depth_write: true,
        }
    }
}

/// The Rasterizer is responsible for drawing triangles onto the FrameBuffer.
#[derive(Default)]
pub struct Rasterizer;

type ClipVertex<V> = (Vector4<f32>, V);

// (axis, sign): a vertex is inside when sign * p[axis] <= p.w
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),
    (0, -1.0),
    (1, 1.0),
    (1, -1.0),
    (2, 1.0),
    (2, -1.0),
];

impl Rasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Rasterize a single triangle given clip-space coordinates and corresponding varyings.
    ///
    /// The triangle is clipped against the canonical view volume (Sutherland–Hodgman in
    /// homogeneous clip space), fanned back into triangles, and each one is shaded.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
        state: RasterState,
    ) {
        let mut current: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(16);
        current.extend(clip_coords.iter().copied().zip(varyings.iter().copied()));

        for &(axis, sign) in &CLIP_PLANES {
            if current.is_empty() {
                return;
            }
            clip_polygon_against_plane(&current, &mut scratch, axis, sign);
            std::mem::swap(&mut current, &mut scratch);
        }

        if current.len() < 3 {
            return;
        }

        let v0 = current[0];
        for pair in current[1..].windows(2) {
            let (v1, v2) = (pair[0], pair[1]);
            self.rasterize_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
                material,
                state,
            );
        }
    }

    /// Rasterizes a triangle already inside the frustum: perspective divide, culling,
    /// then a row-parallel pixel loop.
    fn rasterize_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        material: Option<&Material>,
        state: RasterState,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];
        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // Screen Y points down, so counter-clockwise (front-facing) triangles have
        // negative signed area here.
        let edge1 = screen[1] - screen[0];
        let edge2 = screen[2] - screen[1];
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;
        match state.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = bounding_box(&screen);
        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }
        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let Some(bary) = barycentric_coordinates(center, screen[0], screen[1], screen[2])
                else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }
                let Some(corrected) =
                    perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                else {
                    continue;
                };

                // NDC depth is affine in screen space, so it takes the uncorrected weights.
                let z_ndc = bary.x * clip_coords[0].z / w_values[0]
                    + bary.y * clip_coords[1].z / w_values[1]
                    + bary.z * clip_coords[2].z / w_values[2];
                let depth = z_ndc * 0.5 + 0.5;

                let visible = if state.depth_write {
                    framebuffer.depth_test_and_update(x, y, depth)
                } else {
                    framebuffer.depth_test(x, y, depth)
                };
                if !visible {
                    continue;
                }

                let varying = varyings[0] * corrected.x
                    + varyings[1] * corrected.y
                    + varyings[2] * corrected.z;
                let color = shader.fragment(varying, material);
                framebuffer.blend_pixel(x, y, color, state.blend);
            }
        });
    }
}

/// Clips a polygon against one plane, writing into `output` (cleared first).
fn clip_polygon_against_plane<V: Copy + std::ops::Add<Output = V> + std::ops::Mul<f32, Output = V>>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    axis: usize,
    sign: f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;
    let mut prev = last;
    let mut prev_inside = is_inside(&prev.0);

    for &curr in input {
        let curr_inside = is_inside(&curr.0);
        if curr_inside != prev_inside {
            if let Some(hit) = intersect_edge_plane(prev, curr, axis, sign) {
                output.push(hit);
            }
        }
        if curr_inside {
            output.push(curr);
        }
        prev = curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of segment `a → b` with the plane `sign * p[axis] = p.w`.
#[inline(always)]
fn intersect_edge_plane<V: Copy + std::ops::Add<Output = V> + std::ops::Mul<f32, Output = V>>(
    a: ClipVertex<V>,
    b: ClipVertex<V>,
    axis: usize,
    sign: f32,
) -> Option<ClipVertex<V>> {
    let denom = sign * (b.0[axis] - a.0[axis]) - (b.0.w - a.0.w);
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = (a.0.w - sign * a.0[axis]) / denom;
    if !t.is_finite() {
        return None;
    }
    Some((a.0 + (b.0 - a.0) * t, a.1 * (1.0 - t) + b.1 * t))
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}
