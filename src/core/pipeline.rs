use crate::core::color::Rgba;
use crate::core::geometry::Vertex;
use crate::scene::material::Material;
use nalgebra::Vector4;
use std::ops::{Add, Mul};

/// Types that can be linearly interpolated across a triangle's surface.
///
/// `Send + Sync` because fragments are shaded from rayon worker threads.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl<T> Interpolatable for T where
    T: Copy + Clone + Add<Output = T> + Mul<f32, Output = T> + Send + Sync
{
}

/// Shader represents the programmable stages of the pipeline.
pub trait Shader: Send + Sync {
    /// Per-vertex varying data interpolated for each fragment.
    type Varying: Interpolatable;

    /// Transforms a vertex into homogeneous clip space and emits its varying.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Computes the straight-alpha linear RGBA color of a fragment.
    ///
    /// `material` is `None` when the mesh has no material bound; shaders then use
    /// their own fallback parameters.
    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Rgba;
}
