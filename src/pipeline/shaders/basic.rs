use crate::core::color::Rgba;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::scene::material::{BasicMaterial, Material};
use nalgebra::{Matrix4, Vector2, Vector4};

/// Unlit shader: the material's color or texture, untouched by lights.
pub struct BasicShader {
    /// Model-View-Projection matrix.
    pub mvp_matrix: Matrix4<f32>,
    pub fallback_material: BasicMaterial,
}

impl BasicShader {
    pub fn new(mvp_matrix: Matrix4<f32>) -> Self {
        Self {
            mvp_matrix,
            fallback_material: BasicMaterial::default(),
        }
    }
}

impl Shader for BasicShader {
    type Varying = Vector2<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        (self.mvp_matrix * vertex.position.to_homogeneous(), vertex.texcoord)
    }

    fn fragment(&self, uv: Self::Varying, material: Option<&Material>) -> Rgba {
        let mat = match material {
            Some(Material::Basic(m)) => m,
            _ => &self.fallback_material,
        };
        let (color, alpha) = match &mat.texture {
            Some(texture) => {
                let t = texture.sample(uv.x, uv.y);
                (t.xyz().component_mul(&mat.color), t.w)
            }
            None => (mat.color, 1.0),
        };
        Rgba::new(color.x, color.y, color.z, alpha * mat.surface.opacity)
    }
}
