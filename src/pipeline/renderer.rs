use crate::core::color::Rgba;
use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::{RasterState, Rasterizer};
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;
use image::RgbaImage;
use rayon::prelude::*;

/// The high-level renderer that orchestrates the pipeline stages.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// Creates a new renderer.
    /// sample_count: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.framebuffer.width, self.framebuffer.height)
    }

    /// Reallocates the framebuffer, keeping the sample count.
    pub fn resize(&mut self, width: usize, height: usize) {
        let samples = self.framebuffer.sample_count;
        self.framebuffer = FrameBuffer::new(width, height, samples);
    }

    pub fn clear(&mut self, color: Rgba) {
        self.framebuffer.clear(color);
    }

    /// Draws a mesh using the provided shader and material.
    pub fn draw_mesh<S: Shader>(
        &mut self,
        mesh: &Mesh,
        shader: &S,
        material: Option<&Material>,
        state: RasterState,
    ) {
        // Vertex stage runs once per vertex; triangles then share the results.
        let processed: Vec<_> = mesh.vertices.par_iter().map(|v| shader.vertex(v)).collect();

        for chunk in mesh.indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                processed.get(chunk[0] as usize),
                processed.get(chunk[1] as usize),
                processed.get(chunk[2] as usize),
            ) else {
                continue;
            };

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[a.0, b.0, c.0],
                &[a.1, b.1, c.1],
                material,
                state,
            );
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        self.framebuffer.to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::shaders::basic::BasicShader;
    use crate::scene::material::BasicMaterial;
    use nalgebra::{Matrix4, Vector3};

    #[test]
    fn draws_sphere_into_center() {
        let mut renderer = Renderer::new(32, 32, 1);
        renderer.clear(Rgba::zeros());
        let sphere = Mesh::create_uv_sphere(0.5, 16, 8);
        let material = Material::Basic(BasicMaterial {
            color: Vector3::new(1.0, 0.0, 0.0),
            ..Default::default()
        });
        let shader = BasicShader::new(Matrix4::identity());
        renderer.draw_mesh(&sphere, &shader, Some(&material), RasterState::default());

        let img = renderer.to_image();
        assert_eq!(img.get_pixel(16, 16).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn resize_keeps_samples() {
        let mut renderer = Renderer::new(4, 4, 2);
        renderer.resize(10, 6);
        assert_eq!(renderer.size(), (10, 6));
        assert_eq!(renderer.framebuffer.sample_count, 2);
    }
}
