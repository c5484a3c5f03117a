use crate::core::color::Rgba;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::scene::light::Light;
use crate::scene::material::{Material, PhongMaterial};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Data interpolated across the triangle surface.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// Normal vector in world space.
    pub normal: Vector3<f32>,
    /// Position in world space, for the view vector.
    pub world_pos: Point3<f32>,
    pub uv: Vector2<f32>,
}

// nalgebra's Point3 doesn't add to Point3, so go through the coordinates.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

/// Blinn-Phong shading with ambient and directional lights.
pub struct PhongShader {
    pub model_matrix: Matrix4<f32>,
    mvp_matrix: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,
    pub camera_pos: Point3<f32>,
    pub lights: Vec<Light>,
    /// Used if no Phong material is passed to the fragment stage.
    pub fallback_material: PhongMaterial,
}

impl PhongShader {
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        camera_pos: Point3<f32>,
        lights: Vec<Light>,
    ) -> Self {
        // Model matrices here are pure rotations, so the upper 3x3 is the normal matrix.
        let normal_matrix = model.fixed_view::<3, 3>(0, 0).into_owned();
        Self {
            model_matrix: model,
            mvp_matrix: projection * view * model,
            normal_matrix,
            camera_pos,
            lights,
            fallback_material: PhongMaterial::default(),
        }
    }
}

impl Shader for PhongShader {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world = self.model_matrix * vertex.position.to_homogeneous();
        let varying = PhongVarying {
            normal: (self.normal_matrix * vertex.normal).normalize(),
            world_pos: Point3::new(world.x, world.y, world.z),
            uv: vertex.texcoord,
        };
        (self.mvp_matrix * vertex.position.to_homogeneous(), varying)
    }

    fn fragment(&self, varying: Self::Varying, material: Option<&Material>) -> Rgba {
        let mat = match material {
            Some(Material::Phong(m)) => m,
            _ => &self.fallback_material,
        };

        let (albedo, tex_alpha) = match &mat.diffuse_texture {
            Some(texture) => {
                // The map is tinted by the material color.
                let t = texture.sample(varying.uv.x, varying.uv.y);
                (t.xyz().component_mul(&mat.diffuse_color), t.w)
            }
            None => (mat.diffuse_color, 1.0),
        };

        let normal = varying.normal.normalize();
        let view_dir = (self.camera_pos - varying.world_pos).normalize();

        let mut diffuse = Vector3::zeros();
        let mut specular = Vector3::zeros();
        for light in &self.lights {
            let radiance = light.radiance();
            match light.direction_to_light() {
                None => diffuse += radiance,
                Some(l) => {
                    let n_dot_l = normal.dot(&l).max(0.0);
                    diffuse += radiance * n_dot_l;
                    if n_dot_l > 0.0 {
                        let half = (l + view_dir).normalize();
                        let spec = normal.dot(&half).max(0.0).powf(mat.shininess);
                        specular += radiance * spec;
                    }
                }
            }
        }

        let color = albedo.component_mul(&diffuse) + mat.specular_color.component_mul(&specular);
        Rgba::new(color.x, color.y, color.z, mat.surface.opacity * tex_alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader_with(lights: Vec<Light>) -> PhongShader {
        PhongShader::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Matrix4::identity(),
            Point3::new(0.0, 0.0, 5.0),
            lights,
        )
    }

    fn varying(normal: Vector3<f32>) -> PhongVarying {
        PhongVarying {
            normal,
            world_pos: Point3::from(normal),
            uv: Vector2::zeros(),
        }
    }

    #[test]
    fn lit_side_is_brighter_than_dark_side() {
        let shader = shader_with(vec![
            Light::new_ambient(Vector3::repeat(0.05), 0.4),
            Light::new_directional(Vector3::new(0.0, 0.0, -1.0), Vector3::repeat(1.0), 0.8),
        ]);
        let front = shader.fragment(varying(Vector3::z()), None);
        let back = shader.fragment(varying(-Vector3::z()), None);
        assert!(front.x > back.x);
        // Ambient alone still lights the far side.
        assert!(back.x > 0.0);
    }

    #[test]
    fn opacity_becomes_alpha() {
        let shader = shader_with(vec![Light::new_ambient(Vector3::repeat(1.0), 1.0)]);
        let mut material = PhongMaterial::default();
        material.surface.opacity = 0.4;
        let c = shader.fragment(varying(Vector3::z()), Some(&Material::Phong(material)));
        assert!((c.w - 0.4).abs() < 1e-6);
    }
}
