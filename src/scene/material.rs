use crate::core::color::hex_linear;
use crate::core::framebuffer::BlendMode;
use crate::core::rasterizer::{CullMode, RasterState};
use crate::scene::texture::Texture;
use nalgebra::Vector3;
use std::sync::Arc;

/// Which faces of a mesh are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Compositing parameters shared by every material kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    pub opacity: f32,
    /// Transparent surfaces are drawn after opaque ones and do not write depth.
    pub transparent: bool,
    pub side: Side,
    pub blending: BlendMode,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            blending: BlendMode::Normal,
        }
    }
}

impl SurfaceOptions {
    pub fn raster_state(&self) -> RasterState {
        RasterState {
            cull_mode: match self.side {
                Side::Front => CullMode::Back,
                Side::Double => CullMode::None,
            },
            blend: self.blending,
            depth_write: !self.transparent,
        }
    }
}

/// Defines how an object interacts with light.
#[derive(Debug, Clone)]
pub enum Material {
    Phong(PhongMaterial),
    /// Unlit: color (or texture) straight to the framebuffer.
    Basic(BasicMaterial),
}

impl Default for Material {
    fn default() -> Self {
        Material::Phong(PhongMaterial::default())
    }
}

impl Material {
    pub fn surface(&self) -> &SurfaceOptions {
        match self {
            Material::Phong(m) => &m.surface,
            Material::Basic(m) => &m.surface,
        }
    }

    pub fn map(&self) -> Option<&Arc<Texture>> {
        match self {
            Material::Phong(m) => m.diffuse_texture.as_ref(),
            Material::Basic(m) => m.texture.as_ref(),
        }
    }

    /// Binds a color map and bumps the version so cached state is refreshed.
    pub fn set_map(&mut self, texture: Arc<Texture>) {
        match self {
            Material::Phong(m) => {
                m.diffuse_texture = Some(texture);
                m.version += 1;
            }
            Material::Basic(m) => {
                m.texture = Some(texture);
                m.version += 1;
            }
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Material::Phong(m) => m.version,
            Material::Basic(m) => m.version,
        }
    }
}

/// Parameters for the Phong lighting model. Colors are linear RGB.
#[derive(Debug, Clone)]
pub struct PhongMaterial {
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    pub shininess: f32,
    pub diffuse_texture: Option<Arc<Texture>>,
    pub surface: SurfaceOptions,
    pub version: u32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            specular_color: hex_linear(0x111111),
            shininess: 30.0,
            diffuse_texture: None,
            surface: SurfaceOptions::default(),
            version: 0,
        }
    }
}

/// Parameters for unlit surfaces. Colors are linear RGB.
#[derive(Debug, Clone)]
pub struct BasicMaterial {
    pub color: Vector3<f32>,
    pub texture: Option<Arc<Texture>>,
    pub surface: SurfaceOptions,
    pub version: u32,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Vector3::new(1.0, 1.0, 1.0),
            texture: None,
            surface: SurfaceOptions::default(),
            version: 0,
        }
    }
}
