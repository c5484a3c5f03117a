//! A lit, textured globe with night lights and a cloud shell.
//!
//! Three concentric spheres share the drag-controlled pitch but spin around Y at
//! their own rates, so the clouds slowly drift over the surface.

use crate::core::color::{Rgba, hex_linear};
use crate::core::framebuffer::BlendMode;
use crate::core::math::transform::TransformFactory;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::basic::BasicShader;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::material::{BasicMaterial, Material, PhongMaterial, Side, SurfaceOptions};
use crate::scene::mesh::Mesh;
use crate::scene::texture::{Texture, TextureLoader};
use crate::ui::frame_loop::{Animated, FrameTick};
use crate::ui::input::{DragRotation, PointerEvent, clamp_pitch};
use image::RgbaImage;
use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const SURFACE_SPIN: f32 = 0.005;
pub const CLOUD_SPIN: f32 = 0.006;
pub const DRAG_SENSITIVITY: f32 = 0.01;

const SEGMENTS: u32 = 64;
const CAMERA_DISTANCE: f32 = 2.5;
const FOV_DEG: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Surface,
    NightLights,
    Clouds,
}

impl LayerKind {
    /// Back to front: the opaque surface must be drawn before the blended shells.
    pub const ALL: [LayerKind; 3] = [LayerKind::Surface, LayerKind::NightLights, LayerKind::Clouds];

    pub fn radius(self) -> f32 {
        match self {
            LayerKind::Surface => 1.0,
            LayerKind::NightLights => 1.01,
            LayerKind::Clouds => 1.02,
        }
    }

    /// Auto-rotation around Y per frame, in radians.
    pub fn spin(self) -> f32 {
        match self {
            LayerKind::Surface | LayerKind::NightLights => SURFACE_SPIN,
            LayerKind::Clouds => CLOUD_SPIN,
        }
    }

    pub fn texture_file(self) -> &'static str {
        match self {
            LayerKind::Surface => "images/earthmap_1.jpg",
            LayerKind::NightLights => "images/earth_lights_2.png",
            LayerKind::Clouds => "images/cloud_combined_3.jpg",
        }
    }

    fn material(self) -> Material {
        match self {
            LayerKind::Surface => Material::Phong(PhongMaterial {
                diffuse_color: hex_linear(0x4a90e2),
                shininess: 15.0,
                ..Default::default()
            }),
            LayerKind::NightLights => Material::Basic(BasicMaterial {
                surface: SurfaceOptions {
                    opacity: 0.6,
                    transparent: true,
                    side: Side::Double,
                    blending: BlendMode::Additive,
                },
                ..Default::default()
            }),
            LayerKind::Clouds => Material::Phong(PhongMaterial {
                surface: SurfaceOptions {
                    opacity: 0.4,
                    transparent: true,
                    side: Side::Double,
                    blending: BlendMode::Normal,
                },
                ..Default::default()
            }),
        }
    }
}

struct Layer {
    kind: LayerKind,
    mesh: Mesh,
    material: Material,
    /// (pitch around X, yaw around Y) in radians.
    rotation: (f32, f32),
}

impl Layer {
    fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            mesh: Mesh::create_uv_sphere(kind.radius(), SEGMENTS, SEGMENTS),
            material: kind.material(),
            rotation: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitOptions {
    pub width: usize,
    pub height: usize,
    /// Supersampling factor per axis.
    pub samples: usize,
    /// Directory the `images/...` texture paths are resolved against.
    pub asset_root: PathBuf,
    pub load_textures: bool,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            samples: 1,
            asset_root: PathBuf::from("assets"),
            load_textures: true,
        }
    }
}

/// Everything the globe owns while mounted. Released by [`OrbitBody::dispose`].
struct Resources {
    layers: Vec<Layer>,
    renderer: Renderer,
    loader: TextureLoader<LayerKind>,
}

pub struct OrbitBody {
    resources: Option<Resources>,
    lights: Vec<Light>,
    camera: Camera,
    drag: DragRotation,
}

impl OrbitBody {
    pub fn new(options: &OrbitOptions) -> Self {
        let width = options.width.max(1);
        let height = options.height.max(1);

        let camera = Camera::new_perspective(
            Point3::new(0.0, 0.0, CAMERA_DISTANCE),
            Point3::origin(),
            Vector3::y(),
            FOV_DEG.to_radians(),
            width as f32 / height as f32,
            NEAR,
            FAR,
        );

        let lights = vec![
            Light::new_ambient(hex_linear(0x404040), 0.4),
            Light::directional_from(
                Point3::new(5.0, 3.0, 5.0),
                Point3::origin(),
                Vector3::new(1.0, 1.0, 1.0),
                0.8,
            ),
        ];

        let mut loader = TextureLoader::new();
        if options.load_textures {
            for kind in LayerKind::ALL {
                loader.request(kind, options.asset_root.join(kind.texture_file()));
            }
        }

        debug!("Orbit body created at {}x{}", width, height);
        Self {
            resources: Some(Resources {
                layers: LayerKind::ALL.into_iter().map(Layer::new).collect(),
                renderer: Renderer::new(width, height, options.samples),
                loader,
            }),
            lights,
            camera,
            drag: DragRotation::new(DRAG_SENSITIVITY),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.resources.is_none()
    }

    pub fn size(&self) -> Option<(usize, usize)> {
        self.resources.as_ref().map(|r| r.renderer.size())
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current (pitch, yaw) of a layer.
    pub fn layer_rotation(&self, kind: LayerKind) -> Option<(f32, f32)> {
        self.layer(kind).map(|l| l.rotation)
    }

    pub fn layer_material(&self, kind: LayerKind) -> Option<&Material> {
        self.layer(kind).map(|l| &l.material)
    }

    fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.resources
            .as_ref()
            .and_then(|r| r.layers.iter().find(|l| l.kind == kind))
    }

    /// Textures still being decoded.
    pub fn pending_textures(&self) -> usize {
        self.resources.as_ref().map_or(0, |r| r.loader.in_flight())
    }

    /// Applies finished texture loads without blocking.
    pub fn poll_textures(&mut self) {
        if let Some(res) = self.resources.as_mut() {
            let done = res.loader.poll();
            apply_textures(&mut res.layers, done);
        }
    }

    /// Blocks until outstanding loads finish, for one-shot captures.
    pub fn wait_for_textures(&mut self, timeout: Duration) {
        if let Some(res) = self.resources.as_mut() {
            let done = res.loader.wait(timeout);
            apply_textures(&mut res.layers, done);
        }
    }

    /// Auto-rotation for one frame.
    pub fn advance(&mut self) {
        if let Some(res) = self.resources.as_mut() {
            for layer in &mut res.layers {
                layer.rotation.1 += layer.kind.spin();
            }
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let Some(res) = self.resources.as_mut() else {
            return;
        };
        if let Some(delta) = self.drag.handle(event) {
            for layer in &mut res.layers {
                layer.rotation.1 += delta.yaw;
                layer.rotation.0 = clamp_pitch(layer.rotation.0 + delta.pitch);
            }
        }
    }

    /// Matches the output to its container. Zero-sized containers are ignored.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized resize {}x{}", width, height);
            return;
        }
        let Some(res) = self.resources.as_mut() else {
            return;
        };
        if res.renderer.size() == (width, height) {
            return;
        }
        res.renderer.resize(width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        debug!("Orbit body resized to {}x{}", width, height);
    }

    /// Draws every layer into the framebuffer, untextured ones in their fallback
    /// colors. Returns the number of layers drawn.
    pub fn render(&mut self) -> usize {
        let Some(res) = self.resources.as_mut() else {
            return 0;
        };
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();

        res.renderer.clear(Rgba::zeros());
        let mut drawn = 0;
        for layer in &res.layers {
            let model = TransformFactory::euler_xy(layer.rotation.0, layer.rotation.1);
            let state = layer.material.surface().raster_state();
            match &layer.material {
                Material::Phong(_) => {
                    let shader = PhongShader::new(
                        model,
                        view,
                        projection,
                        self.camera.position,
                        self.lights.clone(),
                    );
                    res.renderer
                        .draw_mesh(&layer.mesh, &shader, Some(&layer.material), state);
                }
                Material::Basic(_) => {
                    let shader = BasicShader::new(projection * view * model);
                    res.renderer
                        .draw_mesh(&layer.mesh, &shader, Some(&layer.material), state);
                }
            }
            drawn += 1;
        }
        drawn
    }

    /// Releases meshes, materials, textures and the framebuffer. Safe to call twice.
    pub fn dispose(&mut self) {
        if let Some(res) = self.resources.take() {
            let pending = res.loader.in_flight();
            drop(res);
            self.drag.handle(PointerEvent::Leave);
            info!("Orbit body disposed ({} texture loads abandoned)", pending);
        }
    }
}

fn apply_textures(layers: &mut [Layer], done: Vec<(LayerKind, Result<Texture, String>)>) {
    for (kind, result) in done {
        match result {
            Ok(texture) => {
                if let Some(layer) = layers.iter_mut().find(|l| l.kind == kind) {
                    layer.material.set_map(Arc::new(texture));
                    info!(
                        "{:?} texture applied, material refreshed (v{})",
                        kind,
                        layer.material.version()
                    );
                }
            }
            Err(e) => warn!("{:?} texture unavailable, keeping fallback: {}", kind, e),
        }
    }
}

impl Drop for OrbitBody {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Animated for OrbitBody {
    fn name(&self) -> &'static str {
        "orbit-body"
    }

    fn frame(&mut self, _tick: &FrameTick) {
        if self.is_disposed() {
            return;
        }
        self.poll_textures();
        self.advance();
        self.render();
    }

    fn pointer(&mut self, event: PointerEvent) {
        self.handle_pointer(event);
    }

    fn resize(&mut self, width: usize, height: usize) {
        OrbitBody::resize(self, width, height);
    }

    fn teardown(&mut self) {
        self.dispose();
    }

    fn image(&self) -> Option<RgbaImage> {
        self.resources.as_ref().map(|r| r.renderer.to_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::frame_loop::FrameLoop;
    use std::f32::consts::FRAC_PI_2;

    fn small() -> OrbitOptions {
        OrbitOptions {
            width: 48,
            height: 48,
            samples: 1,
            asset_root: PathBuf::from("/definitely/not/here"),
            load_textures: false,
        }
    }

    fn yaw(body: &OrbitBody, kind: LayerKind) -> f32 {
        body.layer_rotation(kind).unwrap().1
    }

    #[test]
    fn clouds_outpace_the_surface() {
        let mut body = OrbitBody::new(&small());
        let frames = 120;
        for _ in 0..frames {
            body.advance();
        }
        let diff = yaw(&body, LayerKind::Clouds) - yaw(&body, LayerKind::Surface);
        assert!((diff - frames as f32 * (CLOUD_SPIN - SURFACE_SPIN)).abs() < 1e-4);
        assert_eq!(
            yaw(&body, LayerKind::Surface),
            yaw(&body, LayerKind::NightLights)
        );
    }

    #[test]
    fn drag_pitch_is_clamped_for_every_layer() {
        let mut body = OrbitBody::new(&small());
        body.handle_pointer(PointerEvent::Down(10.0, 10.0));
        for i in 1..=50 {
            body.handle_pointer(PointerEvent::Move(10.0, 10.0 + 100.0 * i as f32));
        }
        for kind in LayerKind::ALL {
            assert_eq!(body.layer_rotation(kind).unwrap().0, FRAC_PI_2);
        }
        body.handle_pointer(PointerEvent::Move(10.0, -100_000.0));
        for kind in LayerKind::ALL {
            assert_eq!(body.layer_rotation(kind).unwrap().0, -FRAC_PI_2);
        }
    }

    #[test]
    fn drag_applies_horizontal_motion_to_yaw() {
        let mut body = OrbitBody::new(&small());
        body.handle_pointer(PointerEvent::Move(50.0, 0.0));
        assert_eq!(yaw(&body, LayerKind::Surface), 0.0);

        body.handle_pointer(PointerEvent::Down(0.0, 0.0));
        body.handle_pointer(PointerEvent::Move(30.0, 0.0));
        body.handle_pointer(PointerEvent::Up);
        body.handle_pointer(PointerEvent::Move(90.0, 0.0));
        assert!((yaw(&body, LayerKind::Clouds) - 0.3).abs() < 1e-6);

        // Auto rotation resumes from the dragged orientation.
        body.advance();
        assert!((yaw(&body, LayerKind::Surface) - (0.3 + SURFACE_SPIN)).abs() < 1e-6);
    }

    #[test]
    fn zero_sized_resize_is_skipped() {
        let mut body = OrbitBody::new(&small());
        let aspect = body.camera().aspect_ratio();
        body.resize(0, 300);
        body.resize(300, 0);
        assert_eq!(body.size(), Some((48, 48)));
        assert_eq!(body.camera().aspect_ratio(), aspect);

        body.resize(64, 32);
        assert_eq!(body.size(), Some((64, 32)));
        assert!((body.camera().aspect_ratio() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn renders_fallback_globe_when_textures_are_missing() {
        let mut body = OrbitBody::new(&OrbitOptions {
            load_textures: true,
            ..small()
        });
        body.wait_for_textures(Duration::from_secs(10));
        assert_eq!(body.pending_textures(), 0);
        for kind in LayerKind::ALL {
            assert!(body.layer_material(kind).unwrap().map().is_none());
        }

        assert_eq!(body.render(), 3);
        let img = body.image().unwrap();
        assert_eq!(img.get_pixel(24, 24).0[3], 255);
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn untextured_night_lights_shell_is_drawn() {
        let mut body = OrbitBody::new(&small());
        assert!(body.layer_material(LayerKind::NightLights).unwrap().map().is_none());
        assert_eq!(body.render(), LayerKind::ALL.len());
        let with_lights = body.image().unwrap().get_pixel(24, 24).0;

        // The same globe without its additive shell is darker at the center.
        let mut bare = OrbitBody::new(&small());
        if let Some(res) = bare.resources.as_mut() {
            res.layers.retain(|l| l.kind != LayerKind::NightLights);
        }
        assert_eq!(bare.render(), 2);
        let without = bare.image().unwrap().get_pixel(24, 24).0;
        let brightness = |p: [u8; 4]| p[..3].iter().map(|&c| c as u32).sum::<u32>();
        assert!(brightness(with_lights) > brightness(without));
    }

    #[test]
    fn disposed_globe_draws_nothing() {
        let mut body = OrbitBody::new(&small());
        body.dispose();
        assert_eq!(body.render(), 0);
    }

    #[test]
    fn arriving_textures_are_bound_to_their_layers() {
        let root = std::env::temp_dir().join(format!("folio_orbit_{}", std::process::id()));
        std::fs::create_dir_all(root.join("images")).unwrap();
        let pixel = image::RgbImage::from_pixel(4, 2, image::Rgb([200, 150, 100]));
        for kind in LayerKind::ALL {
            pixel.save(root.join(kind.texture_file())).unwrap();
        }

        let mut body = OrbitBody::new(&OrbitOptions {
            asset_root: root.clone(),
            load_textures: true,
            ..small()
        });
        body.wait_for_textures(Duration::from_secs(10));
        for kind in LayerKind::ALL {
            let material = body.layer_material(kind).unwrap();
            assert!(material.map().is_some());
            assert_eq!(material.version(), 1);
        }

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut body = OrbitBody::new(&small());
        body.dispose();
        body.dispose();
        assert!(body.is_disposed());
        assert!(body.image().is_none());
        assert!(body.layer_rotation(LayerKind::Surface).is_none());
        body.advance();
        body.resize(10, 10);
        body.handle_pointer(PointerEvent::Down(0.0, 0.0));
        assert!(body.size().is_none());
    }

    #[test]
    fn unmount_releases_the_globe() {
        let mut frames = FrameLoop::new();
        let id = frames.mount(Box::new(OrbitBody::new(&small())));
        frames.tick();
        assert!(frames.image(id).is_some());
        frames.unmount(id);
        assert_eq!(frames.pending(), 0);
        assert!(frames.image(id).is_none());
    }
}
