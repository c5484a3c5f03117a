use nalgebra::{Vector3, Vector4};

/// Straight (non-premultiplied) RGBA color with components in [0, 1].
pub type Rgba = Vector4<f32>;

/// Decodes a `0xRRGGBB` literal into sRGB components in [0, 1].
pub fn hex_srgb(hex: u32) -> Vector3<f32> {
    Vector3::new(
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    )
}

/// Decodes a `0xRRGGBB` literal into linear RGB, ready for lighting math.
pub fn hex_linear(hex: u32) -> Vector3<f32> {
    srgb_to_linear(hex_srgb(hex))
}

/// Opaque sRGB color for 2D canvas drawing (canvas compositing happens in sRGB).
pub fn hex_rgba(hex: u32, alpha: f32) -> Rgba {
    let c = hex_srgb(hex);
    Rgba::new(c.x, c.y, c.z, alpha)
}

/// Converts an HSL triple (hue in degrees, saturation/lightness in [0, 1]) to sRGB.
pub fn hsl_to_srgb(hue_deg: f32, saturation: f32, lightness: f32) -> Vector3<f32> {
    let h = hue_deg.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    Vector3::new(r + m, g + m, b + m)
}

/// Converts sRGB to linear RGB (gamma 2.2 approximation).
pub fn srgb_to_linear(color: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(color.x.powf(2.2), color.y.powf(2.2), color.z.powf(2.2))
}

/// Converts linear RGB to sRGB (Gamma Correction).
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    let gamma = 1.0 / 2.2;
    Vector3::new(
        color.x.max(0.0).powf(gamma),
        color.y.max(0.0).powf(gamma),
        color.z.max(0.0).powf(gamma),
    )
}

/// Quantizes a straight-alpha color to 8-bit RGBA.
#[inline]
pub fn to_rgba8(color: Rgba) -> [u8; 4] {
    [
        (color.x.clamp(0.0, 1.0) * 255.0).round() as u8,
        (color.y.clamp(0.0, 1.0) * 255.0).round() as u8,
        (color.z.clamp(0.0, 1.0) * 255.0).round() as u8,
        (color.w.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]
}
