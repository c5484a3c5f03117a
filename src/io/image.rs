use image::RgbaImage;
use log::{error, info};
use std::path::Path;

/// Writes an image to disk, format chosen by extension.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<(), String> {
    img.save(path).map_err(|e| {
        error!("Failed to save image to '{}': {}", path.display(), e);
        format!("Failed to save image to '{}': {}", path.display(), e)
    })?;
    info!("Saved {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}

/// Lays images out left to right over an opaque sRGB background.
///
/// Images are composited source-over with straight alpha and vertically centered.
pub fn contact_sheet(images: &[RgbaImage], background: [f32; 3], gap: u32) -> RgbaImage {
    let width = images.iter().map(|i| i.width()).sum::<u32>()
        + gap * (images.len().saturating_sub(1) as u32);
    let height = images.iter().map(|i| i.height()).max().unwrap_or(0);

    let bg = background.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    let mut sheet = RgbaImage::from_pixel(width, height, image::Rgba([bg[0], bg[1], bg[2], 255]));

    let mut x0 = 0;
    for img in images {
        let y0 = (height - img.height()) / 2;
        for (x, y, src) in img.enumerate_pixels() {
            let dst = sheet.get_pixel_mut(x0 + x, y0 + y);
            let a = src.0[3] as f32 / 255.0;
            for c in 0..3 {
                let blended = src.0[c] as f32 * a + dst.0[c] as f32 * (1.0 - a);
                dst.0[c] = blended.round() as u8;
            }
        }
        x0 += img.width() + gap;
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_places_images_side_by_side() {
        let red = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let clear = RgbaImage::from_pixel(3, 4, image::Rgba([0, 255, 0, 0]));
        let sheet = contact_sheet(&[red, clear], [0.0, 0.0, 1.0], 1);
        assert_eq!(sheet.dimensions(), (6, 4));
        assert_eq!(sheet.get_pixel(0, 1).0, [255, 0, 0, 255]);
        // Above the shorter image and inside the gap: background.
        assert_eq!(sheet.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(sheet.get_pixel(2, 1).0, [0, 0, 255, 255]);
        // Fully transparent pixels leave the background alone.
        assert_eq!(sheet.get_pixel(4, 2).0, [0, 0, 255, 255]);
    }

    #[test]
    fn saves_png() {
        let path = std::env::temp_dir().join(format!("folio_save_{}.png", std::process::id()));
        let img = RgbaImage::from_pixel(3, 3, image::Rgba([1, 2, 3, 4]));
        save_image(&img, &path).unwrap();
        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.get_pixel(1, 1).0, [1, 2, 3, 4]);
        let _ = std::fs::remove_file(path);
        assert!(save_image(&img, Path::new("/definitely/not/here/x.png")).is_err());
    }
}
