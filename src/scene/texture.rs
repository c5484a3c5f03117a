use crate::core::color::Rgba;
use image::{DynamicImage, GenericImageView};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

/// Represents a 2D texture map.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Failed to load texture {:?}: {}", path_ref, e))?;
        let texture = Self::from_image(img);
        info!(
            "Loaded texture: {:?} ({}x{})",
            path_ref, texture.width, texture.height
        );
        Ok(texture)
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image: Arc::new(image),
        }
    }

    /// Samples the texture using bilinear interpolation with repeat wrapping.
    ///
    /// `v = 1` is the top row of the image. The result is linear RGB with the
    /// image's straight alpha.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return Rgba::zeros();
        }
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Pixel centers sit at +0.5.
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.get_pixel_wrapped(x0, y0);
        let c10 = self.get_pixel_wrapped(x0 + 1, y0);
        let c01 = self.get_pixel_wrapped(x0, y0 + 1);
        let c11 = self.get_pixel_wrapped(x0 + 1, y0 + 1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        let c = top * (1.0 - wy) + bottom * wy;

        // Image data is sRGB; lighting happens in linear space.
        Rgba::new(c.x.powf(2.2), c.y.powf(2.2), c.z.powf(2.2), c.w)
    }

    fn get_pixel_wrapped(&self, x: i32, y: i32) -> Rgba {
        let x = x.rem_euclid(self.width as i32) as u32;
        let y = y.rem_euclid(self.height as i32) as u32;
        let p = self.image.get_pixel(x, y);
        Rgba::new(
            p[0] as f32 / 255.0,
            p[1] as f32 / 255.0,
            p[2] as f32 / 255.0,
            p[3] as f32 / 255.0,
        )
    }
}

/// Decodes textures on the rayon pool and hands them back over a channel.
///
/// Results are tagged with a caller-chosen key. Dropping the loader drops the
/// receiver, so loads still in flight complete into nothing.
pub struct TextureLoader<K> {
    sender: Sender<(K, Result<Texture, String>)>,
    receiver: Receiver<(K, Result<Texture, String>)>,
    in_flight: usize,
}

impl<K: Send + 'static> Default for TextureLoader<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Send + 'static> TextureLoader<K> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn request(&mut self, key: K, path: PathBuf) {
        debug!("Requesting texture {:?}", path);
        let sender = self.sender.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = Texture::load(&path);
            // The receiver is gone once the owner has been torn down.
            let _ = sender.send((key, result));
        });
    }

    /// Non-blocking drain of every load finished since the last call.
    pub fn poll(&mut self) -> Vec<(K, Result<Texture, String>)> {
        let mut done = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(item) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    done.push(item);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        done
    }

    /// Blocks until every requested load has finished or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Vec<(K, Result<Texture, String>)> {
        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(item) => {
                    self.in_flight -= 1;
                    done.push(item);
                }
                Err(_) => break,
            }
        }
        done
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
