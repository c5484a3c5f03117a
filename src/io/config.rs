use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

fn default_title() -> String {
    "folio-render".to_string()
}
fn default_window_width() -> f32 {
    1100.0
}
fn default_window_height() -> f32 {
    640.0
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    /// Supersampling factor per axis for the globe.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// sRGB page background, used when flattening captures.
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Frames simulated before a headless capture.
    #[serde(default = "default_frames")]
    pub frames: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            background: default_background(),
            output_dir: default_output_dir(),
            frames: default_frames(),
        }
    }
}

fn default_samples() -> usize {
    2
}
fn default_background() -> [f32; 3] {
    [0.035, 0.035, 0.07]
}
fn default_output_dir() -> String {
    "captures".to_string()
}
fn default_frames() -> usize {
    120
}

#[derive(Debug, Deserialize)]
pub struct OrbitConfig {
    /// Directory holding `images/earthmap_1.jpg` and friends.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
    #[serde(default = "default_orbit_size")]
    pub width: usize,
    #[serde(default = "default_orbit_size")]
    pub height: usize,
    #[serde(default = "default_true")]
    pub load_textures: bool,
    /// Seconds a headless capture waits for textures before rendering fallbacks.
    #[serde(default = "default_texture_timeout")]
    pub texture_timeout: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            width: default_orbit_size(),
            height: default_orbit_size(),
            load_textures: true,
            texture_timeout: default_texture_timeout(),
        }
    }
}

fn default_asset_root() -> String {
    "assets".to_string()
}
fn default_orbit_size() -> usize {
    400
}
fn default_texture_timeout() -> f32 {
    10.0
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "default_true")]
    pub cursor_trail: bool,
    #[serde(default = "default_true")]
    pub floating_field: bool,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// sRGB accent used by the cursor trail and motes.
    #[serde(default = "default_accent")]
    pub accent: [f32; 3],
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            cursor_trail: true,
            floating_field: true,
            seed: default_seed(),
            accent: default_accent(),
        }
    }
}

fn default_seed() -> u64 {
    0x5eed
}
fn default_accent() -> [f32; 3] {
    // #a855f7
    [0.659, 0.333, 0.969]
}
