use crate::core::canvas::Canvas;
use crate::io::cli::WidgetSelection;
use crate::io::config::Config;
use crate::io::image::{contact_sheet, save_image};
use crate::ui::frame_loop::{FrameLoop, MountId};
use crate::ui::input::{PointerEvent, PressTracker};
use crate::widgets::cursor_trail::CursorTrail;
use crate::widgets::floating_field::FloatingField;
use crate::widgets::orbit_body::{OrbitBody, OrbitOptions};
use crate::widgets::wireframe_cube::{self, WireframeCube};
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;
use log::{debug, error, info, warn};
use nalgebra::Vector3;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SHEET_GAP: u32 = 24;

/// The mounted decorations and the loop that drives them.
pub struct Stage {
    pub frames: FrameLoop,
    pub cube: Option<MountId>,
    pub globe: Option<MountId>,
    pub field: Option<MountId>,
    pub trail: Option<MountId>,
}

impl Stage {
    /// Mounts the selected widgets. Non-interactive stages block on texture loads
    /// so the first capture already shows them.
    pub fn build(config: &Config, selection: WidgetSelection, interactive: bool) -> Self {
        let mut frames = FrameLoop::new();
        let accent = Vector3::from(config.effects.accent);
        let backdrop = (
            config.window.width.max(1.0) as usize,
            config.window.height.max(1.0) as usize,
        );

        let field = (config.effects.floating_field && selection == WidgetSelection::All)
            .then(|| Canvas::new(backdrop.0, backdrop.1))
            .flatten()
            .map(|canvas| {
                frames.mount(Box::new(FloatingField::new(
                    canvas,
                    accent,
                    config.effects.seed,
                )))
            });

        let cube = if selection.includes_cube() {
            let surface = Canvas::new(wireframe_cube::SIZE, wireframe_cube::SIZE);
            WireframeCube::mount(surface).map(|cube| frames.mount(Box::new(cube)))
        } else {
            None
        };

        let globe = selection.includes_globe().then(|| {
            let mut body = OrbitBody::new(&OrbitOptions {
                width: config.orbit.width,
                height: config.orbit.height,
                samples: config.render.samples,
                asset_root: PathBuf::from(&config.orbit.asset_root),
                load_textures: config.orbit.load_textures,
            });
            if !interactive {
                body.wait_for_textures(Duration::from_secs_f32(
                    config.orbit.texture_timeout.max(0.0),
                ));
            }
            frames.mount(Box::new(body))
        });

        let trail = (interactive && config.effects.cursor_trail)
            .then(|| Canvas::new(backdrop.0, backdrop.1))
            .flatten()
            .map(|canvas| frames.mount(Box::new(CursorTrail::new(canvas, accent))));

        Self {
            frames,
            cube,
            globe,
            field,
            trail,
        }
    }

    /// Foreground panels, left to right.
    pub fn panels(&self) -> Vec<MountId> {
        [self.cube, self.globe].into_iter().flatten().collect()
    }

    /// Current frame of every panel on one opaque sheet.
    pub fn capture(&self, background: [f32; 3]) -> Option<RgbaImage> {
        let images: Vec<_> = self
            .panels()
            .into_iter()
            .filter_map(|id| self.frames.image(id))
            .collect();
        (!images.is_empty()).then(|| contact_sheet(&images, background, SHEET_GAP))
    }
}

/// Simulates `frames` frames and writes each panel plus a combined sheet as PNG.
pub fn run_headless(
    config: &Config,
    selection: WidgetSelection,
    frames: usize,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        format!(
            "Failed to create output directory '{}': {}",
            output_dir.display(),
            e
        )
    })?;

    let mut stage = Stage::build(config, selection, false);
    let start = Instant::now();
    for i in 0..frames {
        stage.frames.tick();
        if (i + 1) % 60 == 0 {
            debug!("Simulated {} / {} frames", i + 1, frames);
        }
    }
    info!("Simulated {} frames in {:?}", frames, start.elapsed());

    let mut written = Vec::new();
    let named: Vec<_> = stage.frames.mounted().collect();
    for (id, name) in named {
        if let Some(img) = stage.frames.image(id) {
            let path = output_dir.join(format!("{}.png", name));
            save_image(&img, &path)?;
            written.push(path);
        }
    }
    if let Some(sheet) = stage.capture(config.render.background) {
        let path = output_dir.join("sheet.png");
        save_image(&sheet, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Opens the window and runs until it is closed.
pub fn run_gui(config: Config, selection: WidgetSelection, output_dir: PathBuf) -> Result<(), String> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    let title = config.window.title.clone();

    info!("Controls: drag the globe to rotate it, S = save capture, Esc = quit");
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(FolioApp::new(config, selection, output_dir)))),
    )
    .map_err(|e| format!("Failed to start GUI: {}", e))
}

struct FolioApp {
    stage: Stage,
    background: [f32; 3],
    output_dir: PathBuf,
    textures: Vec<(MountId, TextureHandle)>,
    globe_press: PressTracker,
    last_frame: Instant,
}

impl FolioApp {
    fn new(config: Config, selection: WidgetSelection, output_dir: PathBuf) -> Self {
        Self {
            stage: Stage::build(&config, selection, true),
            background: config.render.background,
            output_dir,
            textures: Vec::new(),
            globe_press: PressTracker::default(),
            last_frame: Instant::now(),
        }
    }

    /// Uploads the latest frame of a component and returns its texture.
    fn upload(&mut self, ctx: &egui::Context, id: MountId) -> Option<TextureHandle> {
        let img = self.stage.frames.image(id)?;
        let size = [img.width() as usize, img.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, img.as_raw());

        if let Some((_, handle)) = self.textures.iter_mut().find(|(tid, _)| *tid == id) {
            handle.set(color_image, TextureOptions::LINEAR);
            return Some(handle.clone());
        }
        let handle = ctx.load_texture(format!("{:?}", id), color_image, TextureOptions::LINEAR);
        self.textures.push((id, handle.clone()));
        Some(handle)
    }

    fn save_capture(&self) {
        let Some(sheet) = self.stage.capture(self.background) else {
            warn!("Nothing to capture");
            return;
        };
        if let Err(e) = std::fs::create_dir_all(&self.output_dir) {
            error!("Failed to create '{}': {}", self.output_dir.display(), e);
            return;
        }
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("capture_{}.png", stamp));
        // save_image logs failures itself.
        let _ = save_image(&sheet, &path);
    }

    fn route_globe_pointer(&mut self, id: MountId, response: &egui::Response) {
        let pos = response.interact_pointer_pos().map(|pos| {
            let p = pos - response.rect.min;
            (p.x, p.y)
        });
        let event = self.globe_press.route(
            response.is_pointer_button_down_on(),
            response.contains_pointer(),
            pos,
        );
        if let Some(event) = event {
            self.stage.frames.dispatch_pointer(id, event);
        }
    }

    fn route_trail_pointer(&mut self, ctx: &egui::Context, area: Rect) {
        let Some(id) = self.stage.trail else {
            return;
        };
        let Some(img) = self.stage.frames.image(id) else {
            return;
        };
        let event = match ctx.input(|i| i.pointer.hover_pos()) {
            Some(pos) if area.contains(pos) => {
                // Canvas pixels, which may differ from the window size.
                let scale_x = img.width() as f32 / area.width().max(1.0);
                let scale_y = img.height() as f32 / area.height().max(1.0);
                PointerEvent::Move((pos.x - area.min.x) * scale_x, (pos.y - area.min.y) * scale_y)
            }
            _ => PointerEvent::Leave,
        };
        self.stage.frames.dispatch_pointer(id, event);
    }
}

impl eframe::App for FolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            self.save_capture();
        }

        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.stage.frames.tick_with(delta);

        let bg = self.background.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let frame = egui::Frame::NONE.fill(Color32::from_rgb(bg[0], bg[1], bg[2]));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let area = ui.max_rect();
            let full_uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

            if let Some(id) = self.stage.field
                && let Some(texture) = self.upload(ctx, id)
            {
                ui.painter().image(texture.id(), area, full_uv, Color32::WHITE);
            }

            ui.horizontal_centered(|ui| {
                if let Some(id) = self.stage.cube
                    && let Some(texture) = self.upload(ctx, id)
                {
                    ui.add(egui::Image::new(&texture).fit_to_exact_size(texture.size_vec2()));
                }

                if let Some(id) = self.stage.globe {
                    let side = ui.available_width().min(ui.available_height()).floor();
                    self.stage
                        .frames
                        .resize(id, side.max(0.0) as usize, side.max(0.0) as usize);
                    if let Some(texture) = self.upload(ctx, id) {
                        let response = ui.add(
                            egui::Image::new(&texture)
                                .fit_to_exact_size(Vec2::splat(side))
                                .sense(egui::Sense::click_and_drag()),
                        );
                        self.route_globe_pointer(id, &response);
                    }
                }
            });

            self.route_trail_pointer(ctx, area);
            if let Some(id) = self.stage.trail
                && let Some(texture) = self.upload(ctx, id)
            {
                ui.painter().image(texture.id(), area, full_uv, Color32::WHITE);
            }
        });

        ctx.request_repaint();
    }
}
