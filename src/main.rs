use clap::Parser;
use folio_render::app::{run_gui, run_headless};
use folio_render::io::cli::Cli;
use folio_render::io::config::Config;
use log::{error, info};
use std::path::PathBuf;

fn main() -> Result<(), String> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("eframe", log::LevelFilter::Warn)
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("winit", log::LevelFilter::Warn)
        .filter_module("wgpu", log::LevelFilter::Warn)
        .filter_module("glutin", log::LevelFilter::Warn)
        .filter_module("sctk", log::LevelFilter::Warn)
        .format_timestamp(None)
        .format_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            Config::load(path).inspect_err(|e| error!("{}", e))?
        }
        None => {
            info!("Using default settings");
            Config::default()
        }
    };
    if let Some(frames) = cli.frames {
        config.render.frames = frames;
    }
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.render.output_dir));

    if cli.headless {
        info!("Headless capture of {:?} into {}", cli.widget, output_dir.display());
        let written = run_headless(&config, cli.widget, config.render.frames, &output_dir)
            .inspect_err(|e| error!("{}", e))?;
        info!("Wrote {} file(s)", written.len());
        return Ok(());
    }

    run_gui(config, cli.widget, output_dir).inspect_err(|e| error!("{}", e))
}
