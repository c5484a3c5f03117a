use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which decorations to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WidgetSelection {
    Cube,
    Globe,
    All,
}

impl WidgetSelection {
    pub fn includes_cube(self) -> bool {
        matches!(self, WidgetSelection::Cube | WidgetSelection::All)
    }

    pub fn includes_globe(self) -> bool {
        matches!(self, WidgetSelection::Globe | WidgetSelection::All)
    }
}

#[derive(Parser, Debug)]
#[command(name = "folio-render")]
#[command(about = "Software-rendered wireframe cube and orbiting globe")]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render to PNG files instead of opening a window
    #[arg(long)]
    pub headless: bool,

    /// Frames to simulate before a headless capture
    #[arg(long, value_name = "N")]
    pub frames: Option<usize>,

    /// Where captures are written
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = WidgetSelection::All)]
    pub widget: WidgetSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_every_widget_in_a_window() {
        let cli = Cli::parse_from(["folio-render"]);
        assert!(!cli.headless);
        assert_eq!(cli.widget, WidgetSelection::All);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_headless_run() {
        let cli = Cli::parse_from([
            "folio-render",
            "--headless",
            "--frames",
            "30",
            "--widget",
            "globe",
            "-c",
            "folio.toml",
        ]);
        assert!(cli.headless);
        assert_eq!(cli.frames, Some(30));
        assert!(cli.widget.includes_globe());
        assert!(!cli.widget.includes_cube());
        assert_eq!(cli.config, Some(PathBuf::from("folio.toml")));
    }
}
