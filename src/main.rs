//! Spotlink — connect-the-spots puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use spotlink::{BoardConfig, Kind};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = board_config(&args);
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// `RUST_LOG` filters as usual (default `warn`). With `--log-file` the log
/// goes to that file instead of stderr, which the alternate screen would hide.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = path {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

/// Board settings derived from the CLI.
pub fn board_config(args: &Args) -> BoardConfig {
    let fall_duration = if args.no_animation {
        Duration::ZERO
    } else {
        Duration::from_millis(args.fall_ms)
    };
    BoardConfig::new(
        args.width,
        args.height,
        Kind::ALL.iter().take(usize::from(args.colors)).copied().collect(),
        fall_duration,
    )
}

/// Connect-the-spots puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "spotlink",
    version,
    about = "Connect-the-spots puzzle in the terminal. Drag across matching spots to clear them; close a square to clear a whole colour.",
    long_about = "Spotlink is a terminal puzzle in the style of Dots.\n\n\
        Press on a spot and drag across orthogonal neighbours of the same colour. \
        Release a chain of two or more to clear it; spots above fall down and new \
        ones drop in from the top. Close a 2x2 loop to clear every spot of that colour.\n\n\
        CONTROLS:\n  Left mouse  press, drag, release to link spots\n  \
        Drag back   onto the previous spot to undo one step\n  R           New board\n  Q / Esc     Quit"
)]
pub struct Args {
    /// Board width in spots (4..=15).
    #[arg(long, default_value = "6", value_name = "COLS")]
    pub width: usize,

    /// Board height in spots (4..=8).
    #[arg(long, default_value = "6", value_name = "ROWS")]
    pub height: usize,

    /// Number of spot colours in play.
    #[arg(short, long, default_value = "4", value_name = "N",
          value_parser = clap::value_parser!(u8).range(1..=6))]
    pub colors: u8,

    /// Time for a spot to fall into its slot, in ms.
    #[arg(long, default_value = "250", value_name = "MS")]
    pub fall_ms: u64,

    /// Seed for a reproducible board. Each new board (R) advances it by one.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(short, long, default_value = "normal")]
    pub palette: Palette,

    /// Disable fall and clear animations (spots snap into place).
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write the log here instead of stderr.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
