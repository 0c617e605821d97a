//! Tumbletiles: same-colour tile collapse puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use tumbletiles::board::{
    DEFAULT_ANIMATION_CAPACITY, DEFAULT_FEED_PERIOD_MS, DEFAULT_HEIGHT, DEFAULT_SPAWN_COOLDOWN,
    DEFAULT_WIDTH,
};
use tumbletiles::{BoardConfig, SettleStrategy, TileColor};

/// Upper bound on gravity passes for `--settle stable`.
const STABLE_MAX_PASSES: u32 = 64;

/// Largest `--width`/`--height` accepted; keeps the board within a terminal's u16 cells.
const MAX_BOARD_TILES: u64 = 500;

fn board_dimension() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_BOARD_TILES)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = args.board_config();
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Same-colour tile collapse puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tumbletiles",
    version,
    about = "Same-colour tile collapse puzzle in the terminal. Discard groups, let the rest fall, keep the board from filling up.",
    long_about = "Tumbletiles is a terminal tile-collapse puzzle.\n\n\
        Select a tile to discard it together with every tile of the same colour connected \
        to it. Tiles above fall down, empty columns close up to the right, and a new column \
        feeds in from the right edge every few seconds. The game ends when a new column \
        cannot fit.\n\n\
        CONTROLS:\n  Arrows/WASD  Move cursor   Enter/Space/Click  Discard group\n  K            Feed column   C   Show animators\n  P            Pause         Q / Esc   Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Board width in tiles (1-500).
    #[arg(long, default_value_t = DEFAULT_WIDTH, value_name = "COLS",
          value_parser = board_dimension())]
    pub width: usize,

    /// Board height in tiles (1-500).
    #[arg(long, default_value_t = DEFAULT_HEIGHT, value_name = "ROWS",
          value_parser = board_dimension())]
    pub height: usize,

    /// Number of tile colours in play (1-6).
    #[arg(short, long, default_value_t = TileColor::COUNT as u8, value_name = "N",
          value_parser = clap::value_parser!(u8).range(1..=6))]
    pub colors: u8,

    /// RNG seed for a reproducible board. Random if not set.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Columns already on the board when a game starts.
    #[arg(long, default_value = "4", value_name = "N")]
    pub start_columns: usize,

    /// Period of the automatic column feed in ms.
    #[arg(long, default_value_t = DEFAULT_FEED_PERIOD_MS, value_name = "MS")]
    pub feed_period_ms: u64,

    /// Board ticks a manual feed must wait after the previous feed.
    #[arg(long, default_value_t = DEFAULT_SPAWN_COOLDOWN, value_name = "TICKS")]
    pub feed_cooldown: u32,

    /// Ticks a moved tile takes to reach its new cell.
    #[arg(long, default_value_t = tumbletiles::animation::DEFAULT_STEPS, value_name = "STEPS")]
    pub animation_steps: u32,

    /// Gravity per tick: two fixed passes, or repeat until nothing moves.
    #[arg(long, default_value = "fixed")]
    pub settle: Settle,

    /// Board ticks (and frames) per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Disable tile tweens and the game-over fade (tiles jump to their cells).
    #[arg(long)]
    pub no_animation: bool,
}

impl Args {
    fn board_config(&self) -> BoardConfig {
        BoardConfig {
            width: self.width.max(1),
            height: self.height.max(1),
            colors: self.colors,
            animation_capacity: DEFAULT_ANIMATION_CAPACITY.max(2 * self.width * self.height),
            animation_steps: self.animation_steps,
            spawn_cooldown_ticks: self.feed_cooldown,
            feed_period_ms: self.feed_period_ms,
            settle: self.settle.strategy(),
            seed: self.seed,
            layout: ui::TERMINAL_LAYOUT,
        }
    }
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Settle {
    #[default]
    Fixed,
    Stable,
}

impl Settle {
    fn strategy(self) -> SettleStrategy {
        match self {
            Self::Fixed => SettleStrategy::default(),
            Self::Stable => SettleStrategy::UntilStable {
                max_passes: STABLE_MAX_PASSES,
            },
        }
    }
}
