use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::term::{board_that_fits, Coords};

pub const DEFAULT_TICKS_PER_SECOND: u32 = 6;
pub const MAX_BOARD_SIDE: i32 = 23;
pub const MIN_BOARD_SIDE: i32 = 3;

/// Grid-based snake for the terminal.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Simulation ticks per second.
    #[arg(
        value_name = "TICKS_PER_SECOND",
        default_value_t = DEFAULT_TICKS_PER_SECOND,
        value_parser = clap::value_parser!(u32).range(1..=1_000)
    )]
    pub ticks_per_second: u32,

    /// Board width in cells. Defaults to what fits the terminal, up to 23.
    #[arg(long, value_parser = clap::value_parser!(u16).range(MIN_BOARD_SIDE as i64..=512))]
    pub width: Option<u16>,

    /// Board height in cells. Defaults to what fits the terminal, up to 23.
    #[arg(long, value_parser = clap::value_parser!(u16).range(MIN_BOARD_SIDE as i64..=512))]
    pub height: Option<u16>,

    /// Directory holding the image manifest and sprite files.
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Seed for fruit placement, for reproducible games.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where log output goes; the terminal itself is taken by the game.
    #[arg(long, value_name = "PATH", default_value = "serpent.log")]
    pub log_file: PathBuf,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub ticks_per_second: u32,
    pub tick_period: Duration,
    pub width: i32,
    pub height: i32,
    pub assets_dir: PathBuf,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_cli(cli: &Cli, terminal: Coords) -> Self {
        let (fit_w, fit_h) = board_that_fits(terminal);
        let side = |requested: Option<u16>, fits: i32| match requested {
            Some(n) => i32::from(n),
            None => fits.clamp(MIN_BOARD_SIDE, MAX_BOARD_SIDE),
        };

        Config {
            ticks_per_second: cli.ticks_per_second,
            tick_period: Duration::from_secs(1) / cli.ticks_per_second,
            width: side(cli.width, fit_w),
            height: side(cli.height, fit_h),
            assets_dir: cli.assets.clone(),
            seed: cli.seed,
        }
    }
}
