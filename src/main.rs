mod assets;
mod clock;
mod config;
mod error;
mod fruit;
mod game;
mod grid;
mod input;
mod snake;
mod term;

use std::{fmt, fs::File, sync::Arc};

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use simplelog::{Config as LogConfig, WriteLogger};

use crate::assets::{DirectoryImages, SpriteSheet};
use crate::clock::{SessionControl, SimulationClock, SystemClock};
use crate::config::{Cli, Config};
use crate::game::{GameState, Session};
use crate::snake::Direction;
use crate::term::{required_size, TermManager, TerminalRenderer};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Cell::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("creating log file {}", cli.log_file.display()))?;
    WriteLogger::init(level, LogConfig::default(), log_file)?;

    let mut term = TermManager::new().context("reading terminal size")?;
    let config = Config::from_cli(&cli, term.get_terminal_size());
    info!(
        "Starting: {} ticks/s, {}x{} board, assets in {}",
        config.ticks_per_second, config.width, config.height, config.assets_dir.display()
    );

    let needed = required_size(config.width, config.height);
    let available = term.get_terminal_size();
    if needed.0 > available.0 || needed.1 > available.1 {
        warn!("Terminal is {:?} but the board needs {:?}; it will be clipped", available, needed);
    }

    let sprites = SpriteSheet::load(&DirectoryImages::load(&config.assets_dir));

    let control = Arc::new(SessionControl::new(Direction::Left));
    let game = GameState::new(config.width, config.height, config.tick_period, config.seed, Arc::clone(&control));

    term.setup()?;
    let input = input::spawn(Arc::clone(&control));

    let mut session = Session::new(game, TerminalRenderer::new(term, sprites));
    let mut pacing = SimulationClock::new(SystemClock::new(), config.tick_period);
    let result = pacing.run(&mut session, &control);

    // Whatever happened, give the terminal back before reporting it.
    control.stop();
    let restored = session.renderer_mut().restore();
    let input_result = input.join().map_err(|_| anyhow!("input thread panicked"))?;

    if let Err(e) = &result {
        error!("Simulation loop stopped: {:#}", e);
    }
    let stats = result?;
    restored?;
    input_result?;

    info!(
        "Stopped after {} iterations: {} ticks ({} catch-up, at most {} per frame), {} frames, {} sleeps, {} yields",
        stats.iterations, stats.ticks, stats.catch_up_ticks, stats.max_catch_up_per_iteration,
        stats.frames, stats.sleeps, stats.yields
    );
    info!("Final score {} ({:?})", session.game().score(), session.game().outcome());
    Ok(())
}
