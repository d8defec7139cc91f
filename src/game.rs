use std::{sync::Arc, time::Duration};

use log::info;

use crate::Cell;
use crate::clock::{SessionControl, Simulation};
use crate::fruit::{Fruit, FruitSpawner, Placement};
use crate::grid::OccupancyGrid;
use crate::snake::{Snake, Segment, Direction::{self, *}, MoveResult::*};

const INITIAL_DIRECTION: Direction = Left;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Crashed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    // Head first
    pub segments: Vec<Segment>,
    pub fruit: Option<Cell>,
    pub score: u32,
    pub elapsed: Duration,
    pub paused: bool,
    pub outcome: Option<Outcome>,
}

pub trait Renderer {
    fn draw(&mut self, frame: &Snapshot) -> anyhow::Result<()>;
}

pub struct GameState {
    grid: OccupancyGrid,
    snake: Snake,
    fruit: Fruit,
    spawner: FruitSpawner,
    control: Arc<SessionControl>,
    score: u32,
    elapsed: Duration,
    tick_period: Duration,
    outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(width: i32, height: i32, tick_period: Duration, seed: Option<u64>, control: Arc<SessionControl>) -> Self {
        let grid = OccupancyGrid::new(width, height);
        let head = grid.center();
        // Tail to the right unless the board is too narrow
        let tail = [Right, Left, Down, Up]
            .map(|dir| head.step(dir))
            .into_iter()
            .find(|cell| grid.in_bounds(*cell))
            .unwrap_or(head);

        Self::with_layout(grid, head, tail, None, tick_period, seed, control)
    }

    /// A `None` fruit is placed at random.
    pub fn with_layout(
        mut grid: OccupancyGrid,
        head: Cell,
        tail: Cell,
        fruit_at: Option<Cell>,
        tick_period: Duration,
        seed: Option<u64>,
        control: Arc<SessionControl>,
    ) -> Self {
        control.set_intended_direction(INITIAL_DIRECTION);
        let snake = Snake::new(&mut grid, head, tail, INITIAL_DIRECTION);
        let mut spawner = FruitSpawner::new(seed);
        let mut fruit = Fruit::new();

        let placement = match fruit_at {
            Some(cell) => {
                fruit.place_at(&mut grid, cell);
                Placement::Placed(cell)
            },
            None => fruit.reposition(&mut grid, &mut spawner),
        };

        let mut game = GameState {
            grid,
            snake,
            fruit,
            spawner,
            control,
            score: 0,
            elapsed: Duration::ZERO,
            tick_period,
            outcome: None,
        };

        if placement == Placement::BoardFull {
            game.finish(Outcome::Won);
        }
        game
    }

    pub fn tick(&mut self) {
        if self.is_over() || self.control.is_paused() {
            return;
        }

        if self.fruit.is_consumed() {
            self.score += 1;
            // The last fruit is scored but not grown into: there is no cell
            // left for the extra segment.
            if self.fruit.reposition(&mut self.grid, &mut self.spawner) == Placement::BoardFull {
                self.finish(Outcome::Won);
                return;
            }
            self.snake.grow();
        }

        self.elapsed += self.tick_period;
        let direction = self.control.intended_direction();

        match self.snake.move_step(&mut self.grid, direction) {
            Moved { ate_fruit: true } => self.fruit.mark_consumed(),
            Moved { ate_fruit: false } => {},
            Crashed => self.finish(Outcome::Crashed),
        }

        if !self.is_over() {
            debug_assert_eq!(self.grid.fruit().is_none(), self.fruit.is_consumed());
            debug_assert_eq!(
                self.grid.occupied_count(),
                self.snake.len() + self.grid.fruit().map_or(0, |_| 1)
            );
            debug_assert!(self.grid.occupied_count() <= self.grid.capacity());
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            segments: self.snake.segments().to_vec(),
            fruit: self.grid.fruit(),
            score: self.score,
            elapsed: self.elapsed,
            paused: self.control.is_paused(),
            outcome: self.outcome,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
        self.control.mark_over();
        info!(
            "Game over ({:?}): {} fruits eaten, snake length {}, game time {}s",
            outcome, self.score, self.snake.len(), self.elapsed.as_secs()
        );
    }
}

pub struct Session<R: Renderer> {
    game: GameState,
    renderer: R,
}

impl<R: Renderer> Session<R> {
    pub fn new(game: GameState, renderer: R) -> Self {
        Session { game, renderer }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: Renderer> Simulation for Session<R> {
    fn tick(&mut self) {
        self.game.tick();
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let frame = self.game.snapshot();
        self.renderer.draw(&frame)
    }
}
