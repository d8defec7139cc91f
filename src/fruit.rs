use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::Cell;
use crate::grid::OccupancyGrid;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    Placed(Cell),
    BoardFull,
}

pub struct FruitSpawner {
    rng: StdRng,
}

impl FruitSpawner {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        FruitSpawner { rng }
    }

    pub fn place_randomly(&mut self, grid: &mut OccupancyGrid) -> Placement {
        let choices = grid.open_cells();

        match choices.choose(&mut self.rng).copied() {
            Some(cell) => {
                grid.place_fruit(cell);
                debug!("Placed fruit at {} ({} open cells)", cell, choices.len());
                Placement::Placed(cell)
            },
            None => Placement::BoardFull,
        }
    }
}

// The position lives in the grid; this only remembers that it was eaten.
pub struct Fruit {
    consumed: bool,
}

impl Fruit {
    pub fn new() -> Self {
        Fruit { consumed: false }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    pub fn place_at(&mut self, grid: &mut OccupancyGrid, cell: Cell) {
        grid.place_fruit(cell);
        self.consumed = false;
    }

    pub fn reposition(&mut self, grid: &mut OccupancyGrid, spawner: &mut FruitSpawner) -> Placement {
        self.consumed = false;
        spawner.place_randomly(grid)
    }
}
