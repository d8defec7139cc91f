use crate::Cell;

/// Occupancy map. Anything outside the board reads as a wall. The live
/// fruit's cell is marked but reads as open to movement.
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
    fruit: Option<Cell>,
}

impl OccupancyGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = vec![false; width as usize * height as usize];
        OccupancyGrid { width, height, cells, fruit: None }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.width / 2, self.height / 2)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        match self.index(cell) {
            Some(i) => self.cells[i] && self.fruit != Some(cell),
            None => true,
        }
    }

    pub fn set_occupied(&mut self, cell: Cell, occupied: bool) {
        if let Some(i) = self.index(cell) {
            self.cells[i] = occupied;
        }
    }

    #[cfg(test)]
    pub fn is_marked(&self, cell: Cell) -> bool {
        self.index(cell).map_or(false, |i| self.cells[i])
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn open_cells(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
            .filter(|cell| !self.is_occupied(*cell))
            .collect()
    }

    pub fn fruit(&self) -> Option<Cell> {
        self.fruit
    }

    pub fn place_fruit(&mut self, cell: Cell) {
        self.set_occupied(cell, true);
        self.fruit = Some(cell);
    }

    // Once per head move. The cell stays marked for the head.
    pub fn try_consume_fruit(&mut self, cell: Cell) -> bool {
        if self.fruit == Some(cell) {
            self.fruit = None;
            true
        } else {
            false
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if self.in_bounds(cell) {
            Some(self.width as usize * cell.y as usize + cell.x as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_a_wall() {
        let grid = OccupancyGrid::new(3, 2);
        assert!(grid.is_occupied(Cell::new(-1, 0)));
        assert!(grid.is_occupied(Cell::new(0, -1)));
        assert!(grid.is_occupied(Cell::new(3, 0)));
        assert!(grid.is_occupied(Cell::new(0, 2)));
        assert!(!grid.is_occupied(Cell::new(2, 1)));
    }

    #[test]
    fn set_occupied_ignores_out_of_bounds() {
        let mut grid = OccupancyGrid::new(2, 2);
        grid.set_occupied(Cell::new(5, 5), true);
        grid.set_occupied(Cell::new(-1, 0), true);
        assert_eq!(grid.occupied_count(), 0);

        grid.set_occupied(Cell::new(1, 0), true);
        assert!(grid.is_occupied(Cell::new(1, 0)));
        grid.set_occupied(Cell::new(1, 0), false);
        assert!(!grid.is_occupied(Cell::new(1, 0)));
    }

    #[test]
    fn open_cells_are_row_major() {
        let mut grid = OccupancyGrid::new(3, 2);
        grid.set_occupied(Cell::new(1, 0), true);
        grid.set_occupied(Cell::new(0, 1), true);

        let open = grid.open_cells();
        assert_eq!(open, vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(1, 1), Cell::new(2, 1)]);
    }

    #[test]
    fn fruit_cell_reads_open_without_being_eaten() {
        let mut grid = OccupancyGrid::new(3, 3);
        let apple = Cell::new(2, 2);
        grid.place_fruit(apple);

        assert!(grid.is_marked(apple));
        assert!(!grid.is_occupied(apple));
        // Querying, or scanning for open cells, must not eat it.
        assert!(grid.open_cells().contains(&apple));
        assert_eq!(grid.fruit(), Some(apple));
    }

    #[test]
    fn consuming_fruit_leaves_the_cell_marked() {
        let mut grid = OccupancyGrid::new(3, 3);
        let apple = Cell::new(0, 2);
        grid.place_fruit(apple);

        assert!(!grid.try_consume_fruit(Cell::new(1, 2)));
        assert!(grid.try_consume_fruit(apple));
        assert_eq!(grid.fruit(), None);
        assert!(grid.is_occupied(apple));
        assert!(!grid.try_consume_fruit(apple));
    }

    #[test]
    fn degenerate_grid_has_no_cells() {
        let grid = OccupancyGrid::new(0, -4);
        assert_eq!(grid.capacity(), 0);
        assert!(grid.open_cells().is_empty());
        assert!(grid.is_occupied(Cell::new(0, 0)));
    }
}
