use crate::Cell;
use crate::grid::OccupancyGrid;
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left
}

impl Direction {
    pub const ALL: [Direction; 4] = [Up, Right, Down, Left];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Right => (1, 0),
            Down => (0, 1),
            Left => (-1, 0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Up => "Up",
            Right => "Right",
            Down => "Down",
            Left => "Left",
        }
    }

    pub fn to_bits(self) -> u8 {
        match self {
            Up => 0,
            Right => 1,
            Down => 2,
            Left => 3,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Up,
            1 => Right,
            2 => Down,
            _ => Left,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { ate_fruit: bool },
    Crashed
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub cell: Cell,
    pub direction: Direction,
}

// Head first. A segment's leader is the one just before it.
pub struct Snake {
    segments: Vec<Segment>,
}

impl Snake {
    pub fn new(grid: &mut OccupancyGrid, head: Cell, tail: Cell, direction: Direction) -> Self {
        grid.set_occupied(head, true);
        grid.set_occupied(tail, true);

        let segments = vec![
            Segment { cell: head, direction },
            Segment { cell: tail, direction },
        ];
        Snake { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn head(&self) -> Segment {
        self.segments[0]
    }

    pub fn tail(&self) -> Segment {
        self.segments[self.segments.len() - 1]
    }

    pub fn leader(&self, index: usize) -> Option<&Segment> {
        index.checked_sub(1).and_then(|i| self.segments.get(i))
    }

    /// Tail first, then the body towards the head, then the head. Every
    /// follower reads its leader before the leader has moved.
    pub fn move_step(&mut self, grid: &mut OccupancyGrid, direction: Direction) -> MoveResult {
        let tail = self.segments.len() - 1;
        for i in (1..=tail).rev() {
            self.move_follower(grid, i, i == tail);
        }

        self.move_head(grid, direction)
    }

    // The cell the head leaves already belongs to the neck, so nothing is
    // freed. On a crash the grid is left alone.
    pub fn move_head(&mut self, grid: &mut OccupancyGrid, direction: Direction) -> MoveResult {
        let head = &mut self.segments[0];
        head.direction = direction;
        head.cell = head.cell.step(direction);

        if grid.is_occupied(head.cell) {
            return Crashed;
        }

        let ate_fruit = grid.try_consume_fruit(head.cell);
        grid.set_occupied(head.cell, true);
        Moved { ate_fruit }
    }

    fn move_follower(&mut self, grid: &mut OccupancyGrid, index: usize, is_tail: bool) {
        if is_tail {
            grid.set_occupied(self.segments[index].cell, false);
        }

        if let Some(&leader) = self.leader(index) {
            self.segments[index] = leader;
            grid.set_occupied(leader.cell, true);
        }
    }

    // The copy stays put next tick while the old tail moves on.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.segments.push(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(snake: &Snake) -> Vec<Cell> {
        snake.segments().iter().map(|s| s.cell).collect()
    }

    #[test]
    fn head_moves_by_direction_offset() {
        let start = Cell::new(2, 2);
        for (dir, expected) in [(Up, (2, 1)), (Right, (3, 2)), (Down, (2, 3)), (Left, (1, 2))] {
            let mut grid = OccupancyGrid::new(5, 5);
            let mut snake = Snake::new(&mut grid, start, Cell::new(2, 2), dir);
            assert_eq!(snake.move_head(&mut grid, dir), Moved { ate_fruit: false });
            assert_eq!(snake.head().cell, Cell::new(expected.0, expected.1));
            assert_eq!(snake.head().direction, dir);
        }
    }

    #[test]
    fn walking_off_the_board_crashes() {
        // 3x3, head (1,1) facing Left, tail (2,1)
        let mut grid = OccupancyGrid::new(3, 3);
        let mut snake = Snake::new(&mut grid, Cell::new(1, 1), Cell::new(2, 1), Left);

        assert_eq!(snake.move_step(&mut grid, Left), Moved { ate_fruit: false });
        assert_eq!(cells(&snake), vec![Cell::new(0, 1), Cell::new(1, 1)]);
        assert_eq!(grid.occupied_count(), 2);

        assert_eq!(snake.move_step(&mut grid, Left), Crashed);
        assert_eq!(snake.head().cell, Cell::new(-1, 1));
    }

    #[test]
    fn out_of_bounds_crashes_even_on_an_empty_board() {
        for dir in Direction::ALL {
            let mut grid = OccupancyGrid::new(1, 1);
            let mut snake = Snake::new(&mut grid, Cell::new(0, 0), Cell::new(0, 0), dir);
            assert_eq!(snake.move_head(&mut grid, dir), Crashed);
        }
    }

    #[test]
    fn followers_take_their_leaders_previous_cell() {
        let mut grid = OccupancyGrid::new(8, 8);
        let mut snake = Snake::new(&mut grid, Cell::new(4, 4), Cell::new(5, 4), Left);
        for _ in 0..3 {
            snake.grow();
            snake.move_step(&mut grid, Left);
        }

        for dir in [Up, Up, Right, Down] {
            let before = snake.segments().to_vec();
            assert!(matches!(snake.move_step(&mut grid, dir), Moved { .. }));
            for i in 1..snake.len() {
                assert_eq!(snake.segments()[i], before[i - 1]);
            }
            assert_eq!(grid.occupied_count(), snake.len());
        }
    }

    #[test]
    fn grow_adds_exactly_one_segment_at_the_old_tail() {
        let mut grid = OccupancyGrid::new(8, 3);
        let mut plain = Snake::new(&mut OccupancyGrid::new(8, 3), Cell::new(4, 1), Cell::new(5, 1), Left);
        let mut grown = Snake::new(&mut grid, Cell::new(4, 1), Cell::new(5, 1), Left);
        let old_tail = grown.tail();

        plain.move_step(&mut OccupancyGrid::new(8, 3), Left);
        grown.grow();
        assert_eq!(grown.len(), 3);
        grown.move_step(&mut grid, Left);

        assert_eq!(grown.len(), 3);
        assert_eq!(&grown.segments()[..2], plain.segments());
        assert_eq!(grown.tail(), old_tail);
        assert_eq!(grid.occupied_count(), 3);
    }

    #[test]
    fn new_tail_follows_the_previous_tail() {
        let mut grid = OccupancyGrid::new(8, 3);
        let mut snake = Snake::new(&mut grid, Cell::new(4, 1), Cell::new(5, 1), Left);
        snake.grow();
        snake.move_step(&mut grid, Left);
        snake.grow();
        snake.move_step(&mut grid, Left);

        assert_eq!(
            cells(&snake),
            vec![Cell::new(2, 1), Cell::new(3, 1), Cell::new(4, 1), Cell::new(5, 1)]
        );
        assert_eq!(snake.leader(3).map(|s| s.cell), Some(Cell::new(4, 1)));
        assert_eq!(snake.leader(0), None);
    }

    #[test]
    fn head_may_enter_the_cell_the_tail_just_left() {
        // 2x2 loop: the head chases the tail around the square.
        let mut grid = OccupancyGrid::new(2, 2);
        let mut snake = Snake::new(&mut grid, Cell::new(0, 0), Cell::new(1, 0), Left);
        snake.grow();
        snake.move_step(&mut grid, Down);
        snake.grow();
        snake.move_step(&mut grid, Right);
        assert_eq!(snake.len(), 4);
        assert_eq!(grid.occupied_count(), 4);

        assert_eq!(snake.move_step(&mut grid, Up), Moved { ate_fruit: false });
        assert_eq!(snake.head().cell, Cell::new(1, 0));
    }

    #[test]
    fn reversing_a_two_segment_snake_swaps_it() {
        let mut grid = OccupancyGrid::new(5, 1);
        let mut snake = Snake::new(&mut grid, Cell::new(2, 0), Cell::new(3, 0), Left);

        assert_eq!(snake.move_step(&mut grid, Right), Moved { ate_fruit: false });
        assert_eq!(cells(&snake), vec![Cell::new(3, 0), Cell::new(2, 0)]);
    }

    #[test]
    fn reversing_a_longer_snake_is_fatal() {
        let mut grid = OccupancyGrid::new(6, 1);
        let mut snake = Snake::new(&mut grid, Cell::new(2, 0), Cell::new(3, 0), Left);
        snake.grow();
        snake.move_step(&mut grid, Left);

        assert_eq!(snake.move_step(&mut grid, Right), Crashed);
    }

    #[test]
    fn head_reports_eaten_fruit() {
        let mut grid = OccupancyGrid::new(4, 1);
        let mut snake = Snake::new(&mut grid, Cell::new(2, 0), Cell::new(3, 0), Left);
        grid.place_fruit(Cell::new(1, 0));

        assert_eq!(snake.move_step(&mut grid, Left), Moved { ate_fruit: true });
        assert_eq!(grid.fruit(), None);
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn direction_bits_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_bits(dir.to_bits()), dir);
        }
    }
}
