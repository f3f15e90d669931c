//! Grid model: cells addressed by `(x, y)` and the directions tiles slide in.
//!
//! Coordinates follow display convention: `x` grows to the right and `y`
//! grows downwards, so row 0 is the top of the board. Direction vectors use
//! the opposite vertical sense (`Up` is `(0, 1)`), which is why
//! [`Grid::get_adjacent_cell`] subtracts the vertical component.
use rand::Rng;

use crate::tile::TileId;

/// One of the four directions a move can slide tiles in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Order in which the move engine visits cells for one direction.
///
/// The outer loop walks columns starting at `start_x` in steps of `step_x`,
/// the inner loop walks rows starting at `start_y` in steps of `step_y`.
/// Both loops stop as soon as the index leaves the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationOrder {
    pub start_x: isize,
    pub step_x: isize,
    pub start_y: isize,
    pub step_y: isize,
}

impl Direction {
    /// All four directions, in the order the game-over check tries them.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector of the direction with `y` pointing up.
    ///
    /// ```
    /// use tile_board::grid::Direction;
    /// assert_eq!(Direction::Up.vector(), (0, 1));
    /// assert_eq!(Direction::Left.vector(), (-1, 0));
    /// ```
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Visiting order for a `width` x `height` grid.
    ///
    /// Cells on the destination edge come first and the walk proceeds towards
    /// the opposite edge. The edge row or column itself is skipped because a
    /// tile there has nowhere to go.
    pub fn iteration_order(self, width: usize, height: usize) -> IterationOrder {
        let (w, h) = (width as isize, height as isize);
        match self {
            Direction::Up => IterationOrder {
                start_x: 0,
                step_x: 1,
                start_y: 1,
                step_y: 1,
            },
            Direction::Down => IterationOrder {
                start_x: 0,
                step_x: 1,
                start_y: h - 2,
                step_y: -1,
            },
            Direction::Left => IterationOrder {
                start_x: 1,
                step_x: 1,
                start_y: 0,
                step_y: 1,
            },
            Direction::Right => IterationOrder {
                start_x: w - 2,
                step_x: -1,
                start_y: 0,
                step_y: 1,
            },
        }
    }
}

/// A single addressable grid position holding at most one tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coordinates: (usize, usize),
    occupant: Option<TileId>,
}

impl Cell {
    fn new(x: usize, y: usize) -> Self {
        Cell {
            coordinates: (x, y),
            occupant: None,
        }
    }

    /// `(x, y)` of this cell.
    pub fn coordinates(&self) -> (usize, usize) {
        self.coordinates
    }

    /// Id of the tile occupying this cell, if any.
    pub fn occupant(&self) -> Option<TileId> {
        self.occupant
    }

    /// Returns `true` if no tile sits on this cell.
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Returns `true` if a tile sits on this cell.
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Fixed-size 2D array of cells stored in row-major order.
///
/// The grid only tracks occupancy. Keeping a cell's occupant in sync with the
/// tile's own cell reference is the job of [`crate::tile::Tile::link_to`] and
/// [`crate::tile::Tile::detach`], the only callers of the occupancy setter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds an empty grid, one row of `width` cells at a time.
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Number of cells per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Bounds-checked lookup. Out-of-range coordinates yield `None`.
    ///
    /// ```
    /// use tile_board::grid::Grid;
    /// let grid = Grid::new(4, 4);
    /// assert!(grid.get_cell(3, 3).is_some());
    /// assert!(grid.get_cell(-1, 0).is_none());
    /// assert!(grid.get_cell(0, 4).is_none());
    /// ```
    pub fn get_cell(&self, x: isize, y: isize) -> Option<&Cell> {
        let index = self.index_of(x, y)?;
        self.cells.get(index)
    }

    /// Neighbour of `cell` one step in `direction`, or `None` past the edge.
    pub fn get_adjacent_cell(&self, cell: &Cell, direction: Direction) -> Option<&Cell> {
        let (x, y) = cell.coordinates;
        let (dx, dy) = direction.vector();
        self.get_cell(x as isize + dx, y as isize - dy)
    }

    /// Picks a random starting index and scans forward, wrapping around,
    /// until an empty cell is found.
    ///
    /// # Arguments
    /// * `rng`: Source of the starting index.
    ///
    /// # Returns
    /// The first empty cell at or after the starting index, or `None` only
    /// when every cell is occupied. A grid with a single empty cell always
    /// yields that cell.
    pub fn get_random_empty_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Cell> {
        if self.cells.is_empty() {
            return None;
        }
        let start = rng.gen_range(0..self.cells.len());
        (0..self.cells.len())
            .map(|offset| &self.cells[(start + offset) % self.cells.len()])
            .find(|cell| cell.is_empty())
    }

    /// Number of cells without a tile.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    pub(crate) fn set_occupant(&mut self, coordinates: (usize, usize), occupant: Option<TileId>) {
        let (x, y) = coordinates;
        if let Some(index) = self.index_of(x as isize, y as isize) {
            self.cells[index].occupant = occupant;
        }
    }

    pub(crate) fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.occupant = None;
        }
    }

    fn index_of(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_grid_dimensions() {
        let grid = Grid::new(5, 3);
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.size(), 15);
        assert_eq!(grid.width() * grid.height(), grid.cells().len());
        assert!(grid.cells().iter().all(Cell::is_empty));
    }

    #[test]
    fn test_cells_are_row_major() {
        let grid = Grid::new(3, 2);
        let coords: Vec<_> = grid.cells().iter().map(Cell::coordinates).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn test_get_cell_in_and_out_of_range() {
        let grid = Grid::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let cell = grid.get_cell(x, y).unwrap();
                assert_eq!(cell.coordinates(), (x as usize, y as usize));
            }
        }
        assert!(grid.get_cell(4, 0).is_none());
        assert!(grid.get_cell(0, -1).is_none());
        assert!(grid.get_cell(-1, -1).is_none());
    }

    #[test]
    fn test_adjacent_cell_inverts_vertical_axis() {
        let grid = Grid::new(4, 4);
        let cell = grid.get_cell(1, 1).unwrap();
        assert_eq!(grid.get_adjacent_cell(cell, Direction::Up).unwrap().coordinates(), (1, 0));
        assert_eq!(grid.get_adjacent_cell(cell, Direction::Down).unwrap().coordinates(), (1, 2));
        assert_eq!(grid.get_adjacent_cell(cell, Direction::Left).unwrap().coordinates(), (0, 1));
        assert_eq!(grid.get_adjacent_cell(cell, Direction::Right).unwrap().coordinates(), (2, 1));
    }

    #[test]
    fn test_adjacent_cell_at_edges() {
        let grid = Grid::new(4, 4);
        let corner = grid.get_cell(0, 0).unwrap();
        assert!(grid.get_adjacent_cell(corner, Direction::Up).is_none());
        assert!(grid.get_adjacent_cell(corner, Direction::Left).is_none());
        let far = grid.get_cell(3, 3).unwrap();
        assert!(grid.get_adjacent_cell(far, Direction::Down).is_none());
        assert!(grid.get_adjacent_cell(far, Direction::Right).is_none());
    }

    #[test]
    fn test_iteration_order_starts_next_to_destination_edge() {
        let expected = [
            (Direction::Up, (0, 1, 1, 1)),
            (Direction::Down, (0, 1, 2, -1)),
            (Direction::Left, (1, 1, 0, 1)),
            (Direction::Right, (2, -1, 0, 1)),
        ];
        for (direction, (start_x, step_x, start_y, step_y)) in expected {
            let order = direction.iteration_order(4, 4);
            assert_eq!(
                (order.start_x, order.step_x, order.start_y, order.step_y),
                (start_x, step_x, start_y, step_y),
                "{:?}",
                direction
            );
        }
    }

    #[test]
    fn test_random_empty_cell_with_single_gap() {
        let mut grid = Grid::new(4, 4);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            if cell.coordinates != (2, 1) {
                cell.occupant = Some(TileId(i as u64));
            }
        }
        for seed in 0..64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let cell = grid.get_random_empty_cell(&mut rng).unwrap();
            assert_eq!(cell.coordinates(), (2, 1), "seed {} picked the wrong cell", seed);
        }
    }

    #[test]
    fn test_random_empty_cell_full_grid() {
        let mut grid = Grid::new(2, 2);
        for (i, cell) in grid.cells.iter_mut().enumerate() {
            cell.occupant = Some(TileId(i as u64));
        }
        let mut rng = SmallRng::seed_from_u64(7);
        assert!(grid.get_random_empty_cell(&mut rng).is_none());
        assert_eq!(grid.empty_count(), 0);
    }

    #[test]
    fn test_random_empty_cell_reaches_every_cell() {
        let grid = Grid::new(4, 4);
        let mut seen = std::collections::HashSet::new();
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..1000 {
            seen.insert(grid.get_random_empty_cell(&mut rng).unwrap().coordinates());
        }
        assert_eq!(seen.len(), 16, "random start should not favour low indices");
    }

    #[test]
    fn test_set_occupant_and_clear() {
        let mut grid = Grid::new(2, 2);
        grid.set_occupant((1, 0), Some(TileId(3)));
        assert_eq!(grid.get_cell(1, 0).unwrap().occupant(), Some(TileId(3)));
        assert_eq!(grid.empty_count(), 3);
        grid.clear();
        assert_eq!(grid.empty_count(), 4);
    }
}
