//! Board state and the move engine.
//!
//! A [`Board`] owns the [`Grid`] and every live [`Tile`]. It is the only
//! thing that mutates tile positions or tiers, and it keeps the link between
//! a cell's occupant and the tile's cell consistent on every change.
//!
//! A directional move is resolved in a single ordered pass: cells closest to
//! the destination edge are visited first, so any tile a later tile slides
//! against has already reached its final position for this move. Tiles that
//! received a merge are locked until [`Board::unlock_all`] runs, which keeps
//! a tile from absorbing more than one other tile per move.
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace, warn};
use rand::Rng;

use crate::error::BoardError;
use crate::events::BoardEvent;
use crate::grid::{Direction, Grid};
use crate::tile::{Tile, TileId, TileStates};

/// Net effect of one directional move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether any tile slid or merged.
    pub changed: bool,
    /// Sum of the values of all tiles produced by merges, saturating at
    /// `u32::MAX`.
    pub score_delta: u32,
    /// Tiles that slid without merging.
    pub moved: usize,
    /// Merges performed.
    pub merged: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TileOutcome {
    Stayed,
    Moved,
    Merged(u32),
}

/// The grid plus all live tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    tiles: BTreeMap<TileId, Tile>,
    states: TileStates,
    next_id: u64,
}

impl Board {
    /// Creates an empty `width` x `height` board using `states` as tier table.
    ///
    /// # Examples
    /// ```
    /// use tile_board::board::Board;
    /// use tile_board::tile::TileStates;
    /// let board = Board::new(4, 4, TileStates::default());
    /// assert_eq!(board.size(), 16);
    /// assert_eq!(board.tile_count(), 0);
    /// ```
    pub fn new(width: usize, height: usize, states: TileStates) -> Self {
        Board {
            grid: Grid::new(width, height),
            tiles: BTreeMap::new(),
            states,
            next_id: 0,
        }
    }

    /// Returns the underlying grid for read-only cell lookups.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// Number of live tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` when every cell holds a tile.
    ///
    /// This is the gate for both the spawn step and the game-over check.
    pub fn is_full(&self) -> bool {
        self.tiles.len() == self.grid.size()
    }

    /// Looks up a live tile by id. Merged-away tiles return `None`.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Live tiles in creation order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Tile sitting at `(x, y)`, if any.
    pub fn tile_at(&self, x: usize, y: usize) -> Option<&Tile> {
        let cell = self.grid.get_cell(x as isize, y as isize)?;
        self.tiles.get(&cell.occupant()?)
    }

    /// Tier of the tile at `(x, y)`, if any.
    pub fn tier_at(&self, x: usize, y: usize) -> Option<usize> {
        self.tile_at(x, y).map(Tile::tier)
    }

    /// Tier layout as rows, `None` for empty cells.
    pub fn tier_rows(&self) -> Vec<Vec<Option<usize>>> {
        (0..self.height())
            .map(|y| (0..self.width()).map(|x| self.tier_at(x, y)).collect())
            .collect()
    }

    /// Removes every tile and empties the grid.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.tiles.clear();
    }

    /// Spawns a tier-0 tile on a random empty cell.
    ///
    /// # Errors
    /// [`BoardError::BoardFull`] if no cell is empty. Callers are expected to
    /// check occupancy first.
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Tile, BoardError> {
        let cell = self
            .grid
            .get_random_empty_cell(rng)
            .map(|cell| cell.coordinates())
            .ok_or(BoardError::BoardFull)?;
        self.insert_tile(cell, 0)
    }

    /// Places a tile of `tier` at `(x, y)`. Used to build fixed positions.
    ///
    /// # Arguments
    /// * `x`, `y`: Target cell, `(0, 0)` being the top-left corner.
    /// * `tier`: Tier of the new tile, clamped to the tile table.
    ///
    /// # Returns
    /// A copy of the tile as it was placed.
    ///
    /// # Errors
    /// [`BoardError::OutOfBounds`] or [`BoardError::Occupied`].
    pub fn place_tile(&mut self, x: usize, y: usize, tier: usize) -> Result<Tile, BoardError> {
        let cell = self
            .grid
            .get_cell(x as isize, y as isize)
            .ok_or(BoardError::OutOfBounds { x, y })?;
        if cell.is_occupied() {
            return Err(BoardError::Occupied { x, y });
        }
        self.insert_tile((x, y), tier)
    }

    fn insert_tile(&mut self, cell: (usize, usize), tier: usize) -> Result<Tile, BoardError> {
        let id = TileId(self.next_id);
        self.next_id += 1;
        let mut tile = Tile::new(id, tier.min(self.states.max_tier()));
        tile.link_to(&mut self.grid, cell);
        self.tiles.insert(id, tile.clone());
        trace!("placed tile {:?} tier {} at {:?}", id, tile.tier(), cell);
        Ok(tile)
    }

    /// Resolves one move across the whole grid.
    ///
    /// Events for every slide and merge are appended to `events` in the
    /// order they happen.
    ///
    /// # Examples
    /// ```
    /// use tile_board::board::Board;
    /// use tile_board::grid::Direction;
    /// use tile_board::tile::TileStates;
    ///
    /// let mut board = Board::new(4, 4, TileStates::default());
    /// board.place_tile(0, 0, 0).unwrap();
    /// board.place_tile(1, 0, 0).unwrap();
    /// let mut events = Vec::new();
    /// let outcome = board.move_tiles(Direction::Left, &mut events);
    /// assert!(outcome.changed);
    /// assert_eq!(outcome.score_delta, 4);
    /// assert_eq!(board.tier_at(0, 0), Some(1));
    /// ```
    pub fn move_tiles(
        &mut self,
        direction: Direction,
        events: &mut Vec<BoardEvent>,
    ) -> MoveOutcome {
        let width = self.width() as isize;
        let height = self.height() as isize;
        let order = direction.iteration_order(self.width(), self.height());
        let mut outcome = MoveOutcome::default();

        let mut x = order.start_x;
        while x >= 0 && x < width {
            let mut y = order.start_y;
            while y >= 0 && y < height {
                let occupant = self.grid.get_cell(x, y).and_then(|cell| cell.occupant());
                if let Some(id) = occupant {
                    match self.move_tile(id, direction, events) {
                        TileOutcome::Stayed => {}
                        TileOutcome::Moved => {
                            outcome.changed = true;
                            outcome.moved += 1;
                        }
                        TileOutcome::Merged(delta) => {
                            outcome.changed = true;
                            outcome.merged += 1;
                            outcome.score_delta = outcome.score_delta.saturating_add(delta);
                        }
                    }
                }
                y += order.step_y;
            }
            x += order.step_x;
        }

        debug!(
            "move {:?}: changed={} moved={} merged={} score_delta={}",
            direction, outcome.changed, outcome.moved, outcome.merged, outcome.score_delta
        );
        outcome
    }

    fn move_tile(
        &mut self,
        id: TileId,
        direction: Direction,
        events: &mut Vec<BoardEvent>,
    ) -> TileOutcome {
        let Some(start) = self.tiles.get(&id).and_then(Tile::cell) else {
            return TileOutcome::Stayed;
        };

        let mut destination = None;
        let mut next = self.neighbour(start, direction);
        while let Some((coordinates, occupant)) = next {
            if let Some(other) = occupant {
                if self.can_merge_ids(id, other) {
                    return self.merge_tiles(id, other, events);
                }
                break;
            }
            destination = Some(coordinates);
            next = self.neighbour(coordinates, direction);
        }

        match (destination, self.tiles.get_mut(&id)) {
            (Some(to), Some(tile)) => {
                tile.link_to(&mut self.grid, to);
                events.push(BoardEvent::TileMoved { tile: id, from: start, to });
                TileOutcome::Moved
            }
            _ => TileOutcome::Stayed,
        }
    }

    fn merge_tiles(
        &mut self,
        moving: TileId,
        target: TileId,
        events: &mut Vec<BoardEvent>,
    ) -> TileOutcome {
        let from = self.tiles.get(&moving).and_then(Tile::cell);
        let survivor = self.tiles.get(&target).and_then(|tile| Some((tile.cell()?, tile.tier())));
        let (Some(from), Some((cell, survivor_tier))) = (from, survivor) else {
            warn!("cannot merge {:?} into {:?}: tile is not linked to a cell", moving, target);
            return TileOutcome::Stayed;
        };

        if let Some(mut removed) = self.tiles.remove(&moving) {
            removed.detach(&mut self.grid);
        }
        let tier = self.states.next_tier(survivor_tier);
        if let Some(survivor) = self.tiles.get_mut(&target) {
            survivor.set_tier(tier);
            survivor.lock();
        }
        let score_delta = self.states.value(tier);

        trace!("merged {:?} into {:?} at {:?} -> tier {}", moving, target, cell, tier);
        events.push(BoardEvent::TileMerged {
            survivor: target,
            removed: moving,
            from,
            cell,
            tier,
            score_delta,
        });
        TileOutcome::Merged(score_delta)
    }

    /// Coordinates and occupant of the neighbour of `coordinates`.
    fn neighbour(
        &self,
        coordinates: (usize, usize),
        direction: Direction,
    ) -> Option<((usize, usize), Option<TileId>)> {
        let cell = self.grid.get_cell(coordinates.0 as isize, coordinates.1 as isize)?;
        let adjacent = self.grid.get_adjacent_cell(cell, direction)?;
        Some((adjacent.coordinates(), adjacent.occupant()))
    }

    fn can_merge_ids(&self, a: TileId, b: TileId) -> bool {
        match (self.tiles.get(&a), self.tiles.get(&b)) {
            (Some(a), Some(b)) => can_merge(a, b),
            _ => false,
        }
    }

    /// Clears the per-move merge lock on every tile.
    pub fn unlock_all(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.unlock();
        }
    }

    /// `true` when the grid is full and no tile has an equal-tier, unlocked
    /// neighbour.
    pub fn check_for_game_over(&self) -> bool {
        if !self.is_full() {
            return false;
        }

        for tile in self.tiles.values() {
            let Some(cell) = tile.cell() else { continue };
            for direction in Direction::ALL {
                if let Some((_, Some(other))) = self.neighbour(cell, direction) {
                    if self.tiles.get(&other).is_some_and(|other| can_merge(tile, other)) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Checks that every cell's occupant and every tile's cell agree and that
    /// no two tiles share a cell.
    pub fn is_consistent(&self) -> bool {
        let occupied = self.grid.cells().iter().filter(|cell| cell.is_occupied()).count();
        if occupied != self.tiles.len() {
            return false;
        }
        let cells_agree = self.grid.cells().iter().all(|cell| match cell.occupant() {
            Some(id) => self.tiles.get(&id).and_then(Tile::cell) == Some(cell.coordinates()),
            None => true,
        });
        let tiles_agree = self.tiles.values().all(|tile| match tile.cell() {
            Some((x, y)) => self
                .grid
                .get_cell(x as isize, y as isize)
                .and_then(|cell| cell.occupant())
                == Some(tile.id()),
            None => false,
        });
        cells_agree && tiles_agree
    }
}

/// Two tiles merge when they share a tier and the stationary one `b` has
/// not already absorbed a tile this move.
pub fn can_merge(a: &Tile, b: &Tile) -> bool {
    a.tier() == b.tier() && !b.is_locked()
}

impl fmt::Display for Board {
    /// One line per row, each cell showing its tile number or `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                match self.tier_at(x, y) {
                    Some(tier) => write!(f, "{:>6}", self.states.value(tier))?,
                    None => write!(f, "{:>6}", ".")?,
                }
            }
            if y + 1 < self.height() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
