//! Tiles and the tier-to-value table.
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Stable identifier of a live tile.
///
/// Ids are handed out in creation order and never reused within a board,
/// so presentation layers can key sprites on them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub(crate) u64);

impl TileId {
    /// Raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Display data for one tier: the number shown and its colours.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileState {
    pub number: u32,
    #[serde(default = "defaults::background")]
    pub background: String,
    #[serde(default = "defaults::text")]
    pub text: String,
}

impl TileState {
    /// # Arguments
    /// * `number`: Value shown on the tile and scored when it is created by a merge.
    /// * `background`: Fill colour, any string the presentation layer understands.
    /// * `text`: Colour of the number.
    pub fn new(number: u32, background: impl Into<String>, text: impl Into<String>) -> Self {
        TileState {
            number,
            background: background.into(),
            text: text.into(),
        }
    }
}

mod defaults {
    pub fn background() -> String {
        "#eee4da".to_string()
    }
    pub fn text() -> String {
        "#776e65".to_string()
    }
}

/// Ordered tier table. Tier `i` displays `states[i]`.
///
/// The table never indexes out of range: tiers past the end clamp to the
/// last entry, so a short table makes tiles stop growing instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileStates {
    states: Vec<TileState>,
}

impl TileStates {
    /// Returns `None` for an empty table.
    pub fn new(states: Vec<TileState>) -> Option<Self> {
        if states.is_empty() {
            None
        } else {
            Some(TileStates { states })
        }
    }

    /// Highest tier the table defines.
    pub fn max_tier(&self) -> usize {
        self.states.len() - 1
    }

    /// State for `tier`, clamped to the last entry.
    pub fn get(&self, tier: usize) -> &TileState {
        &self.states[tier.min(self.max_tier())]
    }

    /// Display value of `tier`.
    ///
    /// ```
    /// use tile_board::tile::TileStates;
    /// let states = TileStates::default();
    /// assert_eq!(states.value(0), 2);
    /// assert_eq!(states.value(1), 4);
    /// assert_eq!(states.value(10), 2048);
    /// assert_eq!(states.value(99), 2048);
    /// ```
    pub fn value(&self, tier: usize) -> u32 {
        self.get(tier).number
    }

    /// Tier a merge produces from two tiles of `tier`.
    pub fn next_tier(&self, tier: usize) -> usize {
        (tier + 1).min(self.max_tier())
    }

    /// Number of tiers in the table.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; [`TileStates::new`] refuses empty tables.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for TileStates {
    /// The classic 2..2048 palette.
    fn default() -> Self {
        let palette = [
            (2, "#eee4da", "#776e65"),
            (4, "#ede0c8", "#776e65"),
            (8, "#f2b179", "#f9f6f2"),
            (16, "#f59563", "#f9f6f2"),
            (32, "#f67c5f", "#f9f6f2"),
            (64, "#f65e3b", "#f9f6f2"),
            (128, "#edcf72", "#f9f6f2"),
            (256, "#edcc61", "#f9f6f2"),
            (512, "#edc850", "#f9f6f2"),
            (1024, "#edc53f", "#f9f6f2"),
            (2048, "#edc22e", "#f9f6f2"),
        ];
        TileStates {
            states: palette
                .iter()
                .map(|&(number, bg, text)| TileState::new(number, bg, text))
                .collect(),
        }
    }
}

/// A value-tier entity bound to at most one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    tier: usize,
    cell: Option<(usize, usize)>,
    locked: bool,
}

impl Tile {
    pub(crate) fn new(id: TileId, tier: usize) -> Self {
        Tile {
            id,
            tier,
            cell: None,
            locked: false,
        }
    }

    /// Id the tile keeps for its whole life.
    pub fn id(&self) -> TileId {
        self.id
    }

    /// Index into the tile table; `0` is the smallest tile.
    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Coordinates of the cell this tile sits on.
    pub fn cell(&self) -> Option<(usize, usize)> {
        self.cell
    }

    /// Whether the tile already took part in a merge this move.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn set_tier(&mut self, tier: usize) {
        self.tier = tier;
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    /// Moves the tile onto `cell`, clearing the cell it came from.
    ///
    /// The caller guarantees `cell` is empty or already holds this tile.
    pub(crate) fn link_to(&mut self, grid: &mut Grid, cell: (usize, usize)) {
        self.detach(grid);
        self.cell = Some(cell);
        grid.set_occupant(cell, Some(self.id));
    }

    /// Releases the tile's cell, leaving it unlinked.
    pub(crate) fn detach(&mut self, grid: &mut Grid) {
        if let Some(previous) = self.cell.take() {
            grid.set_occupant(previous, None);
        }
    }
}
