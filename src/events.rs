//! Events emitted by the board core.
//!
//! The core never renders. Presentation and scoring layers drain these from
//! [`crate::round::RoundController::drain_events`] and react to them.
use crate::tile::TileId;

/// Something the board did that a presentation or score layer may react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardEvent {
    /// A new tile appeared.
    TileSpawned {
        tile: TileId,
        cell: (usize, usize),
        tier: usize,
    },
    /// A tile slid without merging.
    TileMoved {
        tile: TileId,
        from: (usize, usize),
        to: (usize, usize),
    },
    /// `removed` slid from `from` into `survivor`, which now has `tier`.
    /// `score_delta` is the display value of the resulting tier.
    TileMerged {
        survivor: TileId,
        removed: TileId,
        from: (usize, usize),
        cell: (usize, usize),
        tier: usize,
        score_delta: u32,
    },
    /// No move can change the board any more.
    GameOver,
}
