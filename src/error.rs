//! Error types for the board core and its configuration.
use thiserror::Error;

/// Faults raised by board mutations.
///
/// Coordinate lookups never produce an error; they return `None` so that
/// adjacency walks can use the board edge as a sentinel. Errors here are
/// reserved for explicit requests that cannot be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A spawn was requested while every cell is occupied.
    #[error("cannot spawn a tile: every cell is occupied")]
    BoardFull,
    /// The spawn gate saw a free cell but the spawn still failed.
    #[error(
        "spawn fault: {tiles} live tiles on a grid of {size} cells but no empty cell was found"
    )]
    SpawnFault { tiles: usize, size: usize },
    /// Explicit placement outside the grid.
    #[error("coordinate ({x}, {y}) is outside the grid")]
    OutOfBounds { x: usize, y: usize },
    /// Explicit placement onto a cell that already holds a tile.
    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: usize, y: usize },
    /// A text board could not be parsed.
    #[error("invalid board text: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
