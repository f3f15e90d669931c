//! # Tile Board
//!
//! Deterministic board core for a 2048-style sliding-tile puzzle: the grid
//! model, move resolution with single-merge-per-tile locking, the spawn
//! policy and game-over detection, sequenced by a per-turn state machine.
//!
//! Rendering, input capture and storage stay outside the crate. The core
//! computes board transitions and emits [`events::BoardEvent`]s for a
//! presentation layer to consume. The `play` binary is a small terminal
//! front end built on top.
//!
//! ## Modules
//! - `grid`: `Cell`, `Grid` and `Direction` with per-direction iteration order.
//! - `tile`: `Tile`, its merge lock, and the `TileStates` tier table.
//! - `board`: live tiles on a grid, spawning and the move engine.
//! - `round`: `RoundController`, the Idle/Resolving/Settling/SpawnCheck/GameOver machine.
//! - `score`: `ScoreStore` capability and the `Scoreboard`.
//! - `session`: a controller and scoreboard wired together.
//! - `config`: TOML-loadable `GameConfig`.
//! - `utils`: text board parsing for fixtures and tests.
//!
//! ## Example
//! ```
//! use tile_board::config::GameConfig;
//! use tile_board::grid::Direction;
//! use tile_board::round::{RoundController, RoundState};
//!
//! let cfg = GameConfig { seed: Some(42), ..GameConfig::default() };
//! let mut round = RoundController::from_config(&cfg).unwrap();
//! round.new_game().unwrap();
//! round.submit_move(Direction::Left);
//! let state = round.finish_settle().unwrap();
//! assert_ne!(state, RoundState::Settling);
//! assert!(round.board().is_consistent());
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod round;
pub mod score;
pub mod session;
pub mod tile;
pub mod utils;
