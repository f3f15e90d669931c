//! Per-turn state machine.
//!
//! ```text
//! Idle -> Resolving -> Settling -> SpawnCheck -> GameOver
//!            |                         |
//!            +--> Idle (no change)     +--> Idle
//! ```
//!
//! Resolving and SpawnCheck run synchronously inside a single call. Settling
//! is a timed hold: input is rejected until the settle deadline passes and
//! [`RoundController::poll`] (or [`RoundController::finish_settle`]) completes
//! the turn.
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, MoveOutcome};
use crate::config::GameConfig;
use crate::error::{BoardError, ConfigError};
use crate::events::BoardEvent;
use crate::grid::Direction;
use crate::tile::Tile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// Accepting a new move.
    Idle,
    /// The move engine is running.
    Resolving,
    /// Waiting for the settle delay; moves are ignored.
    Settling,
    /// Unlocked and deciding whether to spawn.
    SpawnCheck,
    /// Terminal until the next [`RoundController::new_game`].
    GameOver,
}

/// What happened to a submitted move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStatus {
    /// The controller was not idle.
    Ignored,
    /// The direction had no effect. Nothing spawns and the game-over check
    /// does not run.
    NoChange,
    /// The board changed and the controller is now settling.
    Changed(MoveOutcome),
}

/// Owns the board and sequences each turn.
pub struct RoundController<R = SmallRng> {
    board: Board,
    rng: R,
    state: RoundState,
    settle_duration: Duration,
    settle_deadline: Option<Instant>,
    events: Vec<BoardEvent>,
}

impl RoundController<SmallRng> {
    /// Builds an empty board from `cfg`. Call [`RoundController::new_game`]
    /// to place the opening tiles.
    pub fn from_config(cfg: &GameConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let board = Board::new(cfg.width, cfg.height, cfg.tile_states());
        Ok(RoundController::new(board, rng, cfg.settle_duration()))
    }
}

impl<R: Rng> RoundController<R> {
    /// Wraps an existing board. The controller starts `Idle` so prepared
    /// positions can be played directly.
    pub fn new(board: Board, rng: R, settle_duration: Duration) -> Self {
        RoundController {
            board,
            rng,
            state: RoundState::Idle,
            settle_duration,
            settle_deadline: None,
            events: Vec::new(),
        }
    }

    /// The board being played.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current phase of the turn. Only `Idle` accepts moves.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Returns `true` once the board is stuck, until the next new game.
    pub fn is_game_over(&self) -> bool {
        self.state == RoundState::GameOver
    }

    /// Length of the input hold after an effective move.
    pub fn settle_duration(&self) -> Duration {
        self.settle_duration
    }

    /// Time left before a settling turn may complete.
    pub fn settle_remaining(&self, now: Instant) -> Option<Duration> {
        self.settle_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Takes all events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    /// Clears the board, spawns two tier-0 tiles and returns to `Idle`.
    pub fn new_game(&mut self) -> Result<(), BoardError> {
        self.board.clear();
        self.settle_deadline = None;
        self.state = RoundState::Idle;
        for _ in 0..2 {
            self.spawn()?;
        }
        info!(
            "new game on a {}x{} board",
            self.board.width(),
            self.board.height()
        );
        Ok(())
    }

    /// Submits a move using the current time as the start of the settle hold.
    pub fn submit_move(&mut self, direction: Direction) -> MoveStatus {
        self.submit_move_at(direction, Instant::now())
    }

    /// Runs the move engine if idle. A changed board enters `Settling` until
    /// `now + settle_duration`.
    ///
    /// # Arguments
    /// * `direction`: Direction to slide every tile in.
    /// * `now`: Start of the settle hold.
    ///
    /// # Returns
    /// [`MoveStatus::Ignored`] outside `Idle`, [`MoveStatus::NoChange`] when
    /// nothing could move, otherwise the outcome of the move.
    pub fn submit_move_at(&mut self, direction: Direction, now: Instant) -> MoveStatus {
        if self.state != RoundState::Idle {
            debug!("ignoring {:?} while {:?}", direction, self.state);
            return MoveStatus::Ignored;
        }

        self.state = RoundState::Resolving;
        let outcome = self.board.move_tiles(direction, &mut self.events);

        if !outcome.changed {
            self.state = RoundState::Idle;
            return MoveStatus::NoChange;
        }

        self.state = RoundState::Settling;
        self.settle_deadline = Some(now + self.settle_duration);
        MoveStatus::Changed(outcome)
    }

    /// Completes a settling turn once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Result<RoundState, BoardError> {
        match self.settle_deadline {
            Some(deadline) if self.state == RoundState::Settling && now >= deadline => {
                self.finish_settle()
            }
            _ => Ok(self.state),
        }
    }

    /// Ends the settle hold immediately: unlocks every tile, spawns a tile
    /// if a cell is free, then checks for game over.
    ///
    /// Does nothing outside `Settling`.
    ///
    /// # Errors
    /// [`BoardError::SpawnFault`] if a free cell existed but no tile could
    /// be spawned. The controller returns to `Idle`.
    pub fn finish_settle(&mut self) -> Result<RoundState, BoardError> {
        if self.state != RoundState::Settling {
            return Ok(self.state);
        }
        self.settle_deadline = None;
        self.board.unlock_all();

        self.state = RoundState::SpawnCheck;
        let tiles = self.board.tile_count();
        let size = self.board.size();
        if tiles < size && self.spawn().is_err() {
            warn!("spawn failed with {} of {} cells occupied", tiles, size);
            self.state = RoundState::Idle;
            return Err(BoardError::SpawnFault { tiles, size });
        }

        if self.board.check_for_game_over() {
            info!("game over with {} tiles on the board", self.board.tile_count());
            self.events.push(BoardEvent::GameOver);
            self.state = RoundState::GameOver;
        } else {
            self.state = RoundState::Idle;
        }
        Ok(self.state)
    }

    fn spawn(&mut self) -> Result<Tile, BoardError> {
        let tile = self.board.spawn_tile(&mut self.rng)?;
        let Some(cell) = tile.cell() else {
            warn!("spawned tile {:?} is not linked to a cell", tile.id());
            return Err(BoardError::SpawnFault {
                tiles: self.board.tile_count(),
                size: self.board.size(),
            });
        };
        self.events.push(BoardEvent::TileSpawned {
            tile: tile.id(),
            cell,
            tier: tile.tier(),
        });
        Ok(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    fn controller(rows: &[&str]) -> RoundController {
        let board = board_from_str_array(rows).unwrap();
        RoundController::new(board, SmallRng::seed_from_u64(1), Duration::from_millis(100))
    }

    #[test]
    fn test_new_game_spawns_two_tiles() {
        let cfg = GameConfig { seed: Some(514514), ..GameConfig::default() };
        let mut round = RoundController::from_config(&cfg).unwrap();
        round.new_game().unwrap();
        assert_eq!(round.state(), RoundState::Idle);
        assert_eq!(round.board().tile_count(), 2);
        assert!(round.board().tiles().all(|tile| tile.tier() == 0));
        let events = round.drain_events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, BoardEvent::TileSpawned { tier: 0, .. })));
        for event in &events {
            if let BoardEvent::TileSpawned { tile, cell, .. } = event {
                let placed = round.board().tile(*tile).unwrap();
                assert_eq!(placed.cell(), Some(*cell), "spawn event must report the real cell");
            }
        }
    }

    #[test]
    fn test_new_game_resets_board() {
        let mut round = controller(&["0 1 2", "3 4 5"]);
        round.new_game().unwrap();
        assert_eq!(round.board().tile_count(), 2);
        assert!(round.board().is_consistent());
    }

    #[test]
    fn test_same_seed_same_game() {
        let cfg = GameConfig { seed: Some(9), ..GameConfig::default() };
        let mut a = RoundController::from_config(&cfg).unwrap();
        let mut b = RoundController::from_config(&cfg).unwrap();
        a.new_game().unwrap();
        b.new_game().unwrap();
        for direction in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            a.submit_move(direction);
            b.submit_move(direction);
            a.finish_settle().unwrap();
            b.finish_settle().unwrap();
        }
        assert_eq!(a.board(), b.board());
    }

    #[test]
    fn test_effective_move_settles_then_spawns() {
        let mut round = controller(&[
            "0 0 . .",
            ". . . .",
            ". . . .",
            ". . . .",
        ]);
        let start = Instant::now();

        let status = round.submit_move_at(Direction::Left, start);
        match status {
            MoveStatus::Changed(outcome) => assert_eq!(outcome.score_delta, 4),
            other => panic!("expected change, got {:?}", other),
        }
        assert_eq!(round.state(), RoundState::Settling);
        assert!(round.board().tile_at(0, 0).unwrap().is_locked());

        // Input is rejected while settling.
        assert_eq!(round.submit_move_at(Direction::Right, start), MoveStatus::Ignored);
        assert_eq!(round.poll(start + Duration::from_millis(50)).unwrap(), RoundState::Settling);

        assert_eq!(round.poll(start + Duration::from_millis(100)).unwrap(), RoundState::Idle);
        assert_eq!(round.board().tile_count(), 2, "one tile merged away, one spawned");
        assert!(round.board().tiles().all(|tile| !tile.is_locked()));

        let events = round.drain_events();
        assert!(matches!(events[0], BoardEvent::TileMerged { tier: 1, score_delta: 4, .. }));
        assert!(matches!(events[1], BoardEvent::TileSpawned { tier: 0, .. }));
    }

    #[test]
    fn test_no_op_move_does_not_spawn() {
        let mut round = controller(&[
            "0 1 . .",
            ". . . .",
        ]);
        let before = round.board().clone();
        assert_eq!(round.submit_move(Direction::Left), MoveStatus::NoChange);
        assert_eq!(round.state(), RoundState::Idle);
        assert_eq!(round.board(), &before);
        assert!(round.drain_events().is_empty());
    }

    #[test]
    fn test_no_op_on_full_stuck_board_skips_game_over_check() {
        let mut round = controller(&[
            "0 1 0 1",
            "1 0 1 0",
            "0 1 0 1",
            "1 0 1 0",
        ]);
        for direction in Direction::ALL {
            assert_eq!(round.submit_move(direction), MoveStatus::NoChange);
        }
        assert_eq!(round.state(), RoundState::Idle);
        assert!(round.drain_events().is_empty(), "game over must not fire on a no-op move");
    }

    #[test]
    fn test_game_over_after_final_spawn() {
        // Sliding row 0 left leaves (3,0) as the only free cell; the tier-0
        // spawn there completes a board with no equal neighbours.
        let mut round = controller(&[
            ". 1 2 1",
            "2 1 2 1",
            "1 2 1 2",
            "2 1 2 1",
        ]);
        assert!(matches!(round.submit_move(Direction::Left), MoveStatus::Changed(_)));
        assert_eq!(round.finish_settle().unwrap(), RoundState::GameOver);
        assert!(round.is_game_over());
        assert_eq!(round.board().tier_at(3, 0), Some(0));

        let events = round.drain_events();
        assert_eq!(events.last(), Some(&BoardEvent::GameOver));

        let before = round.board().clone();
        for direction in Direction::ALL {
            assert_eq!(round.submit_move(direction), MoveStatus::Ignored);
        }
        assert_eq!(round.board(), &before);
        assert!(round.drain_events().is_empty());

        round.new_game().unwrap();
        assert_eq!(round.state(), RoundState::Idle);
    }

    #[test]
    fn test_full_board_with_merge_available_keeps_playing() {
        let mut round = controller(&[
            "0 0 1",
            "1 2 3",
        ]);
        assert!(matches!(round.submit_move(Direction::Right), MoveStatus::Changed(_)));
        assert_eq!(round.finish_settle().unwrap(), RoundState::Idle);
        assert!(round.board().is_full());
    }

    #[test]
    fn test_finish_settle_outside_settling_is_noop() {
        let mut round = controller(&["0 . ."]);
        assert_eq!(round.finish_settle().unwrap(), RoundState::Idle);
        assert_eq!(round.board().tile_count(), 1);
        assert_eq!(round.poll(Instant::now()).unwrap(), RoundState::Idle);
    }

    #[test]
    fn test_settle_remaining() {
        let mut round = controller(&["0 . ."]);
        let start = Instant::now();
        assert_eq!(round.settle_remaining(start), None);
        round.submit_move_at(Direction::Right, start);
        assert_eq!(
            round.settle_remaining(start + Duration::from_millis(30)),
            Some(Duration::from_millis(70))
        );
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let cfg = GameConfig { width: 1, height: 1, ..GameConfig::default() };
        assert!(RoundController::from_config(&cfg).is_err());
    }
}
