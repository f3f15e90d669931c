//! Composition root: one round controller plus the scoreboard fed by it.
use std::time::Instant;

use rand::Rng;

use crate::error::BoardError;
use crate::events::BoardEvent;
use crate::grid::Direction;
use crate::round::{MoveStatus, RoundController, RoundState};
use crate::score::{ScoreStore, Scoreboard};

/// A playable game.
///
/// Every event the controller emits passes through the scoreboard before it
/// is handed back to the caller, so the score is always current when a
/// presentation layer sees a merge. The best score is flushed to the store
/// when the game ends.
pub struct Session<S, R> {
    round: RoundController<R>,
    scoreboard: Scoreboard<S>,
}

impl<S: ScoreStore, R: Rng> Session<S, R> {
    /// Wraps `round`, reading the best score from `store`.
    pub fn new(round: RoundController<R>, store: S) -> Self {
        Session {
            round,
            scoreboard: Scoreboard::new(store),
        }
    }

    /// The underlying controller, for board and state queries.
    pub fn round(&self) -> &RoundController<R> {
        &self.round
    }

    pub fn scoreboard(&self) -> &Scoreboard<S> {
        &self.scoreboard
    }

    /// Score of the current game.
    pub fn score(&self) -> u32 {
        self.scoreboard.score()
    }

    /// Best score, including the current game.
    pub fn best(&self) -> u32 {
        self.scoreboard.best()
    }

    /// Resets the score and starts a fresh board.
    pub fn new_game(&mut self) -> Result<Vec<BoardEvent>, BoardError> {
        self.scoreboard.new_game();
        self.round.drain_events();
        self.round.new_game()?;
        Ok(self.collect_events())
    }

    /// Forwards a move. Events from the resolved move are returned with the
    /// status; spawn and game-over events arrive from [`Session::poll`].
    pub fn submit_move(&mut self, direction: Direction) -> (MoveStatus, Vec<BoardEvent>) {
        let status = self.round.submit_move(direction);
        (status, self.collect_events())
    }

    /// Advances the round once the settle delay has passed at `now`.
    ///
    /// # Returns
    /// The state after the call and any spawn or game-over events it produced.
    pub fn poll(&mut self, now: Instant) -> Result<(RoundState, Vec<BoardEvent>), BoardError> {
        let state = self.round.poll(now)?;
        Ok((state, self.collect_events()))
    }

    /// Ends the settle delay immediately. See [`RoundController::finish_settle`].
    pub fn finish_settle(&mut self) -> Result<(RoundState, Vec<BoardEvent>), BoardError> {
        let state = self.round.finish_settle()?;
        Ok((state, self.collect_events()))
    }

    /// Flushes the best score to the store.
    pub fn save(&mut self) {
        self.scoreboard.save();
    }

    fn collect_events(&mut self) -> Vec<BoardEvent> {
        let events = self.round.drain_events();
        for event in &events {
            self.scoreboard.apply(event);
            if *event == BoardEvent::GameOver {
                self.scoreboard.save();
            }
        }
        events
    }
}
