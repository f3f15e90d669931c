//! Current score, best score and the storage the best score lives in.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ConfigError;
use crate::events::BoardEvent;

/// Key the best score is stored under.
pub const BEST_SCORE_KEY: &str = "BestScore";

/// Keyed integer storage owned outside the game core.
pub trait ScoreStore {
    /// Value stored under `key`, or `default` if nothing is.
    fn get(&self, key: &str, default: u32) -> u32;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: u32);
    /// Flushes pending writes. In-memory stores have nothing to do.
    fn save(&mut self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Store that forgets everything when dropped.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, u32>,
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
    }
}

/// Store backed by a flat TOML table of `key = value` pairs.
///
/// Writes are kept in memory until [`ScoreStore::save`].
#[derive(Clone, Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    values: BTreeMap<String, u32>,
}

impl TomlFileStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(TomlFileStore { path, values })
    }
}

impl ScoreStore for TomlFileStore {
    fn get(&self, key: &str, default: u32) -> u32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), ConfigError> {
        let raw = toml::to_string(&self.values)
            .map_err(|e| ConfigError::Invalid(format!("cannot serialize scores: {}", e)))?;
        std::fs::write(&self.path, raw)?;
        debug!("saved scores to {}", self.path.display());
        Ok(())
    }
}

/// Running score for one game plus the persisted best.
pub struct Scoreboard<S> {
    store: S,
    score: u32,
    best: u32,
}

impl<S: ScoreStore> Scoreboard<S> {
    /// Starts at zero with the best score read from `store`.
    pub fn new(store: S) -> Self {
        let best = store.get(BEST_SCORE_KEY, 0);
        Scoreboard { store, score: 0, best }
    }

    /// Score of the current game.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score seen, including the current game.
    pub fn best(&self) -> u32 {
        self.best
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resets the score and re-reads the best from the store.
    pub fn new_game(&mut self) {
        self.best = self.store.get(BEST_SCORE_KEY, 0);
        self.set_score(0);
    }

    /// Adds `value` to the score, saturating at `u32::MAX`, and records a
    /// new best if it was exceeded.
    pub fn increase(&mut self, value: u32) {
        self.set_score(self.score.saturating_add(value));
    }

    /// Adds the score delta of merge events; other events are ignored.
    pub fn apply(&mut self, event: &BoardEvent) {
        if let BoardEvent::TileMerged { score_delta, .. } = event {
            self.increase(*score_delta);
        }
    }

    /// Flushes the store. Failures are logged, not fatal.
    pub fn save(&mut self) {
        if let Err(e) = self.store.save() {
            warn!("failed to save best score: {}", e);
        }
    }

    fn set_score(&mut self, value: u32) {
        self.score = value;
        if self.score > self.store.get(BEST_SCORE_KEY, 0) {
            self.store.set(BEST_SCORE_KEY, self.score);
            self.best = self.score;
        }
    }
}
