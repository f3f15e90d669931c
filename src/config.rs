//! Static game configuration, supplied at construction time.
use std::io::Read;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::tile::{TileState, TileStates};

/// Board dimensions, settle delay, RNG seed and the tier table.
///
/// Every field is optional in TOML; missing fields take the classic 4x4
/// defaults.
///
/// ```
/// use tile_board::config::GameConfig;
/// let cfg: GameConfig = toml::from_str("width = 5\nseed = 7").unwrap();
/// assert_eq!(cfg.width, 5);
/// assert_eq!(cfg.height, 4);
/// assert_eq!(cfg.seed, Some(7));
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GameConfig {
    #[serde(default = "defaults::side")]
    pub width: usize,
    #[serde(default = "defaults::side")]
    pub height: usize,
    /// How long input is held off after an effective move.
    #[serde(default = "defaults::settle_ms")]
    pub settle_ms: u64,
    /// Seed for the spawn RNG. Unseeded games draw from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Tier table, smallest tile first. Empty means the classic table.
    #[serde(default)]
    pub tile_states: Vec<TileState>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: defaults::side(),
            height: defaults::side(),
            settle_ms: defaults::settle_ms(),
            seed: None,
            tile_states: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn from_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = std::fs::File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let cfg: Self = toml::from_str(&contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects boards that cannot host a new game (fewer than two cells).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "board dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width * self.height < 2 {
            return Err(ConfigError::Invalid(
                "board needs at least two cells for the opening tiles".to_string(),
            ));
        }
        Ok(())
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// The configured tier table, or the classic one if none was given.
    pub fn tile_states(&self) -> TileStates {
        TileStates::new(self.tile_states.clone()).unwrap_or_default()
    }
}

mod defaults {
    pub fn side() -> usize {
        4
    }
    pub fn settle_ms() -> u64 {
        100
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = GameConfig::default();
        assert_eq!((cfg.width, cfg.height), (4, 4));
        assert_eq!(cfg.settle_duration(), Duration::from_millis(100));
        assert_eq!(cfg.tile_states(), TileStates::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_tile_states() {
        let cfg: GameConfig = toml::from_str(
            r##"
            width = 3
            height = 3
            settle_ms = 0

            [[tile_states]]
            number = 1

            [[tile_states]]
            number = 3
            background = "#123456"
            text = "#ffffff"
            "##,
        )
        .unwrap();
        let states = cfg.tile_states();
        assert_eq!(states.len(), 2);
        assert_eq!(states.value(1), 3);
        assert_eq!(states.get(1).background, "#123456");
        assert_eq!(cfg.settle_duration(), Duration::ZERO);
    }

    #[test]
    fn test_validate_rejects_tiny_boards() {
        let zero = GameConfig { width: 0, ..GameConfig::default() };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));
        let single = GameConfig { width: 1, height: 1, ..GameConfig::default() };
        assert!(matches!(single.validate(), Err(ConfigError::Invalid(_))));
        let strip = GameConfig { width: 1, height: 2, ..GameConfig::default() };
        assert!(strip.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let path = std::env::temp_dir().join(format!("tile_board_cfg_{}.toml", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "width = 6\nheight = 5\nseed = 42").unwrap();
        }
        let cfg = GameConfig::from_toml(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!((cfg.width, cfg.height, cfg.seed), (6, 5, Some(42)));
    }

    #[test]
    fn test_from_toml_errors() {
        let missing = GameConfig::from_toml("/nonexistent/tile_board.toml");
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        let path = std::env::temp_dir().join(format!("tile_board_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "width = \"wide\"").unwrap();
        let bad = GameConfig::from_toml(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(bad, Err(ConfigError::Toml(_))));
    }
}
