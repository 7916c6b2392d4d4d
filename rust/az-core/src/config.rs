//! Configuration schema for search, playouts, matches and event logging.
//!
//! Every section and every field has a default, so a partial YAML file (or an empty one)
//! loads fine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::engine::DEFAULT_MAX_ROUND_TIMEOUT;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mcts: MctsSection,
    #[serde(default)]
    pub playout: PlayoutSection,
    #[serde(default, rename = "match")]
    pub match_: MatchSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// MCTS search settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MctsSection {
    /// Search steps per decision.
    #[serde(default = "default_budget")]
    pub budget: u32,
    /// Maximum sampled outcomes kept under one chance node.
    #[serde(default = "default_sampling_width")]
    pub sampling_width: u32,
    /// UCT exploration weight `w`.
    #[serde(default = "default_exploration_weight")]
    pub exploration_weight: f64,
}

fn default_budget() -> u32 {
    200
}

fn default_sampling_width() -> u32 {
    10
}

fn default_exploration_weight() -> f64 {
    std::f64::consts::FRAC_1_SQRT_2
}

impl Default for MctsSection {
    fn default() -> Self {
        Self {
            budget: default_budget(),
            sampling_width: default_sampling_width(),
            exploration_weight: default_exploration_weight(),
        }
    }
}

/// Random playout settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayoutSection {
    /// Rounds after which a playout is abandoned.
    #[serde(default = "default_max_round_timeout")]
    pub max_round_timeout: u32,
}

fn default_max_round_timeout() -> u32 {
    DEFAULT_MAX_ROUND_TIMEOUT
}

impl Default for PlayoutSection {
    fn default() -> Self {
        Self {
            max_round_timeout: default_max_round_timeout(),
        }
    }
}

/// Baseline opponent kind for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    #[default]
    Greedy,
    Random,
}

impl std::str::FromStr for OpponentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(OpponentKind::Greedy),
            "random" => Ok(OpponentKind::Random),
            other => Err(ConfigError::Invalid(format!(
                "unknown opponent {other:?} (expected greedy|random)"
            ))),
        }
    }
}

/// Match runner settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchSection {
    /// Number of games to play. Seats alternate every game.
    #[serde(default = "default_games")]
    pub games: u32,
    /// Base seed; per-game seeds are derived from it.
    #[serde(default)]
    pub seed: u64,
    /// Rounds after which a match game is abandoned as an error.
    #[serde(default = "default_max_rounds_per_game")]
    pub max_rounds_per_game: u32,
    #[serde(default)]
    pub opponent: OpponentKind,
}

fn default_games() -> u32 {
    20
}

fn default_max_rounds_per_game() -> u32 {
    DEFAULT_MAX_ROUND_TIMEOUT
}

impl Default for MatchSection {
    fn default() -> Self {
        Self {
            games: default_games(),
            seed: 0,
            max_rounds_per_game: default_max_rounds_per_game(),
            opponent: OpponentKind::default(),
        }
    }
}

/// NDJSON event log settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Where to append events. `None` disables event logging.
    #[serde(default)]
    pub events_path: Option<String>,
    /// Flush the writer after this many events.
    #[serde(default = "default_flush_every")]
    pub flush_every: u32,
}

fn default_flush_every() -> u32 {
    100
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            events_path: None,
            flush_every: default_flush_every(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mcts.sampling_width == 0 {
            return Err(ConfigError::Invalid("mcts.sampling_width must be >= 1".into()));
        }
        if !self.mcts.exploration_weight.is_finite() || self.mcts.exploration_weight < 0.0 {
            return Err(ConfigError::Invalid(
                "mcts.exploration_weight must be finite and >= 0".into(),
            ));
        }
        if self.playout.max_round_timeout == 0 {
            return Err(ConfigError::Invalid(
                "playout.max_round_timeout must be >= 1".into(),
            ));
        }
        if self.match_.max_rounds_per_game == 0 {
            return Err(ConfigError::Invalid(
                "match.max_rounds_per_game must be >= 1".into(),
            ));
        }
        if self.logging.flush_every == 0 {
            return Err(ConfigError::Invalid("logging.flush_every must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_yaml() {
        let config =
            Config::load("../../configs/default.yaml").expect("Failed to load configs/default.yaml");

        assert_eq!(config.mcts.budget, 200);
        assert_eq!(config.mcts.sampling_width, 10);
        assert!((config.mcts.exploration_weight - 0.7071).abs() < 1e-3);
        assert_eq!(config.playout.max_round_timeout, 100);
        assert_eq!(config.match_.games, 20);
        assert_eq!(config.match_.seed, 0);
        assert_eq!(config.match_.opponent, OpponentKind::Greedy);
        assert_eq!(config.logging.events_path, None);
        assert_eq!(config.logging.flush_every, 100);
    }

    #[test]
    fn test_parse_yaml_string_applies_defaults() {
        let yaml = r#"
mcts:
  budget: 50
match:
  games: 4
  opponent: random
"#;

        let config = Config::from_yaml(yaml).expect("Failed to parse YAML");
        assert_eq!(config.mcts.budget, 50);
        assert_eq!(config.match_.games, 4);
        assert_eq!(config.match_.opponent, OpponentKind::Random);
        // Defaults fill the rest.
        assert_eq!(config.mcts.sampling_width, 10);
        assert_eq!(config.playout.max_round_timeout, 100);
        assert_eq!(config.logging, LoggingSection::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let invalid_yaml = "this is not: valid: yaml: {{{}}}";
        assert!(matches!(
            Config::from_yaml(invalid_yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_zero_sampling_width_is_rejected() {
        let err = Config::from_yaml("mcts:\n  sampling_width: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_opponent_from_str() {
        assert_eq!("greedy".parse::<OpponentKind>().unwrap(), OpponentKind::Greedy);
        assert!("minimax".parse::<OpponentKind>().is_err());
    }
}
