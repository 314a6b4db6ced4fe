use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

/// Knobs for self-play generation. Defaults match the published datasets.
///
/// - `engine_radius`: radius of the board each game is played on.
/// - `queue_size`: pieces available to choose from every turn.
/// - `significant_choices`: ranked placements stored per sample.
/// - `remove_head` / `remove_tail`: share of each game's samples dropped
///   from the start / end of every game.
/// - `move_dropout`: probability of skipping a turn's sample.
/// - `max_turns`: optional hard cap on turns per game (None plays to the end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub engine_radius: usize,
    pub queue_size: usize,
    pub significant_choices: usize,
    pub remove_head: f64,
    pub remove_tail: f64,
    pub move_dropout: f64,
    pub max_turns: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            engine_radius: 5,
            queue_size: 3,
            significant_choices: 7,
            remove_head: 0.0,
            remove_tail: 0.05,
            move_dropout: 0.05,
            max_turns: None,
        }
    }
}

impl GeneratorConfig {
    /// Read a JSON object; missing keys keep their defaults.
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let cfg: GeneratorConfig = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.engine_radius == 0 {
            return invalid("engine_radius", "must be at least 1");
        }
        if self.queue_size == 0 {
            return invalid("queue_size", "must be at least 1");
        }
        if self.significant_choices == 0 {
            return invalid("significant_choices", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.remove_head) {
            return invalid("remove_head", "must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.remove_tail) {
            return invalid("remove_tail", "must be within [0, 1]");
        }
        if self.remove_head + self.remove_tail > 1.0 {
            return invalid("remove_tail", "remove_head + remove_tail must not exceed 1");
        }
        if !(0.0..1.0).contains(&self.move_dropout) {
            return invalid("move_dropout", "must be within [0, 1)");
        }
        if self.max_turns == Some(0) {
            return invalid("max_turns", "must be at least 1 when set");
        }
        Ok(())
    }

    /// Range of a game's `len` samples kept after head/tail trimming.
    pub fn kept_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = (len as f64 * self.remove_head) as usize;
        let end = (len as f64 * (1.0 - self.remove_tail)) as usize;
        start.min(end)..end.min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let cfg = GeneratorConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.engine_radius, 5);
        assert_eq!(cfg.significant_choices, 7);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            GeneratorConfig { engine_radius: 0, ..Default::default() },
            GeneratorConfig { queue_size: 0, ..Default::default() },
            GeneratorConfig { remove_head: -0.1, ..Default::default() },
            GeneratorConfig { remove_head: 0.6, remove_tail: 0.5, ..Default::default() },
            GeneratorConfig { move_dropout: 1.0, ..Default::default() },
            GeneratorConfig { move_dropout: f64::NAN, ..Default::default() },
            GeneratorConfig { max_turns: Some(0), ..Default::default() },
        ];
        for cfg in cases {
            assert!(matches!(cfg.validate(), Err(ConfigError::Invalid { .. })), "{cfg:?}");
        }
    }

    #[test]
    fn kept_range_trims_head_and_tail() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.kept_range(100), 0..95);
        assert_eq!(cfg.kept_range(1), 0..0);
        assert_eq!(cfg.kept_range(0), 0..0);
        let cfg = GeneratorConfig { remove_head: 0.1, remove_tail: 0.0, ..Default::default() };
        assert_eq!(cfg.kept_range(20), 2..20);
    }

    #[test]
    fn json_overrides_defaults() {
        let tmp = NamedTempFile::new().unwrap();
        fs::write(tmp.path(), r#"{ "engine_radius": 3, "move_dropout": 0.0 }"#).unwrap();
        let cfg = GeneratorConfig::from_json_path(tmp.path()).unwrap();
        assert_eq!(cfg.engine_radius, 3);
        assert_eq!(cfg.move_dropout, 0.0);
        assert_eq!(cfg.queue_size, 3);

        fs::write(tmp.path(), r#"{ "radius": 3 }"#).unwrap();
        assert!(matches!(GeneratorConfig::from_json_path(tmp.path()), Err(ConfigError::Json(_))));
    }
}
