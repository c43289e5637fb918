//! Runtime configuration.
//!
//! ```json
//! { "tickIntervalMs": 50, "playbackRate": 1.5 }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::error::{Result, RuntimeError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings of one live runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Period of playback and recording ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Playback speed multiplier.
    pub playback_rate: f64,
    /// Merge consecutive recorded events into one undo step.
    pub coalesce_recording: bool,
    /// Maximum number of snapshots kept by the undo/redo stack.
    pub max_history: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            playback_rate: 1.0,
            coalesce_recording: true,
            max_history: 1000,
        }
    }
}

impl RuntimeConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(RuntimeError::InvalidConfig(
                "tickIntervalMs must be positive".into(),
            ));
        }
        if !self.playback_rate.is_finite() || self.playback_rate <= 0.0 {
            return Err(RuntimeError::InvalidConfig(format!(
                "playbackRate must be finite and positive, got {}",
                self.playback_rate
            )));
        }
        if self.max_history == 0 {
            return Err(RuntimeError::InvalidConfig(
                "maxHistory must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| RuntimeError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// [`tick_interval_ms`](Self::tick_interval_ms) as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_override() {
        let config =
            RuntimeConfig::from_json_str(r#"{"playbackRate": 2.0, "coalesceRecording": false}"#)
                .unwrap();
        assert_eq!(config.playback_rate, 2.0);
        assert!(!config.coalesce_recording);
        assert_eq!(config.max_history, 1000);
    }

    #[test]
    fn test_rejects_bad_values() {
        for json in [
            r#"{"playbackRate": 0}"#,
            r#"{"playbackRate": -1.5}"#,
            r#"{"tickIntervalMs": 0}"#,
            r#"{"maxHistory": 0}"#,
            r#"{"tickRate": 10}"#,
            "[]",
        ] {
            assert!(
                matches!(RuntimeConfig::from_json_str(json), Err(RuntimeError::InvalidConfig(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");
        std::fs::write(&path, r#"{"tickIntervalMs": 20}"#).unwrap();
        assert_eq!(RuntimeConfig::load(&path).unwrap().tick_interval_ms, 20);
        assert!(matches!(
            RuntimeConfig::load(dir.path().join("missing.json")),
            Err(RuntimeError::Io(_))
        ));
    }
}
