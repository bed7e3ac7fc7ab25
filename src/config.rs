//! Parser configuration
//!
//! [`ParserConfig`] can be built in code or loaded from YAML. Every field is
//! optional in the YAML form:
//!
//! ```rust
//! use sabr_stream::ParserConfig;
//!
//! let config = ParserConfig::from_yaml_str(
//!     "initial_state:\n  player_time_ms: 10000\n  is_live: true\nmax_part_size: 1048576\n",
//! )?;
//! assert!(config.initial_state.is_live);
//! assert_eq!(config.max_part_size, 1 << 20);
//! # Ok::<(), sabr_stream::StreamError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::SessionState;
use crate::ump::DEFAULT_MAX_PART_SIZE;
use crate::{Result, StreamError};

/// Construction parameters for a [`SabrStreamParser`](crate::SabrStreamParser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Session state the parser starts from.
    pub initial_state: SessionState,
    /// Largest payload a single UMP part may declare.
    pub max_part_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { initial_state: SessionState::default(), max_part_size: DEFAULT_MAX_PART_SIZE }
    }
}

impl ParserConfig {
    pub fn new(initial_state: SessionState) -> Self {
        Self { initial_state, ..Self::default() }
    }

    pub fn with_max_part_size(mut self, max_part_size: usize) -> Self {
        self.max_part_size = max_part_size;
        self
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| StreamError::config(format!("Failed to parse parser config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML document from disk.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StreamError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_part_size == 0 {
            return Err(StreamError::config("max_part_size must be greater than zero"));
        }
        if self.initial_state.is_live
            && self.initial_state.live_segment_target_duration_tolerance_ms == 0
        {
            return Err(StreamError::config(
                "live sessions need a non-zero live_segment_target_duration_tolerance_ms",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_LIVE_SEGMENT_TOLERANCE_MS;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ParserConfig::from_yaml_str("{}").expect("defaults");
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.max_part_size, DEFAULT_MAX_PART_SIZE);
        assert_eq!(
            config.initial_state.live_segment_target_duration_tolerance_ms,
            DEFAULT_LIVE_SEGMENT_TOLERANCE_MS
        );
    }

    #[test]
    fn live_state_round_trips_through_yaml() {
        let config = ParserConfig::new(SessionState::live(10_000, 500)).with_max_part_size(4096);
        let yaml = serde_yaml_ng::to_string(&config).expect("serialize");
        assert_eq!(ParserConfig::from_yaml_str(&yaml).expect("parse"), config);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let zero = ParserConfig::from_yaml_str("max_part_size: 0");
        assert!(matches!(zero, Err(StreamError::Config { .. })));

        let no_tolerance = ParserConfig::from_yaml_str(
            "initial_state:\n  is_live: true\n  live_segment_target_duration_tolerance_ms: 0\n",
        );
        assert!(matches!(no_tolerance, Err(StreamError::Config { .. })));

        let garbage = ParserConfig::from_yaml_str("max_part_size: [1, 2]");
        assert!(matches!(garbage, Err(StreamError::Config { .. })));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ParserConfig::from_yaml_file("/nonexistent/sabr-parser.yaml")
            .expect_err("file does not exist");
        match err {
            StreamError::File { path, .. } => {
                assert!(path.ends_with("sabr-parser.yaml"))
            }
            other => panic!("expected file error, got {:?}", other),
        }
    }
}
