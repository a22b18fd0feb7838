//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "default_provider": "ollama",
//!   "generation": { "temperature": 0.2 },
//!   "summary": { "short": 1 },
//!   "analyzer": { "numeric_threshold": 0.1 }
//! }
//! ```

use std::path::{Path, PathBuf};

use quorum_config::SummaryLength;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer::AnalyzerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub analyzer: AnalyzerConfig,
  pub summary: SummaryConfig,
  pub generation: GenerationDefaults,
  pub cancel_policy: CancelPolicy,
  /// Provider used for credential lookup when a model name has no `provider/` prefix.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_provider: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl EngineConfig {
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Load a JSON config file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&json).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Sentences kept per summary length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
  pub short: usize,
  pub medium: usize,
  pub long: usize,
}

impl Default for SummaryConfig {
  fn default() -> Self {
    Self {
      short: 2,
      medium: 4,
      long: 8,
    }
  }
}

impl SummaryConfig {
  pub fn sentences_for(&self, length: SummaryLength) -> usize {
    match length {
      SummaryLength::Short => self.short,
      SummaryLength::Medium => self.medium,
      SummaryLength::Long => self.long,
    }
  }
}

/// Generation settings used when a model call node does not set its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max_tokens: Option<u32>,
}

/// What happens to the in-flight node when a run is cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
  /// Let the node (and its provider calls) finish, then stop at the next boundary.
  #[default]
  Drain,
  /// Stop waiting for the node immediately; it is not recorded.
  Abort,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_config_keeps_defaults() {
    let config = EngineConfig::from_json(
      r#"{ "summary": { "short": 1 }, "analyzer": { "numeric_threshold": 0.1 }, "cancel_policy": "abort" }"#,
    )
    .unwrap();

    assert_eq!(config.summary.short, 1);
    assert_eq!(config.summary.medium, 4);
    assert_eq!(config.analyzer.numeric_threshold, 0.1);
    assert_eq!(config.analyzer.theme_count, 5);
    assert_eq!(config.cancel_policy, CancelPolicy::Abort);
    assert_eq!(config.default_provider, None);
  }

  #[test]
  fn test_load_reports_path() {
    let err = EngineConfig::load("/nonexistent/quorum.json").unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("/nonexistent/quorum.json"));
  }
}
