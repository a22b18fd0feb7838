use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
  Conflicts,
  Consensus,
  Differences,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
  Short,
  #[default]
  Medium,
  Long,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
  Bullets,
  #[default]
  Paragraph,
}

/// Output serialization format.
///
/// Unrecognized formats deserialize to `Other` and render as plain strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
  Json,
  Markdown,
  Text,
  Html,
  #[serde(other)]
  Other,
}

impl OutputFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      OutputFormat::Json => "json",
      OutputFormat::Markdown => "markdown",
      OutputFormat::Text => "text",
      OutputFormat::Html => "html",
      OutputFormat::Other => "other",
    }
  }
}
