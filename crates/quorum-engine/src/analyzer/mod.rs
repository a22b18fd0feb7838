//! Conflict and consensus analysis across model responses.
//!
//! This is a lexical heuristic, not a semantic model. It looks for:
//! - contradictions: opposite polarity within a word family (`is` / `is not`)
//! - numeric discrepancies: figures more than a threshold apart
//! - sentiment divergence: opposite positive/negative keyword majorities
//!
//! Consensus mode reports the most frequent significant words, and
//! differences mode reports the words only one response uses. All word
//! lists and thresholds come from [`AnalyzerConfig`].

mod config;
mod contradiction;
mod numeric;
mod sentiment;
mod text;
mod themes;

use std::collections::HashSet;

use quorum_config::ComparisonMode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{AnalyzerConfig, PolarityFamily};
pub use sentiment::Sentiment;
pub use themes::{DistinctiveTerms, Theme};

use contradiction::CompiledFamily;
use sentiment::SentimentLexicon;

/// One response to compare, labelled with the model (or node) that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelText {
  pub model: String,
  pub text: String,
}

impl ModelText {
  pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      model: model.into(),
      text: text.into(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
  Contradiction,
  NumericalDiscrepancy,
  SentimentConflict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
  #[serde(rename = "type")]
  pub kind: ConflictKind,
  pub severity: Severity,
  /// The two responses involved.
  pub models: Vec<String>,
  pub description: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub evidence: Vec<String>,
}

/// Aggregate view attached when conflicts were found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictSummary {
  pub total_conflicts: usize,
  /// Distinct normalized responses divided by total responses.
  pub divergence_ratio: f64,
  pub severity: Severity,
}

/// Structured output of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
  pub mode: ComparisonMode,
  pub responses_analyzed: usize,
  pub models: Vec<String>,
  #[serde(default)]
  pub conflicts: Vec<Conflict>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub common_themes: Option<Vec<Theme>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub distinctive_terms: Option<Vec<DistinctiveTerms>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub summary: Option<ConflictSummary>,
  /// Plain-text account of the findings, used when the report is rendered as text.
  pub narrative: String,
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
  #[error("at least 2 responses are needed for a comparison, found {found}")]
  NotEnoughResponses { found: usize },

  #[error("invalid word pattern in polarity family '{family}': {source}")]
  InvalidPattern {
    family: String,
    #[source]
    source: regex::Error,
  },
}

/// Compare `texts` according to `mode`.
pub fn analyze(
  texts: &[ModelText],
  mode: ComparisonMode,
  config: &AnalyzerConfig,
) -> Result<ComparisonReport, AnalyzerError> {
  if texts.len() < 2 {
    return Err(AnalyzerError::NotEnoughResponses { found: texts.len() });
  }

  let mut report = ComparisonReport {
    mode,
    responses_analyzed: texts.len(),
    models: texts.iter().map(|t| t.model.clone()).collect(),
    conflicts: Vec::new(),
    common_themes: None,
    distinctive_terms: None,
    summary: None,
    narrative: String::new(),
  };

  match mode {
    ComparisonMode::Conflicts => {
      report.conflicts = detect_conflicts(texts, config)?;
      if !report.conflicts.is_empty() {
        let ratio = divergence_ratio(texts);
        report.summary = Some(ConflictSummary {
          total_conflicts: report.conflicts.len(),
          divergence_ratio: ratio,
          severity: divergence_severity(ratio, config),
        });
      }
    }
    ComparisonMode::Consensus => {
      report.common_themes = Some(themes::common_themes(
        texts,
        config.max_ignored_word_length,
        config.theme_count,
      ));
    }
    ComparisonMode::Differences => {
      report.distinctive_terms = Some(themes::distinctive_terms(
        texts,
        config.max_ignored_word_length,
        config.distinctive_term_limit,
      ));
    }
  }

  report.narrative = narrate(&report);
  Ok(report)
}

fn detect_conflicts(
  texts: &[ModelText],
  config: &AnalyzerConfig,
) -> Result<Vec<Conflict>, AnalyzerError> {
  let families = config
    .polarity_families
    .iter()
    .map(CompiledFamily::compile)
    .collect::<Result<Vec<_>, _>>()?;
  let lexicon = SentimentLexicon::new(&config.positive_keywords, &config.negative_keywords);

  let mut conflicts = contradiction::detect(texts, &families);
  conflicts.extend(numeric::detect(texts, config.numeric_threshold));
  conflicts.extend(sentiment::detect(texts, &lexicon));
  Ok(conflicts)
}

/// Distinct normalized responses divided by total responses.
pub fn divergence_ratio(texts: &[ModelText]) -> f64 {
  if texts.is_empty() {
    return 0.0;
  }
  let distinct: HashSet<String> = texts.iter().map(|t| text::normalize(&t.text)).collect();
  distinct.len() as f64 / texts.len() as f64
}

fn divergence_severity(ratio: f64, config: &AnalyzerConfig) -> Severity {
  if ratio > config.high_divergence {
    Severity::High
  } else if ratio > config.medium_divergence {
    Severity::Medium
  } else {
    Severity::Low
  }
}

fn narrate(report: &ComparisonReport) -> String {
  let mut sentences = vec![format!(
    "Compared {} responses from {}.",
    report.responses_analyzed,
    report.models.join(", ")
  )];

  match report.mode {
    ComparisonMode::Conflicts if report.conflicts.is_empty() => {
      sentences.push("No conflicts were detected.".to_string());
    }
    ComparisonMode::Conflicts => {
      sentences.push(format!("Found {} conflict(s).", report.conflicts.len()));
      sentences.extend(report.conflicts.iter().map(|c| format!("{}.", c.description)));
    }
    ComparisonMode::Consensus => {
      let words: Vec<&str> = report
        .common_themes
        .iter()
        .flatten()
        .map(|t| t.word.as_str())
        .collect();
      if words.is_empty() {
        sentences.push("No common themes were found.".to_string());
      } else {
        sentences.push(format!("Common themes: {}.", words.join(", ")));
      }
    }
    ComparisonMode::Differences => {
      for entry in report.distinctive_terms.iter().flatten() {
        if !entry.terms.is_empty() {
          sentences.push(format!(
            "Only {} mentions: {}.",
            entry.model,
            entry.terms.join(", ")
          ));
        }
      }
    }
  }

  sentences.join(" ")
}
