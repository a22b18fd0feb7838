use serde::{Deserialize, Serialize};

/// Tuning knobs for the response analyzer.
///
/// The keyword lists and thresholds are heuristics. Adjust them per
/// deployment rather than expecting them to be accurate out of the box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
  /// Word families whose affirmative and negated forms signal a contradiction.
  pub polarity_families: Vec<PolarityFamily>,
  pub positive_keywords: Vec<String>,
  pub negative_keywords: Vec<String>,
  /// Relative difference above which two numbers disagree (0.2 = 20%).
  pub numeric_threshold: f64,
  /// Words with at most this many characters are ignored for themes.
  pub max_ignored_word_length: usize,
  /// How many common themes consensus mode reports.
  pub theme_count: usize,
  /// How many distinctive terms differences mode reports per response.
  pub distinctive_term_limit: usize,
  /// Divergence ratio above which the overall severity is high.
  pub high_divergence: f64,
  /// Divergence ratio above which the overall severity is medium.
  pub medium_divergence: f64,
}

/// Affirmative words and their negated forms, e.g. `is` / `is not`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarityFamily {
  pub name: String,
  pub affirmative: Vec<String>,
  pub negated: Vec<String>,
}

impl PolarityFamily {
  fn new(name: &str, affirmative: &[&str], negated: &[&str]) -> Self {
    Self {
      name: name.to_string(),
      affirmative: strings(affirmative),
      negated: strings(negated),
    }
  }
}

fn strings(words: &[&str]) -> Vec<String> {
  words.iter().map(|w| w.to_string()).collect()
}

impl Default for AnalyzerConfig {
  fn default() -> Self {
    Self {
      polarity_families: vec![
        PolarityFamily::new(
          "affirmation",
          &["is", "are", "was", "were"],
          &[
            "is not", "are not", "was not", "were not", "isn't", "aren't", "wasn't", "weren't",
          ],
        ),
        PolarityFamily::new(
          "modal",
          &["can", "will", "should"],
          &[
            "cannot",
            "can not",
            "can't",
            "will not",
            "won't",
            "should not",
            "shouldn't",
          ],
        ),
        PolarityFamily::new("yes_no", &["yes", "true"], &["no", "false"]),
      ],
      positive_keywords: strings(&[
        "good",
        "great",
        "excellent",
        "positive",
        "beneficial",
        "benefit",
        "advantage",
        "success",
        "successful",
        "effective",
        "improve",
        "improved",
        "better",
        "best",
        "strong",
      ]),
      negative_keywords: strings(&[
        "bad",
        "poor",
        "negative",
        "harmful",
        "disadvantage",
        "failure",
        "failed",
        "ineffective",
        "worse",
        "worst",
        "weak",
        "risk",
        "risky",
        "problem",
        "decline",
      ]),
      numeric_threshold: 0.2,
      max_ignored_word_length: 4,
      theme_count: 5,
      distinctive_term_limit: 10,
      high_divergence: 0.7,
      medium_divergence: 0.4,
    }
  }
}
