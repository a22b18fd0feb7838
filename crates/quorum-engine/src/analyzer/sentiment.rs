use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::text::words;
use super::{Conflict, ConflictKind, ModelText, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
  Positive,
  Negative,
  Neutral,
}

pub(crate) struct SentimentLexicon {
  positive: HashSet<String>,
  negative: HashSet<String>,
}

impl SentimentLexicon {
  pub(crate) fn new(positive: &[String], negative: &[String]) -> Self {
    let set = |words: &[String]| words.iter().map(|w| w.to_lowercase()).collect();
    Self {
      positive: set(positive),
      negative: set(negative),
    }
  }

  /// Majority of keyword hits; ties are neutral.
  pub(crate) fn classify(&self, text: &str) -> Sentiment {
    let tokens = words(text);
    let positive = tokens.iter().filter(|w| self.positive.contains(*w)).count();
    let negative = tokens.iter().filter(|w| self.negative.contains(*w)).count();

    if positive > negative {
      Sentiment::Positive
    } else if negative > positive {
      Sentiment::Negative
    } else {
      Sentiment::Neutral
    }
  }
}

pub(crate) fn detect(texts: &[ModelText], lexicon: &SentimentLexicon) -> Vec<Conflict> {
  let sentiments: Vec<Sentiment> = texts.iter().map(|t| lexicon.classify(&t.text)).collect();

  let mut conflicts = Vec::new();
  for i in 0..texts.len() {
    for j in (i + 1)..texts.len() {
      let opposite = matches!(
        (sentiments[i], sentiments[j]),
        (Sentiment::Positive, Sentiment::Negative) | (Sentiment::Negative, Sentiment::Positive)
      );
      if opposite {
        conflicts.push(Conflict {
          kind: ConflictKind::SentimentConflict,
          severity: Severity::Low,
          models: vec![texts[i].model.clone(), texts[j].model.clone()],
          description: format!(
            "{} and {} differ in tone",
            texts[i].model, texts[j].model
          ),
          evidence: vec![format!(
            "{:?} vs {:?}",
            sentiments[i], sentiments[j]
          )
          .to_lowercase()],
        });
      }
    }
  }
  conflicts
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analyzer::AnalyzerConfig;

  fn lexicon() -> SentimentLexicon {
    let config = AnalyzerConfig::default();
    SentimentLexicon::new(&config.positive_keywords, &config.negative_keywords)
  }

  #[test]
  fn test_classify_by_majority() {
    let lex = lexicon();
    assert_eq!(lex.classify("A great and effective plan"), Sentiment::Positive);
    assert_eq!(lex.classify("A poor plan with real risk"), Sentiment::Negative);
    assert_eq!(lex.classify("Good idea, bad timing"), Sentiment::Neutral);
  }

  #[test]
  fn test_opposite_tone_is_low_severity() {
    let texts = vec![
      ModelText::new("a", "This is an excellent approach"),
      ModelText::new("b", "This is a harmful approach"),
    ];
    let conflicts = detect(&texts, &lexicon());
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].severity, Severity::Low);
    assert_eq!(conflicts[0].evidence, vec!["positive vs negative"]);
  }
}
