use regex::Regex;

use super::config::PolarityFamily;
use super::text::straighten_quotes;
use super::{AnalyzerError, Conflict, ConflictKind, ModelText, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
  Affirmative,
  Negated,
}

impl Polarity {
  fn label(self) -> &'static str {
    match self {
      Polarity::Affirmative => "affirmative",
      Polarity::Negated => "negated",
    }
  }
}

/// A polarity family compiled to regexes.
pub(crate) struct CompiledFamily {
  name: String,
  /// Matches an affirmative word; group 1 is set when it is immediately negated.
  affirmative: Regex,
  negated: Regex,
}

impl CompiledFamily {
  pub(crate) fn compile(family: &PolarityFamily) -> Result<Self, AnalyzerError> {
    let compile = |pattern: String| {
      Regex::new(&pattern).map_err(|source| AnalyzerError::InvalidPattern {
        family: family.name.clone(),
        source,
      })
    };

    let affirmative = compile(format!(
      r"(?i)\b(?:{})\b(\s+not\b|'t\b)?",
      alternation(&family.affirmative)
    ))?;
    let negated = compile(format!(r"(?i)\b(?:{})\b", alternation(&family.negated)))?;

    Ok(Self {
      name: family.name.clone(),
      affirmative,
      negated,
    })
  }

  /// Polarity of `text` for this family, or `None` when it has no forms or both.
  pub(crate) fn polarity(&self, text: &str) -> Option<Polarity> {
    let text = straighten_quotes(text);
    let affirmative = self
      .affirmative
      .captures_iter(&text)
      .filter(|c| c.get(1).is_none())
      .count();
    let negated = self.negated.find_iter(&text).count();

    match (affirmative > 0, negated > 0) {
      (true, false) => Some(Polarity::Affirmative),
      (false, true) => Some(Polarity::Negated),
      _ => None,
    }
  }
}

fn alternation(words: &[String]) -> String {
  let parts: Vec<String> = words
    .iter()
    .map(|w| w.trim())
    .filter(|w| !w.is_empty())
    .map(|w| {
      w.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
    })
    .collect();

  if parts.is_empty() {
    // Never matches.
    r"\b\B".to_string()
  } else {
    parts.join("|")
  }
}

/// One `contradiction` per pair whose polarity is opposite in any family.
pub(crate) fn detect(texts: &[ModelText], families: &[CompiledFamily]) -> Vec<Conflict> {
  let polarities: Vec<Vec<Option<Polarity>>> = texts
    .iter()
    .map(|t| families.iter().map(|f| f.polarity(&t.text)).collect())
    .collect();

  let mut conflicts = Vec::new();
  for i in 0..texts.len() {
    for j in (i + 1)..texts.len() {
      let opposite = families.iter().enumerate().find_map(|(f, family)| {
        match (polarities[i][f], polarities[j][f]) {
          (Some(a), Some(b)) if a != b => Some((family, a, b)),
          _ => None,
        }
      });

      if let Some((family, a, b)) = opposite {
        conflicts.push(Conflict {
          kind: ConflictKind::Contradiction,
          severity: Severity::High,
          models: vec![texts[i].model.clone(), texts[j].model.clone()],
          description: format!(
            "{} and {} contradict each other ({} statement vs {} statement)",
            texts[i].model,
            texts[j].model,
            a.label(),
            b.label()
          ),
          evidence: vec![format!("family: {}", family.name)],
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

  fn families() -> Vec<CompiledFamily> {
    AnalyzerConfig::default()
      .polarity_families
      .iter()
      .map(|f| CompiledFamily::compile(f).unwrap())
      .collect()
  }

  #[test]
  fn test_affirmation_polarity() {
    let fams = families();
    assert_eq!(fams[0].polarity("The sky is blue"), Some(Polarity::Affirmative));
    assert_eq!(fams[0].polarity("The sky is not blue"), Some(Polarity::Negated));
    assert_eq!(fams[0].polarity("The sky isn’t blue"), Some(Polarity::Negated));
    assert_eq!(fams[0].polarity("It is, and it is not"), None);
    assert_eq!(fams[0].polarity("Blue sky"), None);
  }

  #[test]
  fn test_modal_polarity_handles_contractions() {
    let fams = families();
    assert_eq!(fams[1].polarity("You can do it"), Some(Polarity::Affirmative));
    assert_eq!(fams[1].polarity("You can't do it"), Some(Polarity::Negated));
    assert_eq!(fams[1].polarity("You cannot do it"), Some(Polarity::Negated));
  }

  #[test]
  fn test_yes_no_pair_contradicts() {
    let texts = vec![
      ModelText::new("a", "Yes."),
      ModelText::new("b", "No."),
      ModelText::new("c", "Maybe."),
    ];
    let conflicts = detect(&texts, &families());
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].models, vec!["a", "b"]);
    assert_eq!(conflicts[0].evidence, vec!["family: yes_no"]);
  }
}
