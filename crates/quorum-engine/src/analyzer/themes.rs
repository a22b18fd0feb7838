use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::ModelText;
use super::text::words;

/// A frequent word across all responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
  pub word: String,
  pub count: usize,
}

/// Terms only one response uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistinctiveTerms {
  pub model: String,
  pub terms: Vec<String>,
}

fn significant_words(text: &str, max_ignored_len: usize) -> Vec<String> {
  words(text)
    .into_iter()
    .filter(|w| w.chars().count() > max_ignored_len)
    .collect()
}

/// Most frequent significant words, ties broken alphabetically.
pub(crate) fn common_themes(texts: &[ModelText], max_ignored_len: usize, top: usize) -> Vec<Theme> {
  let mut counts: HashMap<String, usize> = HashMap::new();
  for text in texts {
    for word in significant_words(&text.text, max_ignored_len) {
      *counts.entry(word).or_default() += 1;
    }
  }

  let mut themes: Vec<Theme> = counts
    .into_iter()
    .map(|(word, count)| Theme { word, count })
    .collect();
  themes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
  themes.truncate(top);
  themes
}

/// Per response, the significant words no other response contains.
pub(crate) fn distinctive_terms(
  texts: &[ModelText],
  max_ignored_len: usize,
  limit: usize,
) -> Vec<DistinctiveTerms> {
  let vocabularies: Vec<BTreeSet<String>> = texts
    .iter()
    .map(|t| significant_words(&t.text, max_ignored_len).into_iter().collect())
    .collect();

  texts
    .iter()
    .enumerate()
    .map(|(i, text)| {
      let terms = vocabularies[i]
        .iter()
        .filter(|w| {
          vocabularies
            .iter()
            .enumerate()
            .all(|(j, other)| j == i || !other.contains(*w))
        })
        .take(limit)
        .cloned()
        .collect();
      DistinctiveTerms {
        model: text.model.clone(),
        terms,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_common_themes_skip_short_words() {
    let texts = vec![
      ModelText::new("a", "Solar power is cheap and solar panels last"),
      ModelText::new("b", "Solar energy keeps getting cheaper; panels improve"),
    ];
    let themes = common_themes(&texts, 4, 5);
    let expected = vec![
      ("solar", 3),
      ("panels", 2),
      ("cheap", 1),
      ("cheaper", 1),
      ("energy", 1),
    ];
    let actual: Vec<(&str, usize)> = themes.iter().map(|t| (t.word.as_str(), t.count)).collect();
    assert_eq!(actual, expected);
  }

  #[test]
  fn test_distinctive_terms() {
    let texts = vec![
      ModelText::new("a", "Solar panels are cheap"),
      ModelText::new("b", "Solar turbines are loud"),
    ];
    let terms = distinctive_terms(&texts, 4, 10);
    assert_eq!(terms[0].terms, vec!["cheap", "panels"]);
    assert_eq!(terms[1].terms, vec!["turbines"]);
  }
}
