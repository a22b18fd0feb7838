//! Tokenizing and normalization shared by the detectors.

/// Lowercase word tokens, split on anything that is not alphanumeric or an
/// apostrophe. Leading and trailing apostrophes are dropped.
pub(crate) fn words(text: &str) -> Vec<String> {
  text
    .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
    .map(|w| w.trim_matches(|c| c == '\'' || c == '\u{2019}').to_lowercase())
    .filter(|w| !w.is_empty())
    .collect()
}

/// Canonical form used to decide whether two responses say the same thing.
pub(crate) fn normalize(text: &str) -> String {
  text
    .to_lowercase()
    .chars()
    .map(|c| if c.is_alphanumeric() { c } else { ' ' })
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Straighten curly apostrophes so `isn’t` matches `isn't`.
pub(crate) fn straighten_quotes(text: &str) -> String {
  text.replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_words() {
    assert_eq!(
      words("The sky ISN'T blue, 'really'!"),
      vec!["the", "sky", "isn't", "blue", "really"]
    );
  }

  #[test]
  fn test_normalize_ignores_case_and_punctuation() {
    assert_eq!(normalize("  The Sky is BLUE!! "), normalize("the sky, is blue"));
  }
}
