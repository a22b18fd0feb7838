use std::sync::LazyLock;

use regex::Regex;

use super::{Conflict, ConflictKind, ModelText, Severity};

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"-?\d{1,3}(?:,\d{3})+(?:\.\d+)?|-?\d+(?:\.\d+)?").expect("number pattern is valid")
});

/// Every number in `text`, thousands separators removed.
pub(crate) fn extract_numbers(text: &str) -> Vec<f64> {
  NUMBER
    .find_iter(text)
    .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
    .collect()
}

/// `|a - b| / avg(a, b)`, or `None` when the average is zero.
pub(crate) fn relative_difference(a: f64, b: f64) -> Option<f64> {
  let avg = ((a + b) / 2.0).abs();
  if avg < f64::EPSILON {
    return None;
  }
  Some((a - b).abs() / avg)
}

/// One `numerical_discrepancy` per pair of responses with any number pair
/// differing by more than `threshold`.
pub(crate) fn detect(texts: &[ModelText], threshold: f64) -> Vec<Conflict> {
  let numbers: Vec<Vec<f64>> = texts.iter().map(|t| extract_numbers(&t.text)).collect();

  let mut conflicts = Vec::new();
  for i in 0..texts.len() {
    for j in (i + 1)..texts.len() {
      let mut evidence = Vec::new();
      for &a in &numbers[i] {
        for &b in &numbers[j] {
          if let Some(diff) = relative_difference(a, b) {
            if diff > threshold {
              evidence.push(format!("{} vs {} ({:.1}% apart)", a, b, diff * 100.0));
            }
          }
        }
      }

      if !evidence.is_empty() {
        conflicts.push(Conflict {
          kind: ConflictKind::NumericalDiscrepancy,
          severity: Severity::Medium,
          models: vec![texts[i].model.clone(), texts[j].model.clone()],
          description: format!(
            "{} and {} report different figures",
            texts[i].model, texts[j].model
          ),
          evidence,
        });
      }
    }
  }
  conflicts
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_numbers() {
    assert_eq!(
      extract_numbers("Revenue: 1,250.5 up from -3 and 42"),
      vec![1250.5, -3.0, 42.0]
    );
  }

  #[test]
  fn test_revenue_discrepancy() {
    let texts = vec![
      ModelText::new("a", "Revenue: 100"),
      ModelText::new("b", "Revenue: 135"),
    ];
    let conflicts = detect(&texts, 0.2);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::NumericalDiscrepancy);
    assert_eq!(conflicts[0].severity, Severity::Medium);
    assert_eq!(conflicts[0].evidence, vec!["100 vs 135 (29.8% apart)"]);
  }

  #[test]
  fn test_close_numbers_pass() {
    let texts = vec![
      ModelText::new("a", "Revenue: 100"),
      ModelText::new("b", "Revenue: 110"),
    ];
    assert!(detect(&texts, 0.2).is_empty());
    assert_eq!(relative_difference(0.0, 0.0), None);
  }
}
