use std::time::Duration;

use crate::execution::Progress;

/// Tracks completions for one run and produces [`Progress`] snapshots.
pub(crate) struct ProgressTracker {
  total: usize,
  completed: usize,
  elapsed: Duration,
  last_percentage: u8,
}

impl ProgressTracker {
  pub(crate) fn new(total: usize) -> Self {
    Self {
      total,
      completed: 0,
      elapsed: Duration::ZERO,
      last_percentage: 0,
    }
  }

  /// Record one finished node and return the new snapshot.
  pub(crate) fn record(&mut self, node_id: &str, took: Duration) -> Progress {
    self.completed = (self.completed + 1).min(self.total);
    self.elapsed += took;

    let percentage = if self.total == 0 {
      100
    } else {
      (100.0 * self.completed as f64 / self.total as f64).round() as u8
    };
    self.last_percentage = self.last_percentage.max(percentage);

    // No estimate until there is more than one sample.
    let estimated_time_remaining_ms = (self.completed > 1).then(|| {
      let average = self.elapsed.as_millis() as u64 / self.completed as u64;
      average * (self.total - self.completed) as u64
    });

    Progress {
      completed_count: self.completed,
      total_count: self.total,
      current_node_id: Some(node_id.to_string()),
      percentage: self.last_percentage,
      estimated_time_remaining_ms,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_percentages_and_estimate() {
    let mut tracker = ProgressTracker::new(3);

    let first = tracker.record("a", Duration::from_millis(100));
    assert_eq!(first.percentage, 33);
    assert_eq!(first.estimated_time_remaining_ms, None);

    let second = tracker.record("b", Duration::from_millis(300));
    assert_eq!(second.percentage, 67);
    assert_eq!(second.estimated_time_remaining_ms, Some(200));

    let third = tracker.record("c", Duration::from_millis(50));
    assert_eq!(third.percentage, 100);
    assert_eq!(third.estimated_time_remaining_ms, Some(0));
    assert_eq!(third.current_node_id.as_deref(), Some("c"));
  }
}
