//! Execution result types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of one run. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
  Running,
  Completed,
  Failed,
  Cancelled,
}

impl ExecutionStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, ExecutionStatus::Running)
  }
}

/// Outcome of a single node. Produced once per node per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
  pub node_id: String,
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<serde_json::Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub timestamp: DateTime<Utc>,
  pub duration_ms: u64,
}

impl ExecutionResult {
  pub fn succeeded(node_id: impl Into<String>, data: serde_json::Value, duration: Duration) -> Self {
    Self {
      node_id: node_id.into(),
      success: true,
      data: Some(data),
      error: None,
      timestamp: Utc::now(),
      duration_ms: duration.as_millis() as u64,
    }
  }

  pub fn failed(node_id: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
    Self {
      node_id: node_id.into(),
      success: false,
      data: None,
      error: Some(error.into()),
      timestamp: Utc::now(),
      duration_ms: duration.as_millis() as u64,
    }
  }
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFailure {
  /// The graph was rejected before any node ran.
  Validation { reasons: Vec<String> },
  /// Ordering found a cycle the validator did not.
  Cycle { message: String },
  /// At least one output node failed.
  OutputFailed { node_ids: Vec<String> },
  /// Some non-output nodes failed; the rest of the graph still ran.
  NodeFailures { node_ids: Vec<String> },
}

/// State of one run, returned to the caller whatever the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExecution {
  pub id: String,
  pub start_time: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time: Option<DateTime<Utc>>,
  pub status: ExecutionStatus,
  /// Node results in traversal order.
  pub results: Vec<ExecutionResult>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub failure: Option<RunFailure>,
}

impl WorkflowExecution {
  pub(crate) fn start() -> Self {
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      start_time: Utc::now(),
      end_time: None,
      status: ExecutionStatus::Running,
      results: Vec::new(),
      failure: None,
    }
  }

  pub(crate) fn record(&mut self, result: ExecutionResult) {
    self.results.push(result);
  }

  /// Move to a terminal state. Returns `false` if the run already ended.
  pub(crate) fn finish(&mut self, status: ExecutionStatus, failure: Option<RunFailure>) -> bool {
    if self.status.is_terminal() || !status.is_terminal() {
      return false;
    }
    self.status = status;
    self.failure = failure;
    self.end_time = Some(Utc::now());
    true
  }

  /// Get the result for a node.
  pub fn result(&self, node_id: &str) -> Option<&ExecutionResult> {
    self.results.iter().find(|r| r.node_id == node_id)
  }

  /// Ids of nodes whose result is a failure, in traversal order.
  pub fn failed_nodes(&self) -> Vec<&str> {
    self
      .results
      .iter()
      .filter(|r| !r.success)
      .map(|r| r.node_id.as_str())
      .collect()
  }

  /// Whether the run was rejected as a configuration error.
  pub fn is_validation_failure(&self) -> bool {
    matches!(self.failure, Some(RunFailure::Validation { .. }))
  }

  /// Wall-clock duration, once the run has ended.
  pub fn duration(&self) -> Option<chrono::Duration> {
    self.end_time.map(|end| end - self.start_time)
  }
}

/// Snapshot emitted after every node completion. Not stored on the execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
  pub completed_count: usize,
  pub total_count: usize,
  pub current_node_id: Option<String>,
  pub percentage: u8,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub estimated_time_remaining_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_terminal_state_is_final() {
    let mut execution = WorkflowExecution::start();
    assert!(!execution.finish(ExecutionStatus::Running, None));
    assert!(execution.finish(ExecutionStatus::Cancelled, None));
    assert!(!execution.finish(ExecutionStatus::Completed, None));
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
    assert!(execution.end_time.is_some());
  }

  #[test]
  fn test_failed_result_serializes_without_data() {
    let result = ExecutionResult::failed("ask", "boom", Duration::from_millis(12));
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "boom");
    assert_eq!(value["duration_ms"], 12);
    assert!(value.get("data").is_none());
  }
}
