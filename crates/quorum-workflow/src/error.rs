use thiserror::Error;

/// A single structural or configuration problem found by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
  #[error("workflow has no nodes")]
  NoNodes,

  #[error("workflow needs at least one input node")]
  MissingInputNode,

  #[error("workflow needs at least one output node")]
  MissingOutputNode,

  #[error("duplicate node id: {0}")]
  DuplicateNode(String),

  #[error("node '{0}' is not connected to any other node")]
  Disconnected(String),

  #[error("cycle detected: {}", .path.join(" -> "))]
  Cycle { path: Vec<String> },

  #[error("model call node '{0}' has no models selected")]
  MissingModels(String),

  #[error("model call node '{0}' has an empty prompt template")]
  MissingPrompt(String),

  #[error("compare node '{0}' has no comparison mode selected")]
  MissingComparisonMode(String),

  #[error("output node '{0}' has no output format selected")]
  MissingOutputFormat(String),

  #[error("edge '{edge_id}' references unknown source node '{node_id}'")]
  UnknownSource { edge_id: String, node_id: String },

  #[error("edge '{edge_id}' references unknown target node '{node_id}'")]
  UnknownTarget { edge_id: String, node_id: String },
}

/// All problems found while validating a graph, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid workflow: {}", join_issues(.issues))]
pub struct ValidationError {
  pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
  /// Human-readable reason strings, one per issue.
  pub fn reasons(&self) -> Vec<String> {
    self.issues.iter().map(ToString::to_string).collect()
  }

  /// Whether any of the issues is a cycle.
  pub fn has_cycle(&self) -> bool {
    self
      .issues
      .iter()
      .any(|issue| matches!(issue, ValidationIssue::Cycle { .. }))
  }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
  issues
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

/// Returned by [`crate::topological_order`] when the ordering cannot cover every node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("graph contains a cycle: ordered {ordered} of {total} nodes")]
pub struct CycleError {
  pub ordered: usize,
  pub total: usize,
}
