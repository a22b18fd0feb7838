use serde::{Deserialize, Serialize};

/// A directed dependency between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub id: String,
  pub source: String,
  pub target: String,
  /// Named input slot on the target, e.g. the second operand of a compare node.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target_handle: Option<String>,
}

impl Edge {
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
      target_handle: None,
    }
  }

  /// Route this edge into a named input slot on the target.
  pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
    self.target_handle = Some(handle.into());
    self
  }
}
