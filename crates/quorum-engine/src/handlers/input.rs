use serde_json::Value;

use crate::error::HandlerError;

/// Emit the configured content, or the placeholder when there is none.
pub(super) fn run(
  node_id: &str,
  content: Option<String>,
  placeholder: Option<String>,
) -> Result<Value, HandlerError> {
  content
    .filter(|c| !c.trim().is_empty())
    .or_else(|| placeholder.filter(|p| !p.trim().is_empty()))
    .map(Value::String)
    .ok_or_else(|| HandlerError::EmptyInput {
      node_id: node_id.to_string(),
    })
}
