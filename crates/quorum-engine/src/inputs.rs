//! Resolving a node's inputs from upstream results.

use std::collections::HashMap;

use quorum_workflow::Graph;
use serde_json::Value;

use crate::execution::ExecutionResult;

/// One upstream payload as seen by the receiving node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInput {
  /// The edge's target handle, or `input{n}` by incoming-edge position.
  pub key: String,
  pub source: String,
  pub data: Value,
}

/// A node's available inputs, in incoming-edge order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInputs(Vec<NodeInput>);

impl NodeInputs {
  pub fn new(inputs: Vec<NodeInput>) -> Self {
    Self(inputs)
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.iter().find(|i| i.key == key).map(|i| &i.data)
  }

  pub fn first(&self) -> Option<&NodeInput> {
    self.0.first()
  }

  pub fn iter(&self) -> impl Iterator<Item = &NodeInput> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// All inputs rendered as text, joined by a blank line.
  pub fn joined_text(&self) -> String {
    self
      .0
      .iter()
      .map(|i| render_text(&i.data))
      .filter(|t| !t.is_empty())
      .collect::<Vec<_>>()
      .join("\n\n")
  }
}

/// Collect the successful upstream payloads for `node_id`.
///
/// Ordinals count every incoming edge, so `input2` still names the second
/// edge when the first upstream node failed.
pub fn gather_inputs(
  graph: &Graph,
  node_id: &str,
  completed: &HashMap<String, ExecutionResult>,
) -> NodeInputs {
  let inputs = graph
    .incoming_edges(node_id)
    .iter()
    .enumerate()
    .filter_map(|(index, edge)| {
      let result = completed.get(&edge.source)?;
      if !result.success {
        return None;
      }
      let data = result.data.clone()?;
      let key = edge
        .target_handle
        .clone()
        .unwrap_or_else(|| format!("input{}", index + 1));
      Some(NodeInput {
        key,
        source: edge.source.clone(),
        data,
      })
    })
    .collect();

  NodeInputs(inputs)
}

/// Render a node payload as prompt text.
pub fn render_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    Value::Array(items) => items
      .iter()
      .map(render_text)
      .filter(|t| !t.is_empty())
      .collect::<Vec<_>>()
      .join("\n\n"),
    Value::Object(map) => {
      if let Some(Value::Array(responses)) = map.get("responses") {
        return responses
          .iter()
          .filter(|r| r.get("success").and_then(Value::as_bool).unwrap_or(false))
          .filter_map(|r| {
            let model = r.get("model").and_then(Value::as_str).unwrap_or("model");
            let text = r.get("response").and_then(Value::as_str)?;
            Some(format!("[{}]\n{}", model, text))
          })
          .collect::<Vec<_>>()
          .join("\n\n");
      }
      for key in ["response", "narrative", "content"] {
        if let Some(inner) = map.get(key) {
          return render_text(inner);
        }
      }
      value.to_string()
    }
    other => other.to_string(),
  }
}
