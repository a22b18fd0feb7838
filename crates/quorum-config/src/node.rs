use serde::{Deserialize, Serialize};

use crate::enums::{ComparisonMode, OutputFormat, SummaryLength, SummaryStyle};

/// One step in a workflow graph.
///
/// `configured` is derived from the kind's settings on deserialization; a
/// stored value is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
  pub id: String,
  #[serde(flatten)]
  pub kind: NodeKind,
  /// Set once the kind's required settings are present.
  pub configured: bool,
}

#[derive(Deserialize)]
struct RawNode {
  id: String,
  #[serde(flatten)]
  kind: NodeKind,
}

impl From<RawNode> for Node {
  fn from(raw: RawNode) -> Self {
    Node::new(raw.id, raw.kind)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
  /// Literal text fed into the graph.
  Input {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
  },
  /// A prompt sent to one or more models.
  ModelCall {
    #[serde(default)]
    models: Vec<String>,
    /// Template with `{input}`, `{input1}` or `{<handle>}` placeholders.
    #[serde(default)]
    prompt_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
  },
  Compare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<ComparisonMode>,
  },
  Summarize {
    #[serde(default)]
    length: SummaryLength,
    #[serde(default)]
    style: SummaryStyle,
  },
  Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
    #[serde(default)]
    include_metadata: bool,
  },
}

impl NodeKind {
  /// The snake_case name used on the wire and in log fields.
  pub fn name(&self) -> &'static str {
    match self {
      NodeKind::Input { .. } => "input",
      NodeKind::ModelCall { .. } => "model_call",
      NodeKind::Compare { .. } => "compare",
      NodeKind::Summarize { .. } => "summarize",
      NodeKind::Output { .. } => "output",
    }
  }
}

impl Node {
  /// Create a node and compute its `configured` flag.
  pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
    let mut node = Self {
      id: id.into(),
      kind,
      configured: false,
    };
    node.refresh_configured();
    node
  }

  pub fn input(id: impl Into<String>, content: impl Into<String>) -> Self {
    Self::new(
      id,
      NodeKind::Input {
        content: Some(content.into()),
        placeholder: None,
      },
    )
  }

  pub fn model_call<S: Into<String>>(
    id: impl Into<String>,
    models: impl IntoIterator<Item = S>,
    prompt_template: impl Into<String>,
  ) -> Self {
    Self::new(
      id,
      NodeKind::ModelCall {
        models: models.into_iter().map(Into::into).collect(),
        prompt_template: prompt_template.into(),
        temperature: None,
        max_tokens: None,
      },
    )
  }

  pub fn compare(id: impl Into<String>, mode: ComparisonMode) -> Self {
    Self::new(id, NodeKind::Compare { mode: Some(mode) })
  }

  pub fn summarize(id: impl Into<String>, length: SummaryLength, style: SummaryStyle) -> Self {
    Self::new(id, NodeKind::Summarize { length, style })
  }

  pub fn output(id: impl Into<String>, format: OutputFormat) -> Self {
    Self::new(
      id,
      NodeKind::Output {
        format: Some(format),
        include_metadata: false,
      },
    )
  }

  pub fn is_input(&self) -> bool {
    matches!(self.kind, NodeKind::Input { .. })
  }

  pub fn is_output(&self) -> bool {
    matches!(self.kind, NodeKind::Output { .. })
  }

  /// Whether the kind-specific required settings are present.
  pub fn is_configured(&self) -> bool {
    match &self.kind {
      NodeKind::Input { .. } | NodeKind::Summarize { .. } => true,
      NodeKind::ModelCall {
        models,
        prompt_template,
        ..
      } => !models.is_empty() && !prompt_template.trim().is_empty(),
      NodeKind::Compare { mode } => mode.is_some(),
      NodeKind::Output { format, .. } => format.is_some(),
    }
  }

  /// Recompute and store the `configured` flag after a settings change.
  pub fn refresh_configured(&mut self) {
    self.configured = self.is_configured();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_model_call_round_trips_with_type_tag() {
    let value = json!({
      "id": "ask",
      "type": "model_call",
      "models": ["ollama/llama3", "openai/gpt-4o"],
      "prompt_template": "Answer: {input}"
    });

    let node: Node = serde_json::from_value(value).unwrap();
    assert_eq!(node.kind.name(), "model_call");
    assert!(node.configured);
    assert_eq!(node.configured, node.is_configured());

    let back = serde_json::to_value(&node).unwrap();
    assert_eq!(back["type"], "model_call");
    assert_eq!(back["models"][1], "openai/gpt-4o");
  }

  #[test]
  fn test_unknown_output_format_falls_back_to_other() {
    let node: Node =
      serde_json::from_value(json!({ "id": "out", "type": "output", "format": "pdf" })).unwrap();
    match node.kind {
      NodeKind::Output { format, .. } => assert_eq!(format, Some(OutputFormat::Other)),
      other => panic!("unexpected kind: {:?}", other),
    }
  }

  #[test]
  fn test_summarize_defaults() {
    let node: Node = serde_json::from_value(json!({ "id": "sum", "type": "summarize" })).unwrap();
    assert_eq!(
      node.kind,
      NodeKind::Summarize {
        length: SummaryLength::Medium,
        style: SummaryStyle::Paragraph,
      }
    );
  }

  #[test]
  fn test_configured_flag_tracks_settings() {
    let mut node = Node::new("cmp", NodeKind::Compare { mode: None });
    assert!(!node.configured);

    node.kind = NodeKind::Compare {
      mode: Some(ComparisonMode::Consensus),
    };
    node.refresh_configured();
    assert!(node.configured);
  }

  #[test]
  fn test_configured_flag_is_derived_when_loading() {
    let node: Node =
      serde_json::from_value(json!({ "id": "out", "type": "output", "format": "json" })).unwrap();
    assert!(node.configured);

    let stale: Node = serde_json::from_value(
      json!({ "id": "cmp", "type": "compare", "configured": true }),
    )
    .unwrap();
    assert!(!stale.configured);
    assert_eq!(stale.configured, stale.is_configured());
  }
}
