use quorum_config::ComparisonMode;
use serde_json::Value;

use crate::analyzer::{self, ModelText};
use crate::config::EngineConfig;
use crate::error::HandlerError;
use crate::inputs::{NodeInputs, render_text};

pub(super) fn run(
  node_id: &str,
  mode: Option<ComparisonMode>,
  inputs: &NodeInputs,
  config: &EngineConfig,
) -> Result<Value, HandlerError> {
  let mode = mode.ok_or_else(|| HandlerError::MissingComparisonMode {
    node_id: node_id.to_string(),
  })?;

  let texts = model_texts(inputs);
  if texts.len() < 2 {
    return Err(HandlerError::NotEnoughInputs { found: texts.len() });
  }

  let report = analyzer::analyze(&texts, mode, &config.analyzer)?;
  serde_json::to_value(&report).map_err(|e| HandlerError::Render {
    format: "comparison report".to_string(),
    message: e.to_string(),
  })
}

/// Flatten inputs into labelled texts.
///
/// A multi-model payload contributes one entry per successful response. A
/// single-model payload is labelled with its model. Anything else is
/// labelled with the upstream node id. Empty texts are dropped.
pub fn model_texts(inputs: &NodeInputs) -> Vec<ModelText> {
  let mut texts = Vec::new();

  for input in inputs.iter() {
    if let Some(Value::Array(responses)) = input.data.get("responses") {
      for entry in responses {
        if entry.get("success").and_then(Value::as_bool) != Some(true) {
          continue;
        }
        let model = entry.get("model").and_then(Value::as_str);
        let text = entry.get("response").and_then(Value::as_str);
        if let (Some(model), Some(text)) = (model, text) {
          texts.push(ModelText::new(model, text));
        }
      }
      continue;
    }

    let model = input
      .data
      .get("model")
      .and_then(Value::as_str)
      .unwrap_or(&input.source);
    texts.push(ModelText::new(model, render_text(&input.data)));
  }

  texts.retain(|t| !t.text.trim().is_empty());
  texts
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::inputs::NodeInput;

  fn input(source: &str, data: Value) -> NodeInput {
    NodeInput {
      key: format!("from_{}", source),
      source: source.to_string(),
      data,
    }
  }

  #[test]
  fn test_flattens_multi_model_responses() {
    let inputs = NodeInputs::new(vec![
      input(
        "ask",
        json!({
          "prompt": "p",
          "responses": [
            { "model": "a", "success": true, "response": "The sky is blue" },
            { "model": "b", "success": false, "error": "timeout" },
            { "model": "c", "success": true, "response": "The sky is not blue" },
          ]
        }),
      ),
      input("note", json!("plain text")),
      input("blank", json!("   ")),
    ]);

    let texts = model_texts(&inputs);
    let models: Vec<&str> = texts.iter().map(|t| t.model.as_str()).collect();
    assert_eq!(models, vec!["a", "c", "note"]);
  }

  #[test]
  fn test_single_input_is_rejected() {
    let inputs = NodeInputs::new(vec![input("in", json!("2+2"))]);
    let err = run(
      "cmp",
      Some(ComparisonMode::Consensus),
      &inputs,
      &EngineConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
      err.to_string(),
      "compare node requires at least 2 inputs, found 1"
    );
  }

  #[test]
  fn test_contradiction_between_two_models() {
    let inputs = NodeInputs::new(vec![
      input("a", json!({ "model": "a", "response": "The sky is blue" })),
      input("b", json!({ "model": "b", "response": "The sky is not blue" })),
    ]);
    let report = run(
      "cmp",
      Some(ComparisonMode::Conflicts),
      &inputs,
      &EngineConfig::default(),
    )
    .unwrap();

    assert_eq!(report["conflicts"][0]["type"], "contradiction");
    assert_eq!(report["conflicts"][0]["severity"], "high");
    assert_eq!(report["conflicts"][0]["models"], json!(["a", "b"]));
  }
}
