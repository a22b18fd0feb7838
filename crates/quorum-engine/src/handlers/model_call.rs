use std::sync::LazyLock;

use futures::future::join_all;
use quorum_provider::GenerateOptions;
use regex::{Captures, Regex};
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::HandlerContext;
use crate::error::HandlerError;
use crate::inputs::{NodeInputs, render_text};

pub(super) struct ModelCall<'a> {
  pub node_id: &'a str,
  pub models: Vec<String>,
  pub prompt_template: &'a str,
  pub temperature: Option<f32>,
  pub max_tokens: Option<u32>,
}

impl ModelCall<'_> {
  pub(super) async fn run(
    self,
    inputs: &NodeInputs,
    ctx: &HandlerContext,
  ) -> Result<Value, HandlerError> {
    let models: Vec<String> = self
      .models
      .into_iter()
      .map(|m| m.trim().to_string())
      .filter(|m| !m.is_empty())
      .collect();
    if models.is_empty() {
      return Err(HandlerError::NoModels {
        node_id: self.node_id.to_string(),
      });
    }

    let prompt = render_prompt(self.prompt_template, inputs);
    let defaults = &ctx.generation;
    let options_for = |model: &str| GenerateOptions {
      temperature: self.temperature.or(defaults.temperature),
      max_tokens: self.max_tokens.or(defaults.max_tokens),
      api_key: ctx.credentials.api_key_for(
        ctx.gateway.as_ref(),
        model,
        ctx.config.default_provider.as_deref(),
      ),
    };

    if let [model] = models.as_slice() {
      debug!(node_id = %self.node_id, model = %model, "model_call_dispatched");
      let response = ctx
        .gateway
        .generate(model, &prompt, &options_for(model))
        .await
        .map_err(|source| HandlerError::Provider {
          model: model.clone(),
          source,
        })?;
      return Ok(json!({ "prompt": prompt, "model": model, "response": response }));
    }

    debug!(node_id = %self.node_id, models = models.len(), "model_call_fan_out");
    let calls = models.iter().map(|model| {
      let options = options_for(model);
      let prompt = prompt.as_str();
      async move {
        let outcome = ctx.gateway.generate(model, prompt, &options).await;
        (model, outcome)
      }
    });

    // Completion order inside the fan-out does not matter; entries keep the
    // configured model order.
    let mut first_error = None;
    let responses: Vec<Value> = join_all(calls)
      .await
      .into_iter()
      .map(|(model, outcome)| match outcome {
        Ok(response) => json!({ "model": model, "success": true, "response": response }),
        Err(e) => {
          warn!(node_id = %self.node_id, model = %model, error = %e, "model_failed");
          let error = e.to_string();
          first_error.get_or_insert_with(|| error.clone());
          json!({ "model": model, "success": false, "error": error })
        }
      })
      .collect();

    let succeeded = responses.iter().filter(|r| r["success"] == true).count();
    if succeeded == 0 {
      return Err(HandlerError::AllModelsFailed {
        count: responses.len(),
        first: first_error.unwrap_or_default(),
      });
    }

    Ok(json!({ "prompt": prompt, "responses": responses }))
  }
}

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{([^{}\s]+)\}").expect("placeholder pattern is valid"));

/// Fill a prompt template from the node's inputs.
///
/// `{<key>}` takes the input with that handle or ordinal key (`input1`,
/// `input2`, ...). `{input}` takes every input joined by a blank line.
/// Unknown placeholders are left in place. Substitution is a single pass
/// over the template, so braces inside input data are never expanded.
pub fn render_prompt(template: &str, inputs: &NodeInputs) -> String {
  PLACEHOLDER
    .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
      "input" => inputs.joined_text(),
      key => inputs
        .get(key)
        .map(render_text)
        .unwrap_or_else(|| caps[0].to_string()),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::inputs::NodeInput;

  fn inputs() -> NodeInputs {
    NodeInputs::new(vec![
      NodeInput {
        key: "input1".into(),
        source: "a".into(),
        data: json!("first"),
      },
      NodeInput {
        key: "question".into(),
        source: "b".into(),
        data: json!({ "model": "m", "response": "why?" }),
      },
    ])
  }

  #[test]
  fn test_keyed_and_joined_placeholders() {
    let prompt = render_prompt("Q: {question}\nAll: {input}\nOne: {input1}", &inputs());
    assert_eq!(prompt, "Q: why?\nAll: first\n\nwhy?\nOne: first");
  }

  #[test]
  fn test_unknown_placeholder_is_kept() {
    let prompt = render_prompt("{input9} and {missing}", &inputs());
    assert_eq!(prompt, "{input9} and {missing}");
  }

  #[test]
  fn test_braces_in_input_data_are_not_expanded() {
    let inputs = NodeInputs::new(vec![
      NodeInput {
        key: "input1".into(),
        source: "a".into(),
        data: json!("user wrote {input2} and {input}"),
      },
      NodeInput {
        key: "input2".into(),
        source: "b".into(),
        data: json!("SECRET"),
      },
    ]);

    let prompt = render_prompt("Q: {input1}", &inputs);
    assert_eq!(prompt, "Q: user wrote {input2} and {input}");
  }
}
