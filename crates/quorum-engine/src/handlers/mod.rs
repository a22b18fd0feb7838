//! One handler per node kind.
//!
//! Handlers take owned inputs so the scheduler can run each node on its
//! own task.

mod compare;
mod input;
mod model_call;
mod output;
mod summarize;

use std::sync::Arc;

use quorum_config::{Node, NodeKind};
use quorum_provider::{Credentials, ProviderGateway};
use serde_json::Value;

use crate::config::{EngineConfig, GenerationDefaults};
use crate::error::HandlerError;
use crate::inputs::NodeInputs;

pub use compare::model_texts;
pub use model_call::render_prompt;
pub use summarize::split_sentences;

/// Everything a handler may touch besides its own node and inputs.
#[derive(Clone)]
pub(crate) struct HandlerContext {
  pub gateway: Arc<dyn ProviderGateway>,
  pub config: Arc<EngineConfig>,
  pub credentials: Credentials,
  /// Generation defaults for model calls that set none of their own.
  pub generation: GenerationDefaults,
}

/// Run `node` against `inputs` and return its payload.
pub(crate) async fn run(
  node: Node,
  inputs: NodeInputs,
  ctx: HandlerContext,
) -> Result<Value, HandlerError> {
  match node.kind {
    NodeKind::Input {
      content,
      placeholder,
    } => input::run(&node.id, content, placeholder),
    NodeKind::ModelCall {
      models,
      prompt_template,
      temperature,
      max_tokens,
    } => {
      let call = model_call::ModelCall {
        node_id: &node.id,
        models,
        prompt_template: &prompt_template,
        temperature,
        max_tokens,
      };
      call.run(&inputs, &ctx).await
    }
    NodeKind::Compare { mode } => compare::run(&node.id, mode, &inputs, &ctx.config),
    NodeKind::Summarize { length, style } => Ok(summarize::run(
      &inputs,
      ctx.config.summary.sentences_for(length),
      style,
    )),
    NodeKind::Output {
      format,
      include_metadata,
    } => output::run(&node.id, format, include_metadata, &inputs),
  }
}
