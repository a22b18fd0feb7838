//! Error types for node execution.

use quorum_provider::ProviderError;
use thiserror::Error;

use crate::analyzer::AnalyzerError;

/// Why a single node failed. Recorded on the node's result; never escapes
/// [`crate::WorkflowEngine::execute`].
#[derive(Debug, Error)]
pub enum HandlerError {
  /// An input node carries neither content nor a placeholder.
  #[error("input node '{node_id}' has neither content nor placeholder text")]
  EmptyInput { node_id: String },

  /// A model call node lists no usable model names.
  #[error("model call node '{node_id}' has no models configured")]
  NoModels { node_id: String },

  /// The only configured model failed.
  #[error("model '{model}' failed: {source}")]
  Provider {
    model: String,
    #[source]
    source: ProviderError,
  },

  /// Every model of a multi-model call failed.
  #[error("all {count} models failed; first error: {first}")]
  AllModelsFailed { count: usize, first: String },

  /// A compare node got fewer than two usable responses.
  #[error("compare node requires at least 2 inputs, found {found}")]
  NotEnoughInputs { found: usize },

  #[error("compare node '{node_id}' has no comparison mode selected")]
  MissingComparisonMode { node_id: String },

  #[error("comparison failed: {0}")]
  Analysis(#[from] AnalyzerError),

  #[error("output node '{node_id}' has no output format selected")]
  MissingOutputFormat { node_id: String },

  /// Template rendering or serialization of an output payload failed.
  #[error("failed to render {format} output: {message}")]
  Render { format: String, message: String },

  /// The handler task panicked or was torn down.
  #[error("node '{node_id}' aborted: {message}")]
  Aborted { node_id: String, message: String },
}
