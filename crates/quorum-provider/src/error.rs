//! Provider error types.

use thiserror::Error;

/// Errors a gateway can return for a single `generate` call.
#[derive(Debug, Error)]
pub enum ProviderError {
  /// The HTTP request could not be sent or the body could not be read.
  #[error("request to model '{model}' failed: {source}")]
  Http {
    model: String,
    #[source]
    source: reqwest::Error,
  },

  /// The provider answered with a non-success status.
  #[error("model '{model}' returned status {status}: {body}")]
  Status {
    model: String,
    status: u16,
    body: String,
  },

  /// The provider answered but the body had no usable text.
  #[error("invalid response from model '{model}': {message}")]
  InvalidResponse { model: String, message: String },

  /// No API key is available for a provider that needs one.
  #[error("no credentials configured for provider '{provider}'")]
  MissingCredentials { provider: String },

  /// The model name routes to a provider nobody registered.
  #[error("unknown provider '{provider}' for model '{model}'")]
  UnknownProvider { provider: String, model: String },

  /// Any other failure reported by a gateway.
  #[error("generation failed for model '{model}': {message}")]
  Generation { model: String, message: String },
}
