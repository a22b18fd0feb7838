use async_trait::async_trait;

use crate::error::ProviderError;
use crate::options::GenerateOptions;

/// The one capability the engine needs from a model provider.
///
/// Implementations must be safe to call concurrently; the engine fans out
/// several calls at once for multi-model nodes and shares nothing mutable
/// between them.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
  /// Generate a completion for `prompt` with `model`.
  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    options: &GenerateOptions,
  ) -> Result<String, ProviderError>;

  /// The provider that serves `model`, used to pick its credentials.
  ///
  /// Gateways that route by prefix override this so key lookup and dispatch
  /// agree. `None` means the caller's default provider applies.
  fn provider_for<'a>(&'a self, model: &'a str) -> Option<&'a str> {
    split_model(model).0
  }
}

/// Split `provider/model` into its parts. Bare names have no provider.
///
/// Only the first slash separates the provider, so `openrouter/meta/llama`
/// routes to `openrouter` with model `meta/llama`.
pub fn split_model(model: &str) -> (Option<&str>, &str) {
  match model.split_once('/') {
    Some((provider, name)) if !provider.is_empty() && !name.is_empty() => (Some(provider), name),
    _ => (None, model),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_model() {
    assert_eq!(split_model("ollama/llama3"), (Some("ollama"), "llama3"));
    assert_eq!(
      split_model("openrouter/meta/llama"),
      (Some("openrouter"), "meta/llama")
    );
    assert_eq!(split_model("gpt-4o"), (None, "gpt-4o"));
    assert_eq!(split_model("/odd"), (None, "/odd"));
  }
}
