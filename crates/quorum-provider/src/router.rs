use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::gateway::{ProviderGateway, split_model};
use crate::options::GenerateOptions;

/// Routes `provider/model` names to the gateway registered for `provider`.
///
/// The provider prefix is stripped before the inner gateway sees the model
/// name. Bare model names go to the default provider, if one is set.
#[derive(Default)]
pub struct RoutingGateway {
  routes: HashMap<String, Arc<dyn ProviderGateway>>,
  default_provider: Option<String>,
}

impl RoutingGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(mut self, provider: impl Into<String>, gateway: Arc<dyn ProviderGateway>) -> Self {
    self.routes.insert(provider.into(), gateway);
    self
  }

  pub fn with_default_provider(mut self, provider: impl Into<String>) -> Self {
    self.default_provider = Some(provider.into());
    self
  }

  pub fn default_provider(&self) -> Option<&str> {
    self.default_provider.as_deref()
  }

  /// Resolve `model` to the provider that serves it and the name that
  /// provider sees.
  ///
  /// A registered prefix wins and is stripped. Anything else, including an
  /// unregistered prefix like `meta/llama`, goes to the default provider
  /// with the full name.
  pub fn route<'a>(&'a self, model: &'a str) -> Result<(&'a str, &'a str), ProviderError> {
    match split_model(model) {
      (Some(provider), name) if self.routes.contains_key(provider) => Ok((provider, name)),
      (prefix, _) => match self.default_provider.as_deref() {
        Some(provider) => Ok((provider, model)),
        None => Err(ProviderError::UnknownProvider {
          provider: prefix.unwrap_or_default().to_string(),
          model: model.to_string(),
        }),
      },
    }
  }

  /// Registered provider names, sorted.
  pub fn providers(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

#[async_trait]
impl ProviderGateway for RoutingGateway {
  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    options: &GenerateOptions,
  ) -> Result<String, ProviderError> {
    let (provider, name) = self.route(model)?;
    let gateway = self
      .routes
      .get(provider)
      .ok_or_else(|| ProviderError::UnknownProvider {
        provider: provider.to_string(),
        model: model.to_string(),
      })?;

    debug!(provider = %provider, model = %name, "routing generate call");
    gateway.generate(name, prompt, options).await
  }

  fn provider_for<'a>(&'a self, model: &'a str) -> Option<&'a str> {
    self.route(model).ok().map(|(provider, _)| provider)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::echo::EchoGateway;
  use crate::options::Credentials;

  fn router() -> RoutingGateway {
    RoutingGateway::new()
      .register("echo", Arc::new(EchoGateway))
      .register("local", Arc::new(EchoGateway))
  }

  #[tokio::test]
  async fn test_prefix_is_stripped() {
    let out = router()
      .generate("echo/tiny", "hi", &GenerateOptions::default())
      .await
      .unwrap();
    assert_eq!(out, "[tiny] hi");
  }

  #[tokio::test]
  async fn test_bare_name_uses_default_provider() {
    let out = router()
      .with_default_provider("local")
      .generate("mistral", "hi", &GenerateOptions::default())
      .await
      .unwrap();
    assert_eq!(out, "[mistral] hi");
  }

  #[tokio::test]
  async fn test_unknown_provider_without_default() {
    let err = router()
      .generate("nope/model", "hi", &GenerateOptions::default())
      .await
      .unwrap_err();
    assert!(matches!(err, ProviderError::UnknownProvider { ref provider, .. } if provider == "nope"));
  }

  #[tokio::test]
  async fn test_unregistered_prefix_goes_to_default_provider() {
    let router = router().with_default_provider("local");

    assert_eq!(router.route("meta/llama").unwrap(), ("local", "meta/llama"));
    assert_eq!(router.provider_for("meta/llama"), Some("local"));
    assert_eq!(router.provider_for("echo/tiny"), Some("echo"));

    let out = router
      .generate("meta/llama", "hi", &GenerateOptions::default())
      .await
      .unwrap();
    assert_eq!(out, "[meta/llama] hi");
  }

  #[test]
  fn test_key_lookup_follows_routing() {
    let router = router().with_default_provider("local");
    let creds = Credentials::new().with("meta", "sk-meta").with("local", "sk-local");

    assert_eq!(
      creds.api_key_for(&router, "meta/llama", None).as_deref(),
      Some("sk-local")
    );
    assert_eq!(creds.api_key_for(&router, "echo/tiny", None), None);
  }
}
