use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gateway::ProviderGateway;

/// Per-call generation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub temperature: Option<f32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_tokens: Option<u32>,
  /// API key resolved for this call's provider, if any.
  #[serde(skip)]
  pub api_key: Option<String>,
}

/// Provider name -> API key.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, provider: impl Into<String>, api_key: impl Into<String>) {
    self.0.insert(provider.into(), api_key.into());
  }

  pub fn with(mut self, provider: impl Into<String>, api_key: impl Into<String>) -> Self {
    self.insert(provider, api_key);
    self
  }

  pub fn get(&self, provider: &str) -> Option<&str> {
    self.0.get(provider).map(String::as_str)
  }

  /// Look up the key for the provider `gateway` sends `model` to. Models the
  /// gateway cannot place use `default_provider`.
  pub fn api_key_for(
    &self,
    gateway: &dyn ProviderGateway,
    model: &str,
    default_provider: Option<&str>,
  ) -> Option<String> {
    gateway
      .provider_for(model)
      .or(default_provider)
      .and_then(|p| self.get(p))
      .map(str::to_string)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

// Keys never end up in logs.
impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut providers: Vec<&String> = self.0.keys().collect();
    providers.sort();
    f.debug_struct("Credentials")
      .field("providers", &providers)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::echo::EchoGateway;

  #[test]
  fn test_api_key_lookup_by_prefix() {
    let creds = Credentials::new().with("openai", "sk-test");
    let gateway = EchoGateway;

    assert_eq!(
      creds.api_key_for(&gateway, "openai/gpt-4o", None).as_deref(),
      Some("sk-test")
    );
    assert_eq!(creds.api_key_for(&gateway, "ollama/llama3", None), None);
    assert_eq!(
      creds.api_key_for(&gateway, "gpt-4o", Some("openai")).as_deref(),
      Some("sk-test")
    );
  }

  #[test]
  fn test_debug_hides_keys() {
    let creds = Credentials::new().with("openai", "sk-secret");
    let rendered = format!("{:?}", creds);
    assert!(rendered.contains("openai"));
    assert!(!rendered.contains("sk-secret"));
  }
}
