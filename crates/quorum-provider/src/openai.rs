use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::gateway::ProviderGateway;
use crate::options::GenerateOptions;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Gateway for OpenAI-compatible chat completions endpoints.
///
/// Works with OpenAI, vLLM, Groq, OpenRouter and anything else that speaks
/// `POST {base}/chat/completions`.
pub struct OpenAiGateway {
  http: Client,
  base_url: String,
  provider: String,
  api_key: Option<String>,
}

impl OpenAiGateway {
  /// `provider` is the name used in credential lookups and error messages.
  pub fn new(provider: impl Into<String>, base_url: impl Into<String>) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      provider: provider.into(),
      api_key: None,
    }
  }

  /// Key used when the call's options carry none.
  pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
    self.api_key = Some(api_key.into());
    self
  }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: Vec<ChatMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

#[async_trait]
impl ProviderGateway for OpenAiGateway {
  #[instrument(name = "openai_generate", skip(self, prompt, options), fields(provider = %self.provider))]
  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    options: &GenerateOptions,
  ) -> Result<String, ProviderError> {
    let api_key = options
      .api_key
      .as_deref()
      .or(self.api_key.as_deref())
      .ok_or_else(|| ProviderError::MissingCredentials {
        provider: self.provider.clone(),
      })?;

    let request = ChatRequest {
      model,
      messages: vec![ChatMessage {
        role: "user",
        content: prompt,
      }],
      temperature: options.temperature,
      max_tokens: options.max_tokens,
    };

    let response = self
      .http
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(api_key)
      .json(&request)
      .send()
      .await
      .map_err(|source| ProviderError::Http {
        model: model.to_string(),
        source,
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ProviderError::Status {
        model: model.to_string(),
        status: status.as_u16(),
        body,
      });
    }

    let body: ChatResponse = response.json().await.map_err(|source| ProviderError::Http {
      model: model.to_string(),
      source,
    })?;

    debug!(model = %model, choices = body.choices.len(), "chat completion received");

    body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| ProviderError::InvalidResponse {
        model: model.to_string(),
        message: "no message content in first choice".to_string(),
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_missing_key_fails_before_any_request() {
    let gateway = OpenAiGateway::new("openai", "http://127.0.0.1:9");
    let err = gateway
      .generate("gpt-4o", "hi", &GenerateOptions::default())
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      ProviderError::MissingCredentials { ref provider } if provider == "openai"
    ));
  }
}
