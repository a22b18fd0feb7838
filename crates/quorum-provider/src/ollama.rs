use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::ProviderError;
use crate::gateway::ProviderGateway;
use crate::options::GenerateOptions;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Gateway for a local Ollama server (`POST /api/generate`).
pub struct OllamaGateway {
  http: Client,
  base_url: String,
}

impl OllamaGateway {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }
}

impl Default for OllamaGateway {
  fn default() -> Self {
    Self::new(DEFAULT_OLLAMA_URL)
  }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  stream: bool,
  options: ModelOptions,
}

#[derive(Serialize)]
struct ModelOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  response: Option<String>,
}

#[async_trait]
impl ProviderGateway for OllamaGateway {
  #[instrument(name = "ollama_generate", skip(self, prompt, options), fields(base_url = %self.base_url))]
  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    options: &GenerateOptions,
  ) -> Result<String, ProviderError> {
    let request = GenerateRequest {
      model,
      prompt,
      stream: false,
      options: ModelOptions {
        temperature: options.temperature,
        num_predict: options.max_tokens,
      },
    };

    let response = self
      .http
      .post(format!("{}/api/generate", self.base_url))
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

    let body: GenerateResponse = response.json().await.map_err(|source| ProviderError::Http {
      model: model.to_string(),
      source,
    })?;

    debug!(model = %model, "ollama response received");

    body.response.ok_or_else(|| ProviderError::InvalidResponse {
      model: model.to_string(),
      message: "missing 'response' field".to_string(),
    })
  }
}
