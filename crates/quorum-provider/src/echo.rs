use async_trait::async_trait;

use crate::error::ProviderError;
use crate::gateway::ProviderGateway;
use crate::options::GenerateOptions;

/// Offline gateway that answers with the prompt it was given.
///
/// Used for dry runs of a workflow, where the graph wiring matters and the
/// model output does not.
#[derive(Debug, Clone, Default)]
pub struct EchoGateway;

#[async_trait]
impl ProviderGateway for EchoGateway {
  async fn generate(
    &self,
    model: &str,
    prompt: &str,
    _options: &GenerateOptions,
  ) -> Result<String, ProviderError> {
    Ok(format!("[{}] {}", model, prompt))
  }
}
