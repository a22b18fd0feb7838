use std::sync::Arc;

use quorum_provider::Credentials;
use tokio_util::sync::CancellationToken;

use crate::config::GenerationDefaults;
use crate::events::{ExecutionNotifier, NoopNotifier};

/// Per-run options passed to [`crate::WorkflowEngine::execute`].
#[derive(Clone)]
pub struct ExecutionOptions {
  pub credentials: Credentials,
  pub notifier: Arc<dyn ExecutionNotifier>,
  pub cancel: CancellationToken,
  /// Overrides the engine's generation defaults for this run.
  pub generation: Option<GenerationDefaults>,
}

impl Default for ExecutionOptions {
  fn default() -> Self {
    Self {
      credentials: Credentials::default(),
      notifier: Arc::new(NoopNotifier),
      cancel: CancellationToken::new(),
      generation: None,
    }
  }
}

impl ExecutionOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_credentials(mut self, credentials: Credentials) -> Self {
    self.credentials = credentials;
    self
  }

  pub fn with_notifier(mut self, notifier: impl ExecutionNotifier + 'static) -> Self {
    self.notifier = Arc::new(notifier);
    self
  }

  pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
    self.cancel = cancel;
    self
  }

  pub fn with_generation(mut self, generation: GenerationDefaults) -> Self {
    self.generation = Some(generation);
    self
  }

  /// A handle that cancels this run when `cancel()` is called on it.
  pub fn cancel_token(&self) -> CancellationToken {
    self.cancel.clone()
  }
}

impl std::fmt::Debug for ExecutionOptions {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ExecutionOptions")
      .field("credentials", &self.credentials)
      .field("cancelled", &self.cancel.is_cancelled())
      .field("generation", &self.generation)
      .finish_non_exhaustive()
  }
}
