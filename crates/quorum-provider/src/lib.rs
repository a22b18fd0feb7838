//! Quorum Provider
//!
//! The engine talks to language models through a single capability:
//! [`ProviderGateway::generate`]. Retry, rate limiting and circuit breaking
//! belong to the gateway implementation, not to the engine; the engine only
//! needs a text answer or an error per call.
//!
//! Implementations shipped here:
//! - [`OllamaGateway`] for a local Ollama server
//! - [`OpenAiGateway`] for any OpenAI-compatible chat completions endpoint
//! - [`RoutingGateway`] to dispatch `provider/model` names to registered gateways
//! - [`EchoGateway`], an offline gateway for dry runs

mod echo;
mod error;
mod gateway;
mod ollama;
mod openai;
mod options;
mod router;

pub use echo::EchoGateway;
pub use error::ProviderError;
pub use gateway::{ProviderGateway, split_model};
pub use ollama::{DEFAULT_OLLAMA_URL, OllamaGateway};
pub use openai::{DEFAULT_OPENAI_URL, OpenAiGateway};
pub use options::{Credentials, GenerateOptions};
pub use router::RoutingGateway;
