//! Quorum Workflow Engine
//!
//! Runs a workflow graph of input, model call, compare, summarize and
//! output nodes against a [`ProviderGateway`](quorum_provider::ProviderGateway).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      WorkflowEngine                         │
//! │  - execute(nodes, edges, options) → WorkflowExecution       │
//! │  - validation, topological order, cancellation              │
//! │  - events + progress via ExecutionNotifier                  │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       handlers                              │
//! │  - one per node kind, each on its own task                  │
//! │  - model_call fans out over its models                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       analyzer                              │
//! │  - contradictions, numeric gaps, sentiment, themes          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use quorum_engine::{ExecutionOptions, WorkflowEngine};
//!
//! let engine = WorkflowEngine::new(Arc::new(OllamaGateway::default()));
//! let options = ExecutionOptions::new().with_notifier(notifier);
//! let cancel = options.cancel_token();
//!
//! let execution = engine.execute(&nodes, &edges, options).await;
//! ```

pub mod analyzer;
mod config;
mod engine;
mod error;
mod events;
mod execution;
pub mod handlers;
mod inputs;
mod options;
mod progress;

pub use config::{CancelPolicy, ConfigError, EngineConfig, GenerationDefaults, SummaryConfig};
pub use engine::{WorkflowEngine, settle};
pub use error::HandlerError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, FnNotifier, NoopNotifier};
pub use execution::{ExecutionResult, ExecutionStatus, Progress, RunFailure, WorkflowExecution};
pub use inputs::{NodeInput, NodeInputs, gather_inputs, render_text};
pub use options::ExecutionOptions;
