//! Execution events and notifiers.
//!
//! The engine reports every node start, completion, failure and progress
//! update through an [`ExecutionNotifier`]. Consumers decide what to do
//! with them (stream to a UI, log, ignore).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::execution::{ExecutionStatus, Progress};

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExecutionEvent {
  /// The graph was accepted and nodes are about to run.
  WorkflowStarted {
    execution_id: String,
    total_nodes: usize,
  },

  NodeStarted {
    execution_id: String,
    node_id: String,
    kind: String,
  },

  NodeCompleted {
    execution_id: String,
    node_id: String,
    data: serde_json::Value,
    duration_ms: u64,
  },

  NodeFailed {
    execution_id: String,
    node_id: String,
    error: String,
  },

  /// Emitted after every node result, success or failure.
  Progress {
    execution_id: String,
    progress: Progress,
  },

  WorkflowCompleted { execution_id: String },

  WorkflowFailed { execution_id: String, error: String },

  WorkflowCancelled {
    execution_id: String,
    completed_nodes: usize,
  },
}

impl ExecutionEvent {
  pub fn execution_id(&self) -> &str {
    match self {
      ExecutionEvent::WorkflowStarted { execution_id, .. }
      | ExecutionEvent::NodeStarted { execution_id, .. }
      | ExecutionEvent::NodeCompleted { execution_id, .. }
      | ExecutionEvent::NodeFailed { execution_id, .. }
      | ExecutionEvent::Progress { execution_id, .. }
      | ExecutionEvent::WorkflowCompleted { execution_id }
      | ExecutionEvent::WorkflowFailed { execution_id, .. }
      | ExecutionEvent::WorkflowCancelled { execution_id, .. } => execution_id,
    }
  }

  /// The run status this event ends in, for the three terminal events.
  pub fn terminal_status(&self) -> Option<ExecutionStatus> {
    match self {
      ExecutionEvent::WorkflowCompleted { .. } => Some(ExecutionStatus::Completed),
      ExecutionEvent::WorkflowFailed { .. } => Some(ExecutionStatus::Failed),
      ExecutionEvent::WorkflowCancelled { .. } => Some(ExecutionStatus::Cancelled),
      _ => None,
    }
  }
}

/// Receives execution events.
///
/// `notify` is called inline on the engine's task, so implementations
/// should not block.
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {}
}

/// Sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls the run. Volume is a handful
  // of events per node.
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with the receiving end.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<ExecutionEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}

/// Calls a closure for every event.
pub struct FnNotifier<F>(F);

impl<F> FnNotifier<F>
where
  F: Fn(ExecutionEvent) + Send + Sync,
{
  pub fn new(f: F) -> Self {
    Self(f)
  }
}

impl<F> ExecutionNotifier for FnNotifier<F>
where
  F: Fn(ExecutionEvent) + Send + Sync,
{
  fn notify(&self, event: ExecutionEvent) {
    (self.0)(event)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_event_serializes_with_tag() {
    let event = ExecutionEvent::NodeFailed {
      execution_id: "run-1".to_string(),
      node_id: "ask".to_string(),
      error: "boom".to_string(),
    };
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["event"], "node_failed");
    assert_eq!(value["node_id"], "ask");
    assert_eq!(event.execution_id(), "run-1");
    assert_eq!(event.terminal_status(), None);
  }

  #[tokio::test]
  async fn test_channel_notifier_ignores_dropped_receiver() {
    let (notifier, mut receiver) = ChannelNotifier::channel();
    notifier.notify(ExecutionEvent::WorkflowCompleted {
      execution_id: "run-1".to_string(),
    });
    let event = receiver.recv().await.unwrap();
    assert_eq!(event.terminal_status(), Some(ExecutionStatus::Completed));

    drop(receiver);
    notifier.notify(ExecutionEvent::WorkflowCompleted {
      execution_id: "run-2".to_string(),
    });
  }
}
