//! Workflow execution engine.
//!
//! `WorkflowEngine` validates a graph, orders it topologically and runs
//! one node at a time, feeding each node the payloads of its successful
//! upstream nodes. Only the models of a single `model_call` node run
//! concurrently.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use quorum_config::{Edge, Node, WorkflowDef};
use quorum_provider::ProviderGateway;
use quorum_workflow::{Graph, topological_order, validate};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::config::{CancelPolicy, EngineConfig};
use crate::error::HandlerError;
use crate::events::{ExecutionEvent, ExecutionNotifier};
use crate::execution::{ExecutionResult, ExecutionStatus, RunFailure, WorkflowExecution};
use crate::handlers::{self, HandlerContext};
use crate::inputs::{NodeInputs, gather_inputs};
use crate::options::ExecutionOptions;
use crate::progress::ProgressTracker;

/// Handle for a spawned node task.
type NodeHandle = tokio::task::JoinHandle<Result<Value, HandlerError>>;

/// The workflow execution engine.
///
/// Holds no per-run state, so one engine can serve concurrent runs.
#[derive(Clone)]
pub struct WorkflowEngine {
  gateway: Arc<dyn ProviderGateway>,
  config: Arc<EngineConfig>,
}

impl WorkflowEngine {
  /// Create an engine with the default configuration.
  pub fn new(gateway: Arc<dyn ProviderGateway>) -> Self {
    Self::with_config(gateway, EngineConfig::default())
  }

  pub fn with_config(gateway: Arc<dyn ProviderGateway>, config: EngineConfig) -> Self {
    Self {
      gateway,
      config: Arc::new(config),
    }
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Run a workflow definition.
  #[instrument(
    name = "workflow_execute",
    skip(self, workflow, options),
    fields(workflow_id = %workflow.workflow_id)
  )]
  pub async fn execute_workflow(
    &self,
    workflow: &WorkflowDef,
    options: ExecutionOptions,
  ) -> WorkflowExecution {
    self.run(&workflow.nodes, &workflow.edges, options).await
  }

  /// Run a graph to completion, failure or cancellation.
  ///
  /// Never returns an error: rejected graphs, failed nodes and
  /// cancellation are all reported on the returned execution.
  #[instrument(
    name = "workflow_execute",
    skip(self, nodes, edges, options),
    fields(nodes = nodes.len(), edges = edges.len())
  )]
  pub async fn execute(
    &self,
    nodes: &[Node],
    edges: &[Edge],
    options: ExecutionOptions,
  ) -> WorkflowExecution {
    self.run(nodes, edges, options).await
  }

  /// Run one node in isolation against the given inputs.
  ///
  /// For debugging a single step without walking the graph. No events are
  /// emitted.
  #[instrument(name = "node_execute", skip(self, node, inputs, options), fields(node_id = %node.id))]
  pub async fn execute_node(
    &self,
    node: &Node,
    inputs: NodeInputs,
    options: &ExecutionOptions,
  ) -> ExecutionResult {
    let started = Instant::now();
    let handle = tokio::spawn(handlers::run(node.clone(), inputs, self.context(options)));
    match join_node(&node.id, handle.await) {
      Ok(data) => ExecutionResult::succeeded(&node.id, data, started.elapsed()),
      Err(e) => ExecutionResult::failed(&node.id, e.to_string(), started.elapsed()),
    }
  }

  async fn run(&self, nodes: &[Node], edges: &[Edge], options: ExecutionOptions) -> WorkflowExecution {
    let mut execution = WorkflowExecution::start();
    let execution_id = execution.id.clone();
    let notifier = options.notifier.clone();

    if let Err(e) = validate(nodes, edges) {
      warn!(execution_id = %execution_id, error = %e, "workflow_rejected");
      let failure = RunFailure::Validation { reasons: e.reasons() };
      return finish(execution, ExecutionStatus::Failed, Some(failure), notifier.as_ref());
    }

    let graph = Graph::new(nodes, edges);
    let order = match topological_order(&graph) {
      Ok(order) => order,
      Err(e) => {
        warn!(execution_id = %execution_id, error = %e, "workflow_rejected");
        let failure = RunFailure::Cycle { message: e.to_string() };
        return finish(execution, ExecutionStatus::Failed, Some(failure), notifier.as_ref());
      }
    };

    info!(execution_id = %execution_id, total_nodes = order.len(), "workflow_started");
    notifier.notify(ExecutionEvent::WorkflowStarted {
      execution_id: execution_id.clone(),
      total_nodes: order.len(),
    });

    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let ctx = self.context(&options);
    let mut completed: HashMap<String, ExecutionResult> = HashMap::new();
    let mut tracker = ProgressTracker::new(order.len());

    for node_id in &order {
      if options.cancel.is_cancelled() {
        return finish(execution, ExecutionStatus::Cancelled, None, notifier.as_ref());
      }

      let Some(node) = by_id.get(node_id.as_str()).copied() else {
        continue;
      };
      let inputs = gather_inputs(&graph, node_id, &completed);

      info!(
        execution_id = %execution_id,
        node_id = %node_id,
        kind = node.kind.name(),
        inputs = inputs.len(),
        "node_started"
      );
      notifier.notify(ExecutionEvent::NodeStarted {
        execution_id: execution_id.clone(),
        node_id: node_id.clone(),
        kind: node.kind.name().to_string(),
      });

      let started = Instant::now();
      let handle: NodeHandle = tokio::spawn(handlers::run(node.clone(), inputs, ctx.clone()));

      let joined = match self.config.cancel_policy {
        CancelPolicy::Drain => handle.await,
        CancelPolicy::Abort => {
          let abort = handle.abort_handle();
          tokio::select! {
            joined = handle => joined,
            _ = options.cancel.cancelled() => {
              abort.abort();
              warn!(execution_id = %execution_id, node_id = %node_id, "node_aborted");
              return finish(execution, ExecutionStatus::Cancelled, None, notifier.as_ref());
            }
          }
        }
      };
      let took = started.elapsed();

      let result = match join_node(node_id, joined) {
        Ok(data) => {
          info!(
            execution_id = %execution_id,
            node_id = %node_id,
            duration_ms = took.as_millis() as u64,
            "node_completed"
          );
          let result = ExecutionResult::succeeded(node_id, data, took);
          notifier.notify(ExecutionEvent::NodeCompleted {
            execution_id: execution_id.clone(),
            node_id: node_id.clone(),
            data: result.data.clone().unwrap_or(Value::Null),
            duration_ms: result.duration_ms,
          });
          result
        }
        Err(e) => {
          error!(execution_id = %execution_id, node_id = %node_id, error = %e, "node_failed");
          notifier.notify(ExecutionEvent::NodeFailed {
            execution_id: execution_id.clone(),
            node_id: node_id.clone(),
            error: e.to_string(),
          });
          ExecutionResult::failed(node_id, e.to_string(), took)
        }
      };

      completed.insert(node_id.clone(), result.clone());
      execution.record(result);

      notifier.notify(ExecutionEvent::Progress {
        execution_id: execution_id.clone(),
        progress: tracker.record(node_id, took),
      });
    }

    let (status, failure) = settle(nodes, &execution.results);
    finish(execution, status, failure, notifier.as_ref())
  }

  fn context(&self, options: &ExecutionOptions) -> HandlerContext {
    HandlerContext {
      gateway: self.gateway.clone(),
      config: self.config.clone(),
      credentials: options.credentials.clone(),
      generation: options
        .generation
        .clone()
        .unwrap_or_else(|| self.config.generation.clone()),
    }
  }
}

/// Flatten a joined node task into the handler's outcome. A panicked or
/// cancelled task becomes an `Aborted` error.
fn join_node(
  node_id: &str,
  joined: Result<Result<Value, HandlerError>, tokio::task::JoinError>,
) -> Result<Value, HandlerError> {
  joined
    .map_err(|e| HandlerError::Aborted {
      node_id: node_id.to_string(),
      message: format!("task join error: {}", e),
    })
    .and_then(|outcome| outcome)
}

/// Final status of a run that visited every node.
///
/// A failed output node fails the run with `output_failed`. Any other
/// failed node fails it with `node_failures`.
pub fn settle(nodes: &[Node], results: &[ExecutionResult]) -> (ExecutionStatus, Option<RunFailure>) {
  let outputs: HashSet<&str> = nodes
    .iter()
    .filter(|n| n.is_output())
    .map(|n| n.id.as_str())
    .collect();

  let failed: Vec<&ExecutionResult> = results.iter().filter(|r| !r.success).collect();
  if failed.is_empty() {
    return (ExecutionStatus::Completed, None);
  }

  let failed_outputs: Vec<String> = failed
    .iter()
    .filter(|r| outputs.contains(r.node_id.as_str()))
    .map(|r| r.node_id.clone())
    .collect();

  let failure = if failed_outputs.is_empty() {
    RunFailure::NodeFailures {
      node_ids: failed.iter().map(|r| r.node_id.clone()).collect(),
    }
  } else {
    RunFailure::OutputFailed {
      node_ids: failed_outputs,
    }
  };
  (ExecutionStatus::Failed, Some(failure))
}

fn finish(
  mut execution: WorkflowExecution,
  status: ExecutionStatus,
  failure: Option<RunFailure>,
  notifier: &dyn ExecutionNotifier,
) -> WorkflowExecution {
  let error = failure.as_ref().map(describe_failure);
  if !execution.finish(status, failure) {
    return execution;
  }

  let execution_id = execution.id.clone();
  match status {
    ExecutionStatus::Completed => {
      info!(execution_id = %execution_id, results = execution.results.len(), "workflow_completed");
      notifier.notify(ExecutionEvent::WorkflowCompleted { execution_id });
    }
    ExecutionStatus::Cancelled => {
      warn!(execution_id = %execution_id, completed_nodes = execution.results.len(), "workflow_cancelled");
      notifier.notify(ExecutionEvent::WorkflowCancelled {
        execution_id,
        completed_nodes: execution.results.len(),
      });
    }
    ExecutionStatus::Failed => {
      let error = error.unwrap_or_else(|| "workflow failed".to_string());
      error!(execution_id = %execution_id, error = %error, "workflow_failed");
      notifier.notify(ExecutionEvent::WorkflowFailed { execution_id, error });
    }
    ExecutionStatus::Running => {}
  }
  execution
}

fn describe_failure(failure: &RunFailure) -> String {
  match failure {
    RunFailure::Validation { reasons } => format!("invalid workflow: {}", reasons.join("; ")),
    RunFailure::Cycle { message } => message.clone(),
    RunFailure::OutputFailed { node_ids } => format!("output node(s) failed: {}", node_ids.join(", ")),
    RunFailure::NodeFailures { node_ids } => format!("node(s) failed: {}", node_ids.join(", ")),
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use quorum_config::{ComparisonMode, OutputFormat};
  use serde_json::json;

  use super::*;

  fn ok(id: &str) -> ExecutionResult {
    ExecutionResult::succeeded(id, json!("x"), Duration::ZERO)
  }

  fn failed(id: &str) -> ExecutionResult {
    ExecutionResult::failed(id, "boom", Duration::ZERO)
  }

  fn nodes() -> Vec<Node> {
    vec![
      Node::input("in", "text"),
      Node::compare("cmp", ComparisonMode::Consensus),
      Node::output("out", OutputFormat::Text),
    ]
  }

  #[test]
  fn test_settle_all_succeeded() {
    let (status, failure) = settle(&nodes(), &[ok("in"), ok("cmp"), ok("out")]);
    assert_eq!(status, ExecutionStatus::Completed);
    assert_eq!(failure, None);
  }

  #[test]
  fn test_settle_inner_failure() {
    let (status, failure) = settle(&nodes(), &[ok("in"), failed("cmp"), ok("out")]);
    assert_eq!(status, ExecutionStatus::Failed);
    assert_eq!(
      failure,
      Some(RunFailure::NodeFailures {
        node_ids: vec!["cmp".to_string()]
      })
    );
  }

  #[test]
  fn test_settle_output_failure_wins() {
    let (status, failure) = settle(&nodes(), &[ok("in"), failed("cmp"), failed("out")]);
    assert_eq!(status, ExecutionStatus::Failed);
    assert_eq!(
      failure,
      Some(RunFailure::OutputFailed {
        node_ids: vec!["out".to_string()]
      })
    );
  }
}
