//! Integration tests for validation and ordering over whole workflow files.

use quorum_config::{Edge, Node, WorkflowDef};
use quorum_workflow::{Graph, ValidationIssue, topological_order, validate};
use serde_json::json;

fn load(value: serde_json::Value) -> WorkflowDef {
  serde_json::from_value(value).expect("workflow fixture should parse")
}

fn fan_in_workflow() -> WorkflowDef {
  load(json!({
    "workflow_id": "fan-in",
    "name": "Fan in",
    "nodes": [
      { "id": "out", "type": "output", "format": "markdown" },
      { "id": "cmp", "type": "compare", "mode": "conflicts" },
      { "id": "ask_b", "type": "model_call", "models": ["b"], "prompt_template": "{input}" },
      { "id": "ask_a", "type": "model_call", "models": ["a"], "prompt_template": "{input}" },
      { "id": "question", "type": "input", "content": "Is the sky blue?" }
    ],
    "edges": [
      { "id": "e1", "source": "question", "target": "ask_a" },
      { "id": "e2", "source": "question", "target": "ask_b" },
      { "id": "e3", "source": "ask_a", "target": "cmp", "target_handle": "left" },
      { "id": "e4", "source": "ask_b", "target": "cmp", "target_handle": "right" },
      { "id": "e5", "source": "cmp", "target": "out" }
    ]
  }))
}

#[test]
fn test_every_node_follows_its_ancestors() {
  let workflow = fan_in_workflow();
  validate(&workflow.nodes, &workflow.edges).expect("fixture is valid");

  let order = topological_order(&Graph::new(&workflow.nodes, &workflow.edges)).unwrap();
  assert_eq!(order.len(), workflow.nodes.len());

  let position = |id: &str| order.iter().position(|n| n == id).unwrap();
  for edge in &workflow.edges {
    assert!(
      position(&edge.source) < position(&edge.target),
      "{} must run before {}",
      edge.source,
      edge.target
    );
  }
}

#[test]
fn test_validation_is_idempotent() {
  let mut workflow = fan_in_workflow();
  workflow.edges.push(Edge::new("back", "out", "question"));
  workflow.nodes.push(Node::input("stray", "unused"));

  let first = validate(&workflow.nodes, &workflow.edges);
  let second = validate(&workflow.nodes, &workflow.edges);
  assert_eq!(first, second);
}

#[test]
fn test_cycle_is_rejected_with_reason() {
  let mut workflow = fan_in_workflow();
  workflow.edges.push(Edge::new("back", "cmp", "question"));

  let err = validate(&workflow.nodes, &workflow.edges).unwrap_err();
  assert!(err.has_cycle());
  assert!(err.reasons().iter().any(|r| r.contains("cycle")));

  let graph = Graph::new(&workflow.nodes, &workflow.edges);
  assert!(topological_order(&graph).is_err());
}

#[test]
fn test_duplicate_ids_are_reported() {
  let mut workflow = fan_in_workflow();
  workflow.nodes.push(Node::input("question", "again"));

  let err = validate(&workflow.nodes, &workflow.edges).unwrap_err();
  assert!(
    err
      .issues
      .contains(&ValidationIssue::DuplicateNode("question".to_string()))
  );
}
