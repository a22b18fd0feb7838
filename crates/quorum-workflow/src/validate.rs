use std::collections::{HashMap, HashSet};

use quorum_config::{Edge, Node, NodeKind};

use crate::error::{ValidationError, ValidationIssue};
use crate::graph::Graph;

/// Check a graph before execution.
///
/// Every violation is collected; nothing short-circuits. The function never
/// mutates its inputs and is deterministic for a given graph.
pub fn validate(nodes: &[Node], edges: &[Edge]) -> Result<(), ValidationError> {
  let mut issues = Vec::new();

  if nodes.is_empty() {
    issues.push(ValidationIssue::NoNodes);
  }
  if !nodes.iter().any(Node::is_input) {
    issues.push(ValidationIssue::MissingInputNode);
  }
  if !nodes.iter().any(Node::is_output) {
    issues.push(ValidationIssue::MissingOutputNode);
  }

  let mut seen = HashSet::new();
  for node in nodes {
    if !seen.insert(node.id.as_str()) {
      issues.push(ValidationIssue::DuplicateNode(node.id.clone()));
    }
  }

  for edge in edges {
    if !seen.contains(edge.source.as_str()) {
      issues.push(ValidationIssue::UnknownSource {
        edge_id: edge.id.clone(),
        node_id: edge.source.clone(),
      });
    }
    if !seen.contains(edge.target.as_str()) {
      issues.push(ValidationIssue::UnknownTarget {
        edge_id: edge.id.clone(),
        node_id: edge.target.clone(),
      });
    }
  }

  if nodes.len() > 1 {
    let connected: HashSet<&str> = edges
      .iter()
      .flat_map(|e| [e.source.as_str(), e.target.as_str()])
      .collect();
    let mut reported = HashSet::new();
    for node in nodes {
      if !connected.contains(node.id.as_str()) && reported.insert(node.id.as_str()) {
        issues.push(ValidationIssue::Disconnected(node.id.clone()));
      }
    }
  }

  let graph = Graph::new(nodes, edges);
  issues.extend(find_cycles(&graph));

  for node in nodes {
    issues.extend(check_node_config(node));
  }

  if issues.is_empty() {
    Ok(())
  } else {
    Err(ValidationError { issues })
  }
}

fn check_node_config(node: &Node) -> Vec<ValidationIssue> {
  let mut issues = Vec::new();
  match &node.kind {
    NodeKind::ModelCall {
      models,
      prompt_template,
      ..
    } => {
      if models.iter().all(|m| m.trim().is_empty()) {
        issues.push(ValidationIssue::MissingModels(node.id.clone()));
      }
      if prompt_template.trim().is_empty() {
        issues.push(ValidationIssue::MissingPrompt(node.id.clone()));
      }
    }
    NodeKind::Compare { mode: None } => {
      issues.push(ValidationIssue::MissingComparisonMode(node.id.clone()));
    }
    NodeKind::Output { format: None, .. } => {
      issues.push(ValidationIssue::MissingOutputFormat(node.id.clone()));
    }
    NodeKind::Input { .. }
    | NodeKind::Compare { .. }
    | NodeKind::Summarize { .. }
    | NodeKind::Output { .. } => {}
  }
  issues
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
  InProgress,
  Done,
}

/// DFS cycle detection. Each back-edge into the current path is reported
/// with the path that closes the loop.
///
/// The walk keeps its own stack of `(node, next child)` frames so long
/// chains cannot exhaust the thread stack.
fn find_cycles(graph: &Graph) -> Vec<ValidationIssue> {
  let mut state: HashMap<&str, Visit> = HashMap::new();
  let mut issues = Vec::new();

  for node_id in graph.node_ids() {
    if !state.contains_key(node_id.as_str()) {
      visit(graph, node_id, &mut state, &mut issues);
    }
  }

  issues
}

fn visit<'a>(
  graph: &'a Graph,
  root: &'a str,
  state: &mut HashMap<&'a str, Visit>,
  issues: &mut Vec<ValidationIssue>,
) {
  let mut frames: Vec<(&'a str, usize)> = vec![(root, 0)];
  state.insert(root, Visit::InProgress);

  while let Some(frame) = frames.last_mut() {
    let (node_id, index) = *frame;
    let Some(next) = graph.downstream(node_id).get(index) else {
      frames.pop();
      state.insert(node_id, Visit::Done);
      continue;
    };
    frame.1 += 1;

    match state.get(next.as_str()) {
      Some(Visit::InProgress) => {
        let start = frames.iter().position(|(id, _)| *id == next.as_str()).unwrap_or(0);
        let mut path: Vec<String> = frames[start..].iter().map(|(id, _)| id.to_string()).collect();
        path.push(next.clone());
        issues.push(ValidationIssue::Cycle { path });
      }
      Some(Visit::Done) => {}
      None => {
        state.insert(next, Visit::InProgress);
        frames.push((next, 0));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use quorum_config::{ComparisonMode, OutputFormat};

  fn linear() -> (Vec<Node>, Vec<Edge>) {
    (
      vec![
        Node::input("in", "hello"),
        Node::model_call("ask", ["ollama/llama3"], "Echo {input}"),
        Node::output("out", OutputFormat::Text),
      ],
      vec![Edge::new("e1", "in", "ask"), Edge::new("e2", "ask", "out")],
    )
  }

  #[test]
  fn test_valid_linear_graph() {
    let (nodes, edges) = linear();
    assert!(validate(&nodes, &edges).is_ok());
  }

  #[test]
  fn test_empty_graph_reports_all_missing_pieces() {
    let err = validate(&[], &[]).unwrap_err();
    assert_eq!(
      err.issues,
      vec![
        ValidationIssue::NoNodes,
        ValidationIssue::MissingInputNode,
        ValidationIssue::MissingOutputNode,
      ]
    );
  }

  #[test]
  fn test_single_node_is_not_disconnected() {
    let err = validate(&[Node::input("in", "x")], &[]).unwrap_err();
    assert_eq!(err.issues, vec![ValidationIssue::MissingOutputNode]);
  }

  #[test]
  fn test_self_loop_is_a_cycle() {
    let (nodes, mut edges) = linear();
    edges.push(Edge::new("loop", "ask", "ask"));

    let err = validate(&nodes, &edges).unwrap_err();
    assert_eq!(
      err.issues,
      vec![ValidationIssue::Cycle {
        path: vec!["ask".to_string(), "ask".to_string()],
      }]
    );
    assert_eq!(err.reasons(), vec!["cycle detected: ask -> ask".to_string()]);
  }

  #[test]
  fn test_config_problems_are_accumulated() {
    let nodes = vec![
      Node::input("in", "x"),
      Node::model_call("ask", Vec::<String>::new(), "  "),
      Node::new("cmp", NodeKind::Compare { mode: None }),
      Node::new(
        "out",
        NodeKind::Output {
          format: None,
          include_metadata: false,
        },
      ),
    ];
    let edges = vec![
      Edge::new("e1", "in", "ask"),
      Edge::new("e2", "ask", "cmp"),
      Edge::new("e3", "cmp", "out"),
    ];

    let err = validate(&nodes, &edges).unwrap_err();
    assert_eq!(
      err.issues,
      vec![
        ValidationIssue::MissingModels("ask".to_string()),
        ValidationIssue::MissingPrompt("ask".to_string()),
        ValidationIssue::MissingComparisonMode("cmp".to_string()),
        ValidationIssue::MissingOutputFormat("out".to_string()),
      ]
    );
  }

  #[test]
  fn test_dangling_edge_and_orphan() {
    let nodes = vec![
      Node::input("in", "x"),
      Node::compare("cmp", ComparisonMode::Consensus),
      Node::output("out", OutputFormat::Json),
    ];
    let edges = vec![Edge::new("e1", "in", "out"), Edge::new("e2", "ghost", "out")];

    let err = validate(&nodes, &edges).unwrap_err();
    assert_eq!(
      err.issues,
      vec![
        ValidationIssue::UnknownSource {
          edge_id: "e2".to_string(),
          node_id: "ghost".to_string(),
        },
        ValidationIssue::Disconnected("cmp".to_string()),
      ]
    );
  }

  #[test]
  fn test_long_chain_validates() {
    let mut nodes = vec![Node::input("in", "x")];
    nodes.extend((0..10_000).map(|i| Node::model_call(format!("m{}", i), ["a"], "{input}")));
    nodes.push(Node::output("out", OutputFormat::Text));

    let edges: Vec<Edge> = nodes
      .windows(2)
      .enumerate()
      .map(|(i, pair)| Edge::new(format!("e{}", i), pair[0].id.as_str(), pair[1].id.as_str()))
      .collect();
    assert!(validate(&nodes, &edges).is_ok());

    let mut looped = edges;
    looped.push(Edge::new("back", "m9999", "m0"));
    let err = validate(&nodes, &looped).unwrap_err();
    assert!(err.has_cycle());
    match &err.issues[0] {
      ValidationIssue::Cycle { path } => {
        assert_eq!(path.len(), 10_001);
        assert_eq!(path.first().map(String::as_str), Some("m0"));
        assert_eq!(path.last().map(String::as_str), Some("m0"));
      }
      other => panic!("unexpected issue: {:?}", other),
    }
  }
}
