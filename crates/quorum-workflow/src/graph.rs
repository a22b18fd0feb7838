use std::collections::HashMap;

use quorum_config::{Edge, Node};

/// Graph structure for traversal and analysis.
///
/// Only edges whose endpoints both exist are indexed; dangling edges are
/// reported by the validator instead.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Node ids in the order they were supplied.
  node_order: Vec<String>,
  /// Adjacency list: node_id -> list of downstream node_ids.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: node_id -> list of upstream node_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Incoming edges per node, in edge declaration order.
  incoming: HashMap<String, Vec<Edge>>,
}

impl Graph {
  /// Build a graph from nodes and edges.
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    let mut node_order = Vec::with_capacity(nodes.len());
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut incoming: HashMap<String, Vec<Edge>> = HashMap::new();

    for node in nodes {
      if adjacency.contains_key(&node.id) {
        continue;
      }
      node_order.push(node.id.clone());
      adjacency.insert(node.id.clone(), Vec::new());
      reverse_adjacency.insert(node.id.clone(), Vec::new());
      incoming.insert(node.id.clone(), Vec::new());
    }

    for edge in edges {
      if !adjacency.contains_key(&edge.source) || !adjacency.contains_key(&edge.target) {
        continue;
      }
      adjacency
        .entry(edge.source.clone())
        .or_default()
        .push(edge.target.clone());
      reverse_adjacency
        .entry(edge.target.clone())
        .or_default()
        .push(edge.source.clone());
      incoming
        .entry(edge.target.clone())
        .or_default()
        .push(edge.clone());
    }

    Self {
      node_order,
      adjacency,
      reverse_adjacency,
      incoming,
    }
  }

  /// Node ids in declaration order (duplicates collapsed).
  pub fn node_ids(&self) -> &[String] {
    &self.node_order
  }

  pub fn contains(&self, node_id: &str) -> bool {
    self.adjacency.contains_key(node_id)
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream nodes for a given node.
  pub fn upstream(&self, node_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get the edges that feed a given node.
  pub fn incoming_edges(&self, node_id: &str) -> &[Edge] {
    self
      .incoming
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get entry points (nodes with no incoming edges).
  pub fn entry_points(&self) -> Vec<&str> {
    self
      .node_order
      .iter()
      .filter(|id| self.upstream(id).is_empty())
      .map(String::as_str)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_dangling_edges_are_not_indexed() {
    let nodes = vec![Node::input("a", "x"), Node::input("b", "y")];
    let edges = vec![Edge::new("e1", "a", "b"), Edge::new("e2", "a", "ghost")];

    let graph = Graph::new(&nodes, &edges);
    assert_eq!(graph.downstream("a"), ["b".to_string()]);
    assert!(graph.incoming_edges("ghost").is_empty());
    assert_eq!(graph.entry_points(), vec!["a"]);
  }
}
