use std::collections::{HashMap, VecDeque};

use crate::error::CycleError;
use crate::graph::Graph;

/// Compute a topological order with Kahn's algorithm.
///
/// Ties are broken by node declaration order, so the result is stable for a
/// given graph. Returns [`CycleError`] when some nodes can never reach an
/// in-degree of zero.
pub fn topological_order(graph: &Graph) -> Result<Vec<String>, CycleError> {
  let mut in_degree: HashMap<&str, usize> = graph
    .node_ids()
    .iter()
    .map(|id| (id.as_str(), graph.upstream(id).len()))
    .collect();

  let mut queue: VecDeque<&str> = graph
    .node_ids()
    .iter()
    .map(String::as_str)
    .filter(|id| in_degree.get(id).copied() == Some(0))
    .collect();

  let mut order = Vec::with_capacity(graph.node_ids().len());

  while let Some(node_id) = queue.pop_front() {
    order.push(node_id.to_string());

    for next in graph.downstream(node_id) {
      if let Some(degree) = in_degree.get_mut(next.as_str()) {
        *degree -= 1;
        if *degree == 0 {
          queue.push_back(next.as_str());
        }
      }
    }
  }

  if order.len() < graph.node_ids().len() {
    return Err(CycleError {
      ordered: order.len(),
      total: graph.node_ids().len(),
    });
  }

  Ok(order)
}

#[cfg(test)]
mod tests {
  use super::*;
  use quorum_config::{Edge, Node};

  #[test]
  fn test_diamond_orders_dependencies_first() {
    let nodes = vec![
      Node::input("join", "j"),
      Node::input("left", "l"),
      Node::input("root", "r"),
      Node::input("right", "g"),
    ];
    let edges = vec![
      Edge::new("e1", "root", "left"),
      Edge::new("e2", "root", "right"),
      Edge::new("e3", "left", "join"),
      Edge::new("e4", "right", "join"),
    ];

    let order = topological_order(&Graph::new(&nodes, &edges)).unwrap();
    assert_eq!(order, vec!["root", "left", "right", "join"]);
  }

  #[test]
  fn test_cycle_yields_short_order() {
    let nodes = vec![
      Node::input("a", "1"),
      Node::input("b", "2"),
      Node::input("c", "3"),
    ];
    let edges = vec![
      Edge::new("e1", "a", "b"),
      Edge::new("e2", "b", "c"),
      Edge::new("e3", "c", "b"),
    ];

    let err = topological_order(&Graph::new(&nodes, &edges)).unwrap_err();
    assert_eq!(err, CycleError { ordered: 1, total: 3 });
  }
}
