//! Quorum Workflow
//!
//! This crate turns the plain graph description from `quorum-config` into
//! something the engine can schedule:
//! - [`Graph`] indexes nodes and edges for traversal
//! - [`validate`] checks structural and per-kind configuration invariants
//! - [`topological_order`] computes a dependency-respecting execution order
//!
//! Everything here is pure and runs in O(V+E).

mod error;
mod graph;
mod order;
mod validate;

pub use error::{CycleError, ValidationError, ValidationIssue};
pub use graph::Graph;
pub use order::topological_order;
pub use validate::validate;
