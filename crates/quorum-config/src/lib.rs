//! Quorum Config
//!
//! This crate contains the serializable graph types for Quorum workflows:
//! nodes, edges and the per-kind settings each node carries.
//!
//! A workflow can be loaded from:
//! - JSON files (via the CLI with `quorum run workflow.json`)
//! - Any caller that builds the types directly and hands them to the engine
//!
//! These types are plain data. Validation lives in `quorum-workflow` and
//! execution in `quorum-engine`.

mod edge;
mod enums;
mod node;
mod workflow;

pub use edge::Edge;
pub use enums::{ComparisonMode, OutputFormat, SummaryLength, SummaryStyle};
pub use node::{Node, NodeKind};
pub use workflow::WorkflowDef;
