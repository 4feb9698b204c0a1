//! Graph layer: the in-memory worker/topic graph and its mutation API.
//!
//! This module is the single source of truth for the editor. It owns:
//! - Node/Edge types (worker and topic nodes, directed styled edges)
//! - Graph: id-keyed storage plus the monotonic id counter
//! - GraphError: the mutation error taxonomy
//!
//! Invariants held after every public mutation:
//! - every edge endpoint references an existing node
//! - every edge connects exactly one worker and one topic
//! - at most one edge per ordered (source, target) pair
//! - node ids are never reused, even after deletion

pub mod error;
pub mod model;
pub mod types;

pub use error::GraphError;
pub use model::Graph;
pub use types::{Edge, EdgeStyle, Node, NodeKind, Position, WorkerData, WorkerField, edge_id};
