//! Mutation error taxonomy.
//!
//! Callers dispatch on these (the editor rejects bipartite violations and
//! duplicate edges silently but surfaces NotFound), so they are a typed enum
//! rather than anyhow errors.

use crate::graph::types::NodeKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("no node or edge with id {0}")]
    NotFound(String),

    #[error("field does not apply to {kind} node {id}")]
    InvalidKind { id: String, kind: NodeKind },

    #[error("edge must connect a worker and a topic: {source_id} -> {target}")]
    BipartiteViolation { source_id: String, target: String },

    #[error("edge {source_id} -> {target} already exists")]
    DuplicateEdge { source_id: String, target: String },
}
