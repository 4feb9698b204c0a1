//! Graph storage and mutation.
//!
//! Nodes and edges live in BTreeMaps keyed by id so iteration order is stable,
//! which keeps layout and record serialization reproducible. All mutators are
//! synchronous and validate before touching state; no partial mutation is ever
//! observable (deleting a node removes the node and its incident edges in one
//! step).

use std::collections::BTreeMap;

use crate::graph::error::GraphError;
use crate::graph::types::{Edge, EdgeStyle, Node, NodeKind, Position, WorkerField, edge_id};

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<String, Edge>,
    /// Monotonic id counter. Never decremented, never reset, so deleted ids
    /// are never reused.
    next_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// The sequence number the next `add_node` will mint.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edges in edge-id order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Create a node with a freshly minted `<kind>-<n>` id.
    pub fn add_node(&mut self, kind: NodeKind, label: String, position: Position) -> &Node {
        let id = format!("{}-{}", kind.id_prefix(), self.next_id);
        self.next_id += 1;
        let node = Node::new(id.clone(), kind, label, position);
        self.nodes.insert(id.clone(), node);
        &self.nodes[&id]
    }

    /// Insert a node under a caller-chosen id. Used by the record loader,
    /// which derives worker ids from record ids and checks duplicates itself.
    pub(crate) fn insert_node(&mut self, node: Node) {
        debug_assert!(!self.nodes.contains_key(&node.id));
        self.nodes.insert(node.id.clone(), node);
    }

    /// Raise the id counter so freshly minted ids cannot collide with ids
    /// already inserted via `insert_node`.
    pub(crate) fn seed_counter(&mut self, min_next: u64) {
        self.next_id = self.next_id.max(min_next);
    }

    /// Remove a node and every edge touching it, atomically.
    pub fn delete_node(&mut self, id: &str) -> Result<(), GraphError> {
        if self.nodes.remove(id).is_none() {
            return Err(GraphError::NotFound(id.to_string()));
        }
        self.edges.retain(|_, e| e.source != id && e.target != id);
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, label: String) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;
        node.label = label;
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;
        node.position = position;
        Ok(())
    }

    pub fn set_worker_field(&mut self, id: &str, field: WorkerField) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;
        let Some(worker) = node.worker.as_mut() else {
            return Err(GraphError::InvalidKind {
                id: id.to_string(),
                kind: node.kind,
            });
        };
        match field {
            WorkerField::Metadata(text) => worker.metadata = text,
            WorkerField::BootstrapServer(server) => worker.bootstrap_server = server,
            WorkerField::Timeout(secs) => worker.timeout_seconds = secs,
        }
        Ok(())
    }

    /// Add a directed edge. Validates everything before mutating: both
    /// endpoints must exist, exactly one must be a worker, and the ordered
    /// pair must be new.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        style: EdgeStyle,
    ) -> Result<&Edge, GraphError> {
        let source_kind = self
            .nodes
            .get(source)
            .ok_or_else(|| GraphError::NotFound(source.to_string()))?
            .kind;
        let target_kind = self
            .nodes
            .get(target)
            .ok_or_else(|| GraphError::NotFound(target.to_string()))?
            .kind;
        if source_kind == target_kind {
            return Err(GraphError::BipartiteViolation {
                source_id: source.to_string(),
                target: target.to_string(),
            });
        }
        let id = edge_id(source, target);
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateEdge {
                source_id: source.to_string(),
                target: target.to_string(),
            });
        }
        let edge = Edge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            style,
        };
        self.edges.insert(id.clone(), edge);
        Ok(&self.edges[&id])
    }

    pub fn delete_edge(&mut self, id: &str) -> Result<(), GraphError> {
        if self.edges.remove(id).is_none() {
            return Err(GraphError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Rewrite the style of every edge (the edge-type toggle).
    pub fn set_edge_styles(&mut self, style: EdgeStyle) {
        for edge in self.edges.values_mut() {
            edge.style = style;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn worker_and_topic() -> (Graph, String, String) {
        let mut g = Graph::new();
        let w = g
            .add_node(NodeKind::Worker, "W1".into(), Position::default())
            .id
            .clone();
        let t = g
            .add_node(NodeKind::Topic, "t1".into(), Position::default())
            .id
            .clone();
        (g, w, t)
    }

    #[test]
    fn minted_ids_are_prefixed_and_monotonic() {
        let mut g = Graph::new();
        let a = g
            .add_node(NodeKind::Worker, "a".into(), Position::default())
            .id
            .clone();
        let b = g
            .add_node(NodeKind::Topic, "b".into(), Position::default())
            .id
            .clone();
        assert_eq!(a, "worker-1");
        assert_eq!(b, "topic-2");
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let mut g = Graph::new();
        let a = g
            .add_node(NodeKind::Worker, "a".into(), Position::default())
            .id
            .clone();
        g.delete_node(&a).unwrap();
        let b = g
            .add_node(NodeKind::Worker, "b".into(), Position::default())
            .id
            .clone();
        assert_eq!(b, "worker-2");
    }

    #[test]
    fn add_edge_rejects_same_kind_endpoints() {
        let mut g = Graph::new();
        let w1 = g
            .add_node(NodeKind::Worker, "W1".into(), Position::default())
            .id
            .clone();
        let w2 = g
            .add_node(NodeKind::Worker, "W2".into(), Position::default())
            .id
            .clone();
        let t1 = g
            .add_node(NodeKind::Topic, "t1".into(), Position::default())
            .id
            .clone();

        let err = g.add_edge(&w1, &w2, EdgeStyle::Floating).unwrap_err();
        assert!(matches!(err, GraphError::BipartiteViolation { .. }));

        // A topic connected to itself is same-kind as well.
        let err = g.add_edge(&t1, &t1, EdgeStyle::SmoothStep).unwrap_err();
        assert!(matches!(err, GraphError::BipartiteViolation { .. }));

        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn add_edge_rejects_duplicates_but_allows_reverse() {
        let (mut g, w, t) = worker_and_topic();
        g.add_edge(&t, &w, EdgeStyle::Floating).unwrap();

        let err = g.add_edge(&t, &w, EdgeStyle::Floating).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateEdge {
                source_id: t.clone(),
                target: w.clone(),
            }
        );

        // The opposite direction is a distinct pair.
        g.add_edge(&w, &t, EdgeStyle::Floating).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn add_edge_requires_existing_endpoints() {
        let (mut g, w, _t) = worker_and_topic();
        let err = g.add_edge("topic-99", &w, EdgeStyle::Floating).unwrap_err();
        assert_eq!(err, GraphError::NotFound("topic-99".to_string()));
    }

    #[test]
    fn edge_ids_are_deterministic() {
        let (mut g, w, t) = worker_and_topic();
        let id = g.add_edge(&t, &w, EdgeStyle::Floating).unwrap().id.clone();
        assert_eq!(id, edge_id(&t, &w));
        assert_eq!(id, format!("e-{t}-{w}"));
    }

    #[test]
    fn delete_node_cascades_to_incident_edges_only() {
        let mut g = Graph::new();
        let w1 = g
            .add_node(NodeKind::Worker, "W1".into(), Position::default())
            .id
            .clone();
        let w2 = g
            .add_node(NodeKind::Worker, "W2".into(), Position::default())
            .id
            .clone();
        let t1 = g
            .add_node(NodeKind::Topic, "t1".into(), Position::default())
            .id
            .clone();
        let t2 = g
            .add_node(NodeKind::Topic, "t2".into(), Position::default())
            .id
            .clone();
        g.add_edge(&t1, &w1, EdgeStyle::Floating).unwrap();
        g.add_edge(&w1, &t2, EdgeStyle::Floating).unwrap();
        g.add_edge(&t1, &w2, EdgeStyle::Floating).unwrap();

        g.delete_node(&w1).unwrap();

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        assert!(
            g.edges().all(|e| e.source != w1 && e.target != w1),
            "no surviving edge may reference the deleted node"
        );
    }

    #[test]
    fn deletes_surface_not_found_consistently() {
        let (mut g, _w, _t) = worker_and_topic();
        assert_eq!(
            g.delete_node("worker-99").unwrap_err(),
            GraphError::NotFound("worker-99".to_string())
        );
        assert_eq!(
            g.delete_edge("e-a-b").unwrap_err(),
            GraphError::NotFound("e-a-b".to_string())
        );
    }

    #[test]
    fn rename_changes_label_not_identity() {
        let (mut g, w, t) = worker_and_topic();
        g.add_edge(&t, &w, EdgeStyle::Floating).unwrap();

        g.rename_node(&t, "renamed".into()).unwrap();

        assert_eq!(g.node(&t).unwrap().label, "renamed");
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges().next().unwrap().source, t);
    }

    #[test]
    fn worker_fields_reject_topic_nodes() {
        let (mut g, w, t) = worker_and_topic();

        g.set_worker_field(&w, WorkerField::Timeout(Some(30)))
            .unwrap();
        assert_eq!(
            g.node(&w).unwrap().worker.as_ref().unwrap().timeout_seconds,
            Some(30)
        );

        let err = g
            .set_worker_field(&t, WorkerField::Metadata("x".into()))
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidKind {
                id: t.clone(),
                kind: NodeKind::Topic,
            }
        );
    }

    #[test]
    fn set_edge_styles_rewrites_all_edges() {
        let (mut g, w, t) = worker_and_topic();
        g.add_edge(&t, &w, EdgeStyle::Floating).unwrap();
        g.add_edge(&w, &t, EdgeStyle::Floating).unwrap();

        g.set_edge_styles(EdgeStyle::SmoothStep);

        assert!(g.edges().all(|e| e.style == EdgeStyle::SmoothStep));
    }
}
