//! Editor controller: every user-triggered mutation flows through here.
//!
//! The frontend never mutates the graph directly; it issues commands against
//! this controller and re-renders from `graph()`. That keeps render and model
//! layers decoupled: the frontend holds node ids, not callbacks into the
//! model.
//!
//! Destructive actions are two-phase: `request_delete_*` stashes a pending
//! delete and returns the confirmation prompt, `confirm_pending` applies it.
//! Load/save are single-flight: a request issued while one is suspended on
//! the store is ignored with a notification.

use tracing::{debug, warn};

use crate::api::ConfigStore;
use crate::graph::{EdgeStyle, Graph, GraphError, NodeKind, Position, WorkerField};
use crate::layout::{Direction, LayoutParams, layout};
use crate::records::{graph_from_records, records_from_graph};

/// Slider bounds the original frontend allowed for spacing.
const SPACING_MIN: f64 = 100.0;
const SPACING_MAX: f64 = 500.0;

/// Notification surface of the rendering collaborator.
pub trait Frontend {
    fn notify_info(&self, message: &str);
    fn notify_error(&self, message: &str);
}

/// A destructive mutation waiting for user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingDelete {
    Node(String),
    Edge(String),
}

pub struct Editor<S, F> {
    graph: Graph,
    store: S,
    frontend: F,
    direction: Direction,
    params: LayoutParams,
    default_style: EdgeStyle,
    pending: Option<PendingDelete>,
    io_in_flight: bool,
}

impl<S: ConfigStore, F: Frontend> Editor<S, F> {
    pub fn new(store: S, frontend: F) -> Self {
        Self {
            graph: Graph::new(),
            store,
            frontend,
            direction: Direction::LeftRight,
            params: LayoutParams::default(),
            default_style: EdgeStyle::Floating,
            pending: None,
            io_in_flight: false,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn spacing(&self) -> LayoutParams {
        self.params
    }

    pub fn default_style(&self) -> EdgeStyle {
        self.default_style
    }

    /// Deterministic stand-in for the random scatter the original frontend
    /// used for freshly added nodes.
    fn provisional_position(kind: NodeKind, seq: u64) -> Position {
        let x = match kind {
            NodeKind::Worker => 200.0,
            NodeKind::Topic => 400.0,
        };
        Position::new(x, (seq as f64 * 40.0) % 250.0)
    }

    pub fn add_worker(&mut self) -> String {
        self.add_default_node(NodeKind::Worker, "Worker")
    }

    pub fn add_topic(&mut self) -> String {
        self.add_default_node(NodeKind::Topic, "Topic")
    }

    fn add_default_node(&mut self, kind: NodeKind, label_prefix: &str) -> String {
        let seq = self.graph.next_id();
        let position = Self::provisional_position(kind, seq);
        let id = self
            .graph
            .add_node(kind, format!("{label_prefix} {seq}"), position)
            .id
            .clone();
        debug!(%id, "added node");
        id
    }

    pub fn rename(&mut self, id: &str, label: &str) {
        if let Err(err) = self.graph.rename_node(id, label.to_string()) {
            self.frontend.notify_error(&err.to_string());
        }
    }

    pub fn set_metadata(&mut self, id: &str, text: &str) {
        self.set_worker_field(id, WorkerField::Metadata(text.to_string()));
    }

    pub fn set_bootstrap_server(&mut self, id: &str, server: &str) {
        self.set_worker_field(id, WorkerField::BootstrapServer(server.to_string()));
    }

    pub fn set_timeout(&mut self, id: &str, timeout_seconds: Option<u32>) {
        self.set_worker_field(id, WorkerField::Timeout(timeout_seconds));
    }

    fn set_worker_field(&mut self, id: &str, field: WorkerField) {
        if let Err(err) = self.graph.set_worker_field(id, field) {
            self.frontend.notify_error(&err.to_string());
        }
    }

    /// Drag target: the frontend reports the node's new position.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) {
        if let Err(err) = self.graph.set_position(id, Position::new(x, y)) {
            self.frontend.notify_error(&err.to_string());
        }
    }

    /// Click-to-connect. An invalid pair (same kind, or already connected) is
    /// rejected without any user-visible failure.
    pub fn connect(&mut self, source: &str, target: &str) {
        match self.graph.add_edge(source, target, self.default_style) {
            Ok(edge) => debug!(id = %edge.id, "connected"),
            Err(
                err @ (GraphError::BipartiteViolation { .. } | GraphError::DuplicateEdge { .. }),
            ) => {
                debug!(%err, "connection rejected");
            }
            Err(err) => self.frontend.notify_error(&err.to_string()),
        }
    }

    /// Stage a node deletion; returns the confirmation prompt, or None if the
    /// node does not exist. A previously staged delete is replaced.
    pub fn request_delete_node(&mut self, id: &str) -> Option<String> {
        let Some(node) = self.graph.node(id) else {
            self.frontend
                .notify_error(&GraphError::NotFound(id.to_string()).to_string());
            return None;
        };
        let incident = self
            .graph
            .edges()
            .filter(|e| e.source == id || e.target == id)
            .count();
        let prompt = format!(
            "delete {} \"{}\" and its {} edge(s)?",
            node.kind, node.label, incident
        );
        self.pending = Some(PendingDelete::Node(id.to_string()));
        Some(prompt)
    }

    /// Stage an edge deletion; same protocol as `request_delete_node`.
    pub fn request_delete_edge(&mut self, id: &str) -> Option<String> {
        let Some(edge) = self.graph.edge(id) else {
            self.frontend
                .notify_error(&GraphError::NotFound(id.to_string()).to_string());
            return None;
        };
        let prompt = format!("delete edge {} -> {}?", edge.source, edge.target);
        self.pending = Some(PendingDelete::Edge(id.to_string()));
        Some(prompt)
    }

    /// Apply the staged delete.
    pub fn confirm_pending(&mut self) {
        let result = match self.pending.take() {
            Some(PendingDelete::Node(id)) => {
                debug!(%id, "deleting node");
                self.graph.delete_node(&id)
            }
            Some(PendingDelete::Edge(id)) => {
                debug!(%id, "deleting edge");
                self.graph.delete_edge(&id)
            }
            None => Ok(()),
        };
        if let Err(err) = result {
            self.frontend.notify_error(&err.to_string());
        }
    }

    /// Drop the staged delete without applying it.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Run the layout engine with the current spacing and apply the result.
    pub fn relayout(&mut self, direction: Direction) {
        self.direction = direction;
        let positions = layout(&self.graph, direction, &self.params);
        for (id, position) in positions {
            if self.graph.set_position(&id, position).is_err() {
                debug!(%id, "layout returned a position for an unknown node");
            }
        }
    }

    /// Spacing is clamped to the range the original slider exposed.
    pub fn set_spacing(&mut self, rank_spacing: f64, node_spacing: f64) {
        self.params = LayoutParams {
            rank_spacing: rank_spacing.clamp(SPACING_MIN, SPACING_MAX),
            node_spacing: node_spacing.clamp(SPACING_MIN, SPACING_MAX),
        };
    }

    /// Flip the session default edge style and restyle every existing edge.
    pub fn toggle_edge_style(&mut self) -> EdgeStyle {
        self.default_style = self.default_style.toggled();
        self.graph.set_edge_styles(self.default_style);
        self.default_style
    }

    /// Fetch records and rebuild the graph. On failure the current graph is
    /// left untouched so the session can keep working and retry.
    pub async fn load(&mut self) {
        if self.io_in_flight {
            self.frontend
                .notify_info("a load/save is already in flight; ignoring");
            return;
        }
        self.io_in_flight = true;
        let result = self.store.load().await;
        self.io_in_flight = false;

        let records = match result {
            Ok(records) => records,
            Err(err) => {
                warn!(%err, "load failed");
                self.frontend.notify_error(&format!("failed to load: {err}"));
                return;
            }
        };
        match graph_from_records(&records) {
            Ok(graph) => {
                self.graph = graph;
                self.relayout(self.direction);
                self.frontend
                    .notify_info(&format!("loaded {} workers", records.len()));
            }
            Err(err) => {
                warn!(%err, "loaded records were invalid");
                self.frontend.notify_error(&format!("failed to load: {err}"));
            }
        }
    }

    /// Serialize the graph and hand it to the store. On failure the in-memory
    /// edits are preserved, not rolled back, so the user may retry.
    pub async fn save(&mut self) {
        if self.io_in_flight {
            self.frontend
                .notify_info("a load/save is already in flight; ignoring");
            return;
        }
        let records = match records_from_graph(&self.graph) {
            Ok(records) => records,
            Err(err) => {
                self.frontend.notify_error(&format!("failed to save: {err}"));
                return;
            }
        };

        self.io_in_flight = true;
        let result = self.store.save(&records).await;
        self.io_in_flight = false;

        match result {
            Ok(()) => self
                .frontend
                .notify_info(&format!("graph saved ({} workers)", records.len())),
            Err(err) => {
                warn!(%err, "save failed");
                self.frontend.notify_error(&format!("failed to save: {err}"));
            }
        }
    }

    #[cfg(test)]
    fn set_io_in_flight(&mut self, in_flight: bool) {
        self.io_in_flight = in_flight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryConfigStore;
    use crate::graph::edge_id;
    use crate::records::Record;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingFrontend {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingFrontend {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter(|e| e.starts_with("error:"))
                .collect()
        }
    }

    impl Frontend for RecordingFrontend {
        fn notify_info(&self, message: &str) {
            self.events.lock().unwrap().push(format!("info: {message}"));
        }

        fn notify_error(&self, message: &str) {
            self.events.lock().unwrap().push(format!("error: {message}"));
        }
    }

    fn record(id: u32, name: &str, inputs: &str, outputs: &str) -> Record {
        Record {
            id,
            consumer_name: name.to_string(),
            topics_input: inputs.to_string(),
            topics_output: outputs.to_string(),
            metadatas: Some(String::new()),
            kafka_bootstrap_server: Some("localhost:9092".to_string()),
            timeout: None,
        }
    }

    fn editor_with(
        records: Vec<Record>,
    ) -> (
        Editor<InMemoryConfigStore, RecordingFrontend>,
        InMemoryConfigStore,
        RecordingFrontend,
    ) {
        let store = InMemoryConfigStore::new(records);
        let frontend = RecordingFrontend::default();
        let editor = Editor::new(store.clone(), frontend.clone());
        (editor, store, frontend)
    }

    #[tokio::test]
    async fn load_builds_and_lays_out_the_graph() {
        let (mut editor, _store, frontend) = editor_with(vec![record(1, "W1", "t1,t2", "t3")]);

        editor.load().await;

        assert_eq!(editor.graph().node_count(), 4);
        assert_eq!(editor.graph().edge_count(), 3);
        // Layout ran: the output topic sits two ranks right of the inputs.
        let by_label = |label: &str| {
            editor
                .graph()
                .nodes()
                .find(|n| n.label == label)
                .unwrap()
                .position
        };
        assert!(by_label("t3").x > by_label("t1").x);
        assert!(frontend.errors().is_empty());
    }

    #[tokio::test]
    async fn load_failure_leaves_graph_untouched() {
        let (mut editor, store, frontend) = editor_with(vec![record(1, "W1", "t1", "")]);
        editor.load().await;
        assert_eq!(editor.graph().node_count(), 2);

        store.set_fail_requests(true);
        editor.load().await;

        assert_eq!(editor.graph().node_count(), 2, "graph must survive a failed reload");
        assert_eq!(frontend.errors().len(), 1);
    }

    #[tokio::test]
    async fn save_round_trips_session_edits() {
        let (mut editor, store, _frontend) = editor_with(Vec::new());

        let worker = editor.add_worker();
        let topic = editor.add_topic();
        editor.rename(&topic, "events");
        editor.connect(&topic, &worker);
        editor.save().await;

        let saved = store.records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].topics_input, "events");
        assert_eq!(saved[0].topics_output, "");
    }

    #[tokio::test]
    async fn save_failure_preserves_edits_for_retry() {
        let (mut editor, store, frontend) = editor_with(Vec::new());
        let worker = editor.add_worker();
        editor.rename(&worker, "retry-me");

        store.set_fail_requests(true);
        editor.save().await;
        assert_eq!(frontend.errors().len(), 1);
        assert_eq!(editor.graph().node_count(), 1);

        store.set_fail_requests(false);
        editor.save().await;
        assert_eq!(store.records()[0].consumer_name, "retry-me");
    }

    #[tokio::test]
    async fn second_request_while_io_in_flight_is_ignored() {
        let (mut editor, store, frontend) = editor_with(Vec::new());
        editor.add_worker();

        editor.set_io_in_flight(true);
        editor.save().await;
        editor.load().await;

        assert!(store.records().is_empty(), "guarded save must not reach the store");
        assert_eq!(editor.graph().node_count(), 1, "guarded load must not replace the graph");
        assert_eq!(
            frontend
                .events()
                .iter()
                .filter(|e| e.contains("already in flight"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn connect_rejects_invalid_pairs_silently() {
        let (mut editor, _store, frontend) = editor_with(Vec::new());
        let w1 = editor.add_worker();
        let w2 = editor.add_worker();
        let t1 = editor.add_topic();

        editor.connect(&w1, &w2);
        editor.connect(&t1, &t1);
        assert_eq!(editor.graph().edge_count(), 0);

        editor.connect(&t1, &w1);
        editor.connect(&t1, &w1);
        assert_eq!(editor.graph().edge_count(), 1);

        assert!(frontend.errors().is_empty(), "rejections must be silent");
    }

    #[tokio::test]
    async fn delete_is_two_phase() {
        let (mut editor, _store, _frontend) = editor_with(Vec::new());
        let worker = editor.add_worker();
        let topic = editor.add_topic();
        editor.connect(&topic, &worker);

        let prompt = editor.request_delete_node(&worker).unwrap();
        assert!(prompt.contains("1 edge(s)"));
        editor.cancel_pending();
        editor.confirm_pending();
        assert_eq!(editor.graph().node_count(), 2, "cancelled delete must not apply");

        editor.request_delete_node(&worker).unwrap();
        editor.confirm_pending();
        assert_eq!(editor.graph().node_count(), 1);
        assert_eq!(editor.graph().edge_count(), 0);

        editor.connect(&topic, &worker);
        assert_eq!(editor.graph().edge_count(), 0, "deleted node stays gone");
    }

    #[tokio::test]
    async fn delete_edge_is_two_phase_as_well() {
        let (mut editor, _store, _frontend) = editor_with(Vec::new());
        let worker = editor.add_worker();
        let topic = editor.add_topic();
        editor.connect(&worker, &topic);

        let id = edge_id(&worker, &topic);
        editor.request_delete_edge(&id).unwrap();
        editor.confirm_pending();

        assert_eq!(editor.graph().edge_count(), 0);
        assert_eq!(editor.graph().node_count(), 2);
    }

    #[tokio::test]
    async fn requesting_delete_of_missing_node_notifies() {
        let (mut editor, _store, frontend) = editor_with(Vec::new());
        assert!(editor.request_delete_node("worker-99").is_none());
        // Nothing was staged, so confirming is a no-op.
        editor.confirm_pending();
        assert_eq!(frontend.errors().len(), 1);
    }

    #[tokio::test]
    async fn toggle_edge_style_restyles_existing_edges() {
        let (mut editor, _store, _frontend) = editor_with(Vec::new());
        let worker = editor.add_worker();
        let topic = editor.add_topic();
        editor.connect(&topic, &worker);

        assert_eq!(editor.toggle_edge_style(), EdgeStyle::SmoothStep);
        assert!(editor.graph().edges().all(|e| e.style == EdgeStyle::SmoothStep));

        // New connections pick up the session default.
        editor.connect(&worker, &topic);
        assert!(editor.graph().edges().all(|e| e.style == EdgeStyle::SmoothStep));
    }

    #[tokio::test]
    async fn spacing_is_clamped_to_slider_bounds() {
        let (mut editor, _store, _frontend) = editor_with(Vec::new());
        editor.set_spacing(50.0, 900.0);
        assert_eq!(editor.spacing().rank_spacing, 100.0);
        assert_eq!(editor.spacing().node_spacing, 500.0);
    }

    #[tokio::test]
    async fn added_nodes_get_default_labels_from_the_counter() {
        let (mut editor, _store, _frontend) = editor_with(Vec::new());
        let w = editor.add_worker();
        let t = editor.add_topic();

        assert_eq!(editor.graph().node(&w).unwrap().label, "Worker 1");
        assert_eq!(editor.graph().node(&t).unwrap().label, "Topic 2");
    }
}
