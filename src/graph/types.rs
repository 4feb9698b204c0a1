//! Node and edge types.
//!
//! Node ids are synthetic (`worker-<n>` / `topic-<n>`) and immutable; labels
//! are display text and may be edited freely. In particular a topic's label is
//! NOT its identity: renaming a topic touches only the label, and edges keep
//! pointing at the synthetic id.

use std::fmt;

/// 2-D canvas position. Assigned by the layout engine or by dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Worker,
    Topic,
}

impl NodeKind {
    /// Prefix used when minting synthetic node ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            NodeKind::Worker => "worker",
            NodeKind::Topic => "topic",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id_prefix())
    }
}

/// Worker-only payload. Topics carry nothing beyond their label.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerData {
    pub metadata: String,
    pub bootstrap_server: String,
    pub timeout_seconds: Option<u32>,
}

impl Default for WorkerData {
    fn default() -> Self {
        Self {
            metadata: String::new(),
            bootstrap_server: "localhost:9092".to_string(),
            timeout_seconds: None,
        }
    }
}

/// A mutable field on a worker node, with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerField {
    Metadata(String),
    BootstrapServer(String),
    Timeout(Option<u32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub position: Position,
    /// Some iff `kind == NodeKind::Worker`.
    pub worker: Option<WorkerData>,
}

impl Node {
    pub fn new(id: String, kind: NodeKind, label: String, position: Position) -> Self {
        let worker = match kind {
            NodeKind::Worker => Some(WorkerData::default()),
            NodeKind::Topic => None,
        };
        Self {
            id,
            kind,
            label,
            position,
            worker,
        }
    }
}

/// Presentation-only edge rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    SmoothStep,
    Floating,
}

impl EdgeStyle {
    pub fn toggled(self) -> Self {
        match self {
            EdgeStyle::SmoothStep => EdgeStyle::Floating,
            EdgeStyle::Floating => EdgeStyle::SmoothStep,
        }
    }
}

impl fmt::Display for EdgeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeStyle::SmoothStep => f.write_str("smoothstep"),
            EdgeStyle::Floating => f.write_str("floating"),
        }
    }
}

/// Directed edge. Topic -> worker is an input, worker -> topic an output.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub style: EdgeStyle,
}

/// Edge ids are derived from the ordered endpoint pair, so the same pair
/// always maps to the same id.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("e-{source}-{target}")
}
