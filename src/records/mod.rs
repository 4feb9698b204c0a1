//! Record layer: conversion between the graph and the flat consumer-config
//! records served by the backing store.
//!
//! Record shape (JSON):
//! {
//!   "id": 3,
//!   "consumer_name": "worker-language-detector",
//!   "topics_input": "raw-data,detected-language",
//!   "topics_output": "summaries",
//!   "metadatas": "...",
//!   "kafka_bootstrap_server": "localhost:9092",
//!   "timeout": 30
//! }
//!
//! Topic lists are comma-separated; names are trimmed and empty segments
//! dropped, on both the load and save paths. Topics are de-duplicated across
//! records and become nodes with synthetic ids; the label only matters at this
//! conversion boundary.

use std::collections::BTreeMap;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::graph::{EdgeStyle, Graph, GraphError, Node, NodeKind, Position};

/// One consumer config row, as served by `GET /consumer_configs`.
///
/// `metadatas` and `kafka_bootstrap_server` may come back as JSON null from
/// older rows; we read them leniently and always write strings back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub consumer_name: String,
    #[serde(default)]
    pub topics_input: String,
    #[serde(default)]
    pub topics_output: String,
    #[serde(default)]
    pub metadatas: Option<String>,
    #[serde(default)]
    pub kafka_bootstrap_server: Option<String>,
    #[serde(default)]
    pub timeout: Option<u32>,
}

fn worker_node_id(record_id: u32) -> String {
    format!("worker-{record_id}")
}

/// Extract the numeric record id back out of a `worker-<n>` node id.
fn worker_record_id(node_id: &str) -> anyhow::Result<u32> {
    let suffix = node_id
        .strip_prefix("worker-")
        .with_context(|| format!("worker node id without worker- prefix: {node_id}"))?;
    suffix
        .parse::<u32>()
        .with_context(|| format!("worker node id with non-numeric suffix: {node_id}"))
}

/// Split a comma-separated topic list, trimming whitespace and dropping empty
/// segments (so "" and "a,,b" behave).
pub fn parse_topic_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Build a graph from the flat records: one worker node per record, one topic
/// node per distinct topic name, topic->worker edges for inputs and
/// worker->topic edges for outputs.
pub fn graph_from_records(records: &[Record]) -> anyhow::Result<Graph> {
    let mut graph = Graph::new();

    let mut max_record_id = 0u32;
    for record in records {
        let id = worker_node_id(record.id);
        if graph.node(&id).is_some() {
            bail!("duplicate record id {}", record.id);
        }
        let mut node = Node::new(
            id,
            NodeKind::Worker,
            record.consumer_name.clone(),
            Position::default(),
        );
        if let Some(worker) = node.worker.as_mut() {
            worker.metadata = record.metadatas.clone().unwrap_or_default();
            if let Some(server) = record.kafka_bootstrap_server.clone() {
                worker.bootstrap_server = server;
            }
            worker.timeout_seconds = record.timeout;
        }
        graph.insert_node(node);
        max_record_id = max_record_id.max(record.id);
    }
    // Fresh ids must never collide with the worker ids we just adopted.
    graph.seed_counter(u64::from(max_record_id) + 1);

    // Topic nodes, minted in first-seen order across all records.
    let mut topic_ids: BTreeMap<String, String> = BTreeMap::new();
    for record in records {
        for name in parse_topic_list(&record.topics_input)
            .into_iter()
            .chain(parse_topic_list(&record.topics_output))
        {
            if !topic_ids.contains_key(name) {
                let node =
                    graph.add_node(NodeKind::Topic, name.to_string(), Position::default());
                topic_ids.insert(name.to_string(), node.id.clone());
            }
        }
    }

    for record in records {
        let worker_id = worker_node_id(record.id);
        for name in parse_topic_list(&record.topics_input) {
            add_edge_collapsing_duplicates(&mut graph, &topic_ids[name], &worker_id)?;
        }
        for name in parse_topic_list(&record.topics_output) {
            add_edge_collapsing_duplicates(&mut graph, &worker_id, &topic_ids[name])?;
        }
    }

    Ok(graph)
}

/// Records may mention the same topic twice for one worker; the graph keeps a
/// single edge per pair.
fn add_edge_collapsing_duplicates(
    graph: &mut Graph,
    source: &str,
    target: &str,
) -> anyhow::Result<()> {
    match graph.add_edge(source, target, EdgeStyle::Floating) {
        Ok(_) | Err(GraphError::DuplicateEdge { .. }) => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("deriving edge {source} -> {target} from records"))
        }
    }
}

/// Serialize the graph back into flat records: one per worker, topic lists
/// re-joined from the labels of adjacent topic nodes.
///
/// List order follows edge-id iteration order. That happens to be
/// deterministic here, but consumers must not rely on it.
pub fn records_from_graph(graph: &Graph) -> anyhow::Result<Vec<Record>> {
    let mut records = Vec::new();

    for node in graph.nodes() {
        let Some(worker) = node.worker.as_ref() else {
            continue;
        };
        let record_id = worker_record_id(&node.id)?;

        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for edge in graph.edges() {
            if edge.target == node.id {
                inputs.push(endpoint_label(graph, &edge.source, &edge.id)?);
            } else if edge.source == node.id {
                outputs.push(endpoint_label(graph, &edge.target, &edge.id)?);
            }
        }

        records.push(Record {
            id: record_id,
            consumer_name: node.label.clone(),
            topics_input: inputs.join(","),
            topics_output: outputs.join(","),
            metadatas: Some(worker.metadata.clone()),
            kafka_bootstrap_server: Some(worker.bootstrap_server.clone()),
            timeout: worker.timeout_seconds,
        });
    }

    records.sort_by_key(|r| r.id);
    Ok(records)
}

/// Unreachable while the graph invariants hold; kept as an
/// internal-consistency assertion rather than a reachable error path.
fn endpoint_label(graph: &Graph, node_id: &str, edge_id: &str) -> anyhow::Result<String> {
    match graph.node(node_id) {
        Some(node) => Ok(node.label.clone()),
        None => bail!("edge {edge_id} references missing node {node_id}"),
    }
}
