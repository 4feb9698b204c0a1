//! Layered layout: rank assignment, crossing reduction, coordinates.
//!
//! The classic three phases:
//! 1. Rank assignment by longest path over edge direction. A DFS visiting-set
//!    clamps back-edges to rank 0, so a cycle degrades the drawing instead of
//!    hanging the editor. This is an approximation, not exact topological
//!    layering.
//! 2. Node ordering within ranks by the barycenter heuristic, a fixed number
//!    of alternating down/up sweeps (exact crossing minimization is NP-hard).
//!    Ties break on node id so the result is reproducible.
//! 3. Coordinate assignment: ranks advance by `rank_spacing` plus the node
//!    extent; within a rank nodes advance by `node_spacing` plus the extent,
//!    centered on the widest rank.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{Graph, Position};
use crate::layout::{Direction, LayoutParams, NODE_HEIGHT, NODE_WIDTH};

const BARYCENTER_SWEEPS: usize = 4;

/// Compute a position for every node in the graph. Pure: the caller applies
/// the returned positions to the model.
pub fn layout(
    graph: &Graph,
    direction: Direction,
    params: &LayoutParams,
) -> BTreeMap<String, Position> {
    if graph.node_count() == 0 {
        return BTreeMap::new();
    }

    let mut preds: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut succs: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in graph.edges() {
        preds
            .entry(edge.target.clone())
            .or_default()
            .push(edge.source.clone());
        succs
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
    }

    let ranks = compute_ranks(graph, &preds);
    let mut layers = group_by_rank(graph, &ranks);
    order_by_barycenter(&mut layers, &preds, &succs);
    assign_coordinates(&layers, direction, params)
}

/// Longest-path ranking: rank 0 for nodes with no predecessors, otherwise one
/// past the deepest predecessor.
fn compute_ranks(graph: &Graph, preds: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, usize> {
    fn rank_of(
        id: &str,
        preds: &BTreeMap<String, Vec<String>>,
        ranks: &mut BTreeMap<String, usize>,
        visiting: &mut BTreeSet<String>,
    ) -> usize {
        if let Some(&r) = ranks.get(id) {
            return r;
        }
        // Back-edge: clamp instead of recursing forever.
        if !visiting.insert(id.to_string()) {
            return 0;
        }
        let rank = match preds.get(id) {
            Some(ps) if !ps.is_empty() => ps
                .iter()
                .map(|p| rank_of(p, preds, ranks, visiting) + 1)
                .max()
                .unwrap_or(0),
            _ => 0,
        };
        visiting.remove(id);
        ranks.insert(id.to_string(), rank);
        rank
    }

    let mut ranks = BTreeMap::new();
    let mut visiting = BTreeSet::new();
    for node in graph.nodes() {
        rank_of(&node.id, preds, &mut ranks, &mut visiting);
    }
    ranks
}

/// Bucket nodes by rank, initially ordered by id within each rank.
fn group_by_rank(graph: &Graph, ranks: &BTreeMap<String, usize>) -> Vec<Vec<String>> {
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for node in graph.nodes() {
        let rank = ranks.get(&node.id).copied().unwrap_or(0);
        layers[rank].push(node.id.clone());
    }
    layers
}

/// Alternating down/up barycenter sweeps. A node moves to the mean position of
/// its neighbors in the fixed adjacent direction; nodes with no neighbors keep
/// their current slot.
fn order_by_barycenter(
    layers: &mut [Vec<String>],
    preds: &BTreeMap<String, Vec<String>>,
    succs: &BTreeMap<String, Vec<String>>,
) {
    let mut slots: BTreeMap<String, f64> = BTreeMap::new();
    for layer in layers.iter() {
        for (i, id) in layer.iter().enumerate() {
            slots.insert(id.clone(), i as f64);
        }
    }

    for sweep in 0..BARYCENTER_SWEEPS {
        let downward = sweep % 2 == 0;
        let order: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };

        for li in order {
            let mut keyed: Vec<(String, f64)> = layers[li]
                .iter()
                .map(|id| {
                    let neighbors = if downward { preds.get(id) } else { succs.get(id) };
                    let bary = neighbors
                        .and_then(|ns| {
                            let vals: Vec<f64> =
                                ns.iter().filter_map(|n| slots.get(n).copied()).collect();
                            if vals.is_empty() {
                                None
                            } else {
                                Some(vals.iter().sum::<f64>() / vals.len() as f64)
                            }
                        })
                        .unwrap_or_else(|| slots.get(id).copied().unwrap_or(0.0));
                    (id.clone(), bary)
                })
                .collect();

            keyed.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });

            layers[li] = keyed.iter().map(|(id, _)| id.clone()).collect();
            for (i, (id, _)) in keyed.iter().enumerate() {
                slots.insert(id.clone(), i as f64);
            }
        }
    }
}

fn assign_coordinates(
    layers: &[Vec<String>],
    direction: Direction,
    params: &LayoutParams,
) -> BTreeMap<String, Position> {
    let (layer_extent, within_extent) = match direction {
        Direction::LeftRight => (NODE_WIDTH, NODE_HEIGHT),
        Direction::TopBottom => (NODE_HEIGHT, NODE_WIDTH),
    };

    let span = |n: usize| -> f64 {
        if n == 0 {
            0.0
        } else {
            n as f64 * within_extent + (n - 1) as f64 * params.node_spacing
        }
    };
    let max_span = layers.iter().map(|l| span(l.len())).fold(0.0, f64::max);

    let mut out = BTreeMap::new();
    for (rank, layer) in layers.iter().enumerate() {
        let layer_pos = rank as f64 * (layer_extent + params.rank_spacing);
        let start = (max_span - span(layer.len())) / 2.0;
        for (i, id) in layer.iter().enumerate() {
            let within_pos = start + i as f64 * (within_extent + params.node_spacing);
            let position = match direction {
                Direction::LeftRight => Position::new(layer_pos, within_pos),
                Direction::TopBottom => Position::new(within_pos, layer_pos),
            };
            out.insert(id.clone(), position);
        }
    }
    out
}
