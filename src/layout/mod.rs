//! Layout layer: hierarchical (layered) graph drawing.
//!
//! `layout` is a pure function from a graph plus direction and spacing
//! parameters to per-node positions; the caller applies the result to the
//! model. Keeping it side-effect-free makes determinism easy to state: the
//! same graph and parameters always produce the same positions.

pub mod layered;

pub use layered::layout;

/// Which axis ranks advance along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ranks advance along x, nodes within a rank stack along y.
    LeftRight,
    /// Ranks advance along y, nodes within a rank stack along x.
    TopBottom,
}

/// Spacing parameters, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Gap between the extents of consecutive ranks.
    pub rank_spacing: f64,
    /// Gap between the extents of adjacent nodes within a rank.
    pub node_spacing: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            rank_spacing: 200.0,
            node_spacing: 200.0,
        }
    }
}

/// Fixed node box used for spacing; the frontend renders all nodes at this
/// size.
pub const NODE_WIDTH: f64 = 172.0;
pub const NODE_HEIGHT: f64 = 36.0;
