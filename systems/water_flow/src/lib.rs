#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Water flow discovery for Pipe Flow.
//!
//! Water leaves the start cell and spreads through every matched connection.
//! Branches advance together, one wave at a time: each wave expands every
//! cell reached by the previous wave, and a neighbour is marked filled the
//! moment a branch claims it so no later branch can revisit it. The outcome
//! is a [`FlowTree`] rather than a shared counter; scores are aggregated from
//! the tree once every branch has stopped.

use log::{debug, trace};
use pipe_flow_core::{CellCoord, Direction};
use pipe_flow_world::Grid;

/// One cell reached by the water.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlowNode {
    cell: CellCoord,
    parent: Option<usize>,
    depth: u32,
    entered_from: Option<Direction>,
}

impl FlowNode {
    /// Cell reached by the water.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Index of the node the water arrived from; `None` for the source.
    #[must_use]
    pub const fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Hops from the source.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Direction the water travelled to enter the cell; `None` for the source.
    #[must_use]
    pub const fn entered_from(&self) -> Option<Direction> {
        self.entered_from
    }
}

/// Tree of every cell reached from the source, in discovery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowTree {
    nodes: Vec<FlowNode>,
}

impl FlowTree {
    fn rooted_at(source: CellCoord) -> Self {
        Self {
            nodes: vec![FlowNode {
                cell: source,
                parent: None,
                depth: 0,
                entered_from: None,
            }],
        }
    }

    /// Source cell the water started from.
    #[must_use]
    pub fn source(&self) -> CellCoord {
        self.nodes[0].cell
    }

    /// Nodes in discovery order, the source first.
    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Number of distinct cells the water reached beyond the source.
    #[must_use]
    pub fn reached(&self) -> u32 {
        u32::try_from(self.nodes.len().saturating_sub(1)).unwrap_or(u32::MAX)
    }

    /// Hops along the deepest branch.
    #[must_use]
    pub fn longest_branch(&self) -> u32 {
        self.nodes.iter().map(FlowNode::depth).max().unwrap_or(0)
    }

    /// Cells where a branch stopped because no further connection matched.
    #[must_use]
    pub fn branch_tips(&self) -> Vec<CellCoord> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.nodes.iter().any(|node| node.parent == Some(*index)))
            .map(|(_, node)| node.cell)
            .collect()
    }

    /// Cells from the source to the node at `index`, inclusive.
    #[must_use]
    pub fn path_to(&self, index: usize) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut cursor = self.nodes.get(index);
        while let Some(node) = cursor {
            path.push(node.cell);
            cursor = node.parent.and_then(|parent| self.nodes.get(parent));
        }
        path.reverse();
        path
    }
}

/// Wave-by-wave water propagation from a single source cell.
#[derive(Clone, Debug)]
pub struct WaterFlow {
    tree: FlowTree,
    frontier: Vec<usize>,
}

impl WaterFlow {
    /// Starts a flow at `source`.
    #[must_use]
    pub fn from_source(source: CellCoord) -> Self {
        Self {
            tree: FlowTree::rooted_at(source),
            frontier: vec![0],
        }
    }

    /// Starts a flow at the grid's start cell, if one is designated.
    #[must_use]
    pub fn from_start(grid: &Grid) -> Option<Self> {
        grid.start_cell().map(|cell| Self::from_source(cell.coord()))
    }

    /// Reports whether every branch has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Tree discovered so far.
    #[must_use]
    pub const fn tree(&self) -> &FlowTree {
        &self.tree
    }

    /// Consumes the flow, yielding the discovered tree.
    #[must_use]
    pub fn into_tree(self) -> FlowTree {
        self.tree
    }

    /// Advances every live branch by one hop.
    ///
    /// Each newly reached cell is marked filled before the next branch looks
    /// for neighbours. Returns the nodes added by this wave.
    pub fn advance(&mut self, grid: &mut Grid) -> Vec<FlowNode> {
        let frontier = std::mem::take(&mut self.frontier);
        let mut wave = Vec::new();

        for parent in frontier {
            let origin = self.tree.nodes[parent];
            for neighbour in grid.valid_neighbours(origin.cell) {
                if !grid.mark_filled(neighbour.cell()) {
                    continue;
                }

                let node = FlowNode {
                    cell: neighbour.cell(),
                    parent: Some(parent),
                    depth: origin.depth.saturating_add(1),
                    entered_from: Some(neighbour.direction()),
                };
                trace!(
                    "water entered ({}, {}) at depth {}",
                    node.cell.column(),
                    node.cell.row(),
                    node.depth
                );
                self.frontier.push(self.tree.nodes.len());
                self.tree.nodes.push(node);
                wave.push(node);
            }
        }

        wave
    }
}

/// Runs the flow from `source` until every branch has stopped.
pub fn discover(grid: &mut Grid, source: CellCoord) -> FlowTree {
    let mut flow = WaterFlow::from_source(source);
    while !flow.is_finished() {
        let _ = flow.advance(grid);
    }

    let tree = flow.into_tree();
    debug!(
        "water reached {} cells, longest branch {}",
        tree.reached(),
        tree.longest_branch()
    );
    tree
}
