//! Arena-backed growth tree.
//!
//! Nodes are addressed by [`NodeId`], their index in commit order. Parent
//! links are indices, so the tree has no reference cycles and index order is
//! always a valid topological order (a parent is committed before its
//! children).

use lichtenberg_core::{Domain, GridPos};
use serde::{Deserialize, Serialize};

/// Index of a node in [`GrowthTree::nodes`].
///
/// Only meaningful within the run that produced it.
pub type NodeId = usize;

/// Factor applied to a node's charge each time it gains a child.
///
/// Fresh tips carry full charge, so growth prefers extending channels over
/// re-branching from nodes that already forked.
pub const CHARGE_SPLIT: f64 = 0.3;

/// One deposited cell of the figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthNode {
    pub pos: GridPos,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    /// Root depth is 0.
    pub depth: usize,
    /// Branching weight in (0, 1]; see [`CHARGE_SPLIT`].
    pub charge: f64,
    pub children: usize,
}

/// Edge between a node and its parent, the unit the renderer draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Parent position.
    pub from: GridPos,
    /// Child position.
    pub to: GridPos,
    pub parent: NodeId,
    pub node: NodeId,
    /// Depth of the parent node: segments leaving the root have depth 0.
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct GrowthTree {
    domain: Domain,
    nodes: Vec<GrowthNode>,
    /// Row-major cell occupancy, one slot per domain cell.
    occupancy: Vec<Option<NodeId>>,
}

impl GrowthTree {
    /// Creates a tree holding only the root at `root`.
    ///
    /// The caller guarantees `root` lies inside `domain`.
    pub fn new(domain: Domain, root: GridPos) -> Self {
        let mut occupancy = vec![None; domain.area()];
        occupancy[domain.index(root)] = Some(0);
        Self {
            domain,
            nodes: vec![GrowthNode {
                pos: root,
                parent: None,
                depth: 0,
                charge: 1.0,
                children: 0,
            }],
            occupancy,
        }
    }

    /// Number of nodes, root included. Never zero.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &GrowthNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> Option<&GrowthNode> {
        self.nodes.get(id)
    }

    /// All nodes in commit order.
    pub fn nodes(&self) -> &[GrowthNode] {
        &self.nodes
    }

    /// The node occupying `pos`, if any.
    pub fn node_at(&self, pos: GridPos) -> Option<NodeId> {
        self.occupancy[self.domain.index(pos)]
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.node_at(pos).is_some()
    }

    /// Commits a new node at `pos` under `parent` and returns its segment.
    ///
    /// The engine only attaches frontier cells, which are unoccupied and
    /// proposed by an existing node.
    pub(crate) fn attach(&mut self, parent: NodeId, pos: GridPos) -> Segment {
        debug_assert!(parent < self.nodes.len(), "dangling parent {parent}");
        debug_assert!(!self.is_occupied(pos), "cell {pos:?} already occupied");

        let id = self.nodes.len();
        let parent_node = &mut self.nodes[parent];
        parent_node.charge *= CHARGE_SPLIT;
        parent_node.children += 1;
        let from = parent_node.pos;
        let depth = parent_node.depth;

        self.nodes.push(GrowthNode {
            pos,
            parent: Some(parent),
            depth: depth + 1,
            charge: 1.0,
            children: 0,
        });
        let slot = self.domain.index(pos);
        self.occupancy[slot] = Some(id);

        Segment {
            from,
            to: pos,
            parent,
            node: id,
            depth,
        }
    }

    /// The segment connecting `id` to its parent; `None` for the root or an
    /// unknown id.
    pub fn segment(&self, id: NodeId) -> Option<Segment> {
        let node = self.nodes.get(id)?;
        let parent = node.parent?;
        let parent_node = &self.nodes[parent];
        Some(Segment {
            from: parent_node.pos,
            to: node.pos,
            parent,
            node: id,
            depth: parent_node.depth,
        })
    }

    /// Every segment in commit order, re-derived from the arena.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        (1..self.nodes.len()).filter_map(move |id| self.segment(id))
    }
}
