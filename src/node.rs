//! ## Node Arena
//!
//! A growable arena of tree nodes referenced by stable integer indices rather
//! than owning pointers. Growing the arena (a `Vec` push) never invalidates an
//! existing index, which is what lets the tree backpropagate bounding-rectangle
//! updates and track pending-split leaves without a parent-pointer dance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One stored `(point, payload)` pair inside a leaf bucket.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct BucketEntry<Payload> {
    pub point: Vec<f64>,
    pub payload: Payload,
}

/// The two states a node can be in. A `Leaf` becomes an `Internal` node in
/// place when its bucket overflows; the index of the (former) leaf is reused
/// so that whatever referenced it by index keeps pointing at the right place.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) enum NodeKind<Payload> {
    Leaf {
        bucket: Vec<BucketEntry<Payload>>,
        pending_split: bool,
    },
    Internal {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// A single arena slot: a node's state plus the axis-aligned rectangle
/// enclosing every point reachable beneath it (for a leaf, every point in its
/// own bucket).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct Node<Payload> {
    pub kind: NodeKind<Payload>,
    pub lb: Vec<f64>,
    pub ub: Vec<f64>,
}

impl<Payload> Node<Payload> {
    pub fn bucket_len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { bucket, .. } => bucket.len(),
            NodeKind::Internal { .. } => 0,
        }
    }
}

/// The monotone arena backing a [`crate::tree::Tree`]. Nodes are never freed or
/// reordered; the tree is append-only.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct NodeStore<Payload> {
    nodes: Vec<Node<Payload>>,
}

impl<Payload> NodeStore<Payload> {
    pub fn new() -> Self {
        NodeStore { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, idx: usize) -> &Node<Payload> {
        &self.nodes[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut Node<Payload> {
        &mut self.nodes[idx]
    }

    /// Allocates a fresh leaf holding a single `(point, payload)` entry and
    /// returns its index.
    pub fn alloc_leaf(&mut self, point: &[f64], payload: Payload) -> usize {
        let node = Node {
            kind: NodeKind::Leaf {
                bucket: vec![BucketEntry {
                    point: point.to_vec(),
                    payload,
                }],
                pending_split: false,
            },
            lb: point.to_vec(),
            ub: point.to_vec(),
        };
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Allocates a fresh leaf from an already-collected bucket (used when
    /// splitting an overflowing leaf), recomputing its rectangle from scratch.
    pub fn alloc_leaf_from_bucket(&mut self, dim: usize, bucket: Vec<BucketEntry<Payload>>) -> usize {
        let mut lb = vec![f64::INFINITY; dim];
        let mut ub = vec![f64::NEG_INFINITY; dim];
        for entry in &bucket {
            for i in 0..dim {
                lb[i] = lb[i].min(entry.point[i]);
                ub[i] = ub[i].max(entry.point[i]);
            }
        }
        let node = Node {
            kind: NodeKind::Leaf {
                bucket,
                pending_split: false,
            },
            lb,
            ub,
        };
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Extends a node's rectangle to also cover `point` (coordinate-wise
    /// min/max, regardless of the metric space in use — wraparound semantics
    /// for angular dimensions are handled by the space's distance functions,
    /// not by rectangle maintenance).
    pub fn extend_bounds(&mut self, idx: usize, point: &[f64]) {
        let node = &mut self.nodes[idx];
        for i in 0..point.len() {
            if point[i] < node.lb[i] {
                node.lb[i] = point[i];
            }
            if point[i] > node.ub[i] {
                node.ub[i] = point[i];
            }
        }
    }
}

impl<Payload> Default for NodeStore<Payload> {
    fn default() -> Self {
        Self::new()
    }
}
