//! ## Reusable Bounded-priority-queue Searcher
//!
//! `Searcher` is the single traversal driver behind every query the tree
//! exposes (`search`, `search_knn`, `search_ball`, `search_capacity_limited_ball`):
//! all four differ only in how the searcher's threshold `tau` is initialized and
//! whether the result heap has a capacity. Keeping one reusable searcher around
//! (via `Tree::searcher`) avoids a heap allocation per query on million-query
//! workloads.

use crate::node::NodeKind;
use crate::space::MetricSpace;
use crate::tree::Tree;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

struct HeapItem<Payload> {
    dist: OrderedFloat<f64>,
    payload: Payload,
}

impl<Payload> PartialEq for HeapItem<Payload> {
    fn eq(&self, other: &Self) -> bool {
        self.dist.eq(&other.dist)
    }
}

impl<Payload> Eq for HeapItem<Payload> {}

impl<Payload> PartialOrd for HeapItem<Payload> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Payload> Ord for HeapItem<Payload> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.cmp(&other.dist)
    }
}

/// A reusable best-first traversal over a [`crate::tree::Tree`]'s node arena.
///
/// The heap is a bounded max-heap: its root is always the current worst of the
/// best candidates found so far, so comparing a new candidate against
/// `heap.peek()` and popping on improvement keeps only the best `k` (or, for
/// an unbounded ball query, simply every match found so far).
pub struct Searcher<Payload> {
    heap: BinaryHeap<HeapItem<Payload>>,
    k: Option<usize>,
    max_distance: f64,
}

impl<Payload: Clone> Searcher<Payload> {
    pub fn new() -> Self {
        Searcher {
            heap: BinaryHeap::new(),
            k: None,
            max_distance: f64::INFINITY,
        }
    }

    /// Clears the heap without freeing its backing storage and primes the
    /// searcher for a new query.
    fn reset(&mut self, k: Option<usize>, max_distance: f64) {
        self.heap.clear();
        self.k = k;
        self.max_distance = max_distance;
    }

    fn current_threshold(&self) -> f64 {
        match self.k {
            Some(k) if self.heap.len() >= k => {
                self.max_distance.min(self.heap.peek().unwrap().dist.into_inner())
            }
            _ => self.max_distance,
        }
    }

    fn offer(&mut self, dist: f64, payload: Payload) {
        match self.k {
            Some(k) => {
                if self.heap.len() < k {
                    self.heap.push(HeapItem {
                        dist: OrderedFloat(dist),
                        payload,
                    });
                } else if let Some(top) = self.heap.peek() {
                    if dist < top.dist.into_inner() {
                        self.heap.pop();
                        self.heap.push(HeapItem {
                            dist: OrderedFloat(dist),
                            payload,
                        });
                    }
                }
            }
            None => {
                self.heap.push(HeapItem {
                    dist: OrderedFloat(dist),
                    payload,
                });
            }
        }
    }

    fn traverse<S: MetricSpace>(&mut self, tree: &Tree<S, Payload>, idx: usize, query: &[f64]) {
        let store = tree.node_store();
        let space = tree.get_distance_fun();
        let node = store.get(idx);
        let lb_dist = space.distance_to_rectangle(query, &node.lb, &node.ub);
        if lb_dist > self.current_threshold() {
            trace!(idx, lb_dist, "pruned subtree");
            return;
        }
        match &node.kind {
            NodeKind::Leaf { bucket, .. } => {
                for entry in bucket {
                    let d = space.distance(query, &entry.point);
                    if d < self.current_threshold() {
                        self.offer(d, entry.payload.clone());
                    }
                }
            }
            NodeKind::Internal {
                axis,
                value,
                left,
                right,
            } => {
                let (first, second) = if query[*axis] <= *value {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                self.traverse(tree, first, query);
                self.traverse(tree, second, query);
            }
        }
    }

    /// Runs a query against `tree` and returns the matches sorted ascending by
    /// distance.
    ///
    /// `k = None` means an unbounded result count (used by `search_ball`);
    /// `max_distance = f64::INFINITY` means no radius cutoff (used by
    /// `search_knn`). Both bounds active together implements
    /// `search_capacity_limited_ball`.
    pub fn search<S: MetricSpace>(
        &mut self,
        tree: &Tree<S, Payload>,
        query: &[f64],
        max_distance: f64,
        k: Option<usize>,
    ) -> Vec<(f64, Payload)> {
        self.reset(k, max_distance);
        if let Some(root) = tree.root_index() {
            self.traverse(tree, root, query);
        }
        let mut out: Vec<(f64, Payload)> = self
            .heap
            .drain()
            .map(|item| (item.dist.into_inner(), item.payload))
            .collect();
        out.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        out
    }
}

impl<Payload: Clone> Default for Searcher<Payload> {
    fn default() -> Self {
        Self::new()
    }
}
