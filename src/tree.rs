//! ## Tree Index
//!
//! The public entry point of the crate. `Tree<S, Payload>` owns a [`crate::node::NodeStore`]
//! arena, a metric space `S`, and the bucket-capacity/build policy governing when a leaf
//! splits. Construction, insertion, and splitting are implemented here; queries are delegated
//! to a [`crate::searcher::Searcher`].

use crate::error::SpartKdError;
use crate::node::{BucketEntry, NodeKind, NodeStore};
use crate::searcher::Searcher;
use crate::space::{L2Squared, MetricSpace};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default bucket capacity for a leaf, matching the source design's choice of
/// 32 points per leaf before a split is considered.
pub const DEFAULT_BUCKET_CAPACITY: usize = 32;

/// A dynamic, bucketed k-d tree over a metric space `S`, storing an opaque
/// `Payload` alongside each point.
///
/// The tree is append-only: there is no delete, and queries never run
/// concurrently with an insert (see the crate-level documentation for the
/// concurrency model this implies for callers).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tree<S, Payload: Clone> {
    space: S,
    store: NodeStore<Payload>,
    root: Option<usize>,
    dim: usize,
    bucket_capacity: usize,
    size: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    searcher: Searcher<Payload>,
}

impl<S: MetricSpace, Payload: Clone> Tree<S, Payload> {
    /// Creates a new, empty tree over `space` with the given bucket capacity.
    ///
    /// # Errors
    ///
    /// Returns `SpartKdError::InvalidCapacity` if `bucket_capacity` is zero.
    pub fn new(space: S, bucket_capacity: usize) -> Result<Self, SpartKdError> {
        if bucket_capacity == 0 {
            return Err(SpartKdError::InvalidCapacity {
                capacity: bucket_capacity,
            });
        }
        let dim = space.dim();
        Ok(Tree {
            space,
            store: NodeStore::new(),
            root: None,
            dim,
            bucket_capacity,
            size: 0,
            searcher: Searcher::new(),
        })
    }

    /// Total number of points currently stored.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The dimension every point inserted into this tree must have.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The metric space backing this tree.
    pub fn get_distance_fun(&self) -> &S {
        &self.space
    }

    pub(crate) fn node_store(&self) -> &NodeStore<Payload> {
        &self.store
    }

    pub(crate) fn root_index(&self) -> Option<usize> {
        self.root
    }

    /// Inserts `(point, payload)`.
    ///
    /// When `auto_split` is `true` (the typical case), an overflowing leaf is
    /// split immediately. When `false`, the leaf is flagged pending and left
    /// to grow; call [`Tree::split_outstanding`] later to amortize the cost of
    /// splitting many leaves after a bulk-insert phase.
    ///
    /// # Errors
    ///
    /// Returns `SpartKdError::DimensionMismatch` if `point.len()` does not
    /// match the tree's dimension.
    pub fn add_point(
        &mut self,
        point: &[f64],
        payload: Payload,
        auto_split: bool,
    ) -> Result<(), SpartKdError> {
        if point.len() != self.dim {
            return Err(SpartKdError::DimensionMismatch {
                expected: self.dim,
                actual: point.len(),
            });
        }
        info!(dim = self.dim, auto_split, "adding point");

        let Some(root) = self.root else {
            let idx = self.store.alloc_leaf(point, payload);
            self.root = Some(idx);
            self.size += 1;
            return Ok(());
        };

        let mut idx = root;
        loop {
            self.store.extend_bounds(idx, point);
            match &self.store.get(idx).kind {
                NodeKind::Internal { axis, value, left, right } => {
                    idx = if point[*axis] <= *value { *left } else { *right };
                }
                NodeKind::Leaf { .. } => break,
            }
        }

        let overflowed = match &mut self.store.get_mut(idx).kind {
            NodeKind::Leaf {
                bucket,
                pending_split,
            } => {
                bucket.push(BucketEntry {
                    point: point.to_vec(),
                    payload,
                });
                if bucket.len() > self.bucket_capacity {
                    if !auto_split {
                        *pending_split = true;
                    }
                    true
                } else {
                    false
                }
            }
            NodeKind::Internal { .. } => unreachable!("descent always stops on a leaf"),
        };
        self.size += 1;

        if overflowed && auto_split {
            self.split_leaf(idx)?;
        }
        Ok(())
    }

    /// Splits every leaf flagged pending from deferred (`auto_split = false`)
    /// insertions. Used to amortize build cost after a bulk-insert phase.
    pub fn split_outstanding(&mut self) -> Result<(), SpartKdError> {
        info!("splitting outstanding leaves");
        let mut idx = 0;
        while idx < self.store.len() {
            let should_split = matches!(
                &self.store.get(idx).kind,
                NodeKind::Leaf { pending_split: true, .. }
            );
            if should_split {
                self.split_leaf(idx)?;
            }
            idx += 1;
        }
        Ok(())
    }

    /// Converts the overflowing leaf at `idx` into an internal node, in place,
    /// reusing `idx` so existing references to it remain valid. Recurses on
    /// either freshly allocated child leaf that is still over capacity.
    fn split_leaf(&mut self, idx: usize) -> Result<(), SpartKdError> {
        let node = self.store.get(idx);
        let (axis, width) = self.space.choose_split_dimension(&node.lb, &node.ub);

        if width == 0.0 {
            // Every point in this bucket is identical on every axis; further
            // splitting can never make progress. Leave it as an oversized but
            // otherwise ordinary leaf (a benign, bounded overflow).
            debug!(idx, "duplicate-saturated leaf left unsplit");
            return Ok(());
        }

        let mut bucket = match &mut self.store.get_mut(idx).kind {
            NodeKind::Leaf { bucket, .. } => std::mem::take(bucket),
            NodeKind::Internal { .. } => return Ok(()),
        };

        let mid = bucket.len() / 2;
        bucket.select_nth_unstable_by(mid, |a, b| {
            a.point[axis].partial_cmp(&b.point[axis]).unwrap()
        });
        let value = bucket[mid].point[axis];

        let mut left_bucket = Vec::with_capacity(bucket.len());
        let mut right_bucket = Vec::with_capacity(bucket.len());
        for entry in bucket {
            if entry.point[axis] <= value {
                left_bucket.push(entry);
            } else {
                right_bucket.push(entry);
            }
        }

        if left_bucket.is_empty() || right_bucket.is_empty() {
            // All ties: restore as a single unsplit leaf rather than looping.
            let merged = if left_bucket.is_empty() {
                right_bucket
            } else {
                left_bucket
            };
            self.store.get_mut(idx).kind = NodeKind::Leaf {
                bucket: merged,
                pending_split: false,
            };
            debug!(idx, axis, value, "split made no progress, left unsplit");
            return Ok(());
        }

        let left_idx = self.store.alloc_leaf_from_bucket(self.dim, left_bucket);
        let right_idx = self.store.alloc_leaf_from_bucket(self.dim, right_bucket);
        debug!(idx, axis, value, left_idx, right_idx, "split leaf");

        self.store.get_mut(idx).kind = NodeKind::Internal {
            axis,
            value,
            left: left_idx,
            right: right_idx,
        };

        if self.store.get(left_idx).bucket_len() > self.bucket_capacity {
            self.split_leaf(left_idx)?;
        }
        if self.store.get(right_idx).bucket_len() > self.bucket_capacity {
            self.split_leaf(right_idx)?;
        }
        Ok(())
    }

    /// Returns a fresh, reusable searcher over this tree. Prefer this over the
    /// convenience methods below when issuing many queries in a row, since a
    /// searcher's heap is reused across calls instead of reallocated.
    pub fn searcher(&self) -> Searcher<Payload> {
        Searcher::new()
    }

    /// The single nearest point to `point`. Returns `None` if the tree is
    /// empty.
    pub fn search(&mut self, point: &[f64]) -> Option<(f64, Payload)> {
        self.search_knn(point, 1).into_iter().next()
    }

    /// The `k` nearest points to `point`, sorted ascending by distance.
    pub fn search_knn(&mut self, point: &[f64], k: usize) -> Vec<(f64, Payload)> {
        if k == 0 {
            return Vec::new();
        }
        self.with_searcher(|tree, searcher| {
            searcher.search(tree, point, f64::INFINITY, Some(k))
        })
    }

    /// Every point strictly within `radius` of `point`, sorted ascending by
    /// distance.
    pub fn search_ball(&mut self, point: &[f64], radius: f64) -> Vec<(f64, Payload)> {
        debug_assert!(radius >= 0.0, "radius must be non-negative: {radius}");
        self.with_searcher(|tree, searcher| searcher.search(tree, point, radius, None))
    }

    /// The first `k` points (by distance) within `radius` of `point`.
    pub fn search_capacity_limited_ball(
        &mut self,
        point: &[f64],
        radius: f64,
        k: usize,
    ) -> Vec<(f64, Payload)> {
        debug_assert!(radius >= 0.0, "radius must be non-negative: {radius}");
        if k == 0 {
            return Vec::new();
        }
        self.with_searcher(|tree, searcher| searcher.search(tree, point, radius, Some(k)))
    }

    /// Borrows out the tree's own reusable searcher for the duration of `f`,
    /// so a call can pass `&Tree` to `Searcher::search` without conflicting
    /// with the `&mut Tree` needed to hold the searcher. The searcher's heap
    /// capacity survives the swap; only the `Searcher` value itself is
    /// temporarily replaced by an empty placeholder.
    fn with_searcher<F>(&mut self, f: F) -> Vec<(f64, Payload)>
    where
        F: FnOnce(&Self, &mut Searcher<Payload>) -> Vec<(f64, Payload)>,
    {
        let mut searcher = std::mem::take(&mut self.searcher);
        let result = f(self, &mut searcher);
        self.searcher = searcher;
        result
    }
}

impl<Payload: Clone> Tree<L2Squared, Payload> {
    /// A 2-D tree over squared-Euclidean distance, matching the teacher
    /// crate's dedicated `Point2D` convenience constructors.
    pub fn new_2d(bucket_capacity: usize) -> Result<Self, SpartKdError> {
        Tree::new(L2Squared::new(2), bucket_capacity)
    }

    /// A 3-D tree over squared-Euclidean distance.
    pub fn new_3d(bucket_capacity: usize) -> Result<Self, SpartKdError> {
        Tree::new(L2Squared::new(3), bucket_capacity)
    }
}
