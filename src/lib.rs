//! ## A dynamic k-d tree for nearest-neighbor search in heterogeneous state spaces
//!
//! This crate indexes points incrementally for k-nearest-neighbor, radius, and
//! capacity-limited radius queries, the way a motion planner needs during sampling
//! and collision checking. It supports fixed Euclidean spaces, circular angles,
//! unit quaternions (SO(3)), and runtime-composed Cartesian products of these —
//! for example SE(3), three Euclidean coordinates plus an orientation.
//!
//! ### Example
//!
//! ```
//! use spart::space::L2Squared;
//! use spart::tree::Tree;
//!
//! let mut tree = Tree::new_2d(32).unwrap();
//! tree.add_point(&[1.0, 2.0], "George", true).unwrap();
//! tree.add_point(&[1.0, 3.0], "Harold", true).unwrap();
//! tree.add_point(&[7.0, 7.0], "Melvin", true).unwrap();
//!
//! let nearest = tree.search_knn(&[6.0, 6.0], 2);
//! assert_eq!(nearest[0].1, "Melvin");
//!
//! // Or build directly over a named space:
//! let mut explicit: Tree<L2Squared, &str> = Tree::new(L2Squared::new(2), 32).unwrap();
//! explicit.add_point(&[0.0, 0.0], "origin", true).unwrap();
//! ```

pub mod composite;
pub mod error;
pub(crate) mod node;
pub(crate) mod searcher;
#[cfg(feature = "setup_tracing")]
mod settings;
pub mod space;
pub mod tree;

pub use error::SpartKdError;
pub use searcher::Searcher;
pub use tree::Tree;
