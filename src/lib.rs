//! npoint: exact n-point spatial correlation counting.
//!
//! Counts (and weight-sums) the n-tuples of a weighted point set whose
//! pairwise distances fit a template, the building block of 2-point,
//! 3-point and higher correlation function estimators.
//!
//! - `points`: weighted point storage
//! - `tree/`: partition trees (KD-tree, bounding boxes)
//! - `matcher/`: tuple acceptance criteria (distance bands, permutations)
//! - `npoint/`: multi-tree search, exact base case, brute-force reference
//! - `datasets`: seeded synthetic point sets
//!
//! ```rust
//! use npoint::{DistanceMatcher, KdTree, KdTreeParams, PointStore};
//!
//! let points = PointStore::new(1, vec![0.0, 1.0, 2.0, 3.0, 10.0]).unwrap();
//! let tree = KdTree::build(&points, KdTreeParams::default()).unwrap();
//!
//! // Triples whose points are all within distance 3 of each other.
//! let matcher = DistanceMatcher::within(3, 3.0).unwrap();
//! let result = tree.count_tuples(&matcher).unwrap();
//! assert_eq!(result.count, 4);
//! ```
//!
//! # Critical Nuances
//!
//! ## Each unordered tuple is counted once
//!
//! Tuples are enumerated with strictly increasing point indices across
//! positions. A matcher that is not symmetric under exchanging positions
//! must declare the exchanges it accepts as permutations; otherwise a
//! combination is only tested in its sorted arrangement.
//!
//! ## Cost grows with tuple size
//!
//! Without pruning the work is `C(N, n)`. The tree search prunes whole node
//! sets when bounding boxes rule the template out, so the speed-up depends
//! on how selective the template is. Wide bands over clumpy data prune the
//! least.
//!
//! ## Squared distances throughout
//!
//! Bands are given as distances and squared once at construction; the
//! search itself never takes a square root.

pub mod datasets;
pub mod error;
pub mod matcher;
pub mod npoint;
pub mod points;
pub mod tree;

// Re-exports
pub use error::{NPointError, Result};
pub use matcher::{BoundStatus, DistanceMatcher, Matcher, PermutationMode};
pub use npoint::{
    count_brute_force, count_candidates, CountParams, NPointCounter, SearchStats, TupleCount,
};
pub use points::PointStore;
pub use tree::{Hrect, KdNode, KdTree, KdTreeParams, PartitionNode, SplitRule};
