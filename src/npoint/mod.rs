//! Exact n-point tuple counting.
//!
//! # Algorithm
//!
//! The counter walks `n` tree nodes at once, one per tuple position:
//!
//! 1. For each pair of positions `(i, j)`, `i < j`:
//!    - if node `j` ends before node `i` begins, no tuple with increasing
//!      indices can come from this node set: prune;
//!    - if the matcher excludes the two bounding boxes under every
//!      permutation: prune.
//! 2. If every node is a leaf, enumerate the points exactly.
//! 3. Otherwise split the largest non-leaf node and recurse into both halves.
//!
//! Each unordered tuple is counted once: the order prune and the base
//! case's increasing-index rule together admit exactly the sorted
//! arrangement of each combination.
//!
//! # Pruning never changes results
//!
//! Both prunes are exact (they only discard node sets that contain no
//! valid tuple), so [`CountParams`] can switch them off. That is how the
//! test suite checks them.
//!
//! # Inherited permutation status
//!
//! A child node's box is inside its parent's, so whatever the parent's
//! bound tests concluded still holds. With
//! [`CountParams::reuse_parent_status`] each call starts from its parent's
//! status and re-tests only the pairs involving the node that was split.

mod base_case;
mod brute;
mod recursion;

pub use brute::count_brute_force;

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::error::{NPointError, Result};
use crate::matcher::{BoundStatus, Matcher};
use crate::points::PointStore;
use crate::tree::{KdTree, PartitionNode};

use base_case::BaseCase;

/// Number of matched tuples and the sum of their weight products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TupleCount {
    pub count: u64,
    pub weighted_sum: f64,
}

impl TupleCount {
    /// Add one tuple whose weight product is `weight`.
    #[inline]
    pub fn record(&mut self, weight: f64) {
        self.count += 1;
        self.weighted_sum += weight;
    }
}

impl AddAssign for TupleCount {
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        self.weighted_sum += rhs.weighted_sum;
    }
}

/// Work done by one count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Node sets discarded because their ranges were out of order.
    pub order_prunes: u64,
    /// Node sets discarded because the matcher excluded a pair of boxes.
    pub exclusion_prunes: u64,
    /// All-leaf node sets enumerated exactly.
    pub base_cases: u64,
    /// Box-pair matcher tests.
    pub node_pair_tests: u64,
    /// Point-pair matcher tests (one distance each).
    pub point_pair_tests: u64,
}

/// Counting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountParams {
    /// Discard node sets whose index ranges cannot hold an increasing tuple.
    pub prune_order: bool,
    /// Discard node sets whose bounding boxes the matcher excludes.
    pub prune_exclusion: bool,
    /// Start each call from the parent's permutation status.
    pub reuse_parent_status: bool,
}

impl Default for CountParams {
    fn default() -> Self {
        Self {
            prune_order: true,
            prune_exclusion: true,
            reuse_parent_status: true,
        }
    }
}

impl CountParams {
    /// No pruning at all: every branch is split down to leaves.
    pub fn unpruned() -> Self {
        Self {
            prune_order: false,
            prune_exclusion: false,
            reuse_parent_status: false,
        }
    }
}

/// Multi-tree tuple counter over one point store.
///
/// Reusable: scratch buffers persist between calls to [`NPointCounter::count`],
/// statistics are reset at the start of each.
pub struct NPointCounter<'a, M: Matcher> {
    points: &'a PointStore,
    matcher: &'a M,
    params: CountParams,
    stats: SearchStats,
    base_case: BaseCase<'a, M>,
    /// Per-position point lists for the current base case.
    candidates: Vec<Vec<usize>>,
}

impl<'a, M: Matcher> NPointCounter<'a, M> {
    pub fn new(points: &'a PointStore, matcher: &'a M, params: CountParams) -> Result<Self> {
        let tuple_size = matcher.tuple_size();
        if tuple_size == 0 {
            return Err(NPointError::InvalidParameter(
                "matcher tuple size must be greater than 0".to_string(),
            ));
        }
        if matcher.num_permutations() == 0 {
            return Err(NPointError::InvalidParameter(
                "matcher must consider at least one permutation".to_string(),
            ));
        }

        Ok(Self {
            points,
            matcher,
            params,
            stats: SearchStats::default(),
            base_case: BaseCase::new(points, matcher),
            candidates: vec![Vec::new(); tuple_size],
        })
    }

    /// Count tuples with position `i` drawn from `roots[i]`.
    ///
    /// All nodes must index into this counter's point store. Passing the
    /// same root for every position counts unordered n-tuples of the whole
    /// set.
    pub fn count<N: PartitionNode>(&mut self, roots: &[&N]) -> Result<TupleCount> {
        let tuple_size = self.matcher.tuple_size();
        if roots.len() != tuple_size {
            return Err(NPointError::TupleSizeMismatch {
                expected: tuple_size,
                actual: roots.len(),
            });
        }
        for root in roots {
            if root.end() > self.points.len() {
                return Err(NPointError::IndexOutOfRange {
                    index: root.end() - 1,
                    len: self.points.len(),
                });
            }
            if root.bound().dimension() != self.points.dimension() {
                return Err(NPointError::DimensionMismatch {
                    expected: self.points.dimension(),
                    actual: root.bound().dimension(),
                });
            }
        }

        self.stats = SearchStats::default();
        let mut nodes: SmallVec<[&N; 8]> = roots.iter().copied().collect();
        let status: SmallVec<[BoundStatus; 8]> =
            smallvec![BoundStatus::Subsume; self.matcher.num_permutations()];
        let mut acc = TupleCount::default();

        self.depth_first(&mut nodes, &status, None, &mut acc);

        debug!(
            tuple_size,
            count = acc.count,
            weighted_sum = acc.weighted_sum,
            base_cases = self.stats.base_cases,
            order_prunes = self.stats.order_prunes,
            exclusion_prunes = self.stats.exclusion_prunes,
            "n-point count finished"
        );

        Ok(acc)
    }

    /// Statistics of the most recent [`NPointCounter::count`].
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn params(&self) -> &CountParams {
        &self.params
    }
}

/// Enumerate tuples drawn from explicit candidate lists, one per position.
///
/// Lists may be unsorted and contain duplicates; they are normalized first.
pub fn count_candidates<M: Matcher>(
    points: &PointStore,
    matcher: &M,
    sets: &[Vec<usize>],
) -> Result<TupleCount> {
    if sets.len() != matcher.tuple_size() {
        return Err(NPointError::TupleSizeMismatch {
            expected: matcher.tuple_size(),
            actual: sets.len(),
        });
    }
    if matcher.tuple_size() == 0 || matcher.num_permutations() == 0 {
        return Err(NPointError::InvalidParameter(
            "matcher must have a positive tuple size and permutation count".to_string(),
        ));
    }

    let mut sorted = Vec::with_capacity(sets.len());
    for set in sets {
        if let Some(&index) = set.iter().find(|&&i| i >= points.len()) {
            return Err(NPointError::IndexOutOfRange {
                index,
                len: points.len(),
            });
        }
        let mut set = set.clone();
        set.sort_unstable();
        set.dedup();
        sorted.push(set);
    }

    let mut acc = TupleCount::default();
    let mut stats = SearchStats::default();
    BaseCase::new(points, matcher).run(&sorted, &mut acc, &mut stats);
    Ok(acc)
}

impl KdTree {
    /// Count unordered n-tuples of this tree's points accepted by `matcher`.
    pub fn count_tuples<M: Matcher>(&self, matcher: &M) -> Result<TupleCount> {
        self.count_tuples_with(matcher, CountParams::default())
            .map(|(count, _)| count)
    }

    /// Like [`KdTree::count_tuples`], with explicit options and statistics.
    pub fn count_tuples_with<M: Matcher>(
        &self,
        matcher: &M,
        params: CountParams,
    ) -> Result<(TupleCount, SearchStats)> {
        let mut counter = NPointCounter::new(self.points(), matcher, params)?;
        let roots = vec![self.root(); matcher.tuple_size()];
        let count = counter.count(&roots)?;
        Ok((count, counter.stats()))
    }
}
