//! Tuple acceptance criteria.
//!
//! A [`Matcher`] decides which n-point configurations count, as a function
//! of their pairwise distances. It may accept a configuration under any of
//! several *permutations* (assignments of its abstract roles to tuple
//! positions); the search tracks which permutations are still viable as
//! it narrows down a branch.
//!
//! Both tests are monotone: they only ever move a permutation toward
//! non-viable, never back. The search relies on this to inherit status
//! from parent node sets.

mod distance;

pub use distance::{DistanceMatcher, PermutationMode, MAX_PERMUTED_TUPLE_SIZE};

use crate::tree::Hrect;

/// Outcome of testing two bounding regions under one permutation.
///
/// Ordered from most to least restrictive, so narrowing is `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundStatus {
    /// No pair of points from the regions can satisfy the permutation.
    Exclude,
    /// Some pairs may satisfy it; points must be checked.
    Inconclusive,
    /// Every pair of points from the regions satisfies it.
    Subsume,
}

/// Overall status of a per-permutation status array.
///
/// `Exclude` only if every permutation is excluded (or there are none),
/// `Subsume` if at least one permutation is subsumed.
#[inline]
#[must_use]
pub fn summarize(status: &[BoundStatus]) -> BoundStatus {
    status.iter().copied().max().unwrap_or(BoundStatus::Exclude)
}

/// Pairwise acceptance criterion over n-tuples of points.
///
/// Implementations are pure: the result depends only on the arguments.
/// Positions are tuple slots `0..tuple_size()`; `pos_a != pos_b`.
pub trait Matcher {
    /// Number of points in a matched tuple.
    fn tuple_size(&self) -> usize;

    /// Number of role permutations considered (>= 1).
    fn num_permutations(&self) -> usize;

    /// Test two bounding regions assigned to positions `pos_a` and `pos_b`.
    ///
    /// Narrows `status` (one entry per permutation) in place and returns
    /// its [`summarize`]d value.
    fn test_hrect_pair(
        &self,
        a: &Hrect,
        b: &Hrect,
        pos_a: usize,
        pos_b: usize,
        status: &mut [BoundStatus],
    ) -> BoundStatus;

    /// Test the squared distance between the points at `pos_a` and `pos_b`.
    ///
    /// Clears entries of `ok` (one per permutation) that the distance
    /// rules out and returns whether any entry is still set.
    fn test_point_pair(&self, dist_sq: f64, pos_a: usize, pos_b: usize, ok: &mut [bool]) -> bool;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn tuple_size(&self) -> usize {
        (**self).tuple_size()
    }

    fn num_permutations(&self) -> usize {
        (**self).num_permutations()
    }

    fn test_hrect_pair(
        &self,
        a: &Hrect,
        b: &Hrect,
        pos_a: usize,
        pos_b: usize,
        status: &mut [BoundStatus],
    ) -> BoundStatus {
        (**self).test_hrect_pair(a, b, pos_a, pos_b, status)
    }

    fn test_point_pair(&self, dist_sq: f64, pos_a: usize, pos_b: usize, ok: &mut [bool]) -> bool {
        (**self).test_point_pair(dist_sq, pos_a, pos_b, ok)
    }
}
