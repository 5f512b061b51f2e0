//! Exact point-level enumeration.
//!
//! Given one sorted candidate list per tuple position, fills positions left
//! to right. A candidate at position `k` must have a larger index than the
//! point at `k - 1` (the symmetry order) and must keep at least one matcher
//! permutation viable against every earlier position.
//!
//! The symmetry check is a binary search: in a sorted list, the candidates
//! that violate the order are exactly a prefix, so they are skipped in one
//! step and every remaining candidate satisfies it.

use crate::matcher::Matcher;
use crate::points::PointStore;

use super::{SearchStats, TupleCount};

/// Reusable enumerator state.
///
/// `valid` holds one permutation-validity row per depth: row `k` is the
/// state after positions `0..k` are placed (row 0 is all `true`). Writing
/// position `k` only touches row `k + 1`, so a sibling candidate always
/// starts again from the unnarrowed row `k`.
pub(crate) struct BaseCase<'a, M: Matcher> {
    points: &'a PointStore,
    matcher: &'a M,
    tuple_size: usize,
    num_permutations: usize,
    tuple: Vec<usize>,
    valid: Vec<bool>,
}

impl<'a, M: Matcher> BaseCase<'a, M> {
    pub(crate) fn new(points: &'a PointStore, matcher: &'a M) -> Self {
        let tuple_size = matcher.tuple_size();
        let num_permutations = matcher.num_permutations();
        Self {
            points,
            matcher,
            tuple_size,
            num_permutations,
            tuple: vec![0; tuple_size],
            valid: vec![true; (tuple_size + 1) * num_permutations],
        }
    }

    /// Enumerate every valid tuple drawn from `sets` into `acc`.
    ///
    /// Each set must be sorted ascending and hold in-range indices.
    pub(crate) fn run<S: AsRef<[usize]>>(
        &mut self,
        sets: &[S],
        acc: &mut TupleCount,
        stats: &mut SearchStats,
    ) {
        debug_assert_eq!(sets.len(), self.tuple_size);
        debug_assert!(sets
            .iter()
            .all(|s| s.as_ref().windows(2).all(|w| w[0] <= w[1])));

        stats.base_cases += 1;
        self.valid[..self.num_permutations].fill(true);
        self.place(sets, 0, acc, stats);
    }

    fn place<S: AsRef<[usize]>>(
        &mut self,
        sets: &[S],
        k: usize,
        acc: &mut TupleCount,
        stats: &mut SearchStats,
    ) {
        let set = sets[k].as_ref();
        let start = match k {
            0 => 0,
            _ => {
                let last = self.tuple[k - 1];
                set.partition_point(|&p| p <= last)
            }
        };
        let perms = self.num_permutations;

        for &candidate in &set[start..] {
            let (parents, children) = self.valid.split_at_mut((k + 1) * perms);
            let ok = &mut children[..perms];
            ok.copy_from_slice(&parents[k * perms..]);

            let mut works = true;
            for j in 0..k {
                let dist_sq = self.points.distance_sq(self.tuple[j], candidate);
                stats.point_pair_tests += 1;
                if !self.matcher.test_point_pair(dist_sq, j, k, ok) {
                    works = false;
                    break;
                }
            }
            if !works {
                continue;
            }

            self.tuple[k] = candidate;
            if k + 1 == self.tuple_size {
                let weight: f64 = self.tuple.iter().map(|&i| self.points.weight(i)).product();
                acc.record(weight);
            } else {
                self.place(sets, k + 1, acc, stats);
            }
        }
    }
}
