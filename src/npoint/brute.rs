//! Brute-force reference counting.
//!
//! Tests every `C(N, n)` index combination directly. Exponential in `n`,
//! meant for small inputs and for checking the tree search.

use crate::error::{NPointError, Result};
use crate::matcher::Matcher;
use crate::points::PointStore;

use super::TupleCount;

/// Count unordered n-tuples of `points` accepted by `matcher` without a tree.
pub fn count_brute_force<M: Matcher>(points: &PointStore, matcher: &M) -> Result<TupleCount> {
    let k = matcher.tuple_size();
    if k == 0 || matcher.num_permutations() == 0 {
        return Err(NPointError::InvalidParameter(
            "matcher must have a positive tuple size and permutation count".to_string(),
        ));
    }

    let n = points.len();
    let mut acc = TupleCount::default();
    if k > n {
        return Ok(acc);
    }

    let mut combo: Vec<usize> = (0..k).collect();
    let mut ok = vec![true; matcher.num_permutations()];

    loop {
        ok.fill(true);
        let accepted = (0..k).all(|b| {
            (0..b).all(|a| {
                let dist_sq = points.distance_sq(combo[a], combo[b]);
                matcher.test_point_pair(dist_sq, a, b, &mut ok)
            })
        });
        if accepted {
            acc.record(combo.iter().map(|&i| points.weight(i)).product());
        }

        // Next combination in lexicographic order.
        let Some(pos) = (0..k).rev().find(|&pos| combo[pos] < n - k + pos) else {
            return Ok(acc);
        };
        combo[pos] += 1;
        for next in pos + 1..k {
            combo[next] = combo[next - 1] + 1;
        }
    }
}
