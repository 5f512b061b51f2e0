//! Distance-band matcher.
//!
//! The matcher is an `n x n` symmetric matrix of distance bands: roles `a`
//! and `b` of a matched configuration must lie between `lower[a][b]` and
//! `upper[a][b]` of each other. A tuple of points matches if *some*
//! assignment of roles to tuple positions puts every pair inside its band.
//!
//! Permutations whose permuted band matrix equals an earlier one are
//! dropped, so symmetric templates (all bands equal, isosceles triangles)
//! carry fewer permutations through the search.
//!
//! All comparisons are on squared distances; bands are squared once at
//! construction.

use crate::error::{NPointError, Result};
use crate::matcher::{summarize, BoundStatus, Matcher};
use crate::tree::Hrect;

/// Largest tuple size accepted with [`PermutationMode::All`] (8! = 40320).
pub const MAX_PERMUTED_TUPLE_SIZE: usize = 8;

/// Which role assignments the matcher considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermutationMode {
    /// Every assignment of roles to positions (deduplicated).
    #[default]
    All,
    /// Role `i` is always position `i`.
    Identity,
}

/// Squared-distance interval.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    lower_sq: f64,
    upper_sq: f64,
}

impl Band {
    #[inline]
    fn contains(&self, dist_sq: f64) -> bool {
        self.lower_sq <= dist_sq && dist_sq <= self.upper_sq
    }
}

/// Matcher over pairwise distance bands.
#[derive(Debug, Clone)]
pub struct DistanceMatcher {
    tuple_size: usize,
    /// `num_permutations` blocks of `tuple_size^2` bands, indexed by position pair.
    bands: Vec<Band>,
    /// Role assigned to each position, per kept permutation.
    permutations: Vec<Vec<usize>>,
}

impl DistanceMatcher {
    /// Build from lower and upper distance matrices.
    ///
    /// Off-diagonal entries must be symmetric, with `0 <= lower <= upper`;
    /// `upper` may be infinite. Diagonals are ignored.
    pub fn new(lower: &[Vec<f64>], upper: &[Vec<f64>], mode: PermutationMode) -> Result<Self> {
        let n = lower.len();
        if n == 0 {
            return Err(NPointError::InvalidParameter(
                "tuple size must be greater than 0".to_string(),
            ));
        }
        if upper.len() != n {
            return Err(NPointError::TupleSizeMismatch {
                expected: n,
                actual: upper.len(),
            });
        }
        for row in lower.iter().chain(upper) {
            if row.len() != n {
                return Err(NPointError::DimensionMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
        }
        if mode == PermutationMode::All && n > MAX_PERMUTED_TUPLE_SIZE {
            return Err(NPointError::InvalidParameter(format!(
                "tuple size {n} exceeds {MAX_PERMUTED_TUPLE_SIZE} with all permutations"
            )));
        }

        let mut roles = vec![Band { lower_sq: 0.0, upper_sq: f64::INFINITY }; n * n];
        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let (lo, hi) = (lower[a][b], upper[a][b]);
                if lo != lower[b][a] || hi != upper[b][a] {
                    return Err(NPointError::InvalidParameter(format!(
                        "bands for roles ({a}, {b}) are not symmetric"
                    )));
                }
                if !lo.is_finite() || lo < 0.0 || hi.is_nan() || hi < lo {
                    return Err(NPointError::InvalidParameter(format!(
                        "invalid band [{lo}, {hi}] for roles ({a}, {b})"
                    )));
                }
                roles[a * n + b] = Band {
                    lower_sq: lo * lo,
                    upper_sq: hi * hi,
                };
            }
        }

        let candidates = match mode {
            PermutationMode::All => all_permutations(n),
            PermutationMode::Identity => vec![(0..n).collect()],
        };

        let mut bands: Vec<Band> = Vec::new();
        let mut permutations = Vec::new();
        for perm in candidates {
            let block: Vec<Band> = (0..n * n)
                .map(|ab| roles[perm[ab / n] * n + perm[ab % n]])
                .collect();
            let duplicate = bands.chunks_exact(n * n).any(|kept| kept == block.as_slice());
            if !duplicate {
                bands.extend(block);
                permutations.push(perm);
            }
        }

        Ok(Self {
            tuple_size: n,
            bands,
            permutations,
        })
    }

    /// Accept tuples whose pairwise distances are all at most `radius`.
    pub fn within(tuple_size: usize, radius: f64) -> Result<Self> {
        let lower = vec![vec![0.0; tuple_size]; tuple_size];
        let upper = vec![vec![radius; tuple_size]; tuple_size];
        Self::new(&lower, &upper, PermutationMode::Identity)
    }

    /// Accept tuples whose pairwise distances each lie within
    /// `bandwidth / 2` of a target configuration.
    ///
    /// This is the usual shape of an n-point correlation bin: `targets` is
    /// the template's distance matrix, `bandwidth` the bin width.
    pub fn from_targets(targets: &[Vec<f64>], bandwidth: f64, mode: PermutationMode) -> Result<Self> {
        if !(bandwidth.is_finite() && bandwidth >= 0.0) {
            return Err(NPointError::InvalidParameter(format!(
                "bandwidth must be finite and non-negative, got {bandwidth}"
            )));
        }
        let half = 0.5 * bandwidth;
        let lower: Vec<Vec<f64>> = targets
            .iter()
            .map(|row| row.iter().map(|&d| (d - half).max(0.0)).collect())
            .collect();
        let upper: Vec<Vec<f64>> = targets
            .iter()
            .map(|row| row.iter().map(|&d| d + half).collect())
            .collect();
        Self::new(&lower, &upper, mode)
    }

    /// Role assigned to each tuple position, per permutation.
    pub fn permutations(&self) -> &[Vec<usize>] {
        &self.permutations
    }

    #[inline]
    fn band(&self, perm: usize, pos_a: usize, pos_b: usize) -> Band {
        let n = self.tuple_size;
        self.bands[perm * n * n + pos_a * n + pos_b]
    }
}

impl Matcher for DistanceMatcher {
    fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    fn num_permutations(&self) -> usize {
        self.permutations.len()
    }

    fn test_hrect_pair(
        &self,
        a: &Hrect,
        b: &Hrect,
        pos_a: usize,
        pos_b: usize,
        status: &mut [BoundStatus],
    ) -> BoundStatus {
        debug_assert_eq!(status.len(), self.num_permutations());

        let min_sq = a.min_distance_sq(b);
        let max_sq = a.max_distance_sq(b);

        for (perm, st) in status.iter_mut().enumerate() {
            if *st == BoundStatus::Exclude {
                continue;
            }
            let band = self.band(perm, pos_a, pos_b);
            let here = if max_sq < band.lower_sq || min_sq > band.upper_sq {
                BoundStatus::Exclude
            } else if band.lower_sq <= min_sq && max_sq <= band.upper_sq {
                BoundStatus::Subsume
            } else {
                BoundStatus::Inconclusive
            };
            *st = (*st).min(here);
        }

        summarize(status)
    }

    fn test_point_pair(&self, dist_sq: f64, pos_a: usize, pos_b: usize, ok: &mut [bool]) -> bool {
        debug_assert_eq!(ok.len(), self.num_permutations());

        let mut any = false;
        for (perm, ok) in ok.iter_mut().enumerate() {
            if *ok {
                *ok = self.band(perm, pos_a, pos_b).contains(dist_sq);
                any |= *ok;
            }
        }
        any
    }
}

/// All permutations of `0..n` in lexicographic order.
fn all_permutations(n: usize) -> Vec<Vec<usize>> {
    let mut current: Vec<usize> = (0..n).collect();
    let mut out = vec![current.clone()];

    loop {
        // Rightmost ascent.
        let Some(i) = (1..n).rev().find(|&i| current[i - 1] < current[i]) else {
            return out;
        };
        let pivot = i - 1;
        let Some(j) = (i..n).rev().find(|&j| current[j] > current[pivot]) else {
            return out;
        };
        current.swap(pivot, j);
        current[i..].reverse();
        out.push(current.clone());
    }
}
