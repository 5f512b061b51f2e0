//! Synthetic point sets for tests and benchmarks.
//!
//! All generators are seeded and reproducible. Points get unit weights;
//! use [`PointStore::with_weights`] to change them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{NPointError, Result};
use crate::points::PointStore;

/// `n` points uniform in `[0, 1]^dimension`.
///
/// Fails if `dimension` is 0.
pub fn uniform_points(n: usize, dimension: usize, seed: u64) -> Result<PointStore> {
    let mut rng = StdRng::seed_from_u64(seed);
    let coords: Vec<f64> = (0..n * dimension).map(|_| rng.random::<f64>()).collect();
    PointStore::new(dimension, coords)
}

/// `n` points scattered around `clusters` uniform random centres.
///
/// Each point is its centre plus independent uniform noise in
/// `[-spread, spread]` per coordinate. Real correlation data is clumpy;
/// this exercises the pruning far more than uniform data does.
///
/// Fails if `dimension` or `clusters` is 0, or `spread` is not finite.
pub fn clustered_points(
    n: usize,
    dimension: usize,
    clusters: usize,
    spread: f64,
    seed: u64,
) -> Result<PointStore> {
    if dimension == 0 {
        return Err(NPointError::InvalidParameter(
            "dimension must be greater than 0".to_string(),
        ));
    }
    if clusters == 0 {
        return Err(NPointError::InvalidParameter(
            "clusters must be greater than 0".to_string(),
        ));
    }
    if !spread.is_finite() {
        return Err(NPointError::InvalidParameter(format!(
            "spread must be finite, got {spread}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let centres: Vec<Vec<f64>> = (0..clusters)
        .map(|_| (0..dimension).map(|_| rng.random::<f64>()).collect())
        .collect();

    let mut coords = Vec::with_capacity(n * dimension);
    for _ in 0..n {
        let centre = &centres[rng.random_range(0..clusters)];
        for &c in centre {
            coords.push(c + spread * (2.0 * rng.random::<f64>() - 1.0));
        }
    }

    PointStore::new(dimension, coords)
}
