//! Weighted point storage.
//!
//! Points live in one flat buffer, each point's `dimension` coordinates
//! contiguous (column-major for a `dimension x len` matrix), with a parallel
//! weight array. A point is identified by its position in that buffer.
//!
//! The store is immutable once built. Tree construction produces a permuted
//! copy (see [`PointStore::permuted`]) rather than reordering in place.

use serde::{Deserialize, Serialize};

use crate::error::{NPointError, Result};

/// Immutable weighted point set.
///
/// Deserialization goes through the same checks as [`PointStore::new`] and
/// [`PointStore::with_weights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPointStore")]
pub struct PointStore {
    coords: Vec<f64>,
    weights: Vec<f64>,
    dimension: usize,
}

/// Unchecked wire form of [`PointStore`].
#[derive(Deserialize)]
struct RawPointStore {
    coords: Vec<f64>,
    weights: Vec<f64>,
    dimension: usize,
}

impl TryFrom<RawPointStore> for PointStore {
    type Error = NPointError;

    fn try_from(raw: RawPointStore) -> Result<Self> {
        Self::new(raw.dimension, raw.coords)?.with_weights(raw.weights)
    }
}

impl PointStore {
    /// Create a store from a flat coordinate buffer with unit weights.
    pub fn new(dimension: usize, coords: Vec<f64>) -> Result<Self> {
        if dimension == 0 {
            return Err(NPointError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if coords.len() % dimension != 0 {
            return Err(NPointError::DimensionMismatch {
                expected: dimension,
                actual: coords.len() % dimension,
            });
        }
        if let Some(bad) = coords.iter().position(|c| !c.is_finite()) {
            return Err(NPointError::InvalidParameter(format!(
                "coordinate {} of point {} is not finite",
                bad % dimension,
                bad / dimension
            )));
        }

        let len = coords.len() / dimension;
        Ok(Self {
            coords,
            weights: vec![1.0; len],
            dimension,
        })
    }

    /// Create a store from one coordinate row per point, unit weights.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dimension = rows.first().map(Vec::len).ok_or_else(|| {
            NPointError::InvalidParameter("cannot infer dimension from zero rows".to_string())
        })?;

        let mut coords = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(NPointError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            coords.extend_from_slice(row);
        }

        Self::new(dimension, coords)
    }

    /// Replace the weights. One weight per point.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.len() {
            return Err(NPointError::InvalidParameter(format!(
                "expected {} weights, got {}",
                self.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(NPointError::InvalidParameter(
                "weights must be finite".to_string(),
            ));
        }
        self.weights = weights;
        Ok(self)
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Coordinates of point `idx`.
    #[inline]
    pub fn point(&self, idx: usize) -> &[f64] {
        let start = idx * self.dimension;
        &self.coords[start..start + self.dimension]
    }

    #[inline]
    pub fn weight(&self, idx: usize) -> f64 {
        self.weights[idx]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Squared Euclidean distance between two stored points.
    #[inline]
    pub fn distance_sq(&self, a: usize, b: usize) -> f64 {
        squared_distance(self.point(a), self.point(b))
    }

    /// Copy of the store in a new order: point `i` of the result is point
    /// `order[i]` of `self`.
    pub(crate) fn permuted(&self, order: &[usize]) -> Self {
        debug_assert_eq!(order.len(), self.len());

        let mut coords = Vec::with_capacity(self.coords.len());
        let mut weights = Vec::with_capacity(self.len());
        for &old in order {
            coords.extend_from_slice(self.point(old));
            weights.push(self.weights[old]);
        }

        Self {
            coords,
            weights,
            dimension: self.dimension,
        }
    }
}

/// Squared Euclidean distance.
#[inline]
#[must_use]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
