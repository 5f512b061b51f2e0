//! Axis-aligned bounding hyper-rectangles.

use serde::{Deserialize, Serialize};

use crate::error::NPointError;

/// Axis-aligned hyper-rectangle `[lo[d], hi[d]]` per dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHrect")]
pub struct Hrect {
    lo: Vec<f64>,
    hi: Vec<f64>,
}

#[derive(Deserialize)]
struct RawHrect {
    lo: Vec<f64>,
    hi: Vec<f64>,
}

impl TryFrom<RawHrect> for Hrect {
    type Error = NPointError;

    fn try_from(raw: RawHrect) -> Result<Self, Self::Error> {
        if raw.lo.len() != raw.hi.len() {
            return Err(NPointError::DimensionMismatch {
                expected: raw.lo.len(),
                actual: raw.hi.len(),
            });
        }
        if raw.lo.is_empty() {
            return Err(NPointError::InvalidParameter(
                "bounding box has no dimensions".to_string(),
            ));
        }
        let inverted = |d: &usize| {
            let (lo, hi) = (raw.lo[*d], raw.hi[*d]);
            lo.is_nan() || hi.is_nan() || lo > hi
        };
        if let Some(d) = (0..raw.lo.len()).find(inverted) {
            return Err(NPointError::InvalidParameter(format!(
                "bounding box is inverted along dimension {d}"
            )));
        }
        Ok(Self {
            lo: raw.lo,
            hi: raw.hi,
        })
    }
}

impl Hrect {
    /// Tight box around a set of points given as coordinate slices.
    ///
    /// Returns `None` for an empty set.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut lo = first.to_vec();
        let mut hi = first.to_vec();

        for p in iter {
            for (d, &v) in p.iter().enumerate() {
                if v < lo[d] {
                    lo[d] = v;
                }
                if v > hi[d] {
                    hi[d] = v;
                }
            }
        }

        Some(Self { lo, hi })
    }

    pub fn dimension(&self) -> usize {
        self.lo.len()
    }

    pub fn lo(&self) -> &[f64] {
        &self.lo
    }

    pub fn hi(&self) -> &[f64] {
        &self.hi
    }

    /// Dimension with the largest extent and that extent.
    pub fn widest_dimension(&self) -> (usize, f64) {
        let mut best = (0, f64::NEG_INFINITY);
        for (d, (lo, hi)) in self.lo.iter().zip(&self.hi).enumerate() {
            let width = hi - lo;
            if width > best.1 {
                best = (d, width);
            }
        }
        best
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point
            .iter()
            .zip(self.lo.iter().zip(&self.hi))
            .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
    }

    /// Smallest squared distance between any point of `self` and any point of `other`.
    pub fn min_distance_sq(&self, other: &Hrect) -> f64 {
        let mut sum = 0.0;
        for d in 0..self.lo.len() {
            // Gap along d, zero when the intervals overlap.
            let gap = (other.lo[d] - self.hi[d]).max(self.lo[d] - other.hi[d]);
            if gap > 0.0 {
                sum += gap * gap;
            }
        }
        sum
    }

    /// Largest squared distance between any point of `self` and any point of `other`.
    pub fn max_distance_sq(&self, other: &Hrect) -> f64 {
        let mut sum = 0.0;
        for d in 0..self.lo.len() {
            let span = (other.hi[d] - self.lo[d]).max(self.hi[d] - other.lo[d]);
            sum += span * span;
        }
        sum
    }
}
