//! Order and moment statistics shared by the window engine and the
//! interval calculator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Variance this close to zero from below is rounding residue, not
/// corruption.
pub const VARIANCE_EPSILON: f64 = 1e-12;

/// Median of an ascending slice. Even lengths average the two middle
/// elements. `None` for an empty slice.
pub fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let size = sorted.len();
    if size == 0 {
        return None;
    }
    let mid = size / 2;
    if size % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Population standard deviation from running sums. Tiny negative variance
/// is clamped to zero; anything beyond [`VARIANCE_EPSILON`] indicates the
/// running sums have drifted and is refused.
pub fn population_stddev(sum: f64, sum_squares: f64, count: usize) -> Result<f64> {
    if count == 0 {
        return Err(Error::InvalidWindow);
    }
    let mean = sum / count as f64;
    let mut variance = sum_squares / count as f64 - mean * mean;
    if variance < 0.0 {
        if variance > -VARIANCE_EPSILON {
            variance = 0.0;
        } else {
            return Err(Error::NegativeVariance(variance));
        }
    }
    Ok(variance.sqrt())
}

/// Median plus one- and two-sigma bands around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaBands {
    pub upper_2: f64,
    pub upper_1: f64,
    pub median: f64,
    pub lower_1: f64,
    pub lower_2: f64,
}

impl SigmaBands {
    pub fn around(median: f64, stddev: f64) -> Self {
        Self {
            upper_2: median + 2.0 * stddev,
            upper_1: median + stddev,
            median,
            lower_1: median - stddev,
            lower_2: median - 2.0 * stddev,
        }
    }
}
