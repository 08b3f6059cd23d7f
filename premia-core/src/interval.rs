//! Fixed-interval band statistics.
//!
//! Instead of a trailing window, the caller picks a calendar interval and
//! gets one flat set of sigma bands over every observation inside it.
//! Requested bounds snap to actual trading days: the start snaps forward to
//! the first observation on or after it, the end snaps backward to the last
//! observation on or before it. An end beyond the latest observation is
//! fine and clamps to the latest; a start outside the data is an error.

use chrono::NaiveDate;

use crate::error::{Error, RangeBound, Result};
use crate::window::stats::{median_of_sorted, population_stddev, SigmaBands};

/// The resolved interval and its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStats {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
    pub used_start: NaiveDate,
    pub used_end: NaiveDate,
    /// Inclusive index range into the input slices.
    pub start_index: usize,
    pub end_index: usize,
    pub median: f64,
    pub stddev: f64,
    pub bands: SigmaBands,
}

/// Compute flat sigma bands over the observations between `start` and
/// `end`. `dates` must be sorted ascending and index-aligned with `values`.
pub fn interval_bands(
    dates: &[NaiveDate],
    values: &[f64],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IntervalStats> {
    if dates.len() != values.len() {
        return Err(Error::InternalInconsistency(format!(
            "interval input misaligned: {} dates against {} values",
            dates.len(),
            values.len()
        )));
    }
    let (&earliest, &latest) = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::EmptyResult),
    };

    let out_of_range = |bound: RangeBound, requested: NaiveDate| Error::OutOfRange {
        bound,
        requested,
        earliest,
        latest,
    };
    if start < earliest || start > latest {
        return Err(out_of_range(RangeBound::Start, start));
    }
    if end < earliest {
        return Err(out_of_range(RangeBound::End, end));
    }

    let start_index = dates.partition_point(|&date| date < start);
    let end_index = dates.partition_point(|&date| date <= end).saturating_sub(1);
    let used_start = dates[start_index];
    let used_end = dates[end_index];
    if used_start > used_end {
        return Err(Error::InvertedRange {
            used_start,
            used_end,
        });
    }

    let selected = &values[start_index..=end_index];
    let mut sorted = selected.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = median_of_sorted(&sorted).ok_or(Error::EmptyResult)?;
    let sum: f64 = selected.iter().sum();
    let sum_squares: f64 = selected.iter().map(|v| v * v).sum();
    let stddev = population_stddev(sum, sum_squares, selected.len())?;

    Ok(IntervalStats {
        earliest,
        latest,
        used_start,
        used_end,
        start_index,
        end_index,
        median,
        stddev,
        bands: SigmaBands::around(median, stddev),
    })
}
