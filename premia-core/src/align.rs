//! As-of alignment of two date-sorted series.
//!
//! The primary series sets the output calendar. For each primary date, the
//! earliest secondary observation dated on or after it is joined in and
//! consumed, so the join is a single forward pass over both series and no
//! secondary observation is reused.

use crate::domain::Dated;
use crate::error::{Error, Result};

/// Rescale a published yield to a decimal fraction. Sources disagree on
/// units: `3.2` means 3.2 percent, `0.032` already is the fraction.
pub fn normalize_yield(raw: f64) -> f64 {
    if raw > 1.0 {
        raw / 100.0
    } else {
        raw
    }
}

/// Join `secondary` onto `primary` as-of each primary date.
///
/// Both inputs must be sorted ascending by date. Fails with
/// [`Error::AlignmentExhausted`] when the secondary series runs out before
/// a primary date is matched, and with [`Error::EmptyResult`] when the
/// primary series is empty.
pub fn align_as_of<P, S, T, F>(primary: &[P], secondary: &[S], mut combine: F) -> Result<Vec<T>>
where
    P: Dated,
    S: Dated,
    F: FnMut(&P, &S) -> T,
{
    let mut output = Vec::with_capacity(primary.len());
    let mut cursor = 0usize;
    for item in primary {
        while cursor < secondary.len() && secondary[cursor].date() < item.date() {
            cursor += 1;
        }
        let candidate = secondary.get(cursor).ok_or(Error::AlignmentExhausted {
            primary_date: item.date(),
        })?;
        output.push(combine(item, candidate));
        cursor += 1;
    }
    if output.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(output)
}
