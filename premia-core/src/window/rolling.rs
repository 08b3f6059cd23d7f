//! Whole-series rolling computations built on [`WindowState`].

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::window::state::WindowState;
use crate::window::stats::SigmaBands;

/// Simple moving average. Positions before the window fills are `None`, so
/// the output is index-aligned with the input.
pub fn moving_average(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(Error::InvalidWindow);
    }
    let mut output = Vec::with_capacity(values.len());
    let mut queue: VecDeque<f64> = VecDeque::with_capacity(window + 1);
    let mut sum = 0.0;
    for &value in values {
        queue.push_back(value);
        sum += value;
        if queue.len() > window {
            if let Some(leaving) = queue.pop_front() {
                sum -= leaving;
            }
        }
        if queue.len() == window {
            output.push(Some(sum / window as f64));
        } else {
            output.push(None);
        }
    }
    Ok(output)
}

/// Percentile rank of each value within the trailing window, index-aligned
/// with the input. `None` inputs pass through as `None`; defined values
/// enter the window but no rank is emitted until exactly `window` values
/// are held.
pub fn rolling_percentiles(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(Error::InvalidWindow);
    }
    let mut output = vec![None; values.len()];
    let mut state = WindowState::new(window)?;
    for (index, value) in values.iter().enumerate() {
        let Some(value) = *value else {
            continue;
        };
        state.insert(value)?;
        if state.is_full() {
            output[index] = state.percentile_of(value);
        }
    }
    Ok(output)
}

/// Sigma bands over each full trailing window. The first band belongs to
/// input index `window - 1`, so the output holds `len - window + 1` rows.
pub fn rolling_bands(values: &[f64], window: usize) -> Result<Vec<SigmaBands>> {
    if window == 0 {
        return Err(Error::InvalidWindow);
    }
    if values.len() < window {
        return Err(Error::InsufficientData {
            required: window,
            available: values.len(),
        });
    }
    let mut output = Vec::with_capacity(values.len() - window + 1);
    let mut state = WindowState::new(window)?;
    for &value in values {
        state.insert(value)?;
        if !state.is_full() {
            continue;
        }
        let median = state.median().ok_or_else(|| {
            Error::InternalInconsistency("full window reported no median".to_string())
        })?;
        let stddev = state.stddev_population()?;
        output.push(SigmaBands::around(median, stddev));
    }
    Ok(output)
}
