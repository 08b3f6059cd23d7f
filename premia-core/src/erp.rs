//! Equity risk premium derivation.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{ErpObservation, MergedObservation};
use crate::error::{Error, Result};

/// ERP as earnings yield discounted by the risk-free rate:
/// `(1 + 1/pe) / (1 + y) - 1`, with `y` a decimal fraction.
pub fn erp_value(pe: f64, yield_decimal: f64) -> f64 {
    (1.0 + 1.0 / pe) / (1.0 + yield_decimal) - 1.0
}

/// Derive the ERP series from merged observations. `yield_decimals` maps
/// each bond date to its decimal-fraction yield; a missing entry means the
/// merge and the lookup table disagree, which is a bug upstream.
pub fn compute_erp(
    merged: &[MergedObservation],
    yield_decimals: &BTreeMap<NaiveDate, f64>,
) -> Result<Vec<ErpObservation>> {
    let mut output = Vec::with_capacity(merged.len());
    for row in merged {
        let yield_decimal = yield_decimals.get(&row.date).copied().ok_or_else(|| {
            Error::InternalInconsistency(format!(
                "no decimal yield recorded for bond date {}",
                row.date
            ))
        })?;
        output.push(ErpObservation {
            date: row.date,
            yield_raw: row.yield_raw,
            pe: row.pe,
            close: row.close,
            erp: erp_value(row.pe, yield_decimal),
        });
    }
    Ok(output)
}
