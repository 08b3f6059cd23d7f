//! Typed per-date observations flowing between pipeline stages.
//!
//! Each stage hands the next a read-only, date-sorted sequence of these.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::window::SigmaBands;

/// Anything keyed by a calendar date. Seam for the as-of aligner and the
/// interval statistics, which only need the date axis.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// One cleaned row of the valuation sheet: PE ratio and index close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeObservation {
    pub date: NaiveDate,
    pub pe: f64,
    pub close: f64,
}

/// One cleaned row of the bond sheet: the 10-year yield as published
/// (`yield_raw`) and rescaled to a decimal fraction (`yield_decimal`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondObservation {
    pub date: NaiveDate,
    pub yield_raw: f64,
    pub yield_decimal: f64,
}

/// A bond date joined with the nearest not-earlier PE observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedObservation {
    pub date: NaiveDate,
    pub yield_raw: f64,
    pub pe: f64,
    pub close: f64,
}

/// A merged observation with the derived equity risk premium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpObservation {
    pub date: NaiveDate,
    pub yield_raw: f64,
    pub pe: f64,
    pub close: f64,
    pub erp: f64,
}

/// One cleaned row of a two-column ratio sheet (thermometer inputs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioObservation {
    pub date: NaiveDate,
    pub value: f64,
}

/// An ERP observation decorated with its rolling sigma bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandRow {
    #[serde(flatten)]
    pub observation: ErpObservation,
    #[serde(flatten)]
    pub bands: SigmaBands,
}

impl Dated for PeObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for BondObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for MergedObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ErpObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for RatioObservation {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}
