//! Premia Core — cleaning, alignment, and windowed statistics for
//! valuation time series.
//!
//! This crate contains the computational heart of the toolkit:
//! - Domain types (cells, scalars, dated observations, sigma bands)
//! - Schema-driven sheet cleaning with coordinate-tagged errors
//! - Spreadsheet date-serial and text date parsing
//! - As-of alignment of two date-sorted series
//! - Equity risk premium derivation
//! - Sliding-window engine (moving average, percentile ranks, sigma bands)
//! - Fixed-interval band statistics
//! - Export-grade number and date rendering

pub mod align;
pub mod clean;
pub mod domain;
pub mod erp;
pub mod error;
pub mod interval;
pub mod render;
pub mod window;

pub use error::{Error, ErrorKind, Result};
