//! Domain types: raw cells, validated scalars, and typed series observations.

pub mod cell;
pub mod observations;

pub use cell::{Cell, Scalar};
pub use observations::{
    BandRow, BondObservation, Dated, ErpObservation, MergedObservation, PeObservation,
    RatioObservation,
};
