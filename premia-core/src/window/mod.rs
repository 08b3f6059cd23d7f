//! Sliding-window statistics engine.

pub mod rolling;
pub mod state;
pub mod stats;

pub use rolling::{moving_average, rolling_bands, rolling_percentiles};
pub use state::WindowState;
pub use stats::{median_of_sorted, population_stddev, SigmaBands, VARIANCE_EPSILON};
