//! Percentile analytics over a completed simulation.
//!
//! Three views are derived from the `[period, trajectory]` result:
//!
//! - [`describe`]: the final-year distribution at each requested percentile.
//! - [`history`]: the trajectory ending at each percentile, followed backwards
//!   through every year.
//! - [`each_time`]: the percentile recomputed independently at every year, so
//!   a column need not follow a single trajectory.
//!
//! Percentiles use nearest-rank selection, so every reported value is one of
//! the simulated values.

mod histogram;
mod percentiles;

pub use histogram::{Histogram, sturges_histogram};
pub use percentiles::{
    DescribeRow, PercentileColumn, PercentileTable, describe, each_time, history,
    nearest_percentile, nearest_percentile_index, percentile_label,
};
