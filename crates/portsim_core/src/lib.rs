//! Monte Carlo portfolio accumulation library
//!
//! Projects the value of a periodically funded portfolio under random annual
//! returns and summarizes the spread of outcomes as percentile bands.
//! It supports:
//! - A single asset with i.i.d. normal growth
//! - A weighted basket of correlated assets, optionally rebalanced every year
//! - Correlation/covariance reconstruction from a lower-triangular correlation
//! - Final-year, per-trajectory and per-year percentile views plus a histogram
//!
//! # Example
//!
//! ```no_run
//! use portsim_core::{MonteCarloEngine, MonteCarloSim, SimulationParameters};
//!
//! let mut engine = MonteCarloSim::with_seed(42);
//! engine.set_param(SimulationParameters {
//!     year: 30,
//!     month: 50_000,
//!     ..Default::default()
//! });
//! engine.simulate()?;
//!
//! for row in engine.percentile_describe()? {
//!     println!("{:>10} {:>12} {:>7.2}%", row.label, row.result, row.profit_ratio * 100.0);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod multi_simulation;
pub mod sampling;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use engine::{EngineState, MonteCarloEngine};
pub use error::{CapacityError, HistogramError, NotComputedError, SimError, ValidationError};
pub use matrix::Matrix;
pub use model::{
    DEFAULT_MAX_ASSETS, MultiAssetParameters, MultiAssetResult, SimulationParameters,
    SimulationResult,
};
pub use multi_simulation::MultiMonteCarloSim;
pub use simulation::MonteCarloSim;
