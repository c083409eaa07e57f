//! Command-line front end for the portsim Monte Carlo engines
//!
//! This crate wraps `portsim_core` with:
//! - YAML and CSV-workbook parameter files
//! - Table rendering and CSV export of the percentile views
//! - File logging with size-based rotation

// ============================================================================
// Core modules
// ============================================================================

pub mod commands;
pub mod data;
pub mod logging;
pub mod report;
pub mod util;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use commands::{View, run_multi, run_single};
pub use data::StorageError;
pub use logging::init_logging;
