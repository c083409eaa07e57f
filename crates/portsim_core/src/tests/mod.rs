//! Integration tests for the portsim simulation engines
//!
//! Tests are organized by topic:
//! - `single_asset` - Single-asset recurrence, principal and engine lifecycle
//! - `multi_asset` - Correlated engine, rebalancing and per-asset results
//! - `analysis` - Percentile views taken through the engine interface

mod analysis;
