//! Simulation outputs
//!
//! Results are dense, row-major tensors indexed by period first so that a
//! period's cross-section is a contiguous slice.

use serde::{Deserialize, Serialize};

/// Portfolio value for every `[period, trajectory]` plus the contributed principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    years: usize,
    size: usize,
    values: Vec<f64>,
    /// Cumulative contributions at the end of each period (no growth)
    principal: Vec<f64>,
}

impl SimulationResult {
    /// # Panics
    /// If `values` is not `principal.len() * size` long.
    #[must_use]
    pub fn new(size: usize, values: Vec<f64>, principal: Vec<f64>) -> Self {
        let years = principal.len();
        assert_eq!(values.len(), years * size, "result tensor has wrong length");
        Self {
            years,
            size,
            values,
            principal,
        }
    }

    /// Number of periods
    #[must_use]
    pub fn years(&self) -> usize {
        self.years
    }

    /// Number of trajectories
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn value(&self, period: usize, trajectory: usize) -> f64 {
        self.values[period * self.size + trajectory]
    }

    /// Values of all trajectories at `period`
    #[must_use]
    pub fn period(&self, period: usize) -> &[f64] {
        &self.values[period * self.size..(period + 1) * self.size]
    }

    /// Cross-section of the last period
    #[must_use]
    pub fn final_period(&self) -> &[f64] {
        self.period(self.years - 1)
    }

    /// One trajectory through every period
    pub fn trajectory(&self, trajectory: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.years).map(move |t| self.value(t, trajectory))
    }

    #[must_use]
    pub fn principal(&self) -> &[f64] {
        &self.principal
    }

    #[must_use]
    pub fn final_principal(&self) -> f64 {
        self.principal[self.years - 1]
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Per-asset values for every `[period, trajectory, asset]` and their sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiAssetResult {
    dim: usize,
    per_asset: Vec<f64>,
    totals: SimulationResult,
}

impl MultiAssetResult {
    /// Builds the summed `[period, trajectory]` view from the per-asset tensor.
    #[must_use]
    pub fn new(dim: usize, size: usize, per_asset: Vec<f64>, principal: Vec<f64>) -> Self {
        assert_eq!(
            per_asset.len(),
            principal.len() * size * dim,
            "asset tensor has wrong length"
        );
        let values = if dim == 0 {
            vec![0.0; principal.len() * size]
        } else {
            per_asset
                .chunks_exact(dim)
                .map(|assets| assets.iter().sum())
                .collect()
        };
        Self {
            dim,
            per_asset,
            totals: SimulationResult::new(size, values, principal),
        }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    #[must_use]
    pub fn asset_value(&self, period: usize, trajectory: usize, asset: usize) -> f64 {
        self.per_asset[(period * self.totals.size() + trajectory) * self.dim + asset]
    }

    /// Holdings of every asset for one trajectory at one period
    #[must_use]
    pub fn holdings(&self, period: usize, trajectory: usize) -> &[f64] {
        let at = (period * self.totals.size() + trajectory) * self.dim;
        &self.per_asset[at..at + self.dim]
    }

    /// Summed portfolio values, compatible with single-asset analytics
    #[must_use]
    pub fn totals(&self) -> &SimulationResult {
        &self.totals
    }
}
