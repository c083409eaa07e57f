//! Behaviour shared by the single- and multi-asset engines

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

use crate::analysis::{self, DescribeRow, Histogram, PercentileTable};
use crate::error::{HistogramError, NotComputedError, SimError};
use crate::model::SimulationResult;

/// Lifecycle of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed with default parameters, nothing set yet
    Unconfigured,
    /// Parameters set, no result
    Parameterized,
    /// Holding the result of the last `simulate()`
    Simulated,
}

/// A Monte Carlo engine that owns its parameters and, once simulated, its result.
///
/// `simulate` takes `&mut self` and the analytics take `&self`, so a result is
/// never read while it is being replaced.
pub trait MonteCarloEngine {
    type Params;

    /// Replace the parameters. Any previous result is discarded.
    fn set_param(&mut self, params: Self::Params);

    fn param(&self) -> &Self::Params;

    /// Run a full simulation, replacing any previous result.
    fn simulate(&mut self) -> Result<(), SimError>;

    fn state(&self) -> EngineState;

    /// Summed portfolio values, if computed
    fn computed(&self) -> Option<&SimulationResult>;

    /// Percentile levels to report
    fn percentiles(&self) -> &[u32];

    fn has_result(&self) -> bool {
        self.computed().is_some()
    }

    fn result(&self) -> Result<&SimulationResult, NotComputedError> {
        self.computed().ok_or(NotComputedError)
    }

    fn percentile_describe(&self) -> Result<Vec<DescribeRow>, NotComputedError> {
        Ok(analysis::describe(self.result()?, self.percentiles()))
    }

    fn percentile_history(&self) -> Result<PercentileTable, NotComputedError> {
        Ok(analysis::history(self.result()?, self.percentiles()))
    }

    fn percentile_each_time(&self) -> Result<PercentileTable, NotComputedError> {
        Ok(analysis::each_time(self.result()?, self.percentiles()))
    }

    fn histogram(&self) -> Result<Histogram, HistogramError> {
        analysis::sturges_histogram(self.result()?.final_period())
    }
}

/// Source of per-run seeds for an engine.
#[derive(Debug, Clone)]
pub(crate) struct SeedSource {
    rng: SmallRng,
}

impl SeedSource {
    /// Seeded from the operating system
    pub(crate) fn from_os() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub(crate) fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Fresh seed for one `simulate()` call
    pub(crate) fn next_run(&mut self) -> u64 {
        self.rng.random()
    }
}
