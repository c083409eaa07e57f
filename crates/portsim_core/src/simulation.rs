//! Single-asset accumulation engine

use std::time::Instant;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::engine::{EngineState, MonteCarloEngine, SeedSource};
use crate::error::SimError;
use crate::model::{SimulationParameters, SimulationResult, principal_schedule};
use crate::sampling::{generate_paths, growth_distribution, period_major};

/// Fill one trajectory: `v[0] = (start + c) * g[0]`, `v[t] = (v[t-1] + c) * g[t]`.
fn accumulate_path<R: Rng + ?Sized>(
    growth: &Normal<f64>,
    start: f64,
    contribution: f64,
    rng: &mut R,
    path: &mut [f64],
) {
    let mut value = start;
    for slot in path.iter_mut() {
        value = (value + contribution) * growth.sample(rng);
        *slot = value;
    }
}

/// Run one single-asset simulation with an explicit run seed.
pub fn simulate(params: &SimulationParameters, seed: u64) -> Result<SimulationResult, SimError> {
    params.validate()?;
    let growth = growth_distribution(params.profit, params.risk)?;

    let years = params.year as usize;
    let start = params.start as f64;
    let contribution = params.annual_contribution();

    let paths = generate_paths(params.size, seed, years, |rng, path| {
        accumulate_path(&growth, start, contribution, rng, path);
    });

    Ok(SimulationResult::new(
        params.size,
        period_major(&paths, years, 1),
        principal_schedule(params.start, params.month, params.year),
    ))
}

/// Monte Carlo engine for one asset with i.i.d. normal annual returns
#[derive(Debug, Clone)]
pub struct MonteCarloSim {
    param: SimulationParameters,
    state: EngineState,
    result: Option<SimulationResult>,
    seeds: SeedSource,
}

impl Default for MonteCarloSim {
    fn default() -> Self {
        Self::new()
    }
}

impl MonteCarloSim {
    /// Engine with default parameters and an OS-seeded generator
    #[must_use]
    pub fn new() -> Self {
        Self::with_seeds(SeedSource::from_os())
    }

    /// Engine whose runs are reproducible from `seed`
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_seeds(SeedSource::from_seed(seed))
    }

    fn with_seeds(seeds: SeedSource) -> Self {
        Self {
            param: SimulationParameters::default(),
            state: EngineState::Unconfigured,
            result: None,
            seeds,
        }
    }
}

impl MonteCarloEngine for MonteCarloSim {
    type Params = SimulationParameters;

    fn set_param(&mut self, params: SimulationParameters) {
        self.param = params;
        self.result = None;
        self.state = EngineState::Parameterized;
    }

    fn param(&self) -> &SimulationParameters {
        &self.param
    }

    fn simulate(&mut self) -> Result<(), SimError> {
        let _span = tracing::debug_span!("simulate", engine = "single").entered();
        let started = Instant::now();
        let run_seed = self.seeds.next_run();

        let result = simulate(&self.param, run_seed)?;

        tracing::debug!(
            year = self.param.year,
            size = self.param.size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "single-asset simulation finished"
        );
        self.result = Some(result);
        self.state = EngineState::Simulated;
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn computed(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    fn percentiles(&self) -> &[u32] {
        &self.param.percentiles
    }
}
