//! Correlated multi-asset accumulation engine with optional rebalancing
//!
//! Each year every trajectory draws one joint growth vector from a
//! multivariate normal with mean `1 + profits` and covariance `cov`. The
//! base that grows is either each asset's own carried value plus its share
//! of the contribution, or (when rebalancing) the whole prior total
//! redistributed by `ratios` plus the contribution.

use std::time::Instant;

use rand::Rng;

use crate::engine::{EngineState, MonteCarloEngine, SeedSource};
use crate::error::{NotComputedError, SimError};
use crate::model::{MultiAssetParameters, MultiAssetResult, SimulationResult, principal_schedule};
use crate::sampling::{MultivariateNormal, generate_paths, period_major};

/// Inputs to one trajectory that do not change between years.
struct Allocation<'a> {
    ratios: &'a [f64],
    start: f64,
    contribution: f64,
    rebalance: bool,
}

impl Allocation<'_> {
    /// Base each asset grows from in period `t`, given last period's holdings.
    fn base(&self, t: usize, held: &[f64], out: &mut [f64]) {
        if t == 0 {
            for (o, r) in out.iter_mut().zip(self.ratios) {
                *o = (self.start + self.contribution) * r;
            }
        } else if self.rebalance {
            let total: f64 = held.iter().sum();
            for (o, r) in out.iter_mut().zip(self.ratios) {
                *o = total * r + self.contribution * r;
            }
        } else {
            for ((o, h), r) in out.iter_mut().zip(held).zip(self.ratios) {
                *o = h + self.contribution * r;
            }
        }
    }

    /// Fill one trajectory laid out as `[period, asset]`.
    fn accumulate_path<R: Rng + ?Sized>(
        &self,
        growth: &MultivariateNormal,
        rng: &mut R,
        path: &mut [f64],
    ) {
        let dim = growth.dim();
        let mut z = vec![0.0; dim];
        let mut sample = vec![0.0; dim];
        let mut base = vec![0.0; dim];
        let mut held = vec![0.0; dim];

        for (t, pattern) in path.chunks_exact_mut(dim).enumerate() {
            self.base(t, &held, &mut base);
            growth.sample_into(rng, &mut z, &mut sample);
            for ((p, b), g) in pattern.iter_mut().zip(&base).zip(&sample) {
                *p = b * g;
            }
            held.copy_from_slice(pattern);
        }
    }
}

/// Run one multi-asset simulation with an explicit run seed.
pub fn simulate(params: &MultiAssetParameters, seed: u64) -> Result<MultiAssetResult, SimError> {
    params.validate()?;

    let dim = params.dim();
    let years = params.year as usize;
    let mean: Vec<f64> = params.profits.iter().map(|p| 1.0 + p).collect();
    let growth = MultivariateNormal::new(mean, &params.cov);
    if growth.is_degenerate() {
        tracing::warn!(
            dim,
            "covariance is not positive semi-definite; sampled returns will understate its spread"
        );
    }

    let allocation = Allocation {
        ratios: &params.ratios,
        start: params.start as f64,
        contribution: params.annual_contribution(),
        rebalance: params.rebalance,
    };

    let paths = generate_paths(params.size, seed, years * dim, |rng, path| {
        allocation.accumulate_path(&growth, rng, path);
    });

    Ok(MultiAssetResult::new(
        dim,
        params.size,
        period_major(&paths, years, dim),
        principal_schedule(params.start, params.month, params.year),
    ))
}

/// Monte Carlo engine for a weighted basket of correlated assets
#[derive(Debug, Clone)]
pub struct MultiMonteCarloSim {
    param: MultiAssetParameters,
    state: EngineState,
    result: Option<MultiAssetResult>,
    seeds: SeedSource,
}

impl Default for MultiMonteCarloSim {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiMonteCarloSim {
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
            param: MultiAssetParameters::default(),
            state: EngineState::Unconfigured,
            result: None,
            seeds,
        }
    }

    /// Per-asset tensor of the last run
    pub fn asset_result(&self) -> Result<&MultiAssetResult, NotComputedError> {
        self.result.as_ref().ok_or(NotComputedError)
    }
}

impl MonteCarloEngine for MultiMonteCarloSim {
    type Params = MultiAssetParameters;

    fn set_param(&mut self, params: MultiAssetParameters) {
        self.param = params;
        self.result = None;
        self.state = EngineState::Parameterized;
    }

    fn param(&self) -> &MultiAssetParameters {
        &self.param
    }

    fn simulate(&mut self) -> Result<(), SimError> {
        let _span = tracing::debug_span!("simulate", engine = "multi").entered();
        let started = Instant::now();
        let run_seed = self.seeds.next_run();

        let result = simulate(&self.param, run_seed)?;

        tracing::debug!(
            dim = self.param.dim(),
            year = self.param.year,
            size = self.param.size,
            rebalance = self.param.rebalance,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "multi-asset simulation finished"
        );
        self.result = Some(result);
        self.state = EngineState::Simulated;
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.state
    }

    fn computed(&self) -> Option<&SimulationResult> {
        self.result.as_ref().map(MultiAssetResult::totals)
    }

    fn percentiles(&self) -> &[u32] {
        &self.param.percentiles
    }
}
