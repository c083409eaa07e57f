//! Subcommand implementations, kept free of argument parsing

use std::path::{Path, PathBuf};

use color_eyre::eyre::{WrapErr, bail};
use portsim_core::{
    DEFAULT_MAX_ASSETS, MonteCarloEngine, MonteCarloSim, MultiAssetParameters, MultiMonteCarloSim,
    SimulationParameters,
};

use crate::data::{load_multi, save_multi, save_single, save_workbook};
use crate::report;

/// Which percentile view to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Final-year distribution per percentile
    #[default]
    Describe,
    /// Whole history of the trajectory ending at each percentile
    History,
    /// Percentile recomputed every year
    EachTime,
    /// Sturges density histogram of the final year
    Histogram,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Reproducible run when set
    pub seed: Option<u64>,
    pub view: View,
    /// Also write the view as CSV
    pub export: Option<PathBuf>,
}

/// Kind of parameter file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ParamKind {
    Single,
    Multi,
}

/// Growth or shrink of a multi-asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AssetOp {
    Add,
    Remove,
}

fn render<E: MonteCarloEngine>(engine: &E, options: &RunOptions) -> color_eyre::Result<String> {
    let rendered = match options.view {
        View::Describe => {
            let rows = engine.percentile_describe()?;
            if let Some(path) = &options.export {
                report::export_describe(path, &rows)?;
            }
            report::describe_table(&rows).to_string()
        }
        View::History => {
            let table = engine.percentile_history()?;
            if let Some(path) = &options.export {
                report::export_percentile_table(path, &table)?;
            }
            report::percentile_table(&table).to_string()
        }
        View::EachTime => {
            let table = engine.percentile_each_time()?;
            if let Some(path) = &options.export {
                report::export_percentile_table(path, &table)?;
            }
            report::percentile_table(&table).to_string()
        }
        View::Histogram => {
            let hist = engine.histogram()?;
            if let Some(path) = &options.export {
                report::export_histogram(path, &hist)?;
            }
            report::histogram_table(&hist).to_string()
        }
    };
    Ok(rendered)
}

/// Simulate one asset and render the requested view
pub fn run_single(
    params: SimulationParameters,
    options: &RunOptions,
) -> color_eyre::Result<String> {
    let mut engine = match options.seed {
        Some(seed) => MonteCarloSim::with_seed(seed),
        None => MonteCarloSim::new(),
    };
    tracing::info!(
        year = params.year,
        size = params.size,
        view = ?options.view,
        "running single-asset simulation"
    );
    engine.set_param(params);
    engine.simulate().wrap_err("single-asset simulation failed")?;
    render(&engine, options)
}

/// Simulate a basket of assets and render the requested view
pub fn run_multi(params: MultiAssetParameters, options: &RunOptions) -> color_eyre::Result<String> {
    let mut engine = match options.seed {
        Some(seed) => MultiMonteCarloSim::with_seed(seed),
        None => MultiMonteCarloSim::new(),
    };
    tracing::info!(
        dim = params.dim(),
        year = params.year,
        size = params.size,
        rebalance = params.rebalance,
        view = ?options.view,
        "running multi-asset simulation"
    );
    engine.set_param(params);
    engine.simulate().wrap_err("multi-asset simulation failed")?;
    render(&engine, options)
}

/// Write a parameter file filled with defaults
pub fn init_params(kind: ParamKind, path: &Path, workbook: bool) -> color_eyre::Result<()> {
    match (kind, workbook) {
        (ParamKind::Single, true) => bail!("workbooks hold multi-asset parameters only"),
        (ParamKind::Single, false) => save_single(path, &SimulationParameters::default())?,
        (ParamKind::Multi, true) => save_workbook(path, &MultiAssetParameters::default())?,
        (ParamKind::Multi, false) => save_multi(path, &MultiAssetParameters::default())?,
    }
    tracing::info!(kind = ?kind, path = %path.display(), "initialized parameter file");
    Ok(())
}

/// Convert a multi-asset YAML file into a workbook, or back with `to_yaml`
pub fn convert(from: &Path, to: &Path, to_yaml: bool) -> color_eyre::Result<()> {
    if to_yaml {
        let params = crate::data::load_workbook(from)?;
        save_multi(to, &params)?;
    } else {
        let params = load_multi(from)?;
        save_workbook(to, &params)?;
    }
    tracing::info!(from = %from.display(), to = %to.display(), "converted parameters");
    Ok(())
}

/// Append or drop the last asset of a multi-asset YAML file. Returns the new count.
pub fn resize_assets(path: &Path, op: AssetOp, max: Option<usize>) -> color_eyre::Result<usize> {
    let mut params = load_multi(path)?;
    match op {
        AssetOp::Add => params.add_items(max.unwrap_or(DEFAULT_MAX_ASSETS))?,
        AssetOp::Remove => params.remove_items()?,
    }
    save_multi(path, &params)?;
    tracing::info!(path = %path.display(), dim = params.dim(), "resized asset list");
    Ok(params.dim())
}
