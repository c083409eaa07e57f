//! Percentile views taken through the engine interface

use crate::analysis::{nearest_percentile, percentile_label};
use crate::engine::MonteCarloEngine;
use crate::error::{HistogramError, NotComputedError};
use crate::model::{MultiAssetParameters, SimulationParameters, default_percentiles};
use crate::multi_simulation::MultiMonteCarloSim;
use crate::simulation::MonteCarloSim;

fn simulated(year: u32, size: usize) -> MonteCarloSim {
    let mut engine = MonteCarloSim::with_seed(1234);
    engine.set_param(SimulationParameters {
        year,
        size,
        ..Default::default()
    });
    engine.simulate().unwrap();
    engine
}

#[test]
fn test_views_require_result() {
    let engine = MonteCarloSim::with_seed(0);

    assert_eq!(engine.percentile_describe().err(), Some(NotComputedError));
    assert_eq!(engine.percentile_history().err(), Some(NotComputedError));
    assert_eq!(engine.percentile_each_time().err(), Some(NotComputedError));
    assert_eq!(engine.histogram().err(), Some(HistogramError::NotComputed));

    let multi = MultiMonteCarloSim::with_seed(0);
    assert_eq!(multi.percentile_describe().err(), Some(NotComputedError));
}

#[test]
fn test_describe_covers_every_level() {
    let engine = simulated(15, 2_000);
    let rows = engine.percentile_describe().unwrap();

    assert_eq!(rows.len(), 7);
    assert!(rows.windows(2).all(|w| w[0].result >= w[1].result));
    // monotone percentiles: the default levels come back in the same order
    let levels: Vec<u32> = rows.iter().map(|r| r.percentile).collect();
    assert_eq!(levels, default_percentiles());

    let result = engine.result().unwrap();
    let principal = result.final_principal();
    for row in &rows {
        let value = nearest_percentile(result.final_period(), row.percentile);
        assert_eq!(row.result, value as i64);
        assert_eq!(row.profit, row.result - principal as i64);
        assert_eq!(row.label, percentile_label(row.percentile));
    }
}

#[test]
fn test_history_tracks_one_trajectory() {
    let engine = simulated(12, 1_000);
    let result = engine.result().unwrap();
    let table = engine.percentile_history().unwrap();

    assert_eq!(table.passing_year, (1..=12).collect::<Vec<u32>>());
    assert_eq!(table.columns.len(), 7);

    let median = table.column("median").unwrap();
    let target = nearest_percentile(result.final_period(), 50);
    let s = result
        .final_period()
        .iter()
        .position(|&v| v == target)
        .unwrap();
    for (t, ratio) in median.values.iter().enumerate() {
        let org = result.principal()[t];
        assert_eq!(*ratio, (result.value(t, s) - org) / org);
    }
}

#[test]
fn test_each_time_is_ordered_every_year() {
    let engine = simulated(8, 1_000);
    let table = engine.percentile_each_time().unwrap();

    let top = table.column("upper 1%").unwrap();
    let median = table.column("median").unwrap();
    let bottom = table.column("lower 1%").unwrap();
    for t in 0..8 {
        assert!(top.values[t] >= median.values[t]);
        assert!(median.values[t] >= bottom.values[t]);
    }
}

#[test]
fn test_histogram_of_final_year() {
    let engine = simulated(5, 1_000);
    let hist = engine.histogram().unwrap();
    let last = engine.result().unwrap().final_period();

    // log2(1000) + 1 = 10.97 -> 11 bins
    assert_eq!(hist.bins(), 11);
    let min = last.iter().copied().fold(f64::INFINITY, f64::min);
    let max = last.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(hist.edges.first().copied(), Some(min));
    assert_eq!(hist.edges.last().copied(), Some(max));
}

#[test]
fn test_multi_asset_views_use_totals() {
    let mut engine = MultiMonteCarloSim::with_seed(77);
    engine.set_param(MultiAssetParameters {
        year: 6,
        size: 500,
        percentiles: vec![90, 50, 10],
        ..Default::default()
    });
    engine.simulate().unwrap();

    let rows = engine.percentile_describe().unwrap();
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["upper 10%", "median", "lower 10%"]);

    let totals = engine.asset_result().unwrap().totals();
    assert_eq!(
        rows[1].result,
        nearest_percentile(totals.final_period(), 50) as i64
    );
    assert_eq!(engine.percentile_each_time().unwrap().passing_year.len(), 6);
}

#[test]
fn test_unbounded_final_values() {
    let mut engine = MonteCarloSim::with_seed(9);
    engine.set_param(SimulationParameters {
        profit: 0.0,
        risk: 1e300,
        year: 3,
        size: 50,
        ..Default::default()
    });
    engine.simulate().unwrap();
    let last = engine.result().unwrap().final_period();
    assert!(last.contains(&f64::INFINITY));
    assert!(last.contains(&f64::NEG_INFINITY));

    let rows = engine.percentile_describe().unwrap();
    assert_eq!(rows.first().map(|r| r.result), Some(i64::MAX));
    let bottom = rows.last().unwrap();
    assert_eq!(bottom.result, i64::MIN);
    assert_eq!(bottom.profit, i64::MIN);

    assert!(matches!(
        engine.histogram(),
        Err(HistogramError::NonFiniteRange { .. })
    ));
}
