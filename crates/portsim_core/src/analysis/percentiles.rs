use serde::{Deserialize, Serialize};

use crate::model::SimulationResult;

/// Display label for a percentile level.
///
/// 50 is the median, levels above it are counted from the top and levels
/// below it from the bottom.
#[must_use]
pub fn percentile_label(p: u32) -> String {
    match p {
        50 => "median".to_string(),
        p if p > 50 => format!("upper {}%", 100 - p),
        p => format!("lower {p}%"),
    }
}

/// Fractional rank used for nearest-rank selection, rounded half to even.
fn nearest_rank(n: usize, p: u32) -> usize {
    let q = f64::from(p) / 100.0;
    let n_f = n as f64;
    // n*q + (1 - q) - 1, the same virtual index a linear quantile would use
    let virtual_index = n_f * q + (1.0 - q) - 1.0;
    (virtual_index.round_ties_even().max(0.0) as usize).min(n - 1)
}

/// Sorted view of one cross-section, reused across percentile levels.
struct RankedSample<'a> {
    values: &'a [f64],
    /// Trajectory indices ordered by value; ties keep natural order
    order: Vec<usize>,
}

impl<'a> RankedSample<'a> {
    fn new(values: &'a [f64]) -> Self {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        Self { values, order }
    }

    fn value(&self, p: u32) -> f64 {
        self.values[self.order[nearest_rank(self.values.len(), p)]]
    }

    /// First trajectory, in natural order, holding the percentile value
    fn index(&self, p: u32) -> usize {
        let target = self.value(p);
        let first = self
            .order
            .partition_point(|&i| self.values[i].total_cmp(&target).is_lt());
        self.order[first]
    }
}

/// Nearest-rank percentile: always one of the sampled values, never interpolated.
///
/// # Panics
/// If `values` is empty.
#[must_use]
pub fn nearest_percentile(values: &[f64], p: u32) -> f64 {
    assert!(!values.is_empty(), "percentile of an empty sample");
    RankedSample::new(values).value(p)
}

/// Index of the first sample equal to the nearest-rank percentile.
#[must_use]
pub fn nearest_percentile_index(values: &[f64], p: u32) -> usize {
    assert!(!values.is_empty(), "percentile of an empty sample");
    RankedSample::new(values).index(p)
}

/// One row of the final-year summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeRow {
    pub percentile: u32,
    pub label: String,
    /// Final value, truncated to an integer
    pub result: i64,
    /// `result - final principal`, saturating at the `i64` bounds
    pub profit: i64,
    /// `profit / final principal`
    pub profit_ratio: f64,
}

/// Profit-ratio series for one percentile level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileColumn {
    pub percentile: u32,
    pub label: String,
    pub values: Vec<f64>,
}

/// Percentile series over time, one column per level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileTable {
    /// 1-based year numbers
    pub passing_year: Vec<u32>,
    pub columns: Vec<PercentileColumn>,
}

impl PercentileTable {
    #[must_use]
    pub fn column(&self, label: &str) -> Option<&PercentileColumn> {
        self.columns.iter().find(|c| c.label == label)
    }
}

fn passing_years(years: usize) -> Vec<u32> {
    (1..=years as u32).collect()
}

/// Final-year distribution at each requested percentile, sorted by value descending.
#[must_use]
pub fn describe(result: &SimulationResult, percentiles: &[u32]) -> Vec<DescribeRow> {
    let ranked = RankedSample::new(result.final_period());
    let principal = result.final_principal();

    let mut rows: Vec<DescribeRow> = percentiles
        .iter()
        .map(|&p| {
            let value = ranked.value(p) as i64;
            let profit = value.saturating_sub(principal as i64);
            DescribeRow {
                percentile: p,
                label: percentile_label(p),
                result: value,
                profit,
                profit_ratio: profit as f64 / principal,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.result.cmp(&a.result));
    rows
}

/// Profit-ratio history of the trajectory that ends at each percentile.
///
/// The trajectory is picked once from the final period and followed through
/// every year. Repeated labels share one column.
#[must_use]
pub fn history(result: &SimulationResult, percentiles: &[u32]) -> PercentileTable {
    let ranked = RankedSample::new(result.final_period());
    let principal = result.principal();
    let mut columns: Vec<PercentileColumn> = Vec::with_capacity(percentiles.len());

    for &p in percentiles {
        let label = percentile_label(p);
        if columns.iter().any(|c| c.label == label) {
            continue;
        }
        let trajectory = ranked.index(p);
        let values = result
            .trajectory(trajectory)
            .zip(principal)
            .map(|(v, org)| (v - org) / org)
            .collect();
        columns.push(PercentileColumn {
            percentile: p,
            label,
            values,
        });
    }

    PercentileTable {
        passing_year: passing_years(result.years()),
        columns,
    }
}

/// Profit ratio at each percentile, recomputed independently for every year.
#[must_use]
pub fn each_time(result: &SimulationResult, percentiles: &[u32]) -> PercentileTable {
    let mut columns: Vec<PercentileColumn> = percentiles
        .iter()
        .map(|&p| PercentileColumn {
            percentile: p,
            label: percentile_label(p),
            values: Vec::with_capacity(result.years()),
        })
        .collect();

    for (t, &org) in result.principal().iter().enumerate() {
        let ranked = RankedSample::new(result.period(t));
        for column in &mut columns {
            let value = ranked.value(column.percentile);
            column.values.push((value - org) / org);
        }
    }

    PercentileTable {
        passing_year: passing_years(result.years()),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(percentile_label(50), "median");
        assert_eq!(percentile_label(84), "upper 16%");
        assert_eq!(percentile_label(99), "upper 1%");
        assert_eq!(percentile_label(100), "upper 0%");
        assert_eq!(percentile_label(16), "lower 16%");
        assert_eq!(percentile_label(0), "lower 0%");
        for p in 1..50 {
            assert_eq!(percentile_label(p), format!("lower {p}%"));
        }
        for p in 51..100 {
            assert_eq!(percentile_label(p), format!("upper {}%", 100 - p));
        }
    }

    #[test]
    fn test_nearest_percentile_picks_sample() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_eq!(nearest_percentile(&values, 0), 1.0);
        assert_eq!(nearest_percentile(&values, 50), 3.0);
        assert_eq!(nearest_percentile(&values, 100), 5.0);
        // virtual index 0.84 * 4 = 3.36 -> 3
        assert_eq!(nearest_percentile(&values, 84), 4.0);
    }

    #[test]
    fn test_nearest_rank_rounds_half_to_even() {
        // n = 2: p=50 -> index 0.5 -> 0
        assert_eq!(nearest_percentile(&[10.0, 20.0], 50), 10.0);
        // n = 4: p=50 -> index 1.5 -> 2
        assert_eq!(nearest_percentile(&[1.0, 2.0, 3.0, 4.0], 50), 3.0);
    }

    #[test]
    fn test_tie_picks_first_natural_index() {
        let values = [3.0, 7.0, 1.0, 7.0, 7.0];
        assert_eq!(nearest_percentile_index(&values, 100), 1);
        assert_eq!(nearest_percentile_index(&values, 0), 2);
    }

    fn two_year_result() -> SimulationResult {
        // year 1: [110, 90, 100], year 2: [150, 250, 200]
        SimulationResult::new(
            3,
            vec![110.0, 90.0, 100.0, 150.0, 250.0, 200.0],
            vec![100.0, 200.0],
        )
    }

    #[test]
    fn test_describe_sorted_descending() {
        let rows = describe(&two_year_result(), &[0, 100, 50]);

        let results: Vec<i64> = rows.iter().map(|r| r.result).collect();
        assert_eq!(results, vec![250, 200, 150]);
        assert_eq!(rows[0].label, "upper 0%");
        assert_eq!(rows[0].profit, 50);
        assert_eq!(rows[0].profit_ratio, 0.25);
        assert_eq!(rows[2].percentile, 0);
        assert_eq!(rows[2].profit, -50);
    }

    #[test]
    fn test_describe_truncates() {
        let result = SimulationResult::new(1, vec![1234.9], vec![1000.0]);
        let rows = describe(&result, &[50]);
        assert_eq!(rows[0].result, 1234);
        assert_eq!(rows[0].profit, 234);
    }

    #[test]
    fn test_describe_saturates_infinite_values() {
        let result = SimulationResult::new(2, vec![f64::NEG_INFINITY, f64::INFINITY], vec![1000.0]);
        let rows = describe(&result, &[100, 0]);

        assert_eq!(rows[0].result, i64::MAX);
        assert_eq!(rows[0].profit, i64::MAX - 1000);
        assert_eq!(rows[1].result, i64::MIN);
        assert_eq!(rows[1].profit, i64::MIN);
    }

    #[test]
    fn test_history_follows_final_selection() {
        let table = history(&two_year_result(), &[100, 0]);

        assert_eq!(table.passing_year, vec![1, 2]);
        // top trajectory at the end is index 1, which was the worst in year 1
        let top = table.column("upper 0%").unwrap();
        assert_eq!(top.values, vec![-0.1, 0.25]);
        let bottom = table.column("lower 0%").unwrap();
        assert_eq!(bottom.values, vec![0.1, -0.25]);
    }

    #[test]
    fn test_history_collapses_duplicate_labels() {
        let table = history(&two_year_result(), &[50, 100, 50]);
        let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["median", "upper 0%"]);
    }

    #[test]
    fn test_each_time_reselects_every_year() {
        let table = each_time(&two_year_result(), &[100, 0, 100]);

        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.columns[0].values, vec![0.1, 0.25]);
        assert_eq!(table.columns[1].values, vec![-0.1, -0.25]);
        assert_eq!(table.columns[2].values, table.columns[0].values);
    }
}
