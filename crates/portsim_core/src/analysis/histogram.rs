use serde::{Deserialize, Serialize};

use crate::error::HistogramError;

/// Density histogram: `heights[i]` covers `[edges[i], edges[i + 1])`,
/// the last bin being closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub heights: Vec<f64>,
    pub edges: Vec<f64>,
}

impl Histogram {
    #[must_use]
    pub fn bins(&self) -> usize {
        self.heights.len()
    }
}

/// Bin width from Sturges' rule: `ptp / (log2(n) + 1)`.
fn sturges_width(values: &[f64], min: f64, max: f64) -> f64 {
    (max - min) / ((values.len() as f64).log2() + 1.0)
}

/// `num` evenly spaced points from `start` to `stop` inclusive.
fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    let div = (num - 1) as f64;
    let step = (stop - start) / div;
    let mut points: Vec<f64> = (0..num).map(|i| i as f64 * step + start).collect();
    if let Some(last) = points.last_mut() {
        *last = stop;
    }
    points
}

/// Density histogram with the number of bins chosen by Sturges' rule.
///
/// Heights integrate to one over the edges. A sample with no spread gets a
/// single bin of width one centered on the value. NaN samples are ignored
/// when finding the range. A range whose width is not finite is an error.
pub fn sturges_histogram(values: &[f64]) -> Result<Histogram, HistogramError> {
    if values.is_empty() {
        return Err(HistogramError::EmptySample);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max - min).is_finite() {
        return Err(HistogramError::NonFiniteRange { min, max });
    }
    let width = sturges_width(values, min, max);

    let (first_edge, last_edge) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };

    let bins = if width > 0.0 {
        (((last_edge - first_edge) / width).ceil() as usize).max(1)
    } else {
        1
    };
    let edges = linspace(first_edge, last_edge, bins + 1);

    let span = last_edge - first_edge;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut index = (((v - first_edge) / span) * bins as f64) as usize;
        if index == bins {
            index -= 1;
        }
        // correct for rounding in the scaled index
        if v < edges[index] && index > 0 {
            index -= 1;
        } else if v >= edges[index + 1] && index != bins - 1 {
            index += 1;
        }
        counts[index] += 1;
    }

    let total = values.len() as f64;
    let heights = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, edge)| c as f64 / (edge[1] - edge[0]) / total)
        .collect();

    Ok(Histogram { heights, edges })
}
