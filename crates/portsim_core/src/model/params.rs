use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Percentile levels reported by default.
///
/// Roughly ±1σ (84/16), ±2σ (97/3) and ±3σ (99/1) around the median.
#[must_use]
pub fn default_percentiles() -> Vec<u32> {
    vec![99, 97, 84, 50, 16, 3, 1]
}

/// Parameters for a single-asset accumulation simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    /// Annual mean return (0.05 = 5%)
    pub profit: f64,
    /// Annual return standard deviation
    pub risk: f64,
    /// Number of simulated years
    pub year: u32,
    /// Initial capital
    pub start: u64,
    /// Monthly contribution, applied as `12 * month` per year
    pub month: u64,
    /// Number of trajectories
    pub size: usize,
    pub percentiles: Vec<u32>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            profit: 0.05,
            risk: 0.23,
            year: 20,
            start: 0,
            month: 30_000,
            size: 10_000,
            percentiles: default_percentiles(),
        }
    }
}

impl SimulationParameters {
    /// Check that every field holds a value of the expected kind.
    pub fn check_types(&self) -> Result<(), ValidationError> {
        check_percentiles(&self.percentiles)
    }

    /// `check_types` plus the preconditions needed to simulate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_types()?;
        check_run_shape(self.year, self.size)?;
        if !self.profit.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "profit",
                index: 0,
            });
        }
        if !self.risk.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "risk",
                index: 0,
            });
        }
        if self.risk < 0.0 {
            return Err(ValidationError::NegativeStdDev {
                field: "risk",
                index: 0,
            });
        }
        Ok(())
    }

    /// Yearly contribution
    #[must_use]
    pub fn annual_contribution(&self) -> f64 {
        12.0 * self.month as f64
    }
}

pub(crate) fn check_percentiles(percentiles: &[u32]) -> Result<(), ValidationError> {
    match percentiles.iter().position(|&p| p > 100) {
        Some(index) => Err(ValidationError::PercentileOutOfRange {
            index,
            value: percentiles[index],
        }),
        None => Ok(()),
    }
}

pub(crate) fn check_run_shape(year: u32, size: usize) -> Result<(), ValidationError> {
    if year == 0 {
        return Err(ValidationError::ZeroYears);
    }
    if size == 0 {
        return Err(ValidationError::ZeroSize);
    }
    Ok(())
}

/// Cumulative contributed capital at the end of each year: `start + 12 * month * t`.
#[must_use]
pub fn principal_schedule(start: u64, month: u64, year: u32) -> Vec<f64> {
    let contribution = 12.0 * month as f64;
    (1..=year)
        .map(|t| start as f64 + contribution * f64::from(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_fresh() {
        let mut a = SimulationParameters::default();
        let b = SimulationParameters::default();
        a.percentiles.push(42);

        assert_eq!(b.percentiles, vec![99, 97, 84, 50, 16, 3, 1]);
    }

    #[test]
    fn test_check_types_rejects_out_of_range_percentile() {
        let params = SimulationParameters {
            percentiles: vec![50, 101],
            ..Default::default()
        };

        assert_eq!(
            params.check_types(),
            Err(ValidationError::PercentileOutOfRange {
                index: 1,
                value: 101
            })
        );
    }

    #[test]
    fn test_duplicates_and_order_accepted() {
        let params = SimulationParameters {
            percentiles: vec![1, 50, 50, 99, 0, 100],
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_preconditions() {
        let zero_years = SimulationParameters {
            year: 0,
            ..Default::default()
        };
        assert_eq!(zero_years.validate(), Err(ValidationError::ZeroYears));

        let zero_size = SimulationParameters {
            size: 0,
            ..Default::default()
        };
        assert_eq!(zero_size.validate(), Err(ValidationError::ZeroSize));

        let negative_risk = SimulationParameters {
            risk: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            negative_risk.validate(),
            Err(ValidationError::NegativeStdDev { field: "risk", .. })
        ));
    }

    #[test]
    fn test_principal_schedule() {
        assert_eq!(
            principal_schedule(1_000, 100, 3),
            vec![2_200.0, 3_400.0, 4_600.0]
        );
    }

    #[test]
    fn test_principal_schedule_beyond_u64() {
        let month = u64::MAX / 6;
        let schedule = principal_schedule(u64::MAX, month, 2);

        assert_eq!(schedule.len(), 2);
        assert!(schedule.iter().all(|p| p.is_finite()));
        assert!(schedule[1] > schedule[0]);
        assert!(schedule[0] > u64::MAX as f64);
    }
}
