use crate::error::{CapacityError, ValidationError};
use crate::matrix::{Matrix, covariance, symmetrize};

use super::params::{check_percentiles, check_run_shape, default_percentiles};

/// Upper bound on the number of assets accepted by [`MultiAssetParameters::add_items`]
pub const DEFAULT_MAX_ASSETS: usize = 20;

/// Standard deviation given to a freshly added asset
const NEW_ASSET_STD: f64 = 0.01;

/// Parameters for a correlated multi-asset accumulation simulation.
///
/// Every per-asset vector is parallel to `labels`. Only the lower triangle of
/// `cor` (diagonal included) is authoritative; `cov` is derived from `cor` and
/// `stds` by [`MultiAssetParameters::reconstruct`].
#[derive(Debug, Clone, PartialEq)]
pub struct MultiAssetParameters {
    pub labels: Vec<String>,
    pub profits: Vec<f64>,
    pub stds: Vec<f64>,
    /// Raw allocation weights, not normalized
    pub ratios: Vec<f64>,
    pub cor: Matrix,
    pub cov: Matrix,
    pub year: u32,
    pub start: u64,
    pub month: u64,
    pub size: usize,
    pub rebalance: bool,
    pub percentiles: Vec<u32>,
}

fn default_covariance() -> Matrix {
    Matrix::from_rows(vec![
        vec![0.00065536, 0.00088123, -0.00093597, 0.00066797],
        vec![0.00088123, 0.01408969, 0.00164803, 0.01725572],
        vec![-0.00093597, 0.00164803, 0.05354596, 0.03697436],
        vec![0.00066797, 0.01725572, 0.03697436, 0.06175225],
    ])
    .unwrap_or_default()
}

fn default_correlation() -> Matrix {
    Matrix::from_rows(vec![
        vec![1.0, 0.29, -0.158, 0.105],
        vec![0.29, 1.0, 0.06, 0.585],
        vec![-0.158, 0.06, 1.0, 0.643],
        vec![0.105, 0.585, 0.643, 1.0],
    ])
    .unwrap_or_default()
}

/// `sqrt(diag(cov))`
#[must_use]
pub fn stds_from_covariance(cov: &Matrix) -> Vec<f64> {
    cov.diagonal().into_iter().map(f64::sqrt).collect()
}

impl Default for MultiAssetParameters {
    fn default() -> Self {
        let cov = default_covariance();
        Self {
            labels: vec![
                "Domestic Bonds".to_string(),
                "Foreign Bonds".to_string(),
                "Domestic Stocks".to_string(),
                "Foreign Stocks".to_string(),
            ],
            profits: vec![-0.016, 0.003, 0.033, 0.049],
            stds: stds_from_covariance(&cov),
            ratios: vec![0.25; 4],
            cor: default_correlation(),
            cov,
            year: 20,
            start: 0,
            month: 30_000,
            size: 10_000,
            rebalance: true,
            percentiles: default_percentiles(),
        }
    }
}

impl MultiAssetParameters {
    /// Number of assets, defined by `labels`
    #[must_use]
    pub fn dim(&self) -> usize {
        self.labels.len()
    }

    /// Check every per-asset vector and matrix against `dim`.
    pub fn check_types(&self) -> Result<(), ValidationError> {
        let dim = self.dim();
        check_percentiles(&self.percentiles)?;
        check_matrix("cov", &self.cov, dim)?;
        check_matrix("cor", &self.cor, dim)?;
        check_len("ratios", self.ratios.len(), dim)?;
        check_len("profits", self.profits.len(), dim)?;
        check_len("stds", self.stds.len(), dim)?;
        Ok(())
    }

    /// `check_types` plus the preconditions needed to simulate.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_types()?;
        if self.dim() == 0 {
            return Err(ValidationError::NoAssets);
        }
        check_run_shape(self.year, self.size)?;
        check_finite("profits", &self.profits)?;
        check_finite("stds", &self.stds)?;
        check_finite("ratios", &self.ratios)?;
        if let Some(index) = self.stds.iter().position(|&s| s < 0.0) {
            return Err(ValidationError::NegativeStdDev {
                field: "stds",
                index,
            });
        }
        Ok(())
    }

    /// Rebuild a symmetric `cor` from its lower triangle and recompute `cov`.
    ///
    /// Call whenever `cor` or `stds` has been edited or loaded.
    pub fn reconstruct(&mut self) -> Result<(), ValidationError> {
        let dim = self.stds.len();
        check_matrix("cor", &self.cor, dim)?;
        self.cor = symmetrize(&self.cor);
        self.cov = covariance(&self.cor, &self.stds);
        Ok(())
    }

    /// Append an empty asset. Existing entries are untouched.
    pub fn add_items(&mut self, max_assets: usize) -> Result<(), CapacityError> {
        if self.dim() >= max_assets {
            return Err(CapacityError::TooManyAssets { max: max_assets });
        }

        self.labels.push(String::new());
        self.profits.push(0.0);
        self.stds.push(NEW_ASSET_STD);
        self.ratios.push(0.0);

        self.cor.grow(1.0, 0.0);
        self.cov.grow(NEW_ASSET_STD * NEW_ASSET_STD, 0.0);
        Ok(())
    }

    /// Drop the last asset. At least one asset always remains.
    pub fn remove_items(&mut self) -> Result<(), CapacityError> {
        if self.dim() <= 1 {
            return Err(CapacityError::TooFewAssets);
        }

        self.labels.pop();
        self.profits.pop();
        self.stds.pop();
        self.ratios.pop();

        self.cor.shrink();
        self.cov.shrink();
        Ok(())
    }

    /// Yearly contribution
    #[must_use]
    pub fn annual_contribution(&self) -> f64 {
        12.0 * self.month as f64
    }
}

fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<(), ValidationError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ValidationError::LengthMismatch {
            field,
            expected,
            actual,
        })
    }
}

fn check_matrix(field: &'static str, m: &Matrix, dim: usize) -> Result<(), ValidationError> {
    if m.shape() == (dim, dim) {
        Ok(())
    } else {
        Err(ValidationError::MatrixShape {
            field,
            expected: (dim, dim),
            actual: m.shape(),
        })
    }
}

fn check_finite(field: &'static str, values: &[f64]) -> Result<(), ValidationError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ValidationError::NotFinite { field, index }),
        None => Ok(()),
    }
}
