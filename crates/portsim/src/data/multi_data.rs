use std::fs;
use std::path::Path;

use portsim_core::{Matrix, MultiAssetParameters};
use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::util::io::atomic_write;

/// Multi-asset parameters in human-readable format.
///
/// `cov` is never stored; it is rebuilt from `cor` and `stds` on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiAssetData {
    pub profits: Vec<f64>,
    pub stds: Vec<f64>,
    /// Row-major; only the lower triangle is read back
    pub cor: Vec<Vec<f64>>,
    pub year: u32,
    pub start: u64,
    pub month: u64,
    pub size: usize,
    pub rebalance: bool,
    pub percentiles: Vec<u32>,
    pub labels: Vec<String>,
    pub ratios: Vec<f64>,
}

impl MultiAssetData {
    pub fn from_params(params: &MultiAssetParameters) -> Self {
        Self {
            profits: params.profits.clone(),
            stds: params.stds.clone(),
            cor: params.cor.to_rows(),
            year: params.year,
            start: params.start,
            month: params.month,
            size: params.size,
            rebalance: params.rebalance,
            percentiles: params.percentiles.clone(),
            labels: params.labels.clone(),
            ratios: params.ratios.clone(),
        }
    }

    /// Build parameters, symmetrizing `cor` and recomputing `cov`.
    pub fn into_params(self) -> Result<MultiAssetParameters, StorageError> {
        let cor = Matrix::from_rows(self.cor)?;
        let mut params = MultiAssetParameters {
            labels: self.labels,
            profits: self.profits,
            stds: self.stds,
            ratios: self.ratios,
            cov: Matrix::zeros(cor.rows(), cor.cols()),
            cor,
            year: self.year,
            start: self.start,
            month: self.month,
            size: self.size,
            rebalance: self.rebalance,
            percentiles: self.percentiles,
        };
        params.reconstruct()?;
        params.check_types()?;
        Ok(params)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, StorageError> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| StorageError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, StorageError> {
        serde_saphyr::to_string(self)
            .map_err(|e| StorageError::Serialize(format!("Failed to serialize parameters: {}", e)))
    }
}

/// Load multi-asset parameters from a YAML file
pub fn load_multi(path: &Path) -> Result<MultiAssetParameters, StorageError> {
    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let params = MultiAssetData::from_yaml(&content)?.into_params()?;
    tracing::debug!(path = %path.display(), dim = params.dim(), "loaded multi-asset parameters");
    Ok(params)
}

/// Save multi-asset parameters to a YAML file
pub fn save_multi(path: &Path, params: &MultiAssetParameters) -> Result<(), StorageError> {
    params.check_types()?;
    let yaml = MultiAssetData::from_params(params).to_yaml()?;
    atomic_write(path, &yaml)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), dim = params.dim(), "saved multi-asset parameters");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portsim_core::ValidationError;
    use portsim_core::matrix::covariance;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_recomputes_cov() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("multi.yaml");
        let mut params = MultiAssetParameters::default();
        params.rebalance = false;
        params.labels[0] = "国内債券".to_string();

        save_multi(&path, &params).unwrap();
        let loaded = load_multi(&path).unwrap();

        assert_eq!(loaded.labels, params.labels);
        assert_eq!(loaded.profits, params.profits);
        assert_eq!(loaded.stds, params.stds);
        assert_eq!(loaded.ratios, params.ratios);
        assert_eq!(loaded.cor, params.cor);
        assert_eq!(loaded.percentiles, params.percentiles);
        assert!(!loaded.rebalance);
        assert_eq!(loaded.cov, covariance(&params.cor, &params.stds));
    }

    #[test]
    fn test_cov_is_not_written() {
        let yaml = MultiAssetData::from_params(&MultiAssetParameters::default())
            .to_yaml()
            .unwrap();
        assert!(!yaml.contains("cov"));
        assert!(yaml.contains("labels"));
    }

    #[test]
    fn test_load_symmetrizes_lower_triangle() {
        let yaml = "\
profits: [0.01, 0.02]
stds: [0.1, 0.2]
cor: [[1.0, 0.0], [0.5, 1.0]]
year: 10
start: 0
month: 1000
size: 100
rebalance: true
percentiles: [50]
labels: [A, B]
ratios: [0.5, 0.5]
";
        let params = MultiAssetData::from_yaml(yaml).unwrap().into_params().unwrap();

        assert_eq!(params.cor.get(0, 1), 0.5);
        assert_eq!(params.cov.get(0, 1), 0.5 * (0.1 * 0.2));
        assert_eq!(params.cov.get(1, 1), 0.2 * 0.2);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let yaml = "profits: [0.01]\nstds: [0.1]\ncor: [[1.0]]\n";
        assert!(matches!(
            MultiAssetData::from_yaml(yaml),
            Err(StorageError::Parse(_))
        ));
    }

    #[test]
    fn test_mismatched_vectors_are_rejected() {
        let mut data = MultiAssetData::from_params(&MultiAssetParameters::default());
        data.ratios.pop();
        assert!(matches!(
            data.into_params(),
            Err(StorageError::Validation(ValidationError::LengthMismatch {
                field: "ratios",
                ..
            }))
        ));
    }
}
