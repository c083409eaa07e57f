//! Multi-asset parameters as a directory of CSV sections
//!
//! - `sim_param.csv`: `year,start,month,size,rebalance` (one row)
//! - `asset_info.csv`: `label,return,std,ratio` (one row per asset)
//! - `percentiles.csv`: `percentile` (one row per level)
//! - `correlation.csv`: asset labels as header, one row per asset

use std::fs;
use std::path::Path;

use portsim_core::{Matrix, MultiAssetParameters};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::util::io::atomic_write_bytes;

pub const SIM_PARAM_FILE: &str = "sim_param.csv";
pub const ASSET_INFO_FILE: &str = "asset_info.csv";
pub const PERCENTILES_FILE: &str = "percentiles.csv";
pub const CORRELATION_FILE: &str = "correlation.csv";

#[derive(Debug, Serialize, Deserialize)]
struct SimParamRow {
    year: u32,
    start: u64,
    month: u64,
    size: usize,
    rebalance: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssetInfoRow {
    label: String,
    #[serde(rename = "return")]
    profit: f64,
    std: f64,
    ratio: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PercentileRow {
    percentile: u32,
}

fn io_error(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Io(format!("Failed to access {}: {}", path.display(), e))
}

fn parse_error(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Parse(format!("Failed to parse {}: {}", path.display(), e))
}

fn open(path: &Path) -> Result<csv::Reader<fs::File>, StorageError> {
    csv::Reader::from_path(path).map_err(|e| io_error(path, e))
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    open(path)?
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| parse_error(path, e))
}

fn read_matrix(path: &Path) -> Result<Vec<Vec<f64>>, StorageError> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| parse_error(path, e))?;
        let row = record
            .iter()
            .map(|field| field.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            // line 1 is the header
            .map_err(|e| parse_error(path, format!("line {}: {}", line + 2, e)))?;
        rows.push(row);
    }
    Ok(rows)
}

fn finish(path: &Path, writer: csv::Writer<Vec<u8>>) -> Result<(), StorageError> {
    let bytes = writer.into_inner().map_err(|e| {
        StorageError::Serialize(format!("Failed to flush {}: {}", path.display(), e))
    })?;
    atomic_write_bytes(path, &bytes).map_err(|e| io_error(path, e))
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| StorageError::Serialize(format!("{}: {}", path.display(), e)))?;
    }
    finish(path, writer)
}

/// Load multi-asset parameters from a workbook directory
pub fn load_workbook(dir: &Path) -> Result<MultiAssetParameters, StorageError> {
    let sim_path = dir.join(SIM_PARAM_FILE);
    let sim: SimParamRow = read_rows(&sim_path)?
        .into_iter()
        .next()
        .ok_or_else(|| parse_error(&sim_path, "no parameter row"))?;

    let assets: Vec<AssetInfoRow> = read_rows(&dir.join(ASSET_INFO_FILE))?;
    let percentiles: Vec<PercentileRow> = read_rows(&dir.join(PERCENTILES_FILE))?;
    let cor = Matrix::from_rows(read_matrix(&dir.join(CORRELATION_FILE))?)?;

    let mut params = MultiAssetParameters {
        labels: assets.iter().map(|a| a.label.clone()).collect(),
        profits: assets.iter().map(|a| a.profit).collect(),
        stds: assets.iter().map(|a| a.std).collect(),
        ratios: assets.iter().map(|a| a.ratio).collect(),
        cov: Matrix::zeros(cor.rows(), cor.cols()),
        cor,
        year: sim.year,
        start: sim.start,
        month: sim.month,
        size: sim.size,
        rebalance: sim.rebalance,
        percentiles: percentiles.into_iter().map(|p| p.percentile).collect(),
    };
    params.reconstruct()?;
    params.check_types()?;

    tracing::debug!(dir = %dir.display(), dim = params.dim(), "loaded workbook");
    Ok(params)
}

/// Save multi-asset parameters as a workbook directory, creating it if needed
pub fn save_workbook(dir: &Path, params: &MultiAssetParameters) -> Result<(), StorageError> {
    params.check_types()?;
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    write_rows(
        &dir.join(SIM_PARAM_FILE),
        &[SimParamRow {
            year: params.year,
            start: params.start,
            month: params.month,
            size: params.size,
            rebalance: params.rebalance,
        }],
    )?;

    let assets: Vec<AssetInfoRow> = (0..params.dim())
        .map(|i| AssetInfoRow {
            label: params.labels[i].clone(),
            profit: params.profits[i],
            std: params.stds[i],
            ratio: params.ratios[i],
        })
        .collect();
    write_rows(&dir.join(ASSET_INFO_FILE), &assets)?;

    let percentiles: Vec<PercentileRow> = params
        .percentiles
        .iter()
        .map(|&percentile| PercentileRow { percentile })
        .collect();
    write_rows(&dir.join(PERCENTILES_FILE), &percentiles)?;

    let cor_path = dir.join(CORRELATION_FILE);
    let mut writer = csv::Writer::from_writer(Vec::new());
    let serialize = |e: csv::Error| {
        StorageError::Serialize(format!("{}: {}", cor_path.display(), e))
    };
    writer.write_record(&params.labels).map_err(serialize)?;
    for i in 0..params.cor.rows() {
        let row: Vec<String> = params.cor.row(i).iter().map(f64::to_string).collect();
        writer.write_record(&row).map_err(serialize)?;
    }
    finish(&cor_path, writer)?;

    tracing::debug!(dir = %dir.display(), dim = params.dim(), "saved workbook");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portsim_core::ValidationError;
    use portsim_core::matrix::covariance;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("workbook");
        let mut params = MultiAssetParameters::default();
        params.percentiles = vec![90, 50, 10];
        params.labels[3] = "Foreign, Developed".to_string();

        save_workbook(&dir, &params).unwrap();
        for file in [SIM_PARAM_FILE, ASSET_INFO_FILE, PERCENTILES_FILE, CORRELATION_FILE] {
            assert!(dir.join(file).exists(), "{file} missing");
        }

        let loaded = load_workbook(&dir).unwrap();
        assert_eq!(loaded.labels, params.labels);
        assert_eq!(loaded.profits, params.profits);
        assert_eq!(loaded.stds, params.stds);
        assert_eq!(loaded.ratios, params.ratios);
        assert_eq!(loaded.cor, params.cor);
        assert_eq!(loaded.percentiles, vec![90, 50, 10]);
        assert_eq!(loaded.year, params.year);
        assert_eq!(loaded.rebalance, params.rebalance);
        assert_eq!(loaded.cov, covariance(&params.cor, &params.stds));
    }

    #[test]
    fn test_section_layout() {
        let temp_dir = TempDir::new().unwrap();
        save_workbook(temp_dir.path(), &MultiAssetParameters::default()).unwrap();

        let sim = fs::read_to_string(temp_dir.path().join(SIM_PARAM_FILE)).unwrap();
        assert_eq!(sim, "year,start,month,size,rebalance\n20,0,30000,10000,true\n");

        let info = fs::read_to_string(temp_dir.path().join(ASSET_INFO_FILE)).unwrap();
        assert!(info.starts_with("label,return,std,ratio\nDomestic Bonds,-0.016,"));

        let cor = fs::read_to_string(temp_dir.path().join(CORRELATION_FILE)).unwrap();
        assert!(cor.starts_with(
            "Domestic Bonds,Foreign Bonds,Domestic Stocks,Foreign Stocks\n1,0.29,-0.158,0.105\n"
        ));
    }

    #[test]
    fn test_upper_triangle_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(
            dir.join(SIM_PARAM_FILE),
            "year,start,month,size,rebalance\n5,0,100,10,false\n",
        )
        .unwrap();
        fs::write(
            dir.join(ASSET_INFO_FILE),
            "label,return,std,ratio\nA,0.01,0.1,0.5\nB,0.02,0.2,0.5\n",
        )
        .unwrap();
        fs::write(dir.join(PERCENTILES_FILE), "percentile\n50\n").unwrap();
        fs::write(dir.join(CORRELATION_FILE), "A,B\n1,0.9\n-0.3,1\n").unwrap();

        let params = load_workbook(dir).unwrap();
        assert_eq!(params.cor.get(0, 1), -0.3);
        assert!(params.cor.is_symmetric());
        assert!(!params.rebalance);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        save_workbook(dir, &MultiAssetParameters::default()).unwrap();
        fs::write(dir.join(CORRELATION_FILE), "A,B\n1,0\n0,1\n").unwrap();

        assert!(matches!(
            load_workbook(dir),
            Err(StorageError::Validation(ValidationError::MatrixShape {
                field: "cor",
                ..
            }))
        ));
    }

    #[test]
    fn test_bad_number_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        save_workbook(dir, &MultiAssetParameters::default()).unwrap();
        fs::write(dir.join(PERCENTILES_FILE), "percentile\nmedian\n").unwrap();

        assert!(matches!(load_workbook(dir), Err(StorageError::Parse(_))));
    }
}
