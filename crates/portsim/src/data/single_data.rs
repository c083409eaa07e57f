use std::fs;
use std::path::Path;

use portsim_core::SimulationParameters;

use super::StorageError;
use crate::util::io::atomic_write;

/// Parse single-asset parameters. Missing keys take their defaults.
pub fn from_yaml(yaml: &str) -> Result<SimulationParameters, StorageError> {
    let params: SimulationParameters = serde_saphyr::from_str(yaml)
        .map_err(|e| StorageError::Parse(format!("Failed to parse YAML: {}", e)))?;
    params.check_types()?;
    Ok(params)
}

pub fn to_yaml(params: &SimulationParameters) -> Result<String, StorageError> {
    params.check_types()?;
    serde_saphyr::to_string(params)
        .map_err(|e| StorageError::Serialize(format!("Failed to serialize parameters: {}", e)))
}

/// Load single-asset parameters from a YAML file
pub fn load_single(path: &Path) -> Result<SimulationParameters, StorageError> {
    let content = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let params = from_yaml(&content)?;
    tracing::debug!(path = %path.display(), "loaded single-asset parameters");
    Ok(params)
}

/// Save single-asset parameters to a YAML file
pub fn save_single(path: &Path, params: &SimulationParameters) -> Result<(), StorageError> {
    let yaml = to_yaml(params)?;
    atomic_write(path, &yaml)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "saved single-asset parameters");
    Ok(())
}
