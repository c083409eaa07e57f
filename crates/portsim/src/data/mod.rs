//! Parameter files and result exports
//!
//! File layout:
//!   single.yaml           # single-asset parameters
//!   multi.yaml            # multi-asset parameters (no `cov`)
//!   workbook/             # multi-asset parameters, one CSV per section
//!     sim_param.csv
//!     asset_info.csv
//!     percentiles.csv
//!     correlation.csv
//!
//! Every multi-asset load rebuilds `cor` from its lower triangle and
//! recomputes `cov` from `cor` and `stds`.

pub mod multi_data;
pub mod single_data;
pub mod workbook;

use portsim_core::ValidationError;

pub use multi_data::{MultiAssetData, load_multi, save_multi};
pub use single_data::{load_single, save_single};
pub use workbook::{load_workbook, save_workbook};

/// Error types for storage operations
#[derive(Debug)]
pub enum StorageError {
    Io(String),
    Parse(String),
    Serialize(String),
    /// The file parsed but describes inconsistent parameters
    Validation(ValidationError),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "IO error: {}", msg),
            StorageError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StorageError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            StorageError::Validation(e) => write!(f, "Invalid parameters: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for StorageError {
    fn from(e: ValidationError) -> Self {
        StorageError::Validation(e)
    }
}
