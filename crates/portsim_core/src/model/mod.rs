mod multi_params;
mod params;
mod results;

pub use multi_params::{DEFAULT_MAX_ASSETS, MultiAssetParameters, stds_from_covariance};
pub use params::{SimulationParameters, default_percentiles, principal_schedule};
pub use results::{MultiAssetResult, SimulationResult};
