//! Error types used by this lib.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DoaError>;

#[derive(Debug, Error)]
pub enum DoaError {
    #[error("Steering vector of length {found} does not match array of {expected} elements")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Invalid angular scan: {0}")]
    InvalidScan(String),
    #[error("Invalid array geometry: {0}")]
    InvalidGeometry(String),
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
    #[error("Invalid noise distribution: {0}")]
    Noise(#[from] rand_distr::NormalError),
    #[error("Error drawing chart: {0}")]
    Plot(String),
}
