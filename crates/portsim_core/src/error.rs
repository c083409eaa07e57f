use std::fmt;

/// Errors raised when parameters have the wrong shape or an out-of-range value
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A per-asset vector or matrix dimension disagrees with the asset count
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    MatrixShape {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Matrix rows of unequal length
    RaggedMatrix { row: usize, expected: usize, actual: usize },
    PercentileOutOfRange { index: usize, value: u32 },
    NoAssets,
    ZeroYears,
    ZeroSize,
    NotFinite { field: &'static str, index: usize },
    NegativeStdDev { field: &'static str, index: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LengthMismatch {
                field,
                expected,
                actual,
            } => write!(f, "{field} length must be {expected}, got {actual}"),
            ValidationError::MatrixShape {
                field,
                expected,
                actual,
            } => write!(
                f,
                "{field} matrix shape must be ({},{}), got ({},{})",
                expected.0, expected.1, actual.0, actual.1
            ),
            ValidationError::RaggedMatrix {
                row,
                expected,
                actual,
            } => write!(
                f,
                "matrix row {row} has {actual} columns, expected {expected}"
            ),
            ValidationError::PercentileOutOfRange { index, value } => {
                write!(f, "percentile #{index} must be in 0..=100, got {value}")
            }
            ValidationError::NoAssets => write!(f, "at least one asset is required"),
            ValidationError::ZeroYears => write!(f, "year must be at least 1"),
            ValidationError::ZeroSize => write!(f, "size must be at least 1"),
            ValidationError::NotFinite { field, index } => {
                write!(f, "{field}[{index}] must be a finite number")
            }
            ValidationError::NegativeStdDev { field, index } => {
                write!(f, "{field}[{index}] must be non-negative")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result or analytics requested before `simulate()` produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotComputedError;

impl fmt::Display for NotComputedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "simulation result is not computed")
    }
}

impl std::error::Error for NotComputedError {}

/// Errors from binning the final-year distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistogramError {
    NotComputed,
    EmptySample,
    /// The sample reaches an infinite value, so no bin width exists
    NonFiniteRange { min: f64, max: f64 },
}

impl fmt::Display for HistogramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistogramError::NotComputed => NotComputedError.fmt(f),
            HistogramError::EmptySample => write!(f, "histogram of an empty sample"),
            HistogramError::NonFiniteRange { min, max } => {
                write!(f, "histogram range [{min}, {max}] is not finite")
            }
        }
    }
}

impl std::error::Error for HistogramError {}

impl From<NotComputedError> for HistogramError {
    fn from(_: NotComputedError) -> Self {
        HistogramError::NotComputed
    }
}

/// Errors from growing or shrinking the asset list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityError {
    TooManyAssets { max: usize },
    TooFewAssets,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::TooManyAssets { max } => {
                write!(f, "cannot add more assets (maximum is {max})")
            }
            CapacityError::TooFewAssets => write!(f, "cannot remove the last asset"),
        }
    }
}

impl std::error::Error for CapacityError {}

/// Errors returned by `simulate()`
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    Validation(ValidationError),
    /// The sampler rejected its parameters
    InvalidDistribution {
        mean: f64,
        std_dev: f64,
        reason: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Validation(e) => write!(f, "invalid parameters: {e}"),
            SimError::InvalidDistribution {
                mean,
                std_dev,
                reason,
            } => write!(
                f,
                "invalid distribution parameters (mean={mean}, std_dev={std_dev}): {reason}"
            ),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Validation(e) => Some(e),
            SimError::InvalidDistribution { .. } => None,
        }
    }
}

impl From<ValidationError> for SimError {
    fn from(e: ValidationError) -> Self {
        SimError::Validation(e)
    }
}
