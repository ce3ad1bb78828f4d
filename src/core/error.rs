//! Error types for RaptorAlloc.

use thiserror::Error;

/// Result type alias for RaptorAlloc operations.
pub type Result<T> = std::result::Result<T, AllocError>;

/// Error types for the allocator.
///
/// Every variant is raised before the search starts; a run that has begun
/// always completes.
#[derive(Error, Debug)]
pub enum AllocError {
    /// Data length mismatch between arrays.
    #[error("Data length mismatch for {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Covariance (or correlation) matrix is not square.
    #[error("Matrix is not square: row {row} has {actual} columns, expected {expected}")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Covariance matrix is not symmetric.
    #[error("Matrix is not symmetric at ({row}, {col}): {upper} vs {lower}")]
    NonSymmetricMatrix {
        row: usize,
        col: usize,
        upper: f64,
        lower: f64,
    },

    /// Negative variance on the covariance diagonal.
    #[error("Negative variance {value} for asset {index}")]
    NegativeVariance { index: usize, value: f64 },

    /// NaN or infinite input value.
    #[error("Non-finite value in {context}")]
    NonFiniteValue { context: String },

    /// Invalid parameter value.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Empty data error.
    #[error("Empty data provided for {context}")]
    EmptyData { context: String },

    /// Invalid index access.
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    /// Run configuration could not be parsed.
    #[error("Failed to parse {format} configuration: {message}")]
    Parse { format: String, message: String },

    /// I/O failure while reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AllocError {
    /// Create a length mismatch error.
    pub fn length_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an empty data error.
    pub fn empty_data(context: impl Into<String>) -> Self {
        Self::EmptyData {
            context: context.into(),
        }
    }

    /// Create a non-finite value error.
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            context: context.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AllocError {
    fn from(err: serde_json::Error) -> Self {
        AllocError::parse("json", err.to_string())
    }
}

impl From<toml::de::Error> for AllocError {
    fn from(err: toml::de::Error) -> Self {
        AllocError::parse("toml", err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<AllocError> for pyo3::PyErr {
    fn from(err: AllocError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
