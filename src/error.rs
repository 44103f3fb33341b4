//! Error types for the taproot crate.
//!
//! A single error enum covers both pipelines. The variants map onto the
//! failure taxonomy: dataset-not-ready, schema-missing, invalid user
//! selection, malformed records, and the usual I/O and format errors.
//! Empty series are not errors at all; they are logged and skipped.

use thiserror::Error;

/// The main error type for taproot operations.
#[derive(Error, Debug)]
pub enum TaprootError {
    /// NetCDF file operation errors
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Array shape errors when assembling loaded data
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An operation was invoked before the dataset was loaded
    #[error("Dataset not loaded: {message}")]
    DatasetNotLoaded { message: String },

    /// A required column or variable is absent from the input
    #[error("Missing schema element: {message}")]
    SchemaMissing { message: String },

    /// A single input row could not be interpreted
    #[error("Bad record at row {row}: {message}")]
    Record { row: usize, message: String },

    /// Invalid coordinate errors
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// An out-of-range or unparseable interactive selection
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Trend fitting errors
    #[error("Fit error: {message}")]
    Fit { message: String },
}

/// Convenience type alias for Results with TaprootError
pub type Result<T> = std::result::Result<T, TaprootError>;
