use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures while building the [`crate::data::model::Dataset`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("line {line}: cannot parse date '{value}'")]
    ParseDate { line: usize, value: String },
}

/// Failures while writing the filtered view to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode export CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures reported by a [`crate::forecast::Forecaster`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("insufficient data: need {required} periods, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("cannot fit model: {0}")]
    Degenerate(String),
}
