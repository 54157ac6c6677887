//! Error types for loading, enriching and serving the ATM dataset.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// A required input path is absent. Fatal at startup.
    #[error("{name} does not exist: {}", .path.display())]
    MissingFile { name: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: required column '{column}' not found", .file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("{}: sheet '{sheet}' not found", .file.display())]
    MissingSheet { file: PathBuf, sheet: String },

    /// Coordinates that cannot be read as numbers are never coerced to zero.
    #[error("{}, row {row}: {field} '{value}' is not a number", .file.display())]
    MalformedCoordinate {
        file: PathBuf,
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("malformed boundary geometry: {0}")]
    MalformedBoundary(String),

    #[error("boundary feature index {index} out of range ({available} features)")]
    FeatureIndexOutOfRange { index: usize, available: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn missing_file(name: &str, path: impl Into<PathBuf>) -> Self {
        Self::MissingFile {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
