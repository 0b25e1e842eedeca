use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of the data layer. Per-cell parse problems never surface
/// here; they degrade to `CellValue::Null` instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("File not found: {}. Please ensure the data file is in place.", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {message}", path.display())]
    ReadFailure { path: PathBuf, message: String },

    #[error("Unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Dataset is missing required column(s): {}", missing.join(", "))]
    SchemaError { missing: Vec<String> },
}

impl DataError {
    pub(crate) fn read_failure(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        DataError::ReadFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
