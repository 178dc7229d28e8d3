//! Error types shared by the roster, selector and transfer layers

use thiserror::Error;

/// Errors raised by picker operations
///
/// Document I/O at the store boundary is fail-soft and never surfaces
/// through this type; `Io`/`Json`/`Csv` come from the export/import
/// bridge and configuration loading.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u32 },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PickerError {
    pub(crate) fn student_not_found(id: u32) -> Self {
        PickerError::NotFound {
            entity: "Student",
            id,
        }
    }

    pub(crate) fn group_not_found(id: u32) -> Self {
        PickerError::NotFound { entity: "Group", id }
    }
}

pub type PickerResult<T> = Result<T, PickerError>;
