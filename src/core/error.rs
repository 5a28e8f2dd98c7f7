//! Error types for document comparison

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("The tolerance ({0}) must be between 0 and 1")]
    InvalidTolerance(f32),
}

impl CompareError {
    /// Whether the caller passed an argument outside its accepted range.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CompareError::InvalidTolerance(_))
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;
