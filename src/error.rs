// src/error.rs
//! Error taxonomy. Every variant is recovered locally by surfacing a
//! notification; the classifier itself has no error path.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in at least Name and Email")]
    MissingRequired,

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Error)]
pub enum FillerError {
    #[error("Storage access failed: {0}")]
    Storage(String),

    #[error("No active tab found")]
    NoActivePage,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl FillerError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        FillerError::Storage(err.to_string())
    }
}

pub type FillerResult<T> = Result<T, FillerError>;
