use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid coordinate: {reason}")]
    InvalidCoordinate { reason: String },

    #[error("Invalid identifier: {reason}")]
    InvalidIdentifier { reason: String },

    #[error("Invalid search: {reason}")]
    InvalidSearchSpec { reason: String },

    #[error("Driver not found: {driver_id}")]
    NotFound { driver_id: String },

    #[error("Location index unavailable: {reason}")]
    IndexUnavailable { reason: String },
}

impl DomainError {
    /// Client errors are never retried and never reach the index.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::IndexUnavailable { .. })
    }
}

/// Failure reported by a `GeoIndex` primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("index unreachable: {0}")]
    Unavailable(String),

    #[error("index call timed out after {0:?}")]
    Timeout(Duration),
}

impl From<IndexError> for DomainError {
    fn from(err: IndexError) -> Self {
        DomainError::IndexUnavailable {
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Index setup error: {0}")]
    IndexSetup(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type IndexResult<T> = Result<T, IndexError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
