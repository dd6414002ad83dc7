//! Caller-facing error taxonomy for catalog use-cases.
//!
//! # Invariants
//! - `Validation` and `NotFound` are client faults and carry safe messages.
//! - Storage failures keep their full detail for server-side logs, but
//!   `public_message()` never exposes it.

use crate::blob::BlobError;
use crate::model::item::ItemId;
use crate::repo::item_repo::RepoError;
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing caller input.
    Validation(String),
    /// No item matches the requested id.
    NotFound(ItemId),
    /// Database or transaction failure.
    Persistence(RepoError),
    /// Blob layer I/O failure.
    Storage(BlobError),
}

impl ServiceError {
    /// Returns whether the caller caused this error (4xx-class).
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }

    /// Message safe to return to callers.
    pub fn public_message(&self) -> String {
        if self.is_client_fault() {
            self.to_string()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }

    /// Logs server faults with full detail; client faults are not logged.
    pub(crate) fn log_server_fault(self, operation: &str) -> Self {
        if !self.is_client_fault() {
            error!("event={operation} module=service status=error error={self}");
        }
        self
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::Storage(err) => write!(f, "image storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Validation(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

impl From<BlobError> for ServiceError {
    fn from(value: BlobError) -> Self {
        match value {
            BlobError::InvalidReference(_) => Self::Validation(value.to_string()),
            BlobError::Io(_) => Self::Storage(value),
        }
    }
}
