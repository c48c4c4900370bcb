//! InviteError - Failures of the invite lifecycle operations

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InviteError {
    #[error("invite {0} not found")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    /// The store failed. The caller may retry the whole operation.
    #[error("store failure: {0}")]
    TransientStoreFailure(#[source] StoreError),
}

impl InviteError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<StoreError> for InviteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => InviteError::NotFound(id),
            StoreError::AlreadyExists { id, .. } => {
                InviteError::Conflict(format!("invite {} already exists", id))
            }
            StoreError::PreconditionFailed { id, .. } => {
                InviteError::Conflict(format!("invite {} was modified concurrently", id))
            }
            other => InviteError::TransientStoreFailure(other),
        }
    }
}
