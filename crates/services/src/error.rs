//! Shared error types for the services crate.

use thiserror::Error;

use gateway::GatewayError;
use training_core::model::{RequirementError, SequenceError};

/// Errors emitted by `ProgressController`.
///
/// Domain and permission errors are resolved locally and never reach the
/// remote store; `Gateway` errors abort the in-flight mutation after the
/// local copy has been restored.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("caller is not allowed to modify training progress")]
    PermissionDenied,

    #[error("no hour edit is in progress")]
    NoEditInProgress,

    #[error("hours must be a finite number")]
    InvalidDraftHours,

    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ProgressError {
    /// The message shown to the user in the inline notification,
    /// preferring the remote store's wording for gateway failures.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ProgressError::Gateway(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_surface_the_server_message() {
        let err = ProgressError::from(GatewayError::HttpStatus {
            status: gateway::StatusCode::UNPROCESSABLE_ENTITY,
            message: Some("progress document too large".into()),
        });
        assert_eq!(err.user_message(), "progress document too large");
    }

    #[test]
    fn domain_errors_use_their_display() {
        let err = ProgressError::from(RequirementError::EmptyName);
        assert_eq!(err.user_message(), "requirement name cannot be empty");
    }
}
