use thiserror::Error;

/// Errors surfaced by the student-record gateway.
///
/// The two `Missing*` variants are precondition failures raised before
/// any request leaves the process; `HttpStatus` carries the remote
/// store's message when one was provided.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("no authenticated session is available")]
    MissingSession,

    #[error("no school scope is available")]
    MissingSchoolScope,

    #[error("refusing to send an empty patch")]
    EmptyPatch,

    #[error("remote store returned {status}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: Option<String>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("could not decode student record: {0}")]
    Decode(String),

    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    /// The user-facing message for this failure, preferring the remote
    /// store's own wording when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::HttpStatus {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_prefers_server_message() {
        let err = GatewayError::HttpStatus {
            status: reqwest::StatusCode::CONFLICT,
            message: Some("student record is locked".into()),
        };
        assert_eq!(err.user_message(), "student record is locked");
        assert!(err.to_string().contains("409"));
    }

    #[test]
    fn http_status_without_message_falls_back_to_status() {
        let err = GatewayError::HttpStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert!(err.user_message().contains("502"));
    }
}
