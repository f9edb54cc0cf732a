use crate::error::GatewayError;

/// The ambient context every gateway call needs: the caller's bearer
/// credential and the school the student record lives under.
///
/// Both values come from the caller's environment (the signed-in
/// session), injected explicitly so the gateway has no global state.
/// Construction fails fast when either is missing, so a half-configured
/// session can never produce a half-authorized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScope {
    bearer_token: String,
    school_id: String,
}

impl SessionScope {
    /// Builds a scope from the session's credential and school id.
    ///
    /// # Errors
    ///
    /// - `GatewayError::MissingSession` if the bearer token is empty or
    ///   whitespace.
    /// - `GatewayError::MissingSchoolScope` if the school id is empty or
    ///   whitespace.
    pub fn new(
        bearer_token: impl Into<String>,
        school_id: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(GatewayError::MissingSession);
        }
        let school_id = school_id.into().trim().to_owned();
        if school_id.is_empty() {
            return Err(GatewayError::MissingSchoolScope);
        }

        Ok(Self {
            bearer_token,
            school_id,
        })
    }

    #[must_use]
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    #[must_use]
    pub fn school_id(&self) -> &str {
        &self.school_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_happy_path() {
        let scope = SessionScope::new("token-abc", " school-1 ").unwrap();
        assert_eq!(scope.bearer_token(), "token-abc");
        assert_eq!(scope.school_id(), "school-1");
    }

    #[test]
    fn scope_rejects_missing_session() {
        let err = SessionScope::new("   ", "school-1").unwrap_err();
        assert!(matches!(err, GatewayError::MissingSession));
    }

    #[test]
    fn scope_rejects_missing_school() {
        let err = SessionScope::new("token-abc", "").unwrap_err();
        assert!(matches!(err, GatewayError::MissingSchoolScope));
    }
}
