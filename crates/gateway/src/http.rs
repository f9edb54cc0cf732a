use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use training_core::model::StudentId;

use crate::client::StudentGateway;
use crate::error::GatewayError;
use crate::patch::StudentPatch;
use crate::record::StudentRecord;
use crate::scope::SessionScope;

/// HTTP implementation of [`StudentGateway`].
///
/// Student records live under the caller's school scope:
/// `{base}/schools/{school}/students/{id}`, read with `GET` and
/// partially written with `PATCH`.
#[derive(Clone)]
pub struct HttpStudentGateway {
    client: Client,
    base_url: String,
}

impl HttpStudentGateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn student_url(&self, scope: &SessionScope, student_id: StudentId) -> String {
        format!(
            "{}/schools/{}/students/{}",
            self.base_url.trim_end_matches('/'),
            scope.school_id(),
            student_id
        )
    }
}

#[async_trait]
impl StudentGateway for HttpStudentGateway {
    async fn read_student(
        &self,
        scope: &SessionScope,
        student_id: StudentId,
    ) -> Result<StudentRecord, GatewayError> {
        let url = self.student_url(scope, student_id);
        debug!(%student_id, "reading student record");

        let response = self
            .client
            .get(url)
            .bearer_auth(scope.bearer_token())
            .send()
            .await?;

        decode_record(response).await
    }

    async fn write_student_partial(
        &self,
        scope: &SessionScope,
        student_id: StudentId,
        patch: &StudentPatch,
    ) -> Result<StudentRecord, GatewayError> {
        if patch.is_empty() {
            return Err(GatewayError::EmptyPatch);
        }

        let url = self.student_url(scope, student_id);
        debug!(%student_id, has_progress = patch.progress.is_some(), "writing student patch");

        let response = self
            .client
            .patch(url)
            .bearer_auth(scope.bearer_token())
            .json(patch)
            .send()
            .await?;

        decode_record(response).await
    }
}

async fn decode_record(response: reqwest::Response) -> Result<StudentRecord, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.ok().and_then(extract_message);
        warn!(%status, "remote store rejected the request");
        return Err(GatewayError::HttpStatus { status, message });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Pulls a human-readable message out of an error body: the store
/// usually answers `{"message": "..."}` but plain-text bodies occur.
fn extract_message(body: String) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        return parsed.message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
