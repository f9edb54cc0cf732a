use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use training_core::model::{StudentId, StudentProgress};

/// A student record as the remote store returns it.
///
/// Every field apart from the id is optional and defaulted: the store is
/// free to omit or reshape sub-documents, and a missing field must
/// degrade to `None` rather than fail the whole decode. Callers fall
/// back to locally computed values when `progress` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: StudentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<StudentProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StudentRecord {
    /// A bare record with only an id, as used when enrolling in tests.
    #[must_use]
    pub fn bare(id: StudentId) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            stage: None,
            notes: None,
            student_notes: None,
            progress: None,
            updated_at: None,
        }
    }
}
