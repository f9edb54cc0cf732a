use serde::{Deserialize, Serialize};

use training_core::model::StudentProgress;

/// A partial write against a student record.
///
/// The remote store deep-merges the top level and full-replaces
/// `progress`, so the progress field must always carry the entire
/// requirements/milestones/stages document, never a delta. Absent
/// fields are left untouched server-side and are not serialized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<StudentProgress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_notes: Option<String>,
}

impl StudentPatch {
    #[must_use]
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: StudentProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_student_notes(mut self, student_notes: impl Into<String>) -> Self {
        self.student_notes = Some(student_notes.into());
        self
    }

    /// True when no field is set. Empty patches are rejected before any
    /// request is made.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stage.is_none()
            && self.notes.is_none()
            && self.progress.is_none()
            && self.student_notes.is_none()
    }
}
