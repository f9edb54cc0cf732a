use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use training_core::model::StudentId;

use crate::error::GatewayError;
use crate::patch::StudentPatch;
use crate::record::StudentRecord;
use crate::scope::SessionScope;

/// Contract for the remote student-record store.
///
/// Mutation authorization is checked by callers before any write reaches
/// this trait; implementations only transport.
#[async_trait]
pub trait StudentGateway: Send + Sync {
    /// Fetch the full student record.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the record cannot be fetched or
    /// decoded.
    async fn read_student(
        &self,
        scope: &SessionScope,
        student_id: StudentId,
    ) -> Result<StudentRecord, GatewayError>;

    /// Apply a partial write and return the updated record.
    ///
    /// The store deep-merges the top level and full-replaces `progress`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::EmptyPatch` for a patch with no fields,
    /// or other `GatewayError`s when the write fails.
    async fn write_student_partial(
        &self,
        scope: &SessionScope,
        student_id: StudentId,
        patch: &StudentPatch,
    ) -> Result<StudentRecord, GatewayError>;
}

//
// ─── IN-MEMORY FAKE ────────────────────────────────────────────────────────────
//

/// In-memory gateway for tests and prototyping.
///
/// Counts calls, records the last patch, and can be armed to fail the
/// next write or to omit `progress` from write echoes, covering the
/// rollback and shape-fallback paths.
#[derive(Default)]
pub struct InMemoryStudentGateway {
    students: Mutex<HashMap<StudentId, StudentRecord>>,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
    last_patch: Mutex<Option<StudentPatch>>,
    fail_next_write: AtomicBool,
    omit_progress_in_echo: AtomicBool,
}

impl InMemoryStudentGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a student record into the fake store.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn seed(&self, record: StudentRecord) {
        self.students
            .lock()
            .expect("student map lock")
            .insert(record.id, record);
    }

    /// Arms the fake to fail the next write with a transport error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// When set, write echoes omit the `progress` field while the store
    /// still keeps the written value.
    pub fn omit_progress_in_echo(&self, omit: bool) {
        self.omit_progress_in_echo.store(omit, Ordering::SeqCst);
    }

    #[must_use]
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// The most recent patch written, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last_patch(&self) -> Option<StudentPatch> {
        self.last_patch.lock().expect("patch lock").clone()
    }

    /// A copy of the stored record for the given student.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn stored(&self, student_id: StudentId) -> Option<StudentRecord> {
        self.students
            .lock()
            .expect("student map lock")
            .get(&student_id)
            .cloned()
    }

    fn locked_students(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<StudentId, StudentRecord>>, GatewayError> {
        self.students
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl StudentGateway for InMemoryStudentGateway {
    async fn read_student(
        &self,
        _scope: &SessionScope,
        student_id: StudentId,
    ) -> Result<StudentRecord, GatewayError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.locked_students()?
            .get(&student_id)
            .cloned()
            .ok_or(GatewayError::HttpStatus {
                status: reqwest::StatusCode::NOT_FOUND,
                message: Some("student not found".into()),
            })
    }

    async fn write_student_partial(
        &self,
        _scope: &SessionScope,
        student_id: StudentId,
        patch: &StudentPatch,
    ) -> Result<StudentRecord, GatewayError> {
        if patch.is_empty() {
            return Err(GatewayError::EmptyPatch);
        }

        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("injected write failure".into()));
        }

        let mut students = self.locked_students()?;
        let record = students
            .get_mut(&student_id)
            .ok_or(GatewayError::HttpStatus {
                status: reqwest::StatusCode::NOT_FOUND,
                message: Some("student not found".into()),
            })?;

        // Deep-merge at the top level, full-replace for progress.
        if let Some(stage) = &patch.stage {
            record.stage = Some(stage.clone());
        }
        if let Some(notes) = &patch.notes {
            record.notes = Some(notes.clone());
        }
        if let Some(student_notes) = &patch.student_notes {
            record.student_notes = Some(student_notes.clone());
        }
        if let Some(progress) = &patch.progress {
            record.progress = Some(progress.clone());
            record.updated_at = progress.last_updated;
        }

        let mut echo = record.clone();
        drop(students);

        if self.omit_progress_in_echo.load(Ordering::SeqCst) {
            echo.progress = None;
        }

        *self
            .last_patch
            .lock()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))? = Some(patch.clone());

        Ok(echo)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use training_core::model::StudentProgress;
    use training_core::time::fixed_now;

    fn scope() -> SessionScope {
        SessionScope::new("token", "school-1").unwrap()
    }

    #[tokio::test]
    async fn read_counts_and_misses() {
        let gateway = InMemoryStudentGateway::new();
        let id = StudentId::generate();
        gateway.seed(StudentRecord::bare(id));

        assert!(gateway.read_student(&scope(), id).await.is_ok());
        let err = gateway
            .read_student(&scope(), StudentId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::HttpStatus { .. }));
        assert_eq!(gateway.read_calls(), 2);
    }

    #[tokio::test]
    async fn write_full_replaces_progress_and_records_patch() {
        let gateway = InMemoryStudentGateway::new();
        let id = StudentId::generate();
        gateway.seed(StudentRecord::bare(id));

        let progress = StudentProgress::default().touched(fixed_now());
        let patch = StudentPatch::default().with_progress(progress.clone());
        let echo = gateway
            .write_student_partial(&scope(), id, &patch)
            .await
            .unwrap();

        assert_eq!(echo.progress, Some(progress));
        assert_eq!(echo.updated_at, Some(fixed_now()));
        assert_eq!(gateway.last_patch(), Some(patch));
        assert_eq!(gateway.write_calls(), 1);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_before_counting() {
        let gateway = InMemoryStudentGateway::new();
        let id = StudentId::generate();
        gateway.seed(StudentRecord::bare(id));

        let err = gateway
            .write_student_partial(&scope(), id, &StudentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::EmptyPatch));
        assert_eq!(gateway.write_calls(), 0);
    }

    #[tokio::test]
    async fn injected_failure_hits_exactly_one_write() {
        let gateway = InMemoryStudentGateway::new();
        let id = StudentId::generate();
        gateway.seed(StudentRecord::bare(id));
        gateway.fail_next_write();

        let patch = StudentPatch::default().with_notes("note");
        let err = gateway
            .write_student_partial(&scope(), id, &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable(_)));

        gateway
            .write_student_partial(&scope(), id, &patch)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn omitted_echo_still_stores_progress() {
        let gateway = InMemoryStudentGateway::new();
        let id = StudentId::generate();
        gateway.seed(StudentRecord::bare(id));
        gateway.omit_progress_in_echo(true);

        let progress = StudentProgress::default().touched(fixed_now());
        let echo = gateway
            .write_student_partial(
                &scope(),
                id,
                &StudentPatch::default().with_progress(progress.clone()),
            )
            .await
            .unwrap();

        assert!(echo.progress.is_none());
        assert_eq!(gateway.stored(id).unwrap().progress, Some(progress));
    }
}
