use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use gateway::{SessionScope, StudentGateway, StudentPatch, StudentRecord};
use training_core::Clock;
use training_core::model::{MilestoneId, RequirementId, Role, StageId, StudentId, StudentProgress};

use crate::error::ProgressError;

use super::draft::HoursDraft;
use super::view::ProgressOverview;

//
// ─── MUTATION KEYS ─────────────────────────────────────────────────────────────
//

/// Identifies one logical mutation for duplicate-submission suppression.
///
/// Collection-level actions (adding an entry, saving the batch edit)
/// share a synthetic key per collection; entity-level actions are keyed
/// by the entity id, so two different milestones stay independently
/// mutable while a double-click on one button is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Requirements,
    Milestones,
    Stages,
    Requirement(RequirementId),
    Milestone(MilestoneId),
    Stage(StageId),
}

/// Whether a mutation was submitted or suppressed as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    AlreadyPending,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Orchestrates mutations of one student's training progress.
///
/// The controller holds the single mutable copy the screen renders; the
/// remote store is the durable copy. Every mutation follows the same
/// two-phase commit: compose the next full progress document, persist it
/// through the gateway, then adopt the server's echo — falling back to
/// the locally composed value for anything the echo omits. A failed
/// persist restores the pre-mutation copy; nothing is retried.
pub struct ProgressController {
    clock: Clock,
    gateway: Arc<dyn StudentGateway>,
    scope: SessionScope,
    role: Role,
    student_id: StudentId,
    record: StudentRecord,
    progress: StudentProgress,
    draft: Option<HoursDraft>,
    in_flight: HashSet<EntityKey>,
}

impl ProgressController {
    /// Builds a controller around an already-fetched student record.
    #[must_use]
    pub fn new(
        clock: Clock,
        gateway: Arc<dyn StudentGateway>,
        scope: SessionScope,
        role: Role,
        record: StudentRecord,
    ) -> Self {
        let progress = record.progress.clone().unwrap_or_default();
        Self {
            clock,
            gateway,
            scope,
            role,
            student_id: record.id,
            record,
            progress,
            draft: None,
            in_flight: HashSet::new(),
        }
    }

    /// Fetches the student record and builds a controller for it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Gateway` when the read fails.
    pub async fn load(
        clock: Clock,
        gateway: Arc<dyn StudentGateway>,
        scope: SessionScope,
        role: Role,
        student_id: StudentId,
    ) -> Result<Self, ProgressError> {
        let record = gateway.read_student(&scope, student_id).await?;
        Ok(Self::new(clock, gateway, scope, role, record))
    }

    // Accessors

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The progress copy the screen renders.
    #[must_use]
    pub fn progress(&self) -> &StudentProgress {
        &self.progress
    }

    /// The last-seen student record (updated on every adopted echo).
    #[must_use]
    pub fn record(&self) -> &StudentRecord {
        &self.record
    }

    #[must_use]
    pub fn is_pending(&self, key: EntityKey) -> bool {
        self.in_flight.contains(&key)
    }

    /// Recomputes the derived dashboard view from the current copy.
    #[must_use]
    pub fn overview(&self) -> ProgressOverview {
        ProgressOverview::derive(&self.progress)
    }

    //
    // ─── BATCH HOUR EDIT ───────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Enters the hour-edit session, capturing a fresh working copy of
    /// every requirement's `completed_hours`. Re-entering replaces any
    /// previous working copy.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::PermissionDenied` for non-admin callers.
    pub fn begin_hours_edit(&mut self) -> Result<(), ProgressError> {
        self.ensure_admin()?;
        self.draft = Some(HoursDraft::capture(&self.progress.requirements));
        Ok(())
    }

    /// Edits one requirement's hours in the working copy.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoEditInProgress` outside an edit session,
    /// or the draft's own validation errors.
    pub fn set_draft_hours(&mut self, name: &str, hours: f64) -> Result<(), ProgressError> {
        let draft = self.draft.as_mut().ok_or(ProgressError::NoEditInProgress)?;
        draft.set(name, hours)
    }

    /// The drafted hours for one requirement, when an edit is open.
    #[must_use]
    pub fn draft_hours(&self, name: &str) -> Option<f64> {
        self.draft.as_ref().and_then(|draft| draft.get(name))
    }

    /// Discards the working copy without any write.
    pub fn cancel_hours_edit(&mut self) {
        self.draft = None;
    }

    /// Commits the hour-edit session.
    ///
    /// Composes the full progress document with the drafted hours applied
    /// by requirement name and persists it. The Total Flight Time entry
    /// is deliberately not recomputed on this path (see DESIGN.md). On
    /// success the draft is cleared and the echo adopted; on failure the
    /// draft and the rendered copy are both left untouched.
    ///
    /// # Errors
    ///
    /// `ProgressError::PermissionDenied`, `ProgressError::NoEditInProgress`,
    /// or a `ProgressError::Gateway` from the failed write.
    pub async fn save_hours_edit(&mut self) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let draft = self.draft.as_ref().ok_or(ProgressError::NoEditInProgress)?;

        if !self.in_flight.insert(EntityKey::Requirements) {
            return Ok(WriteOutcome::AlreadyPending);
        }

        let mut next = self.progress.clone();
        draft.apply_to(&mut next.requirements);
        let next = next.touched(self.clock.now());

        let patch = StudentPatch::default().with_progress(next.clone());
        let result = self
            .gateway
            .write_student_partial(&self.scope, self.student_id, &patch)
            .await;
        self.in_flight.remove(&EntityKey::Requirements);

        match result {
            Ok(echo) => {
                self.adopt(echo, next);
                self.draft = None;
                Ok(WriteOutcome::Applied)
            }
            Err(err) => {
                warn!(student_id = %self.student_id, "hour-edit save failed; keeping draft");
                Err(err.into())
            }
        }
    }

    //
    // ─── REQUIREMENTS ──────────────────────────────────────────────────────────
    //

    /// Adds a custom requirement and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, validation (empty name, non-positive hours, duplicate
    /// name), or gateway errors; validation failures never reach the
    /// gateway.
    pub async fn add_requirement(
        &mut self,
        name: impl Into<String>,
        total_hours: f64,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.requirements.add_custom(name, total_hours)?;
        self.commit(EntityKey::Requirements, next).await
    }

    /// Removes a requirement and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, `RequirementError::NotFound`,
    /// `RequirementError::ProtectedTotal`, or gateway errors.
    pub async fn remove_requirement(
        &mut self,
        id: RequirementId,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.requirements.remove(id)?;
        self.commit(EntityKey::Requirement(id), next).await
    }

    //
    // ─── MILESTONES ────────────────────────────────────────────────────────────
    //

    /// Appends a milestone and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, empty-field validation, or gateway errors.
    pub async fn add_milestone(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.milestones.add(MilestoneId::generate(), name, description)?;
        self.commit(EntityKey::Milestones, next).await
    }

    /// Renames a milestone, preserving its order and completion.
    ///
    /// # Errors
    ///
    /// Permission, not-found, empty-field validation, or gateway errors.
    pub async fn edit_milestone(
        &mut self,
        id: MilestoneId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.milestones.edit(id, name, description)?;
        self.commit(EntityKey::Milestone(id), next).await
    }

    /// Removes a milestone and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, not-found, or gateway errors.
    pub async fn remove_milestone(
        &mut self,
        id: MilestoneId,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.milestones.remove(id)?;
        self.commit(EntityKey::Milestone(id), next).await
    }

    /// Flips a milestone's completion flag and persists.
    ///
    /// # Errors
    ///
    /// Permission, not-found, or gateway errors.
    pub async fn toggle_milestone(
        &mut self,
        id: MilestoneId,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.milestones.toggle(id)?;
        self.commit(EntityKey::Milestone(id), next).await
    }

    //
    // ─── STAGES ────────────────────────────────────────────────────────────────
    //

    /// Appends a stage and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, empty-field validation, or gateway errors.
    pub async fn add_stage(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.stages.add(StageId::generate(), name, description)?;
        self.commit(EntityKey::Stages, next).await
    }

    /// Renames a stage, preserving its order and completion.
    ///
    /// # Errors
    ///
    /// Permission, not-found, empty-field validation, or gateway errors.
    pub async fn edit_stage(
        &mut self,
        id: StageId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.stages.edit(id, name, description)?;
        self.commit(EntityKey::Stage(id), next).await
    }

    /// Removes a stage and persists the updated document.
    ///
    /// # Errors
    ///
    /// Permission, not-found, or gateway errors.
    pub async fn remove_stage(&mut self, id: StageId) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.stages.remove(id)?;
        self.commit(EntityKey::Stage(id), next).await
    }

    /// Flips a stage's completion flag and persists.
    ///
    /// # Errors
    ///
    /// Permission, not-found, or gateway errors.
    pub async fn toggle_stage(&mut self, id: StageId) -> Result<WriteOutcome, ProgressError> {
        self.ensure_admin()?;
        let mut next = self.progress.clone();
        next.stages.toggle(id)?;
        self.commit(EntityKey::Stage(id), next).await
    }

    //
    // ─── COMMIT ────────────────────────────────────────────────────────────────
    //

    fn ensure_admin(&self) -> Result<(), ProgressError> {
        if self.role.can_manage_training() {
            Ok(())
        } else {
            Err(ProgressError::PermissionDenied)
        }
    }

    /// Two-phase commit for a fire-and-commit mutation: apply the
    /// composed document locally, persist it, adopt the echo. A failed
    /// persist restores the pre-mutation copy exactly.
    async fn commit(
        &mut self,
        key: EntityKey,
        next: StudentProgress,
    ) -> Result<WriteOutcome, ProgressError> {
        if !self.in_flight.insert(key) {
            return Ok(WriteOutcome::AlreadyPending);
        }

        let next = next.touched(self.clock.now());
        let previous = std::mem::replace(&mut self.progress, next.clone());

        let patch = StudentPatch::default().with_progress(next.clone());
        let result = self
            .gateway
            .write_student_partial(&self.scope, self.student_id, &patch)
            .await;
        self.in_flight.remove(&key);

        match result {
            Ok(echo) => {
                self.adopt(echo, next);
                Ok(WriteOutcome::Applied)
            }
            Err(err) => {
                warn!(student_id = %self.student_id, ?key, "write failed; restoring local copy");
                self.progress = previous;
                Err(err.into())
            }
        }
    }

    /// Adopts a server echo: the echo wins on everything it returned,
    /// and the locally composed document stands in for a missing
    /// `progress` field rather than blocking the user.
    fn adopt(&mut self, echo: StudentRecord, composed: StudentProgress) {
        self.progress = echo.progress.clone().unwrap_or(composed);
        self.record = echo;
    }

    #[cfg(test)]
    pub(crate) fn mark_pending(&mut self, key: EntityKey) {
        self.in_flight.insert(key);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
