//! Pure derivations over a student's training progress.
//!
//! Everything here is side-effect free and total: degenerate inputs
//! (zero-hour requirements, negative or non-finite hours, empty
//! sequences) produce a defined value, never a panic or a `NaN`.

use crate::model::{
    Milestone, MilestoneId, Requirement, RequirementCategory, RequirementSet, Sequence,
    SequenceItem, Stage, StageId,
};

/// Completion percentage of a single requirement, clamped to `[0, 100]`.
///
/// - `0` when `total_hours` is zero, negative, or non-finite (a zero-hour
///   requirement has no meaningful percentage).
/// - Negative or non-finite `completed_hours` displays as `0`; the stored
///   value is not corrected.
/// - Over-complete requirements cap at `100`.
#[must_use]
pub fn progress_percent(requirement: &Requirement) -> u32 {
    if !requirement.total_hours.is_finite() || requirement.total_hours <= 0.0 {
        return 0;
    }
    let completed = if requirement.completed_hours.is_finite() {
        requirement.completed_hours.max(0.0)
    } else {
        0.0
    };

    let percent = (completed / requirement.total_hours * 100.0).round();

    // NOTE: rounded and clamped to [0, 100] before the cast, so neither
    // truncation nor sign loss can occur.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = percent.clamp(0.0, 100.0) as u32;
    percent
}

/// Overall completion: the percentage of the Total Flight Time entry,
/// or `0` when that entry is absent.
#[must_use]
pub fn overall_progress(requirements: &RequirementSet) -> u32 {
    requirements.total().map_or(0, progress_percent)
}

/// The stage the student is currently in: the lowest-order incomplete
/// stage, or the highest-order stage once everything is complete.
/// `None` only for an empty sequence.
#[must_use]
pub fn current_stage(stages: &Sequence<StageId>) -> Option<&Stage> {
    first_incomplete(stages.items()).or_else(|| stages.items().iter().max_by_key(|s| s.order))
}

/// The next milestone to work toward: the lowest-order incomplete one,
/// or `None` when every milestone is complete (or none exist).
#[must_use]
pub fn next_milestone(milestones: &Sequence<MilestoneId>) -> Option<&Milestone> {
    first_incomplete(milestones.items())
}

/// Headline requirements for the dashboard: category `Key`, ascending by
/// `order`.
#[must_use]
pub fn key_requirements(requirements: &RequirementSet) -> Vec<&Requirement> {
    let mut key: Vec<&Requirement> = requirements
        .items()
        .iter()
        .filter(|r| r.category == Some(RequirementCategory::Key))
        .collect();
    key.sort_by_key(|r| r.order);
    key
}

// The stored Vec carries no ordering guarantee, so derive by scanning
// rather than assuming it is sorted.
fn first_incomplete<Id>(items: &[SequenceItem<Id>]) -> Option<&SequenceItem<Id>> {
    items
        .iter()
        .filter(|item| !item.completed)
        .min_by_key(|item| item.order)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
