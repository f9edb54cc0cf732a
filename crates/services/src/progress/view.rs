use serde::Serialize;

use training_core::metrics;
use training_core::model::{Milestone, Requirement, Stage, StudentProgress};

/// Derived dashboard view over a student's progress, recomputed from the
/// controller's current copy after every adopted write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub overall_percent: u32,
    pub current_stage: Option<Stage>,
    pub next_milestone: Option<Milestone>,
    pub key_requirements: Vec<Requirement>,
}

impl ProgressOverview {
    #[must_use]
    pub fn derive(progress: &StudentProgress) -> Self {
        Self {
            overall_percent: metrics::overall_progress(&progress.requirements),
            current_stage: metrics::current_stage(&progress.stages).cloned(),
            next_milestone: metrics::next_milestone(&progress.milestones).cloned(),
            key_requirements: metrics::key_requirements(&progress.requirements)
                .into_iter()
                .cloned()
                .collect(),
        }
    }
}
