use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{MilestoneId, StageId};
use crate::model::requirement::RequirementSet;
use crate::model::sequence::Sequence;

/// The training-progress sub-document of a student record.
///
/// Owned by exactly one student; never persisted independently of its
/// parent. Writes to the remote store always carry the *entire* document
/// (full-replace semantics), so every mutation composes a complete new
/// value rather than a delta.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    #[serde(default)]
    pub requirements: RequirementSet,
    #[serde(default)]
    pub milestones: Sequence<MilestoneId>,
    #[serde(default)]
    pub stages: Sequence<StageId>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl StudentProgress {
    /// Returns a copy of this document stamped with a new `lastUpdated`.
    #[must_use]
    pub fn touched(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.last_updated = Some(at);
        next
    }
}
