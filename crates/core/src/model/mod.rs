mod ids;
mod progress;
mod requirement;
mod role;
mod sequence;

pub use ids::{MilestoneId, ParseIdError, RequirementId, StageId, StudentId};
pub use progress::StudentProgress;
pub use requirement::{
    Requirement, RequirementCategory, RequirementError, RequirementSet, TOTAL_FLIGHT_TIME,
};
pub use role::Role;
pub use sequence::{Milestone, Sequence, SequenceError, SequenceItem, Stage};
