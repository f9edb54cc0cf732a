use std::collections::HashMap;

use training_core::model::{RequirementError, RequirementSet};

use crate::error::ProgressError;

/// Working copy of `completed_hours` for a batch hour-edit session.
///
/// Keyed by requirement name, matching the edit form the screen renders.
/// The draft exists only between begin and save/cancel; nothing here
/// touches the controller's rendered copy until a save commits.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursDraft {
    hours: HashMap<String, f64>,
}

impl HoursDraft {
    /// Captures the current `completed_hours` of every requirement.
    #[must_use]
    pub fn capture(requirements: &RequirementSet) -> Self {
        let hours = requirements
            .items()
            .iter()
            .map(|r| (r.name.clone(), r.completed_hours))
            .collect();
        Self { hours }
    }

    /// Sets the drafted hours for one requirement.
    ///
    /// # Errors
    ///
    /// - `ProgressError::InvalidDraftHours` for NaN or infinite input,
    ///   which would poison the requirement sums.
    /// - `RequirementError::NotFound` for a name that was not captured.
    pub fn set(&mut self, name: &str, hours: f64) -> Result<(), ProgressError> {
        if !hours.is_finite() {
            return Err(ProgressError::InvalidDraftHours);
        }
        let entry = self
            .hours
            .get_mut(name)
            .ok_or(RequirementError::NotFound)?;
        *entry = hours;
        Ok(())
    }

    /// The drafted hours for one requirement, if captured.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.hours.get(name).copied()
    }

    /// Applies the drafted hours onto a requirement set by name.
    ///
    /// Names that no longer exist (the requirement was removed while the
    /// draft was open) are skipped. The Total Flight Time entry is *not*
    /// recomputed here: an hours-only save leaves the synthetic total
    /// as-is, mirroring the screen this replaces; see DESIGN.md.
    pub fn apply_to(&self, requirements: &mut RequirementSet) {
        for (name, hours) in &self.hours {
            let _ = requirements.set_completed_hours_by_name(name, *hours);
        }
    }
}
