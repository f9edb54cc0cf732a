use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::RequirementId;

/// Name of the synthetic requirement whose hours are the sum over all others.
pub const TOTAL_FLIGHT_TIME: &str = "Total Flight Time";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RequirementError {
    #[error("requirement name cannot be empty")]
    EmptyName,

    #[error("requirement hours must be a positive number")]
    InvalidHours,

    #[error("a requirement named \"{0}\" already exists")]
    DuplicateName(String),

    #[error("requirement not found")]
    NotFound,

    #[error("the Total Flight Time requirement cannot be removed")]
    ProtectedTotal,
}

//
// ─── REQUIREMENT ───────────────────────────────────────────────────────────────
//

/// Grouping used by the training screen to pick out headline requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementCategory {
    Key,
    Custom,
    Standard,
}

/// A named flight-hour target/progress pair tracked for a student.
///
/// Persisted as part of the parent student record; field names follow the
/// remote store's camelCase wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: RequirementId,
    pub name: String,
    pub total_hours: f64,
    pub completed_hours: f64,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RequirementCategory>,
    #[serde(default)]
    pub order: u32,
}

//
// ─── REQUIREMENT SET ───────────────────────────────────────────────────────────
//

/// A student's requirement list, including the synthetic Total Flight Time
/// entry.
///
/// The set owns one invariant: after any insertion or deletion, the entry
/// named [`TOTAL_FLIGHT_TIME`] carries the sum of `total_hours` and
/// `completed_hours` over every other entry. The invariant is deliberately
/// *not* re-established when individual `completed_hours` values are edited
/// in place; see the batch-edit path in the services crate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementSet(Vec<Requirement>);

impl RequirementSet {
    /// Wraps an existing list, as fetched from the remote store.
    ///
    /// No validation: the remote store is the system of record and its
    /// contents are adopted as-is, including a stale or missing total.
    #[must_use]
    pub fn from_items(items: Vec<Requirement>) -> Self {
        Self(items)
    }

    #[must_use]
    pub fn items(&self) -> &[Requirement] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a requirement by id.
    #[must_use]
    pub fn get(&self, id: RequirementId) -> Option<&Requirement> {
        self.0.iter().find(|r| r.id == id)
    }

    /// Looks up a requirement by exact name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Requirement> {
        self.0.iter().find(|r| r.name == name)
    }

    /// The synthetic Total Flight Time entry, when present.
    #[must_use]
    pub fn total(&self) -> Option<&Requirement> {
        self.find_by_name(TOTAL_FLIGHT_TIME)
    }

    /// Appends a school-admin-defined custom requirement.
    ///
    /// The new entry starts at zero completed hours and is ordered after
    /// every existing entry. The Total Flight Time entry is recomputed
    /// before returning.
    ///
    /// # Errors
    ///
    /// - `RequirementError::EmptyName` if `name` trims to nothing.
    /// - `RequirementError::InvalidHours` if `total_hours` is not a finite
    ///   number greater than zero.
    /// - `RequirementError::DuplicateName` if an entry with the same name
    ///   already exists (case-sensitive exact match, so the synthetic
    ///   total can never be shadowed).
    pub fn add_custom(
        &mut self,
        name: impl Into<String>,
        total_hours: f64,
    ) -> Result<RequirementId, RequirementError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(RequirementError::EmptyName);
        }
        if !total_hours.is_finite() || total_hours <= 0.0 {
            return Err(RequirementError::InvalidHours);
        }
        if self.find_by_name(&name).is_some() {
            return Err(RequirementError::DuplicateName(name));
        }

        let order = self.0.iter().map(|r| r.order).max().unwrap_or(0) + 1;
        let id = RequirementId::generate();
        self.0.push(Requirement {
            id,
            name,
            total_hours,
            completed_hours: 0.0,
            is_custom: true,
            category: Some(RequirementCategory::Custom),
            order,
        });
        self.recompute_total();
        Ok(id)
    }

    /// Removes a requirement by id and recomputes the Total Flight Time
    /// entry. Remaining `order` values are not renumbered.
    ///
    /// # Errors
    ///
    /// - `RequirementError::NotFound` if `id` is absent.
    /// - `RequirementError::ProtectedTotal` if `id` names the synthetic
    ///   total itself.
    pub fn remove(&mut self, id: RequirementId) -> Result<Requirement, RequirementError> {
        let index = self
            .0
            .iter()
            .position(|r| r.id == id)
            .ok_or(RequirementError::NotFound)?;
        if self.0[index].name == TOTAL_FLIGHT_TIME {
            return Err(RequirementError::ProtectedTotal);
        }

        let removed = self.0.remove(index);
        self.recompute_total();
        Ok(removed)
    }

    /// Recomputes the Total Flight Time entry from every other entry.
    ///
    /// Idempotent. When no entry named [`TOTAL_FLIGHT_TIME`] exists the
    /// set is left unchanged; the total is expected to exist on every
    /// enrolled student, so a missing one is tolerated rather than
    /// invented here.
    pub fn recompute_total(&mut self) {
        let Some(index) = self.0.iter().position(|r| r.name == TOTAL_FLIGHT_TIME) else {
            return;
        };

        let mut total_hours = 0.0;
        let mut completed_hours = 0.0;
        for (i, requirement) in self.0.iter().enumerate() {
            if i == index {
                continue;
            }
            total_hours += requirement.total_hours;
            completed_hours += requirement.completed_hours;
        }

        self.0[index].total_hours = total_hours;
        self.0[index].completed_hours = completed_hours;
    }

    /// Overwrites `completed_hours` on the entry with the given name.
    ///
    /// Used by the batch hour edit, which keys its working copy by
    /// requirement name. Does *not* recompute the total; the caller
    /// decides whether the invariant is restored.
    ///
    /// # Errors
    ///
    /// Returns `RequirementError::NotFound` if no entry has that name.
    pub fn set_completed_hours_by_name(
        &mut self,
        name: &str,
        completed_hours: f64,
    ) -> Result<(), RequirementError> {
        let requirement = self
            .0
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or(RequirementError::NotFound)?;
        requirement.completed_hours = completed_hours;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(name: &str, total: f64, completed: f64, order: u32) -> Requirement {
        Requirement {
            id: RequirementId::generate(),
            name: name.to_owned(),
            total_hours: total,
            completed_hours: completed,
            is_custom: false,
            category: Some(RequirementCategory::Standard),
            order,
        }
    }

    fn set_with_total() -> RequirementSet {
        let mut total = requirement(TOTAL_FLIGHT_TIME, 40.0, 20.0, 1);
        total.category = Some(RequirementCategory::Key);
        RequirementSet::from_items(vec![total, requirement("Solo Flight", 40.0, 20.0, 2)])
    }

    fn assert_invariant(set: &RequirementSet) {
        let total = set.total().expect("total entry should exist");
        let (sum_total, sum_completed) = set
            .items()
            .iter()
            .filter(|r| r.name != TOTAL_FLIGHT_TIME)
            .fold((0.0, 0.0), |(t, c), r| {
                (t + r.total_hours, c + r.completed_hours)
            });
        assert!((total.total_hours - sum_total).abs() < f64::EPSILON);
        assert!((total.completed_hours - sum_completed).abs() < f64::EPSILON);
    }

    #[test]
    fn add_custom_appends_and_recomputes_total() {
        let mut set = set_with_total();
        set.add_custom("Night Flight", 3.0).unwrap();

        let added = set.find_by_name("Night Flight").unwrap();
        assert!(added.is_custom);
        assert_eq!(added.category, Some(RequirementCategory::Custom));
        assert_eq!(added.completed_hours, 0.0);
        assert_eq!(added.order, 3);

        let total = set.total().unwrap();
        assert_eq!(total.total_hours, 43.0);
        assert_eq!(total.completed_hours, 20.0);
        assert_invariant(&set);
    }

    #[test]
    fn add_then_remove_restores_original_total() {
        let mut set = set_with_total();
        let id = set.add_custom("Night Flight", 3.0).unwrap();
        set.remove(id).unwrap();

        let total = set.total().unwrap();
        assert_eq!(total.total_hours, 40.0);
        assert_eq!(total.completed_hours, 20.0);
        assert_invariant(&set);
    }

    #[test]
    fn add_custom_trims_name() {
        let mut set = set_with_total();
        set.add_custom("  Night Flight  ", 3.0).unwrap();
        assert!(set.find_by_name("Night Flight").is_some());
    }

    #[test]
    fn add_custom_rejects_empty_name() {
        let mut set = set_with_total();
        let err = set.add_custom("   ", 3.0).unwrap_err();
        assert_eq!(err, RequirementError::EmptyName);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_custom_rejects_non_positive_hours() {
        let mut set = set_with_total();
        assert_eq!(
            set.add_custom("Night Flight", 0.0).unwrap_err(),
            RequirementError::InvalidHours
        );
        assert_eq!(
            set.add_custom("Night Flight", -2.0).unwrap_err(),
            RequirementError::InvalidHours
        );
        assert_eq!(
            set.add_custom("Night Flight", f64::NAN).unwrap_err(),
            RequirementError::InvalidHours
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn add_custom_rejects_duplicate_name() {
        let mut set = set_with_total();
        let before = set.clone();
        let err = set.add_custom(TOTAL_FLIGHT_TIME, 5.0).unwrap_err();
        assert_eq!(
            err,
            RequirementError::DuplicateName(TOTAL_FLIGHT_TIME.to_owned())
        );
        assert_eq!(set, before);
    }

    #[test]
    fn duplicate_match_is_case_sensitive() {
        let mut set = set_with_total();
        set.add_custom("night flight", 3.0).unwrap();
        set.add_custom("Night Flight", 3.0).unwrap();
        assert_eq!(set.len(), 4);
        assert_invariant(&set);
    }

    #[test]
    fn remove_missing_id_is_not_found() {
        let mut set = set_with_total();
        let err = set.remove(RequirementId::generate()).unwrap_err();
        assert_eq!(err, RequirementError::NotFound);
    }

    #[test]
    fn remove_total_is_protected() {
        let mut set = set_with_total();
        let total_id = set.total().unwrap().id;
        let err = set.remove(total_id).unwrap_err();
        assert_eq!(err, RequirementError::ProtectedTotal);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_keeps_order_gaps() {
        let mut set = set_with_total();
        let a = set.add_custom("Night Flight", 3.0).unwrap();
        set.add_custom("Instrument Time", 5.0).unwrap();
        set.remove(a).unwrap();

        let orders: Vec<u32> = set.items().iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 4]);
        assert_invariant(&set);
    }

    #[test]
    fn recompute_total_is_idempotent() {
        let mut set = set_with_total();
        set.add_custom("Night Flight", 3.0).unwrap();
        let once = set.clone();
        set.recompute_total();
        assert_eq!(set, once);
    }

    #[test]
    fn recompute_without_total_entry_is_a_no_op() {
        let mut set = RequirementSet::from_items(vec![requirement("Solo Flight", 40.0, 20.0, 1)]);
        let before = set.clone();
        set.recompute_total();
        assert_eq!(set, before);
    }

    #[test]
    fn invariant_holds_under_mixed_operations() {
        let mut set = set_with_total();
        let a = set.add_custom("Night Flight", 3.0).unwrap();
        let b = set.add_custom("Cross Country", 10.0).unwrap();
        set.remove(a).unwrap();
        set.add_custom("Instrument Time", 5.0).unwrap();
        set.remove(b).unwrap();
        assert_invariant(&set);
    }

    #[test]
    fn set_completed_hours_by_name_does_not_touch_total() {
        let mut set = set_with_total();
        set.set_completed_hours_by_name("Solo Flight", 30.0).unwrap();

        // The total is intentionally left stale until the next add/remove.
        assert_eq!(set.total().unwrap().completed_hours, 20.0);
        assert_eq!(
            set.set_completed_hours_by_name("Missing", 1.0).unwrap_err(),
            RequirementError::NotFound
        );
    }

    #[test]
    fn requirement_wire_format_is_camel_case() {
        let set = set_with_total();
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"totalHours\""));
        assert!(json.contains("\"completedHours\""));
        assert!(json.contains("\"isCustom\""));

        let back: RequirementSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
