use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{MilestoneId, StageId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequenceError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("description cannot be empty")]
    EmptyDescription,

    #[error("item not found")]
    NotFound,
}

//
// ─── ITEMS ─────────────────────────────────────────────────────────────────────
//

/// A single entry in an ordered completion sequence.
///
/// Milestones and stages share this exact shape; only the id type differs.
/// `order` is assigned densely on append but gaps are permitted after
/// removals, so consumers must never index by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceItem<Id> {
    pub id: Id,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub completed: bool,
}

/// A discrete, orderable training achievement with a completion flag.
pub type Milestone = SequenceItem<MilestoneId>;

/// A discrete, orderable training phase with a completion flag.
pub type Stage = SequenceItem<StageId>;

//
// ─── SEQUENCE ──────────────────────────────────────────────────────────────────
//

/// An ordered completion sequence (milestones or stages) for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence<Id>(Vec<SequenceItem<Id>>);

// Not derived: deriving would demand `Id: Default`.
impl<Id> Default for Sequence<Id> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<Id: Copy + PartialEq> Sequence<Id> {
    /// Wraps an existing list, as fetched from the remote store.
    #[must_use]
    pub fn from_items(items: Vec<SequenceItem<Id>>) -> Self {
        Self(items)
    }

    #[must_use]
    pub fn items(&self) -> &[SequenceItem<Id>] {
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

    #[must_use]
    pub fn get(&self, id: Id) -> Option<&SequenceItem<Id>> {
        self.0.iter().find(|item| item.id == id)
    }

    /// Flips `completed` on the matching item; all others are untouched.
    ///
    /// Toggling the same id twice restores the original content.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::NotFound` if `id` is absent.
    pub fn toggle(&mut self, id: Id) -> Result<(), SequenceError> {
        let item = self
            .0
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(SequenceError::NotFound)?;
        item.completed = !item.completed;
        Ok(())
    }

    /// Appends an item after every existing one, not yet completed.
    ///
    /// Name and description are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::EmptyName` / `SequenceError::EmptyDescription`
    /// when the respective field trims to nothing.
    pub fn add(
        &mut self,
        id: Id,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), SequenceError> {
        let (name, description) = validated(name, description)?;
        let order = self.0.iter().map(|item| item.order).max().unwrap_or(0) + 1;
        self.0.push(SequenceItem {
            id,
            name,
            description,
            order,
            completed: false,
        });
        Ok(())
    }

    /// Replaces name and description on the matching item, preserving its
    /// `order` and `completed` flag.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::NotFound` if `id` is absent, or the empty
    /// field errors from [`Sequence::add`].
    pub fn edit(
        &mut self,
        id: Id,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), SequenceError> {
        let (name, description) = validated(name, description)?;
        let item = self
            .0
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(SequenceError::NotFound)?;
        item.name = name;
        item.description = description;
        Ok(())
    }

    /// Removes the matching item. Remaining `order` values keep their gaps.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::NotFound` if `id` is absent.
    pub fn remove(&mut self, id: Id) -> Result<SequenceItem<Id>, SequenceError> {
        let index = self
            .0
            .iter()
            .position(|item| item.id == id)
            .ok_or(SequenceError::NotFound)?;
        Ok(self.0.remove(index))
    }
}

fn validated(
    name: impl Into<String>,
    description: impl Into<String>,
) -> Result<(String, String), SequenceError> {
    let name = name.into().trim().to_owned();
    if name.is_empty() {
        return Err(SequenceError::EmptyName);
    }
    let description = description.into().trim().to_owned();
    if description.is_empty() {
        return Err(SequenceError::EmptyDescription);
    }
    Ok((name, description))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
