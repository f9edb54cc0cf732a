//! The student training-progress controller and its supporting state.

mod controller;
mod draft;
mod view;

pub use controller::{EntityKey, ProgressController, WriteOutcome};
pub use draft::HoursDraft;
pub use view::ProgressOverview;
