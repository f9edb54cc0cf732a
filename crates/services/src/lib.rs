#![forbid(unsafe_code)]

pub mod error;
pub mod progress;

pub use training_core::Clock;

pub use error::ProgressError;
pub use progress::{EntityKey, HoursDraft, ProgressController, ProgressOverview, WriteOutcome};
