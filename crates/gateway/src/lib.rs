#![forbid(unsafe_code)]

//! Client for the remote student-record store.
//!
//! The remote store is the system of record for student training
//! progress; this crate defines the read/partial-write contract the
//! services crate consumes, an HTTP implementation, and an in-memory
//! fake for tests.

pub mod client;
pub mod error;
pub mod http;
pub mod patch;
pub mod record;
pub mod scope;

pub use client::{InMemoryStudentGateway, StudentGateway};
pub use reqwest::StatusCode;
pub use error::GatewayError;
pub use http::HttpStudentGateway;
pub use patch::StudentPatch;
pub use record::StudentRecord;
pub use scope::SessionScope;
