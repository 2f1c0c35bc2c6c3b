//! PrepSmart client: crisis questionnaire, plan submission, and progress
//! tracking against the PrepSmart backend.

pub mod api;
pub mod config;
pub mod crisis;
pub mod error;
pub mod plan;
pub mod progress;
pub mod session;
pub mod wizard;
