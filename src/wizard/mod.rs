//! Crisis questionnaire wizard: a four-step form that collects location,
//! household and resources, persists its answers to the session, and submits
//! the resulting crisis profile.

pub mod fields;
pub mod manager;
pub mod payload;
pub mod record;
pub mod state;
pub mod summary;

pub use fields::{FieldMap, TOTAL_STEPS, WizardStep};
pub use manager::WizardManager;
pub use payload::build_profile;
pub use record::WizardRecord;
pub use state::{WizardPhase, WizardState};
pub use summary::ReviewSummary;
