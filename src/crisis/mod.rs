//! Crisis profile: the submission payload and the task handle it yields.

pub mod model;

pub use model::{
    CrisisMode, CrisisProfile, DEFAULT_ECONOMIC_BUDGET_TIER, FinancialSituation, Household,
    HousingType, Location, TaskHandle,
};
