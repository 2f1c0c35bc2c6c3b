//! Job progress: status snapshots, the polling session that produces them,
//! and the aggregation that turns them into a dashboard model.
//!
//! Control flow: [`PollerSession`] yields [`JobStatus`] snapshots, the
//! [`StatusAggregator`] folds each into a [`DisplayModel`], and once the job
//! completes the [`PlanTracker`] fetches the finished plan.

pub mod agents;
pub mod aggregator;
pub mod model;
pub mod poller;
pub mod tracker;

pub use aggregator::{AgentCard, DisplayModel, StatusAggregator, TimeEstimate, aggregate};
pub use model::{AgentState, AgentStatus, JobState, JobStatus};
pub use poller::{PollOptions, PollStopper, PollerSession, StatusSource};
pub use tracker::PlanTracker;
