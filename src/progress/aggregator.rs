//! Status aggregation: turns a raw [`JobStatus`] into the display model the
//! progress dashboard renders.
//!
//! [`aggregate`] is a pure function of the snapshot, the elapsed time, and the
//! previous display model (needed so live agent descriptions stick once seen).
//! [`StatusAggregator`] wraps it with the clock and the previous model.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::agents::{self, AgentConfig};
use super::model::{AgentState, AgentStatus, JobState, JobStatus};

/// Advisory total duration of a plan-generation job.
pub const ESTIMATED_TOTAL: Duration = Duration::from_secs(180);

/// Fallback message when a job fails without a server-supplied error.
pub const GENERIC_FAILURE: &str = "Plan generation failed";

/// Time-remaining indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEstimate {
    /// No progress yet, nothing to estimate.
    Hidden,
    /// Countdown while `0 < progress < 100`. Never negative.
    Remaining(Duration),
    Complete,
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => Ok(()),
            Self::Complete => write!(f, "Complete!"),
            Self::Remaining(remaining) => {
                let secs = remaining.as_secs();
                let (minutes, seconds) = (secs / 60, secs % 60);
                if minutes > 0 {
                    write!(f, "~{minutes}m {seconds}s")
                } else {
                    write!(f, "~{seconds}s")
                }
            }
        }
    }
}

/// Compute the time estimate for a given progress and elapsed time.
pub fn time_estimate(progress: f64, elapsed: Duration, estimated_total: Duration) -> TimeEstimate {
    if progress >= 100.0 {
        TimeEstimate::Complete
    } else if progress > 0.0 {
        TimeEstimate::Remaining(estimated_total.saturating_sub(elapsed))
    } else {
        TimeEstimate::Hidden
    }
}

/// Display state of one agent card.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCard {
    pub key: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub state: AgentState,
    pub status_label: &'static str,
    pub description: String,
    /// Whether `description` came from the backend rather than the registry.
    pub live_description: bool,
    /// e.g. `"40% complete"`; `None` hides the indicator.
    pub progress_label: Option<String>,
}

impl AgentCard {
    fn placeholder(config: &'static AgentConfig) -> Self {
        Self {
            key: config.key,
            icon: config.icon,
            name: config.name,
            state: AgentState::Pending,
            status_label: AgentState::Pending.label(),
            description: config.description.to_string(),
            live_description: false,
            progress_label: None,
        }
    }

    fn apply(&mut self, status: &AgentStatus) {
        self.state = status.status;
        self.status_label = status.status.label();
        if let Some(live) = status.live_description() {
            self.description = live.to_string();
            self.live_description = true;
        }
        self.progress_label = status
            .progress_percentage
            .map(|p| format!("{p}% complete"));
    }
}

/// Everything the dashboard needs to render one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayModel {
    pub state: JobState,
    pub progress: f64,
    pub progress_label: &'static str,
    /// Rounded percentage, e.g. `"40%"`.
    pub percentage_label: String,
    pub time_estimate: TimeEstimate,
    pub agents: Vec<AgentCard>,
    /// Set once the job is completed, regardless of individual agent states.
    pub results_ready: bool,
    pub error: Option<String>,
}

impl DisplayModel {
    /// The model shown before the first status arrives.
    pub fn initial() -> Self {
        Self {
            state: JobState::Pending,
            progress: 0.0,
            progress_label: JobState::Pending.label(),
            percentage_label: "0%".to_string(),
            time_estimate: TimeEstimate::Hidden,
            agents: agents::displayed().map(AgentCard::placeholder).collect(),
            results_ready: false,
            error: None,
        }
    }

    pub fn card(&self, key: &str) -> Option<&AgentCard> {
        self.agents.iter().find(|c| c.key == key)
    }
}

/// Aggregate one snapshot on top of the previous display model.
pub fn aggregate(
    status: &JobStatus,
    elapsed: Duration,
    previous: Option<&DisplayModel>,
) -> DisplayModel {
    let progress = status.progress();

    let mut agents = match previous {
        Some(prev) => prev.agents.clone(),
        None => DisplayModel::initial().agents,
    };
    for update in &status.agents {
        match agents.iter_mut().find(|c| c.key == update.agent_name) {
            Some(card) => card.apply(update),
            None => match agents::lookup(&update.agent_name) {
                Some(config) => {
                    tracing::debug!(agent = config.name, state = ?update.status, "Agent has no card")
                }
                None => tracing::debug!(agent = %update.agent_name, "Unknown agent, ignoring"),
            },
        }
    }

    let error = (status.status == JobState::Failed).then(|| {
        status
            .error
            .clone()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    });

    DisplayModel {
        state: status.status,
        progress,
        progress_label: status.status.label(),
        percentage_label: format!("{}%", progress.round() as u32),
        time_estimate: time_estimate(progress, elapsed, ESTIMATED_TOTAL),
        agents,
        results_ready: status.status == JobState::Completed,
        error,
    }
}

/// Stateful wrapper: owns the start time and the last model.
#[derive(Debug)]
pub struct StatusAggregator {
    started_at: Instant,
    current: DisplayModel,
}

impl StatusAggregator {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started_at: Instant) -> Self {
        Self {
            started_at,
            current: DisplayModel::initial(),
        }
    }

    pub fn current(&self) -> &DisplayModel {
        &self.current
    }

    /// Fold a new snapshot into the display model.
    pub fn update(&mut self, status: &JobStatus) -> &DisplayModel {
        let elapsed = self.started_at.elapsed();
        self.current = aggregate(status, elapsed, Some(&self.current));
        &self.current
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, state: AgentState) -> AgentStatus {
        AgentStatus::new(name, state)
    }

    #[test]
    fn estimate_rules() {
        let elapsed = Duration::from_secs(30);
        assert_eq!(time_estimate(0.0, elapsed, ESTIMATED_TOTAL), TimeEstimate::Hidden);
        assert_eq!(
            time_estimate(40.0, elapsed, ESTIMATED_TOTAL),
            TimeEstimate::Remaining(Duration::from_secs(150))
        );
        assert_eq!(time_estimate(100.0, elapsed, ESTIMATED_TOTAL), TimeEstimate::Complete);
    }

    #[test]
    fn estimate_never_goes_negative() {
        let late = Duration::from_secs(1000);
        assert_eq!(
            time_estimate(99.0, late, ESTIMATED_TOTAL),
            TimeEstimate::Remaining(Duration::ZERO)
        );
    }

    #[test]
    fn estimate_formatting() {
        assert_eq!(TimeEstimate::Remaining(Duration::from_secs(150)).to_string(), "~2m 30s");
        assert_eq!(TimeEstimate::Remaining(Duration::from_secs(42)).to_string(), "~42s");
        assert_eq!(TimeEstimate::Complete.to_string(), "Complete!");
        assert_eq!(TimeEstimate::Hidden.to_string(), "");
    }

    #[test]
    fn scripted_sequence_completes_exactly_once() {
        let sequence = [
            JobStatus::new(JobState::Pending, 0.0),
            JobStatus::new(JobState::InProgress, 40.0),
            JobStatus::new(JobState::Completed, 100.0),
        ];
        let mut previous: Option<DisplayModel> = None;
        let mut completions = 0;
        for (tick, status) in sequence.iter().enumerate() {
            let elapsed = Duration::from_secs(2 * tick as u64);
            let model = aggregate(status, elapsed, previous.as_ref());
            if let TimeEstimate::Remaining(d) = model.time_estimate {
                assert!(d <= ESTIMATED_TOTAL);
            }
            if model.time_estimate == TimeEstimate::Complete {
                completions += 1;
                assert_eq!(tick, sequence.len() - 1);
                assert!(model.results_ready);
            } else {
                assert!(!model.results_ready);
            }
            previous = Some(model);
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn labels_and_percentage() {
        let model = aggregate(
            &JobStatus::new(JobState::InProgress, 66.6),
            Duration::ZERO,
            None,
        );
        assert_eq!(model.progress_label, "Analyzing your situation...");
        assert_eq!(model.percentage_label, "67%");

        let processing = aggregate(&JobStatus::new(JobState::Processing, 0.0), Duration::ZERO, None);
        assert_eq!(processing.progress_label, "Processing...");
    }

    #[test]
    fn active_agent_without_description_keeps_static_text() {
        let status = JobStatus::new(JobState::InProgress, 20.0)
            .with_agent(agent("RiskAssessmentAgent", AgentState::Active));
        let model = aggregate(&status, Duration::ZERO, None);
        let card = model.card("RiskAssessmentAgent").unwrap();

        assert_eq!(card.status_label, "Working...");
        assert_eq!(card.state.display_class(), AgentState::InProgress);
        assert_eq!(
            card.description,
            "Analyzing location-specific threats and severity levels"
        );
        assert!(!card.live_description);
        assert!(card.progress_label.is_none());
    }

    #[test]
    fn live_description_sticks() {
        let mut with_text = agent("SupplyPlanningAgent", AgentState::Active);
        with_text.current_task_description = Some("Pricing water and batteries".into());
        let first = aggregate(
            &JobStatus::new(JobState::InProgress, 20.0).with_agent(with_text),
            Duration::ZERO,
            None,
        );

        let second = aggregate(
            &JobStatus::new(JobState::InProgress, 40.0)
                .with_agent(agent("SupplyPlanningAgent", AgentState::Completed)),
            Duration::from_secs(2),
            Some(&first),
        );
        let card = second.card("SupplyPlanningAgent").unwrap();
        assert_eq!(card.description, "Pricing water and batteries");
        assert!(card.live_description);
        assert_eq!(card.status_label, "Complete ✓");
    }

    #[test]
    fn unknown_agents_are_ignored() {
        let status = JobStatus::new(JobState::InProgress, 10.0)
            .with_agent(agent("WeatherAgent", AgentState::Active))
            .with_agent(agent("CoordinatorAgent", AgentState::Active));
        let model = aggregate(&status, Duration::ZERO, None);
        assert_eq!(model.agents, DisplayModel::initial().agents);
    }

    #[test]
    fn per_agent_progress_rendered_when_present() {
        let mut a = agent("VideoCuratorAgent", AgentState::InProgress);
        a.progress_percentage = Some(50.0);
        let model = aggregate(&JobStatus::new(JobState::InProgress, 10.0).with_agent(a), Duration::ZERO, None);
        assert_eq!(
            model.card("VideoCuratorAgent").unwrap().progress_label.as_deref(),
            Some("50% complete")
        );
    }

    #[test]
    fn completed_job_is_ready_even_with_skipped_agent() {
        let status = JobStatus::new(JobState::Completed, 100.0)
            .with_agent(agent("FinancialAdvisorAgent", AgentState::Skipped))
            .with_agent(agent("RiskAssessmentAgent", AgentState::Completed));
        let model = aggregate(&status, Duration::from_secs(90), None);
        assert!(model.results_ready);
        assert_eq!(model.card("FinancialAdvisorAgent").unwrap().status_label, "Skipped");
    }

    #[test]
    fn failed_job_carries_error() {
        let plain = aggregate(&JobStatus::new(JobState::Failed, 20.0), Duration::ZERO, None);
        assert_eq!(plain.error.as_deref(), Some(GENERIC_FAILURE));

        let explicit = aggregate(
            &JobStatus::new(JobState::Failed, 20.0).with_error("Claude API unavailable"),
            Duration::ZERO,
            None,
        );
        assert_eq!(explicit.error.as_deref(), Some("Claude API unavailable"));
        assert!(!explicit.results_ready);
    }

    #[tokio::test(start_paused = true)]
    async fn aggregator_tracks_elapsed_time() {
        let mut aggregator = StatusAggregator::new();
        tokio::time::advance(Duration::from_secs(60)).await;
        let model = aggregator.update(&JobStatus::new(JobState::InProgress, 30.0));
        assert_eq!(
            model.time_estimate,
            TimeEstimate::Remaining(Duration::from_secs(120))
        );
    }
}
