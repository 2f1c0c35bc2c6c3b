//! Job status snapshots as reported by `GET /crisis/{task_id}/status`.

use serde::{Deserialize, Serialize};

/// Overall lifecycle state of a plan-generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[serde(alias = "initialized")]
    Pending,
    InProgress,
    /// Reported by the backend while the job row exists but no agent has
    /// written to the blackboard yet.
    Processing,
    Completed,
    Failed,
    /// Any value this client does not know about.
    #[serde(other)]
    Unrecognized,
}

impl JobState {
    /// `completed` and `failed` are terminal; no transitions follow them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Overall progress label shown above the progress bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Initializing...",
            Self::InProgress => "Analyzing your situation...",
            Self::Completed => "Analysis complete!",
            Self::Failed => "Error occurred",
            Self::Processing | Self::Unrecognized => "Processing...",
        }
    }
}

/// Per-agent lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Pending,
    Active,
    InProgress,
    Completed,
    Failed,
    Error,
    Skipped,
    #[serde(other)]
    Unrecognized,
}

impl Default for AgentState {
    fn default() -> Self {
        Self::Pending
    }
}

impl AgentState {
    /// Short status label for an agent card.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Waiting...",
            Self::Active | Self::InProgress => "Working...",
            Self::Completed => "Complete ✓",
            Self::Failed | Self::Error => "Error ✗",
            Self::Skipped => "Skipped",
            Self::Unrecognized => "Unknown",
        }
    }

    /// Styling class; `active` renders the same as `in_progress`.
    pub fn display_class(&self) -> AgentState {
        match self {
            Self::Active => Self::InProgress,
            other => *other,
        }
    }
}

/// Status of one backend agent within a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_name: String,
    #[serde(default)]
    pub status: AgentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task_description: Option<String>,
    /// Older backends report the live description under `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AgentStatus {
    pub fn new(agent_name: impl Into<String>, status: AgentState) -> Self {
        Self {
            agent_name: agent_name.into(),
            status,
            current_task_description: None,
            message: None,
            progress_percentage: None,
            error_message: None,
        }
    }

    /// The live task description, if the backend sent a non-empty one.
    pub fn live_description(&self) -> Option<&str> {
        self.current_task_description
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.is_empty()))
    }
}

/// One polled snapshot of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub status: JobState,
    #[serde(default)]
    progress_percentage: Option<f64>,
    #[serde(default)]
    pub agents: Vec<AgentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatus {
    pub fn new(status: JobState, progress: f64) -> Self {
        Self {
            task_id: None,
            status,
            progress_percentage: Some(progress),
            agents: Vec::new(),
            error: None,
        }
    }

    pub fn with_agent(mut self, agent: AgentStatus) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Overall progress clamped to 0–100; missing or null reads as 0.
    pub fn progress(&self) -> f64 {
        self.progress_percentage
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_status_payload_decodes() {
        let json = serde_json::json!({
            "task_id": "t-1",
            "status": "in_progress",
            "progress_percentage": 40,
            "agents": [
                {
                    "agent_name": "RiskAssessmentAgent",
                    "agent_type": "risk",
                    "status": "active",
                    "current_task_description": "Checking FEMA data",
                    "progress_percentage": null,
                    "started_at": "2025-10-28T14:32:00",
                    "completed_at": null,
                    "error_message": null
                }
            ],
            "estimated_completion_seconds": null
        });
        let status: JobStatus = serde_json::from_value(json).unwrap();
        assert_eq!(status.status, JobState::InProgress);
        assert_eq!(status.progress(), 40.0);
        assert_eq!(status.agents[0].status, AgentState::Active);
        assert_eq!(status.agents[0].progress_percentage, None);
        assert_eq!(status.agents[0].live_description(), Some("Checking FEMA data"));
    }

    #[test]
    fn unknown_values_do_not_fail_decoding() {
        let status: JobStatus = serde_json::from_value(serde_json::json!({
            "status": "rebalancing",
            "agents": [{"agent_name": "X", "status": "meditating"}]
        }))
        .unwrap();
        assert_eq!(status.status, JobState::Unrecognized);
        assert_eq!(status.status.label(), "Processing...");
        assert_eq!(status.agents[0].status, AgentState::Unrecognized);
        assert_eq!(status.progress(), 0.0);
    }

    #[test]
    fn initialized_reads_as_pending() {
        let state: JobState = serde_json::from_str("\"initialized\"").unwrap();
        assert_eq!(state, JobState::Pending);
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::InProgress.is_terminal());
        assert!(!JobState::Processing.is_terminal());
    }

    #[test]
    fn active_and_in_progress_share_label_and_class() {
        assert_eq!(AgentState::Active.label(), "Working...");
        assert_eq!(AgentState::InProgress.label(), "Working...");
        assert_eq!(AgentState::Active.display_class(), AgentState::InProgress);
        assert_eq!(AgentState::Error.label(), AgentState::Failed.label());
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(JobStatus::new(JobState::InProgress, 140.0).progress(), 100.0);
        assert_eq!(JobStatus::new(JobState::InProgress, -3.0).progress(), 0.0);
    }

    #[test]
    fn message_is_fallback_description() {
        let mut agent = AgentStatus::new("VideoCuratorAgent", AgentState::Active);
        agent.current_task_description = Some(String::new());
        agent.message = Some("Searching videos".into());
        assert_eq!(agent.live_description(), Some("Searching videos"));
    }
}
