//! Registry of backend agents and how each one is presented.

/// Display configuration for one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Key the backend uses in `agent_name`.
    pub key: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    /// Static placeholder shown until a live description arrives.
    pub description: &'static str,
    /// Whether the agent gets a card on the progress dashboard.
    pub displayed: bool,
}

pub const AGENTS: &[AgentConfig] = &[
    AgentConfig {
        key: "RiskAssessmentAgent",
        icon: "🎯",
        name: "Risk Assessment",
        description: "Analyzing location-specific threats and severity levels",
        displayed: true,
    },
    AgentConfig {
        key: "SupplyPlanningAgent",
        icon: "📦",
        name: "Supply Planning",
        description: "Creating budget-optimized supply checklist",
        displayed: true,
    },
    AgentConfig {
        key: "FinancialAdvisorAgent",
        icon: "💰",
        name: "Financial Advisor",
        description: "Building 30-day economic survival strategy",
        displayed: true,
    },
    AgentConfig {
        key: "ResourceLocatorAgent",
        icon: "📍",
        name: "Resource Locator",
        description: "Finding nearby emergency resources and services",
        displayed: true,
    },
    AgentConfig {
        key: "VideoCuratorAgent",
        icon: "🎥",
        name: "Video Curator",
        description: "Recommending relevant preparedness videos",
        displayed: true,
    },
    AgentConfig {
        key: "DocumentationAgent",
        icon: "📄",
        name: "Documentation",
        description: "Compiling complete plan and generating PDF",
        displayed: true,
    },
    AgentConfig {
        key: "CoordinatorAgent",
        icon: "🤖",
        name: "Coordinator",
        description: "Orchestrating all agents and managing workflow",
        displayed: false,
    },
];

/// Look up an agent by its backend key.
pub fn lookup(key: &str) -> Option<&'static AgentConfig> {
    AGENTS.iter().find(|a| a.key == key)
}

/// Agents that get a dashboard card, in display order.
pub fn displayed() -> impl Iterator<Item = &'static AgentConfig> {
    AGENTS.iter().filter(|a| a.displayed)
}
