//! The finished plan returned by `GET /crisis/{task_id}/result`.
//!
//! Sections the client reads are typed; everything else is kept verbatim in
//! the `extra` maps so nothing the backend sends is lost. Section bodies are
//! written by the backend's agents and are not strictly shaped, so a section
//! that does not match its type is kept as [`Section::Raw`] instead of
//! failing the whole result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub task_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub crisis_profile: Option<Value>,
    #[serde(default)]
    pub risk_assessment: Option<Section<RiskAssessment>>,
    #[serde(default)]
    pub supply_plan: Option<Section<SupplyPlan>>,
    /// Economic crisis mode only.
    #[serde(default)]
    pub economic_plan: Option<Section<EconomicPlan>>,
    #[serde(default)]
    pub resource_locations: Option<Section<Vec<ResourceLocation>>>,
    #[serde(default)]
    pub video_recommendations: Option<Section<Vec<VideoRecommendation>>>,
    #[serde(default)]
    pub complete_plan: Option<Value>,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub total_tokens_used: Option<u64>,
    #[serde(default)]
    pub total_cost_estimate: Option<f64>,
    #[serde(default)]
    pub agents_completed: Vec<String>,
    #[serde(default)]
    pub agents_failed: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A plan section: typed when it has the expected shape, raw JSON otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Typed(T),
    Raw(Value),
}

impl<T> Section<T> {
    pub fn typed(&self) -> Option<&T> {
        match self {
            Self::Typed(t) => Some(t),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl PlanResult {
    pub fn is_economic(&self) -> bool {
        self.economic_plan.is_some()
    }

    pub fn has_pdf(&self) -> bool {
        self.pdf_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub overall_risk_level: Option<String>,
    #[serde(default)]
    pub overall_severity_score: Option<f64>,
    #[serde(default)]
    pub evacuation_recommended: bool,
    #[serde(default)]
    pub time_sensitive: bool,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyPlan {
    #[serde(default)]
    pub recommended_tier: Option<String>,
    /// Keyed by tier name: `critical`, `prepared`, `comprehensive`.
    #[serde(default)]
    pub tiers: BTreeMap<String, SupplyTier>,
    #[serde(default)]
    pub budget_warning: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupplyPlan {
    /// Tiers whose total cost fits in the given budget.
    pub fn tiers_within(&self, budget: f64) -> impl Iterator<Item = (&String, &SupplyTier)> {
        self.tiers
            .iter()
            .filter(move |(_, tier)| tier.total_cost.is_some_and(|c| c <= budget))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyTier {
    #[serde(default)]
    pub items: Vec<SupplyItem>,
    #[serde(default)]
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub estimated_price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicPlan {
    #[serde(default)]
    pub financial_summary: Option<Value>,
    /// `must_pay`, `defer`, `eliminate`.
    #[serde(default)]
    pub expense_categories: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    pub daily_actions: Vec<DailyAction>,
    #[serde(default)]
    pub eligible_benefits: Vec<Value>,
    #[serde(default)]
    pub hardship_letters: Vec<Value>,
    #[serde(default)]
    pub survival_outlook: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAction {
    pub day: ActionDay,
    pub action: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub time_required: Option<String>,
}

/// A day number, or a span such as `"1-3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionDay {
    Day(u32),
    Span(String),
}

impl fmt::Display for ActionDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(d) => write!(f, "Day {d}"),
            Self::Span(s) => write!(f, "Days {s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLocation {
    pub name: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecommendation {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub duration_formatted: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
