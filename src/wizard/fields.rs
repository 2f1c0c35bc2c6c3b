//! Questionnaire fields: which step owns which field, the presence rule used
//! to gate transitions, and coercion of raw input into typed values.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crisis::CrisisMode;
use crate::error::{ValidationError, WizardError};

/// Raw field values keyed by field name.
pub type FieldMap = BTreeMap<String, Value>;

/// Field names as they appear in the questionnaire and the stored record.
pub mod names {
    pub const ZIP_CODE: &str = "zip_code";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ADULTS: &str = "adults";
    pub const CHILDREN: &str = "children";
    pub const PETS: &str = "pets";
    pub const HOUSING_TYPE: &str = "housing_type";
    pub const BUDGET_TIER: &str = "budget_tier";
    pub const CURRENT_INCOME: &str = "current_income";
    pub const MONTHLY_EXPENSES: &str = "monthly_expenses";
    pub const AVAILABLE_SAVINGS: &str = "available_savings";
    pub const DEBT_OBLIGATIONS: &str = "debt_obligations";
}

use names::*;

/// Number of steps in the questionnaire, review included.
pub const TOTAL_STEPS: u8 = 4;

/// The questionnaire steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Location,
    Household,
    /// Budget tier (natural disaster) or finances (economic crisis).
    Resources,
    Review,
}

impl WizardStep {
    /// 1-based step index.
    pub fn number(&self) -> u8 {
        match self {
            Self::Location => 1,
            Self::Household => 2,
            Self::Resources => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Location),
            2 => Some(Self::Household),
            3 => Some(Self::Resources),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_review(&self) -> bool {
        matches!(self, Self::Review)
    }

    pub fn title(&self, mode: CrisisMode) -> &'static str {
        match (self, mode) {
            (Self::Location, _) => "Location",
            (Self::Household, _) => "Household",
            (Self::Resources, CrisisMode::NaturalDisaster) => "Budget",
            (Self::Resources, CrisisMode::EconomicCrisis) => "Finances",
            (Self::Review, _) => "Review",
        }
    }

    /// Fields that must be present before leaving this step forward.
    pub fn required_fields(&self, mode: CrisisMode) -> &'static [&'static str] {
        match (self, mode) {
            (Self::Location, _) => &[ZIP_CODE, CITY, STATE],
            (Self::Household, _) => &[ADULTS, CHILDREN, PETS, HOUSING_TYPE],
            (Self::Resources, CrisisMode::NaturalDisaster) => &[BUDGET_TIER],
            (Self::Resources, CrisisMode::EconomicCrisis) => {
                &[CURRENT_INCOME, MONTHLY_EXPENSES, AVAILABLE_SAVINGS]
            }
            (Self::Review, _) => &[],
        }
    }

    /// Every field this step collects, required or not.
    pub fn fields(&self, mode: CrisisMode) -> &'static [&'static str] {
        match (self, mode) {
            (Self::Resources, CrisisMode::EconomicCrisis) => &[
                CURRENT_INCOME,
                MONTHLY_EXPENSES,
                AVAILABLE_SAVINGS,
                DEBT_OBLIGATIONS,
            ],
            _ => self.required_fields(mode),
        }
    }
}

/// A value is empty only if it is missing, `null`, or `""`. Numeric `0` is
/// a real answer.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Check the presence rule for every required field of `step`.
pub fn validate_step(
    step: WizardStep,
    mode: CrisisMode,
    fields: &FieldMap,
) -> Result<(), ValidationError> {
    let missing: Vec<String> = step
        .required_fields(mode)
        .iter()
        .filter(|name| is_empty(fields.get(**name)))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}$").expect("valid ZIP regex"));

/// Advisory ZIP message; never blocks a transition.
pub const ZIP_HINT: &str = "Please enter a valid 5-digit ZIP code";

/// `Some(hint)` when a present ZIP code is not five digits.
pub fn zip_code_hint(fields: &FieldMap) -> Option<&'static str> {
    let zip = text(fields.get(ZIP_CODE))?;
    (!zip.is_empty() && !ZIP_PATTERN.is_match(&zip)).then_some(ZIP_HINT)
}

/// Render a raw value as text: strings verbatim, numbers and booleans via
/// their JSON form. `None` for missing or `null`.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Required text field.
pub fn require_text(fields: &FieldMap, name: &str) -> Result<String, WizardError> {
    text(fields.get(name))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(name, "value is required"))
}

/// Non-negative whole number, from a JSON number or a numeric string.
pub fn require_count(fields: &FieldMap, name: &str) -> Result<u32, WizardError> {
    match fields.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| invalid(name, "expected a non-negative whole number")),
        Some(Value::String(s)) if !s.trim().is_empty() => s
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid(name, "expected a non-negative whole number")),
        _ => Err(invalid(name, "value is required")),
    }
}

/// Non-negative amount. Empty optional fields fall back to `default`.
pub fn amount(fields: &FieldMap, name: &str, default: Option<f64>) -> Result<f64, WizardError> {
    let parsed = match fields.get(name) {
        value if is_empty(value) => {
            return default.ok_or_else(|| invalid(name, "value is required"));
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| invalid(name, "expected a non-negative amount"))
}

fn invalid(field: &str, reason: &str) -> WizardError {
    WizardError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
