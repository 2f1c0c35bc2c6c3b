//! Crisis profile data models.

use serde::{Deserialize, Serialize};

/// Budget tier sent alongside a financial situation in economic mode.
///
/// The backend requires the field on every profile but reads the financial
/// situation instead when the mode is `economic_crisis`.
pub const DEFAULT_ECONOMIC_BUDGET_TIER: u32 = 100;

/// Which kind of crisis the household is planning for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisMode {
    NaturalDisaster,
    EconomicCrisis,
}

impl std::fmt::Display for CrisisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NaturalDisaster => write!(f, "natural_disaster"),
            Self::EconomicCrisis => write!(f, "economic_crisis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    House,
    Apartment,
    MobileHome,
    Other,
}

impl HousingType {
    /// Parse the wire code used by the questionnaire radio buttons.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "house" => Some(Self::House),
            "apartment" => Some(Self::Apartment),
            "mobile_home" => Some(Self::MobileHome),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Apartment => "apartment",
            Self::MobileHome => "mobile_home",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Five-digit US ZIP code.
    pub zip_code: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub adults: u32,
    pub children: u32,
    pub pets: u32,
}

/// Monthly finances, only meaningful in economic mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSituation {
    pub current_income: f64,
    pub monthly_expenses: f64,
    pub available_savings: f64,
    pub debt_obligations: f64,
    pub employment_status: String,
}

/// The household's crisis profile, exactly as `POST /crisis/start` expects it.
///
/// Construct through [`CrisisProfile::natural_disaster`] or
/// [`CrisisProfile::economic_crisis`] so the branch selected by `crisis_mode`
/// is the one that carries real data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisProfile {
    pub crisis_mode: CrisisMode,
    /// Disaster type (natural mode) or employment-loss type (economic mode).
    pub specific_threat: String,
    pub location: Location,
    pub household: Household,
    pub housing_type: HousingType,
    pub budget_tier: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_situation: Option<FinancialSituation>,
}

impl CrisisProfile {
    pub fn natural_disaster(
        disaster_type: impl Into<String>,
        location: Location,
        household: Household,
        housing_type: HousingType,
        budget_tier: u32,
    ) -> Self {
        Self {
            crisis_mode: CrisisMode::NaturalDisaster,
            specific_threat: disaster_type.into(),
            location,
            household,
            housing_type,
            budget_tier,
            financial_situation: None,
        }
    }

    pub fn economic_crisis(
        crisis_type: impl Into<String>,
        location: Location,
        household: Household,
        housing_type: HousingType,
        financial_situation: FinancialSituation,
    ) -> Self {
        Self {
            crisis_mode: CrisisMode::EconomicCrisis,
            specific_threat: crisis_type.into(),
            location,
            household,
            housing_type,
            budget_tier: DEFAULT_ECONOMIC_BUDGET_TIER,
            financial_situation: Some(financial_situation),
        }
    }

    /// The budget tier when it is the authoritative branch.
    pub fn authoritative_budget_tier(&self) -> Option<u32> {
        match self.crisis_mode {
            CrisisMode::NaturalDisaster => Some(self.budget_tier),
            CrisisMode::EconomicCrisis => None,
        }
    }

    /// The financial situation when it is the authoritative branch.
    pub fn authoritative_finances(&self) -> Option<&FinancialSituation> {
        match self.crisis_mode {
            CrisisMode::NaturalDisaster => None,
            CrisisMode::EconomicCrisis => self.financial_situation.as_ref(),
        }
    }
}

/// Opaque identifier of one backend plan-generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miami() -> Location {
        Location {
            zip_code: "33139".into(),
            city: "Miami Beach".into(),
            state: "FL".into(),
        }
    }

    fn household() -> Household {
        Household {
            adults: 2,
            children: 1,
            pets: 0,
        }
    }

    #[test]
    fn natural_disaster_wire_shape() {
        let profile =
            CrisisProfile::natural_disaster("hurricane", miami(), household(), HousingType::Apartment, 200);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["crisis_mode"], "natural_disaster");
        assert_eq!(json["specific_threat"], "hurricane");
        assert_eq!(json["budget_tier"], 200);
        assert_eq!(json["housing_type"], "apartment");
        assert_eq!(json["location"]["zip_code"], "33139");
        assert_eq!(json["household"]["pets"], 0);
        assert!(json.get("financial_situation").is_none());
        assert_eq!(profile.authoritative_budget_tier(), Some(200));
        assert!(profile.authoritative_finances().is_none());
    }

    #[test]
    fn economic_crisis_wire_shape() {
        let finances = FinancialSituation {
            current_income: 0.0,
            monthly_expenses: 2500.0,
            available_savings: 1800.0,
            debt_obligations: 0.0,
            employment_status: "government_shutdown".into(),
        };
        let profile = CrisisProfile::economic_crisis(
            "government_shutdown",
            miami(),
            household(),
            HousingType::MobileHome,
            finances,
        );
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["crisis_mode"], "economic_crisis");
        assert_eq!(json["budget_tier"], DEFAULT_ECONOMIC_BUDGET_TIER);
        assert_eq!(json["housing_type"], "mobile_home");
        assert_eq!(json["financial_situation"]["current_income"], 0.0);
        assert_eq!(
            json["financial_situation"]["employment_status"],
            "government_shutdown"
        );
        assert!(profile.authoritative_budget_tier().is_none());
        assert!(profile.authoritative_finances().is_some());
    }

    #[test]
    fn housing_codes_match_serde() {
        for housing in [
            HousingType::House,
            HousingType::Apartment,
            HousingType::MobileHome,
            HousingType::Other,
        ] {
            let json = serde_json::to_string(&housing).unwrap();
            assert_eq!(json, format!("\"{}\"", housing.code()));
            assert_eq!(HousingType::from_code(housing.code()), Some(housing));
        }
        assert_eq!(HousingType::from_code("castle"), None);
    }

    #[test]
    fn task_handle_is_a_bare_string_on_the_wire() {
        let handle: TaskHandle = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(handle.as_str(), "abc-123");
        assert_eq!(serde_json::to_string(&handle).unwrap(), "\"abc-123\"");
    }
}
