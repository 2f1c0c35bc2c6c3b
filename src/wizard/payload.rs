//! Turn an accumulated wizard record into the `POST /crisis/start` body.

use crate::crisis::{CrisisMode, CrisisProfile, FinancialSituation, Household, HousingType, Location};
use crate::error::{ValidationError, WizardError};

use super::fields::{self, WizardStep, names};
use super::record::WizardRecord;

/// Build the crisis profile. The crisis mode picks the authoritative branch:
/// budget tier for natural disasters, financial situation for economic crises.
pub fn build_profile(record: &WizardRecord) -> Result<CrisisProfile, WizardError> {
    let mode = record.crisis_mode;
    let missing: Vec<String> = [WizardStep::Location, WizardStep::Household, WizardStep::Resources]
        .into_iter()
        .filter_map(|step| fields::validate_step(step, mode, &record.fields).err())
        .flat_map(|e| e.missing)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError { missing }.into());
    }

    let f = &record.fields;
    let location = Location {
        zip_code: fields::require_text(f, names::ZIP_CODE)?,
        city: fields::require_text(f, names::CITY)?,
        state: fields::require_text(f, names::STATE)?,
    };
    let household = Household {
        adults: fields::require_count(f, names::ADULTS)?,
        children: fields::require_count(f, names::CHILDREN)?,
        pets: fields::require_count(f, names::PETS)?,
    };
    let housing_code = fields::require_text(f, names::HOUSING_TYPE)?;
    let housing_type = HousingType::from_code(&housing_code).ok_or_else(|| WizardError::InvalidField {
        field: names::HOUSING_TYPE.to_string(),
        reason: format!("unknown housing type '{housing_code}'"),
    })?;

    let profile = match mode {
        CrisisMode::NaturalDisaster => CrisisProfile::natural_disaster(
            record.specific_threat.clone(),
            location,
            household,
            housing_type,
            fields::require_count(f, names::BUDGET_TIER)?,
        ),
        CrisisMode::EconomicCrisis => CrisisProfile::economic_crisis(
            record.specific_threat.clone(),
            location,
            household,
            housing_type,
            FinancialSituation {
                current_income: fields::amount(f, names::CURRENT_INCOME, None)?,
                monthly_expenses: fields::amount(f, names::MONTHLY_EXPENSES, None)?,
                available_savings: fields::amount(f, names::AVAILABLE_SAVINGS, None)?,
                debt_obligations: fields::amount(f, names::DEBT_OBLIGATIONS, Some(0.0))?,
                employment_status: record.specific_threat.clone(),
            },
        ),
    };
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::crisis::DEFAULT_ECONOMIC_BUDGET_TIER;

    fn base(mode: CrisisMode, threat: &str) -> WizardRecord {
        let mut record = WizardRecord::new(mode, threat);
        for (k, v) in [
            (names::ZIP_CODE, json!("94103")),
            (names::CITY, json!("San Francisco")),
            (names::STATE, json!("CA")),
            (names::ADULTS, json!("2")),
            (names::CHILDREN, json!(0)),
            (names::PETS, json!(1)),
            (names::HOUSING_TYPE, json!("house")),
        ] {
            record.fields.insert(k.into(), v);
        }
        record
    }

    #[test]
    fn natural_disaster_sends_budget_tier_only() {
        let mut record = base(CrisisMode::NaturalDisaster, "earthquake");
        record.fields.insert(names::BUDGET_TIER.into(), json!("150"));

        let profile = build_profile(&record).unwrap();
        assert_eq!(profile.authoritative_budget_tier(), Some(150));
        assert_eq!(profile.household.adults, 2);
        assert_eq!(profile.specific_threat, "earthquake");

        let wire = serde_json::to_value(&profile).unwrap();
        assert_eq!(wire["budget_tier"], json!(150));
        assert!(wire.get("financial_situation").is_none());
    }

    #[test]
    fn economic_crisis_sends_finances_and_sentinel_tier() {
        let mut record = base(CrisisMode::EconomicCrisis, "furlough");
        record.fields.insert(names::CURRENT_INCOME.into(), json!(0));
        record.fields.insert(names::MONTHLY_EXPENSES.into(), json!(3100.0));
        record.fields.insert(names::AVAILABLE_SAVINGS.into(), json!("5000"));

        let profile = build_profile(&record).unwrap();
        assert_eq!(profile.budget_tier, DEFAULT_ECONOMIC_BUDGET_TIER);
        assert_eq!(profile.authoritative_budget_tier(), None);
        let finances = profile.authoritative_finances().unwrap();
        assert_eq!(finances.current_income, 0.0);
        assert_eq!(finances.debt_obligations, 0.0);
        assert_eq!(finances.employment_status, "furlough");
    }

    #[test]
    fn missing_fields_across_steps_are_collected() {
        let mut record = base(CrisisMode::EconomicCrisis, "layoff");
        record.fields.remove(names::CITY);
        let err = build_profile(&record).unwrap_err();
        match err {
            WizardError::Validation(v) => {
                assert_eq!(v.missing[0], names::CITY);
                assert!(v.missing.contains(&names::CURRENT_INCOME.to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bad_values_are_invalid_fields() {
        let mut record = base(CrisisMode::NaturalDisaster, "flood");
        record.fields.insert(names::BUDGET_TIER.into(), json!(100));
        record.fields.insert(names::HOUSING_TYPE.into(), json!("castle"));
        assert!(matches!(
            build_profile(&record),
            Err(WizardError::InvalidField { field, .. }) if field == names::HOUSING_TYPE
        ));

        record.fields.insert(names::HOUSING_TYPE.into(), json!("house"));
        record.fields.insert(names::ADULTS.into(), json!("two"));
        assert!(matches!(
            build_profile(&record),
            Err(WizardError::InvalidField { field, .. }) if field == names::ADULTS
        ));
    }
}
