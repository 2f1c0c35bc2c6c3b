//! Human-readable review of everything the wizard collected.

use std::fmt;

use crate::crisis::{CrisisMode, HousingType};

use super::fields::{self, FieldMap, names};
use super::record::WizardRecord;

/// Display name for a housing code; unknown codes are shown as-is.
pub fn housing_display(code: &str) -> String {
    match HousingType::from_code(code) {
        Some(HousingType::House) => "Single-family Home".into(),
        Some(HousingType::Apartment) => "Apartment/Condo".into(),
        Some(HousingType::MobileHome) => "Mobile Home/Trailer".into(),
        Some(HousingType::Other) => "Other".into(),
        None => code.to_string(),
    }
}

pub fn disaster_display(code: &str) -> String {
    match code {
        "hurricane" => "Hurricane",
        "earthquake" => "Earthquake",
        "wildfire" => "Wildfire",
        "flood" => "Flood",
        "tornado" => "Tornado",
        "blizzard" => "Blizzard",
        other => other,
    }
    .to_string()
}

pub fn crisis_display(code: &str) -> String {
    match code {
        "unemployment" => "Unemployment",
        "furlough" => "Furlough",
        "government_shutdown" => "Government Shutdown",
        "layoff" => "Layoff",
        "reduced_hours" => "Reduced Hours",
        "other" => "Other Economic Hardship",
        other => other,
    }
    .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
}

/// Rows shown on the review step, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewSummary {
    pub rows: Vec<SummaryRow>,
}

impl ReviewSummary {
    pub fn build(record: &WizardRecord) -> Self {
        let f = &record.fields;
        let mut rows = vec![
            SummaryRow {
                label: "Location",
                value: format!(
                    "{}, {} {}",
                    show(f, names::CITY),
                    show(f, names::STATE),
                    show(f, names::ZIP_CODE)
                ),
            },
            SummaryRow {
                label: "Household",
                value: format!(
                    "{} adult(s), {} child(ren), {} pet(s)",
                    show(f, names::ADULTS),
                    show(f, names::CHILDREN),
                    show(f, names::PETS)
                ),
            },
            SummaryRow {
                label: "Housing",
                value: housing_display(&show(f, names::HOUSING_TYPE)),
            },
        ];

        match record.crisis_mode {
            CrisisMode::NaturalDisaster => {
                rows.push(SummaryRow {
                    label: "Disaster Type",
                    value: disaster_display(&record.specific_threat),
                });
                rows.push(SummaryRow {
                    label: "Budget",
                    value: format!("${} Tier", show(f, names::BUDGET_TIER)),
                });
            }
            CrisisMode::EconomicCrisis => {
                rows.push(SummaryRow {
                    label: "Crisis Type",
                    value: crisis_display(&record.specific_threat),
                });
                rows.push(SummaryRow {
                    label: "Current Income",
                    value: format!("{}/month", money(f, names::CURRENT_INCOME)),
                });
                rows.push(SummaryRow {
                    label: "Monthly Expenses",
                    value: money(f, names::MONTHLY_EXPENSES),
                });
                rows.push(SummaryRow {
                    label: "Savings",
                    value: money(f, names::AVAILABLE_SAVINGS),
                });
            }
        }

        Self { rows }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

impl fmt::Display for ReviewSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}: {}", row.label, row.value)?;
        }
        Ok(())
    }
}

fn show(fields: &FieldMap, name: &str) -> String {
    fields::text(fields.get(name)).unwrap_or_default()
}

fn money(fields: &FieldMap, name: &str) -> String {
    match fields::amount(fields, name, None) {
        Ok(value) => format!("${value:.2}"),
        Err(_) => format!("${}", show(fields, name)),
    }
}
