//! Injection log models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Unit a dose was measured in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum DoseUnit {
    #[default]
    #[serde(rename = "mg")]
    Mg,
    #[serde(rename = "mcg")]
    Mcg,
    #[serde(rename = "ml", alias = "mL")]
    Ml,
    #[serde(rename = "units")]
    Units,
    #[serde(rename = "IU", alias = "iu")]
    Iu,
}

impl DoseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoseUnit::Mg => "mg",
            DoseUnit::Mcg => "mcg",
            DoseUnit::Ml => "ml",
            DoseUnit::Units => "units",
            DoseUnit::Iu => "IU",
        }
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoseUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mg" => Ok(DoseUnit::Mg),
            "mcg" | "µg" | "ug" => Ok(DoseUnit::Mcg),
            "ml" | "cc" => Ok(DoseUnit::Ml),
            "units" | "unit" | "u" => Ok(DoseUnit::Units),
            "iu" => Ok(DoseUnit::Iu),
            other => Err(format!("unknown dose unit: {}", other)),
        }
    }
}

/// A single logged injection. Immutable once logged; edits replace the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InjectionEntry {
    /// Creation-timestamp-derived identifier, never reused
    pub id: i64,
    /// Medication name (catalog key, not enforced)
    pub medication_name: String,
    pub dose_amount: f64,
    #[serde(default)]
    pub dose_unit: DoseUnit,
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Injection site (e.g., "Abdomen - Left")
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub side_effects: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl InjectionEntry {
    /// Build an entry from validated input and an assigned id.
    pub fn from_new(id: i64, new: NewInjection) -> Self {
        Self {
            id,
            medication_name: new.medication_name,
            dose_amount: new.dose_amount,
            dose_unit: new.dose_unit,
            date: dates::format_date(new.date),
            site: new.site,
            side_effects: new.side_effects,
            notes: new.notes,
        }
    }

    /// The injection date as a local calendar date, if it parses.
    pub fn local_date(&self) -> Option<NaiveDate> {
        dates::parse_local_date(&self.date)
    }
}

/// Validated input for a new injection.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInjection {
    pub medication_name: String,
    pub dose_amount: f64,
    pub dose_unit: DoseUnit,
    pub date: NaiveDate,
    pub site: String,
    pub side_effects: Vec<String>,
    pub notes: String,
}

impl NewInjection {
    /// Create input with required fields.
    pub fn new(medication_name: &str, dose_amount: f64, dose_unit: DoseUnit, date: NaiveDate) -> Self {
        Self {
            medication_name: medication_name.to_string(),
            dose_amount,
            dose_unit,
            date,
            site: String::new(),
            side_effects: Vec::new(),
            notes: String::new(),
        }
    }
}

/// Raw form input, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionForm {
    pub medication_name: String,
    pub dose_amount: String,
    pub dose_unit: String,
    pub date: String,
    pub site: String,
    pub side_effects: Vec<String>,
    pub notes: String,
}

impl InjectionForm {
    /// Parse the form. Returns `None` until every required field is valid.
    pub fn parse(&self) -> Option<NewInjection> {
        let medication_name = self.medication_name.trim();
        if medication_name.is_empty() {
            return None;
        }

        let dose_amount: f64 = self.dose_amount.trim().parse().ok()?;
        if !dose_amount.is_finite() || dose_amount <= 0.0 {
            return None;
        }

        let dose_unit = if self.dose_unit.trim().is_empty() {
            DoseUnit::default()
        } else {
            self.dose_unit.parse().ok()?
        };

        Some(NewInjection {
            medication_name: medication_name.to_string(),
            dose_amount,
            dose_unit,
            date: dates::parse_local_date(&self.date)?,
            site: self.site.trim().to_string(),
            side_effects: self
                .side_effects
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            notes: self.notes.trim().to_string(),
        })
    }
}
