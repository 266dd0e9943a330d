//! Body tracking models (weight, measurements, progress photos).

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Unit for body weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    #[default]
    Lbs,
}

impl WeightUnit {
    const LBS_PER_KG: f64 = 2.204_622_621_8;

    /// Convert a value in this unit to kilograms.
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value / Self::LBS_PER_KG,
        }
    }

    /// Convert kilograms to this unit.
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lbs => kg * Self::LBS_PER_KG,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" => Ok(WeightUnit::Kg),
            "lb" | "lbs" => Ok(WeightUnit::Lbs),
            other => Err(format!("unknown weight unit: {}", other)),
        }
    }
}

/// Unit for tape measurements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Cm,
    #[default]
    In,
}

/// A logged body weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: i64,
    pub date: String,
    pub weight: f64,
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub notes: String,
}

impl WeightEntry {
    pub fn local_date(&self) -> Option<NaiveDate> {
        dates::parse_local_date(&self.date)
    }
}

/// Raw weight form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightForm {
    pub date: String,
    pub weight: String,
    pub unit: String,
    pub notes: String,
}

impl WeightForm {
    /// Parse the form into `(date, weight, unit, notes)`. `None` until valid.
    pub fn parse(&self) -> Option<(NaiveDate, f64, WeightUnit, String)> {
        let weight: f64 = self.weight.trim().parse().ok()?;
        if !weight.is_finite() || weight <= 0.0 {
            return None;
        }
        let unit = if self.unit.trim().is_empty() {
            WeightUnit::default()
        } else {
            self.unit.parse().ok()?
        };
        Some((
            dates::parse_local_date(&self.date)?,
            weight,
            unit,
            self.notes.trim().to_string(),
        ))
    }
}

/// A set of tape measurements. Every measurement is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementEntry {
    pub id: i64,
    pub date: String,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub chest: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub neck: Option<f64>,
    pub unit: LengthUnit,
    pub notes: String,
}

impl MeasurementEntry {
    /// Waist-to-hip ratio when both are recorded.
    pub fn waist_to_hip(&self) -> Option<f64> {
        match (self.waist, self.hips) {
            (Some(w), Some(h)) if h > 0.0 => Some(w / h),
            _ => None,
        }
    }
}

/// A progress photo reference. The image itself lives outside the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPhoto {
    pub id: i64,
    pub date: String,
    /// Opaque image reference (file URI or data URL)
    pub uri: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
}
