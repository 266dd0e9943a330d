//! Journal and user profile models.

use serde::{Deserialize, Serialize};

use super::WeightUnit;

/// A daily check-in. Ratings run 1 (low) to 5 (high).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: i64,
    pub date: String,
    #[serde(default)]
    pub mood: Option<u8>,
    #[serde(default)]
    pub energy: Option<u8>,
    #[serde(default)]
    pub hunger: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JournalEntry {
    /// Clamp ratings into 1..=5.
    pub fn normalized(mut self) -> Self {
        self.mood = self.mood.map(|v| v.clamp(1, 5));
        self.energy = self.energy.map(|v| v.clamp(1, 5));
        self.hunger = self.hunger.map(|v| v.clamp(1, 5));
        self
    }
}

/// Single user profile. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub height_cm: Option<f64>,
    pub starting_weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub weight_unit: WeightUnit,
    pub start_date: Option<String>,
}

impl UserProfile {
    /// Body mass index for a weight given in the profile's unit.
    pub fn bmi(&self, weight: f64) -> Option<f64> {
        let height_m = self.height_cm.filter(|h| *h > 0.0)? / 100.0;
        Some(self.weight_unit.to_kg(weight) / (height_m * height_m))
    }

    /// Fraction of the way from starting weight to goal (may exceed 1.0).
    pub fn goal_progress(&self, current_weight: f64) -> Option<f64> {
        let start = self.starting_weight?;
        let goal = self.goal_weight?;
        let span = start - goal;
        if span.abs() < f64::EPSILON {
            return None;
        }
        Some((start - current_weight) / span)
    }
}
