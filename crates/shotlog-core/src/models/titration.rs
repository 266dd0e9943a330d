//! Titration plan models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DoseUnit;
use crate::dates;

/// One step of a titration plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitrationStep {
    pub dose: f64,
    #[serde(default)]
    pub unit: DoseUnit,
    /// How long this step lasts, in weeks (zero-length steps are skipped over)
    pub duration_weeks: u32,
}

impl TitrationStep {
    pub fn new(dose: f64, unit: DoseUnit, duration_weeks: u32) -> Self {
        Self {
            dose,
            unit,
            duration_weeks,
        }
    }
}

/// A planned dose escalation for one medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitrationPlan {
    pub id: i64,
    pub medication_name: String,
    /// Local calendar date the plan started, `YYYY-MM-DD`
    pub start_date: String,
    pub steps: Vec<TitrationStep>,
    #[serde(default)]
    pub notes: String,
}

/// Where a plan stands on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TitrationStatus {
    /// Zero-based index of the current step
    pub step_index: usize,
    /// One-based step number for display
    pub step_number: usize,
    pub total_steps: usize,
    pub dose: f64,
    pub unit: DoseUnit,
    /// Whole weeks since the plan started
    pub weeks_passed: i64,
    /// Whole weeks left in the current step (0 once completed)
    pub weeks_remaining: i64,
    /// Past the end of the last step; the last dose continues
    pub completed: bool,
}

impl TitrationPlan {
    /// Total planned weeks.
    pub fn total_weeks(&self) -> i64 {
        self.steps.iter().map(|s| i64::from(s.duration_weeks)).sum()
    }

    /// Resolve the current step on `today`.
    ///
    /// Zero-length steps are never current. Returns `None` if the plan has
    /// no steps or its start date does not parse.
    pub fn status_on(&self, today: NaiveDate) -> Option<TitrationStatus> {
        let last = self.steps.last()?;
        let start = dates::parse_local_date(&self.start_date)?;
        let weeks_passed = (dates::days_between(start, today) / 7).max(0);

        let mut cumulative = 0i64;
        for (index, step) in self.steps.iter().enumerate() {
            cumulative += i64::from(step.duration_weeks);
            if step.duration_weeks > 0 && weeks_passed <= cumulative {
                return Some(TitrationStatus {
                    step_index: index,
                    step_number: index + 1,
                    total_steps: self.steps.len(),
                    dose: step.dose,
                    unit: step.unit,
                    weeks_passed,
                    weeks_remaining: cumulative - weeks_passed,
                    completed: false,
                });
            }
        }

        Some(TitrationStatus {
            step_index: self.steps.len() - 1,
            step_number: self.steps.len(),
            total_steps: self.steps.len(),
            dose: last.dose,
            unit: last.unit,
            weeks_passed,
            weeks_remaining: 0,
            completed: true,
        })
    }
}
