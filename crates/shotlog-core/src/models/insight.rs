//! Derived, never-persisted views over the injection log.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Qualitative phase since the most recent injection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    Absorption,
    PeakEffect,
    Active,
    Declining,
}

impl Phase {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Absorption => "Absorption",
            Phase::PeakEffect => "Peak Effect",
            Phase::Active => "Active",
            Phase::Declining => "Declining",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How much repeated dosing has stacked up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Accumulation {
    /// Below 100%
    Normal,
    /// 100% up to 150%
    BuildingUp,
    /// 150% and above
    SteadyState,
}

impl Accumulation {
    pub fn from_level(level_percent: f64) -> Self {
        if level_percent >= 150.0 {
            Accumulation::SteadyState
        } else if level_percent >= 100.0 {
            Accumulation::BuildingUp
        } else {
            Accumulation::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Accumulation::Normal => "Normal",
            Accumulation::BuildingUp => "Building Up",
            Accumulation::SteadyState => "Steady State",
        }
    }
}

/// When the next dose is expected, relative to today.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoseProjection {
    pub date: NaiveDate,
    /// Whole days from today (negative when overdue)
    pub days_until: i64,
    pub is_overdue: bool,
    pub is_due_today: bool,
}

/// Estimated state of one medication at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelSnapshot {
    pub medication_name: String,
    pub category: String,
    pub color: String,
    /// Accumulated level; 100 = one fresh dose, may exceed 100
    pub current_level_percent: f64,
    pub phase: Phase,
    /// What the medication's category typically feels like in this phase
    pub phase_description: String,
    pub accumulation: Accumulation,
    pub last_injection_date: NaiveDate,
    pub hours_since_last_injection: f64,
    /// Injections inside the trailing window
    pub injection_count: usize,
    /// Present only when a schedule exists for the medication
    pub next_injection: Option<DoseProjection>,
}

/// One sample of a level curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LevelPoint {
    pub date: NaiveDate,
    pub level: f64,
}

/// Daily level curve for one medication, oldest sample first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LevelSeries {
    pub medication_name: String,
    pub color: String,
    pub points: Vec<LevelPoint>,
}

impl LevelSeries {
    /// Highest sampled level (0 for an empty series).
    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.level).fold(0.0, f64::max)
    }
}
