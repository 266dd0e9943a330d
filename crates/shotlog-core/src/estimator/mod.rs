//! Medication level estimation.
//!
//! Pipeline: Injection Log → Window/Group → Decay + Accumulate → Phase → Rank
//!
//! Levels use single-compartment exponential decay with each dose normalized
//! to 100 at injection time. Contributions from every dose in the trailing
//! window are summed, so repeated dosing can push the total past 100.

mod insights;
mod level;
mod series;

pub use insights::*;
pub use level::*;
pub use series::*;

use serde::{Deserialize, Serialize};

/// Default trailing window of injections considered, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Default floor below which a single dose's contribution is dropped, in percentage points.
pub const DEFAULT_MIN_CONTRIBUTION_PERCENT: f64 = 0.1;

/// Default number of days of history in a level series.
pub const DEFAULT_SERIES_DAYS: i64 = 14;

/// Tunable constants of the estimator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Injections older than this many days are ignored
    pub window_days: i64,
    /// Per-dose contributions below this are dropped
    pub min_contribution_percent: f64,
    /// Days of history before today in a level series
    pub series_days: i64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            min_contribution_percent: DEFAULT_MIN_CONTRIBUTION_PERCENT,
            series_days: DEFAULT_SERIES_DAYS,
        }
    }
}
