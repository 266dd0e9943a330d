//! Decay, accumulation and phase classification.

use chrono::NaiveDateTime;

use super::EstimatorConfig;
use crate::dates;
use crate::models::{InjectionEntry, Phase};

/// Level at injection time.
pub const FULL_DOSE_PERCENT: f64 = 100.0;

/// Accumulated level above which a medication past its peak is still "Active".
const ACTIVE_LEVEL_PERCENT: f64 = 50.0;

/// Remaining level of a single dose `hours_elapsed` after injection.
///
/// `100 · 0.5^(h / half_life)` for `h ≥ 0`, zero before the injection.
/// A missing or non-positive half-life yields zero.
pub fn decay_level(hours_elapsed: f64, half_life_hours: Option<f64>) -> f64 {
    let half_life = match half_life_hours {
        Some(h) if h > 0.0 && h.is_finite() => h,
        _ => return 0.0,
    };
    if hours_elapsed < 0.0 || !hours_elapsed.is_finite() {
        return 0.0;
    }
    FULL_DOSE_PERCENT * 0.5f64.powf(hours_elapsed / half_life)
}

/// Summed level of `injections` at `at`.
///
/// Injections dated more than `window_days` before `at`, with unparseable
/// dates, or whose contribution falls below the floor are skipped. Every
/// injection is taken at local midnight of its date.
pub fn accumulated_level<'a, I>(
    injections: I,
    half_life_hours: Option<f64>,
    at: NaiveDateTime,
    config: &EstimatorConfig,
) -> f64
where
    I: IntoIterator<Item = &'a InjectionEntry>,
{
    let today = at.date();
    injections
        .into_iter()
        .filter_map(|injection| injection.local_date())
        .filter(|date| dates::days_between(*date, today) <= config.window_days)
        .map(|date| decay_level(dates::hours_between(dates::start_of_day(date), at), half_life_hours))
        .filter(|contribution| *contribution >= config.min_contribution_percent)
        .sum()
}

/// Classify the phase from hours since the most recent injection.
///
/// Hours drive the first two phases; past twice the peak time the
/// accumulated level decides between Active and Declining.
pub fn classify_phase(hours_since_last: f64, peak_hours: f64, level_percent: f64) -> Phase {
    if hours_since_last <= peak_hours {
        Phase::Absorption
    } else if hours_since_last <= 2.0 * peak_hours {
        Phase::PeakEffect
    } else if level_percent > ACTIVE_LEVEL_PERCENT {
        Phase::Active
    } else {
        Phase::Declining
    }
}
