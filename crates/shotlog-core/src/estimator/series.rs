//! Daily level history for charting.

use chrono::{Duration, NaiveDate};

use super::{accumulated_level, EstimatorConfig};
use crate::dates;
use crate::models::{InjectionEntry, LevelPoint, LevelSeries, MedicationProfile};

/// Sample the accumulated level at local midnight of each day from
/// `today - series_days` through `today`. Days before the start of the
/// calendar are left out.
///
/// Each sample only sees injections dated on or before its own day and uses
/// the same accumulation as the live snapshot, so the curve ends where the
/// snapshot starts.
pub fn level_series<'a, I>(
    medication_name: &str,
    injections: I,
    profile: &MedicationProfile,
    today: NaiveDate,
    config: &EstimatorConfig,
) -> LevelSeries
where
    I: IntoIterator<Item = &'a InjectionEntry>,
{
    let dated: Vec<(NaiveDate, &InjectionEntry)> = injections
        .into_iter()
        .filter_map(|i| i.local_date().map(|d| (d, i)))
        .collect();

    let days = config.series_days.max(0);
    let points = (0..=days)
        .rev()
        .filter_map(|offset| today.checked_sub_signed(Duration::days(offset)))
        .map(|day| {
            let seen = dated
                .iter()
                .filter(|(date, _)| *date <= day)
                .map(|(_, injection)| *injection);
            LevelPoint {
                date: day,
                level: accumulated_level(
                    seen,
                    profile.half_life_hours,
                    dates::start_of_day(day),
                    config,
                ),
            }
        })
        .collect();

    LevelSeries {
        medication_name: medication_name.to_string(),
        color: profile.color.clone(),
        points,
    }
}
