//! Ranked per-medication insights.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::{accumulated_level, classify_phase, level_series, EstimatorConfig};
use crate::dates;
use crate::models::{
    Accumulation, InjectionEntry, LevelSeries, LevelSnapshot, MedicationCatalog, ScheduleRegistry,
};

/// Injections of one medication, in log order.
#[derive(Debug, Clone)]
pub struct MedicationGroup<'e> {
    pub medication_name: String,
    pub injections: Vec<&'e InjectionEntry>,
}

/// Group injections by medication name, keeping first-encounter order.
pub fn group_by_medication<'e, I>(injections: I) -> Vec<MedicationGroup<'e>>
where
    I: IntoIterator<Item = &'e InjectionEntry>,
{
    let mut index: HashMap<&'e str, usize> = HashMap::new();
    let mut groups: Vec<MedicationGroup<'e>> = Vec::new();

    for injection in injections {
        let slot = *index
            .entry(injection.medication_name.as_str())
            .or_insert_with(|| {
                groups.push(MedicationGroup {
                    medication_name: injection.medication_name.clone(),
                    injections: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].injections.push(injection);
    }

    groups
}

/// Builds level snapshots and series from the log, catalog and schedules.
pub struct InsightBuilder<'a> {
    catalog: &'a MedicationCatalog,
    schedules: &'a ScheduleRegistry,
    config: &'a EstimatorConfig,
}

impl<'a> InsightBuilder<'a> {
    /// Create a new insight builder.
    pub fn new(
        catalog: &'a MedicationCatalog,
        schedules: &'a ScheduleRegistry,
        config: &'a EstimatorConfig,
    ) -> Self {
        Self {
            catalog,
            schedules,
            config,
        }
    }

    /// One snapshot per medication injected within the trailing window,
    /// highest level first. Ties keep first-encounter order.
    pub fn build(&self, injections: &[InjectionEntry], now: NaiveDateTime) -> Vec<LevelSnapshot> {
        let today = now.date();
        let recent = injections.iter().filter(|i| self.in_window(i, today));

        let mut snapshots: Vec<LevelSnapshot> = group_by_medication(recent)
            .iter()
            .filter_map(|group| self.snapshot(group, now))
            .collect();

        // sort_by is stable, so equal levels stay in encounter order
        snapshots.sort_by(|a, b| {
            b.current_level_percent
                .partial_cmp(&a.current_level_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            medications = snapshots.len(),
            considered = injections.len(),
            "built level insights"
        );
        snapshots
    }

    /// Snapshot for a single group of in-window injections.
    pub fn snapshot(
        &self,
        group: &MedicationGroup<'_>,
        now: NaiveDateTime,
    ) -> Option<LevelSnapshot> {
        let last_injection_date = group
            .injections
            .iter()
            .filter_map(|i| i.local_date())
            .max()?;

        let profile = self.catalog.profile_or_generic(&group.medication_name);
        let current_level_percent = accumulated_level(
            group.injections.iter().copied(),
            profile.half_life_hours,
            now,
            self.config,
        );
        let hours_since_last_injection =
            dates::hours_between(dates::start_of_day(last_injection_date), now);
        let phase = classify_phase(
            hours_since_last_injection,
            profile.peak_hours,
            current_level_percent,
        );
        let phase_description = self
            .catalog
            .effect_profile(&profile.category)
            .describe(phase)
            .to_string();
        let next_injection = self
            .schedules
            .get(&group.medication_name)
            .and_then(|schedule| schedule.project(last_injection_date, now.date()));

        Some(LevelSnapshot {
            medication_name: group.medication_name.clone(),
            category: profile.category,
            color: profile.color,
            current_level_percent,
            phase,
            phase_description,
            accumulation: Accumulation::from_level(current_level_percent),
            last_injection_date,
            hours_since_last_injection,
            injection_count: group.injections.len(),
            next_injection,
        })
    }

    /// Level series for one medication over the configured history.
    pub fn series_for(
        &self,
        medication_name: &str,
        injections: &[InjectionEntry],
        today: NaiveDate,
    ) -> LevelSeries {
        let profile = self.catalog.profile_or_generic(medication_name);
        let own = injections
            .iter()
            .filter(|i| i.medication_name == medication_name);
        level_series(medication_name, own, &profile, today, self.config)
    }

    /// Level series for every medication in the insight list, in the same order.
    pub fn all_series(
        &self,
        injections: &[InjectionEntry],
        now: NaiveDateTime,
    ) -> Vec<LevelSeries> {
        self.build(injections, now)
            .iter()
            .map(|snapshot| self.series_for(&snapshot.medication_name, injections, now.date()))
            .collect()
    }

    fn in_window(&self, injection: &InjectionEntry, today: NaiveDate) -> bool {
        match injection.local_date() {
            Some(date) => {
                let age = dates::days_between(date, today);
                (0..=self.config.window_days).contains(&age)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoseUnit, Phase, ScheduleEntry};

    fn injection(id: i64, name: &str, date: &str) -> InjectionEntry {
        InjectionEntry {
            id,
            medication_name: name.into(),
            dose_amount: 1.0,
            dose_unit: DoseUnit::Mg,
            date: date.into(),
            site: String::new(),
            side_effects: vec![],
            notes: String::new(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_group_keeps_encounter_order() {
        let log = vec![
            injection(1, "B", "2024-01-01"),
            injection(2, "A", "2024-01-02"),
            injection(3, "B", "2024-01-03"),
        ];
        let groups = group_by_medication(&log);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].medication_name, "B");
        assert_eq!(groups[0].injections.len(), 2);
        assert_eq!(groups[1].medication_name, "A");
    }

    #[test]
    fn test_sorted_by_level_descending() {
        let catalog = MedicationCatalog::new();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![
            injection(1, "BPC-157", "2024-01-10"),
            injection(2, "Semaglutide", "2024-01-08"),
            injection(3, "Tirzepatide", "2024-01-10"),
        ];
        let insights = builder.build(&log, at(2024, 1, 10, 12));

        let names: Vec<&str> = insights.iter().map(|s| s.medication_name.as_str()).collect();
        assert_eq!(names, vec!["Tirzepatide", "Semaglutide", "BPC-157"]);
        for pair in insights.windows(2) {
            assert!(pair[0].current_level_percent >= pair[1].current_level_percent);
        }
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let catalog = MedicationCatalog::empty();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        // Unknown medications have no half-life, so every level is 0
        let log = vec![
            injection(1, "Zeta", "2024-01-01"),
            injection(2, "Alpha", "2024-01-02"),
            injection(3, "Mid", "2024-01-03"),
        ];
        let insights = builder.build(&log, at(2024, 1, 5, 0));
        let names: Vec<&str> = insights.iter().map(|s| s.medication_name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
        assert!(insights.iter().all(|s| s.current_level_percent == 0.0));
        assert!(insights.iter().all(|s| s.color == crate::models::DEFAULT_COLOR));
    }

    #[test]
    fn test_excludes_injections_outside_window() {
        let catalog = MedicationCatalog::new();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![
            injection(1, "Semaglutide", "2023-11-01"),
            injection(2, "Tirzepatide", "2024-01-01"),
            injection(3, "HCG", "bogus"),
            injection(4, "HCG", "2024-02-01"),
        ];
        let insights = builder.build(&log, at(2024, 1, 10, 0));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].medication_name, "Tirzepatide");
    }

    #[test]
    fn test_snapshot_fields() {
        let catalog = MedicationCatalog::new();
        let mut schedules = ScheduleRegistry::new();
        schedules.upsert(ScheduleEntry::new("Tirzepatide", 7, 1));
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![
            injection(1, "Tirzepatide", "2024-01-01"),
            injection(2, "Tirzepatide", "2024-01-06"),
        ];
        let insights = builder.build(&log, at(2024, 1, 6, 0));
        let snapshot = &insights[0];

        assert_eq!(snapshot.last_injection_date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(snapshot.hours_since_last_injection, 0.0);
        assert!((snapshot.current_level_percent - 150.0).abs() < 1e-9);
        assert_eq!(snapshot.accumulation, Accumulation::SteadyState);
        assert_eq!(snapshot.phase, Phase::Absorption);
        assert_eq!(snapshot.injection_count, 2);
        assert_eq!(snapshot.category, "GLP-1");

        let next = snapshot.next_injection.as_ref().unwrap();
        assert_eq!(next.date, NaiveDate::from_ymd_opt(2024, 1, 13).unwrap());
        assert_eq!(next.days_until, 7);
    }

    #[test]
    fn test_snapshot_describes_phase_for_category() {
        let catalog = MedicationCatalog::new();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![
            injection(1, "Semaglutide", "2024-01-09"),
            injection(2, "Unknown Compound", "2024-01-09"),
        ];
        let insights = builder.build(&log, at(2024, 1, 10, 0));
        assert_eq!(insights.len(), 2);

        for snapshot in &insights {
            let expected = catalog
                .effect_profile(&snapshot.category)
                .describe(snapshot.phase);
            assert!(!snapshot.phase_description.is_empty());
            assert_eq!(snapshot.phase_description, expected);
        }

        let semaglutide = insights
            .iter()
            .find(|s| s.medication_name == "Semaglutide")
            .unwrap();
        let unknown = insights
            .iter()
            .find(|s| s.medication_name == "Unknown Compound")
            .unwrap();
        assert_eq!(
            semaglutide.phase_description,
            catalog.effect_profile("GLP-1").describe(semaglutide.phase)
        );
        assert_eq!(
            unknown.phase_description,
            catalog.effect_profile("no such category").describe(unknown.phase)
        );
    }

    #[test]
    fn test_no_schedule_no_projection() {
        let catalog = MedicationCatalog::new();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![injection(1, "Semaglutide", "2024-01-01")];
        let insights = builder.build(&log, at(2024, 1, 2, 0));
        assert!(insights[0].next_injection.is_none());
    }

    #[test]
    fn test_all_series_follows_insight_order() {
        let catalog = MedicationCatalog::new();
        let schedules = ScheduleRegistry::new();
        let config = EstimatorConfig::default();
        let builder = InsightBuilder::new(&catalog, &schedules, &config);

        let log = vec![
            injection(1, "BPC-157", "2024-01-10"),
            injection(2, "Semaglutide", "2024-01-09"),
        ];
        let series = builder.all_series(&log, at(2024, 1, 10, 6));
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].medication_name, "Semaglutide");
        assert_eq!(series[1].medication_name, "BPC-157");
        assert_eq!(series[0].points.len(), 15);
    }
}
