//! Golden tests for the level estimator.
//!
//! Fixed cases for decay, accumulation, phase and projection, plus
//! property checks over generated injection logs.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use shotlog_core::dates;
use shotlog_core::estimator::{accumulated_level, classify_phase, decay_level, EstimatorConfig};
use shotlog_core::models::{
    DoseUnit, InjectionEntry, MedicationCatalog, NewInjection, Phase, ScheduleEntry,
    ScheduleRegistry,
};
use shotlog_core::InsightBuilder;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn midnight(s: &str) -> NaiveDateTime {
    dates::start_of_day(date(s))
}

fn injection(id: i64, name: &str, day: NaiveDate) -> InjectionEntry {
    InjectionEntry::from_new(id, NewInjection::new(name, 1.0, DoseUnit::Mg, day))
}

/// Single-dose decay case.
struct DecayCase {
    id: &'static str,
    hours: f64,
    half_life: Option<f64>,
    expected: f64,
}

fn get_decay_cases() -> Vec<DecayCase> {
    vec![
        DecayCase { id: "before-injection", hours: -1.0, half_life: Some(168.0), expected: 0.0 },
        DecayCase { id: "at-injection", hours: 0.0, half_life: Some(168.0), expected: 100.0 },
        DecayCase { id: "one-half-life", hours: 168.0, half_life: Some(168.0), expected: 50.0 },
        DecayCase { id: "two-half-lives", hours: 336.0, half_life: Some(168.0), expected: 25.0 },
        DecayCase { id: "short-peptide", hours: 4.0, half_life: Some(4.0), expected: 50.0 },
        DecayCase { id: "unknown-half-life", hours: 12.0, half_life: None, expected: 0.0 },
        DecayCase { id: "zero-half-life", hours: 12.0, half_life: Some(0.0), expected: 0.0 },
        DecayCase { id: "negative-half-life", hours: 12.0, half_life: Some(-5.0), expected: 0.0 },
    ]
}

#[test]
fn test_decay_golden_cases() {
    for case in get_decay_cases() {
        let actual = decay_level(case.hours, case.half_life);
        assert!(
            (actual - case.expected).abs() < 1e-9,
            "Case {}: expected {}, got {}",
            case.id, case.expected, actual
        );
    }
}

/// Phase classification case; peak time is 48 hours throughout.
struct PhaseCase {
    id: &'static str,
    hours: f64,
    level: f64,
    expected: Phase,
}

fn get_phase_cases() -> Vec<PhaseCase> {
    vec![
        PhaseCase { id: "absorbing", hours: 30.0, level: 80.0, expected: Phase::Absorption },
        PhaseCase { id: "at-peak", hours: 48.0, level: 80.0, expected: Phase::Absorption },
        PhaseCase { id: "peak-window", hours: 60.0, level: 70.0, expected: Phase::PeakEffect },
        PhaseCase { id: "end-of-peak", hours: 96.0, level: 70.0, expected: Phase::PeakEffect },
        PhaseCase { id: "declining", hours: 200.0, level: 10.0, expected: Phase::Declining },
        PhaseCase { id: "still-active", hours: 200.0, level: 60.0, expected: Phase::Active },
        PhaseCase { id: "exactly-half", hours: 200.0, level: 50.0, expected: Phase::Declining },
    ]
}

#[test]
fn test_phase_golden_cases() {
    for case in get_phase_cases() {
        assert_eq!(
            classify_phase(case.hours, 48.0, case.level),
            case.expected,
            "Case {}: phase mismatch",
            case.id
        );
    }
}

#[test]
fn test_two_doses_one_half_life_apart() {
    let log = vec![
        injection(1, "Semaglutide", date("2024-01-01")),
        injection(2, "Semaglutide", date("2024-01-08")),
    ];
    let level = accumulated_level(&log, Some(168.0), midnight("2024-01-08"), &EstimatorConfig::default());
    assert!((level - 150.0).abs() < 1e-9, "got {}", level);
}

#[test]
fn test_window_excludes_old_doses() {
    let log = vec![injection(1, "Semaglutide", date("2024-01-01"))];
    let config = EstimatorConfig::default();

    let inside = accumulated_level(&log, Some(168.0), midnight("2024-01-31"), &config);
    assert!(inside > 0.0);

    let outside = accumulated_level(&log, Some(168.0), midnight("2024-02-01"), &config);
    assert_eq!(outside, 0.0);
}

#[test]
fn test_schedule_projection_example() {
    let schedule = ScheduleEntry::new("Semaglutide", 7, 1);
    let projection = schedule.project(date("2024-01-01"), date("2024-01-10")).unwrap();

    assert_eq!(projection.date, date("2024-01-08"));
    assert_eq!(projection.days_until, -2);
    assert!(projection.is_overdue);
    assert!(!projection.is_due_today);
}

#[test]
fn test_local_date_parse() {
    let parsed = dates::parse_local_date("2024-03-01").unwrap();
    assert_eq!(parsed, date("2024-03-01"));
    assert_eq!(dates::start_of_day(parsed), date("2024-03-01").and_hms_opt(0, 0, 0).unwrap());
}

#[test]
fn test_insights_ranked_by_level() {
    let catalog = MedicationCatalog::new();
    let mut schedules = ScheduleRegistry::new();
    schedules.upsert(ScheduleEntry::new("Tirzepatide", 7, 0));
    let config = EstimatorConfig::default();

    let log = vec![
        injection(1, "BPC-157", date("2024-01-09")),
        injection(2, "Tirzepatide", date("2024-01-08")),
        injection(3, "Tirzepatide", date("2024-01-01")),
        injection(4, "Unknown Compound", date("2024-01-09")),
    ];

    let insights = InsightBuilder::new(&catalog, &schedules, &config).build(&log, midnight("2024-01-10"));
    let names: Vec<&str> = insights.iter().map(|s| s.medication_name.as_str()).collect();

    // Tirzepatide stacks two doses; BPC-157 decays within hours; the unknown
    // compound has no half-life and sits at zero
    assert_eq!(names, vec!["Tirzepatide", "BPC-157", "Unknown Compound"]);
    assert_eq!(insights[0].injection_count, 2);
    assert!(insights[0].next_injection.is_some());
    assert!(insights[1].next_injection.is_none());
    assert_eq!(insights[2].current_level_percent, 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: nothing is left before the injection happens
    #[test]
    fn prop_negative_time_is_zero(hours in -10_000.0f64..-0.000_001, half_life in 0.5f64..500.0) {
        prop_assert_eq!(decay_level(hours, Some(half_life)), 0.0);
    }

    /// Property: a single dose never exceeds 100 and never goes negative
    #[test]
    fn prop_single_dose_bounded(hours in 0.0f64..10_000.0, half_life in 0.5f64..500.0) {
        let level = decay_level(hours, Some(half_life));
        prop_assert!((0.0..=100.0).contains(&level));
    }

    /// Property: with a fixed past log, the level never rises as time advances
    #[test]
    fn prop_level_monotone_in_time(
        offsets in prop::collection::vec(0i64..60, 1..6),
        half_life in 1.0f64..400.0,
        start_hours in 0i64..500,
        step_hours in 0i64..500,
    ) {
        let base = date("2024-03-01");
        let log: Vec<InjectionEntry> = offsets
            .iter()
            .enumerate()
            .map(|(i, days)| injection(i as i64, "Test", base - Duration::days(*days)))
            .collect();
        let config = EstimatorConfig::default();

        let earlier = dates::start_of_day(base) + Duration::hours(start_hours);
        let later = earlier + Duration::hours(step_hours);

        let before = accumulated_level(&log, Some(half_life), earlier, &config);
        let after = accumulated_level(&log, Some(half_life), later, &config);
        prop_assert!(after <= before + 1e-9, "level rose from {} to {}", before, after);
    }
}
