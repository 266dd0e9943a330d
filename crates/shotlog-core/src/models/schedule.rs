//! Dosing schedule models.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::DoseProjection;
use crate::dates;

/// Desired dosing rhythm for one medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub medication_name: String,
    /// Days between doses (at least 1)
    pub frequency_days: u32,
    /// Preferred weekday, 0 = Sunday .. 6 = Saturday
    #[serde(default)]
    pub preferred_weekday: u8,
}

impl ScheduleEntry {
    /// Create a schedule. Frequency is clamped to at least one day and the weekday to 0..=6.
    pub fn new(medication_name: &str, frequency_days: u32, preferred_weekday: u8) -> Self {
        Self {
            medication_name: medication_name.to_string(),
            frequency_days: frequency_days.max(1),
            preferred_weekday: preferred_weekday.min(6),
        }
    }

    /// Date the next dose is due after an injection on `last`.
    ///
    /// `None` when the result falls outside the representable calendar.
    pub fn next_due(&self, last: NaiveDate) -> Option<NaiveDate> {
        last.checked_add_signed(Duration::days(i64::from(self.frequency_days.max(1))))
    }

    /// Project the next dose relative to `today`.
    pub fn project(&self, last: NaiveDate, today: NaiveDate) -> Option<DoseProjection> {
        let date = self.next_due(last)?;
        let days_until = dates::days_between(today, date);
        Some(DoseProjection {
            date,
            days_until,
            is_overdue: days_until < 0,
            is_due_today: days_until == 0,
        })
    }

    /// First date on or after `from` that falls on the preferred weekday.
    pub fn next_preferred_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        let current = i64::from(from.weekday().num_days_from_sunday());
        let wanted = i64::from(self.preferred_weekday.min(6));
        from.checked_add_signed(Duration::days((wanted - current).rem_euclid(7)))
    }
}

/// Schedules keyed by medication name. At most one schedule per medication.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ScheduleRegistry {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list, later duplicates replacing earlier ones.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.upsert(entry);
        }
        registry
    }

    /// Add a schedule, replacing any existing one for the same medication.
    pub fn upsert(&mut self, entry: ScheduleEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.medication_name == entry.medication_name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove the schedule for a medication. Returns whether one existed.
    pub fn remove(&mut self, medication_name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.medication_name != medication_name);
        self.entries.len() != before
    }

    pub fn get(&self, medication_name: &str) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .find(|e| e.medication_name == medication_name)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
