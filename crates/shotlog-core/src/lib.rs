//! Shotlog Core Library
//!
//! Local-first injection log with pharmacokinetic level estimation,
//! dose scheduling and titration tracking.
//!
//! # Architecture
//!
//! ```text
//!   Form input ──parse──▶ Tracker action ──▶ TrackerState ──save──▶ SQLite documents
//!                                                 │
//!                                   ┌─────────────┼──────────────┐
//!                                   │             │              │
//!                                   ▼             ▼              ▼
//!                              Insights      Level series    Export / Import
//!                         (decay + phase +   (daily curve)     (JSON backup)
//!                           next dose)
//! ```
//!
//! # Core Principle
//!
//! **Estimates are always derived.** Levels, phases and projections are
//! recomputed from the injection log on every read and never stored.
//!
//! # Modules
//!
//! - [`db`]: SQLite document store, one JSON document per collection
//! - [`models`]: Domain types (InjectionEntry, ScheduleEntry, MedicationCatalog, etc.)
//! - [`estimator`]: Decay, accumulation, phase and series computation
//! - [`tracker`]: Application state and the actions that mutate it
//! - [`export`]: Whole-state backup export and import
//! - [`config`]: Layered configuration

pub mod config;
pub mod dates;
pub mod db;
pub mod estimator;
pub mod export;
pub mod models;
pub mod tracker;

// Re-export commonly used types
pub use crate::config::TrackerConfig;
pub use db::Database;
pub use estimator::{EstimatorConfig, InsightBuilder};
pub use export::{ExportDocument, ImportDocument, ImportSummary};
pub use models::{
    DoseUnit, InjectionEntry, InjectionForm, LevelSeries, LevelSnapshot, MedicationCatalog,
    MedicationProfile, NewInjection, Phase, ScheduleEntry, TitrationPlan, TitrationStatus,
};
pub use tracker::{Tracker, TrackerError, TrackerState};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ShotlogError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Import error: {0}")]
    ImportError(String),
}

impl From<db::DbError> for ShotlogError {
    fn from(e: db::DbError) -> Self {
        ShotlogError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for ShotlogError {
    fn from(e: serde_json::Error) -> Self {
        ShotlogError::SerializationError(e.to_string())
    }
}

impl From<TrackerError> for ShotlogError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::Database(e) => e.into(),
            TrackerError::Import(e) => ShotlogError::ImportError(e.to_string()),
            TrackerError::Json(e) => e.into(),
            TrackerError::NotFound(what) => ShotlogError::NotFound(what),
            e @ TrackerError::IdsExhausted => ShotlogError::DatabaseError(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for ShotlogError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ShotlogError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install a `tracing` subscriber writing to stderr.
///
/// `filter` uses `EnvFilter` syntax; `None` falls back to `RUST_LOG`, then
/// `shotlog_core=info`. Calling this more than once is harmless.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) {
    let env_filter = match filter {
        Some(directives) => tracing_subscriber::EnvFilter::new(directives),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "shotlog_core=info".into()),
    };

    // Fails only when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open or create a tracker backed by the database at the given path.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<ShotlogCore>, ShotlogError> {
    let tracker = Tracker::open(&path, EstimatorConfig::default())?;
    Ok(ShotlogCore::wrap(tracker))
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<ShotlogCore>, ShotlogError> {
    let tracker = Tracker::open_in_memory()?;
    Ok(ShotlogCore::wrap(tracker))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ShotlogCore {
    tracker: Arc<Mutex<Tracker>>,
}

impl ShotlogCore {
    fn wrap(tracker: Tracker) -> Arc<Self> {
        Arc::new(Self {
            tracker: Arc::new(Mutex::new(tracker)),
        })
    }
}

#[uniffi::export]
impl ShotlogCore {
    // =========================================================================
    // Catalog
    // =========================================================================

    /// Built-in and custom medication profiles.
    pub fn list_medications(&self) -> Result<Vec<FfiMedication>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker
            .catalog()
            .profiles()
            .iter()
            .map(FfiMedication::from)
            .collect())
    }

    // =========================================================================
    // Injection Log
    // =========================================================================

    /// Log an injection from raw form input.
    ///
    /// Returns `None` (and changes nothing) when the input doesn't parse.
    pub fn log_injection(
        &self,
        input: FfiInjectionInput,
    ) -> Result<Option<FfiInjection>, ShotlogError> {
        let form: InjectionForm = input.into();
        let mut tracker = self.tracker.lock()?;
        let entry = tracker.submit_injection(&form)?;
        Ok(entry.map(Into::into))
    }

    /// Delete an injection by id. Returns whether it existed.
    pub fn delete_injection(&self, id: i64) -> Result<bool, ShotlogError> {
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.delete_injection(id)?)
    }

    /// Every logged injection in storage order.
    pub fn list_injections(&self) -> Result<Vec<FfiInjection>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker
            .state()
            .injection_entries
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    /// Add or replace a medication's schedule.
    pub fn upsert_schedule(&self, schedule: FfiSchedule) -> Result<(), ShotlogError> {
        if schedule.medication_name.trim().is_empty() {
            return Err(ShotlogError::InvalidInput("medication name is empty".into()));
        }
        let mut tracker = self.tracker.lock()?;
        tracker.upsert_schedule(ScheduleEntry::new(
            &schedule.medication_name,
            schedule.frequency_days,
            schedule.preferred_weekday,
        ))?;
        Ok(())
    }

    /// Remove a medication's schedule. Returns whether one existed.
    pub fn remove_schedule(&self, medication_name: String) -> Result<bool, ShotlogError> {
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.remove_schedule(&medication_name)?)
    }

    pub fn list_schedules(&self) -> Result<Vec<FfiSchedule>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker
            .state()
            .schedules
            .entries()
            .iter()
            .map(FfiSchedule::from)
            .collect())
    }

    // =========================================================================
    // Estimates
    // =========================================================================

    /// Current level snapshots, highest level first.
    pub fn get_insights(&self) -> Result<Vec<FfiLevelSnapshot>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.insights_now().into_iter().map(Into::into).collect())
    }

    /// Daily level curve for one medication ending today.
    pub fn get_level_series(&self, medication_name: String) -> Result<FfiLevelSeries, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker
            .level_series(&medication_name, dates::local_today())
            .into())
    }

    /// Curves for every medication in the insight list, same order.
    pub fn get_all_series(&self) -> Result<Vec<FfiLevelSeries>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker
            .all_series(dates::local_now())
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Where a titration plan stands today.
    pub fn titration_status(
        &self,
        plan_id: i64,
    ) -> Result<Option<FfiTitrationStatus>, ShotlogError> {
        let tracker = self.tracker.lock()?;
        let status = tracker.titration_status(plan_id, dates::local_today())?;
        Ok(status.map(Into::into))
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Export all collections as JSON.
    pub fn export_json(&self) -> Result<String, ShotlogError> {
        let tracker = self.tracker.lock()?;
        Ok(tracker.export_json()?)
    }

    /// Restore collections from a backup file.
    pub fn import_json(&self, json: String) -> Result<FfiImportSummary, ShotlogError> {
        let mut tracker = self.tracker.lock()?;
        Ok(tracker.import_json(&json)?.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub name: String,
    pub category: String,
    pub half_life_hours: Option<f64>,
    pub peak_hours: f64,
    pub color: String,
    pub default_schedule_days: u32,
}

impl From<&MedicationProfile> for FfiMedication {
    fn from(profile: &MedicationProfile) -> Self {
        Self {
            name: profile.name.clone(),
            category: profile.category.clone(),
            half_life_hours: profile.half_life_hours,
            peak_hours: profile.peak_hours,
            color: profile.color.clone(),
            default_schedule_days: profile.default_schedule_days,
        }
    }
}

/// Injection form fields as typed by the user.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInjectionInput {
    pub medication_name: String,
    pub dose_amount: String,
    pub dose_unit: String,
    /// `YYYY-MM-DD`, local calendar date
    pub date: String,
    pub site: String,
    pub side_effects: Vec<String>,
    pub notes: String,
}

impl From<FfiInjectionInput> for InjectionForm {
    fn from(input: FfiInjectionInput) -> Self {
        InjectionForm {
            medication_name: input.medication_name,
            dose_amount: input.dose_amount,
            dose_unit: input.dose_unit,
            date: input.date,
            site: input.site,
            side_effects: input.side_effects,
            notes: input.notes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInjection {
    pub id: i64,
    pub medication_name: String,
    pub dose_amount: f64,
    pub dose_unit: String,
    pub date: String,
    pub site: String,
    pub side_effects: Vec<String>,
    pub notes: String,
}

impl From<InjectionEntry> for FfiInjection {
    fn from(entry: InjectionEntry) -> Self {
        Self {
            id: entry.id,
            medication_name: entry.medication_name,
            dose_amount: entry.dose_amount,
            dose_unit: entry.dose_unit.to_string(),
            date: entry.date,
            site: entry.site,
            side_effects: entry.side_effects,
            notes: entry.notes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSchedule {
    pub medication_name: String,
    pub frequency_days: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub preferred_weekday: u8,
}

impl From<&ScheduleEntry> for FfiSchedule {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            medication_name: entry.medication_name.clone(),
            frequency_days: entry.frequency_days,
            preferred_weekday: entry.preferred_weekday,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseProjection {
    pub date: String,
    pub days_until: i64,
    pub is_overdue: bool,
    pub is_due_today: bool,
}

impl From<models::DoseProjection> for FfiDoseProjection {
    fn from(projection: models::DoseProjection) -> Self {
        Self {
            date: dates::format_date(projection.date),
            days_until: projection.days_until,
            is_overdue: projection.is_overdue,
            is_due_today: projection.is_due_today,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLevelSnapshot {
    pub medication_name: String,
    pub category: String,
    pub color: String,
    pub current_level_percent: f64,
    pub phase: String,
    pub phase_description: String,
    pub accumulation: String,
    pub last_injection_date: String,
    pub hours_since_last_injection: f64,
    pub injection_count: u32,
    pub next_injection: Option<FfiDoseProjection>,
}

impl From<LevelSnapshot> for FfiLevelSnapshot {
    fn from(snapshot: LevelSnapshot) -> Self {
        Self {
            medication_name: snapshot.medication_name,
            category: snapshot.category,
            color: snapshot.color,
            current_level_percent: snapshot.current_level_percent,
            phase: snapshot.phase.label().to_string(),
            phase_description: snapshot.phase_description,
            accumulation: snapshot.accumulation.label().to_string(),
            last_injection_date: dates::format_date(snapshot.last_injection_date),
            hours_since_last_injection: snapshot.hours_since_last_injection,
            injection_count: u32::try_from(snapshot.injection_count).unwrap_or(u32::MAX),
            next_injection: snapshot.next_injection.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLevelPoint {
    pub date: String,
    pub level: f64,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLevelSeries {
    pub medication_name: String,
    pub color: String,
    pub points: Vec<FfiLevelPoint>,
}

impl From<LevelSeries> for FfiLevelSeries {
    fn from(series: LevelSeries) -> Self {
        Self {
            medication_name: series.medication_name,
            color: series.color,
            points: series
                .points
                .into_iter()
                .map(|p| FfiLevelPoint {
                    date: dates::format_date(p.date),
                    level: p.level,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTitrationStatus {
    pub step_number: u32,
    pub total_steps: u32,
    pub dose: f64,
    pub unit: String,
    pub weeks_passed: i64,
    pub weeks_remaining: i64,
    pub completed: bool,
}

impl From<TitrationStatus> for FfiTitrationStatus {
    fn from(status: TitrationStatus) -> Self {
        Self {
            step_number: u32::try_from(status.step_number).unwrap_or(u32::MAX),
            total_steps: u32::try_from(status.total_steps).unwrap_or(u32::MAX),
            dose: status.dose,
            unit: status.unit.to_string(),
            weeks_passed: status.weeks_passed,
            weeks_remaining: status.weeks_remaining,
            completed: status.completed,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportSummary {
    pub replaced: Vec<String>,
    pub injection_count: u32,
}

impl From<ImportSummary> for FfiImportSummary {
    fn from(summary: ImportSummary) -> Self {
        Self {
            replaced: summary.replaced,
            injection_count: u32::try_from(summary.injection_count).unwrap_or(u32::MAX),
        }
    }
}
