//! Application controller.
//!
//! [`Tracker`] owns the database and the loaded [`TrackerState`]. Every
//! mutation is staged on a copy of the state, the affected collection is
//! rewritten from that copy, and only a successful write makes it current.
//! Reads (insights, series, export) are computed from memory.

mod state;

pub use state::*;

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::dates;
use crate::db::{Database, DbError};
use crate::estimator::{EstimatorConfig, InsightBuilder};
use crate::export::{
    ExportDocument, ImportDocument, ImportError, ImportSummary, EXPORT_VERSION,
};
use crate::models::{
    InjectionEntry, InjectionForm, JournalEntry, LevelSeries, LevelSnapshot, MeasurementEntry,
    MedicationCatalog, NewInjection, ProgressPhoto, Record, ScheduleEntry, ScheduleRegistry,
    TitrationPlan, TitrationStatus, UserProfile, WeightEntry, WeightForm, WeightUnit,
};

/// Tracker errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Record ids exhausted")]
    IdsExhausted,
}

pub type TrackerResult<T> = Result<T, TrackerError>;

fn replace_or_not_found<T: Record>(records: &mut [T], record: T, what: &str) -> TrackerResult<()> {
    let id = record.id();
    if replace_record(records, record) {
        Ok(())
    } else {
        Err(TrackerError::NotFound(format!("{} {}", what, id)))
    }
}

/// Owns the store, the loaded state and the medication catalog.
pub struct Tracker {
    db: Database,
    state: TrackerState,
    catalog: MedicationCatalog,
    config: EstimatorConfig,
    ids: IdGenerator,
}

impl Tracker {
    /// Open (or create) a tracker backed by the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: EstimatorConfig) -> TrackerResult<Self> {
        let db = Database::open(path)?;
        Self::with_database(db, config)
    }

    /// In-memory tracker (for testing).
    pub fn open_in_memory() -> TrackerResult<Self> {
        Self::with_database(Database::open_in_memory()?, EstimatorConfig::default())
    }

    /// Open the tracker described by a loaded configuration.
    pub fn from_config(config: &TrackerConfig) -> TrackerResult<Self> {
        info!(path = %config.database_path, "opening tracker");
        Self::open(&config.database_path, config.estimator.clone())
    }

    /// Load state from an already-open database.
    pub fn with_database(db: Database, config: EstimatorConfig) -> TrackerResult<Self> {
        let state = TrackerState::load(&db)?;
        let ids = IdGenerator::starting_after(state.max_id());
        Ok(Self {
            db,
            state,
            catalog: MedicationCatalog::new(),
            config,
            ids,
        })
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn catalog(&self) -> &MedicationCatalog {
        &self.catalog
    }

    /// Mutable catalog, for registering custom medications.
    pub fn catalog_mut(&mut self) -> &mut MedicationCatalog {
        &mut self.catalog
    }

    pub fn estimator_config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Apply `change` to a copy of the state, save `collection` from the
    /// copy, then make the copy current. A failed save leaves memory untouched.
    fn apply<R>(
        &mut self,
        collection: Collection,
        change: impl FnOnce(&mut TrackerState) -> TrackerResult<R>,
    ) -> TrackerResult<R> {
        let mut next = self.state.clone();
        let result = change(&mut next)?;
        next.save(&self.db, collection)?;
        self.state = next;
        Ok(result)
    }

    fn next_id(&mut self) -> TrackerResult<i64> {
        self.ids.next().ok_or(TrackerError::IdsExhausted)
    }

    // =========================================================================
    // Injections
    // =========================================================================

    /// Record an injection and save the log.
    pub fn log_injection(&mut self, new: NewInjection) -> TrackerResult<InjectionEntry> {
        let entry = InjectionEntry::from_new(self.next_id()?, new);
        let stored = entry.clone();
        self.apply(Collection::InjectionEntries, |state| {
            state.injection_entries.push(stored);
            Ok(())
        })?;
        info!(
            id = entry.id,
            medication = %entry.medication_name,
            date = %entry.date,
            "logged injection"
        );
        Ok(entry)
    }

    /// Record an injection from raw form input.
    ///
    /// Returns `Ok(None)` without touching state when the form doesn't parse.
    pub fn submit_injection(
        &mut self,
        form: &InjectionForm,
    ) -> TrackerResult<Option<InjectionEntry>> {
        match form.parse() {
            Some(new) => self.log_injection(new).map(Some),
            None => {
                debug!("injection form incomplete, ignoring submit");
                Ok(None)
            }
        }
    }

    /// Replace the injection with the same id.
    pub fn update_injection(&mut self, entry: InjectionEntry) -> TrackerResult<()> {
        self.apply(Collection::InjectionEntries, |state| {
            replace_or_not_found(&mut state.injection_entries, entry, "injection")
        })
    }

    /// Delete an injection. Returns whether it existed.
    pub fn delete_injection(&mut self, id: i64) -> TrackerResult<bool> {
        let removed = self.apply(Collection::InjectionEntries, |state| {
            Ok(remove_record(&mut state.injection_entries, id))
        })?;
        if removed {
            info!(id, "deleted injection");
        }
        Ok(removed)
    }

    /// Injections of one medication, newest first. Undated entries sort last.
    pub fn injection_history(&self, medication_name: &str) -> Vec<&InjectionEntry> {
        let mut history: Vec<&InjectionEntry> = self
            .state
            .injection_entries
            .iter()
            .filter(|i| i.medication_name == medication_name)
            .collect();
        history.sort_by(|a, b| b.local_date().cmp(&a.local_date()));
        history
    }

    // =========================================================================
    // Schedules
    // =========================================================================

    /// Add or replace the schedule for a medication.
    pub fn upsert_schedule(&mut self, entry: ScheduleEntry) -> TrackerResult<()> {
        debug!(medication = %entry.medication_name, every = entry.frequency_days, "upsert schedule");
        self.apply(Collection::Schedules, |state| {
            state.schedules.upsert(entry);
            Ok(())
        })
    }

    /// Remove a medication's schedule. Returns whether one existed.
    pub fn remove_schedule(&mut self, medication_name: &str) -> TrackerResult<bool> {
        if self.state.schedules.get(medication_name).is_none() {
            return Ok(false);
        }
        self.apply(Collection::Schedules, |state| {
            Ok(state.schedules.remove(medication_name))
        })
    }

    // =========================================================================
    // Body tracking
    // =========================================================================

    /// Record a weight.
    pub fn add_weight(
        &mut self,
        date: NaiveDate,
        weight: f64,
        unit: WeightUnit,
        notes: &str,
    ) -> TrackerResult<WeightEntry> {
        let entry = WeightEntry {
            id: self.next_id()?,
            date: dates::format_date(date),
            weight,
            unit,
            notes: notes.to_string(),
        };
        let stored = entry.clone();
        self.apply(Collection::WeightEntries, |state| {
            state.weight_entries.push(stored);
            Ok(())
        })?;
        Ok(entry)
    }

    /// Record a weight from raw form input. No-op when the form doesn't parse.
    pub fn submit_weight(&mut self, form: &WeightForm) -> TrackerResult<Option<WeightEntry>> {
        match form.parse() {
            Some((date, weight, unit, notes)) => {
                self.add_weight(date, weight, unit, &notes).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn update_weight(&mut self, entry: WeightEntry) -> TrackerResult<()> {
        self.apply(Collection::WeightEntries, |state| {
            replace_or_not_found(&mut state.weight_entries, entry, "weight entry")
        })
    }

    pub fn delete_weight(&mut self, id: i64) -> TrackerResult<bool> {
        self.apply(Collection::WeightEntries, |state| {
            Ok(remove_record(&mut state.weight_entries, id))
        })
    }

    /// Record a set of measurements. The entry's id is assigned here.
    pub fn add_measurement(&mut self, mut entry: MeasurementEntry) -> TrackerResult<MeasurementEntry> {
        entry.id = self.next_id()?;
        let stored = entry.clone();
        self.apply(Collection::MeasurementEntries, |state| {
            state.measurement_entries.push(stored);
            Ok(())
        })?;
        Ok(entry)
    }

    pub fn update_measurement(&mut self, entry: MeasurementEntry) -> TrackerResult<()> {
        self.apply(Collection::MeasurementEntries, |state| {
            replace_or_not_found(&mut state.measurement_entries, entry, "measurement")
        })
    }

    pub fn delete_measurement(&mut self, id: i64) -> TrackerResult<bool> {
        self.apply(Collection::MeasurementEntries, |state| {
            Ok(remove_record(&mut state.measurement_entries, id))
        })
    }

    /// Record a progress photo reference. The id is assigned here.
    pub fn add_photo(&mut self, mut photo: ProgressPhoto) -> TrackerResult<ProgressPhoto> {
        photo.id = self.next_id()?;
        let stored = photo.clone();
        self.apply(Collection::ProgressPhotos, |state| {
            state.progress_photos.push(stored);
            Ok(())
        })?;
        Ok(photo)
    }

    pub fn delete_photo(&mut self, id: i64) -> TrackerResult<bool> {
        self.apply(Collection::ProgressPhotos, |state| {
            Ok(remove_record(&mut state.progress_photos, id))
        })
    }

    // =========================================================================
    // Titration, journal and profile
    // =========================================================================

    /// Store a titration plan. The id is assigned here.
    pub fn add_titration_plan(&mut self, mut plan: TitrationPlan) -> TrackerResult<TitrationPlan> {
        plan.id = self.next_id()?;
        let stored = plan.clone();
        self.apply(Collection::TitrationPlans, |state| {
            state.titration_plans.push(stored);
            Ok(())
        })?;
        Ok(plan)
    }

    pub fn update_titration_plan(&mut self, plan: TitrationPlan) -> TrackerResult<()> {
        self.apply(Collection::TitrationPlans, |state| {
            replace_or_not_found(&mut state.titration_plans, plan, "titration plan")
        })
    }

    pub fn delete_titration_plan(&mut self, id: i64) -> TrackerResult<bool> {
        self.apply(Collection::TitrationPlans, |state| {
            Ok(remove_record(&mut state.titration_plans, id))
        })
    }

    /// Store a journal entry with ratings clamped to 1..=5. The id is assigned here.
    pub fn add_journal_entry(&mut self, entry: JournalEntry) -> TrackerResult<JournalEntry> {
        let mut entry = entry.normalized();
        entry.id = self.next_id()?;
        let stored = entry.clone();
        self.apply(Collection::JournalEntries, |state| {
            state.journal_entries.push(stored);
            Ok(())
        })?;
        Ok(entry)
    }

    pub fn update_journal_entry(&mut self, entry: JournalEntry) -> TrackerResult<()> {
        let entry = entry.normalized();
        self.apply(Collection::JournalEntries, |state| {
            replace_or_not_found(&mut state.journal_entries, entry, "journal entry")
        })
    }

    pub fn delete_journal_entry(&mut self, id: i64) -> TrackerResult<bool> {
        self.apply(Collection::JournalEntries, |state| {
            Ok(remove_record(&mut state.journal_entries, id))
        })
    }

    pub fn set_user_profile(&mut self, profile: UserProfile) -> TrackerResult<()> {
        self.apply(Collection::UserProfile, |state| {
            state.user_profile = Some(profile);
            Ok(())
        })
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    fn insight_builder(&self) -> InsightBuilder<'_> {
        InsightBuilder::new(&self.catalog, &self.state.schedules, &self.config)
    }

    /// Level snapshots as of `now`, highest level first.
    pub fn insights(&self, now: NaiveDateTime) -> Vec<LevelSnapshot> {
        self.insight_builder()
            .build(&self.state.injection_entries, now)
    }

    /// Level snapshots as of the current local time.
    pub fn insights_now(&self) -> Vec<LevelSnapshot> {
        self.insights(dates::local_now())
    }

    /// Daily level history for one medication ending on `today`.
    pub fn level_series(&self, medication_name: &str, today: NaiveDate) -> LevelSeries {
        self.insight_builder()
            .series_for(medication_name, &self.state.injection_entries, today)
    }

    /// One series per medication in the insight list, same order.
    pub fn all_series(&self, now: NaiveDateTime) -> Vec<LevelSeries> {
        self.insight_builder()
            .all_series(&self.state.injection_entries, now)
    }

    /// Where a titration plan stands on `today`.
    ///
    /// `Ok(None)` for plans with no steps or an unreadable start date.
    pub fn titration_status(
        &self,
        plan_id: i64,
        today: NaiveDate,
    ) -> TrackerResult<Option<TitrationStatus>> {
        let plan = self
            .state
            .titration_plans
            .iter()
            .find(|p| p.id() == plan_id)
            .ok_or_else(|| TrackerError::NotFound(format!("titration plan {}", plan_id)))?;
        Ok(plan.status_on(today))
    }

    // =========================================================================
    // Backup
    // =========================================================================

    /// Snapshot of every collection, stamped with `export_date`.
    pub fn export(&self, export_date: &str) -> ExportDocument {
        ExportDocument {
            export_date: export_date.to_string(),
            version: EXPORT_VERSION.to_string(),
            weight_entries: self.state.weight_entries.clone(),
            injection_entries: self.state.injection_entries.clone(),
            measurement_entries: self.state.measurement_entries.clone(),
            progress_photos: self.state.progress_photos.clone(),
            schedules: self.state.schedules.entries().to_vec(),
            titration_plans: self.state.titration_plans.clone(),
            journal_entries: self.state.journal_entries.clone(),
            user_profile: self.state.user_profile.clone(),
        }
    }

    /// Export as pretty JSON stamped with the current time.
    pub fn export_json(&self) -> TrackerResult<String> {
        let stamp = chrono::Utc::now().to_rfc3339();
        let json = self.export(&stamp).to_json()?;
        info!(bytes = json.len(), "exported backup");
        Ok(json)
    }

    /// Restore from a backup file.
    ///
    /// The whole file is validated before anything changes. Each collection
    /// it carries replaces the current one, and all of them are written in
    /// a single transaction: either every collection is restored or none is.
    pub fn import_json(&mut self, json: &str) -> TrackerResult<ImportSummary> {
        let document = ImportDocument::parse(json)?;
        let replaced: Vec<String> = document
            .collections_present()
            .into_iter()
            .map(String::from)
            .collect();

        let mut next = self.state.clone();
        let mut touched = Vec::new();
        if let Some(entries) = document.weight_entries {
            next.weight_entries = entries;
            touched.push(Collection::WeightEntries);
        }
        if let Some(entries) = document.injection_entries {
            next.injection_entries = entries;
            touched.push(Collection::InjectionEntries);
        }
        if let Some(entries) = document.measurement_entries {
            next.measurement_entries = entries;
            touched.push(Collection::MeasurementEntries);
        }
        if let Some(photos) = document.progress_photos {
            next.progress_photos = photos;
            touched.push(Collection::ProgressPhotos);
        }
        if let Some(schedules) = document.schedules {
            next.schedules = ScheduleRegistry::from_entries(schedules);
            touched.push(Collection::Schedules);
        }
        if let Some(plans) = document.titration_plans {
            next.titration_plans = plans;
            touched.push(Collection::TitrationPlans);
        }
        if let Some(entries) = document.journal_entries {
            next.journal_entries = entries;
            touched.push(Collection::JournalEntries);
        }
        if let Some(profile) = document.user_profile {
            next.user_profile = Some(profile);
            touched.push(Collection::UserProfile);
        }

        let documents = touched
            .iter()
            .map(|collection| Ok((collection.key(), next.document(*collection)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        self.db.put_documents(&documents)?;

        self.state = next;
        self.ids.observe(self.state.max_id());

        info!(collections = ?replaced, "imported backup");
        Ok(ImportSummary {
            replaced,
            injection_count: self.state.injection_entries.len(),
        })
    }
}
