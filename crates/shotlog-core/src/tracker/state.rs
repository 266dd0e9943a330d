//! In-memory application state and its persisted collections.

use tracing::info;

use crate::db::{Database, DbResult};
use crate::models::{
    InjectionEntry, JournalEntry, MeasurementEntry, ProgressPhoto, Record, ScheduleEntry,
    ScheduleRegistry, TitrationPlan, UserProfile, WeightEntry,
};

/// A persisted collection and its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    WeightEntries,
    InjectionEntries,
    MeasurementEntries,
    ProgressPhotos,
    Schedules,
    TitrationPlans,
    JournalEntries,
    UserProfile,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::WeightEntries,
        Collection::InjectionEntries,
        Collection::MeasurementEntries,
        Collection::ProgressPhotos,
        Collection::Schedules,
        Collection::TitrationPlans,
        Collection::JournalEntries,
        Collection::UserProfile,
    ];

    /// Storage key (also the field name in backup files).
    pub fn key(&self) -> &'static str {
        match self {
            Collection::WeightEntries => "weightEntries",
            Collection::InjectionEntries => "injectionEntries",
            Collection::MeasurementEntries => "measurementEntries",
            Collection::ProgressPhotos => "progressPhotos",
            Collection::Schedules => "schedules",
            Collection::TitrationPlans => "titrationPlans",
            Collection::JournalEntries => "journalEntries",
            Collection::UserProfile => "userProfile",
        }
    }
}

/// Everything the user has recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    pub weight_entries: Vec<WeightEntry>,
    pub injection_entries: Vec<InjectionEntry>,
    pub measurement_entries: Vec<MeasurementEntry>,
    pub progress_photos: Vec<ProgressPhoto>,
    pub schedules: ScheduleRegistry,
    pub titration_plans: Vec<TitrationPlan>,
    pub journal_entries: Vec<JournalEntry>,
    pub user_profile: Option<UserProfile>,
}

impl TrackerState {
    /// Load every collection. Unreadable collections come back empty.
    pub fn load(db: &Database) -> DbResult<Self> {
        let state = Self {
            weight_entries: db.load_records(Collection::WeightEntries.key())?,
            injection_entries: db.load_records(Collection::InjectionEntries.key())?,
            measurement_entries: db.load_records(Collection::MeasurementEntries.key())?,
            progress_photos: db.load_records(Collection::ProgressPhotos.key())?,
            schedules: ScheduleRegistry::from_entries(
                db.load_records::<ScheduleEntry>(Collection::Schedules.key())?,
            ),
            titration_plans: db.load_records(Collection::TitrationPlans.key())?,
            journal_entries: db.load_records(Collection::JournalEntries.key())?,
            user_profile: db
                .load_value::<Option<UserProfile>>(Collection::UserProfile.key())?
                .flatten(),
        };

        info!(
            injections = state.injection_entries.len(),
            weights = state.weight_entries.len(),
            schedules = state.schedules.len(),
            "loaded tracker state"
        );
        Ok(state)
    }

    /// Serialized form of one collection, as stored and exported.
    pub fn document(&self, collection: Collection) -> serde_json::Result<String> {
        match collection {
            Collection::WeightEntries => serde_json::to_string(&self.weight_entries),
            Collection::InjectionEntries => serde_json::to_string(&self.injection_entries),
            Collection::MeasurementEntries => serde_json::to_string(&self.measurement_entries),
            Collection::ProgressPhotos => serde_json::to_string(&self.progress_photos),
            Collection::Schedules => serde_json::to_string(&self.schedules),
            Collection::TitrationPlans => serde_json::to_string(&self.titration_plans),
            Collection::JournalEntries => serde_json::to_string(&self.journal_entries),
            Collection::UserProfile => serde_json::to_string(&self.user_profile),
        }
    }

    /// Rewrite one collection in full.
    pub fn save(&self, db: &Database, collection: Collection) -> DbResult<()> {
        db.put_document(collection.key(), &self.document(collection)?)
    }

    /// Largest id issued in any collection.
    pub fn max_id(&self) -> i64 {
        fn max_of<T: Record>(records: &[T]) -> i64 {
            records.iter().map(Record::id).max().unwrap_or(0)
        }

        [
            max_of(&self.weight_entries),
            max_of(&self.injection_entries),
            max_of(&self.measurement_entries),
            max_of(&self.progress_photos),
            max_of(&self.titration_plans),
            max_of(&self.journal_entries),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Issues creation-timestamp ids that never repeat.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Generator whose ids will all be greater than `last`.
    pub fn starting_after(last: i64) -> Self {
        Self { last }
    }

    /// Next id for a record created at `timestamp_millis`.
    ///
    /// Returns `None` once `i64::MAX` has been issued or observed.
    pub fn next_at(&mut self, timestamp_millis: i64) -> Option<i64> {
        let id = timestamp_millis.max(self.last.checked_add(1)?);
        self.last = id;
        Some(id)
    }

    /// Next id for a record created now.
    pub fn next(&mut self) -> Option<i64> {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Make sure future ids stay above `id`.
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }
}

/// Replace the record with the same id. Returns whether one was found.
pub(crate) fn replace_record<T: Record>(records: &mut [T], record: T) -> bool {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(existing) => {
            *existing = record;
            true
        }
        None => false,
    }
}

/// Remove the record with `id`. Returns whether one was found.
pub(crate) fn remove_record<T: Record>(records: &mut Vec<T>, id: i64) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightUnit;

    fn weight(id: i64) -> WeightEntry {
        WeightEntry {
            id,
            date: "2024-01-01".into(),
            weight: 200.0,
            unit: WeightUnit::Lbs,
            notes: String::new(),
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = Collection::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Collection::ALL.len());
    }

    #[test]
    fn test_id_generator_never_repeats() {
        let mut ids = IdGenerator::starting_after(0);
        assert_eq!(ids.next_at(1000), Some(1000));
        assert_eq!(ids.next_at(1000), Some(1001));
        assert_eq!(ids.next_at(999), Some(1002));
        assert_eq!(ids.next_at(5000), Some(5000));

        let mut ids = IdGenerator::starting_after(10_000);
        assert_eq!(ids.next_at(1000), Some(10_001));
        ids.observe(20_000);
        assert_eq!(ids.next_at(1000), Some(20_001));
    }

    #[test]
    fn test_id_generator_exhausted_at_max() {
        let mut ids = IdGenerator::starting_after(i64::MAX - 1);
        assert_eq!(ids.next_at(0), Some(i64::MAX));
        assert_eq!(ids.next_at(0), None);
        assert_eq!(ids.next(), None);

        let mut ids = IdGenerator::starting_after(0);
        ids.observe(i64::MAX);
        assert_eq!(ids.next_at(i64::MAX), None);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut records = vec![weight(1), weight(2)];

        let mut updated = weight(2);
        updated.weight = 190.0;
        assert!(replace_record(&mut records, updated));
        assert_eq!(records[1].weight, 190.0);
        assert!(!replace_record(&mut records, weight(3)));

        assert!(remove_record(&mut records, 1));
        assert!(!remove_record(&mut records, 1));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut state = TrackerState::default();
        state.weight_entries.push(weight(5));
        state.schedules.upsert(ScheduleEntry::new("HCG", 3, 2));
        state.user_profile = Some(UserProfile {
            name: Some("Sam".into()),
            ..Default::default()
        });

        for collection in Collection::ALL {
            state.save(&db, collection).unwrap();
        }

        let loaded = TrackerState::load(&db).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.max_id(), 5);
    }

    #[test]
    fn test_load_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let state = TrackerState::load(&db).unwrap();
        assert_eq!(state, TrackerState::default());
        assert_eq!(state.max_id(), 0);
    }
}
