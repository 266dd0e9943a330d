//! Domain models for the shotlog system.

mod body;
mod catalog;
mod injection;
mod insight;
mod journal;
mod schedule;
mod titration;

pub use body::*;
pub use catalog::*;
pub use injection::*;
pub use insight::*;
pub use journal::*;
pub use schedule::*;
pub use titration::*;

/// A persisted record with a creation-timestamp-derived id.
pub trait Record {
    fn id(&self) -> i64;
}

impl Record for InjectionEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for WeightEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for MeasurementEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for ProgressPhoto {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for TitrationPlan {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Record for JournalEntry {
    fn id(&self) -> i64 {
        self.id
    }
}
