//! Whole-state backup file.
//!
//! Export writes every collection plus an `exportDate`/`version` stamp.
//! Import only checks those two stamps, then replaces each collection the
//! file carries; collections missing from the file are left untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    InjectionEntry, JournalEntry, MeasurementEntry, ProgressPhoto, ScheduleEntry, TitrationPlan,
    UserProfile, WeightEntry,
};

/// Current export format version.
pub const EXPORT_VERSION: &str = "1.0";

/// Import errors.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Not a backup file: missing `{0}`")]
    MissingField(&'static str),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// Full backup document as written by export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_date: String,
    pub version: String,
    pub weight_entries: Vec<WeightEntry>,
    pub injection_entries: Vec<InjectionEntry>,
    pub measurement_entries: Vec<MeasurementEntry>,
    pub progress_photos: Vec<ProgressPhoto>,
    pub schedules: Vec<ScheduleEntry>,
    pub titration_plans: Vec<TitrationPlan>,
    pub journal_entries: Vec<JournalEntry>,
    pub user_profile: Option<UserProfile>,
}

impl ExportDocument {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A backup file as read by import. Every collection is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportDocument {
    /// Accepted as any JSON value; only presence is checked
    #[serde(default)]
    pub export_date: Option<serde_json::Value>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    pub weight_entries: Option<Vec<WeightEntry>>,
    pub injection_entries: Option<Vec<InjectionEntry>>,
    pub measurement_entries: Option<Vec<MeasurementEntry>>,
    pub progress_photos: Option<Vec<ProgressPhoto>>,
    pub schedules: Option<Vec<ScheduleEntry>>,
    pub titration_plans: Option<Vec<TitrationPlan>>,
    pub journal_entries: Option<Vec<JournalEntry>>,
    pub user_profile: Option<UserProfile>,
}

impl ImportDocument {
    /// Parse and validate a backup file.
    pub fn parse(json: &str) -> ImportResult<Self> {
        let document: ImportDocument = serde_json::from_str(json)?;
        if is_absent(&document.version) {
            return Err(ImportError::MissingField("version"));
        }
        if is_absent(&document.export_date) {
            return Err(ImportError::MissingField("exportDate"));
        }
        Ok(document)
    }

    /// Names of the collections this file will replace.
    pub fn collections_present(&self) -> Vec<&'static str> {
        let flags = [
            ("weightEntries", self.weight_entries.is_some()),
            ("injectionEntries", self.injection_entries.is_some()),
            ("measurementEntries", self.measurement_entries.is_some()),
            ("progressPhotos", self.progress_photos.is_some()),
            ("schedules", self.schedules.is_some()),
            ("titrationPlans", self.titration_plans.is_some()),
            ("journalEntries", self.journal_entries.is_some()),
            ("userProfile", self.user_profile.is_some()),
        ];
        flags
            .into_iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| name)
            .collect()
    }
}

fn is_absent(value: &Option<serde_json::Value>) -> bool {
    matches!(value, None | Some(serde_json::Value::Null))
}

/// What an import replaced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportSummary {
    pub replaced: Vec<String>,
    pub injection_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let doc = ImportDocument::parse(r#"{"version": "1.0", "exportDate": "2024-01-01"}"#).unwrap();
        assert!(doc.collections_present().is_empty());
    }

    #[test]
    fn test_numeric_version_accepted() {
        let doc = ImportDocument::parse(r#"{"version": 1, "exportDate": "x", "schedules": []}"#)
            .unwrap();
        assert_eq!(doc.collections_present(), vec!["schedules"]);
    }

    #[test]
    fn test_missing_stamps_rejected() {
        let err = ImportDocument::parse(r#"{"exportDate": "2024-01-01"}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingField("version")));

        let err = ImportDocument::parse(r#"{"version": "1.0", "exportDate": null}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingField("exportDate")));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            ImportDocument::parse("not json"),
            Err(ImportError::JsonParse(_))
        ));
        assert!(matches!(
            ImportDocument::parse(r#"{"version": "1.0", "exportDate": "x", "schedules": "nope"}"#),
            Err(ImportError::JsonParse(_))
        ));
    }

    #[test]
    fn test_export_uses_camel_case_keys() {
        let doc = ExportDocument {
            export_date: "2024-01-01T00:00:00Z".into(),
            version: EXPORT_VERSION.into(),
            weight_entries: vec![],
            injection_entries: vec![],
            measurement_entries: vec![],
            progress_photos: vec![],
            schedules: vec![ScheduleEntry::new("HCG", 3, 1)],
            titration_plans: vec![],
            journal_entries: vec![],
            user_profile: None,
        };
        let json = doc.to_json().unwrap();
        for key in [
            "exportDate",
            "version",
            "weightEntries",
            "injectionEntries",
            "measurementEntries",
            "progressPhotos",
            "schedules",
            "titrationPlans",
            "journalEntries",
            "userProfile",
            "frequencyDays",
        ] {
            assert!(json.contains(&format!("\"{}\"", key)), "missing key {}", key);
        }
    }
}
