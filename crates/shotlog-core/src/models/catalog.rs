//! Medication catalog models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Phase;

/// Display color for medications missing from the catalog.
pub const DEFAULT_COLOR: &str = "#6b7280";

/// Category assigned to medications missing from the catalog.
pub const OTHER_CATEGORY: &str = "Other";

/// Pharmacokinetic profile of a single medication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationProfile {
    /// Unique name, also the display label
    pub name: String,
    /// Category tag (e.g., "GLP-1", "Peptide", "Hormone")
    pub category: String,
    /// Elimination half-life in hours (None = unknown, no decay estimate)
    pub half_life_hours: Option<f64>,
    /// Hours after a dose at which peak effect is reached
    pub peak_hours: f64,
    /// Typical duration of noticeable effect (informational)
    pub effect_duration_hours: f64,
    /// Chart/display color
    pub color: String,
    /// Suggested redosing interval in days (0 = no suggestion)
    pub default_schedule_days: u32,
    /// Brand or alternate names
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl MedicationProfile {
    /// Create a profile with required fields.
    pub fn new(name: &str, category: &str, half_life_hours: f64, peak_hours: f64) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            half_life_hours: Some(half_life_hours),
            peak_hours,
            effect_duration_hours: half_life_hours,
            color: DEFAULT_COLOR.to_string(),
            default_schedule_days: 0,
            aliases: Vec::new(),
        }
    }

    /// Generic profile used when a name is not in the catalog.
    pub fn generic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: OTHER_CATEGORY.to_string(),
            half_life_hours: None,
            peak_hours: 24.0,
            effect_duration_hours: 0.0,
            color: DEFAULT_COLOR.to_string(),
            default_schedule_days: 0,
            aliases: Vec::new(),
        }
    }

    fn with_effect(mut self, hours: f64) -> Self {
        self.effect_duration_hours = hours;
        self
    }

    fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    fn with_schedule(mut self, days: u32) -> Self {
        self.default_schedule_days = days;
        self
    }

    fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Check whether `name` refers to this profile (case-insensitive, aliases included).
    pub fn matches(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.name.to_lowercase() == wanted || self.aliases.iter().any(|a| a.to_lowercase() == wanted)
    }
}

/// What a user can expect in each phase, per medication category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectProfile {
    /// Category this profile describes
    pub category: String,
    /// Typical hours to peak effect for the category
    pub typical_peak_hours: f64,
    pub absorption: String,
    pub peak_effect: String,
    pub active: String,
    pub declining: String,
}

impl EffectProfile {
    fn new(category: &str, typical_peak_hours: f64, notes: [&str; 4]) -> Self {
        Self {
            category: category.to_string(),
            typical_peak_hours,
            absorption: notes[0].to_string(),
            peak_effect: notes[1].to_string(),
            active: notes[2].to_string(),
            declining: notes[3].to_string(),
        }
    }

    /// Description for the given phase.
    pub fn describe(&self, phase: Phase) -> &str {
        match phase {
            Phase::Absorption => &self.absorption,
            Phase::PeakEffect => &self.peak_effect,
            Phase::Active => &self.active,
            Phase::Declining => &self.declining,
        }
    }
}

/// Static lookup table of medication and category profiles.
#[derive(Debug, Clone)]
pub struct MedicationCatalog {
    profiles: Vec<MedicationProfile>,
    effects: HashMap<String, EffectProfile>,
    generic_effect: EffectProfile,
}

impl Default for MedicationCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationCatalog {
    /// Create a catalog with the built-in medication table.
    pub fn new() -> Self {
        Self {
            profiles: Self::default_profiles(),
            effects: Self::default_effects(),
            generic_effect: EffectProfile::new(
                OTHER_CATEGORY,
                24.0,
                [
                    "Medication is being absorbed.",
                    "Medication is near its strongest effect.",
                    "Medication is still active.",
                    "Medication levels are tapering off.",
                ],
            ),
        }
    }

    /// Create an empty catalog (every lookup falls back to the generic profile).
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
            effects: HashMap::new(),
            ..Self::new()
        }
    }

    /// All known profiles, in catalog order.
    pub fn profiles(&self) -> &[MedicationProfile] {
        &self.profiles
    }

    /// Look up a profile by name or alias.
    pub fn lookup(&self, name: &str) -> Option<&MedicationProfile> {
        self.profiles.iter().find(|p| p.matches(name))
    }

    /// Look up a profile, falling back to a generic one for unknown names.
    pub fn profile_or_generic(&self, name: &str) -> MedicationProfile {
        self.lookup(name)
            .cloned()
            .unwrap_or_else(|| MedicationProfile::generic(name))
    }

    /// Display color for a medication name.
    pub fn color_for(&self, name: &str) -> &str {
        self.lookup(name)
            .map(|p| p.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Effect profile for a category, falling back to the generic profile.
    pub fn effect_profile(&self, category: &str) -> &EffectProfile {
        self.effects
            .get(&category.to_lowercase())
            .unwrap_or(&self.generic_effect)
    }

    /// Add or replace a profile (user-defined medications).
    pub fn add_profile(&mut self, profile: MedicationProfile) {
        match self.profiles.iter_mut().find(|p| p.matches(&profile.name)) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    /// Built-in medication profiles.
    fn default_profiles() -> Vec<MedicationProfile> {
        vec![
            // GLP-1 / incretin agonists
            MedicationProfile::new("Semaglutide", "GLP-1", 168.0, 72.0)
                .with_effect(168.0)
                .with_color("#3b82f6")
                .with_schedule(7)
                .with_aliases(&["Ozempic", "Wegovy"]),
            MedicationProfile::new("Tirzepatide", "GLP-1", 120.0, 48.0)
                .with_effect(168.0)
                .with_color("#8b5cf6")
                .with_schedule(7)
                .with_aliases(&["Mounjaro", "Zepbound"]),
            MedicationProfile::new("Retatrutide", "GLP-1", 144.0, 72.0)
                .with_effect(168.0)
                .with_color("#ec4899")
                .with_schedule(7),
            MedicationProfile::new("Dulaglutide", "GLP-1", 120.0, 48.0)
                .with_effect(168.0)
                .with_color("#f59e0b")
                .with_schedule(7)
                .with_aliases(&["Trulicity"]),
            MedicationProfile::new("Liraglutide", "GLP-1", 13.0, 11.0)
                .with_effect(24.0)
                .with_color("#14b8a6")
                .with_schedule(1)
                .with_aliases(&["Victoza", "Saxenda"]),
            // Peptides
            MedicationProfile::new("BPC-157", "Peptide", 4.0, 1.0)
                .with_effect(12.0)
                .with_color("#10b981")
                .with_schedule(1),
            MedicationProfile::new("TB-500", "Peptide", 72.0, 24.0)
                .with_effect(168.0)
                .with_color("#06b6d4")
                .with_schedule(3),
            MedicationProfile::new("Ipamorelin", "Peptide", 2.0, 0.5)
                .with_effect(4.0)
                .with_color("#84cc16")
                .with_schedule(1),
            MedicationProfile::new("CJC-1295", "Peptide", 168.0, 24.0)
                .with_effect(168.0)
                .with_color("#a855f7")
                .with_schedule(7),
            // Hormones
            MedicationProfile::new("Testosterone Cypionate", "Hormone", 192.0, 48.0)
                .with_effect(336.0)
                .with_color("#ef4444")
                .with_schedule(7),
            MedicationProfile::new("Testosterone Enanthate", "Hormone", 108.0, 36.0)
                .with_effect(240.0)
                .with_color("#f97316")
                .with_schedule(7),
            MedicationProfile::new("HCG", "Hormone", 36.0, 6.0)
                .with_effect(72.0)
                .with_color("#eab308")
                .with_schedule(3)
                .with_aliases(&["Pregnyl", "Novarel"]),
            // Vitamins
            MedicationProfile::new("Vitamin B12", "Vitamin", 144.0, 1.0)
                .with_effect(168.0)
                .with_color("#f43f5e")
                .with_schedule(7)
                .with_aliases(&["Cyanocobalamin", "B12"]),
        ]
    }

    /// Built-in category effect profiles, keyed by lowercase category.
    fn default_effects() -> HashMap<String, EffectProfile> {
        let profiles = [
            EffectProfile::new(
                "GLP-1",
                72.0,
                [
                    "Levels are rising. Mild nausea is most common in the first day or two.",
                    "Appetite suppression is strongest. Eat small, slow meals and stay hydrated.",
                    "Appetite control remains steady.",
                    "Appetite may return as levels fall toward the next dose.",
                ],
            ),
            EffectProfile::new(
                "Peptide",
                12.0,
                [
                    "Peptide is being absorbed from the injection site.",
                    "Peptide is at its highest concentration.",
                    "Peptide is still circulating.",
                    "Peptide has mostly cleared.",
                ],
            ),
            EffectProfile::new(
                "Hormone",
                48.0,
                [
                    "Hormone levels are climbing from the depot.",
                    "Hormone levels are near their peak.",
                    "Hormone levels remain in range.",
                    "Hormone levels are approaching trough.",
                ],
            ),
            EffectProfile::new(
                "Vitamin",
                2.0,
                [
                    "Vitamin is being absorbed.",
                    "Blood levels are at their highest.",
                    "Stores are being replenished.",
                    "Levels are returning to baseline.",
                ],
            ),
        ];

        profiles
            .into_iter()
            .map(|p| (p.category.to_lowercase(), p))
            .collect()
    }
}
