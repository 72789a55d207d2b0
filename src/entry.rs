// Body composition entry
//
// A WeightEntry is one measurement: weight plus composition figures. Weight
// is held in canonical kilograms alongside the unit it was entered in.
// Entries are immutable values; edits go through an EntryDraft and replace
// the stored row wholesale after re-validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::{format_weight, WeightUnit};

/// One logged measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Stable unique id, assigned once at creation.
    pub id: String,
    /// When the measurement was taken. Never in the future.
    pub date: DateTime<Utc>,
    /// Weight in canonical kilograms, strictly positive.
    pub weight_kg: f64,
    /// Muscle mass as a percentage of body weight, in [0, 100].
    pub muscle_mass_percent: f64,
    /// Body fat as a percentage of body weight, in [0, 100].
    pub body_fat_percent: f64,
    /// Visceral fat rating, a non-negative integer scale.
    pub visceral_fat: i64,
    /// Unit the weight was typed in, for faithful re-display.
    pub weight_unit: WeightUnit,
    /// File name of an attached photo inside the photo store, if any.
    pub photo: Option<String>,
    /// When the entry was first saved.
    pub created_at: DateTime<Utc>,
}

impl WeightEntry {
    /// Mints a new entry from a draft, assigning a fresh id.
    pub fn new(draft: EntryDraft) -> Self {
        WeightEntry {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            weight_kg: draft.weight_kg,
            muscle_mass_percent: draft.muscle_mass_percent,
            body_fat_percent: draft.body_fat_percent,
            visceral_fat: draft.visceral_fat,
            weight_unit: draft.weight_unit,
            photo: draft.photo,
            created_at: Utc::now(),
        }
    }

    /// The weight expressed in an arbitrary unit.
    pub fn weight_in(&self, unit: WeightUnit) -> f64 {
        unit.from_kilograms(self.weight_kg)
    }

    /// The weight as the user entered it, in the entry's own unit.
    pub fn entered_weight(&self) -> f64 {
        self.weight_in(self.weight_unit)
    }

    /// One-decimal rendering in the entry's own unit, e.g. `"82.4 kg"`.
    pub fn display_weight(&self) -> String {
        format_weight(self.weight_kg, self.weight_unit)
    }

    /// A draft carrying this entry's current values, for editing.
    pub fn draft(&self) -> EntryDraft {
        EntryDraft {
            date: self.date,
            weight_kg: self.weight_kg,
            muscle_mass_percent: self.muscle_mass_percent,
            body_fat_percent: self.body_fat_percent,
            visceral_fat: self.visceral_fat,
            weight_unit: self.weight_unit,
            photo: self.photo.clone(),
        }
    }
}

/// Candidate values for a new or edited entry, not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    pub muscle_mass_percent: f64,
    pub body_fat_percent: f64,
    pub visceral_fat: i64,
    pub weight_unit: WeightUnit,
    pub photo: Option<String>,
}

impl EntryDraft {
    /// A draft holding a weight in the given unit, dated now, composition
    /// figures zeroed.
    pub fn with_weight(weight: f64, unit: WeightUnit) -> Self {
        EntryDraft {
            date: Utc::now(),
            weight_kg: unit.to_kilograms(weight),
            muscle_mass_percent: 0.0,
            body_fat_percent: 0.0,
            visceral_fat: 0,
            weight_unit: unit,
            photo: None,
        }
    }
}
