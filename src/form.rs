// Entry form state
//
// The form holds raw typed text per field plus the selected date, unit and
// photo. It is an immutable value: every action consumes the form and
// returns the successor state, so callers hold exactly one authoritative
// snapshot at a time. Validation runs when a field is committed (input
// leaves the field), not on every keystroke. A failed commit hands back the
// form with the offending field reset to empty, plus the violated rule for
// the caller to surface.

use chrono::{DateTime, Utc};

use crate::entry::{EntryDraft, WeightEntry};
use crate::error::ValidationError;
use crate::units::WeightUnit;
use crate::validate::{
    validate_date, validate_non_negative_integer, validate_percentage, validate_weight,
};

/// Form state for creating or editing one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub date: DateTime<Utc>,
    pub unit: WeightUnit,
    pub weight: String,
    pub muscle_mass: String,
    pub body_fat: String,
    pub visceral_fat: String,
    pub photo: Option<String>,
}

impl Default for EntryForm {
    fn default() -> Self {
        EntryForm::new(WeightUnit::Kilograms)
    }
}

impl EntryForm {
    /// An empty form dated now, weighing in the given unit.
    pub fn new(unit: WeightUnit) -> Self {
        EntryForm {
            date: Utc::now(),
            unit,
            weight: String::new(),
            muscle_mass: String::new(),
            body_fat: String::new(),
            visceral_fat: String::new(),
            photo: None,
        }
    }

    /// A form pre-filled from a stored entry, for editing. The weight text
    /// is rendered in the entry's own unit.
    pub fn for_entry(entry: &WeightEntry) -> Self {
        EntryForm {
            date: entry.date,
            unit: entry.weight_unit,
            weight: format!("{:.1}", entry.entered_weight()),
            muscle_mass: format!("{:.1}", entry.muscle_mass_percent),
            body_fat: format!("{:.1}", entry.body_fat_percent),
            visceral_fat: entry.visceral_fat.to_string(),
            photo: entry.photo.clone(),
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        self.photo = photo;
        self
    }

    pub fn type_weight(mut self, text: impl Into<String>) -> Self {
        self.weight = text.into();
        self
    }

    pub fn type_muscle_mass(mut self, text: impl Into<String>) -> Self {
        self.muscle_mass = text.into();
        self
    }

    pub fn type_body_fat(mut self, text: impl Into<String>) -> Self {
        self.body_fat = text.into();
        self
    }

    pub fn type_visceral_fat(mut self, text: impl Into<String>) -> Self {
        self.visceral_fat = text.into();
        self
    }

    /// Switches the weight unit, re-expressing the typed weight in the new
    /// unit so the figure on screen keeps meaning the same mass.
    pub fn select_unit(mut self, unit: WeightUnit) -> Self {
        if unit != self.unit {
            if let Ok(Some(value)) = validate_weight(&self.weight) {
                let kg = self.unit.to_kilograms(value);
                self.weight = format!("{:.1}", unit.from_kilograms(kg));
            }
            self.unit = unit;
        }
        self
    }

    /// Commits the weight field.
    pub fn commit_weight(mut self) -> (Self, Option<ValidationError>) {
        match validate_weight(&self.weight) {
            Ok(_) => (self, None),
            Err(err) => {
                self.weight.clear();
                (self, Some(err))
            }
        }
    }

    /// Commits the muscle mass field, checking the combined total against
    /// the currently typed body fat if that parses.
    pub fn commit_muscle_mass(mut self) -> (Self, Option<ValidationError>) {
        let other = committed_percent(&self.body_fat);
        match validate_percentage(&self.muscle_mass, other) {
            Ok(_) => (self, None),
            Err(err) => {
                self.muscle_mass.clear();
                (self, Some(err))
            }
        }
    }

    /// Commits the body fat field, checking the combined total against the
    /// currently typed muscle mass if that parses.
    pub fn commit_body_fat(mut self) -> (Self, Option<ValidationError>) {
        let other = committed_percent(&self.muscle_mass);
        match validate_percentage(&self.body_fat, other) {
            Ok(_) => (self, None),
            Err(err) => {
                self.body_fat.clear();
                (self, Some(err))
            }
        }
    }

    /// Commits the visceral fat field.
    pub fn commit_visceral_fat(mut self) -> (Self, Option<ValidationError>) {
        match validate_non_negative_integer(&self.visceral_fat) {
            Ok(_) => (self, None),
            Err(err) => {
                self.visceral_fat.clear();
                (self, Some(err))
            }
        }
    }

    /// Assembles the finished draft. Every figure is required here; on
    /// failure the form comes back with the offending field reset.
    pub fn finish(mut self, now: DateTime<Utc>) -> Result<EntryDraft, (Self, ValidationError)> {
        let weight = match validate_weight(&self.weight) {
            Ok(Some(value)) => value,
            Ok(None) => return Err((self, ValidationError::MissingField("Weight"))),
            Err(err) => {
                self.weight.clear();
                return Err((self, err));
            }
        };
        let muscle = match validate_percentage(&self.muscle_mass, committed_percent(&self.body_fat))
        {
            Ok(Some(value)) => value,
            Ok(None) => return Err((self, ValidationError::MissingField("Muscle mass"))),
            Err(err) => {
                self.muscle_mass.clear();
                return Err((self, err));
            }
        };
        let body_fat = match validate_percentage(&self.body_fat, Some(muscle)) {
            Ok(Some(value)) => value,
            Ok(None) => return Err((self, ValidationError::MissingField("Body fat"))),
            Err(err) => {
                self.body_fat.clear();
                return Err((self, err));
            }
        };
        let visceral = match validate_non_negative_integer(&self.visceral_fat) {
            Ok(Some(value)) => value,
            Ok(None) => return Err((self, ValidationError::MissingField("Visceral fat"))),
            Err(err) => {
                self.visceral_fat.clear();
                return Err((self, err));
            }
        };
        if let Err(err) = validate_date(self.date, now) {
            return Err((self, err));
        }
        Ok(EntryDraft {
            date: self.date,
            weight_kg: self.unit.to_kilograms(weight),
            muscle_mass_percent: muscle,
            body_fat_percent: body_fat,
            visceral_fat: visceral,
            weight_unit: self.unit,
            photo: self.photo,
        })
    }
}

/// The other percentage field's value, if it currently holds a valid one.
fn committed_percent(text: &str) -> Option<f64> {
    validate_percentage(text, None).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_commit_resets_offending_field() {
        let form = EntryForm::new(WeightUnit::Kilograms).type_muscle_mass("120");
        let (form, err) = form.commit_muscle_mass();
        assert_eq!(err, Some(ValidationError::PercentOutOfRange(120.0)));
        assert_eq!(form.muscle_mass, "");
    }

    #[test]
    fn test_combined_percentages_reject_second_field() {
        // Muscle 60 committed first, then body fat 45: sum 105.
        let form = EntryForm::new(WeightUnit::Kilograms).type_muscle_mass("60");
        let (form, err) = form.commit_muscle_mass();
        assert_eq!(err, None);

        let (form, err) = form.type_body_fat("45").commit_body_fat();
        assert_eq!(
            err,
            Some(ValidationError::PercentSumExceeded { total: 105.0 })
        );
        assert_eq!(form.body_fat, "");
        assert_eq!(form.muscle_mass, "60");
    }

    #[test]
    fn test_empty_commit_is_clean() {
        let (form, err) = EntryForm::new(WeightUnit::Kilograms).commit_body_fat();
        assert_eq!(err, None);
        let (_, err) = form.commit_visceral_fat();
        assert_eq!(err, None);
    }

    #[test]
    fn test_select_unit_re_expresses_weight_text() {
        let form = EntryForm::new(WeightUnit::Pounds)
            .type_weight("70")
            .select_unit(WeightUnit::Kilograms);
        assert_eq!(form.weight, "31.8");
        assert_eq!(form.unit, WeightUnit::Kilograms);

        // Garbage text survives a unit switch untouched.
        let form = EntryForm::new(WeightUnit::Kilograms)
            .type_weight("soon")
            .select_unit(WeightUnit::Stone);
        assert_eq!(form.weight, "soon");
        assert_eq!(form.unit, WeightUnit::Stone);
    }

    #[test]
    fn test_finish_normalizes_to_kilograms() {
        let draft = EntryForm::new(WeightUnit::Pounds)
            .type_weight("70")
            .type_muscle_mass("40")
            .type_body_fat("20")
            .type_visceral_fat("5")
            .finish(Utc::now())
            .unwrap();
        assert!((draft.weight_kg - 31.75144).abs() < 1e-9);
        assert_eq!(draft.weight_unit, WeightUnit::Pounds);
        assert_eq!(draft.visceral_fat, 5);
    }

    #[test]
    fn test_finish_requires_every_figure() {
        let result = EntryForm::new(WeightUnit::Kilograms)
            .type_weight("82")
            .type_muscle_mass("40")
            .type_body_fat("20")
            .finish(Utc::now());
        let (_, err) = result.unwrap_err();
        assert_eq!(err, ValidationError::MissingField("Visceral fat"));
    }

    #[test]
    fn test_finish_rejects_future_date() {
        let now = Utc::now();
        let result = EntryForm::new(WeightUnit::Kilograms)
            .with_date(now + Duration::days(1))
            .type_weight("82")
            .type_muscle_mass("40")
            .type_body_fat("20")
            .type_visceral_fat("5")
            .finish(now);
        let (form, err) = result.unwrap_err();
        assert_eq!(err, ValidationError::FutureDate);
        // Typed figures survive; only the date needs fixing.
        assert_eq!(form.weight, "82");
    }

    #[test]
    fn test_for_entry_prefills_in_entry_unit() {
        let draft = EntryDraft::with_weight(70.0, WeightUnit::Pounds);
        let entry = WeightEntry::new(EntryDraft {
            muscle_mass_percent: 40.0,
            body_fat_percent: 20.0,
            visceral_fat: 6,
            ..draft
        });
        let form = EntryForm::for_entry(&entry);
        assert_eq!(form.weight, "70.0");
        assert_eq!(form.unit, WeightUnit::Pounds);
        assert_eq!(form.visceral_fat, "6");
    }
}
