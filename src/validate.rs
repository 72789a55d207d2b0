// Field and entry validation
//
// Field validators take raw typed text and return the parsed value, or None
// for empty input (an uncommitted field), or the violated rule. Entry
// validation re-checks every figure on the assembled draft so the store
// never has to trust its callers.

use chrono::{DateTime, Utc};

use crate::entry::EntryDraft;
use crate::error::ValidationError;

/// Upper bound for a single composition percentage and for the combined
/// muscle mass + body fat total.
pub const PERCENT_LIMIT: f64 = 100.0;

fn percent_in_range(value: f64) -> bool {
    (0.0..=PERCENT_LIMIT).contains(&value)
}

/// Validates one percentage field against its own range and against the
/// combined total with the other composition percentage, if that field has
/// a committed value. Empty input is not an error; it yields `None`.
pub fn validate_percentage(
    input: &str,
    other: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NumberFormat)?;
    if !value.is_finite() {
        return Err(ValidationError::NumberFormat);
    }
    if !percent_in_range(value) {
        return Err(ValidationError::PercentOutOfRange(value));
    }
    if let Some(other) = other {
        let total = value + other;
        if total > PERCENT_LIMIT {
            return Err(ValidationError::PercentSumExceeded { total });
        }
    }
    Ok(Some(value))
}

/// Validates a non-negative integer field such as the visceral fat rating.
/// Empty input yields `None`; fractional input is a format error, not a
/// truncation.
pub fn validate_non_negative_integer(input: &str) -> Result<Option<i64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::IntegerFormat)?;
    if value < 0 {
        return Err(ValidationError::Negative(value));
    }
    Ok(Some(value))
}

/// Validates a weight field. The figure must be a strictly positive real
/// number; the unit is the caller's concern.
pub fn validate_weight(input: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NumberFormat)?;
    if !value.is_finite() {
        return Err(ValidationError::NumberFormat);
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveWeight(value));
    }
    Ok(Some(value))
}

/// Rejects measurement dates after `now`.
pub fn validate_date(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if date > now {
        return Err(ValidationError::FutureDate);
    }
    Ok(())
}

/// Validates a whole draft, reporting the first violated rule. Field order
/// mirrors the entry form: weight, muscle mass, body fat, combined total,
/// visceral fat, date.
pub fn validate_entry(draft: &EntryDraft, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if !(draft.weight_kg > 0.0) || !draft.weight_kg.is_finite() {
        return Err(ValidationError::NonPositiveWeight(draft.weight_kg));
    }
    if !percent_in_range(draft.muscle_mass_percent) {
        return Err(ValidationError::PercentOutOfRange(draft.muscle_mass_percent));
    }
    if !percent_in_range(draft.body_fat_percent) {
        return Err(ValidationError::PercentOutOfRange(draft.body_fat_percent));
    }
    let total = draft.muscle_mass_percent + draft.body_fat_percent;
    if total > PERCENT_LIMIT {
        return Err(ValidationError::PercentSumExceeded { total });
    }
    if draft.visceral_fat < 0 {
        return Err(ValidationError::Negative(draft.visceral_fat));
    }
    validate_date(draft.date, now)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::units::WeightUnit;

    fn create_test_draft() -> EntryDraft {
        EntryDraft {
            date: Utc::now() - Duration::hours(1),
            weight_kg: 82.5,
            muscle_mass_percent: 41.0,
            body_fat_percent: 20.5,
            visceral_fat: 7,
            weight_unit: WeightUnit::Kilograms,
            photo: None,
        }
    }

    #[test]
    fn test_percentage_accepts_valid_pairs() {
        for (p1, p2) in [(0.0, 0.0), (40.0, 60.0), (33.3, 66.6), (100.0, 0.0)] {
            assert_eq!(
                validate_percentage(&p1.to_string(), Some(p2)),
                Ok(Some(p1)),
                "{p1} with other {p2} should pass"
            );
        }
    }

    #[test]
    fn test_percentage_rejects_out_of_range() {
        assert_eq!(
            validate_percentage("120", None),
            Err(ValidationError::PercentOutOfRange(120.0))
        );
        assert_eq!(
            validate_percentage("-0.5", None),
            Err(ValidationError::PercentOutOfRange(-0.5))
        );
    }

    #[test]
    fn test_percentage_rejects_combined_over_limit() {
        // Muscle 60 already committed, body fat 45 typed: 105 > 100.
        let err = validate_percentage("45", Some(60.0)).unwrap_err();
        assert_eq!(err, ValidationError::PercentSumExceeded { total: 105.0 });
        assert_eq!(err.to_string(), "Combined must not exceed 100%");
    }

    #[test]
    fn test_percentage_empty_is_not_an_error() {
        assert_eq!(validate_percentage("", None), Ok(None));
        assert_eq!(validate_percentage("   ", Some(50.0)), Ok(None));
    }

    #[test]
    fn test_percentage_rejects_garbage_and_non_finite() {
        assert_eq!(
            validate_percentage("abc", None),
            Err(ValidationError::NumberFormat)
        );
        assert_eq!(
            validate_percentage("NaN", None),
            Err(ValidationError::NumberFormat)
        );
        assert_eq!(
            validate_percentage("inf", None),
            Err(ValidationError::NumberFormat)
        );
    }

    #[test]
    fn test_integer_rejects_negatives() {
        for n in [-1i64, -7, -1000] {
            assert_eq!(
                validate_non_negative_integer(&n.to_string()),
                Err(ValidationError::Negative(n))
            );
        }
    }

    #[test]
    fn test_integer_rejects_fractions() {
        assert_eq!(
            validate_non_negative_integer("3.5"),
            Err(ValidationError::IntegerFormat)
        );
    }

    #[test]
    fn test_integer_accepts_zero_and_empty() {
        assert_eq!(validate_non_negative_integer("0"), Ok(Some(0)));
        assert_eq!(validate_non_negative_integer("12"), Ok(Some(12)));
        assert_eq!(validate_non_negative_integer(""), Ok(None));
    }

    #[test]
    fn test_weight_must_be_positive() {
        assert_eq!(validate_weight("82.5"), Ok(Some(82.5)));
        assert_eq!(
            validate_weight("0"),
            Err(ValidationError::NonPositiveWeight(0.0))
        );
        assert_eq!(
            validate_weight("-4"),
            Err(ValidationError::NonPositiveWeight(-4.0))
        );
        assert_eq!(validate_weight("heavy"), Err(ValidationError::NumberFormat));
        assert_eq!(validate_weight(""), Ok(None));
    }

    #[test]
    fn test_date_in_future_rejected() {
        let now = Utc::now();
        assert_eq!(validate_date(now, now), Ok(()));
        assert_eq!(validate_date(now - Duration::days(3), now), Ok(()));
        assert_eq!(
            validate_date(now + Duration::days(1), now),
            Err(ValidationError::FutureDate)
        );
    }

    #[test]
    fn test_entry_passes_when_all_rules_hold() {
        assert_eq!(validate_entry(&create_test_draft(), Utc::now()), Ok(()));
    }

    #[test]
    fn test_entry_rejects_non_finite_weight() {
        let mut draft = create_test_draft();
        draft.weight_kg = f64::INFINITY;
        assert!(matches!(
            validate_entry(&draft, Utc::now()),
            Err(ValidationError::NonPositiveWeight(_))
        ));
    }

    #[test]
    fn test_entry_reports_first_violation() {
        let now = Utc::now();

        let mut draft = create_test_draft();
        draft.weight_kg = 0.0;
        draft.visceral_fat = -2;
        // Weight is checked before visceral fat.
        assert_eq!(
            validate_entry(&draft, now),
            Err(ValidationError::NonPositiveWeight(0.0))
        );

        let mut draft = create_test_draft();
        draft.muscle_mass_percent = 60.0;
        draft.body_fat_percent = 45.0;
        assert_eq!(
            validate_entry(&draft, now),
            Err(ValidationError::PercentSumExceeded { total: 105.0 })
        );

        let mut draft = create_test_draft();
        draft.date = now + Duration::days(1);
        assert_eq!(validate_entry(&draft, now), Err(ValidationError::FutureDate));
    }
}
