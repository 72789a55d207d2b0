// Error taxonomy for validation and store operations
//
// Validation failures are always recovered locally: the offending field is
// reset and the message is surfaced through a transient notice. Store
// failures carry the underlying cause; SQLite atomicity guarantees a failed
// write leaves no half-applied entry state.

use std::path::PathBuf;

use thiserror::Error;

use crate::photo::PhotoError;

/// A violated input rule. `Display` renders the message shown to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Non-empty input that does not parse as a real number.
    #[error("Invalid number format")]
    NumberFormat,

    /// Non-empty input that does not parse as an integer.
    #[error("Invalid integer format!")]
    IntegerFormat,

    /// Percentage outside [0, 100].
    #[error("Value must be from 0 to 100")]
    PercentOutOfRange(f64),

    /// Muscle mass and body fat adding up past 100.
    #[error("Combined must not exceed 100%")]
    PercentSumExceeded { total: f64 },

    /// Negative where a non-negative integer is required.
    #[error("Must not be negative values!")]
    Negative(i64),

    /// Weight must be strictly positive.
    #[error("Weight must be greater than zero")]
    NonPositiveWeight(f64),

    /// Measurement date after the current time.
    #[error("Date must not be in the future")]
    FutureDate,

    /// A field the entry requires was left empty.
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Failures of the entry store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation referenced an id the store does not hold.
    #[error("No entry with id {0}")]
    NotFound(String),

    /// The candidate entry violated a validation rule. Nothing was applied.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The underlying SQLite read or write failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// A photo file could not be imported or released.
    #[error(transparent)]
    Photo(#[from] PhotoError),

    /// The store file itself could not be opened or prepared.
    #[error("Failed to open entry store at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
}
