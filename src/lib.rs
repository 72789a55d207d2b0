// Weight Log - Core Library
// Exposes all modules for use in the TUI, CLI, and tests

pub mod error;
pub mod units;
pub mod entry;
pub mod validate;
pub mod form;
pub mod notice;
pub mod photo;
pub mod config;
pub mod store;
pub mod export;
pub mod logging;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use entry::{EntryDraft, WeightEntry};
pub use error::{StoreError, ValidationError};
pub use export::{export_csv, export_json, import_csv, import_json, ImportSummary};
pub use form::EntryForm;
pub use notice::{Notice, NoticeBoard, NoticeToken, NOTICE_TTL};
pub use photo::{PhotoError, PhotoStore};
pub use store::EntryStore;
pub use units::{format_percent, format_weight, WeightUnit};
pub use validate::{
    validate_date, validate_entry, validate_non_negative_integer, validate_percentage,
    validate_weight, PERCENT_LIMIT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
