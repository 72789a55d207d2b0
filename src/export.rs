// Backup and restore, as CSV or JSON
//
// Entries export with their ids and creation timestamps, so a restore is
// idempotent: rows whose id is already present are skipped, and importing
// the same file twice leaves the store unchanged.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::WeightEntry;
use crate::store::EntryStore;
use crate::units::WeightUnit;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Id")]
    id: String,

    #[serde(rename = "Date")]
    date: String,

    #[serde(rename = "Weight_Kg")]
    weight_kg: f64,

    #[serde(rename = "Muscle_Mass_Percent")]
    muscle_mass_percent: f64,

    #[serde(rename = "Body_Fat_Percent")]
    body_fat_percent: f64,

    #[serde(rename = "Visceral_Fat")]
    visceral_fat: i64,

    #[serde(rename = "Weight_Unit")]
    weight_unit: String,

    #[serde(rename = "Photo")]
    photo: Option<String>,

    #[serde(rename = "Created_At")]
    created_at: String,
}

impl From<&WeightEntry> for CsvRecord {
    fn from(entry: &WeightEntry) -> Self {
        CsvRecord {
            id: entry.id.clone(),
            date: entry.date.to_rfc3339(),
            weight_kg: entry.weight_kg,
            muscle_mass_percent: entry.muscle_mass_percent,
            body_fat_percent: entry.body_fat_percent,
            visceral_fat: entry.visceral_fat,
            weight_unit: entry.weight_unit.as_str().to_string(),
            photo: entry.photo.clone(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

impl CsvRecord {
    fn into_entry(self) -> Result<WeightEntry> {
        let date = parse_csv_date(&self.date)
            .with_context(|| format!("Invalid date in CSV row: {}", self.date))?;
        let created_at = parse_csv_date(&self.created_at)
            .with_context(|| format!("Invalid created_at in CSV row: {}", self.created_at))?;
        let weight_unit = WeightUnit::parse(&self.weight_unit)
            .with_context(|| format!("Unknown weight unit in CSV row: {}", self.weight_unit))?;
        Ok(WeightEntry {
            id: self.id,
            date,
            weight_kg: self.weight_kg,
            muscle_mass_percent: self.muscle_mass_percent,
            body_fat_percent: self.body_fat_percent,
            visceral_fat: self.visceral_fat,
            weight_unit,
            photo: self.photo.filter(|p| !p.is_empty()),
            created_at,
        })
    }
}

fn parse_csv_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Writes every entry to `path` in date order. Returns how many rows were
/// written.
pub fn export_csv(store: &EntryStore, path: &Path) -> Result<usize> {
    let entries = store.list_entries()?;
    let mut wtr = csv::Writer::from_path(path).context("Failed to create CSV file")?;

    for entry in &entries {
        wtr.serialize(CsvRecord::from(entry))
            .context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV file")?;

    Ok(entries.len())
}

/// Outcome of a CSV restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Reads entries from a CSV written by [`export_csv`] and inserts the ones
/// whose id the store does not hold yet.
pub fn import_csv(store: &mut EntryStore, path: &Path) -> Result<ImportSummary> {
    let mut rdr = csv::Reader::from_path(path).context("Failed to open CSV file")?;

    let mut summary = ImportSummary {
        imported: 0,
        skipped: 0,
    };
    for result in rdr.deserialize() {
        let record: CsvRecord = result.context("Failed to deserialize CSV row")?;
        let entry = record.into_entry()?;
        if store.restore_entry(&entry)? {
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
    }

    Ok(summary)
}

/// Writes every entry to `path` as a JSON array. Returns how many entries
/// were written.
pub fn export_json(store: &EntryStore, path: &Path) -> Result<usize> {
    let entries = store.list_entries()?;
    let file = File::create(path).context("Failed to create JSON file")?;
    serde_json::to_writer_pretty(BufWriter::new(file), &entries)
        .context("Failed to write JSON")?;
    Ok(entries.len())
}

/// Reads entries from a JSON array written by [`export_json`] and inserts
/// the ones whose id the store does not hold yet.
pub fn import_json(store: &mut EntryStore, path: &Path) -> Result<ImportSummary> {
    let file = File::open(path).context("Failed to open JSON file")?;
    let entries: Vec<WeightEntry> =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse JSON")?;

    let mut summary = ImportSummary {
        imported: 0,
        skipped: 0,
    };
    for entry in &entries {
        if store.restore_entry(entry)? {
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
    }

    Ok(summary)
}
