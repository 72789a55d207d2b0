// Entry store
//
// SQLite-backed collection of weight entries. Every mutation validates the
// candidate first and applies the row change in one statement, so a failed
// write never leaves a half-applied entry. Mutating operations take `&mut
// self`: the store has exactly one writer at a time by construction.
//
// Photo files are shared by content, so an entry's photo is only deleted
// from disk once no other entry references the same file.

use std::cmp::Ordering;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::entry::{EntryDraft, WeightEntry};
use crate::error::StoreError;
use crate::photo::PhotoStore;
use crate::units::WeightUnit;
use crate::validate::validate_entry;

const ENTRY_COLUMNS: &str = "id, date, weight_kg, muscle_mass_percent, body_fat_percent, \
     visceral_fat, weight_unit, photo, created_at";

/// Persistent store of weight entries, optionally owning a photo directory.
pub struct EntryStore {
    conn: Connection,
    photos: Option<PhotoStore>,
}

impl EntryStore {
    /// Opens (or creates) the store at the given database path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let store = EntryStore { conn, photos: None };
        store.setup_schema()?;
        Ok(store)
    }

    /// An ephemeral in-memory store, for tests and dry runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = EntryStore { conn, photos: None };
        store.setup_schema()?;
        Ok(store)
    }

    /// Attaches the photo directory this store manages files in.
    pub fn with_photos(mut self, photos: PhotoStore) -> Self {
        self.photos = Some(photos);
        self
    }

    pub fn photos(&self) -> Option<&PhotoStore> {
        self.photos.as_ref()
    }

    fn setup_schema(&self) -> Result<(), StoreError> {
        // WAL keeps readers unblocked during writes and survives crashes.
        self.conn.pragma_update(None, "journal_mode", "WAL")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                muscle_mass_percent REAL NOT NULL,
                body_fat_percent REAL NOT NULL,
                visceral_fat INTEGER NOT NULL,
                weight_unit TEXT NOT NULL,
                photo TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date)",
            [],
        )?;

        Ok(())
    }

    /// Validates the draft and appends it as a new entry.
    pub fn add_entry(&mut self, draft: EntryDraft) -> Result<WeightEntry, StoreError> {
        validate_entry(&draft, Utc::now())?;
        let entry = WeightEntry::new(draft);

        self.conn.execute(
            &format!("INSERT INTO entries ({ENTRY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                entry.id,
                entry.date.to_rfc3339(),
                entry.weight_kg,
                entry.muscle_mass_percent,
                entry.body_fat_percent,
                entry.visceral_fat,
                entry.weight_unit.as_str(),
                entry.photo,
                entry.created_at.to_rfc3339(),
            ],
        )?;

        debug!(id = %entry.id, weight_kg = entry.weight_kg, "added entry");
        Ok(entry)
    }

    /// Replaces an existing entry's values after re-validating them. The id
    /// and creation timestamp are preserved.
    pub fn update_entry(&mut self, id: &str, draft: EntryDraft) -> Result<WeightEntry, StoreError> {
        let existing = self
            .entry(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        validate_entry(&draft, Utc::now())?;

        let updated = WeightEntry {
            id: existing.id.clone(),
            date: draft.date,
            weight_kg: draft.weight_kg,
            muscle_mass_percent: draft.muscle_mass_percent,
            body_fat_percent: draft.body_fat_percent,
            visceral_fat: draft.visceral_fat,
            weight_unit: draft.weight_unit,
            photo: draft.photo,
            created_at: existing.created_at,
        };

        self.conn.execute(
            "UPDATE entries
             SET date = ?2, weight_kg = ?3, muscle_mass_percent = ?4,
                 body_fat_percent = ?5, visceral_fat = ?6, weight_unit = ?7,
                 photo = ?8
             WHERE id = ?1",
            params![
                updated.id,
                updated.date.to_rfc3339(),
                updated.weight_kg,
                updated.muscle_mass_percent,
                updated.body_fat_percent,
                updated.visceral_fat,
                updated.weight_unit.as_str(),
                updated.photo,
            ],
        )?;

        // The old photo may have lost its last reference.
        if let Some(old) = existing.photo {
            if updated.photo.as_deref() != Some(old.as_str()) {
                self.release_photo(&old)?;
            }
        }

        debug!(id = %updated.id, "updated entry");
        Ok(updated)
    }

    /// Re-inserts an entry that already carries its identity, keeping id
    /// and creation timestamp. An id the store already holds is skipped, so
    /// restoring the same backup twice changes nothing. Returns whether the
    /// entry was inserted.
    pub(crate) fn restore_entry(&mut self, entry: &WeightEntry) -> Result<bool, StoreError> {
        validate_entry(&entry.draft(), Utc::now())?;

        let result = self.conn.execute(
            &format!("INSERT INTO entries ({ENTRY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                entry.id,
                entry.date.to_rfc3339(),
                entry.weight_kg,
                entry.muscle_mass_percent,
                entry.body_fat_percent,
                entry.visceral_fat,
                entry.weight_unit.as_str(),
                entry.photo,
                entry.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes an entry. Returns whether an entry was actually deleted;
    /// deleting an unknown id is a no-op.
    pub fn delete_entry(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(existing) = self.entry(id)? else {
            return Ok(false);
        };

        self.conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;

        if let Some(photo) = existing.photo {
            self.release_photo(&photo)?;
        }

        debug!(id = %id, "deleted entry");
        Ok(true)
    }

    /// Deletes the photo file once no entry references it anymore. Losing
    /// the file is not worth failing the entry operation over; a failed
    /// removal is logged and left for the next cleanup.
    fn release_photo(&self, name: &str) -> Result<(), StoreError> {
        let refs: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE photo = ?1",
            params![name],
            |row| row.get(0),
        )?;
        if refs > 0 {
            return Ok(());
        }
        if let Some(photos) = &self.photos {
            if let Err(err) = photos.remove(name) {
                warn!(photo = %name, error = %err, "failed to remove orphaned photo");
            }
        }
        Ok(())
    }

    /// One entry by id.
    pub fn entry(&self, id: &str) -> Result<Option<WeightEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id], entry_from_row)?;
        match rows.next() {
            Some(entry) => Ok(Some(entry?)),
            None => Ok(None),
        }
    }

    /// All entries, oldest first. Each call re-reads the store, so the view
    /// can be restarted at any time.
    pub fn list_entries(&self) -> Result<Vec<WeightEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY date ASC, created_at ASC"
        ))?;
        let entries = stmt
            .query_map([], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// All entries in an order of the caller's choosing.
    pub fn list_entries_by<F>(&self, mut compare: F) -> Result<Vec<WeightEntry>, StoreError>
    where
        F: FnMut(&WeightEntry, &WeightEntry) -> Ordering,
    {
        let mut entries = self.list_entries()?;
        entries.sort_by(&mut compare);
        Ok(entries)
    }

    /// History order: most recent measurement first.
    pub fn newest_first(&self) -> Result<Vec<WeightEntry>, StoreError> {
        self.list_entries_by(|a, b| b.date.cmp(&a.date))
    }

    /// The entry with the maximum date, if any.
    pub fn latest_entry(&self) -> Result<Option<WeightEntry>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY date DESC, created_at DESC LIMIT 1"
        ))?;
        let mut rows = stmt.query_map([], entry_from_row)?;
        match rows.next() {
            Some(entry) => Ok(Some(entry?)),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightEntry> {
    let date_str: String = row.get(1)?;
    let unit_str: String = row.get(6)?;
    let created_str: String = row.get(8)?;

    Ok(WeightEntry {
        id: row.get(0)?,
        date: parse_stored_date(&date_str)?,
        weight_kg: row.get(2)?,
        muscle_mass_percent: row.get(3)?,
        body_fat_percent: row.get(4)?,
        visceral_fat: row.get(5)?,
        weight_unit: WeightUnit::parse(&unit_str).ok_or(rusqlite::Error::InvalidQuery)?,
        photo: row.get(7)?,
        created_at: parse_stored_date(&created_str)?,
    })
}

fn parse_stored_date(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| rusqlite::Error::InvalidQuery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    use crate::error::ValidationError;

    fn create_test_store() -> EntryStore {
        EntryStore::open_in_memory().unwrap()
    }

    fn create_test_draft(days_ago: i64, weight_kg: f64) -> EntryDraft {
        EntryDraft {
            date: Utc::now() - Duration::days(days_ago),
            weight_kg,
            muscle_mass_percent: 40.0,
            body_fat_percent: 20.0,
            visceral_fat: 6,
            weight_unit: WeightUnit::Kilograms,
            photo: None,
        }
    }

    #[test]
    fn test_add_then_list_contains_the_entry() {
        let mut store = create_test_store();
        assert_eq!(store.count().unwrap(), 0);

        let added = store.add_entry(create_test_draft(1, 82.5)).unwrap();
        let entries = store.list_entries().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, added.id);
        assert_eq!(entries[0].weight_kg, 82.5);
        assert_eq!(entries[0].visceral_fat, 6);
    }

    #[test]
    fn test_add_normalizes_any_input_unit_to_kilograms() {
        let mut store = create_test_store();
        let mut draft = create_test_draft(1, 0.0);
        draft.weight_kg = WeightUnit::Pounds.to_kilograms(70.0);
        draft.weight_unit = WeightUnit::Pounds;

        store.add_entry(draft).unwrap();
        let entry = &store.list_entries().unwrap()[0];

        assert!((entry.weight_kg - 31.75144).abs() < 1e-6);
        assert_eq!(entry.weight_unit, WeightUnit::Pounds);
        // Round-trips through storage intact.
        assert!((entry.entered_weight() - 70.0).abs() < 1e-3);
    }

    #[test]
    fn test_add_rejects_invalid_draft_without_side_effects() {
        let mut store = create_test_store();
        let mut draft = create_test_draft(0, 82.5);
        draft.date = Utc::now() + Duration::days(1);

        let err = store.add_entry(draft).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid(ValidationError::FutureDate)
        ));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_replaces_values_and_preserves_identity() {
        let mut store = create_test_store();
        let original = store.add_entry(create_test_draft(2, 82.5)).unwrap();

        let mut draft = original.draft();
        draft.weight_kg = 81.0;
        draft.body_fat_percent = 19.0;
        let updated = store.update_entry(&original.id, draft).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.weight_kg, 81.0);

        let stored = store.entry(&original.id).unwrap().unwrap();
        assert_eq!(stored.weight_kg, 81.0);
        assert_eq!(stored.body_fat_percent, 19.0);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = create_test_store();
        let err = store
            .update_entry("no-such-id", create_test_draft(1, 80.0))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "no-such-id"));
    }

    #[test]
    fn test_update_revalidates_the_merged_result() {
        let mut store = create_test_store();
        let original = store.add_entry(create_test_draft(2, 82.5)).unwrap();

        let mut draft = original.draft();
        draft.muscle_mass_percent = 60.0;
        draft.body_fat_percent = 45.0;
        let err = store.update_entry(&original.id, draft).unwrap_err();

        assert!(matches!(
            err,
            StoreError::Invalid(ValidationError::PercentSumExceeded { .. })
        ));
        // Stored values untouched.
        let stored = store.entry(&original.id).unwrap().unwrap();
        assert_eq!(stored.muscle_mass_percent, 40.0);
    }

    #[test]
    fn test_delete_removes_exactly_the_matching_entry() {
        let mut store = create_test_store();
        let keep = store.add_entry(create_test_draft(3, 83.0)).unwrap();
        let gone = store.add_entry(create_test_draft(2, 82.0)).unwrap();
        let keep_too = store.add_entry(create_test_draft(1, 81.0)).unwrap();

        assert!(store.delete_entry(&gone.id).unwrap());

        let ids: Vec<String> = store
            .list_entries()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![keep.id, keep_too.id]);
    }

    #[test]
    fn test_delete_unknown_id_is_a_no_op() {
        let mut store = create_test_store();
        store.add_entry(create_test_draft(1, 82.0)).unwrap();

        assert!(!store.delete_entry("missing").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_list_default_is_ascending_by_date() {
        let mut store = create_test_store();
        store.add_entry(create_test_draft(1, 81.0)).unwrap();
        store.add_entry(create_test_draft(5, 85.0)).unwrap();
        store.add_entry(create_test_draft(3, 83.0)).unwrap();

        let dates: Vec<DateTime<Utc>> =
            store.list_entries().unwrap().iter().map(|e| e.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_caller_supplied_sort_order() {
        let mut store = create_test_store();
        store.add_entry(create_test_draft(1, 81.0)).unwrap();
        store.add_entry(create_test_draft(5, 85.0)).unwrap();
        store.add_entry(create_test_draft(3, 83.0)).unwrap();

        let newest = store.newest_first().unwrap();
        assert!(newest[0].date > newest[1].date && newest[1].date > newest[2].date);

        let heaviest = store
            .list_entries_by(|a, b| b.weight_kg.total_cmp(&a.weight_kg))
            .unwrap();
        assert_eq!(heaviest[0].weight_kg, 85.0);
        assert_eq!(heaviest[2].weight_kg, 81.0);
    }

    #[test]
    fn test_latest_entry_tracks_maximum_date() {
        let mut store = create_test_store();
        assert!(store.latest_entry().unwrap().is_none());

        store.add_entry(create_test_draft(5, 85.0)).unwrap();
        let newest = store.add_entry(create_test_draft(1, 81.0)).unwrap();
        store.add_entry(create_test_draft(3, 83.0)).unwrap();

        assert_eq!(store.latest_entry().unwrap().unwrap().id, newest.id);
    }

    #[test]
    fn test_shared_photo_survives_until_last_reference() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::open(dir.path().join("photos")).unwrap();
        let name = photos.import_bytes(b"shared shot", "jpg").unwrap();

        let mut store = create_test_store().with_photos(photos);
        let mut first = create_test_draft(2, 82.0);
        first.photo = Some(name.clone());
        let mut second = create_test_draft(1, 81.5);
        second.photo = Some(name.clone());

        let first = store.add_entry(first).unwrap();
        let second = store.add_entry(second).unwrap();

        store.delete_entry(&first.id).unwrap();
        assert!(store.photos().unwrap().exists(&name));

        store.delete_entry(&second.id).unwrap();
        assert!(!store.photos().unwrap().exists(&name));
    }

    #[test]
    fn test_update_releases_replaced_photo() {
        let dir = tempdir().unwrap();
        let photos = PhotoStore::open(dir.path().join("photos")).unwrap();
        let old = photos.import_bytes(b"before", "jpg").unwrap();
        let new = photos.import_bytes(b"after", "jpg").unwrap();

        let mut store = create_test_store().with_photos(photos);
        let mut draft = create_test_draft(1, 82.0);
        draft.photo = Some(old.clone());
        let entry = store.add_entry(draft).unwrap();

        let mut draft = entry.draft();
        draft.photo = Some(new.clone());
        store.update_entry(&entry.id, draft).unwrap();

        assert!(!store.photos().unwrap().exists(&old));
        assert!(store.photos().unwrap().exists(&new));
    }
}
