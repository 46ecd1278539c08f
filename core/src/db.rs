use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::models::{DailyEntry, NewDailyEntry};
use crate::store::EntryStore;

const ENTRY_COLUMNS: &str = "id, uuid, user_id, date, protein, vegetable, fruit, starch, fat, dairy,
     water_segments, weight, compliant, alcohol, created_at, updated_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        tracing::info!(path = %path.display(), "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS daily_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    protein INTEGER NOT NULL DEFAULT 0,
                    vegetable INTEGER NOT NULL DEFAULT 0,
                    fruit INTEGER NOT NULL DEFAULT 0,
                    starch INTEGER NOT NULL DEFAULT 0,
                    fat INTEGER NOT NULL DEFAULT 0,
                    dairy INTEGER NOT NULL DEFAULT 0,
                    water_segments INTEGER NOT NULL DEFAULT 0
                        CHECK (water_segments BETWEEN 0 AND 8),
                    weight REAL,
                    compliant INTEGER,
                    alcohol INTEGER,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE (user_id, date)
                );

                CREATE INDEX IF NOT EXISTS idx_daily_entries_user_date
                    ON daily_entries(user_id, date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<DailyEntry> {
        let date_str: String = row.get(3)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(DailyEntry {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date,
            protein: row.get(4)?,
            vegetable: row.get(5)?,
            fruit: row.get(6)?,
            starch: row.get(7)?,
            fat: row.get(8)?,
            dairy: row.get(9)?,
            water_segments: row.get(10)?,
            weight: row.get(11)?,
            compliant: row.get(12)?,
            alcohol: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }

    // --- Daily entries ---

    /// Insert the day's entry, or replace every value of an existing one.
    /// The row keeps its `uuid` and `created_at` across replacements.
    pub fn upsert_entry(&self, entry: &NewDailyEntry) -> Result<DailyEntry> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO daily_entries (uuid, user_id, date, protein, vegetable, fruit, starch,
                fat, dairy, water_segments, weight, compliant, alcohol, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(user_id, date) DO UPDATE SET
                protein = excluded.protein,
                vegetable = excluded.vegetable,
                fruit = excluded.fruit,
                starch = excluded.starch,
                fat = excluded.fat,
                dairy = excluded.dairy,
                water_segments = excluded.water_segments,
                weight = excluded.weight,
                compliant = excluded.compliant,
                alcohol = excluded.alcohol,
                updated_at = excluded.updated_at",
            params![
                uuid,
                entry.user_id,
                date_str,
                entry.protein,
                entry.vegetable,
                entry.fruit,
                entry.starch,
                entry.fat,
                entry.dairy,
                entry.water_segments,
                entry.weight,
                entry.compliant,
                entry.alcohol,
                now,
                now
            ],
        )?;
        self.get_entry(&entry.user_id, entry.date)?
            .context("Daily entry not found after upsert")
    }

    pub fn get_entry(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyEntry>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM daily_entries WHERE user_id = ?1 AND date = ?2"
        ))?;
        let mut rows = stmt.query(params![user_id, date_str])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::entry_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Entries for `user_id` with `start <= date <= end`, oldest first.
    pub fn get_entries_in_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEntry>> {
        let start_str = start.format("%Y-%m-%d").to_string();
        let end_str = end.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM daily_entries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC"
        ))?;
        let entries = stmt
            .query_map(params![user_id, start_str, end_str], Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(user_id, %start, %end, rows = entries.len(), "range read");
        Ok(entries)
    }

    pub fn get_all_entries(&self, user_id: &str) -> Result<Vec<DailyEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENTRY_COLUMNS} FROM daily_entries WHERE user_id = ?1 ORDER BY date ASC"
        ))?;
        let entries = stmt
            .query_map(params![user_id], Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn delete_entry(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "DELETE FROM daily_entries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date_str],
        )?;
        Ok(rows > 0)
    }
}

impl EntryStore for Database {
    fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyEntry>> {
        self.get_entry(user_id, date)
    }

    fn get_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEntry>> {
        self.get_entries_in_range(user_id, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_entry(date: NaiveDate) -> NewDailyEntry {
        NewDailyEntry {
            protein: 4,
            vegetable: 3,
            water_segments: 6,
            weight: Some(182.4),
            compliant: Some(true),
            alcohol: Some(false),
            ..NewDailyEntry::blank("alice", date)
        }
    }

    #[test]
    fn test_upsert_entry_creates_new_entry() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        let entry = db.upsert_entry(&sample_entry(day)).unwrap();

        assert_eq!(entry.date, day);
        assert_eq!(entry.user_id, "alice");
        assert_eq!(entry.protein, 4);
        assert_eq!(entry.water_segments, 6);
        assert_eq!(entry.weight, Some(182.4));
        assert_eq!(entry.compliant, Some(true));
        assert_eq!(entry.alcohol, Some(false));
        assert!(!entry.uuid.is_empty());
    }

    #[test]
    fn test_upsert_entry_replaces_existing_for_same_date() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        let first = db.upsert_entry(&sample_entry(day)).unwrap();

        let updated = db
            .upsert_entry(&NewDailyEntry {
                fruit: 2,
                ..NewDailyEntry::blank("alice", day)
            })
            .unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.uuid, first.uuid);
        assert_eq!(updated.created_at, first.created_at);
        assert_eq!(updated.fruit, 2);
        assert_eq!(updated.protein, 0);
        assert!(updated.weight.is_none());
        assert!(updated.compliant.is_none());

        let all = db.get_all_entries("alice").unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_entries_are_scoped_per_user() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        db.upsert_entry(&sample_entry(day)).unwrap();
        db.upsert_entry(&NewDailyEntry::blank("bob", day)).unwrap();

        assert!(db.get_entry("bob", day).unwrap().unwrap().weight.is_none());
        assert_eq!(db.get_entry("alice", day).unwrap().unwrap().weight, Some(182.4));
        assert!(db.get_all_entries("carol").unwrap().is_empty());
    }

    #[test]
    fn test_get_entry_returns_none_for_missing_date() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_entry("alice", date(2025, 6, 1)).unwrap().is_none());
    }

    #[test]
    fn test_optional_fields_round_trip_as_null() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        let mut new = NewDailyEntry::blank("alice", day);
        new.compliant = Some(false);
        db.upsert_entry(&new).unwrap();

        let entry = db.get_entry("alice", day).unwrap().unwrap();
        assert_eq!(entry.compliant, Some(false));
        assert!(entry.alcohol.is_none());
        assert!(entry.weight.is_none());
    }

    #[test]
    fn test_get_entries_in_range_inclusive_and_ordered() {
        let db = Database::open_in_memory().unwrap();
        for day in [12, 10, 15, 11, 20] {
            db.upsert_entry(&sample_entry(date(2025, 1, day))).unwrap();
        }

        let entries = db
            .get_entries_in_range("alice", date(2025, 1, 10), date(2025, 1, 15))
            .unwrap();
        let days: Vec<_> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            days,
            vec![
                date(2025, 1, 10),
                date(2025, 1, 11),
                date(2025, 1, 12),
                date(2025, 1, 15)
            ]
        );
    }

    #[test]
    fn test_get_entries_in_range_is_sparse() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry(date(2025, 1, 12))).unwrap();
        let entries = db
            .get_entries_in_range("alice", date(2025, 1, 1), date(2025, 1, 31))
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        db.upsert_entry(&sample_entry(day)).unwrap();

        assert!(db.delete_entry("alice", day).unwrap());
        assert!(db.get_entry("alice", day).unwrap().is_none());
        assert!(!db.delete_entry("alice", day).unwrap());
    }

    #[test]
    fn test_water_check_constraint() {
        let db = Database::open_in_memory().unwrap();
        let mut new = NewDailyEntry::blank("alice", date(2025, 1, 15));
        new.water_segments = 9;
        assert!(db.upsert_entry(&new).is_err());
    }

    #[test]
    fn test_store_trait_delegates() {
        let db = Database::open_in_memory().unwrap();
        let day = date(2025, 1, 15);
        db.upsert_entry(&sample_entry(day)).unwrap();

        let store: &dyn EntryStore = &db;
        assert!(store.get("alice", day).unwrap().is_some());
        assert_eq!(store.get_range("alice", day, day).unwrap().len(), 1);
    }

    #[test]
    fn test_migration_sets_user_version() {
        let db = Database::open_in_memory().unwrap();
        let version: i64 = db
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portion.db");
        {
            let db = Database::open(&path).unwrap();
            db.upsert_entry(&sample_entry(date(2025, 1, 15))).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_all_entries("alice").unwrap().len(), 1);
    }
}
