use std::io::{Read, Write};
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::aggregate::{
    alcohol_correlation, build_monthly_summary, build_trends, build_weekly_summary,
    calculate_streak, month_bounds, streak_window_start, week_bounds, window_start,
};
use crate::csv_io::{self, CsvImportSummary};
use crate::db::Database;
use crate::error::{JournalError, JournalResult};
use crate::models::{
    AlcoholCorrelation, DailyEntry, MAX_WINDOW_DAYS, MonthlySummary, NewDailyEntry, Streak,
    WeeklySummary, WeightTrends, validate_new_entry,
};
use crate::store::EntryStore;

/// Journal operations over an entry store.
///
/// Every query takes "today" (or the period) explicitly, issues exactly one
/// range read, and computes its result from the returned rows alone.
pub struct JournalService<S = Database> {
    store: S,
}

impl JournalService<Database> {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { store: db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { store: db })
    }

    // --- Write path ---

    pub fn log_entry(&self, entry: &NewDailyEntry) -> Result<DailyEntry> {
        validate_new_entry(entry)?;
        self.store.upsert_entry(entry)
    }

    pub fn delete_entry(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        self.store.delete_entry(user_id, date)
    }

    // --- CSV ---

    pub fn export_csv<W: Write>(&self, user_id: &str, writer: W) -> Result<usize> {
        let entries = self.store.get_all_entries(user_id)?;
        csv_io::write_entries_csv(&entries, writer)?;
        Ok(entries.len())
    }

    pub fn import_csv<R: Read>(
        &self,
        user_id: &str,
        reader: R,
        dry_run: bool,
    ) -> Result<CsvImportSummary> {
        let rows = csv_io::parse_entries_csv(reader, user_id)?;
        csv_io::import_entries(&self.store, &rows, dry_run)
    }
}

impl<S: EntryStore> JournalService<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get_entry(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyEntry>> {
        self.store.get(user_id, date)
    }

    // --- Aggregations ---

    pub fn get_streak(&self, user_id: &str, today: NaiveDate) -> JournalResult<Streak> {
        check_user(user_id)?;
        let entries = self
            .store
            .get_range(user_id, streak_window_start(today), today)?;
        Ok(calculate_streak(today, &entries))
    }

    pub fn get_weight_trends(
        &self,
        user_id: &str,
        days: u32,
        today: NaiveDate,
    ) -> JournalResult<WeightTrends> {
        check_user(user_id)?;
        check_window(days)?;
        let entries = self
            .store
            .get_range(user_id, window_start(today, days), today)?;
        Ok(build_trends(today, days, &entries))
    }

    pub fn get_alcohol_correlation(
        &self,
        user_id: &str,
        days: u32,
        today: NaiveDate,
    ) -> JournalResult<AlcoholCorrelation> {
        check_user(user_id)?;
        check_window(days)?;
        let entries = self
            .store
            .get_range(user_id, window_start(today, days), today)?;
        Ok(alcohol_correlation(days, &entries))
    }

    pub fn get_monthly_summary(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> JournalResult<MonthlySummary> {
        check_user(user_id)?;
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            JournalError::InvalidArgument(format!("Invalid month {year}-{month:02}"))
        })?;
        let entries = self.store.get_range(user_id, first, last)?;
        Ok(build_monthly_summary(first, last, &entries))
    }

    pub fn get_weekly_summary(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> JournalResult<WeeklySummary> {
        check_user(user_id)?;
        let (start, end) = week_bounds(date);
        let entries = self.store.get_range(user_id, start, end)?;
        Ok(build_weekly_summary(date, &entries))
    }
}

fn check_user(user_id: &str) -> JournalResult<()> {
    if user_id.trim().is_empty() {
        return Err(JournalError::InvalidArgument(
            "User id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_window(days: u32) -> JournalResult<()> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(JournalError::InvalidArgument(format!(
            "Window must be between 1 and {MAX_WINDOW_DAYS} days (got {days})"
        )));
    }
    Ok(())
}
