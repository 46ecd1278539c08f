use anyhow::Result;
use chrono::NaiveDate;

use crate::models::DailyEntry;

/// Keyed range store for per-user daily entries.
///
/// `get_range` bounds are inclusive and rows come back ordered by date
/// ascending. Days without a row are simply absent from the result.
pub trait EntryStore {
    fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyEntry>>;
    fn get_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEntry>>;
}

impl<S: EntryStore + ?Sized> EntryStore for &S {
    fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyEntry>> {
        (**self).get(user_id, date)
    }

    fn get_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyEntry>> {
        (**self).get_range(user_id, start, end)
    }
}
