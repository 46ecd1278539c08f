use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::DailyEntry;

/// The public values of one day, as every aggregator sees them.
///
/// A date with no stored row projects to [`EntryValues::empty`], which is
/// indistinguishable from a stored row whose optional fields are all null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryValues {
    pub date: NaiveDate,
    pub protein: u32,
    pub vegetable: u32,
    pub fruit: u32,
    pub starch: u32,
    pub fat: u32,
    pub dairy: u32,
    pub water_segments: u32,
    pub weight: Option<f64>,
    pub compliant: Option<bool>,
    pub alcohol: Option<bool>,
}

impl EntryValues {
    /// True when any counter is non-zero or any optional field is present.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.protein > 0
            || self.vegetable > 0
            || self.fruit > 0
            || self.starch > 0
            || self.fat > 0
            || self.dairy > 0
            || self.water_segments > 0
            || self.weight.is_some()
            || self.compliant.is_some()
            || self.alcohol.is_some()
    }

    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            protein: 0,
            vegetable: 0,
            fruit: 0,
            starch: 0,
            fat: 0,
            dairy: 0,
            water_segments: 0,
            weight: None,
            compliant: None,
            alcohol: None,
        }
    }
}

impl From<&DailyEntry> for EntryValues {
    fn from(entry: &DailyEntry) -> Self {
        Self {
            date: entry.date,
            protein: entry.protein,
            vegetable: entry.vegetable,
            fruit: entry.fruit,
            starch: entry.starch,
            fat: entry.fat,
            dairy: entry.dairy,
            water_segments: entry.water_segments,
            weight: entry.weight,
            compliant: entry.compliant,
            alcohol: entry.alcohol,
        }
    }
}

/// Date-keyed lookup over one range read, restricted to `[start, end]`.
pub struct DayIndex<'a> {
    start: NaiveDate,
    end: NaiveDate,
    by_date: HashMap<NaiveDate, &'a DailyEntry>,
}

impl<'a> DayIndex<'a> {
    #[must_use]
    pub fn new(entries: &'a [DailyEntry], start: NaiveDate, end: NaiveDate) -> Self {
        let by_date = entries
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .map(|e| (e.date, e))
            .collect();
        Self {
            start,
            end,
            by_date,
        }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// True when some row in range carries a value. A stored all-null row
    /// counts the same as a missing one.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.by_date.values().any(|e| EntryValues::from(*e).has_data())
    }

    /// Stored rows inside the range, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &'a DailyEntry> + '_ {
        self.by_date.values().copied()
    }

    #[must_use]
    pub fn entry(&self, date: NaiveDate) -> Option<&'a DailyEntry> {
        self.by_date.get(&date).copied()
    }

    #[must_use]
    pub fn values(&self, date: NaiveDate) -> EntryValues {
        self.entry(date)
            .map_or_else(|| EntryValues::empty(date), EntryValues::from)
    }

    /// Every date of the range, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
