use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days scanned backward (today included) when computing a streak.
pub const STREAK_WINDOW_DAYS: u32 = 365;

/// Largest window accepted by the trend and correlation queries.
pub const MAX_WINDOW_DAYS: u32 = 365;

pub const MAX_WATER_SEGMENTS: u32 = 8;

pub const MIN_WEIGHT: f64 = 50.0;
pub const MAX_WEIGHT: f64 = 500.0;

/// Protein units credited per dairy unit in weekly totals.
pub const DAIRY_PROTEIN_FACTOR: u32 = 2;

/// One user's logged data for one calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyEntry {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
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
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDailyEntry {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub protein: u32,
    #[serde(default)]
    pub vegetable: u32,
    #[serde(default)]
    pub fruit: u32,
    #[serde(default)]
    pub starch: u32,
    #[serde(default)]
    pub fat: u32,
    #[serde(default)]
    pub dairy: u32,
    #[serde(default)]
    pub water_segments: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub compliant: Option<bool>,
    #[serde(default)]
    pub alcohol: Option<bool>,
}

impl NewDailyEntry {
    /// A day with every counter at zero and every optional field absent.
    #[must_use]
    pub fn blank(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
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

// --- Aggregation results ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub length: u32,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub is_carry_forward: bool,
    pub alcohol: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightTrends {
    pub days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<TrendPoint>,
    pub total_days_logged: u32,
    pub weight_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlcoholCorrelation {
    pub days: u32,
    pub days_with_alcohol: u32,
    pub days_without_alcohol: u32,
    pub avg_weight_with_alcohol: Option<f64>,
    pub avg_weight_without_alcohol: Option<f64>,
    pub difference: Option<f64>,
    pub has_sufficient_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    pub compliant: Option<bool>,
    pub alcohol: Option<bool>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub days: Vec<MonthDay>,
}

/// Per-category portion counts. Used both for weekly sums and for targets.
///
/// Wider than a single day's counter so seven days of `u32::MAX` still fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortionTotals {
    pub protein: u64,
    pub vegetable: u64,
    pub fruit: u64,
    pub starch: u64,
    pub fat: u64,
    pub dairy: u64,
    pub water_segments: u64,
}

impl PortionTotals {
    #[must_use]
    pub fn times(self, factor: u64) -> Self {
        Self {
            protein: self.protein * factor,
            vegetable: self.vegetable * factor,
            fruit: self.fruit * factor,
            starch: self.starch * factor,
            fat: self.fat * factor,
            dairy: self.dairy * factor,
            water_segments: self.water_segments * factor,
        }
    }
}

/// Daily per-category goals. Dairy is a ceiling rather than a goal.
pub const DAILY_TARGETS: PortionTotals = PortionTotals {
    protein: 4,
    vegetable: 3,
    fruit: 2,
    starch: 2,
    fat: 1,
    dairy: 1,
    // Same as MAX_WATER_SEGMENTS.
    water_segments: 8,
};

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyTotals {
    #[serde(flatten)]
    pub portions: PortionTotals,
    pub dairy_as_protein_equivalent: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<crate::aggregate::EntryValues>,
    pub totals: WeeklyTotals,
    pub targets: PortionTotals,
}

// --- Write-path validation ---

pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        bail!("User id must not be empty");
    }
    Ok(())
}

/// Weight must be within the accepted range and carry at most one decimal place.
pub fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        bail!("Weight must be between {MIN_WEIGHT} and {MAX_WEIGHT} (got {weight})");
    }
    let tenths = weight * 10.0;
    if (tenths - tenths.round()).abs() > 1e-6 {
        bail!("Weight must have at most one decimal place (got {weight})");
    }
    Ok(())
}

pub fn validate_water(segments: u32) -> Result<()> {
    if segments > MAX_WATER_SEGMENTS {
        bail!("Water must be between 0 and {MAX_WATER_SEGMENTS} segments (got {segments})");
    }
    Ok(())
}

pub fn validate_new_entry(entry: &NewDailyEntry) -> Result<()> {
    validate_user_id(&entry.user_id)?;
    validate_water(entry.water_segments)?;
    if let Some(w) = entry.weight {
        validate_weight(w)?;
    }
    Ok(())
}

/// Round to one decimal place for output.
#[must_use]
pub fn round_tenth(v: f64) -> f64 {
    let r = (v * 10.0).round() / 10.0;
    if r == 0.0 { 0.0 } else { r }
}
