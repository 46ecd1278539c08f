use chrono::{Days, NaiveDate};

use super::projection::DayIndex;
use crate::models::{DailyEntry, STREAK_WINDOW_DAYS, Streak};

/// First date of the window a streak query reads.
#[must_use]
pub fn streak_window_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(u64::from(STREAK_WINDOW_DAYS - 1))
}

/// Count consecutive compliant days walking backward from `today`.
///
/// The walk halts at the first day that is missing, has no compliance flag,
/// or is flagged non-compliant. A gap is never skipped: whatever lies beyond
/// it is irrelevant. The window boundary ends the walk the same way.
#[must_use]
pub fn calculate_streak(today: NaiveDate, entries: &[DailyEntry]) -> Streak {
    let index = DayIndex::new(entries, streak_window_start(today), today);

    let mut length = 0;
    let mut start_date = None;
    let mut day = today;
    while day >= index.start() {
        match index.values(day).compliant {
            Some(true) => {
                length += 1;
                start_date = Some(day);
            }
            Some(false) | None => break,
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    Streak { length, start_date }
}
