use chrono::{Datelike, Days, NaiveDate};

use super::projection::DayIndex;
use crate::models::{
    DAILY_TARGETS, DAIRY_PROTEIN_FACTOR, DailyEntry, MonthDay, MonthlySummary, PortionTotals,
    WeeklySummary, WeeklyTotals,
};

/// First and last day of a calendar month, or `None` if the month is invalid.
#[must_use]
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// The Sunday-to-Saturday week containing `date`.
#[must_use]
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    let start = date - Days::new(offset);
    (start, start + Days::new(6))
}

/// One row per day of the month; days without an entry carry nulls.
#[must_use]
pub fn build_monthly_summary(
    first: NaiveDate,
    last: NaiveDate,
    entries: &[DailyEntry],
) -> MonthlySummary {
    let index = DayIndex::new(entries, first, last);
    let days = index
        .dates()
        .map(|date| {
            let day = index.values(date);
            MonthDay {
                date,
                compliant: day.compliant,
                alcohol: day.alcohol,
                weight: day.weight,
            }
        })
        .collect();

    MonthlySummary {
        year: first.year(),
        month: first.month(),
        days,
    }
}

/// Seven zero-filled days for the week containing `date`, with portion sums.
#[must_use]
pub fn build_weekly_summary(date: NaiveDate, entries: &[DailyEntry]) -> WeeklySummary {
    let (week_start, week_end) = week_bounds(date);
    let index = DayIndex::new(entries, week_start, week_end);
    let days: Vec<_> = index.dates().map(|d| index.values(d)).collect();

    let portions = days.iter().fold(PortionTotals::default(), |acc, d| PortionTotals {
        protein: acc.protein + u64::from(d.protein),
        vegetable: acc.vegetable + u64::from(d.vegetable),
        fruit: acc.fruit + u64::from(d.fruit),
        starch: acc.starch + u64::from(d.starch),
        fat: acc.fat + u64::from(d.fat),
        dairy: acc.dairy + u64::from(d.dairy),
        water_segments: acc.water_segments + u64::from(d.water_segments),
    });

    WeeklySummary {
        week_start,
        week_end,
        days,
        totals: WeeklyTotals {
            portions,
            dairy_as_protein_equivalent: portions.dairy * u64::from(DAIRY_PROTEIN_FACTOR),
        },
        targets: DAILY_TARGETS.times(7),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::super::projection::fixtures::{compliant, date, entry, weighed};
    use super::*;

    #[test]
    fn test_month_bounds_variable_lengths() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((date(2024, 2, 1), date(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(2023, 2),
            Some((date(2023, 2, 1), date(2023, 2, 28)))
        );
        assert_eq!(
            month_bounds(2024, 12),
            Some((date(2024, 12, 1), date(2024, 12, 31)))
        );
        assert_eq!(
            month_bounds(2024, 4),
            Some((date(2024, 4, 1), date(2024, 4, 30)))
        );
    }

    #[test]
    fn test_month_bounds_invalid_month() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn test_monthly_summary_leap_february() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        let entries = vec![compliant(date(2024, 2, 29), true)];
        let summary = build_monthly_summary(first, last, &entries);
        assert_eq!(summary.year, 2024);
        assert_eq!(summary.month, 2);
        assert_eq!(summary.days.len(), 29);
        assert_eq!(summary.days[28].compliant, Some(true));
        assert!(summary.days[0].compliant.is_none());
        assert!(summary.days[0].weight.is_none());
        assert!(summary.days[0].alcohol.is_none());
    }

    #[test]
    fn test_monthly_summary_copies_optional_fields() {
        let (first, last) = month_bounds(2024, 6).unwrap();
        let mut e = weighed(date(2024, 6, 10), 181.2);
        e.alcohol = Some(false);
        e.compliant = Some(false);
        let summary = build_monthly_summary(first, last, &[e, weighed(date(2024, 7, 1), 1.0)]);
        assert_eq!(summary.days.len(), 30);
        let day = &summary.days[9];
        assert_eq!(day.date, date(2024, 6, 10));
        assert_eq!(day.weight, Some(181.2));
        assert_eq!(day.alcohol, Some(false));
        assert_eq!(day.compliant, Some(false));
    }

    #[test]
    fn test_week_bounds_from_wednesday() {
        let wednesday = date(2024, 6, 12);
        assert_eq!(wednesday.weekday(), Weekday::Wed);
        let (start, end) = week_bounds(wednesday);
        assert_eq!(start, date(2024, 6, 9));
        assert_eq!(start.weekday(), Weekday::Sun);
        assert_eq!(end, date(2024, 6, 15));
        assert_eq!(end.weekday(), Weekday::Sat);
    }

    #[test]
    fn test_week_bounds_on_sunday_and_saturday() {
        assert_eq!(week_bounds(date(2024, 6, 9)).0, date(2024, 6, 9));
        assert_eq!(week_bounds(date(2024, 6, 15)).0, date(2024, 6, 9));
    }

    #[test]
    fn test_week_bounds_across_year_end() {
        let (start, end) = week_bounds(date(2025, 1, 1));
        assert_eq!(start, date(2024, 12, 29));
        assert_eq!(end, date(2025, 1, 4));
    }

    #[test]
    fn test_weekly_summary_zero_fills() {
        let summary = build_weekly_summary(date(2024, 6, 12), &[]);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[0].date, date(2024, 6, 9));
        assert_eq!(summary.days[6].date, date(2024, 6, 15));
        assert!(summary.days.iter().all(|d| d.protein == 0 && d.water_segments == 0));
        assert_eq!(summary.totals.portions, PortionTotals::default());
        assert_eq!(summary.totals.dairy_as_protein_equivalent, 0);
    }

    #[test]
    fn test_weekly_summary_totals() {
        let mut monday = entry(date(2024, 6, 10));
        monday.protein = 4;
        monday.vegetable = 3;
        monday.dairy = 1;
        monday.water_segments = 8;
        let mut friday = entry(date(2024, 6, 14));
        friday.protein = 3;
        friday.fruit = 2;
        friday.starch = 1;
        friday.fat = 1;
        friday.dairy = 2;
        friday.water_segments = 5;
        // Belongs to the following week.
        let mut next_sunday = entry(date(2024, 6, 16));
        next_sunday.protein = 9;

        let summary = build_weekly_summary(date(2024, 6, 12), &[monday, friday, next_sunday]);
        let totals = &summary.totals;
        assert_eq!(totals.portions.protein, 7);
        assert_eq!(totals.portions.vegetable, 3);
        assert_eq!(totals.portions.fruit, 2);
        assert_eq!(totals.portions.starch, 1);
        assert_eq!(totals.portions.fat, 1);
        assert_eq!(totals.portions.dairy, 3);
        assert_eq!(totals.portions.water_segments, 13);
        assert_eq!(totals.dairy_as_protein_equivalent, 6);
        assert_eq!(summary.days[1].protein, 4);
        assert_eq!(summary.days[5].dairy, 2);
    }

    #[test]
    fn test_weekly_targets_are_constant() {
        let empty = build_weekly_summary(date(2024, 6, 12), &[]);
        let mut busy = entry(date(2024, 6, 12));
        busy.protein = 20;
        let full = build_weekly_summary(date(2024, 6, 12), &[busy]);
        assert_eq!(empty.targets, full.targets);
        assert_eq!(empty.targets.protein, DAILY_TARGETS.protein * 7);
    }

    #[test]
    fn test_weekly_totals_do_not_overflow_at_counter_max() {
        let mut sunday = entry(date(2024, 6, 9));
        sunday.protein = u32::MAX;
        sunday.dairy = u32::MAX;
        sunday.water_segments = u32::MAX;
        let mut monday = entry(date(2024, 6, 10));
        monday.protein = 1;
        let all_week: Vec<_> = (9..=15)
            .map(|d| {
                let mut e = entry(date(2024, 6, d));
                e.vegetable = u32::MAX;
                e
            })
            .collect();

        let summary = build_weekly_summary(date(2024, 6, 12), &[sunday, monday]);
        assert_eq!(summary.totals.portions.protein, u64::from(u32::MAX) + 1);
        assert_eq!(summary.totals.portions.water_segments, u64::from(u32::MAX));
        assert_eq!(summary.totals.dairy_as_protein_equivalent, u64::from(u32::MAX) * 2);

        let summary = build_weekly_summary(date(2024, 6, 12), &all_week);
        assert_eq!(summary.totals.portions.vegetable, u64::from(u32::MAX) * 7);
    }
}
