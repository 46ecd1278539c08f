use chrono::{Days, NaiveDate};

use super::projection::DayIndex;
use crate::models::{DailyEntry, TrendPoint, WeightTrends, round_tenth};

/// First date of a `window_days`-long window ending at `today`.
#[must_use]
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - Days::new(u64::from(window_days.saturating_sub(1)))
}

/// Build a dense day-by-day weight series over the window ending at `today`.
///
/// Days without a logged weight carry the last known weight forward and are
/// flagged `is_carry_forward`. Carry-forward state starts fresh at the window
/// start, so the first real weight in the window is never a carried value.
/// With no row carrying any value in the window the series is left empty.
#[must_use]
pub fn build_trends(today: NaiveDate, window_days: u32, entries: &[DailyEntry]) -> WeightTrends {
    let start = window_start(today, window_days);
    let index = DayIndex::new(entries, start, today);

    let mut trends = WeightTrends {
        days: window_days,
        start_date: start,
        end_date: today,
        points: Vec::new(),
        total_days_logged: 0,
        weight_change: None,
    };
    if !index.has_data() {
        return trends;
    }

    let mut last_known: Option<f64> = None;
    let mut first_weight: Option<f64> = None;
    let mut last_weight: Option<f64> = None;

    for date in index.dates() {
        let day = index.values(date);
        let point = if let Some(weight) = day.weight {
            last_known = Some(weight);
            if first_weight.is_none() {
                first_weight = Some(weight);
            }
            last_weight = Some(weight);
            TrendPoint {
                date,
                weight: Some(weight),
                is_carry_forward: false,
                alcohol: day.alcohol,
            }
        } else {
            TrendPoint {
                date,
                weight: last_known,
                is_carry_forward: last_known.is_some(),
                alcohol: day.alcohol,
            }
        };
        trends.points.push(point);
    }

    trends.total_days_logged = index.entries().filter(|e| e.weight.is_some()).count() as u32;
    trends.weight_change = match (first_weight, last_weight) {
        (Some(first), Some(last)) => Some(round_tenth(last - first)),
        _ => None,
    };
    trends
}

#[cfg(test)]
mod tests {
    use super::super::projection::fixtures::{date, entry, weighed};
    use super::*;

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn days_ago(n: u64) -> NaiveDate {
        today() - Days::new(n)
    }

    #[test]
    fn test_trends_carry_forward_example() {
        let entries = vec![weighed(days_ago(2), 173.0), weighed(today(), 175.0)];
        let trends = build_trends(today(), 3, &entries);

        assert_eq!(
            trends.points,
            vec![
                TrendPoint {
                    date: days_ago(2),
                    weight: Some(173.0),
                    is_carry_forward: false,
                    alcohol: None,
                },
                TrendPoint {
                    date: days_ago(1),
                    weight: Some(173.0),
                    is_carry_forward: true,
                    alcohol: None,
                },
                TrendPoint {
                    date: today(),
                    weight: Some(175.0),
                    is_carry_forward: false,
                    alcohol: None,
                },
            ]
        );
        assert!((trends.weight_change.unwrap() - 2.0).abs() < f64::EPSILON);
        assert_eq!(trends.total_days_logged, 2);
    }

    #[test]
    fn test_trends_empty_window() {
        let trends = build_trends(today(), 30, &[]);
        assert!(trends.points.is_empty());
        assert_eq!(trends.total_days_logged, 0);
        assert!(trends.weight_change.is_none());
        assert_eq!(trends.start_date, days_ago(29));
        assert_eq!(trends.end_date, today());
    }

    #[test]
    fn test_trends_only_out_of_window_rows_is_empty() {
        let entries = vec![weighed(days_ago(40), 180.0)];
        let trends = build_trends(today(), 30, &entries);
        assert!(trends.points.is_empty());
    }

    #[test]
    fn test_trends_point_count_matches_window() {
        let entries = vec![weighed(days_ago(10), 180.0)];
        for window in [1, 7, 30, 90, 365] {
            let trends = build_trends(today(), window, &entries);
            if window > 10 {
                assert_eq!(trends.points.len(), window as usize);
            }
        }
        let trends = build_trends(today(), 1, &[weighed(today(), 180.0)]);
        assert_eq!(trends.points.len(), 1);
    }

    #[test]
    fn test_trends_leading_days_have_null_weight() {
        let mut alcohol_day = entry(days_ago(3));
        alcohol_day.alcohol = Some(true);
        let entries = vec![alcohol_day, weighed(days_ago(1), 180.0)];
        let trends = build_trends(today(), 5, &entries);

        let first = &trends.points[0];
        assert!(first.weight.is_none());
        assert!(!first.is_carry_forward);

        let second = &trends.points[1];
        assert_eq!(second.date, days_ago(3));
        assert!(second.weight.is_none());
        assert!(!second.is_carry_forward);
        assert_eq!(second.alcohol, Some(true));

        let last = &trends.points[4];
        assert_eq!(last.weight, Some(180.0));
        assert!(last.is_carry_forward);
        assert!(last.alcohol.is_none());
    }

    #[test]
    fn test_trends_does_not_carry_from_before_window() {
        let entries = vec![weighed(days_ago(10), 185.0), weighed(days_ago(1), 180.0)];
        let trends = build_trends(today(), 3, &entries);
        assert!(trends.points[0].weight.is_none());
        assert!(!trends.points[0].is_carry_forward);
        assert!(!trends.points[1].is_carry_forward);
        assert_eq!(trends.total_days_logged, 1);
        assert!((trends.weight_change.unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trends_carry_forward_tracks_latest_real_weight() {
        let entries = vec![
            weighed(days_ago(5), 182.0),
            weighed(days_ago(3), 181.0),
            weighed(days_ago(1), 180.1),
        ];
        let trends = build_trends(today(), 6, &entries);
        let mut last_real = None;
        for point in &trends.points {
            if point.is_carry_forward {
                assert_eq!(point.weight, last_real);
            } else if point.weight.is_some() {
                last_real = point.weight;
            }
        }
        assert!((trends.weight_change.unwrap() - (-1.9)).abs() < 1e-9);
    }

    #[test]
    fn test_trends_weight_change_needs_a_weight() {
        let mut drank = entry(days_ago(2));
        drank.alcohol = Some(true);
        let trends = build_trends(today(), 7, &[drank]);
        assert_eq!(trends.points.len(), 7);
        assert!(trends.points.iter().all(|p| p.weight.is_none()));
        assert!(trends.weight_change.is_none());
        assert_eq!(trends.total_days_logged, 0);
    }

    #[test]
    fn test_trends_null_row_matches_missing_row() {
        let without_row = build_trends(today(), 7, &[]);
        let with_null_row = build_trends(today(), 7, &[entry(days_ago(2))]);
        assert!(without_row.points.is_empty());
        assert!(with_null_row.points.is_empty());
        assert_eq!(with_null_row.total_days_logged, 0);
        assert!(with_null_row.weight_change.is_none());
    }
}
