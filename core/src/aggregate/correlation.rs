use crate::models::{AlcoholCorrelation, DailyEntry, round_tenth};

/// Compare average weight on alcohol days against alcohol-free days.
///
/// Only entries with both a weight and an alcohol flag take part; anything
/// else is left out of both counts and both averages. Averages need at least
/// one entry on each side.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn alcohol_correlation(window_days: u32, entries: &[DailyEntry]) -> AlcoholCorrelation {
    let mut with: Vec<f64> = Vec::new();
    let mut without: Vec<f64> = Vec::new();
    for entry in entries {
        match (entry.weight, entry.alcohol) {
            (Some(weight), Some(true)) => with.push(weight),
            (Some(weight), Some(false)) => without.push(weight),
            _ => {}
        }
    }

    let has_sufficient_data = !with.is_empty() && !without.is_empty();
    let mut result = AlcoholCorrelation {
        days: window_days,
        days_with_alcohol: with.len() as u32,
        days_without_alcohol: without.len() as u32,
        avg_weight_with_alcohol: None,
        avg_weight_without_alcohol: None,
        difference: None,
        has_sufficient_data,
    };

    if has_sufficient_data {
        let avg_with = with.iter().sum::<f64>() / with.len() as f64;
        let avg_without = without.iter().sum::<f64>() / without.len() as f64;
        result.avg_weight_with_alcohol = Some(round_tenth(avg_with));
        result.avg_weight_without_alcohol = Some(round_tenth(avg_without));
        result.difference = Some(round_tenth(avg_with - avg_without));
    }

    result
}
