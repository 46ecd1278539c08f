use anyhow::Result;
use chrono::NaiveDate;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use portion_core::models::WeightTrends;
use portion_core::service::JournalService;

use super::helpers::{fmt_flag, fmt_weight, no_neg_zero};

pub(crate) fn cmd_trend(
    journal: &JournalService,
    user: &str,
    days: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let trends = journal.get_weight_trends(user, days, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trends)?);
        return Ok(());
    }

    if trends.points.is_empty() {
        eprintln!("No entries in the last {days} days. Use `portion log --weight` to record one.");
        process::exit(2);
    }

    print_trend_table(&trends);
    Ok(())
}

fn print_trend_table(trends: &WeightTrends) {
    #[derive(Tabled)]
    struct TrendRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Alcohol")]
        alcohol: &'static str,
    }

    let rows: Vec<TrendRow> = trends
        .points
        .iter()
        .map(|p| TrendRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            weight: if p.is_carry_forward {
                format!("({})", fmt_weight(p.weight))
            } else {
                fmt_weight(p.weight)
            },
            alcohol: fmt_flag(p.alcohol),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!("  (values in parentheses are carried forward)\n");

    println!(
        "  Days weighed: {}/{}",
        trends.total_days_logged, trends.days
    );
    if let Some(change) = trends.weight_change {
        let change = no_neg_zero(change);
        println!("  Change:       {change:+.1}");
    }
}

pub(crate) fn cmd_alcohol(
    journal: &JournalService,
    user: &str,
    days: u32,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let result = journal.get_alcohol_correlation(user, days, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("=== Alcohol vs weight, last {days} days ===\n");
    println!(
        "  Alcohol days:     {:>3}   avg {}",
        result.days_with_alcohol,
        fmt_weight(result.avg_weight_with_alcohol)
    );
    println!(
        "  Alcohol-free:     {:>3}   avg {}",
        result.days_without_alcohol,
        fmt_weight(result.avg_weight_without_alcohol)
    );

    match result.difference {
        Some(diff) if result.has_sufficient_data => {
            let diff = no_neg_zero(diff);
            println!("  Difference:       {diff:+.1}");
        }
        _ => println!("\n  Not enough data: need weighed days both with and without alcohol."),
    }

    Ok(())
}
