use anyhow::Result;
use chrono::NaiveDate;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use portion_core::models::{MonthlySummary, WeeklySummary};
use portion_core::service::JournalService;

use super::helpers::{fmt_flag, fmt_weight};

pub(crate) fn cmd_streak(
    journal: &JournalService,
    user: &str,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let streak = journal.get_streak(user, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&streak)?);
        return Ok(());
    }

    match streak.start_date {
        Some(start) => {
            let days = if streak.length == 1 { "day" } else { "days" };
            println!(
                "{} {days} on plan (since {})",
                streak.length,
                start.format("%Y-%m-%d")
            );
        }
        None => println!("No active streak. Log today as on plan to start one."),
    }

    Ok(())
}

pub(crate) fn cmd_month(
    journal: &JournalService,
    user: &str,
    year: i32,
    month: u32,
    json: bool,
) -> Result<()> {
    let summary = journal.get_monthly_summary(user, year, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary
        .days
        .iter()
        .all(|d| d.compliant.is_none() && d.alcohol.is_none() && d.weight.is_none())
    {
        eprintln!("No entries for {year}-{month:02}");
        process::exit(2);
    }

    print_month_table(&summary);
    Ok(())
}

fn print_month_table(summary: &MonthlySummary) {
    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "On plan")]
        compliant: &'static str,
        #[tabled(rename = "Alcohol")]
        alcohol: &'static str,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let rows: Vec<MonthRow> = summary
        .days
        .iter()
        .map(|d| MonthRow {
            date: d.date.format("%a %d").to_string(),
            compliant: fmt_flag(d.compliant),
            alcohol: fmt_flag(d.alcohol),
            weight: fmt_weight(d.weight),
        })
        .collect();

    let on_plan = summary
        .days
        .iter()
        .filter(|d| d.compliant == Some(true))
        .count();

    println!("=== {}-{:02} ===\n", summary.year, summary.month);
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!("\n  On plan: {on_plan}/{} days", summary.days.len());
}

pub(crate) fn cmd_week(
    journal: &JournalService,
    user: &str,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let summary = journal.get_weekly_summary(user, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_week_table(&summary);
    Ok(())
}

fn print_week_table(summary: &WeeklySummary) {
    #[derive(Tabled)]
    struct WeekRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "P")]
        protein: String,
        #[tabled(rename = "V")]
        vegetable: String,
        #[tabled(rename = "Fr")]
        fruit: String,
        #[tabled(rename = "S")]
        starch: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "D")]
        dairy: String,
        #[tabled(rename = "Water")]
        water: String,
    }

    let mut rows: Vec<WeekRow> = summary
        .days
        .iter()
        .map(|d| WeekRow {
            day: d.date.format("%a %m-%d").to_string(),
            protein: d.protein.to_string(),
            vegetable: d.vegetable.to_string(),
            fruit: d.fruit.to_string(),
            starch: d.starch.to_string(),
            fat: d.fat.to_string(),
            dairy: d.dairy.to_string(),
            water: d.water_segments.to_string(),
        })
        .collect();

    let totals = &summary.totals.portions;
    let targets = &summary.targets;
    rows.push(WeekRow {
        day: "Total".to_string(),
        protein: format!("{}/{}", totals.protein, targets.protein),
        vegetable: format!("{}/{}", totals.vegetable, targets.vegetable),
        fruit: format!("{}/{}", totals.fruit, targets.fruit),
        starch: format!("{}/{}", totals.starch, targets.starch),
        fat: format!("{}/{}", totals.fat, targets.fat),
        dairy: format!("{}/{}", totals.dairy, targets.dairy),
        water: format!("{}/{}", totals.water_segments, targets.water_segments),
    });

    println!(
        "=== Week of {} to {} ===\n",
        summary.week_start.format("%Y-%m-%d"),
        summary.week_end.format("%Y-%m-%d")
    );
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    println!(
        "\n  Dairy as protein: {} portions",
        summary.totals.dairy_as_protein_equivalent
    );
}
