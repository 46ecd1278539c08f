use anyhow::Result;
use chrono::NaiveDate;
use std::process;

use portion_core::models::{DAILY_TARGETS, DailyEntry, NewDailyEntry};
use portion_core::service::JournalService;

use super::helpers::{fmt_flag, fmt_weight, json_error};

/// Values given on the `log` command line. `None` keeps whatever the day
/// already holds (or zero/absent for a new day).
#[derive(Debug, Default)]
pub(crate) struct EntryFields {
    pub protein: Option<u32>,
    pub vegetable: Option<u32>,
    pub fruit: Option<u32>,
    pub starch: Option<u32>,
    pub fat: Option<u32>,
    pub dairy: Option<u32>,
    pub water: Option<u32>,
    pub weight: Option<f64>,
    pub compliant: Option<bool>,
    pub alcohol: Option<bool>,
}

impl EntryFields {
    fn apply(self, mut base: NewDailyEntry) -> NewDailyEntry {
        base.protein = self.protein.unwrap_or(base.protein);
        base.vegetable = self.vegetable.unwrap_or(base.vegetable);
        base.fruit = self.fruit.unwrap_or(base.fruit);
        base.starch = self.starch.unwrap_or(base.starch);
        base.fat = self.fat.unwrap_or(base.fat);
        base.dairy = self.dairy.unwrap_or(base.dairy);
        base.water_segments = self.water.unwrap_or(base.water_segments);
        base.weight = self.weight.or(base.weight);
        base.compliant = self.compliant.or(base.compliant);
        base.alcohol = self.alcohol.or(base.alcohol);
        base
    }
}

fn to_new_entry(e: &DailyEntry) -> NewDailyEntry {
    NewDailyEntry {
        protein: e.protein,
        vegetable: e.vegetable,
        fruit: e.fruit,
        starch: e.starch,
        fat: e.fat,
        dairy: e.dairy,
        water_segments: e.water_segments,
        weight: e.weight,
        compliant: e.compliant,
        alcohol: e.alcohol,
        ..NewDailyEntry::blank(&e.user_id, e.date)
    }
}

/// Merge the given fields into the day's entry and write it back.
pub(crate) fn log_fields(
    journal: &JournalService,
    user: &str,
    date: NaiveDate,
    fields: EntryFields,
) -> Result<DailyEntry> {
    let base = journal
        .get_entry(user, date)?
        .map_or_else(|| NewDailyEntry::blank(user, date), |e| to_new_entry(&e));
    journal.log_entry(&fields.apply(base))
}

pub(crate) fn cmd_log(
    journal: &JournalService,
    user: &str,
    date: NaiveDate,
    fields: EntryFields,
    json: bool,
) -> Result<()> {
    let entry = log_fields(journal, user, date, fields)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Logged {}", entry.date.format("%Y-%m-%d"));
        print_entry(&entry);
    }

    Ok(())
}

pub(crate) fn cmd_show(
    journal: &JournalService,
    user: &str,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    if let Some(e) = journal.get_entry(user, date)? {
        if json {
            println!("{}", serde_json::to_string_pretty(&e)?);
        } else {
            println!("=== {} ===\n", e.date.format("%Y-%m-%d"));
            print_entry(&e);
        }
    } else {
        let date_str = date.format("%Y-%m-%d");
        if json {
            println!("{}", json_error(&format!("No entry for {date_str}")));
        } else {
            eprintln!("No entry for {date_str}");
        }
        process::exit(2);
    }

    Ok(())
}

pub(crate) fn cmd_delete(
    journal: &JournalService,
    user: &str,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let date_str = date.format("%Y-%m-%d");
    let deleted = journal.delete_entry(user, date)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "date": date_str.to_string(), "deleted": deleted })
        );
    } else if deleted {
        println!("Deleted entry for {date_str}");
    } else {
        eprintln!("No entry for {date_str}");
    }

    if !deleted {
        process::exit(2);
    }
    Ok(())
}

fn print_entry(e: &DailyEntry) {
    let t = DAILY_TARGETS;
    println!("  Protein:    {}/{}", e.protein, t.protein);
    println!("  Vegetable:  {}/{}", e.vegetable, t.vegetable);
    println!("  Fruit:      {}/{}", e.fruit, t.fruit);
    println!("  Starch:     {}/{}", e.starch, t.starch);
    println!("  Fat:        {}/{}", e.fat, t.fat);
    println!("  Dairy:      {} (max {})", e.dairy, t.dairy);
    println!("  Water:      {}/{}", e.water_segments, t.water_segments);
    println!("  Weight:     {}", fmt_weight(e.weight));
    println!("  On plan:    {}", fmt_flag(e.compliant));
    println!("  Alcohol:    {}", fmt_flag(e.alcohol));
}
