use std::collections::HashSet;
use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{DailyEntry, NewDailyEntry, validate_new_entry};

pub const CSV_HEADER: [&str; 11] = [
    "date",
    "protein",
    "vegetable",
    "fruit",
    "starch",
    "fat",
    "dairy",
    "water",
    "weight",
    "compliant",
    "alcohol",
];

/// Summary of what a CSV import would do / did.
#[derive(Debug, Clone, Serialize)]
pub struct CsvImportSummary {
    pub rows_parsed: usize,
    pub entries_written: usize,
    pub dates_spanned: usize,
}

/// Write entries as CSV. Absent optional fields become empty cells.
pub fn write_entries_csv<W: Write>(entries: &[DailyEntry], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for e in entries {
        wtr.write_record([
            e.date.format("%Y-%m-%d").to_string(),
            e.protein.to_string(),
            e.vegetable.to_string(),
            e.fruit.to_string(),
            e.starch.to_string(),
            e.fat.to_string(),
            e.dairy.to_string(),
            e.water_segments.to_string(),
            e.weight.map(|w| format!("{w:.1}")).unwrap_or_default(),
            e.compliant.map(|b| b.to_string()).unwrap_or_default(),
            e.alcohol.map(|b| b.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn parse_flag(value: &str) -> Result<Option<bool>> {
    match value.trim().to_lowercase().as_str() {
        "" => Ok(None),
        "true" | "yes" | "y" | "1" => Ok(Some(true)),
        "false" | "no" | "n" | "0" => Ok(Some(false)),
        other => bail!("Invalid flag '{other}'. Use true/false, yes/no, or leave empty"),
    }
}

fn parse_count(value: &str, column: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u32>()
        .with_context(|| format!("Invalid {column} count '{value}'"))
}

struct Columns {
    date: usize,
    protein: Option<usize>,
    vegetable: Option<usize>,
    fruit: Option<usize>,
    starch: Option<usize>,
    fat: Option<usize>,
    dairy: Option<usize>,
    water: Option<usize>,
    weight: Option<usize>,
    compliant: Option<usize>,
    alcohol: Option<usize>,
}

fn parse_row(
    record: &csv::StringRecord,
    cols: &Columns,
    user_id: &str,
    date_str: &str,
) -> Result<NewDailyEntry> {
    let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date_str}'. Use YYYY-MM-DD"))?;
    let weight = match get(cols.weight).trim() {
        "" => None,
        w => Some(
            w.parse::<f64>()
                .with_context(|| format!("Invalid weight '{w}'"))?,
        ),
    };

    let entry = NewDailyEntry {
        protein: parse_count(get(cols.protein), "protein")?,
        vegetable: parse_count(get(cols.vegetable), "vegetable")?,
        fruit: parse_count(get(cols.fruit), "fruit")?,
        starch: parse_count(get(cols.starch), "starch")?,
        fat: parse_count(get(cols.fat), "fat")?,
        dairy: parse_count(get(cols.dairy), "dairy")?,
        water_segments: parse_count(get(cols.water), "water")?,
        weight,
        compliant: parse_flag(get(cols.compliant))?,
        alcohol: parse_flag(get(cols.alcohol))?,
        ..NewDailyEntry::blank(user_id, date)
    };
    validate_new_entry(&entry)?;
    Ok(entry)
}

/// Parse a journal CSV for `user_id`. Every row goes through write-path
/// validation; the first bad row fails the whole parse.
///
/// Only `date` is required. Missing counter columns read as zero, missing
/// optional columns as absent.
pub fn parse_entries_csv<R: Read>(reader: R, user_id: &str) -> Result<Vec<NewDailyEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
    let col =
        |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };

    let cols = Columns {
        date: col("date").context("Missing required column: date")?,
        protein: col("protein"),
        vegetable: col("vegetable"),
        fruit: col("fruit"),
        starch: col("starch"),
        fat: col("fat"),
        dairy: col("dairy"),
        water: col("water"),
        weight: col("weight"),
        compliant: col("compliant"),
        alcohol: col("alcohol"),
    };

    let mut rows = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let row_no = line_num + 2;
        let record = result.with_context(|| format!("Failed to parse CSV row {row_no}"))?;

        let date_str = record.get(cols.date).unwrap_or("").trim();
        if date_str.is_empty() {
            continue; // skip blank rows
        }

        let entry = parse_row(&record, &cols, user_id, date_str)
            .with_context(|| format!("Invalid CSV row {row_no}"))?;
        rows.push(entry);
    }

    Ok(rows)
}

/// Write parsed rows through the store. Later rows for the same date win.
pub fn import_entries(
    db: &Database,
    rows: &[NewDailyEntry],
    dry_run: bool,
) -> Result<CsvImportSummary> {
    let dates: HashSet<NaiveDate> = rows.iter().map(|r| r.date).collect();

    let mut entries_written = 0;
    if !dry_run {
        for row in rows {
            db.upsert_entry(row)?;
            entries_written += 1;
        }
    }

    let summary = CsvImportSummary {
        rows_parsed: rows.len(),
        entries_written,
        dates_spanned: dates.len(),
    };
    tracing::info!(
        rows = summary.rows_parsed,
        written = summary.entries_written,
        dry_run,
        "csv import finished"
    );
    Ok(summary)
}
