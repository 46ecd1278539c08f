use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use portion_core::service::JournalService;

pub(crate) fn cmd_import_csv(
    journal: &JournalService,
    user: &str,
    path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let summary = journal.import_csv(user, file, dry_run)?;

    if summary.rows_parsed == 0 {
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": "No rows found in CSV file" })
            );
        } else {
            eprintln!("No rows found in CSV file.");
        }
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "dry_run": dry_run,
                "rows_parsed": summary.rows_parsed,
                "entries_written": summary.entries_written,
                "dates_spanned": summary.dates_spanned,
            })
        );
    } else if dry_run {
        println!("Dry run: no changes made.\n");
        println!("  Rows parsed:     {}", summary.rows_parsed);
        println!("  Days to write:   {}", summary.dates_spanned);
    } else {
        println!("Import complete.\n");
        println!("  Rows parsed:     {}", summary.rows_parsed);
        println!("  Entries written: {}", summary.entries_written);
        println!("  Dates spanned:   {}", summary.dates_spanned);
    }

    Ok(())
}

pub(crate) fn cmd_export_csv(
    journal: &JournalService,
    user: &str,
    output: Option<&Path>,
) -> Result<()> {
    let count = if let Some(path) = output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let count = journal.export_csv(user, file)?;
        eprintln!("Exported {count} entries to {}", path.display());
        count
    } else {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        let count = journal.export_csv(user, &mut lock)?;
        lock.flush()?;
        count
    };
    tracing::info!(user, count, "csv export finished");
    Ok(())
}
