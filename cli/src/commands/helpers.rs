use anyhow::{Context, Result, bail};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Resolve a CLI date argument against the already-resolved `today`.
/// Accepts `YYYY-MM-DD`, `today`, `yesterday`, or `tomorrow`; `None` means today.
pub(crate) fn parse_date(date_str: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match date_str {
        None | Some("today") => Ok(today),
        Some("yesterday") => today
            .checked_sub_days(Days::new(1))
            .context("Date out of range"),
        Some("tomorrow") => today
            .checked_add_days(Days::new(1))
            .context("Date out of range"),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| {
            format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
        }),
    }
}

/// Parse `YYYY-MM` into `(year, month)`; `None` means the month containing `today`.
/// The month number is range-checked by the journal, not here.
pub(crate) fn parse_month(month_str: Option<&str>, today: NaiveDate) -> Result<(i32, u32)> {
    let Some(s) = month_str else {
        return Ok((today.year(), today.month()));
    };
    let Some((year, month)) = s.split_once('-') else {
        bail!("Invalid month '{s}'. Use YYYY-MM");
    };
    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year in '{s}'. Use YYYY-MM"))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in '{s}'. Use YYYY-MM"))?;
    Ok((year, month))
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn fmt_weight(weight: Option<f64>) -> String {
    weight.map_or_else(|| "-".to_string(), |w| format!("{:.1}", no_neg_zero(w)))
}

pub(crate) fn fmt_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}
