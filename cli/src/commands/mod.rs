mod helpers;
mod import;
mod log;
mod summary;
mod weight;

pub(crate) use helpers::{parse_date, parse_month};
pub(crate) use import::{cmd_export_csv, cmd_import_csv};
pub(crate) use log::{EntryFields, cmd_delete, cmd_log, cmd_show};
pub(crate) use summary::{cmd_month, cmd_streak, cmd_week};
pub(crate) use weight::{cmd_alcohol, cmd_trend};
