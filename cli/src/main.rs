mod commands;
mod config;
mod server;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    EntryFields, cmd_alcohol, cmd_delete, cmd_export_csv, cmd_import_csv, cmd_log, cmd_month,
    cmd_show, cmd_streak, cmd_trend, cmd_week, parse_date, parse_month,
};
use crate::config::Config;
use crate::server::DEFAULT_WINDOW_DAYS;
use portion_core::service::JournalService;

#[derive(Parser)]
#[command(
    name = "portion",
    version,
    about = "A portion, water and weight journal",
    long_about = "Log daily portions, water and weight, then look back over streaks, \
                  weight trends, alcohol days and weekly totals."
)]
struct Cli {
    /// Journal user (default: `user` from config.toml, else "local")
    #[arg(short, long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log or update a day's entry (omitted values are kept)
    Log {
        /// Date to log for (YYYY-MM-DD or today/yesterday, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Protein portions
        #[arg(long)]
        protein: Option<u32>,
        /// Vegetable portions
        #[arg(long)]
        vegetable: Option<u32>,
        /// Fruit portions
        #[arg(long)]
        fruit: Option<u32>,
        /// Starch portions
        #[arg(long)]
        starch: Option<u32>,
        /// Fat portions
        #[arg(long)]
        fat: Option<u32>,
        /// Dairy portions
        #[arg(long)]
        dairy: Option<u32>,
        /// Water segments (0-8)
        #[arg(long)]
        water: Option<u32>,
        /// Body weight (50-500, one decimal place)
        #[arg(long)]
        weight: Option<f64>,
        /// Whether the day was on plan (true/false)
        #[arg(long)]
        compliant: Option<bool>,
        /// Whether alcohol was consumed (true/false)
        #[arg(long)]
        alcohol: Option<bool>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a day's entry (defaults to today)
    Show {
        /// Date to show (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a day's entry
    Delete {
        /// Date to delete (YYYY-MM-DD or today/yesterday, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current run of on-plan days
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the weight trend for the last N days
    Trend {
        /// Number of days (1-365)
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare average weight on alcohol and alcohol-free days
    Alcohol {
        /// Number of days (1-365)
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a calendar month (YYYY-MM, default: this month)
    Month {
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show portion totals for the Sunday-Saturday week containing DATE
    Week {
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all entries as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<std::path::PathBuf>,
    },
    /// Import entries from a CSV file
    Import {
        /// Path to the CSV file
        file: std::path::PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    // RUST_LOG wins over the config file.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.log_level);

    let user = cli.user.unwrap_or_else(|| config.user.clone());
    let journal = JournalService::new(&config.db_path)?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Log {
            date,
            protein,
            vegetable,
            fruit,
            starch,
            fat,
            dairy,
            water,
            weight,
            compliant,
            alcohol,
            json,
        } => {
            let date = parse_date(date.as_deref(), today)?;
            let fields = EntryFields {
                protein,
                vegetable,
                fruit,
                starch,
                fat,
                dairy,
                water,
                weight,
                compliant,
                alcohol,
            };
            cmd_log(&journal, &user, date, fields, json)
        }
        Commands::Show { date, json } => {
            let date = parse_date(date.as_deref(), today)?;
            cmd_show(&journal, &user, date, json)
        }
        Commands::Delete { date, json } => {
            let date = parse_date(date.as_deref(), today)?;
            cmd_delete(&journal, &user, date, json)
        }
        Commands::Streak { json } => cmd_streak(&journal, &user, today, json),
        Commands::Trend { days, json } => cmd_trend(&journal, &user, days, today, json),
        Commands::Alcohol { days, json } => cmd_alcohol(&journal, &user, days, today, json),
        Commands::Month { month, json } => {
            let (year, month) = parse_month(month.as_deref(), today)?;
            cmd_month(&journal, &user, year, month, json)
        }
        Commands::Week { date, json } => {
            let date = parse_date(date.as_deref(), today)?;
            cmd_week(&journal, &user, date, json)
        }
        Commands::Export { output } => cmd_export_csv(&journal, &user, output.as_deref()),
        Commands::Import {
            file,
            dry_run,
            json,
        } => cmd_import_csv(&journal, &user, &file, dry_run, json),
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                Some(config.load_or_create_api_key()?)
            };
            server::start_server(journal, &user, port, &bind, api_key).await
        }
    }
}
