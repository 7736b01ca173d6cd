use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod analytics;
mod config;
mod db;
mod ingest;
mod leaderboard;
mod models;
mod report;

use config::{EngineConfig, ResetPolicy};
use models::LogSnapshot;

#[derive(Parser)]
#[command(name = "checkin-analytics")]
#[command(about = "Daily check-in analytics for the production facility", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a realistic sample snapshot
    Seed,
    /// Import a sheet tab export from a headerless CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        tab: String,
    },
    /// Compute today's KPIs, supervisor scores, anomalies, and history
    Dashboard {
        /// Date in the logged d/m/Y form; defaults to today at the facility
        #[arg(long)]
        date: Option<String>,
    },
    /// Rank departments by today's submission time
    Leaderboard {
        /// Date in d/m/Y form; defaults to today at the facility
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum, default_value = "running")]
        score_reset: ResetPolicy,
    },
    /// Generate a markdown shift report
    Report {
        /// Date in the logged d/m/Y form; defaults to today at the facility
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// The facility clock is pinned to IST; like the upstream sheets, we shift
/// the instant by the raw offset instead of carrying a timezone around.
fn facility_now() -> DateTime<Utc> {
    Utc::now() + Duration::hours(5) + Duration::minutes(30)
}

fn facility_today_string() -> String {
    facility_now().format("%-d/%-m/%Y").to_string()
}

fn parse_cli_date(date: Option<String>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%d/%m/%Y")
            .with_context(|| format!("expected a d/m/Y date, got {raw:?}")),
        None => Ok(facility_now().date_naive()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv, tab } => {
            let imported = db::import_csv(&pool, &tab, &csv).await?;
            println!("Imported {imported} rows into {tab} from {}.", csv.display());
        }
        Commands::Dashboard { date } => {
            let config = EngineConfig::default();
            let today = date.unwrap_or_else(facility_today_string);
            let snapshot = fetch_snapshot_or_empty(&pool).await;
            let summary = analytics::build_dashboard(&snapshot, &today, &config);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Leaderboard { date, score_reset } => {
            let config = EngineConfig {
                score_reset,
                ..EngineConfig::default()
            };
            let today = parse_cli_date(date)?;
            let rows = match db::fetch_tab_rows(&pool, db::MASTER_TAB).await {
                Ok(rows) => rows,
                Err(err) => {
                    eprintln!("warning: master fetch failed ({err:#}); serving empty leaderboard");
                    Vec::new()
                }
            };
            let board = leaderboard::build_leaderboard(&rows, today, &config);
            let response = serde_json::json!({ "leaderboard": board });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Report { date, out } => {
            let config = EngineConfig::default();
            let today = date.unwrap_or_else(facility_today_string);
            let snapshot = fetch_snapshot_or_empty(&pool).await;
            let summary = analytics::build_dashboard(&snapshot, &today, &config);
            let report = report::build_report(&today, &snapshot, &summary);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// A fetch failure degrades to an empty snapshot so the engine serves its
/// zeroed defaults instead of failing the whole command.
async fn fetch_snapshot_or_empty(pool: &sqlx::PgPool) -> LogSnapshot {
    match db::fetch_snapshot(pool).await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("warning: tabular fetch failed ({err:#}); serving empty dashboard");
            LogSnapshot::default()
        }
    }
}
