use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod db;
mod models;
mod report;
mod schema;
mod store;
mod tally;

use models::{Case, CaseType, CasesData, Severity};

#[derive(Parser)]
#[command(name = "case-tracker")]
#[command(about = "Weekday follow-up and strike case tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import cases from a CSV file (key,type,day,severity)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Record or update a single case
    Add {
        /// Follow-ups or Strikes
        #[arg(long)]
        bucket: CaseType,
        #[arg(long)]
        key: String,
        #[arg(long)]
        day: String,
        /// B or C
        #[arg(long)]
        severity: Severity,
        /// Edit a JSON document instead of the database
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Remove a case from a bucket
    Remove {
        #[arg(long)]
        bucket: CaseType,
        #[arg(long)]
        key: String,
        /// Edit a JSON document instead of the database
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write all stored cases as a JSON document
    Export {
        #[arg(long, default_value = "cases.json")]
        out: PathBuf,
    },
    /// Replace stored cases with a JSON document
    Load {
        #[arg(long)]
        file: PathBuf,
    },
    /// Check a JSON document against the case schema
    Validate {
        #[arg(long)]
        file: PathBuf,
        /// Also require every case to carry its bucket's type
        #[arg(long)]
        strict: bool,
    },
    /// Count cases per weekday and per key
    Tally {
        /// Read from a JSON document instead of the database
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        /// Read from a JSON document instead of the database
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_source(file: Option<&Path>) -> anyhow::Result<CasesData> {
    match file {
        Some(path) => store::read_cases_file(path),
        None => db::load_cases_data(&connect().await?).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let cases = store::read_csv_cases(&csv)?;
            let inserted = db::import_cases(&connect().await?, &cases).await?;
            println!(
                "Inserted {inserted} of {} cases from {}.",
                cases.len(),
                csv.display()
            );
        }
        Commands::Add {
            bucket,
            key,
            day,
            severity,
            file,
        } => {
            let case = Case::new(bucket, day, severity);
            if case.week_day().is_none() {
                eprintln!(
                    "warning: day '{}' is not a weekday name or weekday date; it will be unscheduled",
                    case.day
                );
            }
            match file {
                Some(path) => {
                    let mut data = if path.exists() {
                        store::read_cases_file(&path)?
                    } else {
                        CasesData::default()
                    };
                    data.insert(key.clone(), case.clone());
                    store::write_cases_file(&path, &data)?;
                }
                None => db::upsert_case(&connect().await?, &key, &case).await?,
            }
            println!("Recorded {bucket} case for {key} on {}.", case.day);
        }
        Commands::Remove { bucket, key, file } => {
            let removed = match file {
                Some(path) => {
                    let mut data = store::read_cases_file(&path)?;
                    let removed = data.remove(bucket, &key).is_some();
                    if removed {
                        store::write_cases_file(&path, &data)?;
                    }
                    removed
                }
                None => db::delete_case(&connect().await?, bucket, &key).await?,
            };
            if removed {
                println!("Removed {bucket} case for {key}.");
            } else {
                println!("No {bucket} case found for {key}.");
            }
        }
        Commands::Export { out } => {
            let data = db::load_cases_data(&connect().await?).await?;
            store::write_cases_file(&out, &data)?;
            println!("Exported {} cases to {}.", data.len(), out.display());
        }
        Commands::Load { file } => {
            let data = store::read_cases_file(&file)?;
            let loaded = db::replace_cases(&connect().await?, &data).await?;
            println!("Loaded {loaded} cases from {}.", file.display());
        }
        Commands::Validate { file, strict } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|err| schema::SchemaError::Malformed(err.to_string()))
                .with_context(|| format!("{} is not valid JSON", file.display()))?;
            let data = if strict {
                schema::validate_strict(&value)?
            } else {
                schema::parse_cases_data(&value)?
            };

            for mismatch in data.mismatches() {
                eprintln!("warning: {mismatch}");
            }
            println!(
                "{} is valid: {} follow-ups, {} strikes.",
                file.display(),
                data.follow_ups.len(),
                data.strikes.len()
            );
        }
        Commands::Tally { file, limit } => {
            let data = load_source(file.as_deref()).await?;
            if data.is_empty() {
                println!("No cases recorded.");
                return Ok(());
            }

            let (days, unscheduled) = tally::tally_by_day(&data);
            println!("Cases by weekday:");
            for tally in days.iter() {
                println!(
                    "- {}: {} follow-ups, {} strikes",
                    tally.day, tally.follow_ups, tally.strikes
                );
            }
            if !unscheduled.is_empty() {
                println!("- unscheduled: {}", unscheduled.len());
            }

            println!("Most cases:");
            for tally in tally::rank_keys(&data).iter().take(limit) {
                println!(
                    "- {} ({} total: {} follow-ups, {} strikes)",
                    tally.key,
                    tally.total(),
                    tally.follow_ups,
                    tally.strikes
                );
            }
        }
        Commands::Report { file, out } => {
            let data = load_source(file.as_deref()).await?;
            let label = file.as_ref().map(|path| path.display().to_string());
            let report = report::build_report(label.as_deref(), &data);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
