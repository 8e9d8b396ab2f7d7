use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

mod classifier;
mod db;
mod models;
mod report;
mod trends;

use classifier::ClassifierConfig;
use trends::TrendConfig;

#[derive(Parser)]
#[command(name = "crimewatch")]
#[command(about = "Complaint classification and crime trend alerts for CrimeWatch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic demo data
    Seed,
    /// Import reports from a CSV file, classifying each row
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// File a single report, classifying it on the way in
    File {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Classify a block of text without storing anything
    Classify {
        #[arg(long)]
        text: String,
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Scan the recent report window for localized spikes
    DetectTrends {
        #[arg(long, default_value_t = 7)]
        window_days: i64,
        #[arg(long, default_value_t = 5)]
        min_corpus: usize,
        #[arg(long, default_value_t = 2)]
        spike_threshold: usize,
    },
    /// Generate a markdown analytics report
    #[command(group(
        ArgGroup::new("scope")
            .args(["category", "location"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 30)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// List alerts raised by the trend detector
    Alerts {
        /// Include alerts already marked as read
        #[arg(long)]
        all: bool,
    },
    /// Mark an alert as read
    MarkRead {
        #[arg(long)]
        id: Uuid,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv, rules } => {
            let rules = ClassifierConfig::load_or_default(rules.as_deref())?;
            let pool = connect().await?;
            let inserted = db::import_csv(&pool, &csv, &rules).await?;
            println!("Inserted {inserted} reports from {}.", csv.display());
        }
        Commands::File {
            title,
            description,
            location,
            rules,
        } => {
            let rules = ClassifierConfig::load_or_default(rules.as_deref())?;
            let new_report = models::NewReport {
                category: rules.category.classify(&description).to_string(),
                sentiment: rules.sentiment.classify(&description).to_string(),
                title,
                description,
                location,
                submitted_at: chrono::Utc::now(),
                source_key: None,
            };
            let pool = connect().await?;
            db::insert_report(&pool, &new_report).await?;
            println!(
                "Report filed under '{}' with sentiment '{}'.",
                new_report.category, new_report.sentiment
            );
        }
        Commands::Classify { text, rules } => {
            let rules = ClassifierConfig::load_or_default(rules.as_deref())?;
            println!("category: {}", rules.category.classify(&text));
            println!("sentiment: {}", rules.sentiment.classify(&text));
        }
        Commands::DetectTrends {
            window_days,
            min_corpus,
            spike_threshold,
        } => {
            let config = TrendConfig {
                window_days,
                min_corpus,
                spike_threshold,
            };
            let pool = connect().await?;
            let outcome = trends::run_scan(&pool, &config).await?;
            println!(
                "Found {} spike candidates, created {} alerts.",
                outcome.candidates_found, outcome.alerts_created
            );
            if outcome.write_failures > 0 {
                println!(
                    "{} alerts could not be written; see the log.",
                    outcome.write_failures
                );
            }
        }
        Commands::Report {
            category,
            location,
            since_days,
            out,
        } => {
            let pool = connect().await?;
            let cutoff = trends::cutoff(since_days);
            let reports = db::fetch_reports_since(
                &pool,
                cutoff,
                category.as_deref(),
                location.as_deref(),
            )
            .await?;
            let alerts = db::fetch_alerts(&pool, false).await?;
            let scope = category.as_deref().or(location.as_deref());
            let output = report::build_report(scope, since_days, cutoff, &reports, &alerts);
            std::fs::write(&out, output)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Alerts { all } => {
            let pool = connect().await?;
            let alerts = db::fetch_alerts(&pool, !all).await?;
            if alerts.is_empty() {
                println!("No alerts to show.");
            } else {
                for alert in alerts {
                    let flag = if alert.is_read { "read" } else { "unread" };
                    println!(
                        "- {} [{}] {} ({}): {}",
                        alert.id, flag, alert.title, alert.trigger_date, alert.description
                    );
                }
            }
        }
        Commands::MarkRead { id } => {
            let pool = connect().await?;
            if db::mark_alert_read(&pool, id).await? {
                println!("Alert {id} marked as read.");
            } else {
                println!("No alert with id {id}.");
            }
        }
    }

    Ok(())
}
