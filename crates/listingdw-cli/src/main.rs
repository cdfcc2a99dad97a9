mod logging;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use listingdw_core::{CheckPayload, CheckResult, Config, QualityReport, WarehouseKind};
use listingdw_engine::{Pipeline, PipelineError, RunSummary};
use listingdw_warehouse::{MemoryWarehouse, PostgresLoader, WarehouseLoader};

const DEFAULT_CONFIG: &str = "listingdw.toml";

/// listingdw - Star schema ETL for short-term rental listings and reviews
#[derive(Parser)]
#[command(name = "listingdw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: listingdw.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, validate, transform and load into the warehouse
    Run {
        /// Date recorded as valid_from of host versions (default: today)
        #[arg(long)]
        run_date: Option<NaiveDate>,

        /// Also write the quality report as markdown
        #[arg(short, long)]
        markdown: Option<PathBuf>,

        /// Load into an in-memory warehouse instead of the configured one
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract and validate only, writing the data quality report
    Validate {
        /// Also write the quality report as markdown
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Test the warehouse connection
    CheckConnection,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Credentials may live in .env; a missing file is fine
    dotenvy::dotenv().ok();

    let config = load_config(cli.config.as_deref(), cli.verbose)?;
    logging::init(Some(&config.log_path()), cli.verbose)?;
    tracing::debug!("listingdw {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { run_date, markdown, dry_run } => {
            let run_date = run_date.unwrap_or_else(|| chrono::Local::now().date_naive());
            run_command(config, run_date, markdown.as_deref(), dry_run, cli.verbose).await
        }
        Commands::Validate { markdown } => validate_command(config, markdown.as_deref()),
        Commands::CheckConnection => check_connection_command(&config).await,
    }
}

/// Build the configuration once: file (or defaults), then DB_* overrides
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let mut config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    config.warehouse = config
        .warehouse
        .clone()
        .with_env_overrides(|key| std::env::var(key).ok())?;

    if verbose {
        eprintln!(
            "{} {:?} warehouse at {}:{}/{}",
            "Using".cyan(),
            config.warehouse.kind,
            config.warehouse.host,
            config.warehouse.port,
            config.warehouse.database
        );
    }

    Ok(config)
}

/// Pick the loader for this run
async fn connect_loader(config: &Config, dry_run: bool) -> Result<Box<dyn WarehouseLoader>> {
    if dry_run || config.warehouse.kind == WarehouseKind::Memory {
        return Ok(Box::new(MemoryWarehouse::new()));
    }

    let loader = PostgresLoader::connect(&config.warehouse)
        .await
        .context("Failed to connect to the warehouse")?;
    Ok(Box::new(loader))
}

/// Run command - full pipeline
async fn run_command(
    config: Config,
    run_date: NaiveDate,
    markdown: Option<&Path>,
    dry_run: bool,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Running pipeline for".cyan(), run_date);
    }

    let report_path = config.report_path();
    let loader = connect_loader(&config, dry_run).await?;
    let pipeline = Pipeline::new(config, loader);

    let result = pipeline.run(run_date).await;

    // The report is persisted before later stages, so show it even on failure
    if report_written(&result) {
        let report = QualityReport::from_file(&report_path)?;
        print_report_summary(&report);
        if let Some(md_path) = markdown {
            write_markdown(&report, md_path)?;
        }
    }

    let summary = result.context("Pipeline run failed")?;
    print_run_summary(&summary);

    if verbose {
        eprintln!("{}", serde_json::to_string_pretty(&summary.load)?);
    }

    Ok(())
}

/// Validate command - extract and validate, no warehouse access
fn validate_command(config: Config, markdown: Option<&Path>) -> Result<()> {
    let report_path = config.report_path();
    let pipeline = Pipeline::new(config, Box::new(MemoryWarehouse::new()));

    let result = pipeline.validate_only();

    if report_written(&result) {
        let report = QualityReport::from_file(&report_path)?;
        print_report_summary(&report);
        if let Some(md_path) = markdown {
            write_markdown(&report, md_path)?;
        }
    }

    result.context("Validation failed")?;
    println!("{} {}", "Report written to".green(), report_path.display());
    Ok(())
}

/// Check-connection command
async fn check_connection_command(config: &Config) -> Result<()> {
    let loader = connect_loader(config, false).await?;
    loader
        .test_connection()
        .await
        .with_context(|| format!("{} connection test failed", loader.name()))?;

    println!("{} {}", "✓ Connected to".green().bold(), loader.name());
    Ok(())
}

/// Whether the run got far enough to persist this run's quality report
fn report_written<T>(result: &Result<T, PipelineError>) -> bool {
    !matches!(result, Err(PipelineError::Extract(_)) | Err(PipelineError::ReportError(..)))
}

fn write_markdown(report: &QualityReport, path: &Path) -> Result<()> {
    std::fs::write(path, generate_markdown_report(report))
        .with_context(|| format!("Failed to write markdown report {}", path.display()))?;
    println!("{} {}", "Markdown report written to".green(), path.display());
    Ok(())
}

/// Payload as `key: value` text
fn describe_payload(check: &CheckResult) -> String {
    match &check.payload {
        CheckPayload::MissingColumns { missing_columns } if missing_columns.is_empty() => {
            "missing_columns: none".to_string()
        }
        CheckPayload::MissingColumns { missing_columns } => {
            format!("missing_columns: {}", missing_columns.join(", "))
        }
        CheckPayload::NullCount { null_count } => format!("null_count: {}", null_count),
        CheckPayload::DuplicateCount { duplicate_count } => format!("duplicate_count: {}", duplicate_count),
        CheckPayload::InvalidCount { invalid_count } => format!("invalid_count: {}", invalid_count),
        CheckPayload::OrphanReviews { orphan_reviews } => format!("orphan_reviews: {}", orphan_reviews),
    }
}

fn print_report_summary(report: &QualityReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Data Quality Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{}", "Rows after validation:".bold());
    println!("  Listings: {}", report.listings_row_count_after_validation);
    println!("  Reviews:  {}", report.reviews_row_count_after_validation);
    println!();

    let failed = report.failed_checks().count();
    println!("{}", "Checks:".bold());
    for check in &report.checks {
        let status = if check.passed() {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!("  [{}] {} ({})", status, check.name, describe_payload(check));
    }
    println!();

    if failed == 0 {
        println!("{}", "✓ All checks passed!".green().bold());
    } else {
        println!("{}", format!("{} of {} checks failed", failed, report.checks.len()).yellow());
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_run_summary(summary: &RunSummary) {
    println!("{}", "Load Summary".bold());
    println!("  Run date:    {}", summary.run_date);
    println!("  Warehouse:   {}", summary.load.backend);
    for table in &summary.load.tables {
        println!("  {:<20} {}", table.table, table.rows);
    }
    println!("  Fingerprint: {}", summary.fingerprint.dimmed());
    println!();
    println!("{}", "✓ Pipeline completed".green().bold());
}

/// Generate markdown report
fn generate_markdown_report(report: &QualityReport) -> String {
    let mut md = String::new();

    md.push_str("# Data Quality Report\n\n");

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Listings after validation: {}\n", report.listings_row_count_after_validation));
    md.push_str(&format!("- Reviews after validation: {}\n", report.reviews_row_count_after_validation));
    md.push_str(&format!("- Failed checks: {}\n", report.failed_checks().count()));
    md.push('\n');

    md.push_str("## Checks\n\n");
    md.push_str("| Check | Status | Details |\n");
    md.push_str("|-------|--------|---------|\n");
    for check in &report.checks {
        let status = if check.passed() { "✅ pass" } else { "❌ fail" };
        md.push_str(&format!("| `{}` | {} | {} |\n", check.name, status, describe_payload(check)));
    }

    md
}
