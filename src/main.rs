use api_client::HealthTrackerClient;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use configuration::LogFormat;
use core_types::dates::parse_iso_date;
use core_types::{NewRun, NewWeighIn};

mod commands;

/// The main entry point for the Health Tracker command-line client.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments. Usage errors exit here with status 2.
    let cli = Cli::parse();

    let mut settings = configuration::load_settings()?;
    if let Some(api_url) = cli.api_url {
        settings.client.base_url = api_url;
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    if !cli.verbose {
        // Keep the terminal for tables and friendly errors unless asked otherwise.
        settings.logging.filter = "error".to_string();
    }
    let _log_guard = configuration::init_tracing(&settings.logging);

    let client = HealthTrackerClient::new(&settings.client)?;
    tracing::debug!(base_url = client.base_url(), "Using Health Tracker API");
    let today = chrono::Local::now().date_naive();

    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, today, &client, &mut stdout).await?;

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Log and review weigh-ins and runs through the Health Tracker API.
#[derive(Parser)]
#[command(name = "health-tracker", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the Health Tracker API (overrides `client.base_url`).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log output format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Emit diagnostic logs on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the API version and how much has been logged so far.
    About,
    /// Log health data.
    #[command(subcommand)]
    Log(LogCommand),
    /// View recent health data.
    #[command(subcommand)]
    View(ViewCommand),
}

#[derive(Subcommand)]
pub enum LogCommand {
    /// Log a weigh-in.
    Weight(LogWeightArgs),
    /// Log a run.
    Run(LogRunArgs),
}

#[derive(Subcommand)]
pub enum ViewCommand {
    /// Show the most recent weigh-ins.
    Weight(ViewArgs),
    /// Show the most recent runs.
    Run(ViewArgs),
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_iso_date(s).ok_or_else(|| format!("'{s}' is not a date in YYYY-MM-DD format"))
}

#[derive(Args)]
pub struct LogWeightArgs {
    /// Date of the weigh-in (format: YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Body weight in pounds (100-300).
    #[arg(long)]
    weight: f64,

    /// Body mass index.
    #[arg(long)]
    bmi: f64,

    /// Body fat percentage (0-100).
    #[arg(long)]
    fat: Option<f64>,

    /// Muscle mass percentage (0-100).
    #[arg(long)]
    muscle: Option<f64>,

    /// Resting metabolic rate in kcal (above 1000).
    #[arg(long)]
    resting_metab: Option<i64>,

    /// Visceral fat level (10-30).
    #[arg(long)]
    visceral_fat: Option<i64>,
}

impl LogWeightArgs {
    pub fn into_record(self, today: NaiveDate) -> NewWeighIn {
        NewWeighIn {
            date: self.date.unwrap_or(today),
            weight: self.weight,
            bmi: self.bmi,
            fat: self.fat,
            muscle: self.muscle,
            resting_metab: self.resting_metab,
            visceral_fat: self.visceral_fat,
        }
    }
}

#[derive(Args)]
pub struct LogRunArgs {
    /// Date of the run (format: YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Distance covered.
    #[arg(long)]
    distance: f64,

    /// Unit of the distance (e.g., "mi", "km").
    #[arg(long, default_value = "mi")]
    unit: String,

    /// Duration of the run in seconds.
    #[arg(long)]
    time: u32,
}

impl LogRunArgs {
    pub fn into_record(self, today: NaiveDate) -> NewRun {
        NewRun {
            date: self.date.unwrap_or(today),
            distance: self.distance,
            distance_unit: self.unit,
            time_in_seconds: i64::from(self.time),
        }
    }
}

#[derive(Args)]
pub struct ViewArgs {
    /// How many records to show, newest first.
    #[arg(short, long, default_value_t = 5)]
    count: u32,
}

impl ViewArgs {
    pub fn count(&self) -> u32 {
        self.count
    }
}
