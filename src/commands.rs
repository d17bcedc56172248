//! Command handlers and table rendering for the CLI.
//!
//! Handlers write to any `io::Write` so the output can be asserted on in
//! tests. API failures are printed as friendly messages rather than bubbled
//! up; only a broken output stream is an error here.

use crate::{Commands, LogCommand, ViewCommand};
use api_client::ApiClient;
use api_client::error::ApiError;
use chrono::NaiveDate;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Table};
use core_types::{AboutInfo, NewRun, NewWeighIn, Run, WeighIn};
use std::fmt::Display;
use std::io::{self, Write};

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const UNREACHABLE_MESSAGE: &str =
    "Error: API is unreachable. Please ensure the API is running and try again.";

const MISSING: &str = "None";

pub async fn run(
    command: Commands,
    today: NaiveDate,
    client: &dyn ApiClient,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        Commands::About => about(client, out).await,
        Commands::Log(LogCommand::Weight(args)) => {
            log_weigh_in(client, &args.into_record(today), out).await
        }
        Commands::Log(LogCommand::Run(args)) => log_run(client, &args.into_record(today), out).await,
        Commands::View(ViewCommand::Weight(args)) => view_weigh_ins(client, args.count(), out).await,
        Commands::View(ViewCommand::Run(args)) => view_runs(client, args.count(), out).await,
    }
}

pub async fn about(client: &dyn ApiClient, out: &mut impl Write) -> io::Result<()> {
    match client.get_about_info().await {
        Some(info) => writeln!(out, "{}", render_about(&info)),
        None => writeln!(out, "{UNREACHABLE_MESSAGE}"),
    }
}

pub async fn log_weigh_in(
    client: &dyn ApiClient,
    weigh_in: &NewWeighIn,
    out: &mut impl Write,
) -> io::Result<()> {
    match client.log_weigh_in(weigh_in).await {
        Ok(created) => {
            writeln!(out, "Logged weigh-in #{} for {}.", created.id, created.date)?;
            writeln!(out, "{}", render_weigh_ins(std::slice::from_ref(&created)))
        }
        Err(e) => writeln!(out, "{}", describe_failure(&e)),
    }
}

pub async fn log_run(client: &dyn ApiClient, run: &NewRun, out: &mut impl Write) -> io::Result<()> {
    match client.log_run(run).await {
        Ok(created) => {
            writeln!(out, "Logged run #{} for {}.", created.id, created.date)?;
            writeln!(out, "{}", render_runs(std::slice::from_ref(&created)))
        }
        Err(e) => writeln!(out, "{}", describe_failure(&e)),
    }
}

pub async fn view_weigh_ins(client: &dyn ApiClient, count: u32, out: &mut impl Write) -> io::Result<()> {
    match client.recent_weigh_ins(count).await {
        Ok(weigh_ins) if weigh_ins.is_empty() => writeln!(out, "No weigh-ins logged yet."),
        Ok(weigh_ins) => writeln!(out, "{}", render_weigh_ins(&weigh_ins)),
        Err(e) => writeln!(out, "{}", describe_failure(&e)),
    }
}

pub async fn view_runs(client: &dyn ApiClient, count: u32, out: &mut impl Write) -> io::Result<()> {
    match client.recent_runs(count).await {
        Ok(runs) if runs.is_empty() => writeln!(out, "No runs logged yet."),
        Ok(runs) => writeln!(out, "{}", render_runs(&runs)),
        Err(e) => writeln!(out, "{}", describe_failure(&e)),
    }
}

fn describe_failure(error: &ApiError) -> String {
    match error {
        ApiError::Unreachable(_) => UNREACHABLE_MESSAGE.to_string(),
        ApiError::Rejected { message, .. } => format!("Error: {message}"),
        other => format!("Error: {other}"),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS);
    table
}

fn or_missing<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

/// Formats a duration in seconds as `H:MM:SS`.
fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

pub fn render_about(info: &AboutInfo) -> String {
    let mut table = new_table();
    table.set_header(vec!["Health Tracker", "Value"]);
    table.add_row(vec![Cell::new("CLI Version"), Cell::new(CLI_VERSION)]);
    table.add_row(vec![Cell::new("API Version"), Cell::new(&info.api_version)]);
    table.add_row(vec![Cell::new("Weigh-ins Logged"), Cell::new(info.weigh_ins_count)]);
    table.add_row(vec![Cell::new("Runs Logged"), Cell::new(info.runs_count)]);
    table.add_row(vec![
        Cell::new("Last Weigh-in"),
        Cell::new(or_missing(info.last_weigh_in_date)),
    ]);
    table.add_row(vec![Cell::new("Last Run"), Cell::new(or_missing(info.last_run_date))]);
    table.to_string()
}

pub fn render_weigh_ins(weigh_ins: &[WeighIn]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Date",
        "Weight",
        "BMI",
        "Fat %",
        "Muscle %",
        "Resting Metab",
        "Visceral Fat",
    ]);
    for w in weigh_ins {
        table.add_row(vec![
            w.date.to_string(),
            format!("{:.1}", w.weight),
            format!("{:.1}", w.bmi),
            or_missing(w.fat),
            or_missing(w.muscle),
            or_missing(w.resting_metab),
            or_missing(w.visceral_fat),
        ]);
    }
    table.to_string()
}

pub fn render_runs(runs: &[Run]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Date", "Distance", "Time"]);
    for r in runs {
        table.add_row(vec![
            r.date.to_string(),
            format!("{:.2} {}", r.distance, r.distance_unit),
            format_duration(r.time_in_seconds),
        ]);
    }
    table.to_string()
}
