use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use crate::api::{ProjectionPayload, ProjectionResponse, run_http_server, run_projection};
use crate::config::AssumptionOverrides;
use crate::core::{ProjectionError, ProjectionSummary, YearProjection};

#[derive(Parser, Debug)]
#[command(
    name = "pension-projection",
    about = "Deterministic year-by-year pension, income, tax and net worth projection"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level for this crate when RUST_LOG is unset"
    )]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Project a profile read from a JSON file.
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[arg(long, help = "JSON document with profile, assumptions, lifeEvents and asOf")]
    pub input: PathBuf,
    #[arg(long, help = "Start date as YYYY-MM-DD; defaults to the file's asOf, then today")]
    pub as_of: Option<String>,
    #[arg(long, help = "Print the JSON response instead of a table")]
    pub json: bool,
    #[command(flatten)]
    pub overrides: AssumptionOverrides,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid projection input in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("--as-of must be a date like 2025-04-06, got {value:?}")]
    Date {
        value: String,
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("failed to serialize projection: {0}")]
    Serialize(serde_json::Error),

    #[error("server error: {0}")]
    Server(std::io::Error),
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await.map_err(CliError::Server),
        Command::Project(args) => {
            let output = project_command(&args, Local::now().date_naive())?;
            println!("{output}");
            Ok(())
        }
    }
}

/// Loads the input file, layers the CLI overrides over the file's, and renders
/// the result as text or JSON.
pub fn project_command(args: &ProjectArgs, today: NaiveDate) -> Result<String, CliError> {
    let raw = fs::read_to_string(&args.input).map_err(|source| CliError::Io {
        path: args.input.clone(),
        source,
    })?;
    let payload: ProjectionPayload =
        serde_json::from_str(&raw).map_err(|source| CliError::Json {
            path: args.input.clone(),
            source,
        })?;

    let as_of = match &args.as_of {
        Some(value) => parse_date(value)?,
        None => payload.as_of.unwrap_or(today),
    };
    let assumptions = args.overrides.apply(payload.resolved_assumptions());
    let response = run_projection(&payload, assumptions, as_of)?;

    if args.json {
        serde_json::to_string_pretty(&response).map_err(CliError::Serialize)
    } else {
        Ok(render_response(&response))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| CliError::Date {
        value: value.to_string(),
        source,
    })
}

pub fn render_response(response: &ProjectionResponse) -> String {
    let mut out = render_table(&response.rows);
    out.push('\n');
    out.push_str(&render_summary(&response.summary));
    out
}

pub fn render_table(rows: &[YearProjection]) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();

    out.push_str(&format!(
        "{:<6}{:>5}{:>15}{:>13}{:>13}{:>11}{:>15}\n",
        "Year", "Age", "Pension pot", "Drawdown", "Income", "Tax", "Net worth"
    ));
    out.push_str(&rule);
    out.push('\n');

    for row in rows {
        let age = row.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<6}{:>5}{:>15}{:>13}{:>13}{:>11}{:>15}",
            row.year,
            age,
            format_money(row.pension_pot_end),
            format_money(row.drawdown),
            format_money(row.total_income),
            format_money(row.tax_paid),
            format_money(row.net_worth),
        ));
        if row.funds_depleted {
            out.push_str("  depleted");
        }
        out.push('\n');
    }

    out.push_str(&rule);
    out.push('\n');
    out
}

pub fn render_summary(summary: &ProjectionSummary) -> String {
    let mut lines = Vec::new();

    match (summary.retirement_year, summary.pot_at_retirement) {
        (Some(year), Some(pot)) => lines.push(format!(
            "Retirement: {year} with a pot of {}",
            format_money(pot)
        )),
        _ => lines.push("Retirement: not reached within the projection".to_string()),
    }
    if summary.lump_sum_taken > 0 {
        lines.push(format!(
            "Tax-free lump sum: {}",
            format_money(summary.lump_sum_taken)
        ));
    }
    match (summary.first_depletion_year, summary.first_depletion_age) {
        (Some(year), Some(age)) => lines.push(format!("Funds depleted: {year} (age {age})")),
        (Some(year), None) => lines.push(format!("Funds depleted: {year}")),
        _ => lines.push(format!(
            "Funds last to the end of the projection ({})",
            summary.end_year
        )),
    }
    if summary.total_income_shortfall > 0 {
        lines.push(format!(
            "Unmet income: {}",
            format_money(summary.total_income_shortfall)
        ));
    }
    lines.push(format!(
        "Total tax paid: {}",
        format_money(summary.total_tax_paid)
    ));
    lines.push(format!(
        "Final pension pot: {}, final net worth: {}",
        format_money(summary.final_pension_pot),
        format_money(summary.final_net_worth)
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `£1,234,567` style, with a leading minus for negative amounts.
fn format_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-£{grouped}")
    } else {
        format!("£{grouped}")
    }
}
