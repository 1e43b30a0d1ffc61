//! CLI front-end for the transaction dashboard.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use txn_dashboard::aggregate::{Summary, parse_amount};
use txn_dashboard::combine::Card;
use txn_dashboard::config::{API_KEY_ENV, GatewayConfig, URL_ENV};
use txn_dashboard::dashboard::{Dashboard, LoadState};
use txn_dashboard::date::normalize;
use txn_dashboard::filter::FilterKey;
use txn_dashboard::gateway::{BlockingTransactionGateway, DatasetGateway};
use txn_dashboard::models::Transaction;

/// Transaction dashboard: card statistics and the filtered table.
#[derive(Debug, Parser)]
#[command(name = "txn-dashboard", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Show the total and average cards.
    Summary(CardArgs),
    /// Show the table filtered by the merged card filters.
    Table(CardArgs),
    /// Print the canonical form of a raw transfer timestamp.
    Normalize {
        /// Raw timestamp, e.g. "15/01/2024 10:00:00".
        raw: String,
    },
}

/// Per-card filter values.
#[derive(Debug, Default, Args)]
struct CardArgs {
    /// Total card month filter (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    total_month: Option<String>,
    /// Total card date filter (YYYY-MM-DD).
    #[arg(long, value_name = "YYYY-MM-DD")]
    total_date: Option<String>,
    /// Average card month filter (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    avg_month: Option<String>,
    /// Average card date filter (YYYY-MM-DD).
    #[arg(long, value_name = "YYYY-MM-DD")]
    avg_date: Option<String>,
    /// Average card sender filter (case-insensitive substring).
    #[arg(long)]
    avg_sender: Option<String>,
}

impl CardArgs {
    /// Feeds every provided value through the dashboard's filter callback.
    fn apply(&self, dashboard: &mut Dashboard) {
        let edits = [
            (Card::Total, FilterKey::Month, &self.total_month),
            (Card::Total, FilterKey::Date, &self.total_date),
            (Card::Average, FilterKey::Month, &self.avg_month),
            (Card::Average, FilterKey::Date, &self.avg_date),
            (Card::Average, FilterKey::Sender, &self.avg_sender),
        ];
        for (card, key, value) in edits {
            if let Some(text) = value.as_deref() {
                dashboard.on_filter_change(card, key, text);
            }
        }
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.command {
        Command::Summary(args) => with_gateway(|gateway| cmd_summary(gateway, &args)),
        Command::Table(args) => with_gateway(|gateway| cmd_table(gateway, &args)),
        Command::Normalize { raw } => cmd_normalize(&raw),
    }
}

/// Builds the gateway from the environment and runs `action` with it,
/// printing configuration errors.
fn with_gateway<F>(action: F) -> io::Result<ExitCode>
where
    F: FnOnce(&BlockingTransactionGateway) -> io::Result<ExitCode>,
{
    let built = GatewayConfig::from_env()
        .and_then(|config| BlockingTransactionGateway::builder().config(config).build());
    match built {
        Ok(gateway) => action(&gateway),
        Err(err) => {
            let mut stderr = io::stderr().lock();
            writeln!(stderr, "{} {err}", "error:".red().bold())?;
            writeln!(
                stderr,
                "  {} create a .env file with {URL_ENV}=<url> and {API_KEY_ENV}=<key>",
                "hint:".cyan()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Fetches the dataset into a fresh dashboard, printing the failure and a
/// retry hint if the fetch fails.
fn load<G: DatasetGateway>(gateway: &G, args: &CardArgs) -> io::Result<Option<Dashboard>> {
    let spinner = make_spinner("Fetching transactions...");
    let mut dashboard = Dashboard::new();
    dashboard.reload(gateway);
    spinner.finish_and_clear();

    if let LoadState::Failed(ref message) = *dashboard.state() {
        let mut stderr = io::stderr().lock();
        writeln!(
            stderr,
            "{} failed to load transactions: {message}",
            "error:".red().bold()
        )?;
        writeln!(stderr, "  {} run the command again to retry", "hint:".cyan())?;
        return Ok(None);
    }
    args.apply(&mut dashboard);
    Ok(Some(dashboard))
}

/// Executes the `summary` subcommand: prints both cards.
fn cmd_summary<G: DatasetGateway>(gateway: &G, args: &CardArgs) -> io::Result<ExitCode> {
    let Some(dashboard) = load(gateway, args)? else {
        return Ok(ExitCode::FAILURE);
    };
    print_cards(
        &dashboard.card_summary(Card::Total),
        &dashboard.card_summary(Card::Average),
    )?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `table` subcommand: prints rows matching the merged filter.
fn cmd_table<G: DatasetGateway>(gateway: &G, args: &CardArgs) -> io::Result<ExitCode> {
    let Some(dashboard) = load(gateway, args)? else {
        return Ok(ExitCode::FAILURE);
    };
    print_transactions_table(&dashboard.table_rows())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `normalize` subcommand.
fn cmd_normalize(raw: &str) -> io::Result<ExitCode> {
    let normalized = normalize(Some(raw));
    let mut out = io::stdout().lock();
    match normalized.parsed() {
        Some(date) => {
            writeln!(out, "{} {date}", "Canonical:".bold())?;
            writeln!(out, "{} {}", "Month:".bold(), date.month_key())?;
            writeln!(out, "{} {}", "Day:".bold(), date.day_key())?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            writeln!(out, "{} {normalized}", "Unparseable:".yellow().bold())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Formats an amount rounded to exactly `places` fractional digits.
fn format_amount(value: Decimal, places: u32) -> String {
    let width = usize::try_from(places).unwrap_or(0);
    format!("{:.width$}", value.round_dp(places))
}

/// Prints the total and average cards.
fn print_cards(total: &Summary, average: &Summary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Dashboard".green().bold())?;
    writeln!(out)?;
    print_card(&mut out, "Total:", &format_amount(total.sum, 2), total)?;
    print_card(&mut out, "Average:", &format_amount(average.average, 0), average)?;
    Ok(())
}

/// Prints one card line with its record count and, when non-zero, the
/// number of amounts counted as zero in that card's rows.
fn print_card<W: Write>(
    out: &mut W,
    label: &str,
    value: &str,
    summary: &Summary,
) -> io::Result<()> {
    write!(
        out,
        "  {} {value} {}",
        label.bold(),
        format_args!("({} transactions)", summary.count).dimmed()
    )?;
    if summary.malformed > 0 {
        write!(
            out,
            " {}",
            format_args!("{} unreadable amount(s) counted as zero", summary.malformed).yellow()
        )?;
    }
    writeln!(out)
}

/// Prints transactions in a table.
fn print_transactions_table(txs: &[&Transaction]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Bank").fg(Color::Cyan),
        Cell::new("Sender").fg(Color::Cyan),
        Cell::new("Receiver").fg(Color::Cyan),
        Cell::new("Transfer time").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    for tx in txs {
        let when = tx.transfer_date();
        let when_cell = if when.is_parsed() {
            Cell::new(when.to_string())
        } else {
            Cell::new(when.to_string()).fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(tx.bank_name.as_deref().unwrap_or("\u{2014}")),
            Cell::new(&tx.sender),
            Cell::new(tx.receiver.as_deref().unwrap_or("\u{2014}")),
            when_cell,
            Cell::new(format_amount(parse_amount(tx.amount.as_deref()), 2)),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            // stderr itself may be gone; nothing more to do.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
