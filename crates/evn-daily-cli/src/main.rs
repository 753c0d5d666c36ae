//! EVN Daily CLI - daily electricity consumption collector
//!
//! Fetches the last days of consumption from the EVN customer portal,
//! falls back to generated data when the portal is unavailable, and
//! supervises scheduled runs.

mod config;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evn_daily::{
    AcquisitionPipeline, DataSource, FixedJitter, JitterSource, JsonOutputStore, RandomJitter,
    RegionResolver, ReqwestTransport, ResultDocument, RunHistoryTracker, Settings,
    SubprocessRunner,
};

use config::LoadedSettings;

#[derive(Parser)]
#[command(name = "evn-daily")]
#[command(about = "EVN daily electricity consumption collector", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/evn-daily/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch live data (generated data if the portal fails) and save it
    Fetch,

    /// Generate demo data without contacting the portal
    Demo {
        /// Pin jitter to 1.0 for reproducible output
        #[arg(long)]
        fixed: bool,
    },

    /// Scheduled run: backup, fetch under a hard timeout, failure alerting
    Cron,

    /// Print the summary of the saved output
    Show,

    /// Show effective configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match config::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&loaded.settings.log_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Fetch => cmd_fetch(&loaded.settings).await,
        Commands::Demo { fixed } => cmd_demo(&loaded.settings, fixed),
        Commands::Cron => cmd_cron(&loaded.settings, cli.config).await,
        Commands::Show => cmd_show(&loaded.settings),
        Commands::Config => cmd_config(&loaded),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("❌ {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// ============================================
// Command Implementations
// ============================================

fn build_pipeline(settings: &Settings, jitter: Box<dyn JitterSource>) -> Result<AcquisitionPipeline> {
    settings.validate().map_err(|e| anyhow!(e)).context("Invalid configuration")?;

    let transport = ReqwestTransport::new(&settings.network.user_agent)
        .context("Failed to set up HTTP transport")?;

    Ok(AcquisitionPipeline::new(settings, Arc::new(transport), jitter))
}

fn save(settings: &Settings, document: &ResultDocument) -> Result<()> {
    JsonOutputStore::new(&settings.history.output_path)
        .write(document)
        .context("Failed to write output")
}

async fn cmd_fetch(settings: &Settings) -> Result<ExitCode> {
    let jitter = RandomJitter::from_seed(settings.pricing.jitter_seed);
    let mut pipeline = build_pipeline(settings, Box::new(jitter))?;

    let document = pipeline
        .run(Local::now().date_naive())
        .await
        .context("Acquisition failed")?;
    save(settings, &document)?;

    print_summary(&document);
    println!(
        "\n{} Saved to {:?}",
        "✓".green(),
        settings.history.output_path
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_demo(settings: &Settings, fixed: bool) -> Result<ExitCode> {
    let jitter: Box<dyn JitterSource> = if fixed {
        Box::new(FixedJitter::neutral())
    } else {
        Box::new(RandomJitter::from_seed(settings.pricing.jitter_seed))
    };
    let mut pipeline = build_pipeline(settings, jitter)?;

    let document = pipeline
        .run_demo(Local::now().date_naive(), fixed)
        .context("Demo generation failed")?;
    save(settings, &document)?;

    print_summary(&document);
    println!(
        "\n{} Demo data saved to {:?}",
        "✓".green(),
        settings.history.output_path
    );
    Ok(ExitCode::SUCCESS)
}

async fn cmd_cron(settings: &Settings, config_path: Option<PathBuf>) -> Result<ExitCode> {
    let exe = std::env::current_exe().context("Could not locate the evn-daily executable")?;

    let mut runner = SubprocessRunner::new(exe);
    if let Some(path) = config_path {
        runner = runner.arg("--config").arg(path.to_string_lossy());
    }
    let runner = runner.arg("fetch");

    let tracker = RunHistoryTracker::new(settings.history.clone(), Arc::new(runner));
    let outcome = tracker.run().await;

    let status = if outcome.success {
        "SUCCESS".green().bold()
    } else {
        "FAILURE".red().bold()
    };
    println!("Cron run: {}", status);
    if outcome.alert_raised {
        println!(
            "{} {} consecutive failures",
            "ALERT:".red().bold(),
            outcome.streak
        );
    }

    Ok(ExitCode::from(outcome.exit_code() as u8))
}

fn cmd_show(settings: &Settings) -> Result<ExitCode> {
    let store = JsonOutputStore::new(&settings.history.output_path);
    let document = store
        .read()
        .with_context(|| format!("No readable output at {:?}", store.path()))?;

    print_summary(&document);
    Ok(ExitCode::SUCCESS)
}

fn cmd_config(loaded: &LoadedSettings) -> Result<ExitCode> {
    let settings = &loaded.settings;
    let account = &settings.account;

    println!("{}", "Configuration:".bold());
    match &loaded.source {
        Some(path) => println!("  Path: {:?}", path),
        None => println!("  Path: {}", "defaults (no config file)".yellow()),
    }
    println!(
        "  Username: {}",
        if account.username.is_empty() {
            "Not set".red()
        } else {
            account.username.normal()
        }
    );
    println!(
        "  Password: {}",
        if account.password.is_empty() {
            "Not set".red()
        } else {
            "Set".green()
        }
    );
    println!(
        "  Customer ID: {}",
        if account.customer_id.is_empty() {
            "Not set".red()
        } else {
            account.customer_id.cyan()
        }
    );

    let region = RegionResolver::new(settings.regions.clone())
        .resolve_with_hint(&account.customer_id, account.region);
    let how = if account.region.is_some() {
        "configured"
    } else {
        "detected"
    };
    println!("  Region: {} ({})", region.to_string().cyan(), how);

    println!(
        "  Pricing: {} VND/kWh, seasonal factor {}, {} synthetic days",
        settings.pricing.unit_price, settings.pricing.seasonal_factor, settings.pricing.synthetic_days
    );
    println!("  Output: {:?}", settings.history.output_path);
    println!("  Run log: {:?}", settings.history.log_path);
    println!(
        "  Catalog: {}",
        if settings.catalog.is_some() {
            "custom"
        } else {
            "built-in"
        }
    );

    if let Err(e) = settings.validate() {
        println!("\n{} {}", "Warning:".yellow().bold(), e);
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================
// Output
// ============================================

fn print_summary(document: &ResultDocument) {
    let summary = &document.summary;

    println!("\n{}", "EVN daily consumption".bold());
    println!("{}", "=".repeat(60));
    println!("  Customer: {} ({})", document.customer_name(), document.customer_id);
    if let Some(address) = &document.customer_info.address {
        println!("  Address: {}", address);
    }
    println!("  Region: {}", document.region);

    let source = match document.source {
        DataSource::Live => document.source.to_string().green(),
        _ => document.source.to_string().yellow(),
    };
    println!("  Status: {} | Source: {}", document.status, source);
    if let Some(period) = &summary.billing_period {
        println!("  Period: {}", period);
    }
    if let Some(note) = &document.note {
        println!("  {}", note.dimmed());
    }

    println!("{}", "-".repeat(60));
    for record in &document.daily_data {
        println!(
            "  {} {:<10} {:>6.1} kWh {:>12} VND",
            record.date.format("%d/%m/%Y"),
            record.day_of_week.as_deref().unwrap_or(""),
            record.consumption_kwh,
            format_vnd(record.amount_vnd)
        );
    }
    println!("{}", "-".repeat(60));

    println!(
        "  Total: {} kWh | {} VND",
        summary.total_consumption_kwh.to_string().bold(),
        format_vnd(summary.total_amount_vnd).bold()
    );
    println!(
        "  Average: {} kWh/day over {} days",
        summary.average_daily_kwh, summary.days_count
    );
}

/// Thousands separators: 68750 -> "68,750"
fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vnd_groups_thousands() {
        assert_eq!(format_vnd(0), "0");
        assert_eq!(format_vnd(950), "950");
        assert_eq!(format_vnd(68750), "68,750");
        assert_eq!(format_vnd(1234567), "1,234,567");
    }

    #[test]
    fn test_cli_parses_global_config_flag() {
        let cli = Cli::try_parse_from(["evn-daily", "demo", "--fixed", "--config", "evn.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("evn.toml")));
        assert!(matches!(cli.command, Commands::Demo { fixed: true }));
    }
}
