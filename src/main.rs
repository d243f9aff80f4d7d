//! RescuePlan - exam-prep rescue planner
//!
//! CLI entry point.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use rescueplan::cli::{Cli, Command, OutputFormat};
use rescueplan::config::Config;
use rescueplan::lifecycle::LifecycleManager;
use rescueplan::oracle::create_oracle;
use rescueplan::repl::{Session, render_snapshot};
use rescueplan::store::PlanStore;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    // Logs go to a file so they never interleave with the interactive session
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rescueplan")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("rescueplan.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref())?;
    info!("rescueplan starting");

    let config = Config::load(cli.config.as_ref())?;
    let store = PlanStore::open(&config.storage.data_dir)?;

    match cli.command.unwrap_or(Command::Session) {
        Command::Session => {
            // Session needs the oracle; fail fast before the prompt appears
            config.validate()?;
            let oracle = create_oracle(&config.oracle)?;
            let manager = LifecycleManager::spawn(store, oracle);
            Session::new(manager).run().await?;
        }
        Command::Status { format } => {
            status(store, format)?;
        }
        Command::Reset { yes } => {
            reset(store, yes)?;
        }
    }

    Ok(())
}

/// Print the stored state without spawning the actor or touching the oracle
fn status(store: PlanStore, format: OutputFormat) -> Result<()> {
    debug!("status: called");
    let controller = rescueplan::lifecycle::Controller::new(store);
    let snapshot = controller.snapshot();

    match format {
        OutputFormat::Text => render_snapshot(&snapshot),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "phase": snapshot.phase.to_string(),
                "profile": snapshot.profile,
                "plan": snapshot.plan,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn reset(store: PlanStore, yes: bool) -> Result<()> {
    if !yes {
        print!("Delete the stored profile and plan? [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.clear()?;
    println!("Profile and plan deleted.");
    Ok(())
}
