use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use talent_client::app_log;
use talent_client::cli::{handle_command, Cli};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "TALENTDESK_LOG";

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            if cli.log_json {
                tracing_subscriber::registry()
                    .with(
                        fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_current_span(false)
                            .with_span_list(false),
                    )
                    .with(filter)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_ansi(false).with_writer(file))
                    .with(filter)
                    .init();
            }
        }
        None => {
            if cli.log_json {
                tracing_subscriber::registry()
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .with(filter)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_writer(std::io::stderr))
                    .with(filter)
                    .init();
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match handle_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            app_log!(error, "Command failed: {:?}", e);
            eprintln!("command failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
