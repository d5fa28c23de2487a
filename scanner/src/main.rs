//! clusterscan — cluster compliance scan publisher.
//!
//! Audits the cluster (or replays captured audits over a date range) and
//! publishes the results, a per-run metadata record, and a scanner heartbeat
//! to object storage.
//!
//! Usage:
//!   clusterscan --config ./config/scanner-config.yaml
//!   clusterscan --version
//!
//! Exit status is 0 when every scan day was published and 1 otherwise,
//! including configuration and date-range errors.

use std::{path::PathBuf, process::ExitCode};

use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clusterscan_audit::ConfiguredAuditSource;
use clusterscan_config::{scanner_version, LogFormat, ScannerConfig};
use clusterscan_contracts::error::ScanResult;
use clusterscan_core::{Driver, FolderKeyGenerator, Publisher, RunSummary, ScannerIdentity};
use clusterscan_store::open_store;

const DEFAULT_CONFIG_PATH: &str = "./config/scanner-config.yaml";

// ── CLI definition ────────────────────────────────────────────────────────────

/// Audit a Kubernetes cluster and publish the results to blob storage.
#[derive(Parser)]
#[command(name = "clusterscan", version, about)]
struct Cli {
    /// Location of the scanner configuration file (YAML, JSON or TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logging format lives in the config file, so a broken file can only be
    // reported on stderr.
    let config = match ScannerConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse configuration at {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.log_format);

    match run(&config) {
        Ok(summary) if !summary.has_failures() => {
            info!(days = summary.days.len(), "all scan days published");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            for day in summary.failed_days() {
                if let Err(e) = &day.published {
                    error!(date = %day.date, error = %e, "scan day not fully published");
                }
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "scan aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat) {
    // RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match format {
        LogFormat::PlainText => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

// ── Pipeline wiring ───────────────────────────────────────────────────────────

fn run(config: &ScannerConfig) -> ScanResult<RunSummary> {
    let range = config.date_range(Utc::now().date_naive())?;
    let source = ConfiguredAuditSource::from_config(config)?;
    let store = open_store(config)?;

    let identity = ScannerIdentity {
        audit_engine_version: source.engine_version(),
        ..config.identity(scanner_version())
    };
    let publisher = Publisher::new(store, FolderKeyGenerator::from_entropy(), identity);

    info!(
        scanner_id = %config.scanner.id,
        cluster_id = %config.scanner.cluster_id,
        from = %range.start(),
        to = %range.end(),
        replay = source.is_replay(),
        "scanner starting"
    );

    let mut driver = Driver::new(Box::new(source), publisher);
    Ok(driver.run(&range))
}
