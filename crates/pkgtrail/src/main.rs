//! pkgtrail
//!
//! Lists top-level packages installed through apt, snap, pip and
//! `cargo install`, newest install or upgrade first.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use pkgtrail_exec::{CommandExecutor, LocalExecutor};
use pkgtrail_pkg::collect_report;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod factory;
mod output;

use cli::Cli;
use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Tracing depends on the config's log level, so report load failures afterwards
    let (config, config_error) = match Config::load_default(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_tracing(cli.log_level_override().unwrap_or(config.log_level.as_str()));

    if let Some(e) = config_error {
        warn!(error = %e, "failed to load config, using defaults");
    }

    let options = cli.report_options(&config.report);
    debug!(?options, "resolved report options");

    let executor: Arc<dyn CommandExecutor> = Arc::new(LocalExecutor::new());
    let collectors = factory::build_collectors(&config.sources, executor);

    let report = collect_report(&collectors, options.selection)
        .await
        .finish(options.limit);

    let rendered = output::render(&report.records, options.format, options.tz)?;
    writeln!(std::io::stdout().lock(), "{rendered}")?;

    if cli.show_skipped {
        let mut stderr = std::io::stderr().lock();
        for (manager, skipped) in &report.skipped {
            writeln!(
                stderr,
                "{manager}: skipped {skipped} package(s) with no determinable install time"
            )?;
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only the report; `RUST_LOG` wins over `level`
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
