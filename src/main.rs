//! flakesum - condense repeated failures in verbose test runner output
//!
//! A pipe filter that sits between a test runner and a log. Status lines
//! pass through unchanged; failures are grouped by test and by failure
//! text, and reported once per package with their counts.
//!
//! Exit codes:
//!   0 - No test failures seen
//!   1 - At least one test failure seen
//!   2 - Runtime error (bad arguments, config, I/O)

mod analysis;
mod cli;
mod collector;
mod config;
mod models;
mod report;
mod stream;

#[cfg(test)]
mod golden;

use anyhow::{Context, Result};
use cli::Args;
use collector::Collector;
use config::{Config, CONFIG_FILE};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXIT_FAILURES: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_ERROR);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let (config, config_warning) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_ERROR);
        }
    };

    init_logging(&args, &config);

    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }
    debug!("Arguments: {:?}", args);

    match run_filter(&args, config).await {
        Ok(any_failed) => {
            if any_failed {
                std::process::exit(EXIT_FAILURES);
            }
            Ok(())
        }
        Err(e) => {
            error!("Filter failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}

/// Handle --init-config: generate a default .flakesum.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(EXIT_ERROR);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    eprintln!("Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging on stderr, keeping stdout for the filtered stream.
///
/// `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Stream the input through the collector. Returns whether any test failed.
async fn run_filter(args: &Args, config: Config) -> Result<bool> {
    let options = config.filter_options();
    info!(
        idle_lines = %options.idle_lines,
        package_pass = %options.package_pass,
        flush_at_eof = options.flush_at_eof,
        "flakesum v{}",
        env!("CARGO_PKG_VERSION")
    );

    let reader = stream::open_input(args.input.as_deref()).await?;
    let mut stdout = tokio::io::stdout();
    let mut collector = Collector::new(options);

    let stats = stream::run(&mut collector, reader, &mut stdout)
        .await
        .context("Failed to filter test output")?;

    info!(
        lines = stats.lines_read,
        failed = collector.any_failed(),
        "done"
    );
    Ok(collector.any_failed())
}

/// Load configuration, merged with CLI arguments.
///
/// A broken default config file is not fatal; the returned warning is
/// logged once logging is up.
fn load_config(args: &Args) -> Result<(Config, Option<String>)> {
    let (mut config, warning) = if let Some(ref config_path) = args.config {
        (Config::load(config_path)?, None)
    } else {
        match Config::load_default() {
            Ok(Some(config)) => (config, None),
            Ok(None) => (Config::default(), None),
            Err(e) => (
                Config::default(),
                Some(format!("Ignoring {}: {:#}", CONFIG_FILE, e)),
            ),
        }
    };

    config.merge_with_args(args);
    Ok((config, warning))
}
