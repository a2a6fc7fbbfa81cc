//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{IdleLines, PackagePass};
use clap::Parser;
use std::path::PathBuf;

/// flakesum - condense repeated test failures
///
/// Reads verbose test runner output (e.g. `go test -v`), folds identical
/// failures of the same test together and prints each distinct failure once,
/// with how many times it happened and what share of runs failed.
///
/// Examples:
///   go test -v -count=50 ./... | flakesum
///   flakesum test-output.txt
///   go test -v ./... | flakesum --idle-lines drop --no-rate
///   flakesum --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Runner output to read; stdin when absent or `-`
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .flakesum.toml in the current directory
    #[arg(short, long, value_name = "FILE", env = "FLAKESUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output (on stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// What to do with unrecognized lines outside a failure body
    #[arg(long, value_name = "MODE")]
    pub idle_lines: Option<IdleLines>,

    /// Whether an `ok`/`?` package line drops pending failures
    #[arg(long, value_name = "MODE")]
    pub package_pass: Option<PackagePass>,

    /// Report failures still pending when the input ends
    ///
    /// By default only a `FAIL <package>` line prints a report; failures
    /// after the last one only affect the exit status.
    #[arg(long)]
    pub flush_at_eof: bool,

    /// Do not print failure percentages
    #[arg(long)]
    pub no_rate: bool,

    /// Generate a default .flakesum.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if input.as_os_str() != "-" && input.is_dir() {
                return Err(format!("Input is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            config: None,
            verbose: false,
            quiet: false,
            idle_lines: None,
            package_pass: None,
            flush_at_eof: false,
            no_rate: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "flakesum",
            "--idle-lines",
            "drop",
            "--package-pass",
            "reset",
            "--no-rate",
            "out.txt",
        ])
        .unwrap();
        assert_eq!(args.idle_lines, Some(IdleLines::Drop));
        assert_eq!(args.package_pass, Some(PackagePass::Reset));
        assert!(args.no_rate);
        assert_eq!(args.input, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args();
        args.input = Some(dir.path().to_path_buf());
        assert!(args.validate().is_err());

        args.input = Some(PathBuf::from("-"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::WARN);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
