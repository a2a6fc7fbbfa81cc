//! Data models shared by the collector, aggregator and report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with unrecognized lines while no failure body is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdleLines {
    /// Copy them to the output unchanged (default)
    #[default]
    Pass,
    /// Discard them
    Drop,
}

/// What an `ok`/`?` package line does to pending failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PackagePass {
    /// Leave pending failures for the next FAIL boundary (default)
    #[default]
    Keep,
    /// Drop all pending failures and run counts
    Reset,
}

impl fmt::Display for IdleLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdleLines::Pass => write!(f, "pass"),
            IdleLines::Drop => write!(f, "drop"),
        }
    }
}

impl fmt::Display for PackagePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagePass::Keep => write!(f, "keep"),
            PackagePass::Reset => write!(f, "reset"),
        }
    }
}

/// Behavior switches for the collector, read from the `[filter]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Unrecognized lines outside a failure body: "pass" or "drop".
    #[serde(default)]
    pub idle_lines: IdleLines,

    /// Effect of an `ok`/`?` package line on pending failures: "keep" or "reset".
    #[serde(default)]
    pub package_pass: PackagePass,

    /// Report failures still pending when the input ends.
    #[serde(default)]
    pub flush_at_eof: bool,

    /// Print the failure percentage when run counts are known.
    #[serde(default = "default_true")]
    pub show_rate: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            idle_lines: IdleLines::default(),
            package_pass: PackagePass::default(),
            flush_at_eof: false,
            show_rate: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A distinct failure body and how often it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySummary {
    pub count: usize,
    /// Body lines, each terminated by a newline, without the test name line.
    pub text: String,
}

/// One failing test as it appears in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureSummary {
    pub name: String,
    pub total_failures: usize,
    /// Percentage of runs that failed, if the test was seen starting.
    pub failure_rate: Option<f64>,
    /// Ordered by descending count, then first appearance.
    pub bodies: Vec<BodySummary>,
}

impl FailureSummary {
    /// Returns the report header, e.g. `--- FAIL: TestA (3 times, 75.00%)`.
    pub fn header(&self, show_rate: bool) -> String {
        match self.failure_rate {
            Some(rate) if show_rate => format!(
                "--- FAIL: {} ({} times, {:.2}%)",
                self.name, self.total_failures, rate
            ),
            _ => format!("--- FAIL: {} ({} times)", self.name, self.total_failures),
        }
    }
}
