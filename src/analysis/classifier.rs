//! Line classification for verbose test runner output.
//!
//! Each input line is mapped to a [`LineKind`] by prefix, checked in a fixed
//! priority order. Whether an unrecognized line belongs to a failure body is
//! decided by the collector, since it depends on whether a body is open.

/// Name used when a marker line is too short to carry a test name.
pub const UNKNOWN_TEST: &str = "Unknown";

/// What a single line of runner output means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// A bare `PASS` or `FAIL` line summarizing the whole run.
    StatusSentinel,
    /// `exit status <n>` noise from the runner.
    ExitStatus,
    /// `=== RUN <name>`: a test started executing.
    RunStart { name: String },
    /// `ok ...` or `? ...`: a package passed or had no test files.
    PackageOk,
    /// `FAIL <package> ...`: a package failed.
    PackageFail,
    /// `--- FAIL: <name> (<duration>)`: a single test failed.
    TestFail { name: String },
    /// Anything else.
    Other,
}

/// Classify one line of input.
pub fn classify(line: &str) -> LineKind {
    if line == "PASS" || line == "FAIL" {
        LineKind::StatusSentinel
    } else if line.starts_with("exit status") {
        LineKind::ExitStatus
    } else if line.starts_with("=== RUN") {
        LineKind::RunStart {
            name: extract_test_name(line),
        }
    } else if line.starts_with('?') || line.starts_with("ok") {
        LineKind::PackageOk
    } else if line.starts_with("FAIL") {
        LineKind::PackageFail
    } else if line.starts_with("--- FAIL") {
        LineKind::TestFail {
            name: extract_test_name(line),
        }
    } else {
        LineKind::Other
    }
}

/// Returns the third whitespace-separated field of a marker line.
pub fn extract_test_name(line: &str) -> String {
    line.split_whitespace()
        .nth(2)
        .unwrap_or(UNKNOWN_TEST)
        .to_string()
}
