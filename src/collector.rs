//! The run session: a line-driven state machine over runner output.
//!
//! Pass-through lines are written out as soon as they are seen. Failure
//! bodies are buffered until the next marker closes them, then folded into
//! the [`Aggregation`]. A `FAIL <package>` line flushes the report.

use crate::analysis::{classify, Aggregation, LineKind};
use crate::models::{FilterOptions, IdleLines, PackagePass};
use crate::report::render_report;
use tracing::debug;

/// A failure body that is still accumulating lines.
#[derive(Debug)]
struct OpenFailure {
    name: String,
    lines: Vec<String>,
}

impl OpenFailure {
    fn new(name: String) -> Self {
        let lines = vec![name.clone()];
        Self { name, lines }
    }

    fn into_parts(self) -> (String, String) {
        let mut body = String::new();
        for line in &self.lines {
            body.push_str(line);
            body.push('\n');
        }
        (self.name, body)
    }
}

/// Consumes runner output one line at a time.
#[derive(Debug)]
pub struct Collector {
    options: FilterOptions,
    open: Option<OpenFailure>,
    aggregation: Aggregation,
    any_failed: bool,
}

impl Collector {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            options,
            open: None,
            aggregation: Aggregation::new(),
            any_failed: false,
        }
    }

    /// Whether any test failure was seen so far.
    pub fn any_failed(&self) -> bool {
        self.any_failed
    }

    /// Process one input line (without its terminator), appending any
    /// produced output lines to `out`.
    pub fn process_line(&mut self, line: &str, out: &mut String) {
        match classify(line) {
            LineKind::StatusSentinel | LineKind::ExitStatus => {}
            LineKind::RunStart { name } => {
                self.aggregation.record_run(&name);
                self.finish_failure();
            }
            LineKind::PackageOk => {
                self.finish_failure();
                push_line(out, line);
                if self.options.package_pass == PackagePass::Reset {
                    debug!("package passed, dropping pending failures and run counts");
                    self.aggregation.clear();
                }
            }
            LineKind::PackageFail => {
                self.finish_failure();
                self.flush_report(out);
                push_line(out, "FAIL");
                push_line(out, line);
            }
            LineKind::TestFail { name } => {
                self.finish_failure();
                debug!(test = %name, "failure body opened");
                self.open = Some(OpenFailure::new(name));
            }
            LineKind::Other => match self.open {
                Some(ref mut open) => open.lines.push(line.to_string()),
                None if self.options.idle_lines == IdleLines::Pass => push_line(out, line),
                None => {}
            },
        }
    }

    /// Handle the end of input.
    ///
    /// The open body is always finalized so it counts toward the exit
    /// status; it is only printed when `flush_at_eof` is set.
    pub fn finish(&mut self, out: &mut String) {
        self.finish_failure();
        if self.options.flush_at_eof && !self.aggregation.is_empty() {
            debug!("flushing failures pending at end of input");
            self.flush_report(out);
        }
    }

    fn finish_failure(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };
        self.any_failed = true;
        let (name, body) = open.into_parts();
        debug!(test = %name, "failure body closed");
        self.aggregation.record_failure(&name, body);
    }

    fn flush_report(&mut self, out: &mut String) {
        let failures = self.aggregation.sorted_groups();
        debug!(tests = failures.len(), "rendering report");
        out.push_str(&render_report(&failures, self.options.show_rate));
        self.aggregation.clear();
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
