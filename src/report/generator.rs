//! Plain-text failure report generation.
//!
//! The report keeps the shape of the runner's own output: a `--- FAIL`
//! header per test followed by the failure body, so it reads naturally in
//! a CI log.

use crate::models::{BodySummary, FailureSummary};

/// Render the report for the given failures, in the order given.
pub fn render_report(failures: &[FailureSummary], show_rate: bool) -> String {
    let mut output = String::new();

    for failure in failures {
        output.push_str(&failure.header(show_rate));
        output.push('\n');
        output.push_str(&render_bodies(&failure.bodies));
    }

    output
}

/// Render the bodies of one test. Sub-headers only appear when a test
/// failed in more than one distinct way.
fn render_bodies(bodies: &[BodySummary]) -> String {
    let mut section = String::new();

    if let [only] = bodies {
        section.push_str(&only.text);
        return section;
    }

    for body in bodies {
        section.push_str(&format!("-- Failed {} times:\n", body.count));
        section.push_str(&body.text);
    }

    section
}
