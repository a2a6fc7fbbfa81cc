//! Failure aggregation and ordering.
//!
//! Failures are grouped first by test name and then by the exact text of
//! their body, so distinct failure reasons under one test stay separate.
//! The maps are unordered; every consumer goes through [`Aggregation::sorted_groups`].

use crate::models::{BodySummary, FailureSummary};
use std::collections::HashMap;
use tracing::trace;

/// One distinct failure body seen for a test.
#[derive(Debug, Clone)]
struct BodyGroup {
    index: usize,
    count: usize,
}

/// Everything known about one test's failures in the current session.
#[derive(Debug, Clone)]
struct FailureGroup {
    index: usize,
    total: usize,
    next_body_index: usize,
    bodies: HashMap<String, BodyGroup>,
}

/// Grouped failures and run counts for the packages seen so far.
#[derive(Debug, Default)]
pub struct Aggregation {
    groups: HashMap<String, FailureGroup>,
    times_run: HashMap<String, usize>,
    next_index: usize,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one `=== RUN` for `name`.
    pub fn record_run(&mut self, name: &str) {
        *self.times_run.entry(name.to_string()).or_default() += 1;
    }

    /// Count one finalized failure of `name` with the given body text.
    pub fn record_failure(&mut self, name: &str, body: String) {
        let next_index = &mut self.next_index;
        let group = self.groups.entry(name.to_string()).or_insert_with(|| {
            let index = *next_index;
            *next_index += 1;
            trace!(test = name, index, "new failure group");
            FailureGroup {
                index,
                total: 0,
                next_body_index: 0,
                bodies: HashMap::new(),
            }
        });
        group.total += 1;

        let next_body_index = &mut group.next_body_index;
        let entry = group.bodies.entry(body).or_insert_with(|| {
            let index = *next_body_index;
            *next_body_index += 1;
            BodyGroup { index, count: 0 }
        });
        entry.count += 1;
    }

    /// Whether any failure is pending.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Forget all groups and run counts. The insertion counter keeps going.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.times_run.clear();
    }

    /// Materialize the groups in report order.
    ///
    /// Tests sort by descending failure count, then by first appearance.
    /// Bodies within a test use the same rule with their own indices.
    pub fn sorted_groups(&self) -> Vec<FailureSummary> {
        let mut keyed: Vec<(usize, FailureSummary)> = self
            .groups
            .iter()
            .map(|(name, group)| {
                let ran = self.times_run.get(name).copied().unwrap_or(0);
                let failure_rate = (ran > 0).then(|| 100.0 * group.total as f64 / ran as f64);

                let mut bodies: Vec<(usize, BodySummary)> = group
                    .bodies
                    .iter()
                    .map(|(text, body)| {
                        (
                            body.index,
                            BodySummary {
                                count: body.count,
                                text: strip_name_line(text, name).to_string(),
                            },
                        )
                    })
                    .collect();
                bodies.sort_by(|(ia, a), (ib, b)| b.count.cmp(&a.count).then_with(|| ia.cmp(ib)));

                (
                    group.index,
                    FailureSummary {
                        name: name.clone(),
                        total_failures: group.total,
                        failure_rate,
                        bodies: bodies.into_iter().map(|(_, b)| b).collect(),
                    },
                )
            })
            .collect();

        keyed.sort_by(|(ia, a), (ib, b)| {
            b.total_failures
                .cmp(&a.total_failures)
                .then_with(|| ia.cmp(ib))
        });

        keyed.into_iter().map(|(_, s)| s).collect()
    }
}

/// Drop the first line of `body` when it only repeats the test name.
fn strip_name_line<'a>(body: &'a str, name: &str) -> &'a str {
    match body.split_once('\n') {
        Some((first, rest)) if first == name => rest,
        None if body == name => "",
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str, lines: &[&str]) -> String {
        let mut text = format!("{}\n", name);
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_identical_bodies_share_a_group() {
        let mut agg = Aggregation::new();
        agg.record_failure("TestA", body("TestA", &["err1"]));
        agg.record_failure("TestA", body("TestA", &["err1"]));

        let groups = agg.sorted_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_failures, 2);
        assert_eq!(groups[0].bodies.len(), 1);
        assert_eq!(groups[0].bodies[0].count, 2);
        assert_eq!(groups[0].bodies[0].text, "err1\n");
    }

    #[test]
    fn test_distinct_bodies_are_kept_apart() {
        let mut agg = Aggregation::new();
        agg.record_failure("TestA", body("TestA", &["first"]));
        agg.record_failure("TestA", body("TestA", &["second"]));
        agg.record_failure("TestA", body("TestA", &["second"]));

        let groups = agg.sorted_groups();
        assert_eq!(groups[0].total_failures, 3);
        let texts: Vec<_> = groups[0].bodies.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["second\n", "first\n"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let mut agg = Aggregation::new();
        for name in ["TestC", "TestA", "TestB"] {
            agg.record_failure(name, body(name, &["boom"]));
        }

        let names: Vec<_> = agg.sorted_groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["TestC", "TestA", "TestB"]);
    }

    #[test]
    fn test_higher_count_sorts_first() {
        let mut agg = Aggregation::new();
        agg.record_failure("TestA", body("TestA", &["x"]));
        agg.record_failure("TestB", body("TestB", &["y"]));
        agg.record_failure("TestB", body("TestB", &["y"]));

        let names: Vec<_> = agg.sorted_groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["TestB", "TestA"]);
    }

    #[test]
    fn test_failure_rate() {
        let mut agg = Aggregation::new();
        for _ in 0..4 {
            agg.record_run("TestA");
        }
        agg.record_failure("TestA", body("TestA", &["x"]));
        agg.record_failure("TestB", body("TestB", &["y"]));

        let groups = agg.sorted_groups();
        let a = groups.iter().find(|g| g.name == "TestA").unwrap();
        let b = groups.iter().find(|g| g.name == "TestB").unwrap();
        assert_eq!(a.failure_rate, Some(25.0));
        assert_eq!(b.failure_rate, None);
    }

    #[test]
    fn test_clear_resets_groups_and_runs() {
        let mut agg = Aggregation::new();
        agg.record_run("TestA");
        agg.record_failure("TestA", body("TestA", &["x"]));
        agg.clear();

        assert!(agg.is_empty());
        agg.record_failure("TestA", body("TestA", &["x"]));
        assert_eq!(agg.sorted_groups()[0].failure_rate, None);
    }

    #[test]
    fn test_strip_name_line() {
        assert_eq!(strip_name_line("TestA\nerr\n", "TestA"), "err\n");
        assert_eq!(strip_name_line("TestA\n", "TestA"), "");
        assert_eq!(strip_name_line("other\nerr\n", "TestA"), "other\nerr\n");
    }
}
