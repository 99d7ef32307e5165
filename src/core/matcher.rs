// LogLens - core/matcher.rs
//
// Rule-based match engine. Classifies a file's complete line sequence
// against the active rule set and builds a `LogSummary`.
//
// Pure and deterministic: no I/O, no shared state. Reading the file and the
// rules is the caller's job (see app::summary).

use crate::core::model::{LogSummary, Rule};

/// Classify `lines` against `rules` and build a summary labelled `file_label`.
///
/// Every (line, rule) pair where the line contains the rule's pattern counts
/// as one matched event. Details follow line order first, then rule order
/// for several rules hitting the same line. An empty line list or an empty
/// rule set yields a summary with zero matches.
pub fn summarize<S: AsRef<str>>(lines: &[S], rules: &[Rule], file_label: &str) -> LogSummary {
    let mut summary = LogSummary {
        file_name: file_label.to_string(),
        total_lines: lines.len(),
        ..Default::default()
    };

    for line in lines {
        let line = line.as_ref();
        for rule in rules {
            if !rule.matches(line) {
                continue;
            }
            summary.matched_events += 1;
            *summary
                .severity_stats
                .entry(rule.severity.clone())
                .or_insert(0) += 1;
            summary.details.push(format_detail(rule, line));
        }
    }

    tracing::debug!(
        file = file_label,
        total_lines = summary.total_lines,
        matched = summary.matched_events,
        "Summary built"
    );

    summary
}

/// `[SEVERITY] RuleID: original line text`
fn format_detail(rule: &Rule, line: &str) -> String {
    format!("[{}] {}: {}", rule.severity.to_uppercase(), rule.id, line)
}
