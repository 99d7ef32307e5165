// LogLens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use crate::util::constants::{ALERT_MARKER, ALERT_TIME_FORMAT};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Rule
// =============================================================================

/// A substring rule used to flag log lines.
///
/// A line matches iff it contains `pattern` as a contiguous, case-sensitive
/// substring. Rules are validated once at load time and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier shown in match details (e.g. "R1").
    pub id: String,

    /// Substring searched for in each line.
    #[serde(rename = "match")]
    pub pattern: String,

    /// Free-form severity label (e.g. "critical"). Upper-cased for display.
    pub severity: String,
}

impl Rule {
    pub fn new(id: impl Into<String>, pattern: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            severity: severity.into(),
        }
    }

    /// Returns `true` if `line` contains this rule's pattern.
    pub fn matches(&self, line: &str) -> bool {
        line.contains(self.pattern.as_str())
    }
}

// =============================================================================
// Log source
// =============================================================================

/// A named log file. Names are unique within a configuration; `path` is
/// already resolved to an absolute location by the config loader.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogSource {
    pub name: String,
    pub path: PathBuf,
}

impl LogSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

// =============================================================================
// Log summary (output of the match engine)
// =============================================================================

/// Result of classifying one file's lines against the rule set.
///
/// `matched_events == severity_stats.values().sum() == details.len()` for
/// every value built by `core::matcher::summarize`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    /// Label of the analysed file (usually its path).
    pub file_name: String,

    /// Number of input lines, matched or not.
    pub total_lines: usize,

    /// Number of (line, rule) matches.
    pub matched_events: usize,

    /// Match count keyed by the rule's severity as configured.
    /// Ordered so that identical inputs always render identically.
    pub severity_stats: BTreeMap<String, usize>,

    /// One `[SEVERITY] RuleID: line` entry per match, in line order then rule order.
    pub details: Vec<String>,
}

// =============================================================================
// Alerts (output of the tail engine)
// =============================================================================

/// A single new line observed in a tailed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    /// Name of the source the line came from, as configured.
    pub source_name: String,

    /// Wall-clock time of the tick that observed the line, `HH:MM:SS`.
    pub timestamp: String,

    /// The trimmed line text.
    pub line: String,
}

impl AlertRecord {
    pub fn new<Tz: TimeZone>(source_name: &str, now: &DateTime<Tz>, line: &str) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            source_name: source_name.to_string(),
            timestamp: now.format(ALERT_TIME_FORMAT).to_string(),
            line: line.to_string(),
        }
    }

    /// Render as `[HH:MM:SS] 🚨 SOURCE_NAME_UPPER: line`.
    pub fn render(&self) -> String {
        format!(
            "[{}] {ALERT_MARKER} {}: {}",
            self.timestamp,
            self.source_name.to_uppercase(),
            self.line
        )
    }
}

impl std::fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// All alerts collected in one tick, delivered as a single channel message.
///
/// Records are ordered by source name, then by line order within the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertBatch {
    pub records: Vec<AlertRecord>,
}

impl AlertBatch {
    pub fn new(records: Vec<AlertRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The rendered records joined with `\n`: the message a display shows.
    pub fn message(&self) -> String {
        self.records
            .iter()
            .map(AlertRecord::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for AlertBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};

    #[test]
    fn test_rule_match_is_case_sensitive() {
        let rule = Rule::new("R1", "ERROR", "critical");
        assert!(rule.matches("ERROR disk full"));
        assert!(rule.matches("prefix-ERROR-suffix"));
        assert!(!rule.matches("error disk full"));
    }

    #[test]
    fn test_rule_deserialises_match_key() {
        let rule: Rule =
            serde_json::from_str(r#"{"id":"R9","match":"timeout","severity":"warn"}"#).unwrap();
        assert_eq!(rule, Rule::new("R9", "timeout", "warn"));
    }

    #[test]
    fn test_alert_render_uppercases_source_name() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 3).unwrap();
        let record = AlertRecord::new("nginx", &now, "GET /health 500");
        assert_eq!(record.timestamp, "09:07:03");
        assert_eq!(record.render(), "[09:07:03] 🚨 NGINX: GET /health 500");
    }

    #[test]
    fn test_batch_message_is_newline_joined() {
        let now = Local.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap();
        let batch = AlertBatch::new(vec![
            AlertRecord::new("api", &now, "one"),
            AlertRecord::new("db", &now, "two"),
        ]);
        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.message(),
            "[23:59:59] 🚨 API: one\n[23:59:59] 🚨 DB: two"
        );
        assert_eq!(batch.to_string(), batch.message());
    }
}
