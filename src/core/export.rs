// LogLens - core/export.rs
//
// JSON export of a log summary.
// Core layer: writes to any Write trait object; choosing the destination
// file is the caller's job.

use crate::core::model::LogSummary;
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Write `summary` as pretty-printed JSON to `writer`.
///
/// `export_path` is only used for error context.
/// Returns the number of detail entries written.
pub fn export_json<W: Write>(
    summary: &LogSummary,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, summary).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;
    Ok(summary.details.len())
}

/// Build a file-system-safe report name for `source_name` at `stamp`.
///
/// Path separators and drive colons are replaced so the name never escapes
/// the report directory.
pub fn report_file_name(source_name: &str, stamp: &str) -> String {
    let clean: String = source_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("report_{clean}_{stamp}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matcher::summarize;
    use crate::core::model::Rule;
    use std::path::PathBuf;

    #[test]
    fn test_json_export() {
        let rules = vec![Rule::new("R1", "ERROR", "critical")];
        let summary = summarize(&["ERROR one", "fine", "ERROR two"], &rules, "app.log");

        let mut buf = Vec::new();
        let count = export_json(&summary, &mut buf, &PathBuf::from("out.json")).unwrap();
        assert_eq!(count, 2);

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["file_name"], "app.log");
        assert_eq!(value["total_lines"], 3);
        assert_eq!(value["matched_events"], 2);
        assert_eq!(value["severity_stats"]["critical"], 2);
        assert_eq!(value["details"][1], "[CRITICAL] R1: ERROR two");
    }

    #[test]
    fn test_report_file_name_strips_separators() {
        assert_eq!(
            report_file_name("var/log app", "20240101_000000"),
            "report_var_log_app_20240101_000000.json"
        );
        assert_eq!(
            report_file_name("C:\\logs", "x"),
            "report_C__logs_x.json"
        );
    }
}
