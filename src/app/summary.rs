// LogLens - app/summary.rs
//
// On-demand analysis of a single log source: read the whole file, run the
// match engine, and optionally write the result as a JSON report.

use crate::core::export;
use crate::core::matcher;
use crate::core::model::{LogSource, LogSummary, Rule};
use crate::platform::fs;
use crate::util::constants::REPORT_TIMESTAMP_FORMAT;
use crate::util::error::{ExportError, LogLensError, Result};
use chrono::{DateTime, Local};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Look up a configured source by name.
pub fn find_source<'a>(sources: &'a [LogSource], name: &str) -> Option<&'a LogSource> {
    sources.iter().find(|s| s.name == name)
}

/// Read `source` in full and classify its lines against `rules`.
///
/// The summary is labelled with the source's resolved path.
pub fn summarize_source(source: &LogSource, rules: &[Rule]) -> Result<LogSummary> {
    let lines = fs::read_lines_lossy(&source.path).map_err(|e| LogLensError::Io {
        path: source.path.clone(),
        operation: "read log file",
        source: e,
    })?;

    tracing::info!(
        source = %source.name,
        file = %source.path.display(),
        lines = lines.len(),
        rules = rules.len(),
        "Analysing log source"
    );

    Ok(matcher::summarize(
        &lines,
        rules,
        &source.path.display().to_string(),
    ))
}

/// Write `summary` as JSON into `report_dir`, creating the directory if
/// needed. Returns the path of the written report.
pub fn export_summary(
    summary: &LogSummary,
    source_name: &str,
    report_dir: &Path,
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(report_dir).map_err(|e| ExportError::Io {
        path: report_dir.to_path_buf(),
        source: e,
    })?;

    let stamp = now.format(REPORT_TIMESTAMP_FORMAT).to_string();
    let path = report_dir.join(export::report_file_name(source_name, &stamp));

    let file = std::fs::File::create(&path).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;
    let details = export::export_json(summary, BufWriter::new(file), &path)?;

    tracing::info!(path = %path.display(), details, "Report exported");
    Ok(path)
}
