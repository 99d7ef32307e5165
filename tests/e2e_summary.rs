// LogLens - tests/e2e_summary.rs
//
// End-to-end tests for the analysis path: a real config directory with
// rules.json and paths.json, real log files, config discovery, the match
// engine, and JSON report export.

use loglens::app::summary::{export_summary, find_source, summarize_source};
use loglens::platform::config::{load_rules, load_sources, ConfigLocator};
use loglens::util::constants::{PATHS_FILE_NAME, RULES_FILE_NAME};
use loglens::util::error::ConfigError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RULES: &str = r#"{
  "rules": [
    { "id": "R1", "match": "ERROR", "severity": "critical" },
    { "id": "R2", "match": "timeout", "severity": "warning" }
  ]
}"#;

/// Lay out `<root>/config/{rules,paths}.json` and `<root>/logs/*.log`.
fn write_fixture(root: &Path) {
    let config = root.join("config");
    let logs = root.join("logs");
    fs::create_dir_all(&config).unwrap();
    fs::create_dir_all(&logs).unwrap();

    fs::write(config.join(RULES_FILE_NAME), RULES).unwrap();
    fs::write(
        config.join(PATHS_FILE_NAME),
        r#"{ "logs": { "system": "../logs/system.log", "web": "../logs/web.log" } }"#,
    )
    .unwrap();

    fs::write(
        logs.join("system.log"),
        "INFO ok\nERROR disk full\nERROR cpu hot\n",
    )
    .unwrap();
    fs::write(
        logs.join("web.log"),
        "GET / 200\nERROR upstream timeout\n\nGET /a 200\n",
    )
    .unwrap();
}

#[test]
fn e2e_summary_from_config_directory() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let locator = ConfigLocator::in_dir(dir.path().join("config"));

    let rules = load_rules(&locator.locate(RULES_FILE_NAME).unwrap()).unwrap();
    let sources = load_sources(&locator.locate(PATHS_FILE_NAME).unwrap()).unwrap();
    assert_eq!(sources.len(), 2);

    let system = find_source(&sources, "system").unwrap();
    let summary = summarize_source(system, &rules).unwrap();
    assert_eq!(summary.total_lines, 3);
    assert_eq!(summary.matched_events, 2);
    assert_eq!(summary.severity_stats.get("critical"), Some(&2));
    assert_eq!(
        summary.details,
        vec!["[CRITICAL] R1: ERROR disk full", "[CRITICAL] R1: ERROR cpu hot"]
    );
}

#[test]
fn e2e_summary_counts_blank_lines_and_multi_rule_hits() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let locator = ConfigLocator::in_dir(dir.path().join("config"));
    let rules = load_rules(&locator.locate(RULES_FILE_NAME).unwrap()).unwrap();
    let sources = load_sources(&locator.locate(PATHS_FILE_NAME).unwrap()).unwrap();

    let web = find_source(&sources, "web").unwrap();
    let summary = summarize_source(web, &rules).unwrap();

    assert_eq!(summary.total_lines, 4);
    assert_eq!(summary.matched_events, 2);
    assert_eq!(
        summary.details,
        vec![
            "[CRITICAL] R1: ERROR upstream timeout",
            "[WARNING] R2: ERROR upstream timeout",
        ]
    );
    let stat_total: usize = summary.severity_stats.values().sum();
    assert_eq!(stat_total, summary.details.len());
}

#[test]
fn e2e_export_writes_json_report() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let locator = ConfigLocator::in_dir(dir.path().join("config"));
    let rules = load_rules(&locator.locate(RULES_FILE_NAME).unwrap()).unwrap();
    let sources = load_sources(&locator.locate(PATHS_FILE_NAME).unwrap()).unwrap();
    let summary = summarize_source(find_source(&sources, "system").unwrap(), &rules).unwrap();

    let report_dir = dir.path().join("reports");
    let path = export_summary(&summary, "system", &report_dir, &chrono::Local::now()).unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("report_system_"), "{name}");
    assert!(name.ends_with(".json"), "{name}");

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["matched_events"], 2);
    assert_eq!(value["details"].as_array().unwrap().len(), 2);
}

#[test]
fn e2e_malformed_rules_fail_the_load() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let rules_path = dir.path().join("config").join(RULES_FILE_NAME);
    fs::write(&rules_path, r#"{"rules":[{"id":"R1","match":"","severity":"x"}]}"#).unwrap();

    assert!(matches!(
        load_rules(&rules_path),
        Err(ConfigError::InvalidRule { field: "match", .. })
    ));
}

#[test]
fn e2e_missing_config_directory_is_not_found() {
    let dir = TempDir::new().unwrap();
    let locator = ConfigLocator::in_dir(dir.path().join("does-not-exist"));
    assert!(matches!(
        locator.locate(PATHS_FILE_NAME),
        Err(ConfigError::NotFound { .. })
    ));
}
