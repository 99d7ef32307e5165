// LogLens - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config discovery and loading
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to list / summary / export / tail

use clap::{Parser, Subcommand};
use loglens::app::summary;
use loglens::app::tail::{TailConfig, TailManager};
use loglens::core::model::{LogSource, LogSummary, Rule};
use loglens::platform::config::{self, AppConfig, ConfigLocator};
use loglens::util::constants;
use loglens::util::error::{ConfigError, LogLensError, Result};
use loglens::util::logging;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// LogLens - rule-based log analysis and live multi-file tail.
#[derive(Parser, Debug)]
#[command(name = "loglens", version, about)]
struct Cli {
    /// Directory containing rules.json, paths.json and config.toml.
    #[arg(short = 'c', long = "config-dir", global = true)]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured log sources.
    List,

    /// Classify every line of one source against the rule set.
    Summary {
        /// Source name as configured in paths.json.
        name: String,

        /// Print the summary as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Write a JSON report for one source.
    Export {
        /// Source name as configured in paths.json.
        name: String,

        /// Report directory.
        #[arg(short = 'o', long = "output", default_value = constants::DEFAULT_REPORT_DIR)]
        output: PathBuf,
    },

    /// Watch every source and print alerts for newly appended lines.
    Tail {
        /// Stop after this many seconds (runs until interrupted if omitted).
        #[arg(long)]
        duration: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    let locator = ConfigLocator::from_env(cli.config_dir.clone());
    let (app_config, config_warnings) =
        config::load_config(locator.locate_optional(constants::CONFIG_FILE_NAME).as_deref());

    logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config validation warning");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogLens starting"
    );

    if let Err(e) = run(cli.command, &locator, &app_config) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, locator: &ConfigLocator, app_config: &AppConfig) -> Result<()> {
    match command {
        Command::List => {
            for source in load_sources(locator)? {
                println!("{}\t{}", source.name, source.path.display());
            }
            Ok(())
        }
        Command::Summary { name, json } => {
            let report = analyse(locator, &name)?;
            if json {
                let stdout = std::io::stdout();
                loglens::core::export::export_json(
                    &report,
                    stdout.lock(),
                    &PathBuf::from("<stdout>"),
                )?;
            } else {
                print!("{}", render_summary(&report));
            }
            Ok(())
        }
        Command::Export { name, output } => {
            let report = analyse(locator, &name)?;
            let path = summary::export_summary(&report, &name, &output, &chrono::Local::now())?;
            println!("Report written: {}", path.display());
            Ok(())
        }
        Command::Tail { duration } => {
            let sources = load_sources(locator)?;
            tail(sources, TailConfig::from(app_config), duration.map(Duration::from_secs))
        }
    }
}

fn load_sources(locator: &ConfigLocator) -> Result<Vec<LogSource>> {
    let path = locator.locate(constants::PATHS_FILE_NAME)?;
    Ok(config::load_sources(&path)?)
}

fn load_rules(locator: &ConfigLocator) -> Result<Vec<Rule>> {
    let path = locator.locate(constants::RULES_FILE_NAME)?;
    Ok(config::load_rules(&path)?)
}

fn analyse(locator: &ConfigLocator, name: &str) -> Result<LogSummary> {
    let sources = load_sources(locator)?;
    let rules = load_rules(locator)?;
    let source = summary::find_source(&sources, name).ok_or_else(|| {
        LogLensError::from(ConfigError::UnknownSource {
            name: name.to_string(),
        })
    })?;
    summary::summarize_source(source, &rules)
}

fn render_summary(summary: &LogSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Analysis Summary: {}\n\n", summary.file_name));
    out.push_str(&format!("  Total lines:     {}\n", summary.total_lines));
    out.push_str(&format!("  Total detection: {}\n\n", summary.matched_events));

    out.push_str("Severity stats\n");
    if summary.severity_stats.is_empty() {
        out.push_str("  No incident detected.\n");
    } else {
        for (severity, count) in &summary.severity_stats {
            out.push_str(&format!("  {}: {count}\n", severity.to_uppercase()));
        }
    }

    out.push_str("\nDetails\n");
    for detail in &summary.details {
        out.push_str(&format!("  - {detail}\n"));
    }
    out
}

fn tail(sources: Vec<LogSource>, config: TailConfig, duration: Option<Duration>) -> Result<()> {
    let mut manager = TailManager::new();
    manager.start_tail(sources, config)?;
    println!("Live monitoring started, waiting for new log lines...");

    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if let Some(batch) = manager.recv_timeout(Duration::from_millis(250)) {
            println!("{batch}");
        } else if !manager.is_active() {
            break;
        }
    }

    manager.stop_tail();
    Ok(())
}
