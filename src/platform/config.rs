// LogLens - platform/config.rs
//
// Configuration directory resolution and loading of the three config files:
//
//   rules.json   -- {"rules": [{"id", "match", "severity"}, ...]}   (required)
//   paths.json   -- {"logs": {"name": "path", ...}}                  (required)
//   config.toml  -- [tail] / [logging] tuning                        (optional)
//
// rules.json and paths.json are validated once here and turned into
// immutable `Rule` / `LogSource` values; any malformed entry fails the whole
// load. config.toml follows the softer policy: out-of-range values produce
// warnings and fall back to defaults so the tool still starts.

use crate::core::model::{LogSource, Rule};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

// =============================================================================
// Config directory resolution
// =============================================================================

/// Ordered list of directories searched for configuration files.
///
/// Search order: explicit override (exclusive) > `<cwd>/config` >
/// `<exe_dir>/../config` > platform config dir.
#[derive(Debug, Clone, Default)]
pub struct ConfigLocator {
    /// `--config-dir` from the CLI. When set, no other location is searched.
    pub override_dir: Option<PathBuf>,
    /// Directories searched in order when no override is given.
    pub search_dirs: Vec<PathBuf>,
}

impl ConfigLocator {
    /// Build the locator from the process environment.
    pub fn from_env(override_dir: Option<PathBuf>) -> Self {
        let mut search_dirs = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            search_dirs.push(cwd.join(constants::CONFIG_DIR_NAME));
        }
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            search_dirs.push(exe_dir.join("..").join(constants::CONFIG_DIR_NAME));
        }
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            search_dirs.push(proj_dirs.config_dir().to_path_buf());
        } else {
            tracing::warn!("Could not determine platform config directory");
        }

        tracing::debug!(
            override_dir = ?override_dir,
            search_dirs = ?search_dirs,
            "Config search path resolved"
        );

        Self {
            override_dir,
            search_dirs,
        }
    }

    /// A locator that only looks in `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
            search_dirs: Vec::new(),
        }
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match &self.override_dir {
            Some(dir) => vec![dir.clone()],
            None => self.search_dirs.clone(),
        }
    }

    /// Find the first candidate directory containing `file`.
    pub fn locate(&self, file: &'static str) -> Result<PathBuf, ConfigError> {
        let searched: Vec<PathBuf> = self.candidates().into_iter().map(|d| d.join(file)).collect();
        match searched.iter().find(|p| p.is_file()) {
            Some(found) => {
                tracing::debug!(file, path = %found.display(), "Config file located");
                Ok(found.clone())
            }
            None => Err(ConfigError::NotFound { file, searched }),
        }
    }

    /// Like `locate`, but a missing file is not an error.
    pub fn locate_optional(&self, file: &'static str) -> Option<PathBuf> {
        self.locate(file).ok()
    }
}

// =============================================================================
// rules.json / paths.json
// =============================================================================

#[derive(Debug, serde::Deserialize)]
struct RawRules {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, serde::Deserialize)]
struct RawRule {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "match", default)]
    pattern: Option<String>,
    #[serde(default)]
    severity: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RawPaths {
    #[serde(default)]
    logs: Option<BTreeMap<String, String>>,
}

fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    let meta = std::fs::metadata(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if meta.len() > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn required(value: Option<String>, index: usize, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::InvalidRule { index, field }),
    }
}

/// Parse and validate a rule list. Rule order is preserved: it is the
/// secondary ordering of match details.
pub fn parse_rules(content: &str, path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let raw: RawRules = serde_json::from_str(content).map_err(|e| ConfigError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(raw.rules.len());
    for (index, r) in raw.rules.into_iter().enumerate() {
        let rule = Rule {
            id: required(r.id, index, "id")?,
            pattern: required(r.pattern, index, "match")?,
            severity: required(r.severity, index, "severity")?,
        };
        if !seen.insert(rule.id.clone()) {
            return Err(ConfigError::DuplicateRuleId { id: rule.id });
        }
        rules.push(rule);
    }
    Ok(rules)
}

/// Load and validate `rules.json` at `path`.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let content = read_config_file(path)?;
    let rules = parse_rules(&content, path)?;
    tracing::info!(path = %path.display(), rules = rules.len(), "Rules loaded");
    Ok(rules)
}

/// Parse and validate a source map. Relative paths are resolved against
/// `base_dir`. The result is sorted by name, which is the tail iteration
/// order.
pub fn parse_sources(
    content: &str,
    path: &Path,
    base_dir: &Path,
) -> Result<Vec<LogSource>, ConfigError> {
    let raw: RawPaths = serde_json::from_str(content).map_err(|e| ConfigError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let logs = match raw.logs {
        Some(logs) if !logs.is_empty() => logs,
        _ => {
            return Err(ConfigError::NoSources {
                path: path.to_path_buf(),
            })
        }
    };

    // BTreeMap iteration is already sorted by name.
    logs.into_iter()
        .map(|(name, raw_path)| {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidSource {
                    name,
                    reason: "name must be non-empty",
                });
            }
            if raw_path.trim().is_empty() {
                return Err(ConfigError::InvalidSource {
                    name,
                    reason: "path must be non-empty",
                });
            }
            let p = Path::new(&raw_path);
            let resolved = if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            };
            Ok(LogSource::new(name, resolved))
        })
        .collect()
}

/// Load and validate `paths.json` at `path`, resolving relative entries
/// against the directory containing it.
pub fn load_sources(path: &Path) -> Result<Vec<LogSource>, ConfigError> {
    let content = read_config_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let sources = parse_sources(&content, path, base_dir)?;
    tracing::info!(path = %path.display(), sources = sources.len(), "Log sources loaded");
    Ok(sources)
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    pub poll_interval_ms: Option<u64>,
    pub max_read_bytes: Option<usize>,
    pub max_lines_per_source: Option<usize>,
    pub channel_capacity: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application settings derived from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Tail tick interval (ms).
    pub tail_poll_interval_ms: u64,
    /// Per-source per-tick read cap (bytes).
    pub tail_max_read_bytes: usize,
    /// Per-source per-tick alert line cap.
    pub tail_max_lines_per_source: usize,
    /// Bounded alert channel capacity.
    pub tail_channel_capacity: usize,
    /// Log level from config (None = not set, use default).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tail_poll_interval_ms: constants::TAIL_POLL_INTERVAL_MS,
            tail_max_read_bytes: constants::MAX_TAIL_READ_BYTES_PER_TICK,
            tail_max_lines_per_source: constants::MAX_ALERTS_PER_SOURCE_PER_TICK,
            tail_channel_capacity: constants::DEFAULT_TAIL_CHANNEL_CAPACITY,
            log_level: None,
        }
    }
}

/// Validate parsed config.toml content against named constants.
///
/// Returns the config and one warning per rejected value.
pub fn validate_config(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(ms) = raw.tail.poll_interval_ms {
        if (constants::MIN_TAIL_POLL_INTERVAL_MS..=constants::MAX_TAIL_POLL_INTERVAL_MS).contains(&ms) {
            config.tail_poll_interval_ms = ms;
        } else {
            warnings.push(format!(
                "[tail] poll_interval_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_TAIL_POLL_INTERVAL_MS,
                constants::MAX_TAIL_POLL_INTERVAL_MS,
                constants::TAIL_POLL_INTERVAL_MS,
            ));
        }
    }

    if let Some(bytes) = raw.tail.max_read_bytes {
        if (constants::MIN_TAIL_READ_BYTES..=constants::ABSOLUTE_MAX_TAIL_READ_BYTES).contains(&bytes) {
            config.tail_max_read_bytes = bytes;
        } else {
            warnings.push(format!(
                "[tail] max_read_bytes = {bytes} is out of range ({}-{}). Using default ({}).",
                constants::MIN_TAIL_READ_BYTES,
                constants::ABSOLUTE_MAX_TAIL_READ_BYTES,
                constants::MAX_TAIL_READ_BYTES_PER_TICK,
            ));
        }
    }

    if let Some(lines) = raw.tail.max_lines_per_source {
        if (1..=constants::ABSOLUTE_MAX_ALERTS_PER_SOURCE).contains(&lines) {
            config.tail_max_lines_per_source = lines;
        } else {
            warnings.push(format!(
                "[tail] max_lines_per_source = {lines} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_ALERTS_PER_SOURCE,
                constants::MAX_ALERTS_PER_SOURCE_PER_TICK,
            ));
        }
    }

    if let Some(cap) = raw.tail.channel_capacity {
        if (1..=constants::MAX_TAIL_CHANNEL_CAPACITY).contains(&cap) {
            config.tail_channel_capacity = cap;
        } else {
            warnings.push(format!(
                "[tail] channel_capacity = {cap} is out of range (1-{}). Using default ({}).",
                constants::MAX_TAIL_CHANNEL_CAPACITY,
                constants::DEFAULT_TAIL_CHANNEL_CAPACITY,
            ));
        }
    }

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

/// Load and validate `config.toml`.
///
/// `None` (file not present) returns defaults with no warnings. An unreadable
/// or unparseable file returns defaults with a warning.
pub fn load_config(path: Option<&Path>) -> (AppConfig, Vec<String>) {
    let Some(path) = path else {
        return (AppConfig::default(), Vec::new());
    };

    let content = match read_config_file(path) {
        Ok(c) => c,
        Err(e) => {
            return (
                AppConfig::default(),
                vec![format!("{e}. Using defaults.")],
            )
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            };
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    validate_config(raw)
}
