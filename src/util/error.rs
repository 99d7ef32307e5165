// LogLens - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every variant keeps the path and the underlying cause so the CLI can print
// an actionable message and the logs keep the full chain.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogLens operations.
#[derive(Debug)]
pub enum LogLensError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Live tail could not be started.
    Tail(TailError),

    /// Report export failed.
    Export(ExportError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Tail(e) => write!(f, "Tail error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogLensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Tail(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to loading `rules.json`, `paths.json` and `config.toml`.
#[derive(Debug)]
pub enum ConfigError {
    /// No candidate location contained the requested file.
    NotFound {
        file: &'static str,
        searched: Vec<PathBuf>,
    },

    /// Config file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// JSON parsing failed.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A rule is missing a required field.
    InvalidRule {
        index: usize,
        field: &'static str,
    },

    /// Two rules share the same id.
    DuplicateRuleId { id: String },

    /// A log source has an empty name or path.
    InvalidSource { name: String, reason: &'static str },

    /// `paths.json` defines no log sources.
    NoSources { path: PathBuf },

    /// A source name was requested that `paths.json` does not define.
    UnknownSource { name: String },

    /// I/O error reading a config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { file, searched } => {
                let list: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                write!(f, "'{file}' not found (searched: {})", list.join(", "))
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Config file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::JsonParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::InvalidRule { index, field } => {
                write!(f, "Rule #{index}: '{field}' must be a non-empty string")
            }
            Self::DuplicateRuleId { id } => write!(f, "Duplicate rule id '{id}'"),
            Self::InvalidSource { name, reason } => {
                write!(f, "Log source '{name}': {reason}")
            }
            Self::NoSources { path } => write!(
                f,
                "'{}' defines no log sources under \"logs\"",
                path.display()
            ),
            Self::UnknownSource { name } => {
                write!(f, "Log source '{name}' is not defined in paths.json")
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogLensError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Tail errors
// ---------------------------------------------------------------------------

/// Errors that prevent a live tail from starting.
///
/// Per-source stat/read failures while tailing are never errors; they are
/// skipped and retried on the next tick.
#[derive(Debug)]
pub enum TailError {
    /// No log sources were supplied.
    NoSources,

    /// The background thread could not be spawned.
    Spawn { source: io::Error },
}

impl fmt::Display for TailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSources => write!(f, "No log sources to tail"),
            Self::Spawn { source } => write!(f, "Failed to spawn tail thread: {source}"),
        }
    }
}

impl std::error::Error for TailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source } => Some(source),
            Self::NoSources => None,
        }
    }
}

impl From<TailError> for LogLensError {
    fn from(e: TailError) -> Self {
        Self::Tail(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to report export.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogLensError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for LogLens results.
pub type Result<T> = std::result::Result<T, LogLensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display_names_path() {
        let err = ConfigError::NoSources {
            path: PathBuf::from("/etc/loglens/paths.json"),
        };
        assert!(err.to_string().contains("/etc/loglens/paths.json"));
    }

    #[test]
    fn test_top_level_error_preserves_source_chain() {
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: LogLensError = ConfigError::Io {
            path: PathBuf::from("rules.json"),
            source: io,
        }
        .into();
        let inner = err.source().expect("config error as source");
        assert!(inner.source().is_some(), "io error must stay in the chain");
    }
}
