// LogLens - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogLens";

/// Application identifier used for platform config directories.
pub const APP_ID: &str = "LogLens";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Live tail limits
// =============================================================================

/// How often the tail watcher polls every configured source (ms).
pub const TAIL_POLL_INTERVAL_MS: u64 = 500;

/// How often the cancel flag is checked within each poll sleep interval (ms).
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Minimum user-configurable tail poll interval (ms).
pub const MIN_TAIL_POLL_INTERVAL_MS: u64 = 50;

/// Maximum user-configurable tail poll interval (ms).
pub const MAX_TAIL_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// Maximum bytes read from a single file in one poll tick.
/// Anything past this is picked up on a later tick.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Smallest accepted `[tail] max_read_bytes`.
pub const MIN_TAIL_READ_BYTES: usize = 1_024;

/// Largest accepted `[tail] max_read_bytes`.
pub const ABSOLUTE_MAX_TAIL_READ_BYTES: usize = 16 * 1_024 * 1_024; // 16 MiB

/// Maximum alert lines emitted for a single source in one tick.
pub const MAX_ALERTS_PER_SOURCE_PER_TICK: usize = 5;

/// Hard upper bound on `[tail] max_lines_per_source`.
pub const ABSOLUTE_MAX_ALERTS_PER_SOURCE: usize = 1_000;

/// Capacity of the bounded alert channel between the tail thread and the
/// consumer. When full, new batches are dropped.
pub const DEFAULT_TAIL_CHANNEL_CAPACITY: usize = 8;

/// Hard upper bound on `[tail] channel_capacity`.
pub const MAX_TAIL_CHANNEL_CAPACITY: usize = 1_024;

/// Timestamp format of an alert record.
pub const ALERT_TIME_FORMAT: &str = "%H:%M:%S";

/// Marker placed between the timestamp and source name in a rendered alert.
pub const ALERT_MARKER: &str = "🚨";

// =============================================================================
// Configuration
// =============================================================================

/// Directory name searched for configuration files.
pub const CONFIG_DIR_NAME: &str = "config";

/// Rule list file name.
pub const RULES_FILE_NAME: &str = "rules.json";

/// Source map file name.
pub const PATHS_FILE_NAME: &str = "paths.json";

/// Optional application settings file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Maximum size of any configuration file in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024; // 1 MiB

// =============================================================================
// Export
// =============================================================================

/// Default directory for exported reports, relative to the working directory.
pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Timestamp format embedded in generated report file names.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;
