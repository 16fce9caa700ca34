//! Structured logging: optional JSONL file output plus human-readable stderr.
//!
//! The palette core only emits `tracing` events; whoever embeds it decides
//! where they go by calling [`init`] once.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gofaster::logging::{self, LogSettings};
//!
//! // Keep the guard alive for the duration of the program
//! let _guard = logging::init(&LogSettings { debug: true, json_log_path: None });
//!
//! tracing::info!(event_type = "palette_event", action = "open", "Palette opened");
//! ```
//!
//! # JSONL Output Format
//!
//! Each line is a valid JSON object:
//! ```json
//! {"timestamp":"2025-01-05T10:30:45.123Z","level":"INFO","target":"gofaster::palette","fields":{"event_type":"palette_event","action":"open","message":"Palette opened"}}
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Where logs go and how verbose they are
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Injected debug flag; raises the default level from `warn` to `debug`
    pub debug: bool,
    /// JSONL file to append to; `None` logs to stderr only
    pub json_log_path: Option<PathBuf>,
}

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

fn default_directives(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Initialize logging.
///
/// `RUST_LOG` overrides the level chosen from `settings.debug`. Installing a
/// second global subscriber is not an error: the first one stays active.
pub fn init(settings: &LogSettings) -> LoggingGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(settings.debug)));

    let (json_writer, file_guard) = match settings.json_log_path.as_ref().and_then(open_log_file)
    {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    // JSONL layer for file output
    let json_layer = json_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE)
    });

    // Pretty layer for stderr
    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            event_type = "app_lifecycle",
            action = "started",
            debug = settings.debug,
            json_log = ?settings.json_log_path,
            "Palette logging initialized"
        );
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn open_log_file(path: &PathBuf) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("[LOGGING] Failed to create log directory: {}", e);
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            None
        }
    }
}

/// Default JSONL log location (~/.gofaster/logs/gofaster.jsonl)
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".gofaster").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("gofaster-logs"))
        .join("gofaster.jsonl")
}

// =============================================================================
// STRUCTURED LOGGING HELPERS
// =============================================================================

/// Log a palette lifecycle or user action
pub fn log_palette_event(action: &str, mode: &str, details: Option<&str>) {
    match details {
        Some(details) => tracing::info!(
            event_type = "palette_event",
            action = action,
            mode = mode,
            details = details,
            "Palette {} ({})",
            action,
            mode
        ),
        None => tracing::info!(
            event_type = "palette_event",
            action = action,
            mode = mode,
            "Palette {} ({})",
            action,
            mode
        ),
    }
}

/// Log the outcome of scanning one tab
pub fn log_scan_event(tab_id: i64, total_matches: usize, success: bool) {
    if success {
        tracing::debug!(
            event_type = "scan_event",
            tab_id = tab_id,
            total_matches = total_matches,
            success = true,
            "Scanned tab {}",
            tab_id
        );
    } else {
        tracing::warn!(
            event_type = "scan_event",
            tab_id = tab_id,
            success = false,
            "Scan failed for tab {}",
            tab_id
        );
    }
}

/// Log an error with structured fields
pub fn log_error(category: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        event_type = "error",
        category = category,
        error_message = error,
        context = context,
        "Error in {}: {}",
        category,
        error
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_follow_debug_flag() {
        assert_eq!(default_directives(true), "debug");
        assert_eq!(default_directives(false), "warn");
    }

    #[test]
    fn test_default_log_path_is_jsonl() {
        let path = default_log_path();
        assert_eq!(
            path.extension().and_then(|e| e.to_str()),
            Some("jsonl")
        );
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            debug: true,
            json_log_path: Some(dir.path().join("nested").join("test.jsonl")),
        };
        let _first = init(&settings);
        let _second = init(&LogSettings::default());
        log_palette_event("open", "tabs", None);
        log_scan_event(1, 2, true);
        log_error("test", "boom", Some("ctx"));
        assert!(dir.path().join("nested").exists());
    }
}
