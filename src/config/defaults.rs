//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default debug flag (verbose logging)
pub const DEFAULT_DEBUG: bool = false;

/// Content search limits
pub const DEFAULT_MAX_TABS: usize = 20;
pub const DEFAULT_MAX_FAILURES: usize = 5;
pub const DEFAULT_MAX_MATCHES_PER_TAB: usize = 3;
pub const DEFAULT_CONTEXT_RADIUS: usize = 40;
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Tab-mode result caps, only enforced above the threshold
pub const DEFAULT_LARGE_TAB_THRESHOLD: usize = 50;
pub const DEFAULT_UNFILTERED_CAP: usize = 10;
pub const DEFAULT_FILTERED_CAP: usize = 20;

/// Delay after switching tabs before asking the new tab to highlight (ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
/// How long in-page highlights stay visible (ms)
pub const DEFAULT_HIGHLIGHT_DURATION_MS: u64 = 10_000;

/// URL prefixes of pages that refuse script injection.
/// Matched case-insensitively against the start of the tab URL.
pub const DEFAULT_SYSTEM_URL_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "moz-extension://",
    "edge://",
    "about:",
    "devtools://",
    "view-source:",
    "chrome-search://",
];

/// Default location of the optional settings file
pub const DEFAULT_CONFIG_PATH: &str = "~/.gofaster/config.json";
