//! Configuration module - palette limits and timings
//!
//! This module provides functionality for:
//! - Loading settings from ~/.gofaster/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions (PaletteConfig, SearchConfig, etc.)
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_SYSTEM_URL_PREFIXES};

pub use types::{ExecuteConfig, FilterConfig, PaletteConfig, SearchConfig};

pub use loader::{load_config, parse_config};

// Additional exports for tests
#[cfg(test)]
pub use defaults::{
    DEFAULT_CONTEXT_RADIUS, DEFAULT_FILTERED_CAP, DEFAULT_HIGHLIGHT_DURATION_MS,
    DEFAULT_LARGE_TAB_THRESHOLD, DEFAULT_MAX_FAILURES, DEFAULT_MAX_MATCHES_PER_TAB,
    DEFAULT_MAX_TABS, DEFAULT_MIN_QUERY_LEN, DEFAULT_SETTLE_DELAY_MS, DEFAULT_UNFILTERED_CAP,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
