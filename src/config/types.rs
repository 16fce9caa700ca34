//! Configuration type definitions
//!
//! Every field has a serde default so a partial settings object (or `{}`)
//! deserializes to a complete config.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

// ============================================
// SEARCH CONFIG
// ============================================

/// Limits for multi-tab content search and the per-tab scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Tabs scanned per search, current tab included (default: 20)
    #[serde(default = "default_max_tabs")]
    pub max_tabs: usize,
    /// Search aborts once failures exceed this (default: 5)
    #[serde(default = "default_max_failures")]
    pub max_failures: usize,
    /// Matches materialized per tab; the total count is never capped (default: 3)
    #[serde(default = "default_max_matches_per_tab")]
    pub max_matches_per_tab: usize,
    /// Characters of context either side of a match (default: 40)
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,
    /// Shorter trimmed queries never search (default: 2)
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

fn default_max_tabs() -> usize {
    DEFAULT_MAX_TABS
}
fn default_max_failures() -> usize {
    DEFAULT_MAX_FAILURES
}
fn default_max_matches_per_tab() -> usize {
    DEFAULT_MAX_MATCHES_PER_TAB
}
fn default_context_radius() -> usize {
    DEFAULT_CONTEXT_RADIUS
}
fn default_min_query_len() -> usize {
    DEFAULT_MIN_QUERY_LEN
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_tabs: DEFAULT_MAX_TABS,
            max_failures: DEFAULT_MAX_FAILURES,
            max_matches_per_tab: DEFAULT_MAX_MATCHES_PER_TAB,
            context_radius: DEFAULT_CONTEXT_RADIUS,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }
}

// ============================================
// FILTER CONFIG
// ============================================

/// Result caps for tab mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Caps apply only when more candidates than this remain (default: 50)
    #[serde(default = "default_large_tab_threshold")]
    pub large_tab_threshold: usize,
    /// Cap with an empty query (default: 10)
    #[serde(default = "default_unfiltered_cap")]
    pub unfiltered_cap: usize,
    /// Cap with a non-empty query (default: 20)
    #[serde(default = "default_filtered_cap")]
    pub filtered_cap: usize,
}

fn default_large_tab_threshold() -> usize {
    DEFAULT_LARGE_TAB_THRESHOLD
}
fn default_unfiltered_cap() -> usize {
    DEFAULT_UNFILTERED_CAP
}
fn default_filtered_cap() -> usize {
    DEFAULT_FILTERED_CAP
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            large_tab_threshold: DEFAULT_LARGE_TAB_THRESHOLD,
            unfiltered_cap: DEFAULT_UNFILTERED_CAP,
            filtered_cap: DEFAULT_FILTERED_CAP,
        }
    }
}

// ============================================
// EXECUTE CONFIG
// ============================================

/// Timing for acting on a content result in another tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteConfig {
    /// Wait after `switchToTab` before `highlightInTab` (default: 500)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Highlight lifetime in the target page (default: 10000)
    #[serde(default = "default_highlight_duration_ms")]
    pub highlight_duration_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}
fn default_highlight_duration_ms() -> u64 {
    DEFAULT_HIGHLIGHT_DURATION_MS
}

impl ExecuteConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        ExecuteConfig {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            highlight_duration_ms: DEFAULT_HIGHLIGHT_DURATION_MS,
        }
    }
}

// ============================================
// PALETTE CONFIG
// ============================================

/// Top-level settings for one palette instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteConfig {
    /// Verbose logging (default: false)
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub execute: ExecuteConfig,
    /// Pages never scanned for content
    #[serde(default = "default_system_url_prefixes")]
    pub system_url_prefixes: Vec<String>,
}

fn default_debug() -> bool {
    DEFAULT_DEBUG
}
fn default_system_url_prefixes() -> Vec<String> {
    DEFAULT_SYSTEM_URL_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

impl Default for PaletteConfig {
    fn default() -> Self {
        PaletteConfig {
            debug: DEFAULT_DEBUG,
            search: SearchConfig::default(),
            filter: FilterConfig::default(),
            execute: ExecuteConfig::default(),
            system_url_prefixes: default_system_url_prefixes(),
        }
    }
}

impl PaletteConfig {
    /// Builder used by hosts that source the debug flag from their own storage.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
