//! Content search across open tabs
//!
//! Visits the current tab first (scanned in-process) and then the other
//! scannable tabs one at a time (scanned by the Tab Directory), keeping only
//! tabs with at least one hit. Individual scan failures are tolerated up to a
//! limit; a context invalidation always ends the search.
//!
//! # Module Structure
//!
//! - `plan` - Target selection: system-page filtering, ordering, the tab cap

mod plan;

pub use plan::{plan_scan, resolve_current, ScanPlan};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::PaletteConfig;
use crate::directory::{MessageChannel, TabDirectory};
use crate::error::{PaletteError, Result};
use crate::host::PageHost;
use crate::logging::log_scan_event;
use crate::scanner::{scan, ContentMatch, ScanLimits, ScanResult};
use crate::tabs::Tab;

/// One tab with at least one content hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResult {
    /// Snapshot of the tab at scan time
    pub tab: Tab,
    pub matches: Vec<ContentMatch>,
    pub total_matches: usize,
    /// Found in the page hosting the palette
    #[serde(default)]
    pub from_current_page: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchProgress {
    pub searched: usize,
    pub total: usize,
}

/// What a finished (or aborted) search produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// In scan order
    pub results: Vec<ContentResult>,
    /// Tabs attempted, failures included
    pub searched: usize,
    /// Tabs planned
    pub total: usize,
    pub failures: usize,
    /// Stopped early after too many failures
    pub aborted: bool,
}

/// Borrowing view over the collaborators one search needs
pub struct ContentSearch<'a, C, H> {
    directory: &'a TabDirectory<C>,
    host: &'a H,
    config: &'a PaletteConfig,
}

impl<'a, C: MessageChannel, H: PageHost> ContentSearch<'a, C, H> {
    pub fn new(directory: &'a TabDirectory<C>, host: &'a H, config: &'a PaletteConfig) -> Self {
        ContentSearch {
            directory,
            host,
            config,
        }
    }

    /// Search every scannable tab for `query`.
    ///
    /// `on_progress` is called after each tab. Returns partial results when
    /// failures exceed the configured limit; returns `ContextInvalidated` as
    /// soon as the channel reports it.
    #[instrument(level = "debug", skip_all, fields(query_len = query.len()))]
    pub async fn search_across_tabs(
        &self,
        query: &str,
        mut on_progress: impl FnMut(SearchProgress),
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        let limits = ScanLimits::from(&self.config.search);
        if query.chars().count() < limits.min_query_len {
            debug!("Query below minimum length, skipping content search");
            return Ok(SearchOutcome::default());
        }

        let tabs = self.directory.get_tabs().await?;
        let reported = match self.directory.get_current_tab().await {
            Ok(tab) => tab,
            Err(PaletteError::ContextInvalidated) => return Err(PaletteError::ContextInvalidated),
            Err(e) => {
                debug!(error = %e, "Current tab unknown, falling back to the active tab");
                None
            }
        };
        let current = resolve_current(&tabs, reported.as_ref());
        let plan = plan_scan(
            &tabs,
            current,
            self.config.search.max_tabs,
            &self.config.system_url_prefixes,
        );

        let mut outcome = SearchOutcome {
            total: plan.len(),
            ..Default::default()
        };
        info!(
            tab_count = tabs.len(),
            planned = outcome.total,
            has_current = plan.current.is_some(),
            "Starting content search"
        );

        for (tab, local) in plan.targets() {
            let Some(tab_id) = tab.id else { continue };
            let scanned = if local {
                Ok(scan(&self.host.snapshot(), query, &limits))
            } else {
                self.directory.search_content(tab_id, query).await
            };
            outcome.searched += 1;

            match scanned {
                Ok(result) => {
                    log_scan_event(tab_id.0, result.total_matches, true);
                    if let Some(hit) = into_content_result(tab, result, local) {
                        outcome.results.push(hit);
                    }
                }
                Err(PaletteError::ContextInvalidated) => {
                    warn!(tab_id = %tab_id, "Context invalidated during content search");
                    return Err(PaletteError::ContextInvalidated);
                }
                Err(e) => {
                    log_scan_event(tab_id.0, 0, false);
                    debug!(tab_id = %tab_id, error = %e, "Skipping tab");
                    outcome.failures += 1;
                }
            }

            on_progress(SearchProgress {
                searched: outcome.searched,
                total: outcome.total,
            });

            if outcome.failures > self.config.search.max_failures {
                warn!(
                    failures = outcome.failures,
                    searched = outcome.searched,
                    "Too many scan failures, stopping content search"
                );
                outcome.aborted = true;
                break;
            }
        }

        info!(
            results = outcome.results.len(),
            searched = outcome.searched,
            failures = outcome.failures,
            aborted = outcome.aborted,
            "Content search finished"
        );
        Ok(outcome)
    }
}

fn into_content_result(tab: &Tab, result: ScanResult, local: bool) -> Option<ContentResult> {
    if result.total_matches == 0 {
        return None;
    }
    Some(ContentResult {
        tab: tab.clone(),
        matches: result.matches,
        total_matches: result.total_matches,
        from_current_page: local,
    })
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
