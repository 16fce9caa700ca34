//! Palette state and its synchronous transitions
//!
//! Everything here is plain data manipulation; the async orchestration lives
//! in [`super::CommandPalette`]. Keeping the transitions here means the
//! renderer and the tests can work on a `PaletteState` directly.

use std::collections::HashMap;

use tracing::debug;

use crate::config::FilterConfig;
use crate::error::PaletteError;
use crate::protocol::PaletteMode;
use crate::search::{ContentResult, SearchProgress};
use crate::tabs::{filter_tabs, FilterOptions, Tab, TabId};

/// What the result area is doing besides listing results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaletteStatus {
    #[default]
    Ready,
    Searching(SearchProgress),
    /// Inline error notice with a user-facing message
    Error(String),
}

/// Local pin/mute values the directory has not confirmed yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabIntent {
    pub pinned: Option<bool>,
    pub muted: Option<bool>,
    /// Generation of the user action that recorded this intent
    pub generation: u64,
}

impl TabIntent {
    fn is_empty(&self) -> bool {
        self.pinned.is_none() && self.muted.is_none()
    }
}

/// A content search that was started and has not been applied yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteState {
    pub is_open: bool,
    pub mode: PaletteMode,
    pub query: String,
    pub selected_index: usize,
    /// Waiting for the tab list after `open`
    pub loading_tabs: bool,
    pub group_by_domain: bool,
    /// Local cache of the directory's tab list
    pub tabs: Vec<Tab>,
    pub filtered_tabs: Vec<Tab>,
    pub content_results: Vec<ContentResult>,
    pub status: PaletteStatus,
    /// Bumped by open, close, mode switches and query changes
    pub generation: u64,
    /// Bumped by open and close; guards the tab load of one open session
    pub session: u64,
    /// Generation of the in-flight content search
    pub pending_search: Option<u64>,
    pub intents: HashMap<TabId, TabIntent>,
    /// Terminal: the extension was reloaded under this page
    pub invalidated: bool,
}

impl PaletteState {
    pub fn is_loading(&self) -> bool {
        self.loading_tabs || self.pending_search == Some(self.generation)
    }

    pub fn is_searching(&self) -> bool {
        self.pending_search == Some(self.generation)
    }

    /// Length of the list selection moves over
    pub fn active_len(&self) -> usize {
        match self.mode {
            PaletteMode::Tabs => self.filtered_tabs.len(),
            PaletteMode::Content => self.content_results.len(),
        }
    }

    pub fn clamp_selection(&mut self) {
        let last = self.active_len().saturating_sub(1);
        if self.selected_index > last {
            self.selected_index = last;
        }
    }

    pub fn select_next(&mut self) {
        let last = self.active_len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(last);
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
        self.clamp_selection();
    }

    pub fn select_index(&mut self, index: usize) {
        self.selected_index = index;
        self.clamp_selection();
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        match self.mode {
            PaletteMode::Tabs => self.filtered_tabs.get(self.selected_index),
            PaletteMode::Content => None,
        }
    }

    pub fn selected_content(&self) -> Option<&ContentResult> {
        match self.mode {
            PaletteMode::Content => self.content_results.get(self.selected_index),
            PaletteMode::Tabs => None,
        }
    }

    /// Start an open session; returns its session id.
    pub fn begin_open(&mut self, mode: Option<PaletteMode>) -> u64 {
        self.is_open = true;
        if let Some(mode) = mode {
            self.mode = mode;
        }
        self.query.clear();
        self.selected_index = 0;
        self.filtered_tabs.clear();
        self.content_results.clear();
        self.status = PaletteStatus::Ready;
        self.loading_tabs = true;
        self.pending_search = None;
        self.intents.clear();
        self.generation += 1;
        self.session += 1;
        self.session
    }

    /// Apply the tab list fetched for `session`. Returns false if the session
    /// is over (closed or reopened meanwhile).
    pub fn finish_open(&mut self, session: u64, tabs: Vec<Tab>, filter: &FilterConfig) -> bool {
        if !self.is_open || self.session != session {
            debug!(session, current = self.session, "Dropping tab list for ended session");
            return false;
        }
        self.loading_tabs = false;
        self.tabs = tabs;
        self.recompute(filter);
        true
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.loading_tabs = false;
        self.pending_search = None;
        self.generation += 1;
        self.session += 1;
    }

    /// Record a failure. Context invalidation is terminal; anything else
    /// becomes an inline notice.
    pub fn fail(&mut self, error: &PaletteError) {
        self.loading_tabs = false;
        self.pending_search = None;
        if error.is_context_invalidated() {
            self.invalidated = true;
        }
        self.status = PaletteStatus::Error(error.user_message());
    }

    /// Recompute the active list for the current mode and query.
    ///
    /// Content mode cannot be recomputed synchronously: the result list is
    /// only cleared.
    pub fn recompute(&mut self, filter: &FilterConfig) {
        match self.mode {
            PaletteMode::Tabs => {
                let options = FilterOptions::from_config(filter, self.group_by_domain);
                self.filtered_tabs = filter_tabs(&self.tabs, &self.query, &options);
                self.content_results.clear();
            }
            PaletteMode::Content => {
                self.filtered_tabs.clear();
            }
        }
        self.clamp_selection();
    }

    /// Returns false when nothing changed.
    pub fn switch_mode(&mut self, mode: PaletteMode, filter: &FilterConfig) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.query.clear();
        self.selected_index = 0;
        self.filtered_tabs.clear();
        self.content_results.clear();
        self.pending_search = None;
        self.status = PaletteStatus::Ready;
        self.generation += 1;
        self.recompute(filter);
        true
    }

    /// Set the query. In content mode this returns a ticket when a search
    /// must run; short queries clear the results instead.
    pub fn set_query(
        &mut self,
        query: String,
        filter: &FilterConfig,
        min_query_len: usize,
    ) -> Option<SearchTicket> {
        self.query = query;
        self.selected_index = 0;
        self.generation += 1;
        self.pending_search = None;
        if !self.loading_tabs {
            self.status = PaletteStatus::Ready;
        }
        match self.mode {
            PaletteMode::Tabs => {
                if !self.loading_tabs {
                    self.recompute(filter);
                }
                None
            }
            PaletteMode::Content => {
                self.content_results.clear();
                let trimmed = self.query.trim();
                if trimmed.chars().count() < min_query_len {
                    return None;
                }
                let ticket = SearchTicket {
                    generation: self.generation,
                    query: trimmed.to_string(),
                };
                self.pending_search = Some(ticket.generation);
                self.status = PaletteStatus::Searching(SearchProgress::default());
                Some(ticket)
            }
        }
    }

    /// Whether results for `ticket` may still be shown.
    pub fn accepts(&self, ticket: &SearchTicket) -> bool {
        self.is_open
            && !self.invalidated
            && self.mode == PaletteMode::Content
            && self.generation == ticket.generation
            && self.query.trim() == ticket.query
    }

    pub fn update_progress(&mut self, ticket: &SearchTicket, progress: SearchProgress) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        self.status = PaletteStatus::Searching(progress);
        true
    }

    /// Apply finished results; returns false for stale tickets.
    pub fn finish_search(&mut self, ticket: &SearchTicket, results: Vec<ContentResult>) -> bool {
        if !self.accepts(ticket) {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale content results"
            );
            return false;
        }
        self.pending_search = None;
        self.status = PaletteStatus::Ready;
        self.content_results = results;
        self.selected_index = 0;
        true
    }

    pub fn toggle_grouping(&mut self, filter: &FilterConfig) {
        self.group_by_domain = !self.group_by_domain;
        self.selected_index = 0;
        if self.mode == PaletteMode::Tabs && !self.loading_tabs {
            self.recompute(filter);
        }
    }

    fn for_tab(&mut self, tab_id: TabId, mut update: impl FnMut(&mut Tab)) {
        self.tabs
            .iter_mut()
            .chain(self.filtered_tabs.iter_mut())
            .chain(self.content_results.iter_mut().map(|r| &mut r.tab))
            .filter(|tab| tab.id == Some(tab_id))
            .for_each(|tab| update(tab));
    }

    /// Optimistically apply a confirmed pin change and remember the intent.
    pub fn apply_pin(&mut self, tab_id: TabId, pinned: bool) {
        self.for_tab(tab_id, |tab| tab.pinned = pinned);
        let generation = self.generation;
        let intent = self.intents.entry(tab_id).or_default();
        intent.pinned = Some(pinned);
        intent.generation = generation;
    }

    pub fn apply_mute(&mut self, tab_id: TabId, muted: bool) {
        self.for_tab(tab_id, |tab| tab.set_muted(muted));
        let generation = self.generation;
        let intent = self.intents.entry(tab_id).or_default();
        intent.muted = Some(muted);
        intent.generation = generation;
    }

    /// Drop one tab everywhere. Returns whether anything was removed.
    pub fn remove_tab(&mut self, tab_id: TabId) -> bool {
        let before = self.tabs.len() + self.filtered_tabs.len() + self.content_results.len();
        self.tabs.retain(|tab| tab.id != Some(tab_id));
        self.filtered_tabs.retain(|tab| tab.id != Some(tab_id));
        self.content_results.retain(|r| r.tab.id != Some(tab_id));
        self.intents.remove(&tab_id);
        self.clamp_selection();
        before != self.tabs.len() + self.filtered_tabs.len() + self.content_results.len()
    }

    /// Replace the tab cache with a directory snapshot, keeping unconfirmed
    /// local intents on top. Intents the snapshot already reflects are dropped.
    pub fn apply_tabs_snapshot(&mut self, mut tabs: Vec<Tab>, filter: &FilterConfig) {
        for tab in tabs.iter_mut() {
            let Some(tab_id) = tab.id else { continue };
            let Some(intent) = self.intents.get_mut(&tab_id) else {
                continue;
            };
            if let Some(pinned) = intent.pinned {
                if tab.pinned == pinned {
                    intent.pinned = None;
                } else {
                    tab.pinned = pinned;
                }
            }
            if let Some(muted) = intent.muted {
                if tab.is_muted() == muted {
                    intent.muted = None;
                } else {
                    tab.set_muted(muted);
                }
            }
        }
        self.intents.retain(|_, intent| !intent.is_empty());
        self.tabs = tabs;
        if self.is_open && self.mode == PaletteMode::Tabs && !self.loading_tabs {
            self.recompute(filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> FilterConfig {
        FilterConfig::default()
    }

    fn open_with(tabs: Vec<Tab>) -> PaletteState {
        let mut state = PaletteState::default();
        let session = state.begin_open(None);
        assert!(state.finish_open(session, tabs, &filter()));
        state
    }

    fn sample() -> Vec<Tab> {
        vec![
            Tab::new(1, "GitHub Repo", "https://github.com/x"),
            Tab::new(2, "SO Question", "https://stackoverflow.com/q/1"),
            Tab::new(3, "Rust docs", "https://doc.rust-lang.org"),
        ]
    }

    #[test]
    fn test_selection_clamps() {
        let mut state = open_with(sample());
        state.select_previous();
        assert_eq!(state.selected_index, 0);
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_index, 2);
        state.select_index(99);
        assert_eq!(state.selected_index, 2);

        let mut empty = open_with(Vec::new());
        empty.select_next();
        empty.select_previous();
        assert_eq!(empty.selected_index, 0);
    }

    #[test]
    fn test_selection_clamps_after_filter_shrinks() {
        let mut state = open_with(sample());
        state.select_index(2);
        state.set_query("github".to_string(), &filter(), 2);
        assert_eq!(state.filtered_tabs.len(), 1);
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_finish_open_rejects_ended_session() {
        let mut state = PaletteState::default();
        let session = state.begin_open(None);
        state.close();
        assert!(!state.finish_open(session, sample(), &filter()));
        assert!(state.tabs.is_empty());

        let first = state.begin_open(None);
        let second = {
            state.close();
            state.begin_open(None)
        };
        assert!(!state.finish_open(first, sample(), &filter()));
        assert!(state.finish_open(second, sample(), &filter()));
    }

    #[test]
    fn test_switch_mode_resets() {
        let mut state = open_with(sample());
        state.set_query("git".to_string(), &filter(), 2);
        state.select_index(0);
        assert!(state.switch_mode(PaletteMode::Content, &filter()));
        assert!(state.query.is_empty());
        assert!(state.filtered_tabs.is_empty());
        assert!(!state.switch_mode(PaletteMode::Content, &filter()));

        assert!(state.switch_mode(PaletteMode::Tabs, &filter()));
        assert_eq!(state.filtered_tabs.len(), 3);
        assert!(state.content_results.is_empty());
    }

    #[test]
    fn test_content_query_tickets() {
        let mut state = open_with(sample());
        state.switch_mode(PaletteMode::Content, &filter());
        assert!(state.set_query("e".to_string(), &filter(), 2).is_none());
        assert!(!state.is_loading());

        let ticket = state
            .set_query("  error ".to_string(), &filter(), 2)
            .unwrap();
        assert_eq!(ticket.query, "error");
        assert!(state.is_searching());
        assert!(state.accepts(&ticket));

        // A newer query makes the ticket stale
        let newer = state.set_query("errors".to_string(), &filter(), 2).unwrap();
        assert!(!state.finish_search(&ticket, Vec::new()));
        assert!(state.is_searching());
        assert!(state.finish_search(&newer, Vec::new()));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_pin_intent_survives_stale_snapshot() {
        let mut state = open_with(sample());
        state.apply_pin(TabId(1), true);
        assert!(state.tabs[0].pinned);
        assert!(state.filtered_tabs[0].pinned);

        // Snapshot taken before the pin landed
        state.apply_tabs_snapshot(sample(), &filter());
        assert!(state.tabs[0].pinned);
        assert!(state.intents.contains_key(&TabId(1)));

        // Snapshot confirming the pin clears the intent
        let mut confirmed = sample();
        confirmed[0].pinned = true;
        state.apply_tabs_snapshot(confirmed, &filter());
        assert!(state.tabs[0].pinned);
        assert!(state.intents.is_empty());

        // Later external unpin is respected
        state.apply_tabs_snapshot(sample(), &filter());
        assert!(!state.tabs[0].pinned);
    }

    #[test]
    fn test_mute_intent_and_remove_tab() {
        let mut state = open_with(sample());
        state.apply_mute(TabId(2), true);
        state.apply_tabs_snapshot(sample(), &filter());
        assert!(state.tabs[1].is_muted());

        state.select_index(2);
        assert!(state.remove_tab(TabId(3)));
        assert_eq!(state.tabs.len(), 2);
        assert_eq!(state.filtered_tabs.len(), 2);
        assert_eq!(state.selected_index, 1);
        assert!(!state.remove_tab(TabId(3)));
    }

    #[test]
    fn test_fail_invalidates_only_on_context_loss() {
        let mut state = open_with(sample());
        state.fail(&PaletteError::Channel("down".to_string()));
        assert!(!state.invalidated);
        assert!(matches!(state.status, PaletteStatus::Error(_)));

        state.fail(&PaletteError::ContextInvalidated);
        assert!(state.invalidated);
    }

    #[test]
    fn test_toggle_grouping_resets_selection() {
        let mut state = open_with(sample());
        state.select_index(2);
        state.toggle_grouping(&filter());
        assert!(state.group_by_domain);
        assert_eq!(state.selected_index, 0);
        let ids: Vec<i64> = state.filtered_tabs.iter().filter_map(|t| t.id.map(|i| i.0)).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        state.toggle_grouping(&filter());
        let ids: Vec<i64> = state.filtered_tabs.iter().filter_map(|t| t.id.map(|i| i.0)).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
