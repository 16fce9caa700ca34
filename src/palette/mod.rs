//! Command palette - the state machine hosts drive
//!
//! `Closed -> Open(Tabs) <-> Open(Content) -> Closed`
//!
//! Every method takes `&self`: state sits behind a mutex that is never held
//! across an `.await`, so a host may start a new operation (a keystroke, a
//! close) while an earlier one is still waiting on the Tab Directory. Results
//! of superseded operations are dropped using the generation counters in
//! [`PaletteState`].
//!
//! # Module Structure
//!
//! - `state` - PaletteState and its synchronous transitions

mod state;

pub use state::{PaletteState, PaletteStatus, SearchTicket, TabIntent};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::PaletteConfig;
use crate::directory::{MessageChannel, TabDirectory};
use crate::error::{PaletteError, ResultExt};
use crate::host::PageHost;
use crate::keymap::{KeyInput, PaletteCommand};
use crate::logging::{log_error, log_palette_event};
use crate::protocol::{classify_notification, Notification, NotificationParse, PaletteMode};
use crate::render::{render, RenderedView};
use crate::scanner::plan_highlights;
use crate::search::ContentSearch;
use crate::tabs::TabId;

/// What Enter acts on
enum ExecuteTarget {
    Tab(TabId),
    LocalContent { query: String },
    RemoteContent { tab_id: TabId, query: String },
}

pub struct CommandPalette<C, H> {
    directory: TabDirectory<C>,
    host: H,
    config: PaletteConfig,
    state: Mutex<PaletteState>,
}

impl<C: MessageChannel, H: PageHost> CommandPalette<C, H> {
    pub fn new(channel: C, host: H, config: PaletteConfig) -> Self {
        CommandPalette {
            directory: TabDirectory::new(channel),
            host,
            config,
            state: Mutex::new(PaletteState::default()),
        }
    }

    pub fn directory(&self) -> &TabDirectory<C> {
        &self.directory
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &PaletteConfig {
        &self.config
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PaletteState {
        self.state.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().is_open
    }

    pub fn mode(&self) -> PaletteMode {
        self.state.lock().mode
    }

    pub fn view(&self) -> RenderedView {
        render(&self.state.lock())
    }

    fn present(&self) {
        let view = self.view();
        self.host.present(&view);
    }

    /// Mutate state unless the palette is closed or invalidated.
    /// Returns `None` when the operation must be skipped.
    fn with_open_state<T>(&self, f: impl FnOnce(&mut PaletteState) -> T) -> Option<T> {
        let mut state = self.state.lock();
        if !state.is_open || state.invalidated {
            return None;
        }
        Some(f(&mut state))
    }

    /// Record a failed operation and show it.
    fn report(&self, operation: &'static str, error: &PaletteError) {
        warn!(
            operation,
            error = %error,
            severity = ?error.severity(),
            "Palette operation failed"
        );
        {
            let mut state = self.state.lock();
            if let PaletteError::NotFound(tab_id) = error {
                state.remove_tab(*tab_id);
            }
            state.fail(error);
        }
        self.present();
    }

    /// Open the palette and load tabs. No-op when already open.
    ///
    /// With `mode` unset the last session's mode is kept.
    #[instrument(level = "debug", skip(self))]
    pub async fn open(&self, mode: Option<PaletteMode>) {
        let session = {
            let mut state = self.state.lock();
            if state.is_open {
                debug!("Palette already open");
                return;
            }
            if state.invalidated {
                state.is_open = true;
                None
            } else {
                Some(state.begin_open(mode))
            }
        };
        self.present();
        let Some(session) = session else {
            return;
        };
        log_palette_event("open", self.mode().as_str(), None);

        let loaded = self.directory.get_tabs().await;
        let applied = {
            let mut state = self.state.lock();
            match loaded {
                Ok(tabs) => {
                    let count = tabs.len();
                    let applied = state.finish_open(session, tabs, &self.config.filter);
                    if applied {
                        debug!(tab_count = count, "Tabs loaded");
                    }
                    applied
                }
                Err(e) if state.session == session && state.is_open => {
                    warn!(error = %e, "Failed to load tabs");
                    state.fail(&e);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "Ignoring load failure for ended session");
                    false
                }
            }
        };
        if applied {
            self.present();
        }
    }

    /// Close when open, otherwise open in tab mode.
    pub async fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open(Some(PaletteMode::Tabs)).await;
        }
    }

    /// Hide the palette. The tab cache is kept; in-flight work is abandoned.
    pub fn close(&self) {
        let closed = {
            let mut state = self.state.lock();
            if !state.is_open {
                false
            } else {
                state.close();
                true
            }
        };
        if closed {
            log_palette_event("close", self.mode().as_str(), None);
            self.host.dismiss();
        }
    }

    /// Update the query. Tab mode filters immediately; content mode runs a
    /// search whose results are applied only if nothing newer happened.
    pub async fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let min_query_len = self.config.search.min_query_len;
        let Some(ticket) = self.with_open_state(|state| {
            state.set_query(query, &self.config.filter, min_query_len)
        }) else {
            return;
        };
        self.present();

        let Some(ticket) = ticket else {
            return;
        };
        let search = ContentSearch::new(&self.directory, &self.host, &self.config);
        let outcome = search
            .search_across_tabs(&ticket.query, |progress| {
                let accepted = self.state.lock().update_progress(&ticket, progress);
                if accepted {
                    self.present();
                }
            })
            .await;

        let applied = {
            let mut state = self.state.lock();
            match outcome {
                Ok(outcome) => {
                    if outcome.aborted {
                        info!(
                            failures = outcome.failures,
                            "Showing partial content results"
                        );
                    }
                    state.finish_search(&ticket, outcome.results)
                }
                Err(e) if e.is_context_invalidated() || state.accepts(&ticket) => {
                    warn!(error = %e, "Content search failed");
                    state.fail(&e);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "Ignoring failure of a stale content search");
                    false
                }
            }
        };
        if applied {
            self.present();
        }
    }

    /// Switch between tab and content search. No-op if already in `mode`.
    pub fn switch_mode(&self, mode: PaletteMode) {
        let switched = self
            .with_open_state(|state| state.switch_mode(mode, &self.config.filter))
            .unwrap_or(false);
        if switched {
            log_palette_event("switch_mode", mode.as_str(), None);
            self.present();
        }
    }

    pub fn select_next(&self) {
        if self.with_open_state(PaletteState::select_next).is_some() {
            self.present();
        }
    }

    pub fn select_previous(&self) {
        if self.with_open_state(PaletteState::select_previous).is_some() {
            self.present();
        }
    }

    /// Select the item a click landed on (`index` from the rendered row).
    pub fn select_index(&self, index: usize) {
        if self
            .with_open_state(|state| state.select_index(index))
            .is_some()
        {
            self.present();
        }
    }

    /// Flip host grouping. Tab mode only.
    pub fn toggle_grouping(&self) {
        let toggled = self
            .with_open_state(|state| {
                if state.mode != PaletteMode::Tabs {
                    return false;
                }
                state.toggle_grouping(&self.config.filter);
                true
            })
            .unwrap_or(false);
        if toggled {
            self.present();
        }
    }

    /// Act on the selected result. Returns whether the action went through;
    /// on failure the palette stays open with an inline notice.
    #[instrument(level = "debug", skip(self))]
    pub async fn execute_selected(&self) -> bool {
        let target = self
            .with_open_state(|state| {
                let query = state.query.trim().to_string();
                match state.mode {
                    PaletteMode::Tabs => state
                        .selected_tab()
                        .and_then(|tab| tab.id)
                        .map(ExecuteTarget::Tab),
                    PaletteMode::Content => {
                        state.selected_content().and_then(|result| {
                            if result.from_current_page {
                                Some(ExecuteTarget::LocalContent { query })
                            } else {
                                result
                                    .tab
                                    .id
                                    .map(|tab_id| ExecuteTarget::RemoteContent { tab_id, query })
                            }
                        })
                    }
                }
            })
            .flatten();
        let Some(target) = target else {
            return false;
        };

        match target {
            ExecuteTarget::Tab(tab_id) => match self.directory.switch_to_tab(tab_id).await {
                Ok(()) => {
                    log_palette_event("switch_to_tab", "tabs", Some(&tab_id.to_string()));
                    self.close();
                    true
                }
                Err(e) => {
                    self.report("switchToTab", &e);
                    false
                }
            },
            ExecuteTarget::LocalContent { query } => {
                let spans = plan_highlights(
                    &self.host.snapshot(),
                    &query,
                    self.config.search.min_query_len,
                );
                self.close();
                self.host
                    .highlight(&spans, self.config.execute.highlight_duration());
                log_palette_event("highlight_local", "content", Some(&query));
                true
            }
            ExecuteTarget::RemoteContent { tab_id, query } => {
                if let Err(e) = self.directory.switch_to_tab(tab_id).await {
                    self.report("switchToTab", &e);
                    return false;
                }
                self.close();
                self.host.sleep(self.config.execute.settle_delay()).await;
                self.directory
                    .highlight_in_tab(tab_id, &query)
                    .await
                    .warn_on_err();
                log_palette_event("highlight_remote", "content", Some(&tab_id.to_string()));
                true
            }
        }
    }

    /// The selected tab in tab mode
    fn selected_tab_for_mutation(&self) -> Option<(TabId, bool, bool)> {
        self.with_open_state(|state| {
            if state.mode != PaletteMode::Tabs {
                return None;
            }
            state
                .selected_tab()
                .and_then(|tab| tab.id.map(|id| (id, tab.pinned, tab.is_muted())))
        })
        .flatten()
    }

    fn mutation_failed(&self, operation: &'static str, error: PaletteError) {
        match error {
            PaletteError::ContextInvalidated | PaletteError::NotFound(_) => {
                self.report(operation, &error)
            }
            other => log_error(operation, &other.to_string(), Some("tab left unchanged")),
        }
    }

    /// Pin or unpin the selected tab. Returns whether it changed.
    pub async fn toggle_pin(&self) -> bool {
        let Some((tab_id, pinned, _)) = self.selected_tab_for_mutation() else {
            return false;
        };
        match self.directory.pin_tab(tab_id, !pinned).await {
            Ok(()) => {
                self.state.lock().apply_pin(tab_id, !pinned);
                self.present();
                true
            }
            Err(e) => {
                self.mutation_failed("pinTab", e);
                false
            }
        }
    }

    /// Mute or unmute the selected tab. Returns whether it changed.
    pub async fn toggle_mute(&self) -> bool {
        let Some((tab_id, _, muted)) = self.selected_tab_for_mutation() else {
            return false;
        };
        match self.directory.mute_tab(tab_id, !muted).await {
            Ok(()) => {
                self.state.lock().apply_mute(tab_id, !muted);
                self.present();
                true
            }
            Err(e) => {
                self.mutation_failed("muteTab", e);
                false
            }
        }
    }

    /// Close the selected tab. Returns whether it was closed.
    pub async fn close_selected(&self) -> bool {
        let Some((tab_id, _, _)) = self.selected_tab_for_mutation() else {
            return false;
        };
        match self.directory.close_tab(tab_id).await {
            Ok(()) => {
                self.state.lock().remove_tab(tab_id);
                self.present();
                true
            }
            Err(e) => {
                self.mutation_failed("closeTab", e);
                false
            }
        }
    }

    /// React to a notification from the Tab Directory.
    pub async fn handle_notification(&self, notification: Notification) {
        match notification {
            Notification::OpenPalette { mode } => self.open(mode).await,
            Notification::TabsChanged { tabs } => {
                let visible = {
                    let mut state = self.state.lock();
                    if state.invalidated {
                        return;
                    }
                    debug!(tab_count = tabs.len(), "Tab list changed");
                    state.apply_tabs_snapshot(tabs, &self.config.filter);
                    state.is_open
                };
                if visible {
                    self.present();
                }
            }
        }
    }

    /// React to a raw runtime message; unknown actions are logged and ignored.
    pub async fn handle_message(&self, message: Value) {
        match classify_notification(message) {
            NotificationParse::Ok(notification) => self.handle_notification(notification).await,
            NotificationParse::UnknownAction { action, .. } => {
                debug!(action = %action, "Ignoring unknown action");
            }
            NotificationParse::MissingAction { raw } => {
                warn!(raw_preview = %raw, "Ignoring message without action");
            }
            NotificationParse::InvalidPayload { action, error, .. } => {
                warn!(action = %action, error = %error, "Ignoring malformed notification");
            }
            NotificationParse::ParseError(e) => {
                warn!(error = %e, "Ignoring undecodable message");
            }
        }
    }

    /// Dispatch an in-palette shortcut. Returns false for keys the palette
    /// does not bind (the input field handles those).
    pub async fn handle_key(&self, input: &KeyInput) -> bool {
        let mode = {
            let state = self.state.lock();
            if !state.is_open {
                return false;
            }
            state.mode
        };
        let Some(command) = PaletteCommand::from_key(input, mode) else {
            return false;
        };
        debug!(?command, key = %input.key, "Palette shortcut");
        match command {
            PaletteCommand::Close => self.close(),
            PaletteCommand::SelectNext => self.select_next(),
            PaletteCommand::SelectPrevious => self.select_previous(),
            PaletteCommand::Execute => {
                self.execute_selected().await;
            }
            PaletteCommand::TogglePin => {
                self.toggle_pin().await;
            }
            PaletteCommand::ToggleMute => {
                self.toggle_mute().await;
            }
            PaletteCommand::CloseTab => {
                self.close_selected().await;
            }
            PaletteCommand::ToggleGrouping => self.toggle_grouping(),
            PaletteCommand::SwitchMode(mode) => self.switch_mode(mode),
        }
        true
    }
}

#[cfg(test)]
#[path = "palette_tests.rs"]
mod tests;
