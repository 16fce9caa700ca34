//! In-memory collaborators
//!
//! [`InMemoryDirectory`] answers the Tab Directory protocol from a tab list
//! held in memory, and [`RecordingHost`] records what the palette asks of its
//! page. The replay harness drives the palette with them; so do the tests.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::directory::{ChannelError, MessageChannel};
use crate::host::PageHost;
use crate::protocol::{
    ActionResponse, CurrentTabResponse, Request, SearchContentResponse, TabsResponse,
};
use crate::render::RenderedView;
use crate::scanner::{scan, HighlightSpan, PageSnapshot, ScanLimits};
use crate::tabs::{Tab, TabId};

#[derive(Default)]
struct DirectoryState {
    tabs: Vec<Tab>,
    current: Option<TabId>,
    pages: HashMap<TabId, PageSnapshot>,
    failing_scans: HashMap<TabId, String>,
    failing_actions: HashMap<&'static str, String>,
    invalidated: bool,
    requests: Vec<Request>,
}

impl DirectoryState {
    fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == Some(tab_id))
    }
}

/// Tab Directory backed by a `Vec<Tab>`
#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
    limits: ScanLimits,
}

impl InMemoryDirectory {
    pub fn new(tabs: Vec<Tab>) -> Self {
        InMemoryDirectory {
            state: Mutex::new(DirectoryState {
                tabs,
                ..Default::default()
            }),
            limits: ScanLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn set_current_tab(&self, tab_id: Option<TabId>) {
        self.state.lock().current = tab_id;
    }

    pub fn set_page(&self, tab_id: TabId, page: PageSnapshot) {
        self.state.lock().pages.insert(tab_id, page);
    }

    pub fn set_tabs(&self, tabs: Vec<Tab>) {
        self.state.lock().tabs = tabs;
    }

    /// Make `searchContent` for `tab_id` reply `success: false`.
    pub fn fail_scan(&self, tab_id: TabId, error: impl Into<String>) {
        self.state.lock().failing_scans.insert(tab_id, error.into());
    }

    /// Make every `action` request fail with `error`.
    pub fn fail_action(&self, action: &'static str, error: impl Into<String>) {
        self.state
            .lock()
            .failing_actions
            .insert(action, error.into());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing_scans.clear();
        state.failing_actions.clear();
    }

    /// Simulate the extension being reloaded under the page.
    pub fn invalidate(&self) {
        self.state.lock().invalidated = true;
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().tabs.clone()
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self, action: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|request| request.action() == action)
            .count()
    }

    fn answer(&self, request: &Request) -> Result<Value, ChannelError> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        if state.invalidated {
            return Err(ChannelError::ContextInvalidated);
        }
        if let Some(error) = state.failing_actions.get(request.action()) {
            return match request {
                Request::GetTabs | Request::GetCurrentTab => Ok(json!({ "error": error })),
                _ => to_value(&ActionResponse::failed(error.clone())),
            };
        }

        match request {
            Request::GetTabs => to_value(&TabsResponse {
                tabs: state.tabs.clone(),
            }),
            Request::GetCurrentTab => {
                let current = state.current;
                let tab = state
                    .tabs
                    .iter()
                    .find(|tab| current.is_some() && tab.id == current)
                    .cloned();
                to_value(&CurrentTabResponse { tab })
            }
            Request::SwitchToTab { tab_id } => {
                if state.tab_mut(*tab_id).is_none() {
                    return to_value(&no_tab(*tab_id));
                }
                for tab in state.tabs.iter_mut() {
                    tab.active = tab.id == Some(*tab_id);
                }
                to_value(&ActionResponse::ok())
            }
            Request::PinTab { tab_id, pinned } => match state.tab_mut(*tab_id) {
                Some(tab) => {
                    tab.pinned = *pinned;
                    to_value(&ActionResponse::ok())
                }
                None => to_value(&no_tab(*tab_id)),
            },
            Request::MuteTab { tab_id, muted } => match state.tab_mut(*tab_id) {
                Some(tab) => {
                    tab.set_muted(*muted);
                    to_value(&ActionResponse::ok())
                }
                None => to_value(&no_tab(*tab_id)),
            },
            Request::CloseTab { tab_id } => {
                let before = state.tabs.len();
                state.tabs.retain(|tab| tab.id != Some(*tab_id));
                if state.tabs.len() == before {
                    to_value(&no_tab(*tab_id))
                } else {
                    state.pages.remove(tab_id);
                    to_value(&ActionResponse::ok())
                }
            }
            Request::SearchContent { tab_id, query } => {
                if let Some(error) = state.failing_scans.get(tab_id) {
                    return to_value(&SearchContentResponse {
                        success: false,
                        error: Some(error.clone()),
                        ..Default::default()
                    });
                }
                let result = state
                    .pages
                    .get(tab_id)
                    .map(|page| scan(page, query, &self.limits))
                    .unwrap_or_default();
                to_value(&SearchContentResponse::from_scan(result))
            }
            Request::HighlightInTab { tab_id, .. } => {
                if state.tab_mut(*tab_id).is_none() {
                    return to_value(&no_tab(*tab_id));
                }
                to_value(&ActionResponse::ok())
            }
        }
    }
}

fn no_tab(tab_id: TabId) -> ActionResponse {
    ActionResponse::failed(format!("No tab with id: {}.", tab_id))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ChannelError> {
    serde_json::to_value(value).map_err(|e| ChannelError::Transport(e.to_string()))
}

impl MessageChannel for InMemoryDirectory {
    async fn send(&self, request: Request) -> Result<Value, ChannelError> {
        let reply = self.answer(&request);
        debug!(action = request.action(), ok = reply.is_ok(), "In-memory directory replied");
        reply
    }
}

/// Everything a [`RecordingHost`] was asked to do
#[derive(Debug, Clone, Default)]
pub struct HostLog {
    pub views: Vec<RenderedView>,
    pub highlights: Vec<(Vec<HighlightSpan>, Duration)>,
    pub sleeps: Vec<Duration>,
    pub dismissals: usize,
}

/// Page host that records instead of drawing. Sleeps complete immediately.
#[derive(Default)]
pub struct RecordingHost {
    page: Mutex<PageSnapshot>,
    log: Mutex<HostLog>,
}

impl RecordingHost {
    pub fn new(page: PageSnapshot) -> Self {
        RecordingHost {
            page: Mutex::new(page),
            log: Mutex::new(HostLog::default()),
        }
    }

    pub fn set_page(&self, page: PageSnapshot) {
        *self.page.lock() = page;
    }

    pub fn log(&self) -> HostLog {
        self.log.lock().clone()
    }

    pub fn last_view(&self) -> Option<RenderedView> {
        self.log.lock().views.last().cloned()
    }

    /// Drain recorded views, keeping the rest of the log
    pub fn take_views(&self) -> Vec<RenderedView> {
        std::mem::take(&mut self.log.lock().views)
    }
}

impl PageHost for RecordingHost {
    fn snapshot(&self) -> PageSnapshot {
        self.page.lock().clone()
    }

    fn highlight(&self, spans: &[HighlightSpan], duration: Duration) {
        self.log.lock().highlights.push((spans.to_vec(), duration));
    }

    fn present(&self, view: &RenderedView) {
        self.log.lock().views.push(view.clone());
    }

    fn dismiss(&self) {
        self.log.lock().dismissals += 1;
    }

    async fn sleep(&self, duration: Duration) {
        self.log.lock().sleeps.push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::TabDirectory;
    use crate::error::PaletteError;
    use crate::scanner::TextNode;
    use pollster::block_on;

    #[test]
    fn test_mutations_update_the_tab_list() {
        let directory = TabDirectory::new(InMemoryDirectory::new(vec![
            Tab::new(1, "One", "https://a.com"),
            Tab::new(2, "Two", "https://b.com"),
        ]));
        block_on(directory.pin_tab(TabId(1), true)).unwrap();
        block_on(directory.mute_tab(TabId(2), true)).unwrap();
        block_on(directory.close_tab(TabId(1))).unwrap();

        let tabs = directory.channel().tabs();
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].is_muted());
        assert_eq!(directory.channel().request_count("pinTab"), 1);
        assert!(matches!(
            block_on(directory.close_tab(TabId(1))),
            Err(PaletteError::NotFound(TabId(1)))
        ));
    }

    #[test]
    fn test_injected_failures_and_invalidation() {
        let directory = TabDirectory::new(InMemoryDirectory::new(vec![Tab::new(
            1,
            "One",
            "https://a.com",
        )]));
        directory.channel().fail_action("getTabs", "boom");
        assert!(block_on(directory.get_tabs()).is_err());
        directory.channel().clear_failures();
        assert_eq!(block_on(directory.get_tabs()).unwrap().len(), 1);

        directory.channel().invalidate();
        assert!(block_on(directory.get_tabs())
            .unwrap_err()
            .is_context_invalidated());
    }

    #[test]
    fn test_recording_host() {
        let host = RecordingHost::new(PageSnapshot {
            body: Some(vec![TextNode::visible("hello", "p")]),
            ..Default::default()
        });
        block_on(host.sleep(Duration::from_millis(500)));
        host.dismiss();
        let log = host.log();
        assert_eq!(log.sleeps, vec![Duration::from_millis(500)]);
        assert_eq!(log.dismissals, 1);
        assert!(host.last_view().is_none());
        assert_eq!(host.snapshot().body.map(|b| b.len()), Some(1));
    }
}
