//! Typed client for the Tab Directory
//!
//! The Tab Directory is whatever owns the authoritative tab list (the
//! extension's background script in a browser). The palette reaches it only
//! through a [`MessageChannel`]: one JSON request in, one JSON reply out.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::{PaletteError, Result};
use crate::protocol::{
    decode_response, ActionResponse, CurrentTabResponse, Request, SearchContentResponse,
    TabsResponse,
};
use crate::scanner::ScanResult;
use crate::tabs::{Tab, TabId};

/// Host messages meaning the extension was reloaded under this page
const CONTEXT_INVALIDATED_MARKERS: &[&str] = &[
    "extension context invalidated",
    "message port closed",
    "receiving end does not exist",
];

/// Prefix the browser uses when a tab id is stale
const NO_TAB_MARKER: &str = "no tab with id";

/// Transport-level failure reported by a [`MessageChannel`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The page outlived its extension; nothing will ever answer again.
    #[error("Extension context invalidated")]
    ContextInvalidated,

    #[error("No reply within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Transport(String),
}

impl ChannelError {
    /// Classify a raw error message reported by the host runtime.
    pub fn from_host_message(message: &str) -> Self {
        if is_context_invalidated_message(message) {
            ChannelError::ContextInvalidated
        } else {
            ChannelError::Transport(message.to_string())
        }
    }
}

fn is_context_invalidated_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    CONTEXT_INVALIDATED_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

impl From<ChannelError> for PaletteError {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::ContextInvalidated => PaletteError::ContextInvalidated,
            ChannelError::Timeout(after) => {
                PaletteError::Channel(format!("no reply within {} ms", after.as_millis()))
            }
            ChannelError::Transport(message) => PaletteError::Channel(message),
        }
    }
}

/// One request/reply round-trip to the Tab Directory.
///
/// Implementations own delivery and deadlines: a request that never gets an
/// answer must resolve to [`ChannelError::Timeout`], not hang.
#[allow(async_fn_in_trait)]
pub trait MessageChannel {
    async fn send(&self, request: Request) -> std::result::Result<Value, ChannelError>;
}

impl<C: MessageChannel> MessageChannel for &C {
    async fn send(&self, request: Request) -> std::result::Result<Value, ChannelError> {
        (**self).send(request).await
    }
}

/// Typed operations over a [`MessageChannel`]
pub struct TabDirectory<C> {
    channel: C,
}

impl<C: MessageChannel> TabDirectory<C> {
    pub fn new(channel: C) -> Self {
        TabDirectory { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn request<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let action = request.action();
        debug!(action, tab_id = ?request.tab_id(), "Sending request");
        let value = self.channel.send(request).await?;
        decode_response(action, value)
    }

    async fn act(&self, request: Request) -> Result<()> {
        let action = request.action();
        let tab_id = request.tab_id();
        let response: ActionResponse = self.request(request).await?;
        if response.success {
            Ok(())
        } else {
            Err(action_failure(action, tab_id, response.error))
        }
    }

    /// All tabs, most recently active first.
    ///
    /// A reply without a usable tab list is logged and treated as no tabs.
    #[instrument(level = "debug", skip_all)]
    pub async fn get_tabs(&self) -> Result<Vec<Tab>> {
        match self.request::<TabsResponse>(Request::GetTabs).await {
            Ok(response) => Ok(response.tabs),
            Err(PaletteError::InvalidResponse { action, detail }) => {
                warn!(action, detail = %detail, "Malformed tab list, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// The tab hosting this palette, if the directory knows it.
    pub async fn get_current_tab(&self) -> Result<Option<Tab>> {
        let response: CurrentTabResponse = self.request(Request::GetCurrentTab).await?;
        Ok(response.tab.filter(Tab::is_valid))
    }

    pub async fn switch_to_tab(&self, tab_id: TabId) -> Result<()> {
        self.act(Request::SwitchToTab { tab_id }).await
    }

    pub async fn pin_tab(&self, tab_id: TabId, pinned: bool) -> Result<()> {
        self.act(Request::PinTab { tab_id, pinned }).await
    }

    pub async fn mute_tab(&self, tab_id: TabId, muted: bool) -> Result<()> {
        self.act(Request::MuteTab { tab_id, muted }).await
    }

    pub async fn close_tab(&self, tab_id: TabId) -> Result<()> {
        self.act(Request::CloseTab { tab_id }).await
    }

    pub async fn highlight_in_tab(&self, tab_id: TabId, query: &str) -> Result<()> {
        self.act(Request::HighlightInTab {
            tab_id,
            query: query.to_string(),
        })
        .await
    }

    /// Scan another tab's text.
    ///
    /// Refusals and malformed replies become `ScanFailed`; context
    /// invalidation is passed through untouched.
    pub async fn search_content(&self, tab_id: TabId, query: &str) -> Result<ScanResult> {
        let request = Request::SearchContent {
            tab_id,
            query: query.to_string(),
        };
        let response: SearchContentResponse = match self.request(request).await {
            Ok(response) => response,
            Err(PaletteError::ContextInvalidated) => return Err(PaletteError::ContextInvalidated),
            Err(e) => {
                return Err(PaletteError::ScanFailed {
                    tab_id,
                    reason: e.to_string(),
                })
            }
        };
        if !response.success {
            let reason = response
                .error
                .unwrap_or_else(|| "scan refused".to_string());
            if is_context_invalidated_message(&reason) {
                return Err(PaletteError::ContextInvalidated);
            }
            return Err(PaletteError::ScanFailed { tab_id, reason });
        }
        Ok(response.into_scan())
    }
}

fn action_failure(action: &'static str, tab_id: Option<TabId>, error: Option<String>) -> PaletteError {
    let message = error.unwrap_or_else(|| "Unknown error".to_string());
    if is_context_invalidated_message(&message) {
        return PaletteError::ContextInvalidated;
    }
    match tab_id {
        Some(tab_id) if message.to_lowercase().contains(NO_TAB_MARKER) => {
            PaletteError::NotFound(tab_id)
        }
        _ => PaletteError::ActionFailed { action, message },
    }
}
