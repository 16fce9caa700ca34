//! Request and notification enums for the Tab Directory boundary
//!
//! Both directions are tagged by an `action` field, mirroring the browser
//! runtime messages the extension exchanges.

use serde::{Deserialize, Serialize};

use super::types::PaletteMode;
use crate::tabs::{Tab, TabId};

/// Palette → Tab Directory requests
///
/// # Example
/// ```json
/// {"action":"pinTab","tabId":12,"pinned":true}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    /// All tabs of the current window, most recently active first
    #[serde(rename = "getTabs")]
    GetTabs,

    /// The tab hosting this palette
    #[serde(rename = "getCurrentTab")]
    GetCurrentTab,

    #[serde(rename = "switchToTab")]
    SwitchToTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    #[serde(rename = "pinTab")]
    PinTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        pinned: bool,
    },

    #[serde(rename = "muteTab")]
    MuteTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        muted: bool,
    },

    #[serde(rename = "closeTab")]
    CloseTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },

    /// Scan another tab's page text; the Tab Directory injects the scanner
    #[serde(rename = "searchContent")]
    SearchContent {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        query: String,
    },

    /// Highlight and scroll to `query` inside another tab
    #[serde(rename = "highlightInTab")]
    HighlightInTab {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        query: String,
    },
}

impl Request {
    /// Wire name of this request
    pub fn action(&self) -> &'static str {
        match self {
            Request::GetTabs => "getTabs",
            Request::GetCurrentTab => "getCurrentTab",
            Request::SwitchToTab { .. } => "switchToTab",
            Request::PinTab { .. } => "pinTab",
            Request::MuteTab { .. } => "muteTab",
            Request::CloseTab { .. } => "closeTab",
            Request::SearchContent { .. } => "searchContent",
            Request::HighlightInTab { .. } => "highlightInTab",
        }
    }

    /// Target tab, for requests that act on one
    pub fn tab_id(&self) -> Option<TabId> {
        match self {
            Request::GetTabs | Request::GetCurrentTab => None,
            Request::SwitchToTab { tab_id }
            | Request::PinTab { tab_id, .. }
            | Request::MuteTab { tab_id, .. }
            | Request::CloseTab { tab_id }
            | Request::SearchContent { tab_id, .. }
            | Request::HighlightInTab { tab_id, .. } => Some(*tab_id),
        }
    }
}

/// Tab Directory → palette notifications
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Notification {
    /// Keyboard command or toolbar click asking the palette to open
    #[serde(rename = "openPalette", alias = "openCommandPalette")]
    OpenPalette {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<PaletteMode>,
    },

    /// The tab set changed (created, removed, updated)
    #[serde(rename = "tabsChanged", alias = "updateTabs")]
    TabsChanged {
        #[serde(default, deserialize_with = "crate::tabs::deserialize_tab_list")]
        tabs: Vec<Tab>,
    },
}

impl Notification {
    pub fn action(&self) -> &'static str {
        match self {
            Notification::OpenPalette { .. } => "openPalette",
            Notification::TabsChanged { .. } => "tabsChanged",
        }
    }
}
