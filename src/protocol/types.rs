//! Protocol types for the Tab Directory boundary
//!
//! Contains the palette mode and the typed reply shapes:
//! - `PaletteMode` for `openPalette`
//! - `TabsResponse`, `CurrentTabResponse` for tab queries
//! - `ActionResponse` for mutations
//! - `SearchContentResponse` for delegated scans

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scanner::{ContentMatch, ScanResult};
use crate::tabs::Tab;

/// Which result list the palette is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Search tabs by title, URL and host
    #[default]
    Tabs,
    /// Search text inside open tabs
    Content,
}

impl PaletteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteMode::Tabs => "tabs",
            PaletteMode::Content => "content",
        }
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to `getTabs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsResponse {
    #[serde(default, deserialize_with = "crate::tabs::deserialize_tab_list")]
    pub tabs: Vec<Tab>,
}

/// Reply to `getCurrentTab`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentTabResponse {
    #[serde(default)]
    pub tab: Option<Tab>,
}

/// Reply to `switchToTab`, `pinTab`, `muteTab`, `closeTab` and `highlightInTab`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        ActionResponse {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        ActionResponse {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Reply to `searchContent`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchContentResponse {
    pub success: bool,
    #[serde(default)]
    pub matches: Vec<ContentMatch>,
    #[serde(default)]
    pub total_matches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchContentResponse {
    pub fn from_scan(result: ScanResult) -> Self {
        SearchContentResponse {
            success: true,
            matches: result.matches,
            total_matches: result.total_matches,
            error: None,
        }
    }

    pub fn into_scan(self) -> ScanResult {
        ScanResult {
            matches: self.matches,
            total_matches: self.total_matches,
        }
    }
}
