//! Tab data types
//!
//! Tabs are supplied by the Tab Directory as camelCase JSON. Every field is
//! optional on the wire: missing or `null` values fall back to defaults so a
//! partially populated tab never fails the whole `getTabs` response.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::url::{display_host, host_component};

/// Opaque tab handle assigned by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutedInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub muted: bool,
}

/// A browser tab as reported by the Tab Directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TabId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub audible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted_info: Option<MutedInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    /// Milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i64>,
}

impl Tab {
    pub fn new(id: i64, title: impl Into<String>, url: impl Into<String>) -> Self {
        Tab {
            id: Some(TabId(id)),
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Entries without an identity cannot be acted on and are never listed.
    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted_info.as_ref().is_some_and(|info| info.muted)
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted_info.get_or_insert_with(MutedInfo::default).muted = muted;
    }

    /// Hostname used for matching, `None` when the URL has no host.
    pub fn host(&self) -> Option<String> {
        host_component(&self.url)
    }

    /// Hostname used for grouping headers and result rows.
    pub fn display_host(&self) -> String {
        display_host(&self.url)
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled Tab"
        } else {
            &self.title
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a tab list entry by entry.
///
/// `null`, non-object and undecodable entries are dropped individually; a
/// missing or `null` list is empty.
pub fn deserialize_tab_list<'de, D>(deserializer: D) -> Result<Vec<Tab>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let total = entries.len();
    let tabs: Vec<Tab> = entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| match serde_json::from_value::<Tab>(entry) {
            Ok(tab) => Some(tab),
            Err(e) => {
                debug!(error = %e, "Dropping undecodable tab entry");
                None
            }
        })
        .collect();
    if tabs.len() != total {
        debug!(total, kept = tabs.len(), "Dropped malformed tab entries");
    }
    Ok(tabs)
}
