//! Host grouping for the tab list
//!
//! Grouping is an ordering plus header positions: the flat list stays the
//! selection target, headers are interleaved only when rendering.

use std::cmp::Ordering;

use super::types::Tab;

/// Enum for grouped list items - supports both regular items and section headers
///
/// The usize in the Item variant is the index into the flat tab list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupedListItem {
    /// A host header (e.g., "github.com")
    SectionHeader(String),
    /// A regular list item - usize is the index in the flat results array
    Item(usize),
}

/// Re-order tabs by host ascending, then title ascending within a host.
///
/// Titles compare case-insensitively first so "apple" and "Banana" sort the
/// way a reader expects. The sort is stable.
pub fn group_by_host(tabs: Vec<Tab>) -> Vec<Tab> {
    let mut keyed: Vec<(String, String, Tab)> = tabs
        .into_iter()
        .map(|tab| (tab.display_host(), tab.title.to_lowercase(), tab))
        .collect();
    keyed.sort_by(|a, b| compare_group_keys(a, b));
    keyed.into_iter().map(|(_, _, tab)| tab).collect()
}

fn compare_group_keys(a: &(String, String, Tab), b: &(String, String, Tab)) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.cmp(&b.1))
        .then_with(|| a.2.title.cmp(&b.2.title))
}

/// Interleave a header before each run of tabs sharing a host.
pub fn with_host_headers(tabs: &[Tab]) -> Vec<GroupedListItem> {
    let mut grouped = Vec::with_capacity(tabs.len() + 4);
    let mut current_host: Option<String> = None;
    for (idx, tab) in tabs.iter().enumerate() {
        let host = tab.display_host();
        if current_host.as_deref() != Some(host.as_str()) {
            grouped.push(GroupedListItem::SectionHeader(host.clone()));
            current_host = Some(host);
        }
        grouped.push(GroupedListItem::Item(idx));
    }
    grouped
}

/// Flat list without headers.
pub fn without_headers(tabs: &[Tab]) -> Vec<GroupedListItem> {
    (0..tabs.len()).map(GroupedListItem::Item).collect()
}
