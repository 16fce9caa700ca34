//! Projection of palette state into row descriptors
//!
//! `render` is pure and total: every call builds the complete view from the
//! state, and hosts replace whatever they showed before. Text that came from
//! pages or tabs is matched raw and HTML-escaped piecewise around each highlight.

use serde::Serialize;
use smallvec::SmallVec;

use crate::matcher::{escape_html, highlight_escaped};
use crate::palette::{PaletteState, PaletteStatus};
use crate::protocol::PaletteMode;
use crate::search::ContentResult;
use crate::tabs::{with_host_headers, without_headers, GroupedListItem, Tab, TabId};

pub const TABS_PLACEHOLDER: &str = "Search tabs by title and domain...";
pub const CONTENT_PLACEHOLDER: &str = "Search page content across all tabs...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Badge {
    Active,
    Pinned,
    Audible,
    Muted,
    /// Row came from content search
    Content,
}

pub type Badges = SmallVec<[Badge; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRow {
    /// Index into the filtered tab list
    pub index: usize,
    pub tab_id: Option<TabId>,
    pub title_html: String,
    pub host_html: String,
    pub fav_icon_url: Option<String>,
    pub badges: Badges,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    /// Index into the content result list
    pub index: usize,
    pub tab_id: Option<TabId>,
    pub title_html: String,
    pub host: String,
    pub match_count: usize,
    pub match_label: String,
    /// First match context, escaped and highlighted
    pub preview_html: Option<String>,
    pub fav_icon_url: Option<String>,
    pub badges: Badges,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    Loading,
    Searching,
    Instructions,
    Empty,
    NoResults,
    Error,
    Reloaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
}

impl Notice {
    fn new(kind: NoticeKind, title: impl Into<String>) -> Self {
        Notice {
            kind,
            title: title.into(),
            subtitle: None,
            tips: Vec::new(),
        }
    }

    fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    fn tips(mut self, tips: &[&str]) -> Self {
        self.tips = tips.iter().map(|tip| tip.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Row {
    Header { host: String },
    Tab(TabRow),
    Content(ContentRow),
    Notice(Notice),
}

impl Row {
    /// Index into the active list, for rows that can be selected
    pub fn item_index(&self) -> Option<usize> {
        match self {
            Row::Tab(row) => Some(row.index),
            Row::Content(row) => Some(row.index),
            Row::Header { .. } | Row::Notice(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterHint {
    pub keys: &'static str,
    pub label: &'static str,
}

const fn hint(keys: &'static str, label: &'static str) -> FooterHint {
    FooterHint { keys, label }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub visible: bool,
    pub mode: PaletteMode,
    pub placeholder: &'static str,
    pub query: String,
    pub rows: Vec<Row>,
    pub footer: Vec<FooterHint>,
    /// Position in `rows` of the selected item
    pub selected_row: Option<usize>,
    /// Row the host should keep scrolled into view
    pub scroll_to: Option<usize>,
}

impl RenderedView {
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.rows.iter().filter_map(|row| match row {
            Row::Notice(notice) => Some(notice),
            _ => None,
        })
    }

    pub fn first_notice(&self) -> Option<&Notice> {
        self.notices().next()
    }

    pub fn item_count(&self) -> usize {
        self.rows.iter().filter(|row| row.item_index().is_some()).count()
    }
}

pub fn placeholder(mode: PaletteMode) -> &'static str {
    match mode {
        PaletteMode::Tabs => TABS_PLACEHOLDER,
        PaletteMode::Content => CONTENT_PLACEHOLDER,
    }
}

pub fn footer(mode: PaletteMode, group_by_domain: bool) -> Vec<FooterHint> {
    match mode {
        PaletteMode::Tabs => vec![
            hint("↑↓", "Navigate"),
            hint("Enter", "Select"),
            hint("Ctrl+Shift+P", "Pin"),
            hint("Ctrl+M", "Mute"),
            hint("Del", "Close Tab"),
            hint("Ctrl+G", if group_by_domain { "Grouped" } else { "List" }),
            hint("Ctrl+F", "Content Search"),
            hint("Esc", "Close"),
        ],
        PaletteMode::Content => vec![
            hint("↑↓", "Navigate"),
            hint("Enter", "Select"),
            hint("Ctrl+P", "Tab Search"),
            hint("Esc", "Close"),
        ],
    }
}

fn reloaded_notice() -> Notice {
    Notice::new(NoticeKind::Reloaded, "Extension Reloaded")
        .subtitle("Please refresh this page to continue using GoFaster")
}

fn tab_badges(tab: &Tab) -> Badges {
    let mut badges = Badges::new();
    if tab.active {
        badges.push(Badge::Active);
    }
    if tab.pinned {
        badges.push(Badge::Pinned);
    }
    if tab.audible {
        badges.push(Badge::Audible);
    }
    if tab.is_muted() {
        badges.push(Badge::Muted);
    }
    badges
}

fn tab_row(index: usize, tab: &Tab, query: &str, selected: bool) -> TabRow {
    TabRow {
        index,
        tab_id: tab.id,
        title_html: highlight_escaped(tab.display_title(), query),
        host_html: highlight_escaped(&tab.display_host(), query),
        fav_icon_url: tab.fav_icon_url.clone(),
        badges: tab_badges(tab),
        selected,
    }
}

fn content_row(index: usize, result: &ContentResult, query: &str, selected: bool) -> ContentRow {
    let mut badges = Badges::new();
    badges.push(Badge::Content);
    if result.tab.active || result.from_current_page {
        badges.push(Badge::Active);
    }
    ContentRow {
        index,
        tab_id: result.tab.id,
        title_html: escape_html(result.tab.display_title()),
        host: result.tab.display_host(),
        match_count: result.total_matches,
        match_label: if result.total_matches == 1 {
            "1 match".to_string()
        } else {
            format!("{} matches", result.total_matches)
        },
        preview_html: result
            .matches
            .first()
            .map(|m| highlight_escaped(&m.context, query)),
        fav_icon_url: result.tab.fav_icon_url.clone(),
        badges,
        selected,
    }
}

fn tab_rows(state: &PaletteState, query: &str) -> Vec<Row> {
    if state.loading_tabs {
        return vec![Row::Notice(Notice::new(NoticeKind::Loading, "Loading tabs..."))];
    }
    if state.filtered_tabs.is_empty() {
        let notice = if !state.tabs.iter().any(Tab::is_valid) {
            Notice::new(NoticeKind::Empty, "No tabs available")
                .subtitle("No browser tabs found")
                .tips(&[
                    "Open some tabs to get started",
                    "Refresh this page if tabs aren't loading",
                ])
        } else if !query.is_empty() {
            Notice::new(NoticeKind::NoResults, "No tabs found")
                .subtitle(format!("No tabs match \"{}\"", query))
                .tips(&[
                    "Try different keywords",
                    "Check tab titles and URLs",
                    "Use partial matches (e.g., \"git\" for \"github.com\")",
                    "Press Ctrl+F for content search",
                ])
        } else {
            Notice::new(NoticeKind::Instructions, "Search your tabs")
                .subtitle("Start typing to search by title and domain")
                .tips(&[
                    "Search by tab title or website name",
                    "Use ↑↓ to navigate, Enter to switch",
                    "Press Ctrl+F for content search",
                    "Press Esc to close",
                ])
        };
        return vec![Row::Notice(notice)];
    }

    let items = if state.group_by_domain {
        with_host_headers(&state.filtered_tabs)
    } else {
        without_headers(&state.filtered_tabs)
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            GroupedListItem::SectionHeader(host) => Some(Row::Header { host }),
            GroupedListItem::Item(index) => state.filtered_tabs.get(index).map(|tab| {
                Row::Tab(tab_row(index, tab, query, index == state.selected_index))
            }),
        })
        .collect()
}

fn content_rows(state: &PaletteState, query: &str) -> Vec<Row> {
    if let PaletteStatus::Searching(progress) = &state.status {
        if state.is_searching() {
            let mut notice = Notice::new(NoticeKind::Searching, "Searching page content...");
            if progress.total > 0 {
                notice = notice.subtitle(format!(
                    "Searching tabs... ({}/{})",
                    progress.searched, progress.total
                ));
            }
            return vec![Row::Notice(notice)];
        }
    }
    if query.is_empty() {
        return vec![Row::Notice(
            Notice::new(NoticeKind::Instructions, "Search page content")
                .subtitle("Find text inside your open tabs")
                .tips(&[
                    "Type any word or phrase to search",
                    "Searches across all open tabs",
                    "Shows content previews with matches",
                    "Press Ctrl+P for tab search",
                ]),
        )];
    }
    if state.content_results.is_empty() {
        return vec![Row::Notice(
            Notice::new(NoticeKind::NoResults, "No content matches found")
                .subtitle(format!("No pages contain \"{}\"", query))
                .tips(&[
                    "Try different keywords or phrases",
                    "Check spelling and try partial matches",
                    "Content search looks inside page text",
                    "Press Ctrl+P for tab title search",
                ]),
        )];
    }
    state
        .content_results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            Row::Content(content_row(index, result, query, index == state.selected_index))
        })
        .collect()
}

/// Build the complete view for `state`.
pub fn render(state: &PaletteState) -> RenderedView {
    let mut view = RenderedView {
        visible: state.is_open,
        mode: state.mode,
        placeholder: placeholder(state.mode),
        query: state.query.clone(),
        ..Default::default()
    };
    if !state.is_open {
        return view;
    }
    if state.invalidated {
        view.rows.push(Row::Notice(reloaded_notice()));
        return view;
    }

    view.footer = footer(state.mode, state.group_by_domain);
    let query = state.query.trim();

    if let PaletteStatus::Error(message) = &state.status {
        view.rows.push(Row::Notice(
            Notice::new(NoticeKind::Error, "Something went wrong").subtitle(message.clone()),
        ));
        if state.active_len() == 0 {
            return view;
        }
    }

    let rows = match state.mode {
        PaletteMode::Tabs => tab_rows(state, query),
        PaletteMode::Content => content_rows(state, query),
    };
    view.rows.extend(rows);
    view.selected_row = view
        .rows
        .iter()
        .position(|row| row.item_index() == Some(state.selected_index));
    view.scroll_to = view.selected_row;
    view
}
