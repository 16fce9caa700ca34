//! Per-tab content scanner
//!
//! A page is modeled as the sequence of text nodes a DOM tree walker would
//! yield. Scanning only reads the snapshot; highlighting is planned here and
//! carried out by the page host.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::SearchConfig;
use crate::matcher::{extract_context, find_all_occurrences, fold_case};

/// Parent elements whose text is never user-visible content
const SKIPPED_PARENT_TAGS: &[&str] = &["script", "style", "noscript", "head"];

/// One text node of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub text: String,
    /// Lowercase tag name of the parent element, e.g. `"p"`
    #[serde(default)]
    pub parent_tag: String,
    /// Rendered invisibly (`display:none`, `visibility:hidden`, zero size)
    #[serde(default)]
    pub hidden: bool,
}

impl TextNode {
    pub fn visible(text: impl Into<String>, parent_tag: impl Into<String>) -> Self {
        TextNode {
            text: text.into(),
            parent_tag: parent_tag.into(),
            hidden: false,
        }
    }

    fn is_searchable(&self) -> bool {
        !self.hidden
            && !SKIPPED_PARENT_TAGS
                .iter()
                .any(|tag| self.parent_tag.eq_ignore_ascii_case(tag))
            && !self.text.trim().is_empty()
    }
}

/// Text content of one page at the moment of the scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// `None` while the document has no body yet
    #[serde(default)]
    pub body: Option<Vec<TextNode>>,
}

/// A materialized hit with its surrounding text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMatch {
    pub context: String,
    /// Byte offset of the hit within its text node
    pub match_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// At most `max_matches` entries, in document order
    pub matches: Vec<ContentMatch>,
    /// Every hit on the page, uncapped
    pub total_matches: usize,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.total_matches == 0
    }
}

/// Scanner knobs, usually taken from [`SearchConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub max_matches: usize,
    pub context_radius: usize,
    pub min_query_len: usize,
}

impl From<&SearchConfig> for ScanLimits {
    fn from(config: &SearchConfig) -> Self {
        ScanLimits {
            max_matches: config.max_matches_per_tab,
            context_radius: config.context_radius,
            min_query_len: config.min_query_len,
        }
    }
}

impl Default for ScanLimits {
    fn default() -> Self {
        ScanLimits::from(&SearchConfig::default())
    }
}

/// Normalized query, or `None` when it is too short to search for
fn prepare_query(query: &str, min_query_len: usize) -> Option<String> {
    let query = query.trim();
    if query.chars().count() < min_query_len {
        return None;
    }
    Some(fold_case(query).into_owned())
}

/// Scan one page for `query`.
///
/// Short queries and pages without a body produce an empty result, never an
/// error.
#[instrument(level = "debug", skip_all, fields(url = %page.url, query_len = query.len()))]
pub fn scan(page: &PageSnapshot, query: &str, limits: &ScanLimits) -> ScanResult {
    let mut result = ScanResult::default();
    let Some(needle) = prepare_query(query, limits.min_query_len) else {
        return result;
    };
    let Some(body) = page.body.as_ref() else {
        debug!("Page has no body, nothing to scan");
        return result;
    };

    for node in body.iter().filter(|node| node.is_searchable()) {
        let haystack = fold_case(&node.text);
        for index in find_all_occurrences(&haystack, &needle) {
            result.total_matches += 1;
            if result.matches.len() < limits.max_matches {
                result.matches.push(ContentMatch {
                    context: extract_context(
                        &node.text,
                        index,
                        needle.len(),
                        limits.context_radius,
                    ),
                    match_index: index,
                });
            }
        }
    }

    debug!(
        total_matches = result.total_matches,
        kept = result.matches.len(),
        "Scan complete"
    );
    result
}

/// A byte range inside one text node to wrap in a highlight mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSpan {
    /// Index into `PageSnapshot::body`
    pub node_index: usize,
    pub start: usize,
    pub end: usize,
}

/// Every span the page host should highlight for `query`.
/// The first span is the scroll target.
pub fn plan_highlights(page: &PageSnapshot, query: &str, min_query_len: usize) -> Vec<HighlightSpan> {
    let Some(needle) = prepare_query(query, min_query_len) else {
        return Vec::new();
    };
    let Some(body) = page.body.as_ref() else {
        return Vec::new();
    };

    body.iter()
        .enumerate()
        .filter(|(_, node)| node.is_searchable())
        .flat_map(|(node_index, node)| {
            let haystack = fold_case(&node.text);
            find_all_occurrences(&haystack, &needle)
                .map(|start| HighlightSpan {
                    node_index,
                    start,
                    end: start + needle.len(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(nodes: Vec<TextNode>) -> PageSnapshot {
        PageSnapshot {
            title: "Test".to_string(),
            url: "https://example.com".to_string(),
            body: Some(nodes),
        }
    }

    #[test]
    fn test_scenario_c_non_overlapping_count() {
        let page = page(vec![TextNode::visible("abab", "p")]);
        let result = scan(&page, "ab", &ScanLimits::default());
        assert_eq!(result.total_matches, 2);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].match_index, 0);
        assert_eq!(result.matches[1].match_index, 2);
    }

    #[test]
    fn test_short_query_has_no_matches() {
        let page = page(vec![TextNode::visible("aaaa", "p")]);
        assert!(scan(&page, "a", &ScanLimits::default()).is_empty());
        assert!(scan(&page, "", &ScanLimits::default()).is_empty());
        // Trimmed before the length check
        assert!(scan(&page, " a ", &ScanLimits::default()).is_empty());
    }

    #[test]
    fn test_no_body_is_empty_result() {
        let page = PageSnapshot {
            body: None,
            ..Default::default()
        };
        assert_eq!(scan(&page, "error", &ScanLimits::default()), ScanResult::default());
    }

    #[test]
    fn test_skips_hidden_script_and_blank_nodes() {
        let page = page(vec![
            TextNode::visible("var error = 1;", "script"),
            TextNode::visible(".error { color: red }", "STYLE"),
            TextNode::visible("error", "noscript"),
            TextNode::visible("error page", "head"),
            TextNode {
                text: "hidden error".to_string(),
                parent_tag: "div".to_string(),
                hidden: true,
            },
            TextNode::visible("   ", "p"),
            TextNode::visible("A visible Error here", "p"),
        ]);
        let result = scan(&page, "error", &ScanLimits::default());
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.matches[0].context, "A visible Error here");
        assert_eq!(result.matches[0].match_index, 10);
    }

    #[test]
    fn test_total_is_uncapped_but_matches_are_capped() {
        let page = page(vec![
            TextNode::visible("err err err", "p"),
            TextNode::visible("err and err", "li"),
        ]);
        let result = scan(&page, "err", &ScanLimits::default());
        assert_eq!(result.total_matches, 5);
        assert_eq!(result.matches.len(), 3);
    }

    #[test]
    fn test_context_window_uses_radius() {
        let text = format!("{}needle{}", "x".repeat(60), "y".repeat(60));
        let page = page(vec![TextNode::visible(text, "p")]);
        let result = scan(&page, "NEEDLE", &ScanLimits::default());
        let context = &result.matches[0].context;
        assert_eq!(context.len(), 40 + 6 + 40);
        assert!(context.starts_with('x') && context.ends_with('y'));
        assert!(context.contains("needle"));
    }

    #[test]
    fn test_limits_from_config() {
        let config = SearchConfig {
            max_matches_per_tab: 1,
            context_radius: 2,
            min_query_len: 3,
            ..Default::default()
        };
        let limits = ScanLimits::from(&config);
        let page = page(vec![TextNode::visible("abc abc abc", "p")]);
        assert!(scan(&page, "ab", &limits).is_empty());
        let result = scan(&page, "abc", &limits);
        assert_eq!(result.total_matches, 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].context, "abc a");
    }

    #[test]
    fn test_plan_highlights_spans() {
        let page = page(vec![
            TextNode::visible("skip error", "script"),
            TextNode::visible("Error one, error two", "p"),
            TextNode::visible("no hit", "p"),
            TextNode::visible("last ERROR", "span"),
        ]);
        let spans = plan_highlights(&page, "error", 2);
        assert_eq!(
            spans,
            vec![
                HighlightSpan { node_index: 1, start: 0, end: 5 },
                HighlightSpan { node_index: 1, start: 11, end: 16 },
                HighlightSpan { node_index: 3, start: 5, end: 10 },
            ]
        );
        assert!(plan_highlights(&page, "e", 2).is_empty());
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{"url": "https://a.com", "body": [{"text": "hello"}]}"#;
        let page: PageSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(page.title, "");
        let body = page.body.unwrap();
        assert_eq!(body[0].parent_tag, "");
        assert!(!body[0].hidden);
    }
}
