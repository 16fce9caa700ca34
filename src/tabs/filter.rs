//! Tab-mode filtering
//!
//! Substring matching over title, URL and hostname with a title-first stable
//! ordering, optional host grouping, and a result cap that only kicks in for
//! pathological tab counts.

use tracing::{debug, instrument};

use crate::config::FilterConfig;
use crate::matcher::{contains_ignore_case, fold_case};

use super::grouping::group_by_host;
use super::types::Tab;

/// Knobs for [`filter_tabs`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub group_by_domain: bool,
    /// The cap is only enforced when more candidates than this remain
    pub large_tab_threshold: usize,
    /// Cap applied with an empty query
    pub unfiltered_cap: usize,
    /// Cap applied with a non-empty query
    pub filtered_cap: usize,
}

impl FilterOptions {
    pub fn from_config(config: &FilterConfig, group_by_domain: bool) -> Self {
        FilterOptions {
            group_by_domain,
            large_tab_threshold: config.large_tab_threshold,
            unfiltered_cap: config.unfiltered_cap,
            filtered_cap: config.filtered_cap,
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default(), false)
    }
}

/// Compute the tab-mode result list.
///
/// - Tabs without an id are dropped.
/// - Empty query: every valid tab, original order.
/// - Otherwise: tabs whose title, URL or host contains the query
///   (case-insensitive), title matches first, ties in original order.
/// - Grouping re-orders by host, then title.
/// - Only when more than `large_tab_threshold` candidates remain is the list
///   cut to `unfiltered_cap` / `filtered_cap`.
#[instrument(level = "debug", skip_all, fields(tab_count = tabs.len(), query_len = query.len()))]
pub fn filter_tabs(tabs: &[Tab], query: &str, options: &FilterOptions) -> Vec<Tab> {
    let query = query.trim();
    let valid = tabs.iter().filter(|tab| tab.is_valid());

    let mut candidates: Vec<Tab> = if query.is_empty() {
        valid.cloned().collect()
    } else {
        let query_lower = fold_case(query);
        let mut scored: Vec<(bool, &Tab)> = valid
            .filter_map(|tab| {
                let in_title = contains_ignore_case(&tab.title, &query_lower);
                let matched = in_title
                    || contains_ignore_case(&tab.url, &query_lower)
                    || tab
                        .host()
                        .is_some_and(|host| contains_ignore_case(&host, &query_lower));
                matched.then_some((in_title, tab))
            })
            .collect();
        // Stable: equal keys keep their relative order
        scored.sort_by_key(|(in_title, _)| !*in_title);
        scored.into_iter().map(|(_, tab)| tab.clone()).collect()
    };

    if options.group_by_domain {
        candidates = group_by_host(candidates);
    }

    if candidates.len() > options.large_tab_threshold {
        let cap = if query.is_empty() {
            options.unfiltered_cap
        } else {
            options.filtered_cap
        };
        debug!(
            candidates = candidates.len(),
            cap, "Large tab set, truncating results"
        );
        candidates.truncate(cap);
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabs::TabId;

    fn ids(tabs: &[Tab]) -> Vec<i64> {
        tabs.iter().filter_map(|t| t.id.map(|id| id.0)).collect()
    }

    fn sample_tabs() -> Vec<Tab> {
        vec![
            Tab::new(1, "GitHub Repo", "https://github.com/x"),
            Tab::new(2, "SO Question", "https://stackoverflow.com/q/1"),
            Tab::new(3, "Rust docs", "https://doc.rust-lang.org/std"),
            Tab::new(4, "Issue tracker", "https://github.com/x/issues"),
        ]
    }

    #[test]
    fn test_scenario_a_title_query() {
        let tabs = sample_tabs()[..2].to_vec();
        let result = filter_tabs(&tabs, "GitHub", &FilterOptions::default());
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_scenario_b_empty_query_keeps_order() {
        let tabs = sample_tabs();
        let result = filter_tabs(&tabs, "", &FilterOptions::default());
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_title_matches_precede_url_matches() {
        let tabs = sample_tabs();
        // Tab 4 matches only by URL/host, tab 1 by title and URL
        let mut reordered = vec![tabs[3].clone(), tabs[0].clone()];
        reordered.push(Tab::new(9, "github notes", "https://notes.example.com"));
        let result = filter_tabs(&reordered, "github", &FilterOptions::default());
        assert_eq!(ids(&result), vec![1, 9, 4]);
    }

    #[test]
    fn test_matches_by_host_and_url() {
        let tabs = sample_tabs();
        assert_eq!(
            ids(&filter_tabs(&tabs, "stackoverflow", &FilterOptions::default())),
            vec![2]
        );
        assert_eq!(
            ids(&filter_tabs(&tabs, "/issues", &FilterOptions::default())),
            vec![4]
        );
    }

    #[test]
    fn test_no_matches_and_empty_input() {
        assert!(filter_tabs(&sample_tabs(), "zzz", &FilterOptions::default()).is_empty());
        assert!(filter_tabs(&[], "", &FilterOptions::default()).is_empty());
    }

    #[test]
    fn test_invalid_tabs_are_excluded() {
        let mut tabs = sample_tabs();
        tabs.push(Tab {
            id: None,
            title: "GitHub ghost".to_string(),
            ..Default::default()
        });
        let result = filter_tabs(&tabs, "", &FilterOptions::default());
        assert_eq!(result.len(), 4);
        let result = filter_tabs(&tabs, "ghost", &FilterOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_every_result_contains_query() {
        let tabs = sample_tabs();
        for query in ["git", "RUST", "q/1", "x", "org"] {
            let lower = query.to_lowercase();
            for tab in filter_tabs(&tabs, query, &FilterOptions::default()) {
                let host = tab.host().unwrap_or_default();
                assert!(
                    tab.title.to_lowercase().contains(&lower)
                        || tab.url.to_lowercase().contains(&lower)
                        || host.contains(&lower),
                    "{:?} does not match {}",
                    tab,
                    query
                );
            }
        }
    }

    #[test]
    fn test_filter_is_deterministic() {
        let tabs = sample_tabs();
        let first = filter_tabs(&tabs, "g", &FilterOptions::default());
        let second = filter_tabs(&tabs, "g", &FilterOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_grouping_orders_by_host_then_title() {
        let tabs = sample_tabs();
        let options = FilterOptions {
            group_by_domain: true,
            ..Default::default()
        };
        let result = filter_tabs(&tabs, "", &options);
        // doc.rust-lang.org < github.com < stackoverflow.com; titles sorted within github.com
        assert_eq!(ids(&result), vec![3, 1, 4, 2]);

        let ungrouped = filter_tabs(&tabs, "", &FilterOptions::default());
        assert_eq!(ids(&ungrouped), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cap_only_applies_to_large_sets() {
        let many: Vec<Tab> = (1..=100)
            .map(|i| Tab::new(i, format!("Tab {}", i), format!("https://site{}.com", i)))
            .collect();
        let options = FilterOptions::default();
        assert_eq!(filter_tabs(&many, "", &options).len(), 10);
        assert_eq!(filter_tabs(&many, "tab", &options).len(), 20);
        assert_eq!(filter_tabs(&many, "site1", &options).len(), 12);

        let fifty: Vec<Tab> = many[..50].to_vec();
        assert_eq!(filter_tabs(&fifty, "", &options).len(), 50);
        assert_eq!(filter_tabs(&many, "", &options)[0].id, Some(TabId(1)));
    }
}
