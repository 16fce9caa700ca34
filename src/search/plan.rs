//! Which tabs a content search visits, and in what order

use crate::tabs::{is_system_url, Tab, TabId};

/// Ordered scan targets. The current tab, when scannable, comes first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPlan {
    /// Scanned in-process through the page host
    pub current: Option<Tab>,
    /// Scanned by delegating to the Tab Directory, in directory order
    pub others: Vec<Tab>,
}

impl ScanPlan {
    pub fn len(&self) -> usize {
        self.others.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Targets in scan order, paired with "is this page"
    pub fn targets(&self) -> impl Iterator<Item = (&Tab, bool)> {
        self.current
            .iter()
            .map(|tab| (tab, true))
            .chain(self.others.iter().map(|tab| (tab, false)))
    }
}

/// Pick the tab hosting the palette: the directory's answer when it has one,
/// otherwise the first active tab.
pub fn resolve_current(tabs: &[Tab], reported: Option<&Tab>) -> Option<TabId> {
    reported
        .and_then(|tab| tab.id)
        .or_else(|| tabs.iter().find(|tab| tab.active).and_then(|tab| tab.id))
}

/// Build the scan plan.
///
/// Invalid tabs and system pages are dropped before anything else; the
/// total is capped at `max_tabs`, current tab included.
pub fn plan_scan(
    tabs: &[Tab],
    current: Option<TabId>,
    max_tabs: usize,
    system_prefixes: &[String],
) -> ScanPlan {
    let scannable = tabs
        .iter()
        .filter(|tab| tab.is_valid() && !is_system_url(&tab.url, system_prefixes));

    let mut plan = ScanPlan::default();
    if max_tabs == 0 {
        return plan;
    }
    for tab in scannable {
        if plan.len() >= max_tabs && plan.current.is_some() {
            break;
        }
        if current.is_some() && tab.id == current && plan.current.is_none() {
            plan.current = Some(tab.clone());
        } else {
            plan.others.push(tab.clone());
        }
    }
    let room = max_tabs - usize::from(plan.current.is_some());
    plan.others.truncate(room);
    plan
}
