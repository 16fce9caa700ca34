//! Tabs module - the tab model and tab-mode search
//!
//! # Module Structure
//!
//! - `types` - Tab, TabId, MutedInfo
//! - `url` - Host extraction and the system-page policy
//! - `filter` - Substring filtering with title-first ordering and size caps
//! - `grouping` - Host grouping and header placement

mod filter;
mod grouping;
mod types;
mod url;

pub use filter::{filter_tabs, FilterOptions};
pub use grouping::{group_by_host, with_host_headers, without_headers, GroupedListItem};
pub use types::{deserialize_tab_list, MutedInfo, Tab, TabId};
pub use self::url::{display_host, host_component, is_system_url, UNKNOWN_HOST};
