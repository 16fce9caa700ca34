//! Message protocol between the palette and the Tab Directory
//!
//! Requests and notifications are JSON objects tagged by an `action` field.
//!
//! # Requests (palette → Tab Directory)
//! - `getTabs` / `getCurrentTab`: tab queries
//! - `switchToTab`, `pinTab`, `muteTab`, `closeTab`: tab mutations
//! - `searchContent`: scan another tab's text
//! - `highlightInTab`: highlight a query inside another tab
//!
//! # Notifications (Tab Directory → palette)
//! - `openPalette` (legacy `openCommandPalette`)
//! - `tabsChanged` (legacy `updateTabs`)
//!
//! # Module Structure
//!
//! - `types`: PaletteMode and the typed reply shapes
//! - `message`: The Request and Notification enums
//! - `io`: Reply decoding, graceful notification parsing, JSONL reading

mod io;
mod message;
mod types;

pub use io::*;
pub use message::*;
pub use types::*;
