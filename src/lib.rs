//! GoFaster - a keyboard-driven command palette for browser tabs
//!
//! The palette lists, filters and groups open tabs, searches text inside
//! them, and acts on the selection (switch, pin, mute, close, highlight).
//! Everything that touches the browser goes through two seams:
//!
//! - [`directory::MessageChannel`] carries requests to the Tab Directory
//! - [`host::PageHost`] draws the palette and reads the current page
//!
//! [`memory`] provides in-memory implementations of both, used by the
//! `palette-replay` harness and the tests.

pub mod config;
pub mod directory;
pub mod error;
pub mod host;
pub mod keymap;
pub mod logging;
pub mod matcher;
pub mod memory;
pub mod palette;
pub mod protocol;
pub mod render;
pub mod scanner;
pub mod search;
pub mod tabs;

pub use error::{PaletteError, Result};
pub use palette::CommandPalette;
