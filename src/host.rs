//! The page the palette lives in
//!
//! A [`PageHost`] owns everything tied to "this page": reading its text,
//! highlighting inside it, showing the palette overlay, and waiting.

use std::time::Duration;

use crate::render::RenderedView;
use crate::scanner::{HighlightSpan, PageSnapshot};

#[allow(async_fn_in_trait)]
pub trait PageHost {
    /// Current text content of this page
    fn snapshot(&self) -> PageSnapshot;

    /// Wrap `spans` in highlight marks, scroll the first into view, and
    /// remove the marks after `duration`.
    fn highlight(&self, spans: &[HighlightSpan], duration: Duration);

    /// Replace whatever the overlay shows with `view`.
    fn present(&self, view: &RenderedView);

    /// Hide the overlay.
    fn dismiss(&self);

    /// Suspend for `duration` without blocking the page.
    async fn sleep(&self, duration: Duration);
}
