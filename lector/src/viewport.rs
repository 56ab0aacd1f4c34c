//! Choosing which results to draw.
//!
//! Drawing a highlight costs the host a layout query per entry, so large result
//! sets are clipped to the part of the document on screen. Small sets are drawn
//! whole.

use crate::{document::DocumentRange, result_set::ResultEntry};
use std::ops::Range;
use tracing::trace;

/// Result sets at or below this size are never clipped.
pub const DEFAULT_CLIP_THRESHOLD: usize = 50;

/// More entries than this in the clipped window and only the focused one is drawn.
pub const DEFAULT_MAX_RENDERED_RESULTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSelector {
    clip_threshold: usize,
    render_cap: usize,
}

impl Default for ViewportSelector {
    fn default() -> Self {
        Self::new(DEFAULT_CLIP_THRESHOLD, DEFAULT_MAX_RENDERED_RESULTS)
    }
}

impl ViewportSelector {
    pub fn new(clip_threshold: usize, render_cap: usize) -> Self {
        Self {
            clip_threshold,
            render_cap,
        }
    }

    /// Index range of `entries` to draw.
    ///
    /// Sets no larger than the clip threshold are drawn whole. Above it, and with
    /// a known `visible` range, entries entirely before or after it are left out.
    /// If what remains is still over the render cap, or is empty, only the
    /// focused entry is drawn.
    pub fn select(
        &self,
        entries: &[ResultEntry],
        focused_index: usize,
        visible: Option<DocumentRange>,
    ) -> Range<usize> {
        if entries.len() <= self.clip_threshold {
            return 0..entries.len();
        }
        let window = match visible {
            Some(visible) => clip(entries, visible),
            None => 0..entries.len(),
        };

        if window.is_empty() || window.len() > self.render_cap {
            let focused = focused_index.min(entries.len() - 1);
            trace!(?window, focused, "collapsing render window to focused result");
            return focused..focused + 1;
        }
        window
    }
}

/// [`ViewportSelector::select`] with the default clip threshold.
pub fn select_render_subset(
    entries: &[ResultEntry],
    focused_index: usize,
    visible: Option<DocumentRange>,
    render_cap: usize,
) -> Range<usize> {
    ViewportSelector::new(DEFAULT_CLIP_THRESHOLD, render_cap).select(entries, focused_index, visible)
}

// Entries are in document order, so everything before the window is a prefix
// and the first entry past it ends the scan.
fn clip(entries: &[ResultEntry], visible: DocumentRange) -> Range<usize> {
    let mut start = 0;
    let mut end = entries.len();
    for (i, entry) in entries.iter().enumerate() {
        if entry.range.end <= visible.start {
            start = i + 1;
            continue;
        }
        if entry.range.start >= visible.end {
            end = i;
            break;
        }
    }
    start..end.max(start)
}
