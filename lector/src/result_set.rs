//! The navigable set of active proofreading results.
//!
//! A [`ResultSet`] is built once per service response and replaced wholesale by
//! the next one; it is never merged. Between responses it changes in two ways:
//!
//! 1. **Navigation** - [`next`](ResultSet::next), [`previous`](ResultSet::previous)
//!    and [`focus_at`](ResultSet::focus_at) move the focus cursor only.
//! 2. **Consumption** - [`consume_focused`](ResultSet::consume_focused) removes the
//!    focused entry once the host has applied a replacement.
//!
//! Entry ranges are absolute document positions fixed when the set is built.
//! Removing an entry shifts the *indices* of later entries down by one and never
//! touches their ranges. If the host document renumbers positions on edit, the
//! caller re-derives the remaining ranges through
//! [`remap_ranges`](ResultSet::remap_ranges).

use crate::{
    document::DocumentRange,
    error::{EmptyResultSetSnafu, ProofreadError, Result},
    offset_map::OffsetMap,
    suggestion::Suggestion,
};
use tracing::{debug, trace, warn};

/// One surviving suggestion translated into document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub suggestion: Suggestion,
    pub range: DocumentRange,
    /// Set on the entry handed back by [`ResultSet::consume_focused`].
    pub consumed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<ResultEntry>,
    /// Meaningless while `entries` is empty; kept at 0 then.
    focused_index: usize,
}

impl ResultSet {
    /// Translate resolved suggestions into entries, failing on the first one whose
    /// span does not fit `map`.
    ///
    /// `kept` must already be disjoint and in service order; that order is kept.
    pub fn build(kept: Vec<Suggestion>, map: &OffsetMap) -> Result<Self> {
        let (set, skipped) = Self::build_partial(kept, map);
        let first = skipped.into_iter().next();
        match first {
            Some(error) => Err(error),
            None => Ok(set),
        }
    }

    /// Like [`build`](Self::build), but entries whose span does not fit `map` are
    /// left out and reported instead.
    pub fn build_partial(kept: Vec<Suggestion>, map: &OffsetMap) -> (Self, Vec<ProofreadError>) {
        let mut entries = Vec::with_capacity(kept.len());
        let mut skipped = Vec::new();

        for suggestion in kept {
            match map.to_document_range(suggestion.offset, suggestion.length) {
                Ok(range) => entries.push(ResultEntry {
                    suggestion,
                    range,
                    consumed: false,
                }),
                Err(error) => {
                    warn!(span = ?suggestion.span(), %error, "suggestion does not fit extracted text");
                    skipped.push(error);
                },
            }
        }

        debug!(entries = entries.len(), skipped = skipped.len(), "built result set");
        (Self::from_entries(entries), skipped)
    }

    /// Wrap entries that already carry document ranges. Focus starts at 0.
    pub fn from_entries(entries: Vec<ResultEntry>) -> Self {
        Self {
            entries,
            focused_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `None` when there is nothing to focus.
    pub fn focused_index(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.focused_index)
    }

    pub fn focused(&self) -> Option<&ResultEntry> {
        self.entries.get(self.focused_index)
    }

    pub fn get(&self, index: usize) -> Option<&ResultEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.entries.iter()
    }

    /// Focus the following entry, wrapping to the first. No-op when empty.
    pub fn next(&mut self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        self.focused_index = (self.focused_index + 1) % self.entries.len();
        Some(self.focused_index)
    }

    /// Focus the preceding entry, wrapping to the last. No-op when empty.
    pub fn previous(&mut self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let len = self.entries.len();
        self.focused_index = (self.focused_index + len - 1) % len;
        Some(self.focused_index)
    }

    /// Focus the entry whose range contains `selection`, if any.
    pub fn focus_at(&mut self, selection: DocumentRange) -> Option<usize> {
        let index = self
            .entries
            .iter()
            .rposition(|entry| entry.range.contains_range(&selection))?;
        self.focused_index = index;
        Some(index)
    }

    /// Remove the focused entry after the caller has written `replacement` over
    /// its range.
    ///
    /// Focus stays at the same index, clamped to the new last entry (or 0 once
    /// empty). Other entries' ranges are left alone.
    pub fn consume_focused(&mut self, replacement: &str) -> Result<ResultEntry> {
        if self.entries.is_empty() {
            return EmptyResultSetSnafu.fail();
        }

        let mut entry = self.entries.remove(self.focused_index);
        entry.consumed = true;
        self.focused_index = self
            .focused_index
            .min(self.entries.len().saturating_sub(1));

        trace!(
            range = ?entry.range,
            replacement,
            remaining = self.entries.len(),
            "consumed result"
        );
        Ok(entry)
    }

    /// Starting at the focused entry, move focus forward past every entry ending
    /// at or before `position`, wrapping to the first entry if that runs off the
    /// end.
    pub fn advance_past(&mut self, position: usize) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let mut index = self.focused_index;
        while self
            .entries
            .get(index)
            .is_some_and(|entry| entry.range.end <= position)
        {
            index += 1;
        }
        self.focused_index = index % self.entries.len();
        Some(self.focused_index)
    }

    /// Replace every entry's range with `f(range)`.
    pub fn remap_ranges(&mut self, mut f: impl FnMut(DocumentRange) -> DocumentRange) {
        for entry in &mut self.entries {
            entry.range = f(entry.range);
        }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResultEntry;
    type IntoIter = std::slice::Iter<'a, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
