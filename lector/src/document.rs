//! The host document as seen by the core.
//!
//! A structured document addresses its content by position, and not every
//! position holds text. Element boundaries, inline objects and the annotation
//! half of an annotated character all occupy a slot without contributing a
//! character. The core only needs two things from a host document:
//!
//! 1. [`DocumentContent`] - walk the units in document order
//! 2. [`DocumentEditor`] - replace a range with text
//!
//! [`LinearDocument`] is a flat in-memory implementation of both, where a unit's
//! position is its index.
//!
//! # Example
//!
//! ```text
//! Units:     <p>  T  e  h  ·  q  u  i  c  k  </p>
//! Position:   0   1  2  3  4  5  6  7  8  9   10
//! Text:           T  e  h  ·  q  u  i  c  k
//! Offset:         0  1  2  3  4  5  6  7  8
//! ```

use thiserror::Error;

/// Half-open range of document positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DocumentRange {
    pub start: usize,
    pub end: usize,
}

impl DocumentRange {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "Invalid range: start > end");
        Self { start, end }
    }

    /// Create an empty range at the given position
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this range contains the given position
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if this range contains the given range
    pub fn contains_range(&self, other: &DocumentRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this range shares at least one position with another range
    pub fn intersects(&self, other: DocumentRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Move both ends by `delta`, saturating at zero.
    pub fn offset_by(&self, delta: isize) -> DocumentRange {
        DocumentRange::new(
            self.start.saturating_add_signed(delta),
            self.end.saturating_add_signed(delta),
        )
    }
}

impl From<std::ops::Range<usize>> for DocumentRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// One slot of structured document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentUnit {
    /// A bare character.
    Char(char),
    /// The character half of a character-plus-annotation pair.
    AnnotatedChar(char),
    /// The annotation half of a character-plus-annotation pair.
    AnnotationTail,
    /// Opening or closing marker of a structural element.
    Structural,
    /// Image, template or any other inline node without text.
    InlineObject,
}

impl ContentUnit {
    /// The character this unit contributes to plain text, if any.
    pub fn text(&self) -> Option<char> {
        match self {
            ContentUnit::Char(c) | ContentUnit::AnnotatedChar(c) => Some(*c),
            ContentUnit::AnnotationTail | ContentUnit::Structural | ContentUnit::InlineObject => {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedUnit {
    pub position: usize,
    pub unit: ContentUnit,
}

/// Read access to a host document's content.
pub trait DocumentContent {
    /// Units in document order. Positions must be non-decreasing.
    fn units(&self) -> Box<dyn Iterator<Item = PositionedUnit> + '_>;
}

/// Errors a host document reports when it cannot apply an edit.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Document rejected the edit: {0}")]
    Rejected(String),
}

/// Write access to a host document.
pub trait DocumentEditor {
    /// Replace `range` with `text` and return the range the new text occupies.
    ///
    /// Implementations apply the edit synchronously; the core reads positions
    /// again right after this returns.
    fn replace_range(
        &mut self,
        range: DocumentRange,
        text: &str,
    ) -> Result<DocumentRange, EditError>;
}

/// Flat in-memory document. A unit's position is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearDocument {
    units: Vec<ContentUnit>,
}

impl LinearDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding `text` with no structure around it.
    pub fn from_text(text: &str) -> Self {
        Self::new().text(text)
    }

    pub fn from_units(units: Vec<ContentUnit>) -> Self {
        Self { units }
    }

    /// Append bare characters.
    pub fn text(mut self, text: &str) -> Self {
        self.units.extend(text.chars().map(ContentUnit::Char));
        self
    }

    /// Append characters that each carry an annotation (two slots per character).
    pub fn annotated(mut self, text: &str) -> Self {
        for c in text.chars() {
            self.units.push(ContentUnit::AnnotatedChar(c));
            self.units.push(ContentUnit::AnnotationTail);
        }
        self
    }

    pub fn open(mut self) -> Self {
        self.units.push(ContentUnit::Structural);
        self
    }

    pub fn close(mut self) -> Self {
        self.units.push(ContentUnit::Structural);
        self
    }

    pub fn inline_object(mut self) -> Self {
        self.units.push(ContentUnit::InlineObject);
        self
    }

    /// Append `text` wrapped in an opening and closing marker.
    pub fn paragraph(self, text: &str) -> Self {
        self.open().text(text).close()
    }

    pub fn units_slice(&self) -> &[ContentUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Text carried by the units in `range`, structure dropped.
    pub fn text_in(&self, range: DocumentRange) -> String {
        self.units
            .get(range.start..range.end.min(self.units.len()))
            .unwrap_or_default()
            .iter()
            .filter_map(ContentUnit::text)
            .collect()
    }
}

impl DocumentContent for LinearDocument {
    fn units(&self) -> Box<dyn Iterator<Item = PositionedUnit> + '_> {
        Box::new(
            self.units
                .iter()
                .enumerate()
                .map(|(position, unit)| PositionedUnit {
                    position,
                    unit: *unit,
                }),
        )
    }
}

impl DocumentEditor for LinearDocument {
    fn replace_range(
        &mut self,
        range: DocumentRange,
        text: &str,
    ) -> Result<DocumentRange, EditError> {
        if range.end > self.units.len() {
            return Err(EditError::OutOfBounds {
                start: range.start,
                end: range.end,
                len: self.units.len(),
            });
        }

        let inserted: Vec<ContentUnit> = text.chars().map(ContentUnit::Char).collect();
        let inserted_len = inserted.len();
        self.units.splice(range.start..range.end, inserted);
        Ok(DocumentRange::new(range.start, range.start + inserted_len))
    }
}
