//! Plain-text extraction and the offset map back into document positions.
//!
//! The proofreading service only ever sees flat text, and reports spans as
//! offsets into that text. Those offsets are never document positions: a
//! paragraph marker, an image or the annotation half of a styled character
//! all occupy a document position without producing text.
//!
//! [`extract`] walks a [`DocumentContent`] once and records, for every unit of
//! plain text, the document position it came from. [`OffsetMap`] answers the
//! reverse question in constant time.
//!
//! # Units
//!
//! Offsets count UTF-16 code units, which is what the service reports. A
//! character outside the Basic Multilingual Plane contributes two offsets that
//! both map to the same document position, so mapped positions are
//! non-decreasing rather than strictly increasing.
//!
//! ```text
//! Units:     <p>  a  😀  b  </p>
//! Position:   0   1   2  3   4
//! Offset:         0  1,2 3
//! Map:           [1, 2, 2, 3]   end position = 4
//! ```

use crate::{
    document::{ContentUnit, DocumentContent, DocumentRange},
    error::{OffsetOutOfRangeSnafu, Result},
};
use tracing::trace;

/// Reverse map from plain-text offset to document position.
///
/// Built once per extraction and immutable afterwards. Only valid for the
/// document state it was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    /// `positions[offset]` is the document position of that text unit.
    positions: Vec<usize>,
    /// Position right after the last text unit and any annotation tail it
    /// carries; where an offset equal to the text length lands.
    end_position: usize,
}

/// Plain text together with the map that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub map: OffsetMap,
}

/// Flatten `document` into plain text and record where every unit came from.
pub fn extract<D: DocumentContent + ?Sized>(document: &D) -> Extraction {
    let mut text = String::new();
    let mut positions = Vec::new();
    let mut end_position = 0;
    let mut after_text = false;

    for unit in document.units() {
        let Some(c) = unit.unit.text() else {
            // The annotation half of the last character belongs to the text.
            if after_text && unit.unit == ContentUnit::AnnotationTail {
                end_position = unit.position + 1;
            } else {
                after_text = false;
            }
            continue;
        };
        text.push(c);
        for _ in 0..c.len_utf16() {
            positions.push(unit.position);
        }
        end_position = unit.position + 1;
        after_text = true;
    }

    trace!(
        text_len = positions.len(),
        end_position,
        "extracted plain text"
    );

    Extraction {
        text,
        map: OffsetMap {
            positions,
            end_position,
        },
    }
}

impl OffsetMap {
    /// Length of the extracted text in offset units.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Document position of a plain-text offset.
    ///
    /// An offset equal to [`len`](Self::len) is the end of the text and maps
    /// past the last text unit. Anything larger means the offset was computed
    /// against different text than was extracted, and is refused rather than
    /// guessed at.
    pub fn to_document_offset(&self, offset: usize) -> Result<usize> {
        match self.positions.get(offset) {
            Some(position) => Ok(*position),
            None if offset == self.positions.len() => Ok(self.end_position),
            None => OffsetOutOfRangeSnafu {
                offset,
                len: self.len(),
            }
            .fail(),
        }
    }

    /// Document range covered by the span `[offset, offset + length)`.
    ///
    /// Both ends go through [`to_document_offset`](Self::to_document_offset), so
    /// the range runs up to the unit that carries the first character after the
    /// span. Anything without text in between, such as an annotation slot or a
    /// paragraph boundary, is inside the range.
    pub fn to_document_range(&self, offset: usize, length: usize) -> Result<DocumentRange> {
        let end = offset.checked_add(length).unwrap_or(usize::MAX);
        if end > self.len() {
            return OffsetOutOfRangeSnafu {
                offset: end,
                len: self.len(),
            }
            .fail();
        }

        let start = self.to_document_offset(offset)?;
        let end = self.to_document_offset(end)?;
        Ok(DocumentRange::new(start, end))
    }

    /// `(offset, position)` pairs in offset order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.positions.iter().copied().enumerate()
    }
}
