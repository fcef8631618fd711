// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Rich error type for operations that accept input from outside the engine.
///
/// Editing operations clamp their ranges and never fail; this type is only
/// produced when validating a [`TextRange`](crate::TextRange) or restoring a
/// [`RuntimeText`](crate::RuntimeText) from a persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The start of the offending range, or the offending index.
    start: usize,

    /// The end (exclusive) of the offending range.
    end: usize,

    /// The reference length at the time of failure.
    ///
    /// For range errors this is the text length in characters; for snapshot
    /// errors it is the length of the collection the index was checked against.
    len: usize,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`Error::len` reports source length context; an `is_empty` method would be misleading and unused."
)]
impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The start of the range provided by the caller.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end of the range provided by the caller.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The reference length at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn invalid_bounds(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidBounds,
            start,
            end,
            len,
        }
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            start,
            end,
            len,
        }
    }

    pub(crate) fn style_count_mismatch(styles: usize, chars: usize) -> Self {
        Self {
            kind: ErrorKind::StyleCountMismatch,
            start: 0,
            end: styles,
            len: chars,
        }
    }

    pub(crate) fn unknown_style(index: usize, id: u32, table_len: usize) -> Self {
        Self {
            kind: ErrorKind::UnknownStyle,
            start: index,
            end: id as usize,
            len: table_len,
        }
    }

    pub(crate) fn paragraph_count_mismatch(styles: usize, paragraphs: usize) -> Self {
        Self {
            kind: ErrorKind::ParagraphCountMismatch,
            start: 0,
            end: styles,
            len: paragraphs,
        }
    }

    pub(crate) fn empty_style_table() -> Self {
        Self {
            kind: ErrorKind::EmptyStyleTable,
            start: 0,
            end: 0,
            len: 0,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::InvalidBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.start, self.end, self.len
            ),
            ErrorKind::InvalidRange => {
                write!(f, "invalid range {}..{}: start > end", self.start, self.end)
            }
            ErrorKind::StyleCountMismatch => write!(
                f,
                "{} character styles given for {} characters",
                self.end, self.len
            ),
            ErrorKind::UnknownStyle => write!(
                f,
                "character {} refers to style {} but the table holds {} styles",
                self.start, self.end, self.len
            ),
            ErrorKind::ParagraphCountMismatch => write!(
                f,
                "{} paragraph styles given for {} paragraphs",
                self.end, self.len
            ),
            ErrorKind::EmptyStyleTable => write!(f, "style table is empty"),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Provided range indices were out of bounds relative to the text length.
    InvalidBounds,

    /// The provided range had `start > end`.
    InvalidRange,

    /// A snapshot's per-character style list does not match its text length.
    StyleCountMismatch,

    /// A snapshot refers to a style id that is not in its style table.
    UnknownStyle,

    /// A snapshot's paragraph style list does not match its paragraph count.
    ParagraphCountMismatch,

    /// A snapshot carries no styles at all.
    EmptyStyleTable,
}
