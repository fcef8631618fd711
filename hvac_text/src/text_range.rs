// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Error, RuntimeText};

/// A validated character range into a [`RuntimeText`].
///
/// Editing operations clamp whatever they are given. `TextRange` is for
/// callers that would rather learn about a bad range than have it silently
/// adjusted, for example when copying a range chosen by a host application.
///
/// `TextRange` does not remember which text it was validated against. It is
/// the caller's responsibility to only reuse it with the same content version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Returns a validated `TextRange` for the provided text.
    pub fn new(text: &RuntimeText, range: Range<usize>) -> Result<Self, Error> {
        let len = text.len();
        if range.start > range.end {
            return Err(Error::invalid_range(range.start, range.end, len));
        }
        if range.end > len {
            return Err(Error::invalid_bounds(range.start, range.end, len));
        }
        Ok(Self {
            start: range.start,
            end: range.end,
        })
    }

    /// Creates a `TextRange` without validation.
    ///
    /// This is intended for internal callers that already maintain range invariants.
    #[must_use]
    pub(crate) const fn new_unchecked(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The start character offset.
    #[must_use]
    pub const fn start(self) -> usize {
        self.start
    }

    /// The end character offset (exclusive).
    #[must_use]
    pub const fn end(self) -> usize {
        self.end
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Whether the range covers no characters.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The range as a plain `Range<usize>`.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<TextRange> for Range<usize> {
    fn from(range: TextRange) -> Self {
        range.as_range()
    }
}
