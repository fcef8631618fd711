// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// A selected range together with the end it was started from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    end: usize,
    anchor: usize,
}

impl Selection {
    /// A collapsed selection at `index`.
    pub fn caret(index: usize) -> Self {
        Self {
            start: index,
            end: index,
            anchor: index,
        }
    }

    /// Selects `start..end`, ordering the ends, anchored at `anchor`.
    ///
    /// The anchor is clamped into the range.
    pub fn new(start: usize, end: usize, anchor: usize) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            start,
            end,
            anchor: anchor.clamp(start, end),
        }
    }

    /// First selected offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last selected offset.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The fixed end of the selection.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// The end that moves when the selection is extended.
    pub fn focus(&self) -> usize {
        if self.anchor == self.end {
            self.start
        } else {
            self.end
        }
    }

    /// Number of selected characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the selection is a caret.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// The selected offsets.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The externally visible state of an [`Editor`](super::Editor).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EditState {
    /// Not editing.
    Inactive,
    /// A caret is placed and nothing is selected.
    ActiveCaret,
    /// A range is selected by dragging, shift-clicking or the keyboard.
    ActiveRangeSelection,
    /// A range is selected by whole words, after a double click.
    ActiveWordSelection,
    /// An external drag is in progress; neither caret nor selection show.
    ActiveTableDrag,
    /// Just activated; the first character typed replaces the whole text.
    PendingFirstInput,
}
