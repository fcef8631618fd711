// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers for the character-indexed text model.

/// Number of characters (Unicode scalar values) in `text`.
pub(crate) fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at `char_index`, or `text.len()` past the end.
pub(crate) fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

/// The characters `start..start + len` of `text`, clamped to its end.
pub(crate) fn char_slice(text: &str, start: usize, len: usize) -> &str {
    let from = byte_offset(text, start);
    let rest = &text[from..];
    &rest[..byte_offset(rest, len)]
}

/// Whitespace as understood by the run splitter and word breaker.
pub(crate) fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

pub(crate) fn nearly_eq(x: f32, y: f32) -> bool {
    (x - y).abs() < f32::EPSILON
}
