// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph and style run construction.

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::style::{ParagraphStyle, StyleId, StyleTable};

/// A maximal span of characters that share one display style.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// Style of the first character in the run.
    pub style: StyleId,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
}

impl Run {
    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One paragraph: its style and the runs covering its characters.
///
/// The newline that terminates a paragraph belongs to it.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRun {
    /// Paragraph formatting.
    pub paragraph: ParagraphStyle,
    /// Character runs, in text order. Empty only while rendering is deferred.
    pub runs: SmallVec<[Run; 2]>,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters, including the terminating newline.
    pub len: usize,
}

impl StyleRun {
    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A span of characters flagged as misspelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpellSpan {
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
}

/// A span of characters bound to one data field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRun {
    /// The field id, including its unique suffix.
    pub field_id: String,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BuiltRuns {
    pub(crate) style_runs: Vec<StyleRun>,
    pub(crate) spell_spans: Vec<SpellSpan>,
    pub(crate) field_runs: Vec<FieldRun>,
}

/// Splits `text` into paragraphs and each paragraph into style runs.
///
/// When `with_runs` is false only the paragraph partition is computed.
pub(crate) fn build_style_runs(
    text: &str,
    char_styles: &[StyleId],
    styles: &StyleTable,
    paragraphs: &[ParagraphStyle],
    empty_style: StyleId,
    with_runs: bool,
) -> BuiltRuns {
    let style_at = |offset: usize| match char_styles.len() {
        0 => empty_style,
        n => char_styles[offset.min(n - 1)],
    };
    let paragraph_style = |index: usize| {
        paragraphs
            .get(index)
            .or_else(|| paragraphs.first())
            .cloned()
            .unwrap_or_default()
    };

    let mut built = BuiltRuns::default();
    let mut para_start = 0;
    let mut para_len = 0;
    let mut spans = Vec::new();
    for c in text.chars() {
        para_len += 1;
        if c == '\n' {
            spans.push((para_start, para_len));
            para_start += para_len;
            para_len = 0;
        }
    }
    spans.push((para_start, para_len));

    for (index, (start, len)) in spans.into_iter().enumerate() {
        let mut style_run = StyleRun {
            paragraph: paragraph_style(index),
            runs: SmallVec::new(),
            start,
            len,
        };
        if with_runs {
            if len == 0 {
                style_run.runs.push(Run {
                    style: style_at(start),
                    start,
                    len: 0,
                });
            }
            let mut spell: Option<SpellSpan> = None;
            let mut field: Option<FieldRun> = None;
            for offset in start..start + len {
                let id = style_at(offset);
                let style = styles.resolve(id);
                match style_run.runs.last_mut() {
                    Some(run) if styles.resolve(run.style).equals_ignoring_spell(style) => {
                        run.len += 1;
                    }
                    _ => style_run.runs.push(Run {
                        style: id,
                        start: offset,
                        len: 1,
                    }),
                }

                if style.spell_error {
                    match spell.as_mut() {
                        Some(span) => span.len += 1,
                        None => {
                            spell = Some(SpellSpan {
                                start: offset,
                                len: 1,
                            });
                        }
                    }
                } else if let Some(span) = spell.take() {
                    built.spell_spans.push(span);
                }

                match (&style.data_field, field.as_mut()) {
                    (Some(id), Some(run)) if *id == run.field_id => run.len += 1,
                    (Some(id), _) => {
                        if let Some(run) = field.take() {
                            built.field_runs.push(run);
                        }
                        field = Some(FieldRun {
                            field_id: id.clone(),
                            start: offset,
                            len: 1,
                        });
                    }
                    (None, _) => {
                        if let Some(run) = field.take() {
                            built.field_runs.push(run);
                        }
                    }
                }
            }
            built.spell_spans.extend(spell);
            built.field_runs.extend(field);
        }
        built.style_runs.push(style_run);
    }
    built
}
