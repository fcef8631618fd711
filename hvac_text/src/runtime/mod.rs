// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The authoritative text model.
//!
//! [`RuntimeText`] owns a text buffer together with one [`StyleId`] per
//! character, the [`StyleTable`] those ids index, one [`ParagraphStyle`] per
//! paragraph and the list of hyperlink targets. Every public operation keeps
//! `char_styles().len() == len()` and leaves the derived [`StyleRun`]s
//! partitioning the whole text.

mod data_field;
mod hyperlink;
mod spelling;
mod transfer;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use hashbrown::HashMap;

use crate::runs::{FieldRun, SpellSpan, StyleRun, build_style_runs};
use crate::style::{ParagraphPatch, ParagraphStyle, Style, StyleId, StylePatch, StyleTable};
use crate::util::{byte_offset, char_count, char_slice};
use crate::words::WordList;

pub use data_field::{DataFieldSpan, base_field_id};
pub use hyperlink::Hyperlink;
pub use transfer::{PersistedText, RuntimeSnippet, SnippetParagraph};

/// How text inserted by [`RuntimeText::set_text`] is styled.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TextStyleArg {
    /// Continue the style of the surrounding text.
    #[default]
    Inherit,
    /// Use this exact style.
    Id(StyleId),
    /// Continue the surrounding style with these changes applied.
    Patch(StylePatch),
}

/// A styled, paragraph-structured text buffer.
///
/// All offsets and lengths are in characters (Unicode scalar values).
#[derive(Clone, Debug)]
pub struct RuntimeText {
    text: String,
    char_styles: Vec<StyleId>,
    styles: StyleTable,
    paragraphs: Vec<ParagraphStyle>,
    hyperlinks: Vec<String>,
    empty_style: StyleId,
    content_version: u64,
    rendering_enabled: bool,
    deferred_render_needed: bool,
    style_runs: Vec<StyleRun>,
    spell_spans: Vec<SpellSpan>,
    field_runs: Vec<FieldRun>,
    words: Option<WordList>,
    field_serial: u32,
}

impl Default for RuntimeText {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeText {
    /// Creates an empty text using the default style.
    pub fn new() -> Self {
        Self::with_style(Style::default())
    }

    /// Creates an empty text whose first insertion will use `style`.
    pub fn with_style(style: Style) -> Self {
        let mut text = Self {
            text: String::new(),
            char_styles: Vec::new(),
            styles: StyleTable::with_default(style),
            paragraphs: vec![ParagraphStyle::default()],
            hyperlinks: Vec::new(),
            empty_style: StyleId::DEFAULT,
            content_version: 0,
            rendering_enabled: true,
            deferred_render_needed: false,
            style_runs: Vec::new(),
            spell_spans: Vec::new(),
            field_runs: Vec::new(),
            words: None,
            field_serial: 0,
        };
        text.rebuild_runs();
        text
    }

    /// Creates a text holding `content` in the default style.
    pub fn from_text(content: &str) -> Self {
        let mut text = Self::new();
        text.set_text(content, &TextStyleArg::Inherit, None, None);
        text
    }

    // --- MARK: Queries ---

    /// The raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of characters.
    pub fn len(&self) -> usize {
        self.char_styles.len()
    }

    /// Whether the text is empty.
    pub fn is_empty(&self) -> bool {
        self.char_styles.is_empty()
    }

    /// The characters `start..start + len`, clamped to the text.
    pub fn substring(&self, start: usize, len: usize) -> &str {
        char_slice(&self.text, start, len)
    }

    /// One style id per character.
    pub fn char_styles(&self) -> &[StyleId] {
        &self.char_styles
    }

    /// The style arena.
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    /// The style for `id`.
    pub fn style(&self, id: StyleId) -> &Style {
        self.styles.resolve(id)
    }

    /// The style id in effect at `offset`.
    ///
    /// Offsets past the end resolve to the last character; an empty text
    /// reports the style its next insertion will use.
    pub fn style_id_at(&self, offset: usize) -> StyleId {
        match self.char_styles.len() {
            0 => self.empty_style,
            n => self.char_styles[offset.min(n - 1)],
        }
    }

    /// The style in effect at `offset`. See [`style_id_at`](Self::style_id_at).
    pub fn style_at(&self, offset: usize) -> &Style {
        self.styles.resolve(self.style_id_at(offset))
    }

    /// The style the next insertion into an empty text will use.
    pub fn empty_style(&self) -> StyleId {
        self.empty_style
    }

    /// Number of paragraphs. Always at least one.
    pub fn paragraph_count(&self) -> usize {
        self.style_runs.len()
    }

    /// The index of the paragraph containing `offset`.
    pub fn paragraph_at(&self, offset: usize) -> usize {
        self.style_runs
            .iter()
            .position(|p| offset < p.end())
            .unwrap_or(self.style_runs.len().saturating_sub(1))
    }

    /// Offset of the first character of paragraph `index`.
    pub fn paragraph_start(&self, index: usize) -> Option<usize> {
        self.style_runs.get(index).map(|p| p.start)
    }

    /// The style of the paragraph containing `offset`.
    pub fn paragraph_style(&self, offset: usize) -> &ParagraphStyle {
        &self.paragraphs[self.paragraph_at(offset).min(self.paragraphs.len() - 1)]
    }

    /// One style per paragraph.
    pub fn paragraph_styles(&self) -> &[ParagraphStyle] {
        &self.paragraphs
    }

    /// The paragraphs with their character runs.
    pub fn style_runs(&self) -> &[StyleRun] {
        &self.style_runs
    }

    /// Spans flagged as misspelled, as of the last run rebuild.
    pub fn spell_spans(&self) -> &[SpellSpan] {
        &self.spell_spans
    }

    /// Spans bound to data fields, as of the last run rebuild.
    pub fn field_runs(&self) -> &[FieldRun] {
        &self.field_runs
    }

    /// Hyperlink targets, indexed by [`Style::hyperlink`].
    pub fn hyperlinks(&self) -> &[String] {
        &self.hyperlinks
    }

    /// Incremented on every committed change to the characters.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Whether run rebuilding and layout happen immediately.
    pub fn rendering_enabled(&self) -> bool {
        self.rendering_enabled
    }

    /// Whether a change was made that has not been laid out yet.
    pub fn deferred_render_needed(&self) -> bool {
        self.deferred_render_needed
    }

    /// The fields common to every character of `start..start + length`.
    ///
    /// An empty range reports the style of the character before `start`,
    /// which is the style typing at a caret there would continue.
    pub fn common_format(&self, start: usize, length: Option<usize>) -> StylePatch {
        let len = self.len();
        let available = len.saturating_sub(start);
        let length = length.filter(|&l| l <= available).unwrap_or(available);
        if length == 0 || start >= len {
            return StylePatch::from_style(self.style_at(start.saturating_sub(1)));
        }
        let mut current = self.char_styles[start];
        let mut common = StylePatch::from_style(self.style(current));
        for &id in &self.char_styles[start + 1..start + length] {
            if id != current {
                current = id;
                common = common.and(&StylePatch::from_style(self.style(id)));
            }
        }
        common
    }

    /// The maximal range around `index` whose characters all match `patch`.
    pub fn format_range_at(&self, patch: &StylePatch, index: usize) -> Option<Range<usize>> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let index = index.min(len - 1);
        if !patch.matches(self.style_at(index)) {
            return None;
        }
        let matches = |id: StyleId, current: Option<StyleId>| {
            Some(id) == current || patch.matches(self.style(id))
        };
        let mut start = index;
        let mut current = None;
        for i in (0..index).rev() {
            let id = self.char_styles[i];
            if !matches(id, current) {
                break;
            }
            start = i;
            current = Some(id);
        }
        let mut end = index;
        current = None;
        for i in index + 1..len {
            let id = self.char_styles[i];
            if !matches(id, current) {
                break;
            }
            end = i;
            current = Some(id);
        }
        Some(start..end + 1)
    }

    // --- MARK: Mutations ---

    /// Replaces `start..start + length` with `text`.
    ///
    /// See [`set_text_with`](Self::set_text_with); this variant never vetoes.
    pub fn set_text(
        &mut self,
        text: &str,
        style: &TextStyleArg,
        start: Option<usize>,
        length: Option<usize>,
    ) -> bool {
        self.set_text_with(text, style, start, length, &mut |_| true)
    }

    /// Replaces `start..start + length` with `text`, subject to a veto.
    ///
    /// Line terminators are normalized to `\n` and other control characters
    /// are removed. `start` defaults to `0` and is clamped to the text;
    /// `length` defaults to the rest of the text. `before_insert` sees the
    /// whole text as it would be after the change and may return `false`
    /// to reject it, in which case nothing is modified.
    ///
    /// Returns whether the change was committed.
    pub fn set_text_with(
        &mut self,
        text: &str,
        style: &TextStyleArg,
        start: Option<usize>,
        length: Option<usize>,
        before_insert: &mut dyn FnMut(&str) -> bool,
    ) -> bool {
        let inserted = normalize_text(text);
        let len = self.len();
        let start = start.map_or(0, |s| s.min(len));
        let length = length.map_or(len - start, |l| l.min(len - start));

        let mut new_format = start == 0;
        let (mut format_id, end_id) = match style {
            TextStyleArg::Id(id) => (*id, *id),
            _ if len == 0 => {
                new_format = true;
                (self.empty_style, self.empty_style)
            }
            _ if start + 1 >= len => {
                new_format = true;
                let id = self.style_id_at(len - 1);
                (id, id)
            }
            _ if length > 0 => (self.style_id_at(start), self.style_id_at(start + length)),
            _ => (self.style_id_at(start.saturating_sub(1)), self.style_id_at(start)),
        };

        let inherited = self.paragraph_style(start).clone();
        let new_paragraphs = vec![inherited; inserted.matches('\n').count() + 1];
        let paragraphs = self.merge_paragraphs(&new_paragraphs, start, length);

        let from = byte_offset(&self.text, start);
        let to = from + byte_offset(&self.text[from..], length);
        let mut pending = String::with_capacity(self.text.len() - (to - from) + inserted.len());
        pending.push_str(&self.text[..from]);
        pending.push_str(&inserted);
        pending.push_str(&self.text[to..]);
        if !before_insert(&pending) {
            log::debug!("insertion of {} chars at {start} vetoed", char_count(&inserted));
            return false;
        }

        self.text = pending;
        self.content_version += 1;

        let start_style = self.style(format_id).clone();
        if start_style.hyperlink != self.style(end_id).hyperlink {
            new_format = true;
        }
        if start_style.data_field.is_some() || new_format {
            let mut derived = start_style;
            derived.data_field = None;
            if new_format {
                derived.hyperlink = None;
            }
            format_id = self.styles.find_or_add(derived);
        }

        let inserted_len = char_count(&inserted);
        self.char_styles.splice(
            start..start + length,
            core::iter::repeat_n(format_id, inserted_len),
        );
        self.paragraphs = paragraphs;
        if let TextStyleArg::Patch(patch) = style {
            if inserted_len > 0 {
                self.restyle(patch, start, inserted_len);
            } else if self.is_empty() {
                let mut patch = patch.clone();
                patch.hyperlink = Some(None);
                patch.data_field = Some(None);
                let style = patch.apply(self.style(format_id));
                format_id = self.styles.find_or_add(style);
            }
        }
        if self.is_empty() {
            self.empty_style = format_id;
        }
        log::debug!(
            "replaced {start}..{} with {inserted_len} chars, version {}",
            start + length,
            self.content_version
        );
        self.rebuild_runs();
        true
    }

    /// Removes `start..start + length`, widened to whole data fields.
    pub fn delete_text(&mut self, start: usize, length: usize) -> bool {
        let (start, end) = self.widen_to_data_fields(start, start.saturating_add(length));
        self.set_text(
            "",
            &TextStyleArg::Inherit,
            Some(start),
            Some(end.saturating_sub(start)),
        )
    }

    /// Applies `patch` to every character of `start..start + length`.
    ///
    /// `start` defaults to `0`, `length` to the rest of the text. For an
    /// empty range nothing changes and the style a caret insertion there
    /// would use is returned instead; an empty text additionally adopts it
    /// for its next insertion. A patch with a non-positive size is ignored.
    pub fn set_format(
        &mut self,
        patch: &StylePatch,
        start: Option<usize>,
        length: Option<usize>,
    ) -> Option<StyleId> {
        if patch.size.is_some_and(|size| size <= 0.0) {
            return None;
        }
        let len = self.len();
        let start = start.unwrap_or(0).min(len.saturating_sub(1));
        let length = length.map_or(len - start, |l| l.min(len - start));
        if length == 0 {
            let style = patch.apply(self.style_at(start));
            let id = self.styles.find_or_add(style);
            if len == 0 && id != self.empty_style {
                self.empty_style = id;
                self.rebuild_runs();
            }
            return Some(id);
        }
        if self.restyle(patch, start, length) {
            log::debug!("formatted {start}..{}", start + length);
            self.rebuild_runs();
        }
        None
    }

    /// Applies `patch` to every paragraph touching `start..start + length`.
    pub fn set_paragraph_style(
        &mut self,
        patch: &ParagraphPatch,
        start: Option<usize>,
        length: Option<usize>,
    ) {
        let len = self.len();
        let start = start.map_or(0, |s| s.min(len));
        let length = length.map_or(len - start, |l| l.min(len - start));
        let first = self.paragraph_at(start);
        let last = self.paragraph_at(start + length);
        for style in &mut self.paragraphs[first..=last] {
            patch.apply(style);
        }
        log::debug!("paragraph style set on {first}..={last}");
        self.rebuild_runs();
    }

    /// Suspends or resumes run rebuilding and layout.
    ///
    /// Returns `true` when rendering was re-enabled with changes pending, in
    /// which case the caller should lay the text out again.
    pub fn set_rendering_enabled(&mut self, enabled: bool) -> bool {
        if self.rendering_enabled == enabled {
            return false;
        }
        self.rendering_enabled = enabled;
        if enabled && self.deferred_render_needed {
            self.rebuild_runs();
            return true;
        }
        false
    }

    // --- MARK: Internal Helpers ---

    /// Merges `patch` into each character's style. Returns whether any id changed.
    fn restyle(&mut self, patch: &StylePatch, start: usize, length: usize) -> bool {
        let mut remap: HashMap<StyleId, StyleId> = HashMap::new();
        let mut changed = false;
        for i in start..start + length {
            let old = self.char_styles[i];
            let new = match remap.get(&old) {
                Some(id) => *id,
                None => {
                    let style = patch.apply(self.styles.resolve(old));
                    let id = self.styles.find_or_add(style);
                    remap.insert(old, id);
                    id
                }
            };
            if new != old {
                self.char_styles[i] = new;
                changed = true;
            }
        }
        changed
    }

    /// Re-points every character through `map`, which returns a replacement style.
    pub(crate) fn remap_styles(&mut self, mut map: impl FnMut(&Style) -> Option<Style>) -> bool {
        let mut remap: HashMap<StyleId, StyleId> = HashMap::new();
        let mut changed = false;
        for i in 0..self.char_styles.len() {
            let old = self.char_styles[i];
            let new = match remap.get(&old) {
                Some(id) => *id,
                None => {
                    let id = match map(self.styles.resolve(old)) {
                        Some(style) => self.styles.find_or_add(style),
                        None => old,
                    };
                    remap.insert(old, id);
                    id
                }
            };
            if new != old {
                self.char_styles[i] = new;
                changed = true;
            }
        }
        if let Some(style) = map(self.styles.resolve(self.empty_style)) {
            self.empty_style = self.styles.find_or_add(style);
        }
        changed
    }

    /// Paragraph styles after replacing `start..start + length` with text
    /// whose paragraphs are styled `new`.
    ///
    /// The paragraph containing `start` keeps its own style unless the
    /// replaced range begins at its start and covers it.
    fn merge_paragraphs(
        &self,
        new: &[ParagraphStyle],
        start: usize,
        length: usize,
    ) -> Vec<ParagraphStyle> {
        let first = self.paragraph_at(start);
        let last = self.paragraph_at(start + length);
        let mut merged: Vec<ParagraphStyle> = self.paragraphs[..first].to_vec();
        let para = &self.style_runs[first];
        let is_last = first + 1 == self.style_runs.len();
        let keep_own = new.is_empty()
            || start != para.start
            || length + 1 < para.len
            || (length < para.len && is_last);
        if keep_own {
            merged.push(self.paragraphs[first].clone());
        } else if let Some(style) = new.first() {
            merged.push(style.clone());
        }
        merged.extend(new.iter().skip(1).cloned());
        merged.extend(self.paragraphs.iter().skip(last + 1).cloned());
        merged
    }

    pub(crate) fn rebuild_runs(&mut self) {
        let built = build_style_runs(
            &self.text,
            &self.char_styles,
            &self.styles,
            &self.paragraphs,
            self.empty_style,
            self.rendering_enabled,
        );
        self.paragraphs = built
            .style_runs
            .iter()
            .map(|run| run.paragraph.clone())
            .collect();
        self.style_runs = built.style_runs;
        self.spell_spans = built.spell_spans;
        self.field_runs = built.field_runs;
        if self.rendering_enabled {
            log::trace!(
                "rebuilt {} paragraphs, {} runs",
                self.style_runs.len(),
                self.style_runs.iter().map(|p| p.runs.len()).sum::<usize>()
            );
        } else {
            self.deferred_render_needed = true;
        }
    }

    pub(crate) fn chars(&self) -> Vec<char> {
        self.text.chars().collect()
    }

    pub(crate) fn set_deferred_render(&mut self, deferred: bool) {
        self.deferred_render_needed = deferred;
    }
}

/// Normalizes line terminators to `\n` and drops other control characters.
pub(crate) fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\u{2028}' | '\u{2029}' => out.push('\n'),
            '\u{0}'..='\u{8}' | '\u{b}'..='\u{1f}' => {}
            _ => out.push(c),
        }
    }
    out
}
