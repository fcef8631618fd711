// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving styled text in and out of a [`RuntimeText`].

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use super::{RuntimeText, TextStyleArg};
use crate::runs::build_style_runs;
use crate::style::{ParagraphStyle, Style, StyleId, StyleTable};
use crate::util::{byte_offset, char_count};
use crate::{Error, TextRange};

/// A paragraph style captured with a snippet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnippetParagraph {
    /// The paragraph's style.
    pub style: ParagraphStyle,
    /// Offset of the paragraph in the text it was copied from.
    pub offset: usize,
}

/// A self-contained piece of styled text, as produced by
/// [`RuntimeText::copy_range`] and consumed by [`RuntimeText::paste_snippet`].
///
/// `char_styles` index `styles`, and [`Style::hyperlink`] values index
/// `hyperlinks`. Spelling flags are never carried.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuntimeSnippet {
    /// The characters.
    pub text: String,
    /// The styles used by the characters.
    pub styles: Vec<Style>,
    /// One index into `styles` per character.
    pub char_styles: Vec<StyleId>,
    /// Hyperlink targets.
    pub hyperlinks: Vec<String>,
    /// Styles of the paragraphs the snippet touches, in order.
    pub paragraphs: Vec<SnippetParagraph>,
    /// Content version of the source at the time of the copy.
    pub content_version: u64,
}

impl RuntimeSnippet {
    /// Drops styles no character uses and renumbers the rest.
    ///
    /// A snippet without characters keeps its last style.
    pub fn trim_unused_styles(&mut self) {
        trim_styles(&mut self.styles, &mut self.char_styles, &mut []);
    }
}

/// Everything needed to rebuild a [`RuntimeText`] with identical runs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedText {
    /// The characters.
    pub text: String,
    /// The style table, in id order.
    pub styles: Vec<Style>,
    /// One style id per character.
    pub char_styles: Vec<StyleId>,
    /// One style per paragraph.
    pub paragraphs: Vec<ParagraphStyle>,
    /// Hyperlink targets.
    pub hyperlinks: Vec<String>,
    /// The style for the next insertion into an empty text.
    pub empty_style: StyleId,
    /// The content version.
    pub content_version: u64,
}

impl PersistedText {
    /// Drops styles no character uses and renumbers the rest.
    pub fn trim_unused_styles(&mut self) {
        trim_styles(
            &mut self.styles,
            &mut self.char_styles,
            core::slice::from_mut(&mut self.empty_style),
        );
    }
}

impl RuntimeText {
    /// Copies `range` with its styles, hyperlinks and paragraph styles.
    pub fn copy_range(&self, range: TextRange) -> RuntimeSnippet {
        let (start, end) = (range.start(), range.end());
        let mut styles: Vec<Style> = self.styles.styles().to_vec();
        let mut char_styles = self.char_styles[start..end].to_vec();
        for i in 0..styles.len() {
            if !styles[i].spell_error {
                continue;
            }
            let mut cleared = styles[i].clone();
            cleared.spell_error = false;
            match self.styles.find(&cleared) {
                Some(existing) => {
                    let old = StyleId::from_index(i);
                    for id in char_styles.iter_mut().filter(|id| **id == old) {
                        *id = existing;
                    }
                }
                None => styles[i].spell_error = false,
            }
        }
        // An empty copy remembers the style typing at `start` would use.
        let mut keep = [self.style_id_at(start)];
        let keep: &mut [StyleId] = if char_styles.is_empty() { &mut keep } else { &mut [] };
        trim_styles(&mut styles, &mut char_styles, keep);

        let first = self.paragraph_at(start);
        let last = self.paragraph_at(end);
        let paragraphs = (first..=last)
            .map(|i| SnippetParagraph {
                style: self.paragraphs[i].clone(),
                offset: self.style_runs[i].start,
            })
            .collect();

        RuntimeSnippet {
            text: String::from(self.substring(start, end - start)),
            styles,
            char_styles,
            hyperlinks: self.hyperlinks.clone(),
            paragraphs,
            content_version: self.content_version,
        }
    }

    /// Copies `start..start + length`, clamped to the text.
    pub fn snippet(&self, start: Option<usize>, length: Option<usize>) -> RuntimeSnippet {
        let len = self.len();
        let start = start.unwrap_or(0).min(len.saturating_sub(1));
        let length = match length {
            Some(length) if length > 0 && start + length <= len => length,
            _ => len - start,
        };
        self.copy_range(TextRange::new_unchecked(start, start + length))
    }

    /// Replaces `start..start + length` with `snippet`, subject to a veto.
    ///
    /// Snippet styles are interned into this text's table and its hyperlinks
    /// are appended and renumbered. Returns whether the change was committed.
    pub fn paste_snippet(
        &mut self,
        snippet: &RuntimeSnippet,
        start: Option<usize>,
        length: Option<usize>,
        before_insert: &mut dyn FnMut(&str) -> bool,
    ) -> bool {
        if snippet.styles.is_empty() {
            return self.set_text_with(
                &snippet.text,
                &TextStyleArg::Inherit,
                start,
                length,
                before_insert,
            );
        }
        let len = self.len();
        let start = start.map_or(0, |s| s.min(len));
        let length = length.map_or(len - start, |l| l.min(len - start));
        let full_replace = start == 0 && length == len;

        let from = byte_offset(&self.text, start);
        let to = from + byte_offset(&self.text[from..], length);
        let mut pending = String::with_capacity(self.text.len() + snippet.text.len());
        pending.push_str(&self.text[..from]);
        pending.push_str(&snippet.text);
        pending.push_str(&self.text[to..]);
        if !before_insert(&pending) {
            log::debug!("paste at {start} vetoed");
            return false;
        }

        let new_paragraphs: Vec<ParagraphStyle> =
            snippet.paragraphs.iter().map(|p| p.style.clone()).collect();
        let paragraphs = self.merge_paragraphs(&new_paragraphs, start, length);
        self.text = pending;
        self.content_version += 1;

        let link_base = self.hyperlinks.len();
        self.hyperlinks.extend(snippet.hyperlinks.iter().cloned());
        let renumber = |style: &Style| {
            let mut style = style.clone();
            style.hyperlink = style
                .hyperlink
                .filter(|&h| (h as usize) < snippet.hyperlinks.len())
                .and_then(|h| u32::try_from(link_base + h as usize).ok());
            style
        };

        let inserted_len = char_count(&snippet.text);
        let mut map: HashMap<StyleId, StyleId> = HashMap::new();
        let mut mapped = Vec::with_capacity(inserted_len);
        for &id in snippet.char_styles.iter().take(inserted_len) {
            let new = match map.get(&id) {
                Some(new) => *new,
                None => {
                    let new = match snippet.styles.get(id.index()) {
                        Some(style) => self.styles.find_or_add(renumber(style)),
                        None => StyleId::DEFAULT,
                    };
                    map.insert(id, new);
                    new
                }
            };
            mapped.push(new);
        }
        let fill = mapped.last().copied().unwrap_or(StyleId::DEFAULT);
        mapped.resize(inserted_len, fill);
        self.char_styles.splice(start..start + length, mapped);

        if self.is_empty() {
            self.empty_style = self.styles.find_or_add(renumber(&snippet.styles[0]));
        }
        self.paragraphs = paragraphs;
        if full_replace {
            self.content_version = self.content_version.max(snippet.content_version);
        }
        log::debug!("pasted {inserted_len} chars at {start}");
        self.rebuild_runs();
        true
    }

    /// Captures the complete state for persistence.
    pub fn snapshot(&self) -> PersistedText {
        PersistedText {
            text: self.text.clone(),
            styles: self.styles.styles().to_vec(),
            char_styles: self.char_styles.clone(),
            paragraphs: self.paragraphs.clone(),
            hyperlinks: self.hyperlinks.clone(),
            empty_style: self.empty_style,
            content_version: self.content_version,
        }
    }

    /// Rebuilds a text from a snapshot, validating its consistency.
    pub fn from_persisted(persisted: PersistedText) -> Result<Self, Error> {
        let PersistedText {
            text,
            styles,
            char_styles,
            paragraphs,
            hyperlinks,
            empty_style,
            content_version,
        } = persisted;
        let chars = char_count(&text);
        if char_styles.len() != chars {
            return Err(Error::style_count_mismatch(char_styles.len(), chars));
        }
        let styles = StyleTable::from_styles(styles)?;
        for (index, id) in char_styles.iter().enumerate() {
            if id.index() >= styles.len() {
                return Err(Error::unknown_style(index, id.index() as u32, styles.len()));
            }
        }
        if empty_style.index() >= styles.len() {
            return Err(Error::unknown_style(chars, empty_style.index() as u32, styles.len()));
        }
        let paragraph_count = text.matches('\n').count() + 1;
        if paragraphs.len() != paragraph_count {
            return Err(Error::paragraph_count_mismatch(
                paragraphs.len(),
                paragraph_count,
            ));
        }

        let built = build_style_runs(&text, &char_styles, &styles, &paragraphs, empty_style, true);
        Ok(Self {
            text,
            char_styles,
            styles,
            paragraphs,
            hyperlinks,
            empty_style,
            content_version,
            rendering_enabled: true,
            deferred_render_needed: false,
            style_runs: built.style_runs,
            spell_spans: built.spell_spans,
            field_runs: built.field_runs,
            words: None,
            field_serial: 0,
        })
    }
}

/// Removes styles not referenced by `char_styles` or `keep`, renumbering both.
fn trim_styles(styles: &mut Vec<Style>, char_styles: &mut [StyleId], keep: &mut [StyleId]) {
    if styles.is_empty() {
        return;
    }
    let mut used = vec![false; styles.len()];
    for id in char_styles.iter().chain(keep.iter()) {
        if let Some(flag) = used.get_mut(id.index()) {
            *flag = true;
        }
    }
    let mut remap = vec![StyleId::DEFAULT; styles.len()];
    let mut trimmed = Vec::new();
    for (i, style) in styles.drain(..).enumerate() {
        if used[i] {
            remap[i] = StyleId::from_index(trimmed.len());
            trimmed.push(style);
        } else if trimmed.is_empty() && i + 1 == remap.len() {
            // Nothing used at all: keep the last style so the list is never empty.
            trimmed.push(style);
        }
    }
    for id in char_styles.iter_mut().chain(keep.iter_mut()) {
        *id = remap.get(id.index()).copied().unwrap_or(StyleId::DEFAULT);
    }
    *styles = trimmed;
}
