// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use super::RuntimeText;
use crate::style::{StyleId, StylePatch};

/// A hyperlink target and its index in [`RuntimeText::hyperlinks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hyperlink<'a> {
    /// Index of the target.
    pub id: u32,
    /// The target itself.
    pub url: &'a str,
}

impl RuntimeText {
    /// The hyperlink on the character at `offset`.
    pub fn hyperlink_at(&self, offset: usize) -> Option<Hyperlink<'_>> {
        self.hyperlink_for(self.style_id_at(offset))
    }

    pub(crate) fn hyperlink_for(&self, style: StyleId) -> Option<Hyperlink<'_>> {
        let id = self.style(style).hyperlink?;
        let url = self.hyperlinks.get(id as usize)?;
        Some(Hyperlink { id, url })
    }

    /// Links `start..start + length` to `url`.
    ///
    /// The range grows to cover any hyperlink it touches at either end. An
    /// empty range links the word at `start`, or failing that one character.
    /// Hyperlinks previously inside the range are removed.
    pub fn set_hyperlink(&mut self, url: &str, start: Option<usize>, length: Option<usize>) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let mut start = start.unwrap_or(0).min(len - 1);
        let mut end = match length {
            Some(length) if start + length <= len => start + length,
            _ => len,
        };

        let mut extended = false;
        if let Some(range) = self.link_range_at(start) {
            start = range.0;
            if range.1 > end {
                end = range.1;
                extended = true;
            }
        }
        if end > start + 1 && !extended {
            if let Some(range) = self.link_range_at(end - 1) {
                end = range.1;
            }
        }
        if start == end {
            (start, end) = self.word_at(start);
        }
        if start == end {
            end = (end + 1).min(len);
        }

        for i in start..end {
            if let Some(id) = self.hyperlink_at(i).map(|link| link.id) {
                self.remove_hyperlink(id);
            }
        }

        let id = u32::try_from(self.hyperlinks.len()).unwrap_or(u32::MAX);
        self.hyperlinks.push(String::from(url));
        log::debug!("hyperlink {id} set on {start}..{end}");
        self.set_format(
            &StylePatch::new().with_hyperlink(Some(id)),
            Some(start),
            Some(end - start),
        );
    }

    /// Removes hyperlink `id` from the list and from every character using it.
    ///
    /// Characters linked to later targets are re-pointed to styles carrying
    /// the shifted index; no existing style is modified.
    pub fn remove_hyperlink(&mut self, id: u32) {
        if id as usize >= self.hyperlinks.len() {
            return;
        }
        self.hyperlinks.remove(id as usize);
        self.remap_styles(|style| {
            let new = match style.hyperlink {
                Some(link) if link == id => None,
                Some(link) if link > id => Some(link - 1),
                _ => return None,
            };
            let mut style = style.clone();
            style.hyperlink = new;
            Some(style)
        });
        log::debug!("hyperlink {id} removed");
        self.rebuild_runs();
    }

    /// Removes the hyperlink on the character at `offset`, if any.
    pub fn clear_hyperlink(&mut self, offset: usize) -> bool {
        match self.hyperlink_at(offset).map(|link| link.id) {
            Some(id) => {
                self.remove_hyperlink(id);
                true
            }
            None => false,
        }
    }

    fn link_range_at(&self, offset: usize) -> Option<(usize, usize)> {
        let id = self.hyperlink_at(offset)?.id;
        self.format_range_at(&StylePatch::new().with_hyperlink(Some(id)), offset)
            .map(|range| (range.start, range.end))
    }
}
