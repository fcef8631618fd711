// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use super::RuntimeText;
use crate::spell::SpellResults;
use crate::style::StylePatch;
use crate::words::{WordList, WordStatus};

impl RuntimeText {
    /// The words of the current content, rescanned after each change.
    ///
    /// Spelling verdicts carry over to words with the same text.
    pub fn words(&mut self) -> &WordList {
        let stale = self
            .words
            .as_ref()
            .is_none_or(|list| list.content_version() != self.content_version);
        if stale {
            let mut list = WordList::scan(&self.text, self.content_version);
            if let Some(previous) = &self.words {
                list.inherit(previous);
            }
            self.words = Some(list);
        }
        self.words.get_or_insert_with(|| WordList::scan("", 0))
    }

    /// The `start..end` of the word containing `index`, or `(index, index)`.
    pub fn word_at(&mut self, index: usize) -> (usize, usize) {
        self.words().word_at(index)
    }

    /// Merges spell checker verdicts and redraws the decoration.
    ///
    /// Returns `false`, changing nothing, when the results were computed for
    /// an older content version.
    pub fn apply_spell_results(&mut self, results: &SpellResults) -> bool {
        if results.content_version != self.content_version {
            log::debug!(
                "dropping spell results for version {}, text is at {}",
                results.content_version,
                self.content_version
            );
            return false;
        }
        self.words();
        if let Some(list) = self.words.as_mut() {
            list.apply(results);
        }
        self.update_spell_formatting(true);
        true
    }

    /// Flags misspelled words outside data fields, or clears every flag when
    /// spell checking is not `active`.
    pub fn update_spell_formatting(&mut self, active: bool) {
        let clear = StylePatch::new().with_spell_error(false);
        if !active {
            self.words = None;
            if self.char_styles.iter().any(|&id| self.style(id).spell_error) {
                self.set_format(&clear, None, None);
            }
            return;
        }
        let wrong: Vec<(usize, usize)> = self
            .words()
            .words()
            .iter()
            .filter(|w| w.status == WordStatus::Misspelled)
            .map(|w| (w.start, w.end))
            .collect();
        let mut changed = self.len() > 0 && self.restyle(&clear, 0, self.len());
        let flag = StylePatch::new().with_spell_error(true);
        for (start, end) in wrong {
            if !self.is_data_field_in_range(start, end) {
                changed |= self.restyle(&flag, start, end - start);
            }
        }
        if changed {
            self.rebuild_runs();
        }
    }

    /// The misspelled word containing `index`.
    pub fn misspelled_word_at(&mut self, index: usize) -> Option<(usize, usize)> {
        if !self.style_at(index).spell_error || index >= self.len() {
            return None;
        }
        match self.word_at(index) {
            (start, end) if start < end => Some((start, end)),
            _ => None,
        }
    }

    /// Replacement suggestions for the word containing `index`.
    pub fn suggestions_at(&mut self, index: usize) -> &[String] {
        let list = self.words();
        list.words()
            .iter()
            .find(|w| index >= w.start && index < w.end)
            .map(|w| w.suggestions.as_slice())
            .unwrap_or_default()
    }
}
