// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Word segmentation for selection and spelling.

use alloc::string::String;
use alloc::vec::Vec;

use crate::spell::SpellResults;
use crate::util::is_space;

/// Whether `c` can be part of a word.
///
/// Covers ASCII letters and digits, Latin-1 and Latin Extended letters, Greek
/// and Cyrillic, Latin Extended Additional and Greek Extended, and everything
/// from U+3000 upwards.
pub fn is_word_char(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '0'..='9'
        | '\u{c0}'..='\u{d6}'
        | '\u{d8}'..='\u{f6}'
        | '\u{f8}'..='\u{24f}'
        | '\u{386}'..='\u{4ff}'
        | '\u{1e00}'..='\u{1fff}'
    ) || c >= '\u{3000}'
}

/// Apostrophes that may join two parts of one word.
fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '`' | '\u{2018}' | '\u{2019}' | '\u{2032}')
}

/// Spelling state of a word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WordStatus {
    /// Not yet seen by a spell checker.
    #[default]
    Unchecked,
    /// Spelled correctly.
    Correct,
    /// Misspelled.
    Misspelled,
}

/// A word found in the text.
#[derive(Clone, Debug, PartialEq)]
pub struct WordEntry {
    /// The word, with every apostrophe normalized to `'`.
    pub word: String,
    /// Offset of the first character.
    pub start: usize,
    /// Offset one past the last character.
    pub end: usize,
    /// Spelling state.
    pub status: WordStatus,
    /// Replacement suggestions from the spell checker.
    pub suggestions: Vec<String>,
}

/// The words of one content version of a text.
#[derive(Clone, Debug, PartialEq)]
pub struct WordList {
    content_version: u64,
    words: Vec<WordEntry>,
}

impl WordList {
    /// Splits `text` into words.
    pub fn scan(text: &str, content_version: u64) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut words = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if !is_word_char(chars[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && is_word_char(chars[i]) {
                i += 1;
            }
            // Apostrophes only count when a word character follows.
            while i + 1 < chars.len() && is_apostrophe(chars[i]) && is_word_char(chars[i + 1]) {
                i += 1;
                while i < chars.len() && is_word_char(chars[i]) {
                    i += 1;
                }
            }
            let word = chars[start..i]
                .iter()
                .map(|&c| if is_apostrophe(c) { '\'' } else { c })
                .collect();
            words.push(WordEntry {
                word,
                start,
                end: i,
                status: WordStatus::Unchecked,
                suggestions: Vec::new(),
            });
        }
        Self {
            content_version,
            words,
        }
    }

    /// The content version the list was built for.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// All words in text order.
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    /// Whether any word still needs checking.
    pub fn has_unchecked(&self) -> bool {
        self.words.iter().any(|w| w.status == WordStatus::Unchecked)
    }

    /// The `start..end` of the word containing `index`, or `index..index`.
    pub fn word_at(&self, index: usize) -> (usize, usize) {
        self.words
            .iter()
            .find(|w| index >= w.start && index < w.end)
            .map_or((index, index), |w| (w.start, w.end))
    }

    /// Copies spelling state onto this list from words with the same text.
    pub(crate) fn inherit(&mut self, previous: &Self) {
        for old in &previous.words {
            for word in self.words.iter_mut().filter(|w| w.word == old.word) {
                word.status = old.status;
                word.suggestions.clone_from(&old.suggestions);
            }
        }
    }

    /// Applies spell checker verdicts by word text.
    pub(crate) fn apply(&mut self, results: &SpellResults) {
        for checked in &results.words {
            for word in self.words.iter_mut().filter(|w| w.word == checked.word) {
                word.status = checked.status;
                word.suggestions.clone_from(&checked.suggestions);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CharClass {
    Space,
    Punctuation,
    Word,
}

/// Horizontal whitespace. Line terminators are in no class.
fn is_blank(c: char) -> bool {
    matches!(c,
        ' ' | '\u{c}' | '\t' | '\u{b}' | '\u{a0}' | '\u{1680}'
        | '\u{2000}'..='\u{200a}'
        | '\u{2028}' | '\u{2029}' | '\u{202f}' | '\u{205f}' | '\u{3000}' | '\u{feff}'
    )
}

fn is_punctuation(c: char) -> bool {
    matches!(c,
        '\u{2000}'..='\u{206f}'
        | '\u{2e00}'..='\u{2e7f}'
        | '!' | '"' | '#' | '$' | '%' | '&' | '\'' | '(' | ')' | '*' | '+' | ','
        | '-' | '.' | '/' | ':' | ';' | '<' | '=' | '>' | '?' | '@' | '[' | ']'
        | '^' | '_' | '`' | '{' | '|' | '}' | '~' | '\\'
    )
}

fn class_of(c: char) -> Option<CharClass> {
    if is_blank(c) {
        Some(CharClass::Space)
    } else if is_punctuation(c) {
        Some(CharClass::Punctuation)
    } else if !is_space(c) {
        Some(CharClass::Word)
    } else {
        None
    }
}

/// The offset reached by a word-wise caret move from `pos`.
///
/// Moving backward skips blanks and then the run of characters of the same
/// class; moving forward skips a run of one class and the blanks after it.
pub fn prev_next_word(chars: &[char], pos: usize, backward: bool) -> usize {
    let len = chars.len();
    let mut pos = pos.min(len);
    if backward {
        if pos > 0 {
            pos -= 1;
            while pos > 0 && is_blank(chars[pos]) {
                pos -= 1;
            }
            if let Some(class) = class_of(chars[pos]) {
                while pos > 0 && class_of(chars[pos - 1]) == Some(class) {
                    pos -= 1;
                }
            }
        }
    } else if pos < len {
        match class_of(chars[pos]) {
            Some(class) => {
                while pos < len && class_of(chars[pos]) == Some(class) {
                    pos += 1;
                }
            }
            None => pos += 1,
        }
        while pos < len && is_blank(chars[pos]) {
            pos += 1;
        }
    }
    pos
}
