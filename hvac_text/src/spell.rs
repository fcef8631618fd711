// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interface to an external spell checker.
//!
//! Spell checking is asynchronous from the engine's point of view: the editor
//! hands a [`SpellRequest`] to the [`SpellCheckProvider`] and the host later
//! delivers [`SpellResults`] through
//! [`EditorDriver::apply_spell_results`](crate::EditorDriver::apply_spell_results).
//! Results carry the content version they were computed for and are dropped
//! if the text has changed since.

use alloc::string::String;
use alloc::vec::Vec;

use crate::words::{WordEntry, WordStatus};

/// A batch of words to check.
#[derive(Clone, Copy, Debug)]
pub struct SpellRequest<'a> {
    /// Content version of the text the words were taken from.
    pub content_version: u64,
    /// Every word of the text, with any state already known.
    pub words: &'a [WordEntry],
}

/// A spell checker's verdict on one word.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckedWord {
    /// The word as it appeared in the request.
    pub word: String,
    /// Whether it is spelled correctly.
    pub status: WordStatus,
    /// Replacement suggestions.
    pub suggestions: Vec<String>,
}

/// The answer to a [`SpellRequest`].
#[derive(Clone, Debug, PartialEq)]
pub struct SpellResults {
    /// Content version copied from the request.
    pub content_version: u64,
    /// Verdicts, in any order.
    pub words: Vec<CheckedWord>,
}

/// A spell checker the editor can consult.
pub trait SpellCheckProvider {
    /// Whether the checker is currently able to answer requests.
    fn is_available(&self) -> bool {
        true
    }

    /// Queues `request` for checking.
    ///
    /// The provider may answer synchronously or at any later time.
    fn request(&mut self, request: SpellRequest<'_>);
}
