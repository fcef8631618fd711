// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation with a host-owned input element.
//!
//! Platform input methods type into a hidden input element that mirrors the
//! editor's text. When that element changes, the editor only sees its new
//! value and selection and has to work out which edit produced them, using
//! the selection it last pushed as a guide.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

/// An edit of the editor's text that turns it into the mirror's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MirrorEdit {
    /// First replaced character.
    pub(crate) start: usize,
    /// Number of replaced characters.
    pub(crate) removed: usize,
    /// Replacement text.
    pub(crate) inserted: String,
}

impl MirrorEdit {
    fn apply(&self, old: &[char]) -> String {
        let mut text: String = old[..self.start].iter().collect();
        text.push_str(&self.inserted);
        text.extend(&old[self.start + self.removed..]);
        text
    }
}

/// The editor's view of the input element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InputMirror {
    /// Selection as last pushed to the element.
    shadow: Range<usize>,
}

impl InputMirror {
    pub(crate) fn set_shadow(&mut self, start: usize, end: usize) {
        self.shadow = start.min(end)..end.max(start);
    }

    /// Infers the edit that turned `old` into `value`, where the element's
    /// caret ended at `caret_end`.
    ///
    /// The common case is typing over the shadow selection: everything
    /// between the shadow start and the new caret is the inserted text. If
    /// that does not reconstruct `value`, the longest common prefix and
    /// suffix bound the change.
    pub(crate) fn infer(&self, old: &str, value: &str, caret_end: usize) -> Option<MirrorEdit> {
        if old == value {
            return None;
        }
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = value.chars().collect();
        let shadow = self.shadow.start.min(old.len())..self.shadow.end.min(old.len());

        if caret_end >= shadow.start && caret_end <= new.len() {
            let edit = MirrorEdit {
                start: shadow.start,
                removed: shadow.len(),
                inserted: new[shadow.start..caret_end].iter().collect(),
            };
            if edit.apply(&old) == value {
                log::trace!("mirror typed {:?} at {}", edit.inserted, edit.start);
                return Some(edit);
            }
        }

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        let edit = MirrorEdit {
            start: prefix,
            removed: old.len() - prefix - suffix,
            inserted: new[prefix..new.len() - suffix].iter().collect(),
        };
        log::debug!(
            "mirror edit inferred by diff: {} removed, {:?} inserted at {}",
            edit.removed,
            edit.inserted,
            edit.start
        );
        Some(edit)
    }
}
