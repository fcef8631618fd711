// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::editing::Key;
use crate::{
    CursorAffordance, EditEvent, EditHost, MirrorUpdate, Point, Size, SpellCheckProvider,
    SpellRequest, base_field_id,
};

/// An owned copy of an [`EditEvent`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Recorded {
    Activate,
    Deactivate,
    Select,
    SelectRange,
    Edit,
    Click,
    Hyperlink(String),
    DragOutside(Point),
    DragOutsideMouseUp,
    KeyEnd(Key),
    CharFilter(String),
    BeforeInsert(String),
    WillResize(Size),
    DidResize(Size),
    SpellCheck,
}

impl From<EditEvent<'_>> for Recorded {
    fn from(event: EditEvent<'_>) -> Self {
        match event {
            EditEvent::Activate => Self::Activate,
            EditEvent::Deactivate => Self::Deactivate,
            EditEvent::Select => Self::Select,
            EditEvent::SelectRange => Self::SelectRange,
            EditEvent::Edit => Self::Edit,
            EditEvent::Click => Self::Click,
            EditEvent::Hyperlink(url) => Self::Hyperlink(String::from(url)),
            EditEvent::DragOutside(point) => Self::DragOutside(point),
            EditEvent::DragOutsideMouseUp => Self::DragOutsideMouseUp,
            EditEvent::KeyEnd { key, .. } => Self::KeyEnd(key),
            EditEvent::CharFilter(text) => Self::CharFilter(String::from(text)),
            EditEvent::BeforeInsert(text) => Self::BeforeInsert(String::from(text)),
            EditEvent::WillResize(size) => Self::WillResize(size),
            EditEvent::DidResize(size) => Self::DidResize(size),
            EditEvent::SpellCheck => Self::SpellCheck,
        }
    }
}

/// Remembers every request it is sent.
#[derive(Debug, Default)]
pub(crate) struct RecordingChecker {
    pub(crate) unavailable: bool,
    /// Content version and words of each request.
    pub(crate) requests: Vec<(u64, Vec<String>)>,
}

impl SpellCheckProvider for RecordingChecker {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    fn request(&mut self, request: SpellRequest<'_>) {
        let words = request.words.iter().map(|w| w.word.clone()).collect();
        self.requests.push((request.content_version, words));
    }
}

/// A host that records what the editor tells it and answers with
/// configurable verdicts.
#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub(crate) events: Vec<Recorded>,
    /// Characters rejected by the character filter.
    pub(crate) rejected_chars: Vec<char>,
    /// Reject every change through the before-insert veto.
    pub(crate) reject_inserts: bool,
    /// Consume Tab and Enter when offered.
    pub(crate) consume_key_end: bool,
    pub(crate) affordance: CursorAffordance,
    /// Display texts by base field id.
    pub(crate) data: Vec<(String, String)>,
    pub(crate) mirror: Vec<(Option<String>, Range<usize>)>,
    pub(crate) checker: Option<RecordingChecker>,
}

impl RecordingHost {
    pub(crate) fn take_events(&mut self) -> Vec<Recorded> {
        core::mem::take(&mut self.events)
    }

    pub(crate) fn count(&self, event: &Recorded) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }

    pub(crate) fn requests(&self) -> &[(u64, Vec<String>)] {
        self.checker.as_ref().map_or(&[], |c| c.requests.as_slice())
    }
}

impl EditHost for RecordingHost {
    fn notify(&mut self, event: EditEvent<'_>) -> bool {
        let verdict = match event {
            EditEvent::KeyEnd { .. } => self.consume_key_end,
            EditEvent::CharFilter(text) => !text.chars().any(|c| self.rejected_chars.contains(&c)),
            EditEvent::BeforeInsert(_) => !self.reject_inserts,
            _ => true,
        };
        self.events.push(event.into());
        verdict
    }

    fn cursor_affordance(&self) -> CursorAffordance {
        self.affordance
    }

    fn set_cursor_affordance(&mut self, affordance: CursorAffordance) {
        self.affordance = affordance;
    }

    fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    fn data_text(&mut self, field_id: &str) -> Option<String> {
        let base = base_field_id(field_id);
        self.data
            .iter()
            .find(|(id, _)| id == base)
            .map(|(_, text)| text.clone())
    }

    fn push_mirror(&mut self, update: MirrorUpdate<'_>) {
        self.mirror
            .push((update.text.map(String::from), update.selection));
    }

    fn spell_checker(&mut self) -> Option<&mut dyn SpellCheckProvider> {
        self.checker
            .as_mut()
            .map(|checker| checker as &mut dyn SpellCheckProvider)
    }
}
