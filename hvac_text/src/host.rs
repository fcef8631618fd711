// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The interface an editor uses to talk to the application embedding it.

use alloc::string::String;
use core::ops::Range;

use crate::editing::{Key, Modifiers};
use crate::geometry::{Point, Size};
use crate::spell::SpellCheckProvider;

/// A notification sent by the editor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EditEvent<'a> {
    /// The editor became active.
    Activate,
    /// The editor became inactive.
    Deactivate,
    /// The caret or selection changed.
    Select,
    /// A range selection was completed with the pointer.
    SelectRange,
    /// The text or its formatting changed.
    Edit,
    /// The text was clicked.
    Click,
    /// A hyperlink was clicked.
    Hyperlink(&'a str),
    /// A selection drag left the text box, at this position in the host's
    /// coordinate space.
    DragOutside(Point),
    /// The pointer was released during a table drag.
    DragOutsideMouseUp,
    /// A key reached the end of what the editor handles.
    ///
    /// Returning `true` from [`EditHost::notify`] consumes the key.
    KeyEnd {
        /// The key.
        key: Key,
        /// Modifiers held.
        modifiers: Modifiers,
    },
    /// Characters are about to be typed.
    ///
    /// Returning `false` from [`EditHost::notify`] rejects them.
    CharFilter(&'a str),
    /// The text is about to change to this content.
    ///
    /// Returning `false` from [`EditHost::notify`] rejects the change.
    BeforeInsert(&'a str),
    /// The text box is about to change size.
    WillResize(Size),
    /// The text box changed size.
    DidResize(Size),
    /// Spelling decoration was updated.
    SpellCheck,
}

/// The pointer cursor the host shows over the text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CursorAffordance {
    /// No special cursor.
    #[default]
    None,
    /// A text cursor, without hyperlink affordance.
    EditOnly,
    /// A text cursor, and a link cursor over hyperlinks.
    EditLink,
    /// A link cursor over hyperlinks only.
    LinkOnly,
}

impl CursorAffordance {
    /// Whether hyperlinks react to the pointer.
    pub fn links_active(self) -> bool {
        matches!(self, Self::EditLink | Self::LinkOnly)
    }
}

/// Text and selection to show in the host's hidden input element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorUpdate<'a> {
    /// New content, or `None` when only the selection changed.
    pub text: Option<&'a str>,
    /// Selected characters.
    pub selection: Range<usize>,
}

/// The application side of an editor.
pub trait EditHost {
    /// Receives a notification.
    ///
    /// The return value is a verdict for [`EditEvent::KeyEnd`],
    /// [`EditEvent::CharFilter`] and [`EditEvent::BeforeInsert`] and is
    /// ignored otherwise.
    fn notify(&mut self, event: EditEvent<'_>) -> bool;

    /// The pointer cursor currently shown.
    fn cursor_affordance(&self) -> CursorAffordance {
        CursorAffordance::None
    }

    /// Changes the pointer cursor.
    fn set_cursor_affordance(&mut self, affordance: CursorAffordance) {
        let _ = affordance;
    }

    /// Whether data fields are bound to a record that can resolve them.
    fn has_data(&self) -> bool {
        false
    }

    /// The display text of `field_id`.
    fn data_text(&mut self, field_id: &str) -> Option<String> {
        let _ = field_id;
        None
    }

    /// Mirrors editor state into the host's input element.
    fn push_mirror(&mut self, update: MirrorUpdate<'_>) {
        let _ = update;
    }

    /// The spell checker, if one is installed.
    fn spell_checker(&mut self) -> Option<&mut dyn SpellCheckProvider> {
        None
    }
}
