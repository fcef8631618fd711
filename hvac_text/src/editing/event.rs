// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::geometry::Point;

/// Modifier keys held during an input event.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift; extends selections.
    pub shift: bool,
    /// Control (or command); moves by words and to the ends of the text.
    pub ctrl: bool,
}

impl Modifiers {
    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };

    /// Only control held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

/// Which pointer button an event refers to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PointerButton {
    /// The main button.
    #[default]
    Primary,
    /// The context menu button.
    Secondary,
}

/// A pointer event in the local coordinates of the text.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Position relative to the top left of the text.
    pub point: Point,
    /// Timestamp in milliseconds.
    pub time_ms: u64,
    /// Button that went down or up.
    pub button: PointerButton,
    /// Modifiers held.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// A primary button event at `point`.
    pub fn at(point: Point, time_ms: u64) -> Self {
        Self {
            point,
            time_ms,
            ..Self::default()
        }
    }

    /// The same event with `modifiers`.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A non-character key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Tab.
    Tab,
    /// Enter or return.
    Enter,
    /// The space bar.
    Space,
    /// Home.
    Home,
    /// End.
    End,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
}

/// Which side of the caret a deletion removes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeleteKey {
    /// The character before the caret.
    Backspace,
    /// The character after the caret.
    Delete,
}
