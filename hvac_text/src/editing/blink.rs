// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The blink phase of a shown caret.
///
/// A blink exists only while its session shows a caret. It has no timer of
/// its own: the host calls [`Editor::tick`](super::Editor::tick)
/// and redraws when the editor's generation changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CaretBlink {
    period_ms: u64,
    off_ms: u64,
    started_ms: Option<u64>,
    visible: bool,
}

impl CaretBlink {
    pub(crate) fn new(period_ms: u64, off_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            off_ms: off_ms.min(period_ms),
            started_ms: None,
            visible: true,
        }
    }

    /// Whether the caret is drawn.
    pub(crate) fn visible(&self) -> bool {
        self.visible
    }

    /// Advances to `now_ms`, returning whether visibility changed.
    ///
    /// The first tick starts the phase with the caret shown.
    pub(crate) fn tick(&mut self, now_ms: u64) -> bool {
        let started = *self.started_ms.get_or_insert(now_ms);
        let phase = now_ms.saturating_sub(started) % self.period_ms;
        let visible = phase < self.period_ms - self.off_ms;
        let changed = visible != self.visible;
        self.visible = visible;
        changed
    }
}
