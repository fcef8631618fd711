// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-place rich text editor and related types.

use alloc::string::String;

use super::blink::CaretBlink;
use super::mirror::InputMirror;
use super::{DeleteKey, EditState, Key, Modifiers, PointerButton, PointerEvent, Selection};
use crate::context::{LayoutConstraints, LayoutContext};
use crate::geometry::{Point, Rect, Size};
use crate::host::{CursorAffordance, EditEvent, EditHost, MirrorUpdate};
use crate::layout::{Caret, Direction, FormattedText, HitInfo};
use crate::measure::MeasurementProvider;
use crate::render::{RenderOptions, RenderSink};
use crate::runtime::{Hyperlink, RuntimeSnippet, RuntimeText, TextStyleArg};
use crate::spell::{SpellRequest, SpellResults};
use crate::style::{ParagraphPatch, ParagraphStyle, StyleId, StylePatch};
use crate::util::nearly_eq;
use crate::words::is_word_char;

/// Opaque representation of a generation.
///
/// Obtained from [`Editor::generation`].
// Generations are only compared for equality, so wrapping is fine.
#[derive(PartialEq, Eq, Default, Clone, Copy, Debug)]
pub struct Generation(u32);

impl Generation {
    /// Make it not what it currently is.
    pub(crate) fn nudge(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Timing and behavior settings of an [`Editor`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Longest gap between two clicks that selects a word.
    pub double_click_ms: u64,
    /// How long after programmatic activation typing replaces the text.
    pub pending_input_ms: u64,
    /// Length of one caret blink cycle.
    pub blink_period_ms: u64,
    /// Part of each cycle the caret is hidden.
    pub blink_off_ms: u64,
    /// Whether hyperlinks are followed on click and drawn as links.
    pub links_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 300,
            pending_input_ms: 10,
            blink_period_ms: 1000,
            blink_off_ms: 250,
            links_enabled: true,
        }
    }
}

/// The state of one activation, from [`EditorDriver::activate`] until
/// [`EditorDriver::deactivate`].
#[derive(Clone, Debug, Default)]
struct Session {
    selection: Option<Selection>,
    /// Line of the selection's moving end, if known.
    line: Option<usize>,
    caret: Option<Caret>,
    blink: Option<CaretBlink>,
    dragging: bool,
    word_select: bool,
    word_anchor: (usize, usize),
    table_drag: bool,
    last_click_ms: Option<u64>,
    pending_until: Option<u64>,
    hit: Option<HitInfo>,
    last_key_processed: bool,
}

/// A rich text editor for one [`RuntimeText`].
///
/// The editor owns the text, its cached layout and the state of the current
/// edit session. Operations that need measurement or talk to the host go
/// through an [`EditorDriver`], obtained from [`Editor::driver`].
#[derive(Clone, Debug)]
pub struct Editor {
    text: RuntimeText,
    constraints: LayoutConstraints,
    config: EditorConfig,
    layout: FormattedText,
    layout_dirty: bool,
    generation: Generation,
    session: Option<Session>,
    mirror: Option<InputMirror>,
    focused: bool,
    spell_check: bool,
    active_style: Option<StyleId>,
    size: Size,
    saved_affordance: CursorAffordance,
    origin: Point,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(RuntimeText::new())
    }
}

impl Editor {
    /// Creates an inactive editor for `text`.
    pub fn new(text: RuntimeText) -> Self {
        Self::with_config(text, EditorConfig::default())
    }

    /// Creates an inactive editor for `text` with `config`.
    pub fn with_config(text: RuntimeText, config: EditorConfig) -> Self {
        Self {
            text,
            constraints: LayoutConstraints::default(),
            config,
            layout: FormattedText::default(),
            layout_dirty: true,
            generation: Generation(1),
            session: None,
            mirror: None,
            focused: true,
            spell_check: false,
            active_style: None,
            size: Size::default(),
            saved_affordance: CursorAffordance::None,
            origin: Point::default(),
        }
    }

    /// Borrows the editor together with what its operations need.
    pub fn driver<'drv>(
        &'drv mut self,
        layout_cx: &'drv mut LayoutContext,
        measurer: &'drv mut dyn MeasurementProvider,
        host: &'drv mut dyn EditHost,
    ) -> EditorDriver<'drv> {
        EditorDriver {
            editor: self,
            layout_cx,
            measurer,
            host,
        }
    }

    // --- MARK: Queries ---

    /// The text being edited.
    pub fn text(&self) -> &RuntimeText {
        &self.text
    }

    /// Gives the text back.
    pub fn into_text(self) -> RuntimeText {
        self.text
    }

    /// The configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The constraints the text is laid out in.
    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    /// The current state.
    pub fn state(&self) -> EditState {
        let Some(session) = &self.session else {
            return EditState::Inactive;
        };
        if session.table_drag {
            return EditState::ActiveTableDrag;
        }
        if session.pending_until.is_some() {
            return EditState::PendingFirstInput;
        }
        match session.selection {
            Some(selection) if !selection.is_collapsed() => {
                if session.word_select {
                    EditState::ActiveWordSelection
                } else {
                    EditState::ActiveRangeSelection
                }
            }
            _ => EditState::ActiveCaret,
        }
    }

    /// Whether an edit session is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The selection, while active.
    pub fn selection(&self) -> Option<Selection> {
        self.session.as_ref()?.selection
    }

    /// The caret, while one is placed.
    pub fn caret(&self) -> Option<Caret> {
        self.session.as_ref()?.caret
    }

    /// Whether the caret is currently drawn.
    pub fn caret_visible(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.caret.is_some() && s.blink.is_some_and(|b| b.visible()))
    }

    /// The style the next typed character will use, if one was chosen with
    /// a caret placed.
    pub fn active_style(&self) -> Option<StyleId> {
        self.active_style
    }

    /// The selected characters.
    pub fn selected_text(&self) -> Option<&str> {
        let selection = self.selection().filter(|s| !s.is_collapsed())?;
        Some(self.text.substring(selection.start(), selection.len()))
    }

    /// The selected characters with their formatting, for the clipboard.
    pub fn copy(&self) -> Option<RuntimeSnippet> {
        let selection = self.selection().filter(|s| !s.is_collapsed())?;
        Some(self.text.snippet(Some(selection.start()), Some(selection.len())))
    }

    /// The formatting shown for the selection.
    ///
    /// With a caret and a style chosen for the next character, that style.
    /// Otherwise the fields common to the selection, or to the whole text
    /// while inactive.
    pub fn selected_format(&self) -> StylePatch {
        match (self.selection(), self.active_style) {
            (Some(selection), Some(id)) if selection.is_collapsed() => {
                StylePatch::from_style(self.text.style(id))
            }
            (Some(selection), _) => self.text.common_format(selection.start(), Some(selection.len())),
            (None, _) => self.text.common_format(0, None),
        }
    }

    /// The paragraph style at the start of the selection.
    pub fn selected_paragraph_style(&self) -> &ParagraphStyle {
        self.text
            .paragraph_style(self.selection().map_or(0, |s| s.start()))
    }

    /// The hyperlink at the start of the selection.
    pub fn selected_hyperlink(&self) -> Option<Hyperlink<'_>> {
        self.text.hyperlink_at(self.selection().map_or(0, |s| s.start()))
    }

    /// The layout, if it is up to date.
    pub fn try_layout(&self) -> Option<&FormattedText> {
        (!self.layout_dirty).then_some(&self.layout)
    }

    /// The size of the text box as of the last layout.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Get the current `Generation` of the layout, to decide whether to draw.
    ///
    /// You should store the generation the editor was at when you last drew
    /// it, and then redraw when the generation is different.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    // --- MARK: Settings ---

    /// Turns spell checking on or off, effective from the next check.
    pub fn set_spell_check(&mut self, enabled: bool) {
        self.spell_check = enabled;
    }

    /// Whether spell checking is on.
    pub fn spell_check(&self) -> bool {
        self.spell_check
    }

    /// Connects or disconnects the host's input element.
    pub fn set_mirror_enabled(&mut self, enabled: bool) {
        self.mirror = enabled.then(InputMirror::default);
    }

    /// Where the text box sits in the host's coordinate space, used for
    /// [`EditEvent::DragOutside`].
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    // --- MARK: Time ---

    /// Advances timers to `now_ms`.
    ///
    /// Ends the first-input window once it has elapsed and blinks the caret,
    /// nudging the generation when it changes visibility.
    pub fn tick(&mut self, now_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.pending_until.is_some_and(|deadline| now_ms > deadline) {
            session.pending_until = None;
        }
        if let Some(blink) = session.blink.as_mut() {
            if blink.tick(now_ms) {
                self.generation.nudge();
            }
        }
    }

    /// Tells the editor whether the host window has keyboard focus.
    ///
    /// The caret stops blinking, hidden, while unfocused.
    pub fn focus_changed(&mut self, focused: bool) {
        if self.focused == focused {
            return;
        }
        self.focused = focused;
        let config = self.config;
        if let Some(session) = self.session.as_mut() {
            session.blink = (focused && session.caret.is_some())
                .then(|| CaretBlink::new(config.blink_period_ms, config.blink_off_ms));
            self.generation.nudge();
        }
    }

    // --- MARK: Internal Helpers ---

    /// The selection as `(start, length)`, or an insertion point at the
    /// start of the text while inactive.
    fn selection_span(&self) -> (usize, usize) {
        self.selection().map_or((0, 0), |s| (s.start(), s.len()))
    }

    /// The range formatting applies to: the selection while active, the
    /// whole text otherwise.
    fn format_span(&self) -> (Option<usize>, Option<usize>) {
        match self.selection() {
            Some(selection) => (Some(selection.start()), Some(selection.len())),
            None => (None, None),
        }
    }

    fn new_blink(&self) -> Option<CaretBlink> {
        self.focused
            .then(|| CaretBlink::new(self.config.blink_period_ms, self.config.blink_off_ms))
    }
}

/// A short-lived wrapper around [`Editor`].
///
/// This can perform operations which require the editor's layout to
/// be up-to-date by refreshing it as necessary, and reports what happens
/// to the host.
pub struct EditorDriver<'a> {
    /// The editor.
    pub editor: &'a mut Editor,
    /// Caches for layout.
    pub layout_cx: &'a mut LayoutContext,
    /// Measures text.
    pub measurer: &'a mut dyn MeasurementProvider,
    /// Receives notifications.
    pub host: &'a mut dyn EditHost,
}

impl core::fmt::Debug for EditorDriver<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EditorDriver")
            .field("editor", &self.editor)
            .field("layout_cx", &self.layout_cx)
            .finish_non_exhaustive()
    }
}

impl EditorDriver<'_> {
    // --- MARK: Activation ---

    /// Starts an edit session.
    ///
    /// With a pointer event the event is handled as a press, followed by a
    /// release unless `spellcheck_now` asks for a spelling pass instead.
    /// Without one the caret goes to the end of the text and typing within
    /// [`EditorConfig::pending_input_ms`] of `now_ms` replaces the text.
    pub fn activate(&mut self, event: Option<PointerEvent>, spellcheck_now: bool, now_ms: u64) {
        if self.editor.session.is_some() {
            return;
        }
        log::debug!("activating, pointer: {}", event.is_some());
        self.editor.session = Some(Session {
            pending_until: Some(now_ms.saturating_add(self.editor.config.pending_input_ms)),
            ..Session::default()
        });
        self.editor.active_style = None;
        self.host.notify(EditEvent::Activate);
        self.editor.saved_affordance = self.host.cursor_affordance();
        self.host.set_cursor_affordance(CursorAffordance::None);
        self.push_mirror(true);
        match event {
            Some(event) => {
                self.pointer_down(event);
                if spellcheck_now {
                    self.do_spell_check();
                } else {
                    self.pointer_up(event);
                }
            }
            None => {
                let end = self.editor.text.len();
                self.set_insert_pos(end, None);
                self.do_spell_check();
            }
        }
        self.host.set_cursor_affordance(CursorAffordance::EditLink);
        self.editor.generation.nudge();
    }

    /// Ends the edit session.
    ///
    /// Unless the deactivation comes from a pointer event, spelling and the
    /// layout are brought up to date first.
    pub fn deactivate(&mut self, event: Option<PointerEvent>) {
        if self.editor.session.take().is_none() {
            return;
        }
        log::debug!("deactivating");
        self.editor.active_style = None;
        if event.is_none() {
            self.do_spell_check();
            self.update_layout();
        }
        if self.host.cursor_affordance() == CursorAffordance::EditLink {
            self.host.set_cursor_affordance(self.editor.saved_affordance);
        }
        self.editor.generation.nudge();
        self.host.notify(EditEvent::Deactivate);
    }

    // --- MARK: Selection ---

    /// Selects `start..end`, or places a caret when they are equal.
    ///
    /// `line` is the line the moving end is shown on and `anchor` the fixed
    /// end, defaulting to `start`.
    pub fn set_selection(
        &mut self,
        start: usize,
        end: usize,
        line: Option<usize>,
        anchor: Option<usize>,
    ) {
        let len = self.editor.text.len();
        let (start, end) = (start.min(len), end.min(len));
        if start == end {
            self.set_insert_pos(start, line);
            return;
        }
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        let selection = Selection::new(start, end, anchor.unwrap_or(start).min(len));
        log::trace!("selected {:?}", selection.range());
        session.selection = Some(selection);
        session.line = line;
        session.caret = None;
        session.blink = None;
        self.editor.generation.nudge();
        self.push_mirror(false);
    }

    /// Places the caret at `index`, shown on `line` when given.
    pub fn set_insert_pos(&mut self, index: usize, line: Option<usize>) {
        let index = index.min(self.editor.text.len());
        let blink = self.editor.new_blink();
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        log::trace!("caret at {index}, line {line:?}");
        session.selection = Some(Selection::caret(index));
        session.line = line;
        session.caret = Some(Caret { index, line });
        session.blink = blink;
        self.editor.generation.nudge();
        self.push_mirror(false);
        self.host.notify(EditEvent::Select);
    }

    /// Starts an external drag; caret and selection are hidden until the
    /// pointer is released.
    pub fn begin_table_drag(&mut self) {
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        log::debug!("table drag started");
        session.table_drag = true;
        session.selection = None;
        session.caret = None;
        session.blink = None;
        session.word_select = false;
        self.editor.generation.nudge();
    }

    // --- MARK: Pointer ---

    /// Handles a button press.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        if self.editor.session.is_none() || event.button == PointerButton::Secondary {
            return;
        }
        self.refresh_layout();
        let editor = &mut *self.editor;
        if editor.config.links_enabled && self.host.cursor_affordance().links_active() {
            if let Some(link) = editor.layout.hyperlink_at_point(&editor.text, event.point) {
                log::debug!("hyperlink {} clicked", link.id);
                self.host.notify(EditEvent::Hyperlink(link.url));
                return;
            }
        }
        let hit = editor.layout.hit_test(&editor.text, event.point);
        editor.active_style = None;
        let double_click_ms = editor.config.double_click_ms;
        let Some(session) = editor.session.as_mut() else {
            return;
        };
        session.pending_until = None;
        session.hit = Some(hit);
        session.dragging = true;
        if event.modifiers.shift && session.selection.is_some() {
            self.pointer_move(event);
            self.host.notify(EditEvent::Click);
            return;
        }
        let double_click = session
            .last_click_ms
            .is_some_and(|last| event.time_ms.saturating_sub(last) <= double_click_ms);
        session.last_click_ms = Some(event.time_ms);
        session.word_select = false;

        let (mut start, mut end) = (hit.index, hit.index);
        if double_click {
            let (word_start, word_end) = editor.text.word_at(hit.index);
            if word_end > word_start {
                (start, end) = editor.text.widen_to_data_fields(word_start, word_end);
                session.word_select = true;
                session.word_anchor = (start, end);
            }
        }
        if !session.word_select {
            if let Some(field) = editor.text.data_field_at(hit.index) {
                if hit.index > field.start {
                    (start, end) = (field.start, field.end);
                }
            }
        }
        log::trace!("pointer down at {}, double: {double_click}", hit.index);
        self.set_selection(start, end, Some(hit.line), Some(start));
        self.host.notify(EditEvent::Click);
    }

    /// Handles pointer motion, extending the selection while dragging.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if !self.editor.session.as_ref().is_some_and(|s| s.dragging) {
            return;
        }
        self.refresh_layout();
        let editor = &mut *self.editor;
        let size = editor.layout.size();
        if !Rect::new(0.0, 0.0, size.width, size.height).contains(event.point) {
            let origin = editor.origin;
            let outside = Point::new(origin.x + event.point.x, origin.y + event.point.y);
            self.host.notify(EditEvent::DragOutside(outside));
        }
        let hit = editor.layout.hit_test(&editor.text, event.point);
        let Some(session) = editor.session.as_mut() else {
            return;
        };
        session.hit = Some(hit);
        let (start, end, anchor) = if session.word_select {
            let (anchor_start, anchor_end) = session.word_anchor;
            let (word_start, word_end) = match editor.text.word_at(hit.index) {
                (s, e) if e > s => (s, e),
                _ => (hit.index, hit.index),
            };
            if word_start < anchor_start {
                (word_start, anchor_end, anchor_end)
            } else {
                (anchor_start, word_end.max(anchor_end), anchor_start)
            }
        } else {
            let anchor = session.selection.map_or(hit.index, |s| s.anchor());
            (anchor.min(hit.index), anchor.max(hit.index), anchor)
        };
        let start = editor.text.data_field_at(start).map_or(start, |f| f.start);
        let end = match editor.text.data_field_at(end) {
            Some(field) if end > field.start => field.end,
            _ => end,
        };
        self.set_selection(start, end, Some(hit.line), Some(anchor));
    }

    /// Handles a button release, completing a drag.
    pub fn pointer_up(&mut self, event: PointerEvent) {
        let _ = event;
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        if session.table_drag {
            session.table_drag = false;
            session.dragging = false;
            log::debug!("table drag ended");
            self.editor.generation.nudge();
            self.host.notify(EditEvent::DragOutsideMouseUp);
            return;
        }
        if !session.dragging {
            return;
        }
        session.dragging = false;
        match session.selection {
            Some(selection) if !selection.is_collapsed() => {
                self.host.notify(EditEvent::Select);
                self.host.notify(EditEvent::SelectRange);
            }
            selection => {
                let index = selection.map_or(0, |s| s.start());
                let line = session.hit.map(|hit| hit.line);
                self.set_insert_pos(index, line);
                self.do_spell_check();
            }
        }
    }

    // --- MARK: Keyboard ---

    /// Handles a non-character key, returning whether it was consumed.
    ///
    /// Enter and space are handled like the characters they type, so a host
    /// reports them through either this method or [`key_press`], not both.
    ///
    /// [`key_press`]: Self::key_press
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let Some(session) = self.editor.session.as_mut() else {
            return false;
        };
        session.pending_until = None;
        let handled = match key {
            Key::Backspace => {
                self.delete_key(DeleteKey::Backspace);
                true
            }
            Key::Delete => {
                self.delete_key(DeleteKey::Delete);
                true
            }
            Key::Tab => self.typed('\t', modifiers, false),
            Key::Enter => self.typed('\n', modifiers, false),
            Key::Space => self.typed(' ', modifiers, false),
            Key::Home | Key::End | Key::Left | Key::Right | Key::Up | Key::Down => {
                self.cursor_key(key, modifiers);
                true
            }
        };
        if let Some(session) = self.editor.session.as_mut() {
            session.last_key_processed = handled;
        }
        handled
    }

    /// Handles a typed character, returning whether it was consumed.
    ///
    /// Tab and Enter are first offered to the host as
    /// [`EditEvent::KeyEnd`]. Every character can then be rejected through
    /// [`EditEvent::CharFilter`] before it is inserted.
    pub fn key_press(&mut self, ch: char, modifiers: Modifiers, time_ms: u64) -> bool {
        let Some(session) = self.editor.session.as_mut() else {
            return false;
        };
        let pending = session
            .pending_until
            .take()
            .is_some_and(|deadline| time_ms <= deadline);
        let handled = self.typed(ch, modifiers, pending);
        if let Some(session) = self.editor.session.as_mut() {
            session.last_key_processed = handled;
        }
        handled
    }

    fn typed(&mut self, ch: char, modifiers: Modifiers, pending: bool) -> bool {
        let ch = if ch == '\r' { '\n' } else { ch };
        let key = match ch {
            '\t' => Some(Key::Tab),
            '\n' => Some(Key::Enter),
            _ => None,
        };
        if let Some(key) = key {
            if self.host.notify(EditEvent::KeyEnd { key, modifiers }) {
                return true;
            }
        } else if ch.is_control() {
            return false;
        }
        let mut buf = [0; 4];
        let typed = ch.encode_utf8(&mut buf);
        if !self.host.notify(EditEvent::CharFilter(typed)) {
            log::debug!("{ch:?} rejected by filter");
            return true;
        }
        if pending {
            log::debug!("first input replaces the text");
            let len = self.editor.text.len();
            self.replace(typed, 0, len, true);
        } else {
            self.paste(typed);
        }
        true
    }

    /// Removes the selection, or the character before or after the caret.
    ///
    /// Data fields are removed whole.
    pub fn delete_key(&mut self, key: DeleteKey) {
        let Some(selection) = self.editor.selection() else {
            return;
        };
        let len = self.editor.text.len();
        let start = selection.start();
        let (start, end) = if !selection.is_collapsed() {
            (start, selection.end())
        } else {
            match key {
                DeleteKey::Delete if start < len => (start, start + 1),
                DeleteKey::Backspace if start > 0 => (start - 1, start),
                _ => return,
            }
        };
        self.delete_range(start, end);
    }

    fn cursor_key(&mut self, key: Key, modifiers: Modifiers) {
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        let Some(selection) = session.selection else {
            return;
        };
        let has_selection = !selection.is_collapsed();
        let mut focus = if modifiers.shift && !session.word_select {
            selection.focus()
        } else {
            session.word_select = false;
            selection.end()
        };
        let line = session.line;
        self.refresh_layout();
        let editor = &mut *self.editor;
        let collapse = has_selection && !modifiers.shift;
        let (direction, boundary) = match key {
            Key::Home => (Direction::Home, true),
            Key::End => (Direction::End, true),
            Key::Left => {
                if collapse {
                    focus = selection.start();
                }
                (Direction::Prev, false)
            }
            Key::Up => {
                if collapse {
                    focus = selection.start();
                }
                (Direction::Up, false)
            }
            Key::Right => (Direction::Next, false),
            Key::Down => (Direction::Down, false),
            _ => return,
        };
        let from = Caret { index: focus, line };
        let moves = !matches!(direction, Direction::Prev | Direction::Next)
            || !has_selection
            || modifiers.shift
            || modifiers.ctrl;
        let target = if moves {
            editor
                .layout
                .adjacent_char(&editor.text, from, direction, modifiers)
        } else {
            from
        };

        if target.index == focus && !boundary && !has_selection {
            self.host.notify(EditEvent::KeyEnd { key, modifiers });
            return;
        }
        editor.active_style = None;
        if modifiers.shift {
            let fixed = if focus == selection.start() {
                selection.end()
            } else {
                selection.start()
            };
            self.set_selection(
                fixed.min(target.index),
                fixed.max(target.index),
                target.line,
                Some(fixed),
            );
        } else {
            self.set_insert_pos(target.index, target.line);
        }
        if !self.editor.selection().is_some_and(|s| s.is_collapsed()) {
            self.host.notify(EditEvent::Select);
        }
        self.do_spell_check();
    }

    // --- MARK: Mirror ---

    /// Reconciles a change of the host's input element.
    ///
    /// `value` is the element's content and `sel_start..sel_end` its
    /// selection, in characters. The edit that produced them is inferred
    /// and applied; the element is reset to the editor's text whenever the
    /// two disagree afterwards.
    pub fn mirror_changed(&mut self, value: &str, sel_start: usize, sel_end: usize) {
        let Some(session) = self.editor.session.as_mut() else {
            return;
        };
        let Some(mirror) = self.editor.mirror.as_ref() else {
            return;
        };
        session.pending_until = None;
        if core::mem::take(&mut session.last_key_processed) {
            self.push_mirror(true);
            return;
        }
        let new_len = value.chars().count();
        let (sel_start, sel_end) = (sel_start.min(new_len), sel_end.min(new_len));
        let Some(edit) = mirror.infer(self.editor.text.text(), value, sel_end) else {
            self.set_selection(sel_start, sel_end, None, None);
            return;
        };
        if !edit.inserted.is_empty() && !self.host.notify(EditEvent::CharFilter(&edit.inserted)) {
            log::debug!("mirror input rejected by filter");
            self.push_mirror(true);
            return;
        }
        let committed = if edit.inserted.is_empty() {
            let (start, end) = self
                .editor
                .text
                .widen_to_data_fields(edit.start, edit.start + edit.removed);
            self.commit("", start, end - start, false)
        } else {
            self.commit(&edit.inserted, edit.start, edit.removed, true)
        };
        if committed.is_none() {
            self.push_mirror(true);
            return;
        }
        self.update_layout();
        self.set_selection(sel_start, sel_end, None, None);
        if self.editor.text.text() != value {
            log::debug!("mirror diverged from the text, resetting it");
            self.push_mirror(true);
        }
        self.adjust_spell_check(Some(&edit.inserted));
        self.host.notify(EditEvent::Edit);
    }

    fn push_mirror(&mut self, with_text: bool) {
        let editor = &mut *self.editor;
        if editor.session.is_none() {
            return;
        }
        let len = editor.text.len();
        let range = editor
            .session
            .as_ref()
            .and_then(|s| s.selection)
            .map_or(0..0, |s| s.start().min(len)..s.end().min(len));
        let Some(mirror) = editor.mirror.as_mut() else {
            return;
        };
        mirror.set_shadow(range.start, range.end);
        self.host.push_mirror(MirrorUpdate {
            text: with_text.then(|| editor.text.text()),
            selection: range,
        });
    }

    // --- MARK: Editing ---

    /// Replaces the whole text.
    pub fn set_text(&mut self, text: &str) -> bool {
        let len = self.editor.text.len();
        self.replace(text, 0, len, false)
    }

    /// Replaces the selection with `text`, or inserts it at the start while
    /// inactive. The caret ends after the insertion.
    pub fn paste(&mut self, text: &str) -> bool {
        let (start, length) = self.editor.selection_span();
        self.replace(text, start, length, true)
    }

    /// Replaces the selection with formatted text from the clipboard.
    ///
    /// Data fields in the snippet are refreshed from the host's record, or
    /// unbound when the host has none.
    pub fn paste_snippet(&mut self, snippet: &RuntimeSnippet) -> bool {
        let (start, length) = self.editor.selection_span();
        let before = self.editor.text.len();
        let host = &mut *self.host;
        let committed = self.editor.text.paste_snippet(
            snippet,
            Some(start),
            Some(length),
            &mut |pending| host.notify(EditEvent::BeforeInsert(pending)),
        );
        if !committed {
            return false;
        }
        if self.host.has_data() {
            let host = &mut *self.host;
            self.editor.text.rebuild_from_data(&mut |field_id| {
                host.data_text(field_id)
                    .unwrap_or_else(|| String::from(field_id))
            });
        } else if self.editor.text.has_data_fields() {
            self.editor.text.clear_data_field(None);
        }
        let inserted = self.editor.text.len() + length - before;
        self.finish_edit(start + inserted, None);
        true
    }

    /// Removes the selection.
    pub fn delete(&mut self) {
        if let Some(selection) = self.editor.selection().filter(|s| !s.is_collapsed()) {
            self.delete_range(selection.start(), selection.end());
        }
    }

    /// Inserts data field `field_id` over the selection, showing the text
    /// the host resolves for it.
    pub fn paste_data_field(&mut self, field_id: &str) -> bool {
        let display = self
            .host
            .data_text(field_id)
            .unwrap_or_else(|| String::from(field_id));
        let (start, length) = self.editor.selection_span();
        let before = self.editor.text.len();
        if !self
            .editor
            .text
            .insert_data_field(field_id, &display, Some(start), Some(length))
        {
            return false;
        }
        let inserted = self.editor.text.len() + length - before;
        self.finish_edit(start + inserted, None);
        true
    }

    fn delete_range(&mut self, start: usize, end: usize) {
        let (start, end) = self.editor.text.widen_to_data_fields(start, end);
        if self.commit("", start, end - start, false).is_some() {
            self.finish_edit(start, None);
        }
    }

    fn replace(&mut self, text: &str, start: usize, length: usize, typed: bool) -> bool {
        let Some(inserted) = self.commit(text, start, length, true) else {
            return false;
        };
        let start = start.min(self.editor.text.len());
        self.finish_edit(start + inserted, typed.then_some(text));
        true
    }

    /// Replaces `start..start + length`, returning the number of inserted
    /// characters, or `None` when the host vetoed the change.
    fn commit(&mut self, text: &str, start: usize, length: usize, styled: bool) -> Option<usize> {
        let before = self.editor.text.len();
        let start = start.min(before);
        let length = length.min(before - start);
        let style = match self.editor.active_style.take() {
            Some(id) if styled => TextStyleArg::Id(id),
            _ => TextStyleArg::Inherit,
        };
        let host = &mut *self.host;
        let committed = self.editor.text.set_text_with(
            text,
            &style,
            Some(start),
            Some(length),
            &mut |pending| host.notify(EditEvent::BeforeInsert(pending)),
        );
        if !committed {
            return None;
        }
        self.editor.layout_dirty = true;
        Some(self.editor.text.len() + length - before)
    }

    fn finish_edit(&mut self, caret: usize, typed: Option<&str>) {
        self.editor.layout_dirty = true;
        self.update_layout();
        if self.editor.session.is_some() {
            self.set_insert_pos(caret, None);
            self.push_mirror(true);
        }
        self.adjust_spell_check(typed);
        self.host.notify(EditEvent::Edit);
    }

    // --- MARK: Formatting ---

    /// Applies `patch` to the selection, or to the whole text while
    /// inactive. With a caret the patch styles the next typed character.
    pub fn set_selected_format(&mut self, patch: &StylePatch) {
        let (start, length) = self.editor.format_span();
        self.editor.active_style = self.editor.text.set_format(patch, start, length);
        self.formatted();
    }

    /// Applies `patch` to the paragraphs touching the selection.
    pub fn set_selected_paragraph_style(&mut self, patch: &ParagraphPatch) {
        let (start, length) = self.editor.format_span();
        self.editor.text.set_paragraph_style(patch, start, length);
        self.formatted();
    }

    /// Links the selection, or the whole text while inactive, to `url`.
    pub fn set_selected_hyperlink(&mut self, url: &str) {
        let (start, length) = self.editor.format_span();
        self.editor.text.set_hyperlink(url, start, length);
        self.formatted();
    }

    /// Removes the hyperlink at the start of the selection.
    pub fn delete_selected_hyperlink(&mut self) {
        let offset = self.editor.selection().map_or(0, |s| s.start());
        if self.editor.text.clear_hyperlink(offset) {
            self.formatted();
        }
    }

    fn formatted(&mut self) {
        self.editor.layout_dirty = true;
        self.update_layout();
        self.host.notify(EditEvent::Edit);
    }

    // --- MARK: Spelling ---

    fn spell_check_valid(&mut self) -> bool {
        self.editor.spell_check
            && self.editor.session.is_some()
            && self
                .host
                .spell_checker()
                .is_some_and(|checker| checker.is_available())
    }

    /// Sends the words of the text to the spell checker, or clears the
    /// decoration when checking is not possible.
    pub fn do_spell_check(&mut self) {
        if !self.spell_check_valid() {
            self.clear_spell_formatting();
            return;
        }
        let content_version = self.editor.text.content_version();
        let words = self.editor.text.words();
        if let Some(checker) = self.host.spell_checker() {
            log::trace!("requesting check of {} words", words.words().len());
            checker.request(SpellRequest {
                content_version,
                words: words.words(),
            });
        }
    }

    /// Merges the spell checker's `results` into the text.
    ///
    /// Returns `false` when they were dropped because the text changed in
    /// the meantime.
    pub fn apply_spell_results(&mut self, results: &SpellResults) -> bool {
        if !self.spell_check_valid() {
            self.clear_spell_formatting();
            self.host.notify(EditEvent::SpellCheck);
            return false;
        }
        if !self.editor.text.apply_spell_results(results) {
            return false;
        }
        self.editor.layout_dirty = true;
        self.editor.generation.nudge();
        self.host.notify(EditEvent::SpellCheck);
        true
    }

    /// Follows an edit: a single typed word character only refreshes the
    /// decoration, anything else asks for unchecked words to be checked.
    fn adjust_spell_check(&mut self, typed: Option<&str>) {
        if !self.spell_check_valid() {
            return;
        }
        let word_char = typed.is_some_and(|typed| {
            let mut chars = typed.chars();
            matches!((chars.next(), chars.next()), (Some(c), None) if is_word_char(c))
        });
        if !word_char && self.editor.text.words().has_unchecked() {
            self.do_spell_check();
        } else {
            self.editor.text.update_spell_formatting(true);
            self.editor.layout_dirty = true;
        }
    }

    fn clear_spell_formatting(&mut self) {
        let flagged = !self.editor.text.spell_spans().is_empty();
        self.editor.text.update_spell_formatting(false);
        if flagged {
            self.editor.layout_dirty = true;
        }
    }

    // --- MARK: Layout ---

    /// Changes the constraints and lays the text out again.
    pub fn set_constraints(&mut self, constraints: LayoutConstraints) {
        if self.editor.constraints != constraints {
            self.editor.constraints = constraints;
            self.editor.layout_dirty = true;
        }
        self.refresh_layout();
    }

    /// Suspends or resumes layout, catching up on resume.
    pub fn set_rendering_enabled(&mut self, enabled: bool) {
        self.editor.text.set_rendering_enabled(enabled);
        if enabled {
            self.refresh_layout();
        }
    }

    /// The layout, refreshed if needed.
    pub fn layout(&mut self) -> &FormattedText {
        self.refresh_layout();
        &self.editor.layout
    }

    /// The hyperlink drawn under `point`.
    pub fn hyperlink_at_point(&mut self, point: Point) -> Option<Hyperlink<'_>> {
        self.refresh_layout();
        self.editor
            .layout
            .hyperlink_at_point(&self.editor.text, point)
    }

    /// The misspelled word drawn under `point`.
    pub fn spell_error_at_point(&mut self, point: Point) -> Option<(usize, usize)> {
        self.refresh_layout();
        let index = self
            .editor
            .layout
            .spell_error_at_point(&self.editor.text, point)?;
        self.editor.text.misspelled_word_at(index)
    }

    /// Update the layout if it is dirty.
    pub fn refresh_layout(&mut self) {
        if self.editor.layout_dirty {
            self.update_layout();
        }
    }

    /// Lays the text out, reporting a change of size to the host.
    ///
    /// While rendering is disabled the layout stays stale and the text
    /// remembers that it is owed one.
    pub fn update_layout(&mut self) {
        let editor = &mut *self.editor;
        if !editor.text.rendering_enabled() {
            editor.text.set_deferred_render(true);
            editor.layout_dirty = true;
            return;
        }
        let measurer: &mut dyn MeasurementProvider = &mut *self.measurer;
        let layout = editor
            .text
            .layout(&editor.constraints, self.layout_cx, Some(measurer));
        let size = layout.size();
        let resized = !nearly_eq(size.width, editor.size.width)
            || !nearly_eq(size.height, editor.size.height);
        if resized {
            self.host.notify(EditEvent::WillResize(size));
        }
        editor.layout = layout;
        editor.layout_dirty = false;
        editor.size = size;
        editor.generation.nudge();
        if resized {
            log::debug!("resized to {}x{}", size.width, size.height);
            self.host.notify(EditEvent::DidResize(size));
        }
    }

    // --- MARK: Rendering ---

    /// Draws the text, then the selection and caret.
    pub fn render(&mut self, sink: &mut dyn RenderSink) {
        self.refresh_layout();
        let editor = &*self.editor;
        let options = RenderOptions {
            links_enabled: editor.config.links_enabled,
            spell_errors: editor.spell_check,
            data_fields: editor.session.is_some(),
        };
        editor.layout.render(&editor.text, &options, sink);
        let Some(session) = &editor.session else {
            return;
        };
        if let Some(selection) = session.selection.filter(|s| !s.is_collapsed()) {
            for rect in editor.layout.range_rects(selection.start(), selection.end()) {
                sink.selection(rect);
            }
        }
        if let Some(caret) = session.caret.filter(|_| editor.caret_visible()) {
            let at = editor.layout.char_geometry(caret.index, caret.line);
            sink.caret(Rect::new(at.left, at.top, at.left, at.bottom));
        }
    }
}
