// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing a [`FormattedText`] through a host-supplied sink.
//!
//! All coordinates are local to the text, with the origin at the top left
//! of the first line.

use crate::geometry::{Point, Rect};
use crate::layout::{BulletMark, FormattedText};
use crate::runtime::{Hyperlink, RuntimeText};
use crate::style::{BulletKind, Color, Decoration, Style};

/// A run of text to draw.
#[derive(Clone, Copy, Debug)]
pub struct TextRunItem<'a> {
    /// The characters to draw.
    pub text: &'a str,
    /// Their style.
    pub style: &'a Style,
    /// Left end of the baseline, including any baseline shift.
    pub origin: Point,
    /// Advance the characters should be fitted to.
    pub width: f32,
    /// The hyperlink the run belongs to, when links are shown.
    pub hyperlink: Option<Hyperlink<'a>>,
}

/// A bullet to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletItem {
    /// Shape of the mark.
    pub kind: BulletKind,
    /// Bounding square of the mark.
    pub bounds: Rect,
    /// Stroke or fill color.
    pub color: Color,
}

impl BulletItem {
    /// Whether the mark is filled rather than outlined.
    pub fn is_filled(&self) -> bool {
        matches!(
            self.kind,
            BulletKind::SolidRound
                | BulletKind::SolidSquare
                | BulletKind::Diamond
                | BulletKind::Chevron
        )
    }
}

/// What to draw besides the text itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw hyperlinks underlined in [`Color::HYPERLINK`].
    pub links_enabled: bool,
    /// Draw the misspelling decoration.
    pub spell_errors: bool,
    /// Highlight data fields.
    pub data_fields: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            links_enabled: true,
            spell_errors: true,
            data_fields: false,
        }
    }
}

/// Receives drawing commands.
pub trait RenderSink {
    /// Draws a run of text.
    fn text_run(&mut self, run: &TextRunItem<'_>);

    /// Draws a line of `width` starting at `origin`, which is on the baseline.
    fn underline(&mut self, origin: Point, width: f32, color: Color);

    /// Draws a bullet.
    fn bullet(&mut self, bullet: &BulletItem);

    /// Draws the misspelling decoration under the baseline from `origin`.
    fn spell_error(&mut self, origin: Point, width: f32) {
        let _ = (origin, width);
    }

    /// Highlights the part of a data field shown in `rect`.
    fn data_field(&mut self, field_id: &str, rect: Rect) {
        let _ = (field_id, rect);
    }

    /// Highlights a selected area.
    fn selection(&mut self, rect: Rect) {
        let _ = rect;
    }

    /// Draws the caret.
    fn caret(&mut self, rect: Rect) {
        let _ = rect;
    }
}

impl BulletMark {
    fn item(&self, text: &RuntimeText) -> BulletItem {
        let size = (self.indent / 2.0).max(4.0);
        let x = self.left + (self.indent - size) / 2.0;
        let y = if size < self.ascent {
            self.ascent - size
        } else if size < self.height {
            0.0
        } else {
            (self.height - size) / 2.0
        };
        let top = self.top + y;
        BulletItem {
            kind: self.kind,
            bounds: Rect::new(x, top, x + size, top + size),
            color: text.style(self.style).color,
        }
    }
}

impl FormattedText {
    /// Draws the layout of `text` into `sink`.
    ///
    /// `text` must be the text this layout was computed from.
    pub fn render(&self, text: &RuntimeText, options: &RenderOptions, sink: &mut dyn RenderSink) {
        let mut underlines = 0;
        for line in self.lines() {
            let baseline = line.top + line.ascent;
            for run in &line.runs {
                let style = text.style(run.style);
                let hyperlink = text
                    .hyperlink_for(run.style)
                    .filter(|_| options.links_enabled);
                if run.display_len > 0 && !run.is_tab {
                    sink.text_run(&TextRunItem {
                        text: text.substring(run.display_start, run.display_len),
                        style,
                        origin: Point::new(run.left, baseline + run.y_offset),
                        width: run.display_width,
                        hyperlink,
                    });
                }
                let underlined = style.decoration == Decoration::Underline || hyperlink.is_some();
                if underlined && run.y_offset <= 0.0 {
                    let color = match hyperlink {
                        Some(_) => Color::HYPERLINK,
                        None => style.color,
                    };
                    sink.underline(Point::new(run.left, baseline), run.width, color);
                    underlines += 1;
                }
            }
            if options.spell_errors {
                for span in &line.spell_errors {
                    sink.spell_error(Point::new(span.left, baseline), span.right - span.left);
                }
            }
            if options.data_fields {
                for field in &line.data_fields {
                    let rect = Rect::new(field.span.left, line.top, field.span.right, line.bottom);
                    sink.data_field(&field.field_id, rect);
                }
            }
        }
        for bullet in self.bullets() {
            sink.bullet(&bullet.item(text));
        }
        log::trace!(
            "rendered {} lines, {underlines} underlines, {} bullets",
            self.lines().len(),
            self.bullets().len()
        );
    }
}
