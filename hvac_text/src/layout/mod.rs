// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout types.

mod line_break;
mod measured;

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::context::{LayoutConstraints, LayoutContext};
use crate::geometry::Size;
use crate::measure::MeasurementProvider;
use crate::runtime::{RuntimeText, TextStyleArg};
use crate::style::{BulletKind, Justification, ParagraphStyle, StyleId, StylePatch};

use line_break::{FilledLine, PlacedRun, fill_line};
use measured::{Segment, measure_paragraph};

pub use hit_test::{Caret, CharGeometry, Direction, HitInfo};
pub use line_break::ResumePoint;

/// A run of one style placed on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineRun {
    /// Style of the run.
    pub style: StyleId,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters, including trailing whitespace and newline.
    pub len: usize,
    /// Offset of the first drawn character.
    pub display_start: usize,
    /// Number of drawn characters.
    pub display_len: usize,
    /// Advance including trailing whitespace.
    pub width: f32,
    /// Advance of the drawn characters.
    pub display_width: f32,
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Ascent of the style.
    pub ascent: f32,
    /// Descent of the style.
    pub descent: f32,
    /// Vertical glyph shift of raised and lowered text.
    pub y_offset: f32,
    /// Whether the run holds tabs only.
    pub is_tab: bool,
    /// Advance of a space in this style.
    pub space_width: f32,
    /// Trailing edge of each drawn character, followed by the edges of any
    /// trailing spaces and tabs.
    pub char_edges: Vec<f32>,
}

impl LineRun {
    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// A horizontal span of a line covering characters `start..end`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelSpan {
    /// Offset of the first character.
    pub start: usize,
    /// Offset one past the last character.
    pub end: usize,
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
}

/// The part of a data field shown on one line.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldHighlight {
    /// Id of the field.
    pub field_id: String,
    /// Characters and extent of the field on the line.
    pub span: PixelSpan,
}

/// One laid out line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Index of the paragraph the line belongs to.
    pub paragraph: usize,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters.
    pub len: usize,
    /// Offset of the first drawn character.
    pub display_start: usize,
    /// Left edge of the text, after indents and alignment.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge of the text.
    pub right: f32,
    /// Bottom edge, including paragraph spacing.
    pub bottom: f32,
    /// Largest ascent of the runs.
    pub ascent: f32,
    /// Largest descent of the runs.
    pub descent: f32,
    /// Advance of the runs.
    pub width: f32,
    /// Advance of the drawn part of the runs.
    pub min_width: f32,
    /// Indent applied before the line.
    pub indent: f32,
    /// Space reserved for the paragraph bullet.
    pub bullet_indent: f32,
    /// Runs in text order.
    pub runs: SmallVec<[LineRun; 2]>,
    /// Misspelled ranges drawn on this line.
    pub spell_errors: Vec<PixelSpan>,
    /// Data fields drawn on this line.
    pub data_fields: Vec<FieldHighlight>,
    /// Where the next line of the paragraph continues, if any.
    pub resume: Option<ResumePoint>,
}

impl Line {
    /// Offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Height of the line box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn shift_x(&mut self, dx: f32) {
        self.left += dx;
        self.right += dx;
        for run in &mut self.runs {
            run.left += dx;
            run.right += dx;
            for edge in &mut run.char_edges {
                *edge += dx;
            }
        }
        for span in &mut self.spell_errors {
            span.left += dx;
            span.right += dx;
        }
        for field in &mut self.data_fields {
            field.span.left += dx;
            field.span.right += dx;
        }
    }

    fn shift_y(&mut self, dy: f32) {
        self.top += dy;
        self.bottom += dy;
    }
}

/// A laid out paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphLayout {
    /// Paragraph formatting.
    pub style: ParagraphStyle,
    /// Offset of the first character.
    pub start: usize,
    /// Number of characters, including the terminating newline.
    pub len: usize,
    /// Widest line, including indents.
    pub width: f32,
    /// Widest drawn content of a line, including indents.
    pub min_width: f32,
    /// Sum of the line heights.
    pub height: f32,
    /// Space reserved for the bullet.
    pub bullet_indent: f32,
    /// Top edge.
    pub y_offset: f32,
    /// Indices of the paragraph's lines in [`FormattedText::lines`].
    pub lines: Range<usize>,
}

/// A bullet to draw in front of a paragraph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BulletMark {
    /// Shape of the mark.
    pub kind: BulletKind,
    /// Index of the paragraph.
    pub paragraph: usize,
    /// Left edge of the bullet area.
    pub left: f32,
    /// Top edge of the first line.
    pub top: f32,
    /// Width of the bullet area.
    pub indent: f32,
    /// Height of the paragraph.
    pub height: f32,
    /// Ascent of the first line.
    pub ascent: f32,
    /// Style of the first run of the paragraph.
    pub style: StyleId,
}

/// The result of a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FormattedText {
    width: f32,
    height: f32,
    min_width: f32,
    format_width: f32,
    constraints: LayoutConstraints,
    text_len: usize,
    paragraphs: Vec<ParagraphLayout>,
    lines: Vec<Line>,
    bullets: Vec<BulletMark>,
}

impl Default for FormattedText {
    fn default() -> Self {
        Self::empty(LayoutConstraints::default())
    }
}

impl FormattedText {
    /// A layout with no lines.
    pub fn empty(constraints: LayoutConstraints) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            min_width: 0.0,
            format_width: constraints.min_width,
            constraints,
            text_len: 0,
            paragraphs: Vec::new(),
            lines: Vec::new(),
            bullets: Vec::new(),
        }
    }

    /// Widest paragraph.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Sum of the paragraph heights.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Widest drawn content of any line, the narrowest width the text can
    /// wrap to without breaking words.
    pub fn min_width(&self) -> f32 {
        self.min_width
    }

    /// Width lines are aligned in.
    pub fn format_width(&self) -> f32 {
        self.format_width
    }

    /// The constraints of the pass.
    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    /// Number of characters laid out.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Laid out paragraphs.
    pub fn paragraphs(&self) -> &[ParagraphLayout] {
        &self.paragraphs
    }

    /// All lines, in text order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The line at `index`.
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Bullets of paragraphs that have text.
    pub fn bullets(&self) -> &[BulletMark] {
        &self.bullets
    }

    /// The size the text occupies once the constraints are applied.
    pub fn size(&self) -> Size {
        let mut width = self.width.max(self.constraints.min_width);
        if self.constraints.is_constrained() {
            width = width.min(self.constraints.max_width);
        }
        Size {
            width,
            height: self.height.max(self.constraints.min_height),
        }
    }
}

// --- MARK: Layout ---

impl RuntimeText {
    /// Lays the text out within `constraints`.
    ///
    /// Without a measurement provider, or while rendering is disabled, an
    /// empty layout is returned and the text remembers that a layout is
    /// owed.
    pub fn layout(
        &mut self,
        constraints: &LayoutConstraints,
        cx: &mut LayoutContext,
        provider: Option<&mut dyn MeasurementProvider>,
    ) -> FormattedText {
        let provider = match provider {
            Some(provider) if self.rendering_enabled() => provider,
            _ => {
                log::debug!("layout deferred");
                self.set_deferred_render(true);
                return FormattedText::empty(*constraints);
            }
        };
        let layout = build_layout(self, constraints, cx, provider);
        self.set_deferred_render(false);
        layout
    }

    /// The narrowest width and the height of the text wrapped at `max_width`.
    pub fn text_fit(
        &self,
        max_width: f32,
        cx: &mut LayoutContext,
        provider: &mut dyn MeasurementProvider,
    ) -> Size {
        let layout = build_layout(self, &LayoutConstraints::wrapped(max_width), cx, provider);
        Size {
            width: layout.min_width,
            height: layout.height,
        }
    }

    /// Offsets where lines start when the text is wrapped at `max_width`.
    pub fn text_wrap(
        &self,
        max_width: f32,
        cx: &mut LayoutContext,
        provider: &mut dyn MeasurementProvider,
    ) -> Vec<usize> {
        let layout = build_layout(self, &LayoutConstraints::wrapped(max_width), cx, provider);
        let mut starts = Vec::with_capacity(layout.lines.len());
        for paragraph in &layout.paragraphs {
            if paragraph.lines.is_empty() {
                starts.push(paragraph.start);
            }
            starts.extend(layout.lines[paragraph.lines.clone()].iter().map(|l| l.start));
        }
        starts
    }

    /// The unconstrained size the text would have if `patch` were applied to
    /// all of it, keeping the line breaks of `current`.
    pub fn format_change_size(
        &self,
        current: &FormattedText,
        patch: &StylePatch,
        cx: &mut LayoutContext,
        provider: &mut dyn MeasurementProvider,
    ) -> Size {
        let mut probe = self.clone();
        probe.set_rendering_enabled(true);
        let wraps: Vec<usize> = current
            .paragraphs
            .iter()
            .flat_map(|p| current.lines[p.lines.clone()].iter().skip(1))
            .map(|line| line.start)
            .collect();
        for start in wraps.into_iter().rev() {
            probe.set_text("\n", &TextStyleArg::Inherit, Some(start), Some(0));
        }
        probe.remap_styles(|style| Some(patch.apply(style)));
        probe.rebuild_runs();
        let layout = build_layout(&probe, &LayoutConstraints::default(), cx, provider);
        Size {
            width: layout.width,
            height: layout.height,
        }
    }
}

fn build_layout(
    text: &RuntimeText,
    constraints: &LayoutConstraints,
    cx: &mut LayoutContext,
    provider: &mut dyn MeasurementProvider,
) -> FormattedText {
    let config = *cx.config();
    let max_width = if constraints.is_constrained() {
        constraints.max_width
    } else {
        config.unconstrained_width
    };
    let chars = text.chars();
    let style_runs = text.style_runs();

    let bullet_indent = {
        let index = style_runs
            .iter()
            .position(|p| p.paragraph.has_bullet())
            .unwrap_or(0);
        let ascent = match style_runs.get(index).and_then(|p| p.runs.first()) {
            Some(run) => cx.style_metrics(text.style(run.style), provider).ascent,
            None => 0.0,
        };
        ascent.max(config.min_bullet_indent)
    };

    let mut out = FormattedText::empty(*constraints);
    out.text_len = chars.len();
    let last_paragraph = style_runs.len().saturating_sub(1);
    let mut y = 0.0;

    for (index, paragraph) in style_runs.iter().enumerate() {
        let style = &paragraph.paragraph;
        let bullet_width = if style.has_bullet() { bullet_indent } else { 0.0 };
        let segments = measure_paragraph(&chars, paragraph, text.styles(), cx, provider);
        let first_line = out.lines.len();
        let mut layout = ParagraphLayout {
            style: style.clone(),
            start: paragraph.start,
            len: paragraph.len,
            width: 0.0,
            min_width: 0.0,
            height: 0.0,
            bullet_indent: bullet_width,
            y_offset: y,
            lines: first_line..first_line,
        };

        let mut resume = None;
        loop {
            let is_first = out.lines.len() == first_line;
            let indent = match (bullet_width > 0.0, is_first) {
                (true, _) => 0.0,
                (false, true) => style.first_indent,
                (false, false) => style.line_indent,
            };
            let available = max_width - (bullet_width + style.right_indent + indent);
            let filled = fill_line(&segments, available, resume, style.tab_width);
            if filled.runs.is_empty() {
                break;
            }
            let line_start = if is_first { paragraph.start } else { filled.runs[0].start };
            let mut line = build_line(text, &segments, &filled, index, line_start);
            for (run, placed) in line.runs.iter_mut().zip(&filled.runs) {
                let segment = &segments[placed.segment];
                run.char_edges = run_edges(&chars, segment, placed, run.left, style.tab_width);
            }
            line.indent = indent;
            line.bullet_indent = bullet_width;

            let mut height = line.ascent + line.descent;
            if index < last_paragraph || filled.next.is_some() {
                if style.spacing < 0.0 {
                    height += (-style.spacing - height).max(0.0);
                } else {
                    height += height * style.spacing;
                }
            }
            line.top = y;
            line.bottom = y + height;
            y += height;
            layout.height += height;
            layout.width = layout.width.max(line.width + indent + bullet_width);
            layout.min_width = layout.min_width.max(line.min_width + indent + bullet_width);
            log::trace!(
                "line {} of paragraph {index}: {}+{} width {}",
                out.lines.len() - first_line,
                line.start,
                line.len,
                line.width
            );
            out.lines.push(line);

            resume = filled.next;
            if resume.is_none() {
                break;
            }
        }
        layout.lines = first_line..out.lines.len();

        let half_bullet = bullet_width / 2.0 + 2.0;
        if bullet_width > 0.0 && !layout.lines.is_empty() && layout.height < half_bullet {
            let pad = half_bullet - layout.height;
            for line in &mut out.lines[layout.lines.clone()] {
                line.shift_y(pad / 2.0);
            }
            y += pad;
            layout.height = half_bullet;
        }

        out.height += layout.height;
        out.width = out.width.max(layout.width);
        out.min_width = out.min_width.max(layout.min_width);
        out.paragraphs.push(layout);
    }
    out.format_width = constraints.min_width.max(out.width);
    place_lines(text, &mut out);
    log::debug!(
        "laid out {} paragraphs in {} lines, {}x{}",
        out.paragraphs.len(),
        out.lines.len(),
        out.width,
        out.height
    );
    out
}

/// Turns the pieces chosen by the line breaker into a line whose x
/// coordinates are relative to the start of its text.
fn build_line(
    text: &RuntimeText,
    segments: &[Segment],
    filled: &FilledLine,
    paragraph: usize,
    start: usize,
) -> Line {
    let mut line = Line {
        paragraph,
        start,
        len: 0,
        display_start: start,
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        ascent: 0.0,
        descent: 0.0,
        width: 0.0,
        min_width: 0.0,
        indent: 0.0,
        bullet_indent: 0.0,
        runs: SmallVec::new(),
        spell_errors: Vec::new(),
        data_fields: Vec::new(),
        resume: filled.next,
    };

    for placed in &filled.runs {
        let segment = &segments[placed.segment];
        let shown = placed.display_start..placed.display_start + placed.display_len;
        let base = line.width;
        let x_of = |offset: usize, trailing: bool| {
            let local = offset - segment.start;
            let pos = if trailing {
                segment.positions.trailing(local)
            } else {
                segment.positions.leading(local)
            };
            base + pos - placed.segment_pos
        };

        if !segment.is_tab {
            if segment.metrics.y_offset <= 0.0 {
                for span in text.spell_spans() {
                    let from = span.start.max(shown.start);
                    let to = (span.start + span.len).min(shown.end);
                    if from < to {
                        line.spell_errors.push(PixelSpan {
                            start: from,
                            end: to,
                            left: x_of(from, false),
                            right: x_of(to - 1, true),
                        });
                    }
                }
            }
            for field in text.field_runs() {
                let from = field.start.max(shown.start);
                let to = (field.start + field.len).min(shown.end);
                if from < to {
                    line.data_fields.push(FieldHighlight {
                        field_id: field.field_id.clone(),
                        span: PixelSpan {
                            start: from,
                            end: to,
                            left: x_of(from, false),
                            right: x_of(to - 1, true),
                        },
                    });
                }
            }
        }

        line.ascent = line.ascent.max(segment.metrics.ascent);
        line.descent = line.descent.max(segment.metrics.descent);
        line.runs.push(LineRun {
            style: segment.style,
            start: placed.start,
            len: placed.len,
            display_start: placed.display_start,
            display_len: placed.display_len,
            width: placed.width,
            display_width: placed.display_width,
            left: line.width,
            right: line.width + placed.width,
            ascent: segment.metrics.ascent,
            descent: segment.metrics.descent,
            y_offset: segment.metrics.y_offset,
            is_tab: segment.is_tab,
            space_width: segment.metrics.space_width,
            char_edges: Vec::new(),
        });
        line.len += placed.len;
        line.width += placed.width;
        line.min_width += placed.min_width;
    }
    line.right = line.width;
    line.display_start = line.runs.first().map_or(line.start, |r| r.display_start);
    line
}

/// Trailing edges of the drawn characters of a piece, then of the spaces
/// that follow them. Tab pieces step from tab stop to tab stop.
fn run_edges(
    chars: &[char],
    segment: &Segment,
    placed: &PlacedRun,
    left: f32,
    tab_width: f32,
) -> Vec<f32> {
    let mut edges = Vec::with_capacity(placed.len);
    if segment.is_tab {
        let mut cur = if tab_width > 0.0 {
            left - left % tab_width
        } else {
            left
        };
        for offset in placed.start..placed.start + placed.len {
            if chars.get(offset) != Some(&'\t') {
                break;
            }
            cur += tab_width;
            edges.push(cur);
        }
        return edges;
    }
    let mut cur = left;
    for i in 0..placed.display_len {
        cur = left + segment.positions.trailing(placed.segment_char + i) - placed.segment_pos;
        edges.push(cur);
    }
    for offset in placed.display_start + edges.len()..placed.start + placed.len {
        if chars.get(offset) != Some(&' ') {
            break;
        }
        cur += segment.metrics.space_width;
        edges.push(cur);
    }
    edges
}

/// Applies indents and justification, and collects the bullets.
fn place_lines(text: &RuntimeText, out: &mut FormattedText) {
    let format_width = out.format_width;
    for (index, paragraph) in out.paragraphs.iter().enumerate() {
        let style = &paragraph.style;
        let mut bullet = None;
        for (line_index, line) in out.lines[paragraph.lines.clone()].iter_mut().enumerate() {
            let line_width = line.width + line.bullet_indent;
            let room = format_width - (line.indent + style.right_indent);
            let mut x = match style.justification {
                Justification::Left => 0.0,
                Justification::Center => (room - line_width) / 2.0,
                Justification::Right => room - line_width,
            };
            x += line.indent;
            if line_index == 0 && paragraph.bullet_indent > 0.0 {
                bullet = Some(BulletMark {
                    kind: style.bullet,
                    paragraph: index,
                    left: x,
                    top: line.top,
                    indent: paragraph.bullet_indent,
                    height: paragraph.height,
                    ascent: line.ascent,
                    style: text
                        .style_runs()
                        .get(index)
                        .and_then(|p| p.runs.first())
                        .map_or(text.empty_style(), |r| r.style),
                });
            }
            x += line.bullet_indent;
            line.shift_x(x);
        }
        let has_text = out.lines[paragraph.lines.clone()]
            .iter()
            .any(|line| line.runs.iter().any(|run| run.width > 0.0));
        if let Some(bullet) = bullet.filter(|_| has_text) {
            out.bullets.push(bullet);
        }
    }
}
