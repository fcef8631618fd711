// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement.
//!
//! The engine never talks to a font system itself. Everything it knows about
//! glyph geometry comes from a [`MeasurementProvider`] supplied by the host
//! for the duration of a layout pass.

use alloc::vec::Vec;

use crate::style::{BaselineOffset, Style};

/// Vertical metrics of a style's line box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
    /// Total line box height.
    pub height: f32,
}

/// Which side of a character to measure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CharEdge {
    /// The edge where the character starts.
    Leading,
    /// The edge where the character ends.
    Trailing,
}

/// Host-supplied glyph metrics.
pub trait MeasurementProvider {
    /// Line metrics for `style` drawn at [`Style::render_size`].
    ///
    /// The baseline shift of raised and lowered styles is derived by the
    /// engine and should not be applied here.
    fn measure_style(&mut self, style: &Style) -> FontMetrics;

    /// The x offset of an edge of character `index` of `run_text`, measured
    /// from the origin of the run when it is drawn in `style` at
    /// [`Style::render_size`].
    fn measure_char(&mut self, run_text: &str, style: &Style, index: usize, edge: CharEdge) -> f32;
}

/// Layout metrics of a style, including baseline offset adjustments.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StyleMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
    /// Total line box height.
    pub height: f32,
    /// Advance of a space character.
    pub space_width: f32,
    /// Vertical shift of the glyphs: negative raises, positive lowers.
    pub y_offset: f32,
}

impl StyleMetrics {
    pub(crate) fn from_font(metrics: FontMetrics, space_width: f32) -> Self {
        Self {
            ascent: metrics.ascent,
            descent: metrics.descent,
            height: metrics.height,
            space_width,
            y_offset: 0.0,
        }
    }

    /// Derives raised or lowered metrics from these, measured at the
    /// reduced size, and the metrics of the same style on the baseline.
    pub(crate) fn offset_from(self, base: Self, baseline: BaselineOffset) -> Self {
        match baseline {
            BaselineOffset::Normal => self,
            BaselineOffset::Super => {
                let offset = base.ascent / 2.0;
                let height = base.height.max(offset + self.ascent + base.descent);
                Self {
                    ascent: height - base.descent,
                    descent: base.descent,
                    height,
                    space_width: self.space_width,
                    y_offset: -offset,
                }
            }
            BaselineOffset::Sub => {
                let offset = self.ascent / 2.0;
                let descent = base.descent.max(self.descent + offset);
                Self {
                    ascent: base.ascent,
                    descent,
                    height: base.ascent + descent,
                    space_width: self.space_width,
                    y_offset: offset,
                }
            }
        }
    }
}

/// Edge offsets of every character in a measured run.
///
/// Built the first time a run is measured and kept in the
/// [`LayoutContext`](crate::LayoutContext) for as long as the run's text and
/// style stay the same.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RunPositions {
    pub(crate) leading: Vec<f32>,
    pub(crate) trailing: Vec<f32>,
}

impl RunPositions {
    pub(crate) fn measure(text: &str, style: &Style, provider: &mut dyn MeasurementProvider) -> Self {
        let count = text.chars().count();
        let mut positions = Self {
            leading: Vec::with_capacity(count),
            trailing: Vec::with_capacity(count),
        };
        for index in 0..count {
            positions
                .leading
                .push(provider.measure_char(text, style, index, CharEdge::Leading));
            positions
                .trailing
                .push(provider.measure_char(text, style, index, CharEdge::Trailing));
        }
        positions
    }

    /// Offset where character `index` starts; the run width past the end.
    pub(crate) fn leading(&self, index: usize) -> f32 {
        match self.leading.get(index) {
            Some(pos) => *pos,
            None => self.width(),
        }
    }

    /// Offset where character `index` ends.
    pub(crate) fn trailing(&self, index: usize) -> f32 {
        match self.trailing.get(index) {
            Some(pos) => *pos,
            None => self.width(),
        }
    }

    pub(crate) fn width(&self) -> f32 {
        self.trailing.last().copied().unwrap_or(0.0)
    }
}
