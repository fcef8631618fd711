// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measured segments: style runs split at tabs, with their break
//! opportunities and character edges.

use alloc::string::String;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::context::LayoutContext;
use crate::measure::{MeasurementProvider, RunPositions, StyleMetrics};
use crate::runs::StyleRun;
use crate::style::{StyleId, StyleTable};
use crate::util::is_space;

/// A whitespace span inside a segment, where a line may wrap.
///
/// Offsets are relative to the segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Break {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) start_pos: f32,
    pub(crate) end_pos: f32,
}

/// A piece of a style run that is either all tabs or free of tabs.
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    /// Absolute offset of the first character.
    pub(crate) start: usize,
    /// Number of characters, not counting a terminating newline.
    pub(crate) len: usize,
    pub(crate) has_newline: bool,
    pub(crate) is_tab: bool,
    pub(crate) style: StyleId,
    pub(crate) metrics: StyleMetrics,
    pub(crate) breaks: SmallVec<[Break; 4]>,
    /// First character shown when a line starts inside this segment.
    pub(crate) display_start: usize,
    /// One past the last character shown when a line ends with this segment.
    pub(crate) display_end: usize,
    pub(crate) width: f32,
    pub(crate) display_start_pos: f32,
    pub(crate) display_end_pos: f32,
    pub(crate) positions: RunPositions,
}

/// Splits the runs of `paragraph` into measured segments.
pub(crate) fn measure_paragraph(
    chars: &[char],
    paragraph: &StyleRun,
    styles: &StyleTable,
    cx: &mut LayoutContext,
    provider: &mut dyn MeasurementProvider,
) -> Vec<Segment> {
    let mut pieces: Vec<(usize, usize, StyleId, bool)> = Vec::new();
    for run in &paragraph.runs {
        if run.len == 0 {
            pieces.push((run.start, 0, run.style, false));
            continue;
        }
        let mut start = run.start;
        let mut is_tab = chars.get(start) == Some(&'\t');
        for offset in run.start..run.end() {
            let tab = chars.get(offset) == Some(&'\t');
            if tab != is_tab {
                pieces.push((start, offset - start, run.style, is_tab));
                start = offset;
                is_tab = tab;
            }
        }
        pieces.push((start, run.end() - start, run.style, is_tab));
    }

    let mut segments = Vec::with_capacity(pieces.len());
    for (start, len, style_id, is_tab) in pieces {
        let style = styles.resolve(style_id);
        let has_newline = len > 0 && chars.get(start + len - 1) == Some(&'\n');
        let len = if has_newline { len - 1 } else { len };
        let content = chars.get(start..start + len).unwrap_or_default();

        let mut breaks: SmallVec<[Break; 4]> = SmallVec::new();
        let mut i = 0;
        while i < content.len() {
            if is_space(content[i]) {
                let begin = i;
                while i < content.len() && is_space(content[i]) {
                    i += 1;
                }
                breaks.push(Break {
                    start: begin,
                    end: i,
                    start_pos: 0.0,
                    end_pos: 0.0,
                });
            } else {
                i += 1;
            }
        }

        let is_data_field = style.data_field.is_some();
        let mut segment = Segment {
            start,
            len,
            has_newline,
            is_tab,
            style: style_id,
            metrics: cx.style_metrics(style, provider),
            breaks,
            display_start: 0,
            display_end: len,
            width: 0.0,
            display_start_pos: 0.0,
            display_end_pos: 0.0,
            positions: RunPositions::default(),
        };
        if is_tab {
            // Tabs are never drawn but stay at the start of a wrapped line.
            segment.display_end = 0;
            segments.push(segment);
            continue;
        }
        if !is_data_field {
            if let (Some(first), Some(last)) = (segment.breaks.first(), segment.breaks.last()) {
                if first.start == 0 {
                    segment.display_start = first.end;
                }
                if last.end == len {
                    segment.display_end = last.start;
                }
            }
        }
        if len > 0 {
            let text: String = content.iter().collect();
            segment.positions = cx.run_positions(style, &text, provider).clone();
            let width = segment.positions.trailing(len - 1);
            segment.width = width;
            segment.display_end_pos = width;
            let count = segment.breaks.len();
            for (index, brk) in segment.breaks.iter_mut().enumerate() {
                if brk.start > 0 {
                    brk.start_pos = segment.positions.leading(brk.start);
                }
                brk.end_pos = if brk.end == len {
                    width
                } else {
                    segment.positions.leading(brk.end)
                };
                if !is_data_field && index == 0 && brk.start == 0 {
                    segment.display_start_pos = brk.end_pos;
                }
                if !is_data_field && index + 1 == count && brk.end == len {
                    segment.display_end_pos = brk.start_pos;
                }
            }
        }
        log::trace!(
            "segment {start}+{len} tab={is_tab} width={} breaks={}",
            segment.width,
            segment.breaks.len()
        );
        segments.push(segment);
    }
    segments
}
