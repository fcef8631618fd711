// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy line filling over measured segments.

use alloc::vec::Vec;

use super::measured::Segment;

/// Where the next line of a paragraph continues.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ResumePoint {
    /// Index of the segment.
    pub run: usize,
    /// Character offset inside the segment.
    pub char: usize,
    /// Pixel offset of that character from the segment origin.
    pub pos: f32,
}

/// A piece of a segment placed on a line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct PlacedRun {
    pub(crate) segment: usize,
    pub(crate) start: usize,
    pub(crate) len: usize,
    pub(crate) display_start: usize,
    pub(crate) display_len: usize,
    pub(crate) width: f32,
    pub(crate) display_width: f32,
    pub(crate) min_width: f32,
    /// Offset of the piece inside its segment.
    pub(crate) segment_char: usize,
    /// Pixel offset of the piece inside its segment.
    pub(crate) segment_pos: f32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FilledLine {
    pub(crate) runs: Vec<PlacedRun>,
    pub(crate) next: Option<ResumePoint>,
}

/// The last break seen on the current line, to back up to.
#[derive(Copy, Clone, Debug)]
struct Fallback {
    run_index: usize,
    start_char: usize,
    end_char: usize,
    start_pos: f32,
    end_pos: f32,
    is_run_end: bool,
    segment: usize,
    segment_char: usize,
    segment_pos: f32,
}

/// Fills one line of at most `available` pixels, starting at `resume` or at
/// the start of the paragraph.
///
/// A segment that does not fit is cut at its last break that does. Failing
/// that the line backs up to the last break placed earlier on it. A word
/// wider than a whole line is placed on a line of its own rather than split.
pub(crate) fn fill_line(
    segments: &[Segment],
    mut available: f32,
    resume: Option<ResumePoint>,
    tab_width: f32,
) -> FilledLine {
    let initial = resume.is_none();
    let (mut cur_run, mut cur_char, mut cur_pos) =
        resume.map_or((0, 0, 0.0), |r| (r.run, r.char, r.pos));
    if let Some(segment) = segments.get(cur_run).filter(|_| !initial) {
        cur_char = cur_char.max(segment.display_start);
        cur_pos = cur_pos.max(segment.display_start_pos);
    }

    let mut line = FilledLine::default();
    let mut line_width = 0.0;
    let mut fallback: Option<Fallback> = None;

    while let Some(segment) = segments.get(cur_run) {
        let display_width = (segment.display_end_pos - cur_pos).max(0.0);
        if display_width > available {
            break;
        }
        let mut run = PlacedRun {
            segment: cur_run,
            start: segment.start + cur_char,
            len: segment.len.saturating_sub(cur_char),
            display_start: segment.start + cur_char,
            display_len: segment.display_end.saturating_sub(cur_char),
            width: (segment.width - cur_pos).min(available),
            display_width,
            min_width: display_width,
            segment_char: cur_char,
            segment_pos: cur_pos,
        };
        if segment.is_tab && tab_width > 0.0 {
            let stop = line_width - line_width % tab_width;
            run.width = stop + tab_width * run.len as f32 - line_width;
        }
        if segment.has_newline {
            run.len += 1;
        }
        if run.width > 0.0 || run.len > 0 {
            if let Some(brk) = segment.breaks.last().filter(|b| b.start >= cur_char) {
                fallback = Some(Fallback {
                    run_index: line.runs.len(),
                    start_char: brk.start - cur_char,
                    end_char: brk.end - cur_char,
                    start_pos: brk.start_pos - cur_pos,
                    end_pos: brk.end_pos - cur_pos,
                    is_run_end: brk.end == segment.len,
                    segment: cur_run,
                    segment_char: cur_char,
                    segment_pos: cur_pos,
                });
            }
            line.runs.push(run);
        }
        available -= run.width;
        line_width += run.width;
        cur_run += 1;
        cur_char = 0;
        cur_pos = 0.0;
    }

    let Some(segment) = segments.get(cur_run) else {
        if initial && line.runs.is_empty() {
            if let Some(first) = segments.first() {
                line.runs.push(PlacedRun {
                    segment: 0,
                    start: first.start,
                    len: usize::from(first.has_newline),
                    display_start: first.start,
                    display_len: 0,
                    width: 0.0,
                    display_width: 0.0,
                    min_width: 0.0,
                    segment_char: 0,
                    segment_pos: 0.0,
                });
            }
        }
        return line;
    };

    let mut next = ResumePoint {
        run: cur_run,
        char: cur_char,
        pos: cur_pos,
    };
    let mut placed = false;
    if available > 0.0 {
        let fitting = segment
            .breaks
            .iter()
            .rev()
            .filter(|b| b.start >= cur_char && b.end > cur_char)
            .find(|b| b.start_pos - cur_pos <= available);
        if let Some(brk) = fitting {
            next.char = brk.end;
            next.pos = brk.end_pos;
            let display_width = brk.start_pos - cur_pos;
            line.runs.push(PlacedRun {
                segment: cur_run,
                start: segment.start + cur_char,
                len: brk.end - cur_char,
                display_start: segment.start + cur_char,
                display_len: brk.start - cur_char,
                width: (brk.end_pos - cur_pos).min(available),
                display_width,
                min_width: display_width,
                segment_char: cur_char,
                segment_pos: cur_pos,
            });
            placed = true;
        } else if let Some(fallback) = fallback {
            if !fallback.is_run_end {
                line.runs.truncate(fallback.run_index + 1);
                if let Some(run) = line.runs.get_mut(fallback.run_index) {
                    run.width = fallback.end_pos;
                    run.len = fallback.end_char;
                    run.display_len = fallback.start_char;
                    run.display_width = fallback.start_pos;
                    run.min_width = fallback.start_pos;
                }
                next = ResumePoint {
                    run: fallback.segment,
                    char: fallback.end_char + fallback.segment_char,
                    pos: fallback.end_pos + fallback.segment_pos,
                };
            }
            placed = true;
        }
    }

    if !placed && line.runs.is_empty() {
        // Nothing fits and nothing is on the line: place the next word whole.
        let word_end = segment
            .breaks
            .iter()
            .find(|b| b.start >= cur_char && b.end > cur_char);
        let (len, display_len, width, display_width, resume_at) = match word_end {
            Some(brk) if brk.end < segment.len => (
                brk.end - cur_char,
                brk.start - cur_char,
                brk.end_pos - cur_pos,
                brk.start_pos - cur_pos,
                Some(ResumePoint {
                    run: cur_run,
                    char: brk.end,
                    pos: brk.end_pos,
                }),
            ),
            _ => (
                segment.len - cur_char + usize::from(segment.has_newline),
                segment.display_end.saturating_sub(cur_char),
                segment.width - cur_pos,
                (segment.display_end_pos - cur_pos).max(0.0),
                (cur_run + 1 < segments.len()).then_some(ResumePoint {
                    run: cur_run + 1,
                    char: 0,
                    pos: 0.0,
                }),
            ),
        };
        log::trace!(
            "placing {len} chars at {} on an overfull line",
            segment.start + cur_char
        );
        line.runs.push(PlacedRun {
            segment: cur_run,
            start: segment.start + cur_char,
            len,
            display_start: segment.start + cur_char,
            display_len,
            width: width.max(0.0),
            display_width,
            min_width: display_width,
            segment_char: cur_char,
            segment_pos: cur_pos,
        });
        line.next = resume_at;
        return line;
    }

    line.next = Some(next);
    line
}
