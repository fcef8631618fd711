// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec;

use super::utils::TestEnv;
use crate::layout::ResumePoint;
use crate::{LayoutConstraints, ParagraphPatch, RuntimeText, Size, StylePatch};

#[test]
fn wrap_breaks_after_the_last_fitting_space() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("The quick brown fox");
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(60.0));
    let lines = layout.lines();
    assert_eq!(lines.len(), 2);

    assert_eq!((lines[0].start, lines[0].len), (0, 10));
    assert_eq!(lines[0].runs[0].display_len, 9, "the trailing space is not drawn");
    assert_eq!(lines[0].width, 50.0);
    assert_eq!(
        lines[0].resume,
        Some(ResumePoint {
            run: 0,
            char: 10,
            pos: 50.0
        })
    );
    assert_eq!((lines[1].start, lines[1].len), (10, 9));
    assert_eq!(lines[1].width, 45.0);
    assert_eq!(lines[1].resume, None);
}

#[test]
fn wrap_overwide_word_gets_its_own_line() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Supercalifragilistic");
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(60.0));
    assert_eq!(layout.lines().len(), 1, "words are never split");
    assert_eq!(layout.lines()[0].len, 20);
    assert_eq!(layout.lines()[0].width, 100.0);

    let mut text = RuntimeText::from_text("Hi Supercalifragilistic");
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(60.0));
    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!((lines[0].start, lines[0].len), (0, 3));
    assert_eq!((lines[1].start, lines[1].len), (3, 20));
}

#[test]
fn wrap_resumes_each_paragraph() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("The quick brown fox\nok");
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(60.0));
    let starts: alloc::vec::Vec<_> = layout.lines().iter().map(|line| line.start).collect();
    assert_eq!(starts, [0, 10, 20]);
    assert_eq!(layout.lines()[1].len, 10, "the newline ends the second line");
    assert_eq!(layout.paragraphs()[0].lines, 0..2);
    assert_eq!(layout.paragraphs()[1].lines, 2..3);
}

#[test]
fn wrap_first_indent_narrows_the_first_line() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("The quick brown fox");
    text.set_paragraph_style(
        &ParagraphPatch {
            first_indent: Some(10.0),
            ..ParagraphPatch::default()
        },
        None,
        None,
    );
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(70.0));
    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].left, 10.0);
    assert_eq!(lines[1].left, 0.0);
    assert_eq!(lines[1].start, 10);
}

#[test]
fn wrap_text_wrap_lists_line_starts() {
    let mut env = TestEnv::new();
    let text = RuntimeText::from_text("The quick brown fox");
    assert_eq!(
        text.text_wrap(60.0, &mut env.layout_cx, &mut env.measurer),
        vec![0, 10]
    );

    let text = RuntimeText::from_text("One\n");
    assert_eq!(
        text.text_wrap(60.0, &mut env.layout_cx, &mut env.measurer),
        vec![0, 4]
    );
}

#[test]
fn wrap_text_fit_reports_narrowest_width() {
    let mut env = TestEnv::new();
    let text = RuntimeText::from_text("The quick brown fox");
    let size = text.text_fit(60.0, &mut env.layout_cx, &mut env.measurer);
    assert_eq!(
        size,
        Size {
            width: 45.0,
            height: 20.0
        }
    );
}

#[test]
fn wrap_format_change_size_keeps_line_breaks() {
    let mut env = TestEnv::new();
    let bigger = StylePatch::new().with_size(20.0);

    let mut text = RuntimeText::from_text("Hello world");
    let current = env.layout(&mut text, LayoutConstraints::default());
    let size = text.format_change_size(&current, &bigger, &mut env.layout_cx, &mut env.measurer);
    assert_eq!(
        size,
        Size {
            width: 110.0,
            height: 20.0
        }
    );

    let mut text = RuntimeText::from_text("The quick brown fox");
    let current = env.layout(&mut text, LayoutConstraints::wrapped(60.0));
    let size = text.format_change_size(&current, &bigger, &mut env.layout_cx, &mut env.measurer);
    assert_eq!(
        size,
        Size {
            width: 100.0,
            height: 40.0
        }
    );
    assert_eq!(text.text(), "The quick brown fox", "the text itself is untouched");
}
