// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::{RecordingSink, SinkItem, TestEnv};
use crate::editing::Modifiers;
use crate::layout::{Caret, Direction};
use crate::style::{BulletKind, Color, Justification};
use crate::{
    LayoutConstraints, LayoutContext, ParagraphPatch, Point, Rect, RenderOptions, RuntimeText,
};

fn paragraph_patch() -> ParagraphPatch {
    ParagraphPatch::default()
}

#[test]
fn layout_two_paragraphs() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hello\nWorld");
    let layout = env.layout(&mut text, LayoutConstraints::default());

    assert_eq!(layout.paragraphs().len(), 2);
    let lines = layout.lines();
    assert_eq!(lines.len(), 2);
    for (line, paragraph) in lines.iter().zip(text.style_runs()) {
        assert_eq!(line.runs.len(), 1, "one run per line");
        assert_eq!(line.start, paragraph.start);
        assert_eq!(line.len, paragraph.len);
    }
    let first = &lines[0].runs[0];
    assert_eq!((first.display_start, first.display_len), (0, 5));
    assert_eq!(first.len, 6, "the newline belongs to the line but is not drawn");
    assert_eq!(first.char_edges, [5.0, 10.0, 15.0, 20.0, 25.0]);
    assert_eq!(lines[1].runs[0].display_len, 5);
    assert_eq!((lines[0].top, lines[0].bottom), (0.0, 10.0));
    assert_eq!((lines[1].top, lines[1].bottom), (10.0, 20.0));
    assert_eq!(layout.width(), 25.0);
    assert_eq!(layout.height(), 20.0);
    assert_eq!(layout.text_len(), 11);
}

#[test]
fn layout_is_idempotent() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("The quick brown fox\njumps");
    let constraints = LayoutConstraints::wrapped(60.0);
    let first = env.layout(&mut text, constraints);
    let second = env.layout(&mut text, constraints);
    assert_eq!(first, second);

    // A fresh context measures the same.
    let mut fresh = TestEnv::new();
    assert_eq!(fresh.layout(&mut text, constraints), first);
}

#[test]
fn layout_deferred_without_provider() {
    let mut text = RuntimeText::from_text("Hello");
    let mut cx = LayoutContext::new();
    let layout = text.layout(&LayoutConstraints::default(), &mut cx, None);
    assert!(layout.lines().is_empty());
    assert!(text.deferred_render_needed());

    let mut env = TestEnv::new();
    let layout = env.layout(&mut text, LayoutConstraints::default());
    assert_eq!(layout.lines().len(), 1);
    assert!(!text.deferred_render_needed());
}

#[test]
fn layout_paragraph_spacing() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hello\nWorld");
    text.set_paragraph_style(
        &ParagraphPatch {
            spacing: Some(0.5),
            ..paragraph_patch()
        },
        None,
        None,
    );
    let layout = env.layout(&mut text, LayoutConstraints::default());
    assert_eq!(layout.lines()[0].height(), 15.0);
    assert_eq!(
        layout.lines()[1].height(),
        10.0,
        "the last line of the text gets no extra space"
    );
    assert_eq!(layout.height(), 25.0);

    // A negative spacing is a minimum line height.
    text.set_paragraph_style(
        &ParagraphPatch {
            spacing: Some(-16.0),
            ..paragraph_patch()
        },
        None,
        None,
    );
    let layout = env.layout(&mut text, LayoutConstraints::default());
    assert_eq!(layout.lines()[0].height(), 16.0);
    assert_eq!(layout.height(), 26.0);
}

#[test]
fn layout_bullets_skip_empty_paragraphs() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Item\n\nNext");
    text.set_paragraph_style(
        &ParagraphPatch {
            bullet: Some(BulletKind::SolidRound),
            first_indent: Some(30.0),
            ..paragraph_patch()
        },
        None,
        None,
    );
    assert_eq!(text.paragraph_styles()[0].first_indent, 0.0, "bullets replace indents");

    let layout = env.layout(&mut text, LayoutConstraints::default());
    let bullets = layout.bullets();
    assert_eq!(bullets.len(), 2);
    assert_eq!(bullets[0].paragraph, 0);
    assert_eq!(bullets[1].paragraph, 2);
    assert_eq!(bullets[0].indent, 8.0);
    assert_eq!(layout.lines()[0].left, 8.0, "text starts after the bullet");
    assert_eq!(layout.width(), 28.0);

    let mut sink = RecordingSink::default();
    layout.render(&text, &RenderOptions::default(), &mut sink);
    let drawn: alloc::vec::Vec<_> = sink
        .items
        .iter()
        .filter_map(|item| match item {
            SinkItem::Bullet(bullet) => Some(*bullet),
            _ => None,
        })
        .collect();
    assert_eq!(drawn.len(), 2);
    assert_eq!(drawn[0].bounds, Rect::new(2.0, 4.0, 6.0, 8.0));
    assert_eq!(drawn[1].bounds, Rect::new(2.0, 24.0, 6.0, 28.0));
    assert_eq!(drawn[0].color, Color::BLACK);
    assert!(drawn[0].is_filled());
}

#[test]
fn layout_justification_uses_min_width() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hi");
    let constraints = LayoutConstraints {
        min_width: 100.0,
        ..LayoutConstraints::default()
    };
    let justify = |text: &mut RuntimeText, justification| {
        text.set_paragraph_style(
            &ParagraphPatch {
                justification: Some(justification),
                ..paragraph_patch()
            },
            None,
            None,
        );
    };

    justify(&mut text, Justification::Center);
    let layout = env.layout(&mut text, constraints);
    assert_eq!(layout.format_width(), 100.0);
    assert_eq!((layout.lines()[0].left, layout.lines()[0].right), (45.0, 55.0));
    assert_eq!(layout.size().width, 100.0);

    justify(&mut text, Justification::Right);
    let layout = env.layout(&mut text, constraints);
    assert_eq!(layout.lines()[0].left, 90.0);
}

#[test]
fn layout_tabs_snap_to_stops() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("a\tb");
    text.set_paragraph_style(
        &ParagraphPatch {
            tab_width: Some(40.0),
            ..paragraph_patch()
        },
        None,
        None,
    );
    let layout = env.layout(&mut text, LayoutConstraints::default());
    let line = &layout.lines()[0];
    assert_eq!(line.runs.len(), 3);
    assert!(line.runs[1].is_tab);
    assert_eq!(line.runs[1].left, 5.0);
    assert_eq!(line.runs[1].char_edges, [40.0]);
    assert_eq!(line.runs[2].left, 40.0);
    assert_eq!(line.width, 45.0);

    let tab = layout.char_geometry(1, None);
    assert_eq!((tab.left, tab.right), (5.0, 40.0));
    assert_eq!(layout.char_geometry(2, None).left, 40.0);
    assert_eq!(layout.hit_test(&text, Point::new(30.0, 5.0)).index, 2);
}

#[test]
fn layout_hit_test() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hello\nWorld");
    let layout = env.layout(&mut text, LayoutConstraints::default());
    let hit = |x, y| layout.hit_test(&text, Point::new(x, y));

    assert_eq!(hit(12.0, 5.0).index, 2, "left of the midpoint of 'l'");
    assert_eq!(hit(13.0, 5.0).index, 3, "right of the midpoint of 'l'");
    assert_eq!(hit(3.0, 15.0).index, 7);
    assert_eq!(hit(3.0, 15.0).line, 1);

    let past_end = hit(100.0, 5.0);
    assert_eq!((past_end.index, past_end.line), (5, 0));
    assert_eq!(hit(100.0, 15.0).index, 11);

    let below = hit(0.0, 30.0);
    assert_eq!((below.index, below.line), (11, 1));
    assert_eq!(hit(5.0, -1.0).index, 0);
    assert!(!hit(12.0, 5.0).in_data_field);
}

#[test]
fn layout_hit_test_reports_data_fields() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Cost: ");
    text.insert_data_field("price", "$100", Some(6), Some(0));
    let layout = env.layout(&mut text, LayoutConstraints::default());
    assert!(layout.hit_test(&text, Point::new(42.0, 5.0)).in_data_field);
    assert!(!layout.hit_test(&text, Point::new(12.0, 5.0)).in_data_field);
}

#[test]
fn layout_char_geometry_at_soft_wrap() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("The quick brown fox");
    let layout = env.layout(&mut text, LayoutConstraints::wrapped(60.0));

    let next_line = layout.char_geometry(10, None);
    assert_eq!(next_line.line, Some(1));
    assert_eq!((next_line.left, next_line.top), (0.0, 10.0));

    let line_end = layout.char_geometry(10, Some(0));
    assert_eq!(line_end.line, Some(0), "the hint keeps the caret on the first line");
    assert_eq!((line_end.left, line_end.top), (50.0, 0.0));

    let line = layout.line_geometry(1).expect("two lines");
    assert_eq!((line.top, line.bottom), (10.0, 20.0));
    assert_eq!(layout.line_geometry(2), None);
}

#[test]
fn layout_range_rects() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hello\nWorld");
    let layout = env.layout(&mut text, LayoutConstraints::default());

    assert_eq!(
        layout.range_rects(1, 3).as_slice(),
        &[Rect::new(5.0, 0.0, 15.0, 10.0)]
    );
    assert_eq!(
        layout.range_rects(2, 8).as_slice(),
        &[
            Rect::new(10.0, 0.0, 25.0, 10.0),
            Rect::new(0.0, 10.0, 10.0, 20.0)
        ]
    );
    assert!(layout.range_rects(3, 1).is_empty());
}

#[test]
fn layout_adjacent_char() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Hello\nWorld");
    let layout = env.layout(&mut text, LayoutConstraints::default());
    let none = Modifiers::default();
    let at = |index, line| Caret { index, line };

    let down = layout.adjacent_char(&text, at(2, Some(0)), Direction::Down, none);
    assert_eq!(down, at(8, Some(1)));
    let up = layout.adjacent_char(&text, down, Direction::Up, none);
    assert_eq!(up, at(2, Some(0)));
    let end = layout.adjacent_char(&text, at(2, Some(0)), Direction::End, none);
    assert_eq!(end, at(5, Some(0)));
    let home = layout.adjacent_char(&text, at(9, Some(1)), Direction::Home, none);
    assert_eq!(home, at(6, Some(1)));
    let text_end = layout.adjacent_char(&text, at(2, Some(0)), Direction::End, Modifiers::CTRL);
    assert_eq!(text_end, at(11, None));
    let first = layout.adjacent_char(&text, at(0, None), Direction::Prev, none);
    assert_eq!(first.index, 0);
}

#[test]
fn layout_adjacent_char_skips_data_fields() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Cost: ");
    text.insert_data_field("price", "$100", Some(6), Some(0));
    text.set_text("!", &crate::TextStyleArg::Inherit, Some(10), Some(0));
    let layout = env.layout(&mut text, LayoutConstraints::default());
    let none = Modifiers::default();

    let forward = layout.adjacent_char(&text, Caret { index: 6, line: None }, Direction::Next, none);
    assert_eq!(forward.index, 10);
    let back = layout.adjacent_char(&text, Caret { index: 10, line: None }, Direction::Prev, none);
    assert_eq!(back.index, 6);
}

#[test]
fn layout_render_draws_runs_and_links() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Visit site");
    text.set_hyperlink("https://a.example", Some(6), Some(4));
    let sink = env.render(&mut text);

    assert_eq!(sink.texts(), ["Visit", "site"], "trailing spaces are not drawn");
    assert_eq!(
        sink.items,
        [
            SinkItem::Text {
                text: "Visit".into(),
                origin: Point::new(0.0, 8.0),
                width: 25.0,
                link: None,
            },
            SinkItem::Text {
                text: "site".into(),
                origin: Point::new(30.0, 8.0),
                width: 20.0,
                link: Some("https://a.example".into()),
            },
            SinkItem::Underline {
                origin: Point::new(30.0, 8.0),
                width: 20.0,
                color: Color::HYPERLINK,
            },
        ]
    );

    let layout = env.layout(&mut text, LayoutConstraints::default());
    let mut plain = RecordingSink::default();
    let options = RenderOptions {
        links_enabled: false,
        ..RenderOptions::default()
    };
    layout.render(&text, &options, &mut plain);
    assert_eq!(plain.items.len(), 2, "no underline without links");
    let link = layout.hyperlink_at_point(&text, Point::new(40.0, 5.0));
    assert_eq!(link.map(|l| l.url), Some("https://a.example"));
    assert_eq!(layout.hyperlink_at_point(&text, Point::new(10.0, 5.0)), None);
}

#[test]
fn layout_render_highlights_data_fields() {
    let mut env = TestEnv::new();
    let mut text = RuntimeText::from_text("Cost: ");
    text.insert_data_field("price", "$100", Some(6), Some(0));
    let layout = env.layout(&mut text, LayoutConstraints::default());
    let field_id = text.data_field_spans()[0].field_id.clone();

    let mut sink = RecordingSink::default();
    let options = RenderOptions {
        data_fields: true,
        ..RenderOptions::default()
    };
    layout.render(&text, &options, &mut sink);
    assert!(sink.items.contains(&SinkItem::DataField {
        field_id,
        rect: Rect::new(30.0, 0.0, 50.0, 10.0),
    }));
}
