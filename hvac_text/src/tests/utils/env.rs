// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use super::RecordingHost;
use crate::style::Color;
use crate::{
    BulletItem, CharEdge, Editor, EditorDriver, FontMetrics, FormattedText, LayoutConstraints,
    LayoutContext, MeasurementProvider, Point, Rect, RenderOptions, RenderSink, RuntimeText, Style,
    TextRunItem,
};

/// Every character advances by half the render size.
///
/// With the default 10px style that is 5px per character, an ascent of 8px,
/// a descent of 2px and 10px lines.
#[derive(Debug, Default)]
pub(crate) struct FixedMeasurer {
    pub(crate) style_calls: usize,
}

impl MeasurementProvider for FixedMeasurer {
    fn measure_style(&mut self, style: &Style) -> FontMetrics {
        self.style_calls += 1;
        let size = style.render_size();
        FontMetrics {
            ascent: size * 0.8,
            descent: size * 0.2,
            height: size,
        }
    }

    fn measure_char(&mut self, _: &str, style: &Style, index: usize, edge: CharEdge) -> f32 {
        let advance = style.render_size() / 2.0;
        match edge {
            CharEdge::Leading => advance * index as f32,
            CharEdge::Trailing => advance * (index + 1) as f32,
        }
    }
}

/// A drawing command captured by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SinkItem {
    Text {
        text: String,
        origin: Point,
        width: f32,
        link: Option<String>,
    },
    Underline {
        origin: Point,
        width: f32,
        color: Color,
    },
    Bullet(BulletItem),
    SpellError {
        origin: Point,
        width: f32,
    },
    DataField {
        field_id: String,
        rect: Rect,
    },
    Selection(Rect),
    Caret(Rect),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) items: Vec<SinkItem>,
}

impl RecordingSink {
    pub(crate) fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                SinkItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn carets(&self) -> Vec<Rect> {
        self.items
            .iter()
            .filter_map(|item| match item {
                SinkItem::Caret(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn selections(&self) -> Vec<Rect> {
        self.items
            .iter()
            .filter_map(|item| match item {
                SinkItem::Selection(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn text_run(&mut self, run: &TextRunItem<'_>) {
        self.items.push(SinkItem::Text {
            text: String::from(run.text),
            origin: run.origin,
            width: run.width,
            link: run.hyperlink.map(|link| String::from(link.url)),
        });
    }

    fn underline(&mut self, origin: Point, width: f32, color: Color) {
        self.items.push(SinkItem::Underline {
            origin,
            width,
            color,
        });
    }

    fn bullet(&mut self, bullet: &BulletItem) {
        self.items.push(SinkItem::Bullet(*bullet));
    }

    fn spell_error(&mut self, origin: Point, width: f32) {
        self.items.push(SinkItem::SpellError { origin, width });
    }

    fn data_field(&mut self, field_id: &str, rect: Rect) {
        self.items.push(SinkItem::DataField {
            field_id: String::from(field_id),
            rect,
        });
    }

    fn selection(&mut self, rect: Rect) {
        self.items.push(SinkItem::Selection(rect));
    }

    fn caret(&mut self, rect: Rect) {
        self.items.push(SinkItem::Caret(rect));
    }
}

pub(crate) struct TestEnv {
    pub(crate) layout_cx: LayoutContext,
    pub(crate) measurer: FixedMeasurer,
    pub(crate) host: RecordingHost,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self {
            layout_cx: LayoutContext::new(),
            measurer: FixedMeasurer::default(),
            host: RecordingHost::default(),
        }
    }

    pub(crate) fn editor(&self, text: &str) -> Editor {
        Editor::new(RuntimeText::from_text(text))
    }

    pub(crate) fn driver<'a>(&'a mut self, editor: &'a mut Editor) -> EditorDriver<'a> {
        editor.driver(&mut self.layout_cx, &mut self.measurer, &mut self.host)
    }

    pub(crate) fn layout(
        &mut self,
        text: &mut RuntimeText,
        constraints: LayoutConstraints,
    ) -> FormattedText {
        let measurer: &mut dyn MeasurementProvider = &mut self.measurer;
        text.layout(&constraints, &mut self.layout_cx, Some(measurer))
    }

    pub(crate) fn render(&mut self, text: &mut RuntimeText) -> RecordingSink {
        let layout = self.layout(text, LayoutConstraints::default());
        let mut sink = RecordingSink::default();
        layout.render(text, &RenderOptions::default(), &mut sink);
        sink
    }
}
