// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::{RuntimeText, TextStyleArg};
use crate::style::StylePatch;

/// The extent of one data field occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFieldSpan {
    /// The field id, including its unique suffix.
    pub field_id: String,
    /// Offset of the first character.
    pub start: usize,
    /// Offset one past the last character.
    pub end: usize,
}

/// The part of a field id before its unique suffix.
///
/// `"price_3f"` and `"price"` both have the base id `"price"`.
pub fn base_field_id(field_id: &str) -> &str {
    match field_id.find('_') {
        Some(at) if at > 0 => &field_id[..at],
        _ => field_id,
    }
}

impl RuntimeText {
    /// The data field occurrence covering the character at `pos`.
    pub fn data_field_at(&self, pos: usize) -> Option<DataFieldSpan> {
        let field = self.style_at(pos).data_field.as_ref()?;
        if pos >= self.len() {
            return None;
        }
        let same = |i: usize| self.style(self.char_styles[i]).data_field.as_ref() == Some(field);
        let mut start = pos;
        while start > 0 && same(start - 1) {
            start -= 1;
        }
        let mut end = pos + 1;
        while end < self.len() && same(end) {
            end += 1;
        }
        Some(DataFieldSpan {
            field_id: field.clone(),
            start,
            end,
        })
    }

    /// Every data field occurrence, in text order.
    pub fn data_field_spans(&self) -> Vec<DataFieldSpan> {
        let mut spans = Vec::new();
        let mut pos = 0;
        while pos < self.len() {
            match self.data_field_at(pos) {
                Some(span) => {
                    pos = span.end;
                    spans.push(span);
                }
                None => pos += 1,
            }
        }
        spans
    }

    /// Whether any character is bound to a data field.
    pub fn has_data_fields(&self) -> bool {
        self.char_styles
            .iter()
            .any(|&id| self.style(id).data_field.is_some())
    }

    /// Whether a field with the same base id as `field_id` occurs.
    pub fn has_data_field(&self, field_id: &str) -> bool {
        let base = base_field_id(field_id);
        self.data_field_spans()
            .iter()
            .any(|span| base_field_id(&span.field_id) == base)
    }

    /// Whether any character of `start..=end` is bound to a data field.
    pub fn is_data_field_in_range(&self, start: usize, end: usize) -> bool {
        self.has_data_fields()
            && (start..=end).any(|i| self.style_at(i).data_field.is_some())
    }

    /// Widens `start..end` so that it does not split a data field.
    pub fn widen_to_data_fields(&self, start: usize, end: usize) -> (usize, usize) {
        let start = self.data_field_at(start).map_or(start, |field| field.start);
        let end = end.max(start);
        let end = match self.data_field_at(end) {
            Some(field) if field.start != end => field.end,
            _ => end,
        };
        (start, end)
    }

    /// `field_id` with a unique suffix, unless it already has one.
    pub fn format_data_field_id(&mut self, field_id: &str) -> String {
        if base_field_id(field_id) != field_id {
            return String::from(field_id);
        }
        self.field_serial += 1;
        format!("{field_id}_{:x}", self.field_serial)
    }

    /// Replaces `start..start + length` with `text` bound to a new
    /// occurrence of `field_id`.
    pub fn insert_data_field(
        &mut self,
        field_id: &str,
        text: &str,
        start: Option<usize>,
        length: Option<usize>,
    ) -> bool {
        let field_id = self.format_data_field_id(field_id);
        log::debug!("inserting data field {field_id}");
        self.set_text(
            text,
            &TextStyleArg::Patch(StylePatch::new().with_data_field(Some(field_id))),
            start,
            length,
        )
    }

    /// Unbinds the characters of every occurrence of `field_id`, or of all
    /// fields when `None`. The characters themselves stay.
    pub fn clear_data_field(&mut self, field_id: Option<&str>) {
        let clear = StylePatch::new().with_data_field(None);
        match field_id {
            Some(field_id) => {
                let base = base_field_id(field_id);
                for span in self.data_field_spans() {
                    if base_field_id(&span.field_id) == base {
                        self.set_format(&clear, Some(span.start), Some(span.end - span.start));
                    }
                }
            }
            None => {
                if self.has_data_fields() {
                    self.set_format(&clear, None, None);
                }
            }
        }
    }

    /// Replaces the text of every field with the value `resolve` returns.
    ///
    /// Fields are processed back to front so earlier offsets stay valid. A
    /// field resolving to an empty value is removed together with its text.
    pub fn rebuild_from_data(&mut self, resolve: &mut dyn FnMut(&str) -> String) {
        for span in self.data_field_spans().into_iter().rev() {
            let value = resolve(&span.field_id);
            let style = if value.is_empty() {
                TextStyleArg::Inherit
            } else {
                TextStyleArg::Patch(StylePatch::new().with_data_field(Some(span.field_id.clone())))
            };
            self.set_text(&value, &style, Some(span.start), Some(span.end - span.start));
        }
    }

    /// Rebinds fields whose base id is a source in `mapping` to the paired
    /// destination, keeping each occurrence's unique suffix.
    pub fn remap_data_fields(&mut self, mapping: &[(&str, &str)]) {
        let changed = self.remap_styles(|style| {
            let field = style.data_field.as_deref()?;
            let base = base_field_id(field);
            let (_, dst) = mapping.iter().find(|(src, _)| *src == base)?;
            let mut style = style.clone();
            style.data_field = Some(format!("{dst}{}", &field[base.len()..]));
            Some(style)
        });
        if changed {
            self.rebuild_runs();
        }
    }
}
