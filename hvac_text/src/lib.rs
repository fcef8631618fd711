// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich text layout and in-place editing for diagram labels.
//!
//! A [`RuntimeText`] holds the characters of a label together with one
//! style per character and one paragraph style per paragraph. Laying it out
//! with [`RuntimeText::layout`] produces a [`FormattedText`]: wrapped lines
//! of measured runs which answer hit-testing and caret queries and can be
//! drawn through a [`RenderSink`]. Glyph metrics come from the host through
//! a [`MeasurementProvider`], so the engine itself never touches fonts.
//!
//! An [`Editor`] adds a caret and selection on top, driven by pointer and
//! keyboard events from the host and reporting back through an
//! [`EditHost`].
//!
//! ## Features
//!
//! - `std` (enabled by default): Forwards `std` to `log`.
//! - `serde`: Derives `Serialize` and `Deserialize` for [`PersistedText`]
//!   and the style types it contains.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod error;
mod geometry;
mod host;
mod lru_cache;
mod measure;
mod render;
mod runs;
mod runtime;
mod spell;
mod text_range;
mod util;
mod words;

pub mod context;
pub mod editing;
pub mod layout;
pub mod style;

#[cfg(test)]
mod tests;

pub use context::{LayoutConfig, LayoutConstraints, LayoutContext};
pub use editing::{Editor, EditorConfig, EditorDriver, EditState, Generation, Selection};
pub use error::{Error, ErrorKind};
pub use geometry::{Point, Rect, Size};
pub use host::{CursorAffordance, EditEvent, EditHost, MirrorUpdate};
pub use layout::FormattedText;
pub use measure::{CharEdge, FontMetrics, MeasurementProvider, StyleMetrics};
pub use render::{BulletItem, RenderOptions, RenderSink, TextRunItem};
pub use runs::{FieldRun, Run, SpellSpan, StyleRun};
pub use runtime::{
    DataFieldSpan, Hyperlink, PersistedText, RuntimeSnippet, RuntimeText, SnippetParagraph,
    TextStyleArg, base_field_id,
};
pub use spell::{CheckedWord, SpellCheckProvider, SpellRequest, SpellResults};
pub use style::{ParagraphPatch, ParagraphStyle, Style, StyleId, StylePatch, StyleTable};
pub use text_range::TextRange;
pub use words::{WordEntry, WordList, WordStatus, is_word_char, prev_next_word};
