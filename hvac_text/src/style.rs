// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Character and paragraph styles.
//!
//! Character styles live in a [`StyleTable`], an append-only arena that hands
//! out [`StyleId`]s. A style is never changed once it has an id; formatting a
//! range computes a new [`Style`] and interns it, so two runs that share an id
//! really do share every attribute.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::Error;

/// Index of a [`Style`] in a [`StyleTable`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleId(u32);

impl StyleId {
    /// The first style in every table.
    pub const DEFAULT: Self = Self(0);

    /// Creates an id from a raw table index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The position of the style in its table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Generic font family, used when the named font is unavailable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontClass {
    /// Sans-serif fonts.
    #[default]
    SansSerif,
    /// Serif fonts.
    Serif,
    /// Fixed-pitch fonts.
    Monospace,
    /// Cursive fonts.
    Script,
    /// Fantasy fonts.
    Decorative,
}

/// Font weight.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Weight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font slant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slant {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Vertical position of a run relative to the baseline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaselineOffset {
    /// On the baseline.
    #[default]
    Normal,
    /// Raised, rendered smaller.
    Super,
    /// Lowered, rendered smaller.
    Sub,
}

/// Line decoration drawn with a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decoration {
    /// No decoration.
    #[default]
    None,
    /// A line under the run.
    Underline,
    /// A line through the middle of the run.
    LineThrough,
}

/// An opaque `0xRRGGBB` color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    /// `#000000`.
    pub const BLACK: Self = Self(0x00_00_00);
    /// The color hyperlinks are rendered in, `#0000FF`.
    pub const HYPERLINK: Self = Self(0x00_00_FF);

    /// Creates a color from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

/// An immutable character style.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Font family name.
    pub font: String,
    /// Generic fallback family.
    pub font_class: FontClass,
    /// Font size in pixels.
    pub size: f32,
    /// Font weight.
    pub weight: Weight,
    /// Font slant.
    pub slant: Slant,
    /// Baseline offset.
    pub baseline: BaselineOffset,
    /// Line decoration.
    pub decoration: Decoration,
    /// Text color.
    pub color: Color,
    /// Color opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Whether the characters are marked as misspelled.
    pub spell_error: bool,
    /// The data field these characters display, if any.
    pub data_field: Option<String>,
    /// Index into the owning text's hyperlink list, if any.
    pub hyperlink: Option<u32>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: String::from("Arial"),
            font_class: FontClass::SansSerif,
            size: 10.0,
            weight: Weight::Normal,
            slant: Slant::Normal,
            baseline: BaselineOffset::Normal,
            decoration: Decoration::None,
            color: Color::BLACK,
            opacity: 1.0,
            spell_error: false,
            data_field: None,
            hyperlink: None,
        }
    }
}

impl Style {
    /// Whether two styles are identical apart from the spell-error flag.
    ///
    /// Runs are merged on this comparison so that spelling decoration never
    /// splits a run.
    pub fn equals_ignoring_spell(&self, other: &Self) -> bool {
        self.font == other.font
            && self.font_class == other.font_class
            && self.size.to_bits() == other.size.to_bits()
            && self.weight == other.weight
            && self.slant == other.slant
            && self.baseline == other.baseline
            && self.decoration == other.decoration
            && self.color == other.color
            && self.opacity.to_bits() == other.opacity.to_bits()
            && self.data_field == other.data_field
            && self.hyperlink == other.hyperlink
    }

    /// The size glyphs should be drawn at.
    ///
    /// Superscript and subscript runs are drawn at 80% of the nominal size.
    pub fn render_size(&self) -> f32 {
        match self.baseline {
            BaselineOffset::Normal => self.size,
            BaselineOffset::Super | BaselineOffset::Sub => self.size * 0.8,
        }
    }

    pub(crate) fn key(&self) -> StyleKey {
        StyleKey {
            metrics: self.metrics_key(),
            decoration: self.decoration,
            color: self.color,
            opacity: self.opacity.to_bits(),
            spell_error: self.spell_error,
            data_field: self.data_field.clone(),
            hyperlink: self.hyperlink,
        }
    }

    pub(crate) fn metrics_key(&self) -> MetricsKey {
        MetricsKey {
            font: self.font.clone(),
            font_class: self.font_class,
            size: self.size.to_bits(),
            weight: self.weight,
            slant: self.slant,
            baseline: self.baseline,
        }
    }
}

/// The attributes that affect glyph measurement, compared by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MetricsKey {
    font: String,
    font_class: FontClass,
    size: u32,
    weight: Weight,
    slant: Slant,
    pub(crate) baseline: BaselineOffset,
}

/// Every attribute of a style, compared by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct StyleKey {
    metrics: MetricsKey,
    decoration: Decoration,
    color: Color,
    opacity: u32,
    spell_error: bool,
    data_field: Option<String>,
    hyperlink: Option<u32>,
}

/// A partial style: the fields that are `Some` override a base style.
///
/// `data_field` and `hyperlink` are doubly optional; `Some(None)` clears the
/// attribute while `None` leaves it alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePatch {
    /// Font family name.
    pub font: Option<String>,
    /// Generic fallback family.
    pub font_class: Option<FontClass>,
    /// Font size in pixels.
    pub size: Option<f32>,
    /// Font weight.
    pub weight: Option<Weight>,
    /// Font slant.
    pub slant: Option<Slant>,
    /// Baseline offset.
    pub baseline: Option<BaselineOffset>,
    /// Line decoration.
    pub decoration: Option<Decoration>,
    /// Text color.
    pub color: Option<Color>,
    /// Color opacity.
    pub opacity: Option<f32>,
    /// Spell-error flag.
    pub spell_error: Option<bool>,
    /// Data field binding.
    pub data_field: Option<Option<String>>,
    /// Hyperlink index.
    pub hyperlink: Option<Option<u32>>,
}

impl StylePatch {
    /// A patch that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that sets every field to the value in `style`.
    pub fn from_style(style: &Style) -> Self {
        Self {
            font: Some(style.font.clone()),
            font_class: Some(style.font_class),
            size: Some(style.size),
            weight: Some(style.weight),
            slant: Some(style.slant),
            baseline: Some(style.baseline),
            decoration: Some(style.decoration),
            color: Some(style.color),
            opacity: Some(style.opacity),
            spell_error: Some(style.spell_error),
            data_field: Some(style.data_field.clone()),
            hyperlink: Some(style.hyperlink),
        }
    }

    /// Sets the font family.
    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Sets the font size.
    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the font weight.
    #[must_use]
    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the font slant.
    #[must_use]
    pub fn with_slant(mut self, slant: Slant) -> Self {
        self.slant = Some(slant);
        self
    }

    /// Sets the baseline offset.
    #[must_use]
    pub fn with_baseline(mut self, baseline: BaselineOffset) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Sets the decoration.
    #[must_use]
    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Sets the color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets or clears the spell-error flag.
    #[must_use]
    pub fn with_spell_error(mut self, spell_error: bool) -> Self {
        self.spell_error = Some(spell_error);
        self
    }

    /// Sets or clears the data field binding.
    #[must_use]
    pub fn with_data_field(mut self, data_field: Option<String>) -> Self {
        self.data_field = Some(data_field);
        self
    }

    /// Sets or clears the hyperlink.
    #[must_use]
    pub fn with_hyperlink(mut self, hyperlink: Option<u32>) -> Self {
        self.hyperlink = Some(hyperlink);
        self
    }

    /// Whether the patch would leave any style unchanged.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `base` with every field that is set in this patch replaced.
    pub fn apply(&self, base: &Style) -> Style {
        Style {
            font: self.font.clone().unwrap_or_else(|| base.font.clone()),
            font_class: self.font_class.unwrap_or(base.font_class),
            size: self.size.unwrap_or(base.size),
            weight: self.weight.unwrap_or(base.weight),
            slant: self.slant.unwrap_or(base.slant),
            baseline: self.baseline.unwrap_or(base.baseline),
            decoration: self.decoration.unwrap_or(base.decoration),
            color: self.color.unwrap_or(base.color),
            opacity: self.opacity.unwrap_or(base.opacity),
            spell_error: self.spell_error.unwrap_or(base.spell_error),
            data_field: match &self.data_field {
                Some(field) => field.clone(),
                None => base.data_field.clone(),
            },
            hyperlink: self.hyperlink.unwrap_or(base.hyperlink),
        }
    }

    /// Keeps only the fields that are set to the same value in both patches.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        fn common<T: Clone + PartialEq>(a: &Option<T>, b: &Option<T>) -> Option<T> {
            match (a, b) {
                (Some(a), Some(b)) if a == b => Some(a.clone()),
                _ => None,
            }
        }
        Self {
            font: common(&self.font, &other.font),
            font_class: common(&self.font_class, &other.font_class),
            size: common(&self.size, &other.size),
            weight: common(&self.weight, &other.weight),
            slant: common(&self.slant, &other.slant),
            baseline: common(&self.baseline, &other.baseline),
            decoration: common(&self.decoration, &other.decoration),
            color: common(&self.color, &other.color),
            opacity: common(&self.opacity, &other.opacity),
            spell_error: common(&self.spell_error, &other.spell_error),
            data_field: common(&self.data_field, &other.data_field),
            hyperlink: common(&self.hyperlink, &other.hyperlink),
        }
    }

    /// Whether every field set in this patch has the same value in `style`.
    pub fn matches(&self, style: &Style) -> bool {
        fn same<T: PartialEq>(patch: &Option<T>, value: &T) -> bool {
            patch.as_ref().is_none_or(|p| p == value)
        }
        same(&self.font, &style.font)
            && same(&self.font_class, &style.font_class)
            && same(&self.size, &style.size)
            && same(&self.weight, &style.weight)
            && same(&self.slant, &style.slant)
            && same(&self.baseline, &style.baseline)
            && same(&self.decoration, &style.decoration)
            && same(&self.color, &style.color)
            && same(&self.opacity, &style.opacity)
            && same(&self.spell_error, &style.spell_error)
            && same(&self.data_field, &style.data_field)
            && same(&self.hyperlink, &style.hyperlink)
    }
}

/// Append-only arena of interned character styles.
///
/// A table always holds at least one style; ids that do not resolve fall back
/// to the first one.
#[derive(Clone, Debug)]
pub struct StyleTable {
    styles: Vec<Style>,
    index: HashMap<StyleKey, StyleId>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::with_default(Style::default())
    }
}

impl StyleTable {
    /// Creates a table holding only the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table whose first style is `style`.
    pub fn with_default(style: Style) -> Self {
        let mut index = HashMap::new();
        index.insert(style.key(), StyleId::DEFAULT);
        Self {
            styles: alloc::vec![style],
            index,
        }
    }

    /// Restores a table from a list of styles, keeping their ids.
    pub(crate) fn from_styles(styles: Vec<Style>) -> Result<Self, Error> {
        if styles.is_empty() {
            return Err(Error::empty_style_table());
        }
        let mut index = HashMap::with_capacity(styles.len());
        for (i, style) in styles.iter().enumerate() {
            index.entry(style.key()).or_insert(StyleId::from_index(i));
        }
        Ok(Self { styles, index })
    }

    /// Returns the id of `style`, adding it to the table if it is new.
    pub fn find_or_add(&mut self, style: Style) -> StyleId {
        let key = style.key();
        if let Some(id) = self.index.get(&key) {
            return *id;
        }
        let id = StyleId::from_index(self.styles.len());
        self.styles.push(style);
        self.index.insert(key, id);
        id
    }

    /// Returns the id of `style` if it has been interned.
    pub fn find(&self, style: &Style) -> Option<StyleId> {
        self.index.get(&style.key()).copied()
    }

    /// Returns the style for `id`.
    pub fn get(&self, id: StyleId) -> Option<&Style> {
        self.styles.get(id.index())
    }

    /// Returns the style for `id`, or the first style if `id` is unknown.
    pub fn resolve(&self, id: StyleId) -> &Style {
        self.styles
            .get(id.index())
            .unwrap_or_else(|| &self.styles[0])
    }

    /// Number of styles in the table.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Always `false`: a table holds at least one style.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Iterates all styles with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StyleId, &Style)> + '_ {
        self.styles
            .iter()
            .enumerate()
            .map(|(i, style)| (StyleId::from_index(i), style))
    }

    pub(crate) fn styles(&self) -> &[Style] {
        &self.styles
    }
}

/// Horizontal alignment of the lines in a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Justification {
    /// Lines start at the left edge.
    #[default]
    Left,
    /// Lines are centered in the format width.
    Center,
    /// Lines end at the right edge.
    Right,
}

/// The mark drawn in front of a bulleted paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BulletKind {
    /// No bullet.
    #[default]
    None,
    /// An outlined circle.
    HollowRound,
    /// A filled circle.
    SolidRound,
    /// An outlined square.
    HollowSquare,
    /// A filled square.
    SolidSquare,
    /// A filled diamond.
    Diamond,
    /// A right-pointing chevron.
    Chevron,
    /// A check mark.
    Check,
    /// A plus sign.
    Plus,
}

/// Paragraph-level formatting.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParagraphStyle {
    /// Line alignment.
    pub justification: Justification,
    /// Bullet mark.
    pub bullet: BulletKind,
    /// Line spacing.
    ///
    /// A negative value is a minimum line height in pixels; a non-negative
    /// value adds that fraction of each line's height as extra space.
    pub spacing: f32,
    /// Indent of the first line.
    pub first_indent: f32,
    /// Indent of the following lines.
    pub line_indent: f32,
    /// Space kept free at the right edge.
    pub right_indent: f32,
    /// Tab stop interval; `0` disables tab expansion.
    pub tab_width: f32,
}

impl ParagraphStyle {
    /// Whether the paragraph has a bullet.
    pub fn has_bullet(&self) -> bool {
        self.bullet != BulletKind::None
    }
}

/// A partial paragraph style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphPatch {
    /// Line alignment.
    pub justification: Option<Justification>,
    /// Bullet mark.
    pub bullet: Option<BulletKind>,
    /// Line spacing.
    pub spacing: Option<f32>,
    /// Indent of the first line.
    pub first_indent: Option<f32>,
    /// Indent of the following lines.
    pub line_indent: Option<f32>,
    /// Space kept free at the right edge.
    pub right_indent: Option<f32>,
    /// Tab stop interval.
    pub tab_width: Option<f32>,
}

impl ParagraphPatch {
    /// Overwrites the fields of `style` that are set in this patch.
    ///
    /// Turning a bullet on resets both left indents: the bullet takes their
    /// place.
    pub fn apply(&self, style: &mut ParagraphStyle) {
        if let Some(justification) = self.justification {
            style.justification = justification;
        }
        if let Some(spacing) = self.spacing {
            style.spacing = spacing;
        }
        if let Some(indent) = self.first_indent {
            style.first_indent = indent;
        }
        if let Some(indent) = self.line_indent {
            style.line_indent = indent;
        }
        if let Some(indent) = self.right_indent {
            style.right_indent = indent;
        }
        if let Some(tab_width) = self.tab_width {
            style.tab_width = tab_width;
        }
        if let Some(bullet) = self.bullet {
            style.bullet = bullet;
            if bullet != BulletKind::None {
                style.first_indent = 0.0;
                style.line_indent = 0.0;
            }
        }
    }

    /// A patch that sets every field to the value in `style`.
    pub fn from_style(style: &ParagraphStyle) -> Self {
        Self {
            justification: Some(style.justification),
            bullet: Some(style.bullet),
            spacing: Some(style.spacing),
            first_indent: Some(style.first_indent),
            line_indent: Some(style.line_indent),
            right_indent: Some(style.right_indent),
            tab_width: Some(style.tab_width),
        }
    }
}
