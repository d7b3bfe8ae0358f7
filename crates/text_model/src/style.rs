//! Style system - base style, partial overrides, and field classification
//!
//! A text element carries one base [`TextStyle`]. Ranges of characters may
//! diverge from it through a sparse override table: each override id maps to
//! a [`StyleOverride`] holding only the fields that differ from the base.
//! Only an allow-listed subset of fields supports per-character overrides;
//! the rest always apply to the whole element.
//!
//! Every style field is classified by [`StyleField`] with a fixed
//! invalidation tier so that mutations can clear exactly the derived data
//! they affect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Primitive style values
// =============================================================================

/// Two-state switch used by ligatures, numeric fractions, and truncation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Enable,
    Disable,
}

impl Toggle {
    pub fn is_enabled(self) -> bool {
        matches!(self, Toggle::Enable)
    }
}

/// How the element resizes to fit its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoResize {
    /// Fixed width and height
    None,
    /// Fixed width, height grows with content
    Height,
    /// Both dimensions grow with content
    WidthAndHeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignHorizontal {
    Left,
    Center,
    Right,
    Justified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignVertical {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextCase {
    None,
    Lower,
    Upper,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoration {
    None,
    Underline,
    Strikethrough,
}

/// Vertical trimming of the first/last line's leading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadingTrim {
    None,
    CapHeight,
}

/// Super/subscript positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontPosition {
    None,
    Super,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineHeightUnit {
    /// Percentage of the shaped cluster height
    Percent,
    /// Absolute pixels
    Pixels,
    /// Percentage of the font size
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineHeight {
    pub value: f32,
    pub unit: LineHeightUnit,
}

impl Default for LineHeight {
    fn default() -> Self {
        Self {
            value: 100.0,
            unit: LineHeightUnit::Percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpacingUnit {
    Percent,
    Pixels,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LetterSpacing {
    pub value: f32,
    pub unit: SpacingUnit,
}

impl Default for LetterSpacing {
    fn default() -> Self {
        Self {
            value: 0.0,
            unit: SpacingUnit::Percent,
        }
    }
}

/// A font reference: family plus named style plus postscript name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontName {
    pub family: String,
    pub style: String,
    pub postscript: String,
}

impl FontName {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        let family = family.into();
        let style = style.into();
        let postscript = format!("{}-{}", family.replace(' ', ""), style.replace(' ', ""));
        Self {
            family,
            style,
            postscript,
        }
    }

    /// Stable key used for resource-cache lookups
    pub fn cache_key(&self) -> String {
        format!("{}#{}#{}", self.family, self.style, self.postscript)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Darken,
}

/// A solid fill applied to glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillPaint {
    pub color: Color,
    pub opacity: f32,
    pub visible: bool,
    pub blend_mode: BlendMode,
}

impl FillPaint {
    pub fn solid(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            color: Color { r, g, b, a },
            opacity: 1.0,
            visible: true,
            blend_mode: BlendMode::Normal,
        }
    }
}

/// Variation-axis settings, keyed by axis tag (e.g. "wght")
pub type FontVariations = BTreeMap<String, f32>;

// =============================================================================
// Base style
// =============================================================================

/// The full style of a text element
///
/// Truncation bookkeeping (`truncation_start_index`, `truncated_height`) is
/// written back by glyph assembly; `-1` means "not truncated".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub text_auto_resize: AutoResize,
    pub text_align_horizontal: AlignHorizontal,
    pub text_align_vertical: AlignVertical,
    pub text_case: TextCase,
    pub text_decoration: TextDecoration,
    pub paragraph_indent: f32,
    pub text_truncation: Toggle,
    pub max_lines: usize,
    pub truncation_start_index: i64,
    pub truncated_height: f32,
    pub leading_trim: LeadingTrim,
    pub line_height: LineHeight,
    pub hyperlink: Option<Hyperlink>,
    pub font_name: FontName,
    pub letter_spacing: LetterSpacing,
    pub font_variations: FontVariations,
    pub fill_paints: Vec<FillPaint>,
    pub font_ligatures: Toggle,
    pub font_position: FontPosition,
    pub font_numeric_fraction: Toggle,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            text_auto_resize: AutoResize::WidthAndHeight,
            text_align_horizontal: AlignHorizontal::Left,
            text_align_vertical: AlignVertical::Top,
            text_case: TextCase::None,
            text_decoration: TextDecoration::None,
            paragraph_indent: 0.0,
            text_truncation: Toggle::Disable,
            max_lines: 2,
            truncation_start_index: -1,
            truncated_height: -1.0,
            leading_trim: LeadingTrim::None,
            line_height: LineHeight::default(),
            hyperlink: None,
            font_name: FontName::new("Inter", "Regular"),
            letter_spacing: LetterSpacing::default(),
            font_variations: FontVariations::new(),
            fill_paints: vec![FillPaint::solid(0.0, 0.0, 0.0, 1.0)],
            font_ligatures: Toggle::Enable,
            font_position: FontPosition::None,
            font_numeric_fraction: Toggle::Disable,
        }
    }
}

impl TextStyle {
    /// Letter spacing resolved to pixels for this style's font size
    pub fn letter_spacing_px(&self) -> f32 {
        match self.letter_spacing.unit {
            SpacingUnit::Percent => self.letter_spacing.value / 100.0 * self.font_size,
            SpacingUnit::Pixels => self.letter_spacing.value,
        }
    }

    /// Apply a partial override on top of this style
    pub fn with_override(&self, over: &StyleOverride) -> TextStyle {
        let mut out = self.clone();
        if let Some(font_name) = &over.font_name {
            out.font_name = font_name.clone();
        }
        if let Some(variations) = &over.font_variations {
            out.font_variations = variations.clone();
        }
        if let Some(size) = over.font_size {
            out.font_size = size;
        }
        if let Some(decoration) = over.text_decoration {
            out.text_decoration = decoration;
        }
        if let Some(link) = &over.hyperlink {
            out.hyperlink = link.clone();
        }
        if let Some(paints) = &over.fill_paints {
            out.fill_paints = paints.clone();
        }
        if let Some(ligatures) = over.font_ligatures {
            out.font_ligatures = ligatures;
        }
        if let Some(position) = over.font_position {
            out.font_position = position;
        }
        if let Some(fraction) = over.font_numeric_fraction {
            out.font_numeric_fraction = fraction;
        }
        if let Some(line_height) = over.line_height {
            out.line_height = line_height;
        }
        if let Some(spacing) = over.letter_spacing {
            out.letter_spacing = spacing;
        }
        if let Some(case) = over.text_case {
            out.text_case = case;
        }
        out
    }
}

// =============================================================================
// Partial override
// =============================================================================

/// A partial style diff against the base style
///
/// Only fields that support per-character overrides appear here. A `None`
/// field inherits from the base style. `hyperlink` uses a nested `Option`
/// so an override can explicitly clear a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverride {
    pub font_name: Option<FontName>,
    pub font_variations: Option<FontVariations>,
    pub font_size: Option<f32>,
    pub text_decoration: Option<TextDecoration>,
    pub hyperlink: Option<Option<Hyperlink>>,
    pub fill_paints: Option<Vec<FillPaint>>,
    pub font_ligatures: Option<Toggle>,
    pub font_position: Option<FontPosition>,
    pub font_numeric_fraction: Option<Toggle>,
    pub line_height: Option<LineHeight>,
    pub letter_spacing: Option<LetterSpacing>,
    pub text_case: Option<TextCase>,
}

impl StyleOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no field is set
    pub fn is_empty(&self) -> bool {
        self.set_fields().is_empty()
    }

    /// The allow-listed fields this override sets
    pub fn set_fields(&self) -> Vec<StyleField> {
        let mut fields = Vec::new();
        if self.font_name.is_some() || self.font_variations.is_some() {
            fields.push(StyleField::FontName);
        }
        if self.font_size.is_some() {
            fields.push(StyleField::FontSize);
        }
        if self.text_decoration.is_some() {
            fields.push(StyleField::TextDecoration);
        }
        if self.hyperlink.is_some() {
            fields.push(StyleField::Hyperlink);
        }
        if self.fill_paints.is_some() {
            fields.push(StyleField::FillPaints);
        }
        if self.font_ligatures.is_some() {
            fields.push(StyleField::FontLigatures);
        }
        if self.font_position.is_some() {
            fields.push(StyleField::FontPosition);
        }
        if self.font_numeric_fraction.is_some() {
            fields.push(StyleField::FontNumericFraction);
        }
        if self.line_height.is_some() {
            fields.push(StyleField::LineHeight);
        }
        if self.letter_spacing.is_some() {
            fields.push(StyleField::LetterSpacing);
        }
        if self.text_case.is_some() {
            fields.push(StyleField::TextCase);
        }
        fields
    }

    /// Merge another override on top of this one; fields from `other` win
    pub fn merged_with(&self, other: &StyleOverride) -> StyleOverride {
        let mut out = self.clone();
        if other.font_name.is_some() {
            out.font_name = other.font_name.clone();
            // Changing family resets any inherited axis settings
            out.font_variations = Some(other.font_variations.clone().unwrap_or_default());
        }
        if other.font_variations.is_some() {
            out.font_variations = other.font_variations.clone();
        }
        if other.font_size.is_some() {
            out.font_size = other.font_size;
        }
        if other.text_decoration.is_some() {
            out.text_decoration = other.text_decoration;
        }
        if other.hyperlink.is_some() {
            out.hyperlink = other.hyperlink.clone();
        }
        if other.fill_paints.is_some() {
            out.fill_paints = other.fill_paints.clone();
        }
        if other.font_ligatures.is_some() {
            out.font_ligatures = other.font_ligatures;
        }
        if other.font_position.is_some() {
            out.font_position = other.font_position;
        }
        if other.font_numeric_fraction.is_some() {
            out.font_numeric_fraction = other.font_numeric_fraction;
        }
        if other.line_height.is_some() {
            out.line_height = other.line_height;
        }
        if other.letter_spacing.is_some() {
            out.letter_spacing = other.letter_spacing;
        }
        if other.text_case.is_some() {
            out.text_case = other.text_case;
        }
        out
    }

    /// Drop every field whose value equals the base style's
    pub fn subtract_base(&self, base: &TextStyle) -> StyleOverride {
        let mut out = self.clone();
        if out.font_name.as_ref() == Some(&base.font_name) {
            out.font_name = None;
        }
        if out.font_variations.as_ref() == Some(&base.font_variations) {
            out.font_variations = None;
        }
        if out.font_size == Some(base.font_size) {
            out.font_size = None;
        }
        if out.text_decoration == Some(base.text_decoration) {
            out.text_decoration = None;
        }
        if out.hyperlink.as_ref() == Some(&base.hyperlink) {
            out.hyperlink = None;
        }
        if out.fill_paints.as_ref() == Some(&base.fill_paints) {
            out.fill_paints = None;
        }
        if out.font_ligatures == Some(base.font_ligatures) {
            out.font_ligatures = None;
        }
        if out.font_position == Some(base.font_position) {
            out.font_position = None;
        }
        if out.font_numeric_fraction == Some(base.font_numeric_fraction) {
            out.font_numeric_fraction = None;
        }
        if out.line_height == Some(base.line_height) {
            out.line_height = None;
        }
        if out.letter_spacing == Some(base.letter_spacing) {
            out.letter_spacing = None;
        }
        if out.text_case == Some(base.text_case) {
            out.text_case = None;
        }
        out
    }

    /// Whether this override alters shaping-relevant fields, forcing the
    /// tokenizer to isolate the characters it covers
    pub fn alters_shaping(&self) -> bool {
        self.font_name.is_some()
            || matches!(self.font_ligatures, Some(Toggle::Disable))
            || matches!(
                self.font_position,
                Some(FontPosition::Super) | Some(FontPosition::Sub)
            )
            || matches!(self.font_numeric_fraction, Some(Toggle::Enable))
    }
}

// =============================================================================
// Field classification
// =============================================================================

/// Which cached layers a style mutation invalidates
///
/// `Paint` keeps all geometry and shaped data (only draw data changes),
/// `Metrics` keeps shaped clusters but redoes line breaking and placement,
/// `All` reshapes from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InvalidationTier {
    Paint,
    Metrics,
    All,
}

/// Fixed enumeration of style fields with their invalidation tier and
/// whether they support per-character overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleField {
    FontSize,
    TextAutoResize,
    TextAlignHorizontal,
    TextAlignVertical,
    TextCase,
    TextDecoration,
    ParagraphIndent,
    TextTruncation,
    MaxLines,
    LeadingTrim,
    LineHeight,
    Hyperlink,
    FontName,
    LetterSpacing,
    FillPaints,
    FontLigatures,
    FontPosition,
    FontNumericFraction,
}

impl StyleField {
    /// The tightest invalidation tier a mutation of this field requires
    pub fn invalidation(self) -> InvalidationTier {
        match self {
            StyleField::FillPaints | StyleField::TextDecoration => InvalidationTier::Paint,
            StyleField::TextAlignHorizontal
            | StyleField::TextAlignVertical
            | StyleField::LeadingTrim
            | StyleField::LineHeight => InvalidationTier::Metrics,
            _ => InvalidationTier::All,
        }
    }

    /// Whether the field may be applied to a sub-range of characters
    pub fn overridable(self) -> bool {
        matches!(
            self,
            StyleField::FontName
                | StyleField::FontSize
                | StyleField::TextDecoration
                | StyleField::Hyperlink
                | StyleField::FillPaints
                | StyleField::FontLigatures
                | StyleField::FontPosition
                | StyleField::FontNumericFraction
                | StyleField::LineHeight
                | StyleField::LetterSpacing
                | StyleField::TextCase
        )
    }
}
