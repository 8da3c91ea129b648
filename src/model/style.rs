//! Run and paragraph style values.
//!
//! All fields are sparse: `None` means "inherited", so applying a property
//! set only overwrites what the source actually specified.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// Look up a named highlight color (`yellow`, `darkBlue`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Color::rgb(0x00, 0x00, 0x00),
            "blue" => Color::rgb(0x00, 0x00, 0xFF),
            "cyan" => Color::rgb(0x00, 0xFF, 0xFF),
            "green" => Color::rgb(0x00, 0xFF, 0x00),
            "magenta" => Color::rgb(0xFF, 0x00, 0xFF),
            "red" => Color::rgb(0xFF, 0x00, 0x00),
            "yellow" => Color::rgb(0xFF, 0xFF, 0x00),
            "white" => Color::rgb(0xFF, 0xFF, 0xFF),
            "darkblue" => Color::rgb(0x00, 0x00, 0x80),
            "darkcyan" => Color::rgb(0x00, 0x80, 0x80),
            "darkgreen" => Color::rgb(0x00, 0x80, 0x00),
            "darkmagenta" => Color::rgb(0x80, 0x00, 0x80),
            "darkred" => Color::rgb(0x80, 0x00, 0x00),
            "darkyellow" => Color::rgb(0x80, 0x80, 0x00),
            "darkgray" => Color::rgb(0x80, 0x80, 0x80),
            "lightgray" => Color::rgb(0xC0, 0xC0, 0xC0),
            _ => return None,
        };
        Some(color)
    }

    /// Parse either a hex triple or a palette name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_hex(value).or_else(|| Self::from_name(value))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

/// Text alignment within a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Inline flow direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Vertical position of a run relative to the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineShift {
    #[default]
    Baseline,
    Subscript,
    Superscript,
}

impl BaselineShift {
    /// Whether the shift shrinks the run's font size.
    pub fn scales_font(&self) -> bool {
        matches!(self, BaselineShift::Subscript | BaselineShift::Superscript)
    }
}

/// Underline variants that produce a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineKind {
    Single,
    Double,
    Dotted,
    Dash,
    DashDot,
    DashDotDot,
}

impl UnderlineKind {
    /// Map a `w:u/@w:val` value. `none` and unknown values yield `None`.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "single" => Some(UnderlineKind::Single),
            "double" => Some(UnderlineKind::Double),
            "dotted" => Some(UnderlineKind::Dotted),
            "dash" => Some(UnderlineKind::Dash),
            "dotDash" => Some(UnderlineKind::DashDot),
            "dotDotDash" => Some(UnderlineKind::DashDotDot),
            _ => None,
        }
    }

    pub fn dash_style(&self) -> DashStyle {
        match self {
            UnderlineKind::Single | UnderlineKind::Double => DashStyle::Solid,
            UnderlineKind::Dotted => DashStyle::Dot,
            UnderlineKind::Dash => DashStyle::Dash,
            UnderlineKind::DashDot => DashStyle::DashDot,
            UnderlineKind::DashDotDot => DashStyle::DashDotDot,
        }
    }
}

/// Where a decoration line is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorationLocation {
    Underline,
    Strikethrough,
}

/// Stroke pattern of a decoration line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    #[default]
    Solid,
    Dot,
    Dash,
    DashDot,
    DashDotDot,
}

/// One decoration line drawn over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextDecoration {
    pub location: DecorationLocation,
    /// Vertical pen offset, already scaled by the font size in effect.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "is_solid")]
    pub dash: DashStyle,
    /// Stroke color; `None` draws with the run's foreground.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl TextDecoration {
    pub fn new(location: DecorationLocation) -> Self {
        Self {
            location,
            offset: 0.0,
            dash: DashStyle::Solid,
            color: None,
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

fn is_solid(dash: &DashStyle) -> bool {
    *dash == DashStyle::Solid
}

/// Character formatting of a span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    /// Last underline kind applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<UnderlineKind>,

    /// Underline and strikethrough lines, in application order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorations: Vec<TextDecoration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<BaselineShift>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Color>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Font size in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<FlowDirection>,
}

impl RunStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the run is struck through (single or double).
    pub fn has_strikethrough(&self) -> bool {
        self.decorations
            .iter()
            .any(|d| d.location == DecorationLocation::Strikethrough)
    }

    /// Check if any underline line is drawn.
    pub fn has_underline(&self) -> bool {
        self.decorations
            .iter()
            .any(|d| d.location == DecorationLocation::Underline)
    }

    /// Font size in effect, falling back to the inherited size.
    pub fn effective_font_size(&self, inherited: f64) -> f64 {
        self.font_size.unwrap_or(inherited)
    }
}

/// Paragraph box margins in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
}

impl Margin {
    pub fn is_empty(&self) -> bool {
        *self == Margin::default()
    }
}

/// Paragraph formatting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_break_before: Option<bool>,

    #[serde(default, skip_serializing_if = "Margin::is_empty")]
    pub margin: Margin,

    /// First-line indent in pixels (negative for hanging indents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_indent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl ParagraphStyle {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Border drawn around a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBorder {
    pub color: Color,
    pub thickness: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!(Color::from_hex("FF0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("#00ff80"), Some(Color::rgb(0, 255, 128)));
        assert_eq!(Color::from_hex("auto"), None);
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::parse("darkBlue"), Some(Color::rgb(0, 0, 0x80)));
        assert_eq!(Color::parse("none"), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(1, 171, 255).to_string(), "#01ABFF");
    }

    #[test]
    fn test_underline_kind_mapping() {
        assert_eq!(UnderlineKind::from_ooxml("single"), Some(UnderlineKind::Single));
        assert_eq!(UnderlineKind::from_ooxml("dotDash"), Some(UnderlineKind::DashDot));
        assert_eq!(UnderlineKind::from_ooxml("none"), None);
        assert_eq!(UnderlineKind::from_ooxml("wave"), None);
        assert_eq!(UnderlineKind::Dotted.dash_style(), DashStyle::Dot);
    }

    #[test]
    fn test_run_style_serialization_is_sparse() {
        let style = RunStyle {
            bold: Some(true),
            foreground: Some(Color::rgb(255, 0, 0)),
            ..Default::default()
        };
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r##"{"bold":true,"foreground":"#FF0000"}"##);
    }
}
