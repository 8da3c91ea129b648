//! Run, paragraph, cell and control property parsing.
//!
//! Property elements are applied one at a time in source order, so values
//! that depend on each other (a subscript shrinking whatever size is in
//! effect, a double underline offset by the current size) see exactly the
//! state the document built up to that point.

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::Result;
use crate::model::{
    BaselineShift, Color, DecorationLocation, FlowDirection, ParagraphStyle, RunStyle,
    TextAlignment, TextDecoration, UnderlineKind,
};
use crate::reader::{name_set, Atom, NameTable, QName, Subtree};

/// Subscript and superscript size factor (Word 2002 renders them at 65%).
pub const BASELINE_SHIFT_SCALE: f64 = 0.65;

/// Offset of each double-underline line, as a fraction of the font size.
pub const DOUBLE_UNDERLINE_OFFSET: f64 = 0.05;

/// Offset of each double-strikethrough line, as a fraction of the font size.
pub const DOUBLE_STRIKE_OFFSET: f64 = 0.015;

/// Convert twentieths of a point to pixels at 96 DPI.
pub fn twips_to_pixels(twips: f64) -> f64 {
    twips * 96.0 / 1440.0
}

/// Convert half-points to pixels at 96 DPI.
pub fn half_points_to_size(half_points: f64) -> f64 {
    half_points * 2.0 / 3.0
}

/// Parse an on/off toggle. A missing value means on.
pub fn parse_on_off(value: Option<&str>) -> bool {
    matches!(value, None | Some("1") | Some("on") | Some("true"))
}

/// Parse an explicit color. `auto` and the empty string mean no override.
pub fn parse_color(value: &str) -> Option<Color> {
    if value.is_empty() || value == "auto" {
        return None;
    }
    let color = Color::from_hex(value);
    if color.is_none() {
        log::debug!("ignoring unparsable color {:?}", value);
    }
    color
}

/// Parse a highlight color: a palette name or a hex triple. `none`, `auto`
/// and the empty string mean no override.
pub fn parse_highlight(value: &str) -> Option<Color> {
    if value.is_empty() || value == "auto" || value == "none" {
        return None;
    }
    let color = Color::parse(value);
    if color.is_none() {
        log::debug!("ignoring unknown highlight {:?}", value);
    }
    color
}

pub fn parse_alignment(value: &str) -> Option<TextAlignment> {
    match value {
        "both" => Some(TextAlignment::Justify),
        "left" | "start" => Some(TextAlignment::Left),
        "right" | "end" => Some(TextAlignment::Right),
        "center" => Some(TextAlignment::Center),
        _ => None,
    }
}

pub fn parse_baseline(value: &str) -> Option<BaselineShift> {
    match value {
        "baseline" => Some(BaselineShift::Baseline),
        "subscript" => Some(BaselineShift::Subscript),
        "superscript" => Some(BaselineShift::Superscript),
        _ => None,
    }
}

fn parse_number(value: Option<&str>, what: &str) -> Option<f64> {
    let value = value?;
    if value.is_empty() {
        return None;
    }
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        _ => {
            log::debug!("ignoring unparsable {} {:?}", what, value);
            None
        }
    }
}

fn parse_twips(value: Option<&str>) -> Option<f64> {
    parse_number(value, "twips").map(twips_to_pixels)
}

name_set! {
    /// Property element and attribute names.
    pub struct PropertyNames {
        bold = "b",
        italic = "i",
        underline = "u",
        strike = "strike",
        double_strike = "dstrike",
        vertical_align = "vertAlign",
        color = "color",
        highlight = "highlight",
        fonts = "rFonts",
        size = "sz",
        right_to_left = "rtl",
        alignment = "jc",
        page_break_before = "pageBreakBefore",
        spacing = "spacing",
        indentation = "ind",
        shading = "shd",
        grid_span = "gridSpan",
        vertical_merge = "vMerge",
        alias = "alias",
        tag = "tag",
        val = "val",
        ascii = "ascii",
        after = "after",
        before = "before",
        left = "left",
        right = "right",
        start = "start",
        end = "end",
        hanging = "hanging",
        first_line = "firstLine",
        fill = "fill",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunProperty {
    Bold,
    Italic,
    Underline,
    Strike,
    DoubleStrike,
    VerticalAlign,
    Color,
    Highlight,
    Fonts,
    Size,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphProperty {
    Alignment,
    PageBreakBefore,
    Spacing,
    Indentation,
    Shading,
}

/// Reads property elements into style values.
#[derive(Debug, Clone)]
pub struct PropertyReader {
    names: PropertyNames,
    wordml: Atom,
    run: HashMap<Atom, RunProperty>,
    paragraph: HashMap<Atom, ParagraphProperty>,
}

/// Merge information from `w:tcPr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMerge {
    pub column_span: u32,
    /// The cell continues a vertical merge started in a row above.
    pub continues: bool,
}

impl Default for CellMerge {
    fn default() -> Self {
        Self {
            column_span: 1,
            continues: false,
        }
    }
}

/// Alias and tag of a structured document control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlProperties {
    pub alias: Option<String>,
    pub tag: Option<String>,
}

impl PropertyReader {
    /// Register property names into `table`. `wordml` is the atom of the
    /// WordprocessingML namespace.
    pub fn register(table: &mut NameTable, wordml: Atom) -> Self {
        let names = PropertyNames::register(table);
        let run = HashMap::from([
            (names.bold, RunProperty::Bold),
            (names.italic, RunProperty::Italic),
            (names.underline, RunProperty::Underline),
            (names.strike, RunProperty::Strike),
            (names.double_strike, RunProperty::DoubleStrike),
            (names.vertical_align, RunProperty::VerticalAlign),
            (names.color, RunProperty::Color),
            (names.highlight, RunProperty::Highlight),
            (names.fonts, RunProperty::Fonts),
            (names.size, RunProperty::Size),
            (names.right_to_left, RunProperty::RightToLeft),
        ]);
        let paragraph = HashMap::from([
            (names.alignment, ParagraphProperty::Alignment),
            (names.page_break_before, ParagraphProperty::PageBreakBefore),
            (names.spacing, ParagraphProperty::Spacing),
            (names.indentation, ParagraphProperty::Indentation),
            (names.shading, ParagraphProperty::Shading),
        ]);
        Self {
            names,
            wordml,
            run,
            paragraph,
        }
    }

    fn w(&self, local: Atom) -> QName {
        QName::new(self.wordml, local)
    }

    fn attr<'a, R: BufRead>(&self, reader: &'a Subtree<'_, R>, local: Atom) -> Option<&'a str> {
        reader.attribute(self.w(local))
    }

    fn val<'a, R: BufRead>(&self, reader: &'a Subtree<'_, R>) -> Option<&'a str> {
        self.attr(reader, self.names.val)
    }

    /// Next direct child element in the WordprocessingML namespace.
    ///
    /// Deeper content (revision records such as `w:rPrChange`) is skipped so
    /// that only the properties in effect are applied.
    fn next_property<R: BufRead>(&self, reader: &mut Subtree<'_, R>) -> Result<Option<Atom>> {
        while reader.read()? {
            if !reader.is_element() {
                continue;
            }
            if reader.in_namespace(self.wordml) {
                if let Some(local) = reader.local_name() {
                    return Ok(Some(local));
                }
            }
            reader.skip()?;
        }
        Ok(None)
    }

    /// Apply the children of `w:rPr` to `style`. `inherited_size` is the font
    /// size in effect when the run sets none itself.
    pub fn apply_run<R: BufRead>(
        &self,
        reader: &mut Subtree<'_, R>,
        style: &mut RunStyle,
        inherited_size: f64,
    ) -> Result<()> {
        while let Some(local) = self.next_property(reader)? {
            if let Some(property) = self.run.get(&local).copied() {
                self.apply_run_property(reader, property, style, inherited_size);
            }
            reader.skip()?;
        }
        Ok(())
    }

    fn apply_run_property<R: BufRead>(
        &self,
        reader: &Subtree<'_, R>,
        property: RunProperty,
        style: &mut RunStyle,
        inherited_size: f64,
    ) {
        let size = style.effective_font_size(inherited_size);
        match property {
            RunProperty::Bold => style.bold = Some(parse_on_off(self.val(reader))),
            RunProperty::Italic => style.italic = Some(parse_on_off(self.val(reader))),
            RunProperty::Underline => {
                let color = self
                    .attr(reader, self.names.color)
                    .and_then(parse_color)
                    .or(style.foreground);
                let Some(kind) = self.val(reader).and_then(UnderlineKind::from_ooxml) else {
                    return;
                };
                let mut line = TextDecoration::new(DecorationLocation::Underline);
                line.dash = kind.dash_style();
                line.color = color;
                if kind == UnderlineKind::Double {
                    let offset = size * DOUBLE_UNDERLINE_OFFSET;
                    style.decorations.push(line.with_offset(offset));
                    style.decorations.push(line.with_offset(-offset));
                } else {
                    style.decorations.push(line);
                }
                style.underline = Some(kind);
            }
            RunProperty::Strike => {
                if parse_on_off(self.val(reader)) {
                    style
                        .decorations
                        .push(TextDecoration::new(DecorationLocation::Strikethrough));
                }
            }
            RunProperty::DoubleStrike => {
                if parse_on_off(self.val(reader)) {
                    let line = TextDecoration::new(DecorationLocation::Strikethrough);
                    let offset = size * DOUBLE_STRIKE_OFFSET;
                    style.decorations.push(line.with_offset(offset));
                    style.decorations.push(line.with_offset(-offset));
                }
            }
            RunProperty::VerticalAlign => {
                if let Some(shift) = self.val(reader).and_then(parse_baseline) {
                    style.baseline = Some(shift);
                    if shift.scales_font() {
                        style.font_size = Some(size * BASELINE_SHIFT_SCALE);
                    }
                }
            }
            RunProperty::Color => {
                if let Some(color) = self.val(reader).and_then(parse_color) {
                    style.foreground = Some(color);
                }
            }
            RunProperty::Highlight => {
                if let Some(color) = self.val(reader).and_then(parse_highlight) {
                    style.highlight = Some(color);
                }
            }
            RunProperty::Fonts => {
                if let Some(family) = self.attr(reader, self.names.ascii).filter(|f| !f.is_empty()) {
                    style.font_family = Some(family.to_string());
                }
            }
            RunProperty::Size => {
                if let Some(half_points) = parse_number(self.val(reader), "font size") {
                    style.font_size = Some(half_points_to_size(half_points));
                }
            }
            RunProperty::RightToLeft => {
                style.direction = Some(if parse_on_off(self.val(reader)) {
                    FlowDirection::RightToLeft
                } else {
                    FlowDirection::LeftToRight
                });
            }
        }
    }

    /// Apply the children of `w:pPr` to `style`.
    pub fn apply_paragraph<R: BufRead>(
        &self,
        reader: &mut Subtree<'_, R>,
        style: &mut ParagraphStyle,
    ) -> Result<()> {
        while let Some(local) = self.next_property(reader)? {
            if let Some(property) = self.paragraph.get(&local).copied() {
                self.apply_paragraph_property(reader, property, style);
            }
            reader.skip()?;
        }
        Ok(())
    }

    fn apply_paragraph_property<R: BufRead>(
        &self,
        reader: &Subtree<'_, R>,
        property: ParagraphProperty,
        style: &mut ParagraphStyle,
    ) {
        let names = &self.names;
        match property {
            ParagraphProperty::Alignment => {
                if let Some(alignment) = self.val(reader).and_then(parse_alignment) {
                    style.alignment = Some(alignment);
                }
            }
            ParagraphProperty::PageBreakBefore => {
                style.page_break_before = Some(parse_on_off(self.val(reader)));
            }
            ParagraphProperty::Spacing => {
                if let Some(after) = parse_twips(self.attr(reader, names.after)) {
                    style.margin.bottom = Some(after);
                }
                if let Some(before) = parse_twips(self.attr(reader, names.before)) {
                    style.margin.top = Some(before);
                }
            }
            ParagraphProperty::Indentation => {
                let left = self.attr(reader, names.left).or_else(|| self.attr(reader, names.start));
                if let Some(left) = parse_twips(left) {
                    style.margin.left = Some(left);
                }
                let right = self.attr(reader, names.right).or_else(|| self.attr(reader, names.end));
                if let Some(right) = parse_twips(right) {
                    style.margin.right = Some(right);
                }
                if let Some(first_line) = parse_twips(self.attr(reader, names.first_line)) {
                    style.text_indent = Some(first_line);
                }
                if let Some(hanging) = parse_twips(self.attr(reader, names.hanging)) {
                    style.text_indent = Some(style.text_indent.unwrap_or(0.0) - hanging);
                }
            }
            ParagraphProperty::Shading => {
                if let Some(fill) = self.attr(reader, names.fill).and_then(parse_color) {
                    style.background = Some(fill);
                }
            }
        }
    }

    /// Read `w:gridSpan` and `w:vMerge` from `w:tcPr`.
    pub fn read_cell<R: BufRead>(&self, reader: &mut Subtree<'_, R>) -> Result<CellMerge> {
        let mut merge = CellMerge::default();
        while let Some(local) = self.next_property(reader)? {
            if local == self.names.grid_span {
                match parse_number(self.val(reader), "grid span") {
                    Some(span) if span >= 1.0 => merge.column_span = span as u32,
                    Some(span) => log::debug!("ignoring grid span {}", span),
                    None => {}
                }
            } else if local == self.names.vertical_merge {
                merge.continues = self.val(reader) != Some("restart");
            }
            reader.skip()?;
        }
        Ok(merge)
    }

    /// Read `w:alias` and `w:tag` from `w:sdtPr`.
    pub fn read_control<R: BufRead>(&self, reader: &mut Subtree<'_, R>) -> Result<ControlProperties> {
        let mut properties = ControlProperties::default();
        while let Some(local) = self.next_property(reader)? {
            if local == self.names.alias {
                properties.alias = self.val(reader).map(str::to_string);
            } else if local == self.names.tag {
                properties.tag = self.val(reader).map(str::to_string);
            }
            reader.skip()?;
        }
        Ok(properties)
    }
}
