use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Millimetres per PDF point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    A4,
    #[default]
    Letter,
    Legal,
}

impl PageFormat {
    /// Portrait (width, height) in points.
    pub fn size_pt(self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Legal => (612.0, 1008.0),
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            other => Err(format!("unknown page format '{other}' (expected a4, letter or legal)")),
        }
    }
}

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            right: mm,
            bottom: mm,
            left: mm,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(20.0)
    }
}

/// Options for `Composer::create_document`. Unset fields fall back to
/// portrait letter with 20 mm margins.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub title: Option<String>,
    pub orientation: Option<Orientation>,
    pub format: Option<PageFormat>,
    pub margins: Option<Margins>,
}

/// An sRGB colour, written as `#rrggbb` or `#rgb` in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);

    pub const fn gray(level: u8) -> Self {
        Color([level, level, level])
    }

    pub fn to_unit_rgb(self) -> (f32, f32, f32) {
        let [r, g, b] = self.0;
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()
            .ok_or_else(|| format!("invalid colour '{s}'"))?;
        match digits.as_slice() {
            [r, g, b] => Ok(Color([r * 17, g * 17, b * 17])),
            [r1, r2, g1, g2, b1, b2] => Ok(Color([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2])),
            _ => Err(format!("invalid colour '{s}'")),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-call text styling. Unset fields resolve to the document default
/// size, normal style, black and left alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    pub font_size: Option<f32>,
    pub font_style: Option<FontStyle>,
    pub color: Option<Color>,
    pub align: Option<Alignment>,
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub fn bold(self) -> Self {
        self.style(FontStyle::Bold)
    }

    pub fn italic(self) -> Self {
        self.style(FontStyle::Italic)
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnWidthMode {
    #[default]
    Equal,
    Auto,
    Manual,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub header_style: TextOptions,
    pub cell_style: TextOptions,
    /// Used when `column_width_mode` is `Manual`; must have one entry per header.
    pub column_widths: Option<Vec<f32>>,
    pub show_borders: bool,
    pub header_background: Option<Color>,
    pub alternating_rows: bool,
    pub alternating_row_color: Color,
    pub cell_padding: f32,
    pub repeat_headers_on_new_page: bool,
    pub border_width: f32,
    pub border_color: Color,
    pub column_width_mode: ColumnWidthMode,
    pub min_column_width: f32,
    pub max_column_width: f32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            header_style: TextOptions::new().bold().color(Color::BLACK).align(Alignment::Left),
            cell_style: TextOptions::new()
                .style(FontStyle::Normal)
                .color(Color::BLACK)
                .align(Alignment::Left),
            column_widths: None,
            show_borders: true,
            header_background: Some(Color::gray(0xf0)),
            alternating_rows: false,
            alternating_row_color: Color::gray(0xf9),
            cell_padding: 2.0,
            repeat_headers_on_new_page: true,
            border_width: 0.5,
            border_color: Color::BLACK,
            column_width_mode: ColumnWidthMode::Equal,
            min_column_width: 20.0,
            max_column_width: 100.0,
        }
    }
}

/// Footer settings beyond the text style.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FooterOptions {
    pub style: TextOptions,
    /// Distance of the footer baseline from the bottom edge, in millimetres.
    pub bottom_margin: f32,
    pub show_on_first_page: bool,
}

impl FooterOptions {
    pub fn default_style() -> TextOptions {
        TextOptions::new()
            .size(10.0)
            .style(FontStyle::Normal)
            .color(Color::gray(0x66))
            .align(Alignment::Center)
    }
}

impl Default for FooterOptions {
    fn default() -> Self {
        Self {
            style: Self::default_style(),
            bottom_margin: 15.0,
            show_on_first_page: true,
        }
    }
}

pub const PAGE_NUMBER_PLACEHOLDER: &str = "{pageNumber}";
pub const TOTAL_PAGES_PLACEHOLDER: &str = "{totalPages}";

/// The active footer of a document. At most one exists; a new one replaces it.
#[derive(Clone, Debug, PartialEq)]
pub struct FooterConfig {
    pub content: String,
    pub style: TextOptions,
    pub show_page_numbers: bool,
    pub bottom_margin: f32,
    pub show_on_first_page: bool,
}

impl FooterConfig {
    pub fn new(content: &str, options: FooterOptions) -> Self {
        Self {
            content: content.to_string(),
            style: options.style,
            show_page_numbers: content.contains(PAGE_NUMBER_PLACEHOLDER)
                || content.contains(TOTAL_PAGES_PLACEHOLDER),
            bottom_margin: options.bottom_margin,
            show_on_first_page: options.show_on_first_page,
        }
    }

    /// Footer text for one page with placeholders substituted.
    pub fn text_for_page(&self, page_number: usize, total_pages: usize) -> String {
        if !self.show_page_numbers {
            return self.content.clone();
        }
        self.content
            .replace(PAGE_NUMBER_PLACEHOLDER, &page_number.to_string())
            .replace(TOTAL_PAGES_PLACEHOLDER, &total_pages.to_string())
    }
}

/// Options for `Composer::add_section_with`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    pub title: Option<String>,
    /// When set, the title is drawn as plain text with this style instead of
    /// a level-2 header.
    pub title_options: Option<TextOptions>,
    pub spacing_before: f32,
    pub spacing_after: f32,
    pub page_break_before: bool,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            title: None,
            title_options: None,
            spacing_before: 1.0,
            spacing_after: 0.0,
            page_break_before: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Table,
    #[default]
    Mixed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionMetadata {
    pub id: String,
    pub title: Option<String>,
    pub start_page: usize,
    pub start_y: f32,
    pub content_type: ContentType,
}

/// One table row. Array-like rows are read by column position, map-like rows
/// by header name, scalars fill every column with the same value.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    ByIndex(Vec<String>),
    ByKey(HashMap<String, String>),
    Scalar(String),
}

impl Record {
    pub fn cell(&self, column: usize, header: &str) -> &str {
        match self {
            Record::ByIndex(values) => values.get(column).map(String::as_str).unwrap_or(""),
            Record::ByKey(values) => values.get(header).map(String::as_str).unwrap_or(""),
            Record::Scalar(value) => value.as_str(),
        }
    }
}

/// Falsy JSON values (`null`, `false`, `0`, `""`) give an empty cell.
fn json_to_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => String::new(),
        serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<serde_json::Value> for Record {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => {
                Record::ByIndex(items.iter().map(json_to_cell).collect())
            }
            serde_json::Value::Object(map) => Record::ByKey(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_to_cell(v)))
                    .collect(),
            ),
            scalar => Record::Scalar(json_to_cell(&scalar)),
        }
    }
}

impl<S: Into<String>> From<Vec<S>> for Record {
    fn from(values: Vec<S>) -> Self {
        Record::ByIndex(values.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, String>> for Record {
    fn from(values: HashMap<String, String>) -> Self {
        Record::ByKey(values)
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Record::Scalar(value.to_string())
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Record::Scalar(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colours() {
        assert_eq!("#666666".parse::<Color>().unwrap(), Color([0x66, 0x66, 0x66]));
        assert_eq!("#f00".parse::<Color>().unwrap(), Color([255, 0, 0]));
        assert_eq!(Color([0xf0, 0xf0, 0xf0]).to_string(), "#f0f0f0");
        assert!("#12345".parse::<Color>().is_err());
        assert!("blue".parse::<Color>().is_err());
    }

    #[test]
    fn record_cells_resolve_by_shape() {
        let row = Record::from(serde_json::json!(["a", 2, null]));
        assert_eq!(row.cell(0, "x"), "a");
        assert_eq!(row.cell(1, "x"), "2");
        assert_eq!(row.cell(2, "x"), "");
        assert_eq!(row.cell(9, "x"), "");

        let row = Record::from(serde_json::json!({"Name": "Widget", "Stock": 40}));
        assert_eq!(row.cell(0, "Name"), "Widget");
        assert_eq!(row.cell(5, "Stock"), "40");
        assert_eq!(row.cell(0, "Missing"), "");

        let row = Record::from(serde_json::json!(7.5));
        assert_eq!(row.cell(3, "anything"), "7.5");
    }

    #[test]
    fn falsy_json_values_are_empty_cells() {
        let row = Record::from(serde_json::json!([0, false, "", 0.0, true, -1]));
        assert_eq!(row.cell(0, ""), "");
        assert_eq!(row.cell(1, ""), "");
        assert_eq!(row.cell(2, ""), "");
        assert_eq!(row.cell(3, ""), "");
        assert_eq!(row.cell(4, ""), "true");
        assert_eq!(row.cell(5, ""), "-1");

        let row = Record::from(serde_json::json!({"A": 0, "B": false}));
        assert_eq!(row.cell(0, "A"), "");
        assert_eq!(row.cell(1, "B"), "");

        assert_eq!(Record::from(serde_json::json!(0)).cell(0, "A"), "");
        assert_eq!(Record::from(serde_json::json!(false)).cell(0, "A"), "");
    }

    #[test]
    fn footer_placeholders_are_detected_and_substituted() {
        let footer = FooterConfig::new("Page {pageNumber} of {totalPages}", FooterOptions::default());
        assert!(footer.show_page_numbers);
        assert_eq!(footer.text_for_page(2, 5), "Page 2 of 5");

        let plain = FooterConfig::new("Confidential", FooterOptions::default());
        assert!(!plain.show_page_numbers);
        assert_eq!(plain.text_for_page(2, 5), "Confidential");
    }
}
