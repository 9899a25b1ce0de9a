use crate::fonts::StandardFont;
use crate::model::{Color, FontStyle, MM_PER_PT, Orientation, PageFormat};

use super::CanvasError;

/// How `Canvas::rect` paints the rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RectMode {
    Stroke,
    Fill,
    FillStroke,
}

/// Drawing target within a page. Footers live in their own layer so they can
/// be wiped and redrawn whenever the page total changes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Body,
    Footer,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub font_style: FontStyle,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        mode: RectMode,
        fill: Color,
        stroke: Color,
        line_width: f32,
    },
}

impl DrawOp {
    pub(crate) fn is_finite(&self) -> bool {
        match self {
            DrawOp::Text { x, y, style, .. } => {
                x.is_finite() && y.is_finite() && style.font_size.is_finite()
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                line_width,
                ..
            } => [*x, *y, *width, *height, *line_width]
                .iter()
                .all(|v| v.is_finite()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageContent {
    pub body: Vec<DrawOp>,
    pub footer: Vec<DrawOp>,
}

impl PageContent {
    /// Body operations followed by footer operations, in paint order.
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        self.body.iter().chain(self.footer.iter())
    }

    /// Every string drawn on the page with its baseline position.
    pub fn texts(&self) -> impl Iterator<Item = (&str, f32, f32)> {
        self.ops().filter_map(|op| match op {
            DrawOp::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
            DrawOp::Rect { .. } => None,
        })
    }

    pub fn footer_texts(&self) -> impl Iterator<Item = &str> {
        self.footer.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
}

/// The drawing surface the composer lays out onto. Units are millimetres
/// with the origin at the top-left corner of the page; text is positioned by
/// its baseline. Pages are numbered from 1.
pub trait Canvas {
    fn new(orientation: Orientation, format: PageFormat) -> Self
    where
        Self: Sized;

    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;

    fn set_title(&mut self, title: &str);
    fn set_font_size(&mut self, size: f32);
    fn set_font_style(&mut self, style: FontStyle);
    fn set_text_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_draw_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    /// Current font size, style and text colour.
    fn text_style(&self) -> TextStyle;

    /// Width of `text` under the current font state.
    fn text_width(&self, text: &str) -> f32;
    fn text(&mut self, text: &str, x: f32, y: f32);
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, mode: RectMode);

    /// Append a page and make it the active one.
    fn add_page(&mut self);
    fn set_page(&mut self, page: usize);
    fn current_page(&self) -> usize;
    fn page_count(&self) -> usize;

    fn set_layer(&mut self, layer: Layer);
    /// Remove everything in the selected layer of the active page.
    fn clear_layer(&mut self);

    fn output(&self) -> Result<Vec<u8>, CanvasError>;
}

/// Default font size of a freshly constructed canvas, in points.
const INITIAL_FONT_SIZE: f32 = 16.0;

/// A canvas that records drawing operations per page and serializes them to
/// PDF on `output`.
pub struct PdfCanvas {
    width: f32,
    height: f32,
    title: Option<String>,
    pages: Vec<PageContent>,
    active: usize,
    layer: Layer,
    text_style: TextStyle,
    fill: Color,
    stroke: Color,
    line_width: f32,
}

impl PdfCanvas {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn pages(&self) -> &[PageContent] {
        &self.pages
    }

    /// Content of a 1-based page number.
    pub fn page(&self, page: usize) -> Option<&PageContent> {
        page.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    fn push(&mut self, op: DrawOp) {
        let page = &mut self.pages[self.active];
        match self.layer {
            Layer::Body => page.body.push(op),
            Layer::Footer => page.footer.push(op),
        }
    }
}

impl Canvas for PdfCanvas {
    fn new(orientation: Orientation, format: PageFormat) -> Self {
        let (w_pt, h_pt) = format.size_pt();
        let (w_pt, h_pt) = match orientation {
            Orientation::Portrait => (w_pt, h_pt),
            Orientation::Landscape => (h_pt, w_pt),
        };
        Self {
            width: w_pt * MM_PER_PT,
            height: h_pt * MM_PER_PT,
            title: None,
            pages: vec![PageContent::default()],
            active: 0,
            layer: Layer::Body,
            text_style: TextStyle {
                font_size: INITIAL_FONT_SIZE,
                font_style: FontStyle::Normal,
                color: Color::BLACK,
            },
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 0.2,
        }
    }

    fn page_width(&self) -> f32 {
        self.width
    }

    fn page_height(&self) -> f32 {
        self.height
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn set_font_size(&mut self, size: f32) {
        self.text_style.font_size = size;
    }

    fn set_font_style(&mut self, style: FontStyle) {
        self.text_style.font_style = style;
    }

    fn set_text_color(&mut self, color: Color) {
        self.text_style.color = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    fn text_style(&self) -> TextStyle {
        self.text_style
    }

    fn text_width(&self, text: &str) -> f32 {
        StandardFont::for_style(self.text_style.font_style)
            .text_width_mm(text, self.text_style.font_size)
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        let style = self.text_style;
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, mode: RectMode) {
        let (fill, stroke, line_width) = (self.fill, self.stroke, self.line_width);
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            mode,
            fill,
            stroke,
            line_width,
        });
    }

    fn add_page(&mut self) {
        self.pages.push(PageContent::default());
        self.active = self.pages.len() - 1;
    }

    fn set_page(&mut self, page: usize) {
        if page == 0 || page > self.pages.len() {
            log::warn!(
                "set_page({page}) ignored, document has {} pages",
                self.pages.len()
            );
            return;
        }
        self.active = page - 1;
    }

    fn current_page(&self) -> usize {
        self.active + 1
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    fn clear_layer(&mut self) {
        let page = &mut self.pages[self.active];
        match self.layer {
            Layer::Body => page.body.clear(),
            Layer::Footer => page.footer.clear(),
        }
    }

    fn output(&self) -> Result<Vec<u8>, CanvasError> {
        super::write_pdf(self.title.as_deref(), self.width, self.height, &self.pages)
    }
}
