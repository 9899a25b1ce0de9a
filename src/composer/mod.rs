//! Incremental vertical-flow layout onto a paginated canvas.
//!
//! A [`Composer`] owns one document at a time: a canvas plus the cursor
//! (`current_page`, `current_y`) that every add-operation advances. Content
//! that does not fit between the cursor and the bottom margin moves to a
//! fresh page first. Footers are stamped onto every page and re-stamped
//! whenever a page is added, so page totals always match the final count.

mod layout;
mod table;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::error::{Error, Result};
use crate::model::{
    Alignment, Color, ContentType, DocumentOptions, FontStyle, FooterConfig, FooterOptions,
    Margins, Record, SectionMetadata, SectionOptions, TableOptions, TextOptions,
};
use crate::pdf::{Canvas, Layer, PdfCanvas};

pub use layout::{ELLIPSIS, truncate_text_to_fit, wrap_text_to_fit};
pub use table::{auto_column_widths, equal_column_widths, row_height};

const DEFAULT_FONT_SIZE: f32 = 12.0;
const DEFAULT_LINE_HEIGHT: f32 = 1.0;
const HEADER_FONT_SIZES: [f32; 6] = [20.0, 18.0, 16.0, 14.0, 13.0, 12.0];

/// Sections and footer registered on the current document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    pub current_section: usize,
    pub total_sections: usize,
    pub sections: Vec<SectionMetadata>,
    pub footer: Option<FooterConfig>,
    pub has_footer: bool,
}

/// Cursor and page geometry of the document being composed. Lengths are in
/// millimetres, font sizes in points.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentState {
    pub current_page: usize,
    pub current_y: f32,
    pub page_height: f32,
    pub page_width: f32,
    pub margins: Margins,
    pub default_font_size: f32,
    pub line_height: f32,
    pub is_initialized: bool,
    pub composition: Composition,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            current_page: 1,
            current_y: 0.0,
            page_height: 0.0,
            page_width: 0.0,
            margins: Margins::default(),
            default_font_size: DEFAULT_FONT_SIZE,
            line_height: DEFAULT_LINE_HEIGHT,
            is_initialized: false,
            composition: Composition::default(),
        }
    }
}

impl DocumentState {
    /// Room left between the cursor and the bottom margin.
    pub fn remaining_space(&self) -> f32 {
        self.page_height - self.current_y - self.margins.bottom
    }

    pub fn available_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }
}

/// Builds one paginated document. Not meant to be shared: use one composer
/// per in-flight document.
pub struct Composer<C: Canvas = PdfCanvas> {
    canvas: Option<C>,
    state: DocumentState,
}

impl<C: Canvas> Default for Composer<C> {
    fn default() -> Self {
        Self {
            canvas: None,
            state: DocumentState::default(),
        }
    }
}

/// Mutable layout context for one initialized document: the canvas and the
/// cursor it draws at.
pub(crate) struct Flow<'a, C: Canvas> {
    pub(crate) canvas: &'a mut C,
    pub(crate) state: &'a mut DocumentState,
}

impl<C: Canvas> Flow<'_, C> {
    pub(crate) fn fits(&self, required_height: f32) -> bool {
        required_height <= self.state.remaining_space()
    }

    pub(crate) fn new_page(&mut self) {
        self.canvas.add_page();
        self.state.current_page += 1;
        self.state.current_y = self.state.margins.top;
        log::debug!("new page {}", self.state.current_page);

        if self.state.composition.has_footer {
            self.stamp_footers();
        }
    }

    /// Start a new page unless `height` fits below the cursor.
    pub(crate) fn ensure_space(&mut self, height: f32) {
        if !self.fits(height) {
            log::debug!(
                "page break: need {:.2}mm, {:.2}mm left on page {}",
                height,
                self.state.remaining_space(),
                self.state.current_page
            );
            self.new_page();
        }
    }

    pub(crate) fn apply_text_formatting(&mut self, options: &TextOptions) {
        self.canvas
            .set_font_size(options.font_size.unwrap_or(self.state.default_font_size));
        self.canvas
            .set_font_style(options.font_style.unwrap_or(FontStyle::Normal));
        self.canvas.set_text_color(options.color.unwrap_or(Color::BLACK));
    }

    pub(crate) fn add_spacing(&mut self, spacing: f32) {
        if spacing.is_nan() || spacing <= 0.0 {
            return;
        }
        if self.fits(spacing) {
            self.state.current_y += spacing;
        } else {
            self.new_page();
        }
    }

    pub(crate) fn add_text(&mut self, content: &str, options: &TextOptions) {
        if content.trim().is_empty() {
            return;
        }
        self.apply_text_formatting(options);

        let font_size = options.font_size.unwrap_or(self.state.default_font_size);
        let height = layout::text_height(
            &*self.canvas,
            content,
            font_size,
            self.state.line_height,
            self.state.available_width(),
        );
        self.ensure_space(height);

        let x = layout::aligned_x(
            &*self.canvas,
            content,
            options.align.unwrap_or_default(),
            self.state.page_width,
            &self.state.margins,
        );
        self.canvas.text(content, x, self.state.current_y);
        self.state.current_y += height;
    }

    pub(crate) fn add_header(&mut self, content: &str, level: u8, align: Option<Alignment>) {
        if content.trim().is_empty() {
            return;
        }
        let level = level.clamp(1, 6);
        let font_size = HEADER_FONT_SIZES
            .get(usize::from(level) - 1)
            .copied()
            .unwrap_or(self.state.default_font_size);
        let options = TextOptions::new()
            .size(font_size)
            .bold()
            .color(Color::BLACK)
            .align(align.unwrap_or_default());

        if self.state.current_y > self.state.margins.top {
            let spacing_before = font_size * 0.05;
            if self.fits(spacing_before) {
                self.state.current_y += spacing_before;
            } else {
                self.new_page();
            }
        }

        self.add_text(content, &options);

        // No page-space check here; the next operation's own check absorbs
        // any overshoot past the bottom margin.
        self.state.current_y += font_size * 0.02;
    }

    fn begin_section(&mut self, title: Option<&str>) {
        let metadata = SectionMetadata {
            id: section_id(),
            title: title.map(str::to_string),
            start_page: self.state.current_page,
            start_y: self.state.current_y,
            content_type: ContentType::Mixed,
        };
        log::debug!(
            "section {} starts on page {} at y={:.2}",
            metadata.id,
            metadata.start_page,
            metadata.start_y
        );
        let composition = &mut self.state.composition;
        composition.sections.push(metadata);
        composition.current_section = composition.sections.len();
        composition.total_sections = composition.sections.len();
    }

    /// Draw the footer on every page, replacing earlier stamps. Leaves the
    /// cursor, the active page and the text style as they were.
    pub(crate) fn stamp_footers(&mut self) {
        let Some(footer) = self.state.composition.footer.clone() else {
            return;
        };

        let saved_y = self.state.current_y;
        let saved_page = self.state.current_page;
        let saved_style = self.canvas.text_style();
        let total_pages = self.canvas.page_count();
        let align = footer.style.align.unwrap_or(Alignment::Center);

        self.canvas.set_layer(Layer::Footer);
        for page in 1..=total_pages {
            self.canvas.set_page(page);
            self.canvas.clear_layer();
            if page == 1 && !footer.show_on_first_page {
                continue;
            }

            let y = self.state.page_height - footer.bottom_margin;
            let text = footer.text_for_page(page, total_pages);
            self.apply_text_formatting(&footer.style);
            let x = layout::aligned_x(
                &*self.canvas,
                &text,
                align,
                self.state.page_width,
                &self.state.margins,
            );
            self.canvas.text(&text, x, y);
        }
        self.canvas.set_layer(Layer::Body);

        if saved_page <= total_pages {
            self.canvas.set_page(saved_page);
        }
        self.canvas.set_font_size(saved_style.font_size);
        self.canvas.set_font_style(saved_style.font_style);
        self.canvas.set_text_color(saved_style.color);
        self.state.current_y = saved_y;

        log::debug!("footer stamped on {total_pages} pages");
    }
}

fn section_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("section-{millis}-{suffix}")
}

impl<C: Canvas> Composer<C> {
    pub fn new() -> Self {
        Self::default()
    }

    fn flow(&mut self, operation: &'static str) -> Result<Flow<'_, C>> {
        match self.canvas.as_mut() {
            Some(canvas) if self.state.is_initialized => Ok(Flow {
                canvas,
                state: &mut self.state,
            }),
            _ => Err(Error::Uninitialized { operation }),
        }
    }

    /// Drop the canvas and return to the uninitialized defaults.
    pub fn reset(&mut self) {
        self.canvas = None;
        self.state = DocumentState::default();
    }

    /// Start a new document, discarding any previous one. Margins fall back to
    /// whatever `set_margins` last configured.
    pub fn create_document(&mut self, options: DocumentOptions) {
        let orientation = options.orientation.unwrap_or_default();
        let format = options.format.unwrap_or_default();
        let margins = options.margins.unwrap_or(self.state.margins);

        let mut canvas = C::new(orientation, format);
        if let Some(title) = &options.title {
            canvas.set_title(title);
        }

        self.state = DocumentState {
            current_page: 1,
            current_y: margins.top,
            page_height: canvas.page_height(),
            page_width: canvas.page_width(),
            margins,
            default_font_size: DEFAULT_FONT_SIZE,
            line_height: DEFAULT_LINE_HEIGHT,
            is_initialized: true,
            composition: Composition::default(),
        };
        canvas.set_font_size(self.state.default_font_size);
        self.canvas = Some(canvas);

        log::debug!(
            "created {:?} {:?} document {:.2}x{:.2}mm",
            format,
            orientation,
            self.state.page_width,
            self.state.page_height
        );
    }

    pub fn set_margins(&mut self, margins: Margins) {
        self.state.margins = margins;
        if self.state.is_initialized && self.state.current_y < margins.top {
            self.state.current_y = margins.top;
        }
    }

    /// Whether `required_height` fits between the cursor and the bottom
    /// margin. Always false before `create_document`.
    pub fn check_page_space(&self, required_height: f32) -> bool {
        self.state.is_initialized && required_height <= self.state.remaining_space()
    }

    pub fn add_new_page(&mut self) -> Result<()> {
        self.flow("adding new pages")?.new_page();
        Ok(())
    }

    pub fn add_page_break(&mut self) -> Result<()> {
        self.flow("adding page breaks")?.new_page();
        Ok(())
    }

    pub fn add_text(&mut self, content: &str, options: TextOptions) -> Result<()> {
        self.flow("adding text")?.add_text(content, &options);
        Ok(())
    }

    /// Bold header; `level` is clamped to 1..=6 and picks the font size.
    pub fn add_header(&mut self, content: &str, level: u8, align: Option<Alignment>) -> Result<()> {
        self.flow("adding headers")?.add_header(content, level, align);
        Ok(())
    }

    pub fn add_spacing(&mut self, spacing: f32) -> Result<()> {
        self.flow("adding spacing")?.add_spacing(spacing);
        Ok(())
    }

    /// Add `spacing`, record a new section at the cursor and draw its title as
    /// a level-2 header.
    pub fn add_section(&mut self, title: Option<&str>, spacing: f32) -> Result<()> {
        let mut flow = self.flow("adding sections")?;
        flow.add_spacing(spacing);
        flow.begin_section(title);
        if let Some(title) = title {
            flow.add_header(title, 2, None);
        }
        Ok(())
    }

    pub fn add_section_with(&mut self, options: &SectionOptions) -> Result<()> {
        let mut flow = self.flow("adding sections")?;
        if options.page_break_before {
            flow.new_page();
        }
        flow.add_spacing(options.spacing_before);
        let title = options.title.as_deref().filter(|t| !t.trim().is_empty());
        flow.begin_section(title);
        match (title, &options.title_options) {
            (Some(title), Some(style)) => flow.add_text(title, style),
            (Some(title), None) => flow.add_header(title, 2, None),
            (None, _) => {}
        }
        flow.add_spacing(options.spacing_after);
        Ok(())
    }

    /// Set the document footer, styled with `options` (10pt grey centred when
    /// `None`). `{pageNumber}` and `{totalPages}` are substituted per page.
    pub fn add_footer(&mut self, content: &str, options: Option<TextOptions>) -> Result<()> {
        let footer = FooterOptions {
            style: options.unwrap_or_else(FooterOptions::default_style),
            ..FooterOptions::default()
        };
        self.add_footer_with(content, footer)
    }

    pub fn add_footer_with(&mut self, content: &str, options: FooterOptions) -> Result<()> {
        let mut flow = self.flow("adding footers")?;
        if content.trim().is_empty() {
            return Ok(());
        }
        let composition = &mut flow.state.composition;
        composition.footer = Some(FooterConfig::new(content, options));
        composition.has_footer = true;
        flow.stamp_footers();
        Ok(())
    }

    pub fn generate_table<S: AsRef<str>>(
        &mut self,
        headers: &[S],
        records: &[Record],
        options: &TableOptions,
    ) -> Result<()> {
        let mut flow = self.flow("generating tables")?;
        if headers.is_empty() {
            return Err(Error::MissingHeaders);
        }
        let headers: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
        flow.generate_table(&headers, records, options);
        Ok(())
    }

    /// Serialize the document. Sections and footer survive; the font state
    /// and the current-section pointer are reset afterwards.
    pub fn export_as_buffer(&mut self) -> Result<Vec<u8>> {
        let flow = self.flow("export")?;
        let bytes = flow.canvas.output().map_err(Error::Export)?;

        flow.canvas.set_font_size(flow.state.default_font_size);
        flow.canvas.set_font_style(FontStyle::Normal);
        flow.canvas.set_text_color(Color::BLACK);
        flow.state.composition.current_section = 0;

        log::info!(
            "PDF export completed. Document has {} pages ({} bytes)",
            flow.state.current_page,
            bytes.len()
        );
        Ok(bytes)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized && self.canvas.is_some()
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    pub fn composition(&self) -> &Composition {
        &self.state.composition
    }

    pub fn sections(&self) -> &[SectionMetadata] {
        &self.state.composition.sections
    }

    pub fn footer(&self) -> Option<&FooterConfig> {
        self.state.composition.footer.as_ref()
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn current_y(&self) -> f32 {
        self.state.current_y
    }
}
