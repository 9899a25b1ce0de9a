mod canvas;

use std::collections::{BTreeMap, BTreeSet};

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::fonts::{StandardFont, to_winansi_bytes};
use crate::model::MM_PER_PT;

pub use canvas::{Canvas, DrawOp, Layer, PageContent, PdfCanvas, RectMode, TextStyle};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("document has no pages")]
    NoPages,

    #[error("page {page} has a drawing operation with a non-finite coordinate")]
    NonFiniteCoordinate { page: usize },
}

fn pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

fn draw_op(content: &mut Content, op: &DrawOp, page_height: f32) {
    match op {
        DrawOp::Text { text, x, y, style } => {
            let (r, g, b) = style.color.to_unit_rgb();
            let font = StandardFont::for_style(style.font_style);
            content.save_state();
            content.set_fill_rgb(r, g, b);
            content.begin_text();
            content.set_font(Name(font.resource_name()), style.font_size);
            content.next_line(pt(*x), pt(page_height - *y));
            content.show(Str(&to_winansi_bytes(text)));
            content.end_text();
            content.restore_state();
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            mode,
            fill,
            stroke,
            line_width,
        } => {
            content.save_state();
            let (fr, fg, fb) = fill.to_unit_rgb();
            let (sr, sg, sb) = stroke.to_unit_rgb();
            content.set_fill_rgb(fr, fg, fb);
            content.set_stroke_rgb(sr, sg, sb);
            content.set_line_width(pt(*line_width));
            content.rect(pt(*x), pt(page_height - *y - *height), pt(*width), pt(*height));
            match mode {
                RectMode::Stroke => content.stroke(),
                RectMode::Fill => content.fill_nonzero(),
                RectMode::FillStroke => content.fill_nonzero_and_stroke(),
            };
            content.restore_state();
        }
    }
}

/// Serialize recorded pages (millimetre geometry, top-left origin) into a PDF
/// file using the standard Helvetica faces.
pub(crate) fn write_pdf(
    title: Option<&str>,
    page_width: f32,
    page_height: f32,
    pages: &[PageContent],
) -> Result<Vec<u8>, CanvasError> {
    if pages.is_empty() {
        return Err(CanvasError::NoPages);
    }
    if let Some(i) = pages.iter().position(|p| !p.ops().all(DrawOp::is_finite)) {
        return Err(CanvasError::NonFiniteCoordinate { page: i + 1 });
    }

    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    let used_fonts: BTreeSet<StandardFont> = pages
        .iter()
        .flat_map(|p| p.ops())
        .filter_map(|op| match op {
            DrawOp::Text { style, .. } => Some(StandardFont::for_style(style.font_style)),
            DrawOp::Rect { .. } => None,
        })
        .collect();

    let mut font_refs: BTreeMap<StandardFont, Ref> = BTreeMap::new();
    for font in StandardFont::ALL.into_iter().filter(|f| used_fonts.contains(f)) {
        let font_ref = alloc();
        pdf.type1_font(font_ref)
            .base_font(Name(font.base_font()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        font_refs.insert(font, font_ref);
    }

    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in pages.iter().enumerate() {
        let mut content = Content::new();
        for op in page.ops() {
            draw_op(&mut content, op, page_height);
        }
        let raw = content.finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, pt(page_width), pt(page_height)))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        for (font, font_ref) in &font_refs {
            fonts.pair(Name(font.resource_name()), *font_ref);
        }
    }

    if let Some(title) = title {
        let info_id = alloc();
        pdf.document_info(info_id).title(TextStr(title));
    }

    let bytes = pdf.finish();
    log::debug!(
        "write_pdf: {} pages, {} fonts, {} bytes in {:.1}ms",
        n,
        font_refs.len(),
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}
