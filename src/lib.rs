mod composer;
mod error;
mod fonts;
pub mod model;
pub mod pdf;
pub mod report;

pub use composer::{
    Composer, Composition, DocumentState, ELLIPSIS, auto_column_widths, equal_column_widths,
    row_height, truncate_text_to_fit, wrap_text_to_fit,
};
pub use error::{Error, Result};
pub use model::{
    Alignment, Color, ColumnWidthMode, DocumentOptions, FontStyle, FooterConfig, FooterOptions,
    Margins, Orientation, PageFormat, Record, SectionMetadata, SectionOptions, TableOptions,
    TextOptions,
};
pub use pdf::{Canvas, PdfCanvas};
pub use report::Report;

use std::path::Path;
use std::time::Instant;

/// Lay out `report` with a fresh composer and return the PDF bytes.
pub fn render_report(report: &Report) -> Result<Vec<u8>> {
    let t0 = Instant::now();

    let mut composer: Composer = Composer::new();
    report::compose(&mut composer, report)?;
    let t_layout = t0.elapsed();

    let bytes = composer.export_as_buffer()?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, export={:.1}ms, total={:.1}ms ({} pages, {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        composer.current_page(),
        bytes.len(),
    );

    Ok(bytes)
}

pub fn render_report_file(input: &Path, output: &Path) -> Result<()> {
    let t0 = Instant::now();

    let report = Report::from_file(input)?;
    let t_parse = t0.elapsed();

    let bytes = render_report(&report)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_render - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
