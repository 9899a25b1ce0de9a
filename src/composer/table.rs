use crate::model::{ColumnWidthMode, Record, TableOptions, TextOptions};
use crate::pdf::{Canvas, RectMode};

use super::Flow;
use super::layout::{truncate_text_to_fit, wrap_text_to_fit};

/// Records measured per column in `Auto` mode. Later rows are not inspected.
const AUTO_WIDTH_SAMPLE_ROWS: usize = 10;
/// Gap between the table and the content around it, in millimetres.
const TABLE_SPACING: f32 = 1.0;

pub fn row_height(font_size: f32, line_height: f32, cell_padding: f32) -> f32 {
    font_size * line_height + cell_padding * 2.0
}

pub fn equal_column_widths(columns: usize, available_width: f32) -> Vec<f32> {
    if columns == 0 {
        return Vec::new();
    }
    vec![available_width / columns as f32; columns]
}

/// Turn measured content widths (padding included) into final column widths.
///
/// Each column is clamped to `[min, max]`. Spare room is shared out equally,
/// capped at `max`. When the clamped columns overflow `available_width` they
/// are scaled down proportionally; columns that would drop below `min` are
/// pinned there and the rest scaled again, so the sum never exceeds
/// `available_width` as long as `columns * min` fits at all.
pub fn auto_column_widths(content_widths: &[f32], available_width: f32, min: f32, max: f32) -> Vec<f32> {
    let n = content_widths.len();
    if n == 0 {
        return Vec::new();
    }
    let max = max.max(min);
    if min * n as f32 > available_width {
        log::warn!(
            "{n} columns of at least {min:.1}mm cannot fit {available_width:.1}mm, using equal widths"
        );
        return equal_column_widths(n, available_width);
    }

    let mut widths: Vec<f32> = content_widths.iter().map(|w| w.clamp(min, max)).collect();
    let total: f32 = widths.iter().sum();

    if total <= available_width {
        let extra = (available_width - total) / n as f32;
        for w in &mut widths {
            *w = (*w + extra).min(max);
        }
        return widths;
    }

    let mut pinned = vec![false; n];
    loop {
        let pinned_total = pinned.iter().filter(|&&p| p).count() as f32 * min;
        let flexible_total: f32 = widths
            .iter()
            .zip(&pinned)
            .filter(|&(_, &p)| !p)
            .map(|(w, _)| w)
            .sum();
        let target = available_width - pinned_total;
        if flexible_total <= target || flexible_total <= 0.0 {
            break;
        }

        let scale = target / flexible_total;
        let mut newly_pinned = false;
        for (w, p) in widths.iter_mut().zip(pinned.iter_mut()) {
            if *p {
                continue;
            }
            let scaled = *w * scale;
            if scaled < min {
                *w = min;
                *p = true;
                newly_pinned = true;
            } else {
                *w = scaled;
            }
        }
        if !newly_pinned {
            break;
        }
    }
    widths
}

impl<C: Canvas> Flow<'_, C> {
    fn font_size_of(&self, style: &TextOptions) -> f32 {
        style.font_size.unwrap_or(self.state.default_font_size)
    }

    pub(crate) fn column_widths(&mut self, headers: &[&str], records: &[Record], options: &TableOptions) -> Vec<f32> {
        let available = self.state.available_width();
        let n = headers.len();

        let widths = match options.column_width_mode {
            ColumnWidthMode::Manual => match &options.column_widths {
                Some(widths) if widths.len() == n => widths.clone(),
                other => {
                    log::warn!(
                        "manual column widths need {} entries, got {:?}; using equal widths",
                        n,
                        other.as_ref().map(Vec::len)
                    );
                    equal_column_widths(n, available)
                }
            },
            ColumnWidthMode::Equal => equal_column_widths(n, available),
            ColumnWidthMode::Auto => {
                let padding = options.cell_padding * 2.0;
                let sample = &records[..records.len().min(AUTO_WIDTH_SAMPLE_ROWS)];

                self.apply_text_formatting(&options.header_style);
                let mut measured: Vec<f32> = headers
                    .iter()
                    .map(|h| self.canvas.text_width(h) + padding)
                    .collect();

                self.apply_text_formatting(&options.cell_style);
                for (col, header) in headers.iter().enumerate() {
                    for record in sample {
                        let w = self.canvas.text_width(record.cell(col, header)) + padding;
                        measured[col] = measured[col].max(w);
                    }
                }

                auto_column_widths(
                    &measured,
                    available,
                    options.min_column_width,
                    options.max_column_width,
                )
            }
        };

        log::debug!(
            "table columns ({:?}): {:?}",
            options.column_width_mode,
            widths.iter().map(|w| format!("{w:.1}")).collect::<Vec<_>>()
        );
        widths
    }

    fn apply_border_style(&mut self, options: &TableOptions) {
        if options.show_borders {
            self.canvas.set_line_width(options.border_width);
            self.canvas.set_draw_color(options.border_color);
        }
    }

    fn render_header_row(&mut self, headers: &[&str], widths: &[f32], options: &TableOptions) {
        let font_size = self.font_size_of(&options.header_style);
        let row_h = row_height(font_size, self.state.line_height, options.cell_padding);
        let row_top = self.state.current_y;
        let left = self.state.margins.left;

        self.apply_border_style(options);
        if let Some(background) = options.header_background {
            self.canvas.set_fill_color(background);
            let mode = if options.show_borders {
                RectMode::FillStroke
            } else {
                RectMode::Fill
            };
            self.canvas.rect(left, row_top, widths.iter().sum(), row_h, mode);
        }

        self.apply_text_formatting(&options.header_style);

        let mut x = left;
        for (header, &width) in headers.iter().zip(widths) {
            if options.show_borders && options.header_background.is_none() {
                self.canvas.rect(x, row_top, width, row_h, RectMode::Stroke);
            }

            let text_x = x + options.cell_padding;
            let text_y = row_top + row_h / 2.0 + font_size / 3.0;
            let max_text_width = width - 2.0 * options.cell_padding;
            // Only the first wrapped line is drawn; the row height is fixed.
            let lines = wrap_text_to_fit(&*self.canvas, header, max_text_width);
            if let Some(first) = lines.first().filter(|l| !l.is_empty()) {
                self.canvas.text(first, text_x, text_y);
            }
            x += width;
        }

        self.state.current_y += row_h;
    }

    fn render_row(
        &mut self,
        headers: &[&str],
        record: &Record,
        widths: &[f32],
        options: &TableOptions,
        row_index: usize,
        row_h: f32,
    ) {
        let font_size = self.font_size_of(&options.cell_style);
        let row_top = self.state.current_y;
        let left = self.state.margins.left;
        let shaded = options.alternating_rows && row_index % 2 == 1;

        if shaded {
            self.canvas.set_fill_color(options.alternating_row_color);
            let mode = if options.show_borders {
                RectMode::FillStroke
            } else {
                RectMode::Fill
            };
            self.canvas.rect(left, row_top, widths.iter().sum(), row_h, mode);
        }

        let mut x = left;
        for (col, (header, &width)) in headers.iter().zip(widths).enumerate() {
            if options.show_borders && !shaded {
                self.canvas.rect(x, row_top, width, row_h, RectMode::Stroke);
            }

            let value = record.cell(col, header);
            if !value.is_empty() {
                let text_x = x + options.cell_padding;
                let text_y = row_top + row_h / 2.0 + font_size / 3.0;
                let max_text_width = width - 2.0 * options.cell_padding;
                let text = truncate_text_to_fit(&*self.canvas, value, max_text_width);
                self.canvas.text(&text, text_x, text_y);
            }
            x += width;
        }

        self.state.current_y += row_h;
    }

    pub(crate) fn generate_table(&mut self, headers: &[&str], records: &[Record], options: &TableOptions) {
        let widths = self.column_widths(headers, records, options);

        if self.state.current_y > self.state.margins.top {
            self.add_spacing(TABLE_SPACING);
        }

        let header_h = row_height(
            self.font_size_of(&options.header_style),
            self.state.line_height,
            options.cell_padding,
        );
        self.ensure_space(header_h);
        self.render_header_row(headers, &widths, options);

        let row_h = row_height(
            self.font_size_of(&options.cell_style),
            self.state.line_height,
            options.cell_padding,
        );
        self.apply_border_style(options);
        self.apply_text_formatting(&options.cell_style);

        for (row_index, record) in records.iter().enumerate() {
            if !self.fits(row_h) {
                self.new_page();
                if options.repeat_headers_on_new_page {
                    self.render_header_row(headers, &widths, options);
                }
                self.apply_text_formatting(&options.cell_style);
                self.apply_border_style(options);
            }
            self.render_row(headers, record, &widths, options, row_index, row_h);
        }

        log::debug!(
            "table: {} columns, {} rows, ended on page {} at y={:.2}",
            headers.len(),
            records.len(),
            self.state.current_page,
            self.state.current_y
        );
        self.add_spacing(TABLE_SPACING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_widths_split_the_line() {
        assert_eq!(equal_column_widths(4, 170.0), vec![42.5; 4]);
        assert!(equal_column_widths(0, 170.0).is_empty());
    }

    #[test]
    fn spare_room_is_shared_and_capped() {
        let widths = auto_column_widths(&[10.0, 30.0, 95.0], 175.0, 20.0, 100.0);
        // clamped to [20, 30, 95] = 145, 10mm spare each, last capped at 100
        assert_eq!(widths, vec![30.0, 40.0, 100.0]);
    }

    #[test]
    fn overflow_scales_down_and_pins_minimum() {
        let widths = auto_column_widths(&[100.0, 100.0, 21.0], 150.0, 20.0, 100.0);
        assert!(widths.iter().all(|&w| (20.0..=100.0).contains(&w)));
        assert_eq!(widths[2], 20.0);
        assert!((widths.iter().sum::<f32>() - 150.0).abs() < 1e-3);
        assert!((widths[0] - widths[1]).abs() < 1e-4);
    }

    #[test]
    fn row_height_adds_padding_on_both_sides() {
        assert_eq!(row_height(12.0, 1.0, 2.0), 16.0);
    }
}
