use crate::model::{Alignment, Margins};
use crate::pdf::Canvas;

pub const ELLIPSIS: &str = "\u{2026}";

/// Vertical room a single `add_text` call reserves. Text wider than the line
/// is not wrapped; its height is estimated from how many line widths it spans.
pub(crate) fn text_height<C: Canvas>(
    canvas: &C,
    content: &str,
    font_size: f32,
    line_height: f32,
    max_width: f32,
) -> f32 {
    let line = font_size * line_height;
    if content.is_empty() || max_width <= 0.0 {
        return line;
    }
    let width = canvas.text_width(content);
    if width <= max_width {
        line
    } else {
        (width / max_width).ceil() * line
    }
}

/// Horizontal start of `content` for the given alignment. Centering uses the
/// full page width, right alignment the right margin.
pub(crate) fn aligned_x<C: Canvas>(
    canvas: &C,
    content: &str,
    align: Alignment,
    page_width: f32,
    margins: &Margins,
) -> f32 {
    match align {
        Alignment::Left => margins.left,
        Alignment::Center => (page_width - canvas.text_width(content)) / 2.0,
        Alignment::Right => page_width - margins.right - canvas.text_width(content),
    }
}

/// Shorten `text` one character at a time until it plus a trailing ellipsis
/// fits `max_width`. Degrades to the bare ellipsis.
pub fn truncate_text_to_fit<C: Canvas>(canvas: &C, text: &str, max_width: f32) -> String {
    if text.is_empty() || canvas.text_width(text) <= max_width {
        return text.to_string();
    }
    let mut truncated = text.to_string();
    while truncated.pop().is_some() {
        if truncated.is_empty() {
            break;
        }
        let candidate = format!("{truncated}{ELLIPSIS}");
        if canvas.text_width(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// Greedy word wrap on single spaces. A word wider than the line on its own is
/// truncated onto a line of its own.
pub fn wrap_text_to_fit<C: Canvas>(canvas: &C, text: &str, max_width: f32) -> Vec<String> {
    if text.is_empty() || canvas.text_width(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if canvas.text_width(&candidate) <= max_width {
            current = candidate;
        } else if !current.is_empty() {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            lines.push(truncate_text_to_fit(canvas, word, max_width));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(text.to_string());
    }
    lines
}
