use crate::model::{FontStyle, MM_PER_PT};

/// The standard-14 faces a document can use. They need no embedding, so the
/// canvas only writes a Type1 font dictionary for each style it touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
}

impl StandardFont {
    pub(crate) const ALL: [StandardFont; 3] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
    ];

    pub(crate) fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => StandardFont::Helvetica,
            FontStyle::Bold => StandardFont::HelveticaBold,
            FontStyle::Italic => StandardFont::HelveticaOblique,
        }
    }

    pub(crate) fn base_font(self) -> &'static [u8] {
        match self {
            StandardFont::Helvetica => b"Helvetica",
            StandardFont::HelveticaBold => b"Helvetica-Bold",
            StandardFont::HelveticaOblique => b"Helvetica-Oblique",
        }
    }

    /// Resource name used inside page content streams.
    pub(crate) fn resource_name(self) -> &'static [u8] {
        match self {
            StandardFont::Helvetica => b"F1",
            StandardFont::HelveticaBold => b"F2",
            StandardFont::HelveticaOblique => b"F3",
        }
    }

    fn widths_ascii(self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of one WinAnsi byte in 1000-units.
    pub(crate) fn byte_width_1000(self, byte: u8) -> f32 {
        match byte {
            32..=126 => self.widths_ascii()[(byte - 32) as usize] as f32,
            0x85 | 0x89 | 0x8C | 0x99 | 0x9C => 1000.0, // … ‰ Œ ™ œ
            0x91 | 0x92 => 222.0,
            0x96 => 556.0,
            0x97 => 1000.0,
            0xA0 => 278.0,
            _ => 556.0,
        }
    }

    /// Width of `text` in millimetres at `font_size` points.
    pub(crate) fn text_width_mm(self, text: &str, font_size: f32) -> f32 {
        let units: f32 = to_winansi_bytes(text)
            .iter()
            .filter(|&&b| b >= 32)
            .map(|&b| self.byte_width_1000(b))
            .sum();
        units * font_size / 1000.0 * MM_PER_PT
    }
}

/// Helvetica AFM advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

/// Helvetica-Bold AFM advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95, // bullet
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page become '?', so they still take up room.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match char_to_winansi(c) {
            0 if (c as u32) < 0x20 => b' ',
            0 => b'?',
            byte => byte,
        })
        .collect()
}
