//! Standard 14 Helvetica fonts (no embedding required)
//!
//! Widths come from the Adobe core font metrics, in 1/1000 em, for the
//! printable ASCII range and the Latin-1 supplement. Text is encoded with
//! WinAnsiEncoding, which covers French accented letters.

/// Helvetica widths for U+0020..=U+007E
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold widths for U+0020..=U+007E
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // digits
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // '{'..'~'
];

/// Helvetica widths for U+00A0..=U+00FF
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, //
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, //
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, //
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, //
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, //
];

/// Helvetica-Bold widths for U+00A0..=U+00FF
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, //
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, //
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, //
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, //
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, //
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, //
];

/// Built-in (non-embedded) fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// PostScript name used as /BaseFont
    pub fn base_font(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Ascender in 1/1000 em
    pub fn ascender(&self) -> i16 {
        718
    }

    /// Descender in 1/1000 em
    pub fn descender(&self) -> i16 {
        -207
    }

    /// Advance width of a character in 1/1000 em
    ///
    /// Characters that WinAnsi cannot encode are measured as the `?`
    /// they are replaced with.
    pub fn char_width(&self, c: char) -> u16 {
        let (ascii, latin1) = match self {
            BuiltinFont::Helvetica => (&HELVETICA_ASCII, &HELVETICA_LATIN1),
            BuiltinFont::HelveticaBold => (&HELVETICA_BOLD_ASCII, &HELVETICA_BOLD_LATIN1),
        };
        let bold = matches!(self, BuiltinFont::HelveticaBold);

        match winansi_code(c) {
            Some(code @ 0x20..=0x7E) => ascii[(code - 0x20) as usize],
            Some(code @ 0xA0..=0xFF) => latin1[(code - 0xA0) as usize],
            Some(0x80) => 556,
            Some(0x85 | 0x89 | 0x8C | 0x97 | 0x99) => 1000,
            Some(0x9C) => 944,
            Some(0x91 | 0x92 | 0x82) => {
                if bold {
                    278
                } else {
                    222
                }
            }
            Some(0x93 | 0x94 | 0x84) => {
                if bold {
                    500
                } else {
                    333
                }
            }
            Some(0x95) => 350,
            Some(_) => 556,
            None => ascii[(b'?' - 0x20) as usize],
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 / 1000.0 * font_size
    }

    /// Encode text as a hex string for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            let code = winansi_code(c).unwrap_or(b'?');
            result.push_str(&format!("{code:02X}"));
        }
        result.push('>');
        result
    }
}

/// Map a character to its WinAnsiEncoding code
pub(crate) fn winansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x09 => Some(b' '),
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(BuiltinFont::Helvetica.char_width(' '), 278);
        assert_eq!(BuiltinFont::Helvetica.char_width('A'), 667);
        assert_eq!(BuiltinFont::Helvetica.char_width('i'), 222);
        assert_eq!(BuiltinFont::Helvetica.char_width('~'), 584);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('A'), 722);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('z'), 500);
    }

    #[test]
    fn test_accented_widths() {
        assert_eq!(BuiltinFont::Helvetica.char_width('é'), 556);
        assert_eq!(BuiltinFont::Helvetica.char_width('°'), 400);
        assert_eq!(BuiltinFont::HelveticaBold.char_width('ô'), 611);
    }

    #[test]
    fn test_unencodable_measures_as_question_mark() {
        let font = BuiltinFont::Helvetica;
        assert_eq!(font.char_width('ส'), font.char_width('?'));
    }

    #[test]
    fn test_text_width_points() {
        // "AV" = 667 + 667 units at 10pt
        let width = BuiltinFont::Helvetica.text_width_points("AV", 10.0);
        assert!((width - 13.34).abs() < 1e-4);
        assert_eq!(BuiltinFont::Helvetica.text_width_points("", 10.0), 0.0);
    }

    #[test]
    fn test_encode_text_hex() {
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("Ab"), "<4162>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("N°"), "<4EB0>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("€"), "<80>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex("ส"), "<3F>");
        assert_eq!(BuiltinFont::Helvetica.encode_text_hex(""), "<>");
    }

    #[test]
    fn test_base_font_names() {
        assert_eq!(BuiltinFont::Helvetica.base_font(), "Helvetica");
        assert_eq!(BuiltinFont::HelveticaBold.base_font(), "Helvetica-Bold");
    }
}
