//! Text measurement and wrapping

use crate::Result;

/// Font selection for measuring and drawing text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec<'a> {
    pub family: &'a str,
    pub bold: bool,
    pub size: f32,
}

impl<'a> FontSpec<'a> {
    pub fn regular(family: &'a str, size: f32) -> Self {
        Self {
            family,
            bold: false,
            size,
        }
    }

    pub fn bold(family: &'a str, size: f32) -> Self {
        Self {
            family,
            bold: true,
            size,
        }
    }
}

/// Measures rendered text width in points
pub trait TextMeasure {
    fn text_width(&self, font: &FontSpec<'_>, text: &str) -> Result<f64>;
}

/// Wrap text into lines no wider than `max_width`
///
/// Words are wrapped greedily at whitespace; a word wider than the column
/// is broken between characters. Explicit newlines start a new line. Empty
/// text yields one empty line. A single character wider than `max_width`
/// still gets a line of its own.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec<'_>,
    text: &str,
    max_width: f64,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure.text_width(font, &candidate)? <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure.text_width(font, word)? <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_word(measure, font, word, max_width)?;
                // The last piece stays open so following words can join it
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        lines.push(current);
    }

    Ok(lines)
}

/// Split a single word into pieces that each fit `max_width`
fn break_word<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec<'_>,
    word: &str,
    max_width: f64,
) -> Result<Vec<String>> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1 && measure.text_width(font, &current)? > max_width {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    Ok(pieces)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every character is 5 points wide
    pub(crate) struct FixedWidth;

    impl TextMeasure for FixedWidth {
        fn text_width(&self, _font: &FontSpec<'_>, text: &str) -> Result<f64> {
            Ok(text.chars().count() as f64 * 5.0)
        }
    }

    fn wrap(text: &str, max_width: f64) -> Vec<String> {
        wrap_text(&FixedWidth, &FontSpec::regular("test", 10.0), text, max_width).unwrap()
    }

    #[test]
    fn test_empty_text_is_one_line() {
        assert_eq!(wrap("", 50.0), vec![""]);
        assert_eq!(wrap("   ", 50.0), vec![""]);
    }

    #[test]
    fn test_short_text_fits() {
        assert_eq!(wrap("Hass", 50.0), vec!["Hass"]);
    }

    #[test]
    fn test_word_wrap() {
        // 10 chars per line
        assert_eq!(
            wrap("calibre 18 hors norme", 50.0),
            vec!["calibre 18", "hors norme"]
        );
    }

    #[test]
    fn test_long_word_is_broken() {
        assert_eq!(
            wrap("AV-240101-001-XYZ ok", 50.0),
            vec!["AV-240101-", "001-XYZ ok"]
        );
    }

    #[test]
    fn test_explicit_newlines() {
        assert_eq!(wrap("a\nb\n\nc", 50.0), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_lines_never_exceed_width() {
        let text = "Le lot présente des taches de lenticelles sur environ douze pour cent";
        for width in [20.0, 35.0, 50.0, 120.0] {
            for line in wrap(text, width) {
                assert!(line.chars().count() as f64 * 5.0 <= width, "{line:?} > {width}");
            }
        }
    }

    #[test]
    fn test_too_narrow_column_still_progresses() {
        assert_eq!(wrap("abc", 2.0), vec!["a", "b", "c"]);
    }
}
