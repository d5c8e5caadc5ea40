//! Drawing surfaces
//!
//! The assembler draws through [`Surface`] so the same layout pass can
//! produce a PDF ([`PdfDocument`]) or a list of recorded operations
//! ([`LayoutRecorder`]) for dry runs and tests.

use crate::measure::{FontSpec, TextMeasure};
use crate::schema::Align;
use crate::Result;
use pdf_core::{BuiltinFont, Color, FontWeight, ImageScaleMode, PageSize, PdfDocument, RasterImage};

/// Rectangle in points, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }
}

impl From<Align> for pdf_core::Align {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => pdf_core::Align::Left,
            Align::Center => pdf_core::Align::Center,
            Align::Right => pdf_core::Align::Right,
        }
    }
}

/// Page-oriented drawing target
///
/// Pages are 1-indexed. `x` for text is the anchor the alignment refers to:
/// the left edge, the centre or the right edge of the text.
pub trait Surface: TextMeasure {
    /// Append a page and return its number
    fn begin_page(&mut self, size: PageSize) -> usize;

    fn page_count(&self) -> usize;

    fn fill_rect(&mut self, page: usize, rect: Rect, color: Color) -> Result<()>;

    fn stroke_rect(&mut self, page: usize, rect: Rect, color: Color, line_width: f64)
        -> Result<()>;

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        baseline: f64,
        font: &FontSpec<'_>,
        color: Color,
        align: Align,
    ) -> Result<()>;

    /// Draw pixels stretched to `rect`
    fn draw_image(&mut self, page: usize, image: &RasterImage, rect: Rect) -> Result<()>;

    /// Distance from the top of a line to its baseline
    fn ascent(&self, font: &FontSpec<'_>) -> Result<f64>;
}

fn weight(font: &FontSpec<'_>) -> FontWeight {
    if font.bold {
        FontWeight::Bold
    } else {
        FontWeight::Regular
    }
}

impl TextMeasure for PdfDocument {
    fn text_width(&self, font: &FontSpec<'_>, text: &str) -> Result<f64> {
        Ok(self.measure_text(font.family, weight(font), font.size, text)?)
    }
}

impl Surface for PdfDocument {
    fn begin_page(&mut self, size: PageSize) -> usize {
        self.add_page_with_size(size)
    }

    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn fill_rect(&mut self, page: usize, rect: Rect, color: Color) -> Result<()> {
        PdfDocument::fill_rect(self, page, rect.x, rect.y, rect.width, rect.height, color)?;
        Ok(())
    }

    fn stroke_rect(
        &mut self,
        page: usize,
        rect: Rect,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        PdfDocument::stroke_rect(
            self,
            page,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            color,
            line_width,
        )?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        baseline: f64,
        font: &FontSpec<'_>,
        color: Color,
        align: Align,
    ) -> Result<()> {
        self.set_font(font.family, font.size)?;
        self.set_font_weight(weight(font));
        self.set_text_color(color);
        self.insert_text(text, page, x, baseline, align.into())?;
        Ok(())
    }

    fn draw_image(&mut self, page: usize, image: &RasterImage, rect: Rect) -> Result<()> {
        self.insert_raster(
            image,
            page,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            ImageScaleMode::Stretch,
        )?;
        Ok(())
    }

    fn ascent(&self, font: &FontSpec<'_>) -> Result<f64> {
        Ok(PdfDocument::ascent(self, font.family, weight(font), font.size)?)
    }
}

/// A drawing call captured by [`LayoutRecorder`]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Page {
        page: usize,
        size: PageSize,
    },
    Fill {
        page: usize,
        rect: Rect,
    },
    Stroke {
        page: usize,
        rect: Rect,
    },
    Text {
        page: usize,
        text: String,
        x: f64,
        baseline: f64,
        bold: bool,
        align: Align,
    },
    Image {
        page: usize,
        rect: Rect,
        pixels: (u32, u32),
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Page { page, .. }
            | DrawOp::Fill { page, .. }
            | DrawOp::Stroke { page, .. }
            | DrawOp::Text { page, .. }
            | DrawOp::Image { page, .. } => *page,
        }
    }
}

/// Surface that records drawing calls instead of producing a PDF
///
/// Text is measured with Helvetica metrics whatever family is requested.
#[derive(Debug, Default)]
pub struct LayoutRecorder {
    pages: Vec<PageSize>,
    ops: Vec<DrawOp>,
}

impl LayoutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text drawn on a page, in drawing order
    pub fn texts_on_page(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page: p, text, .. } if *p == page => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(pdf_core::PdfError::InvalidPage(page, self.pages.len()).into());
        }
        Ok(())
    }

    fn builtin(font: &FontSpec<'_>) -> BuiltinFont {
        if font.bold {
            BuiltinFont::HelveticaBold
        } else {
            BuiltinFont::Helvetica
        }
    }
}

impl TextMeasure for LayoutRecorder {
    fn text_width(&self, font: &FontSpec<'_>, text: &str) -> Result<f64> {
        Ok(Self::builtin(font).text_width_points(text, font.size) as f64)
    }
}

impl Surface for LayoutRecorder {
    fn begin_page(&mut self, size: PageSize) -> usize {
        self.pages.push(size);
        let page = self.pages.len();
        self.ops.push(DrawOp::Page { page, size });
        page
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn fill_rect(&mut self, page: usize, rect: Rect, _color: Color) -> Result<()> {
        self.check_page(page)?;
        self.ops.push(DrawOp::Fill { page, rect });
        Ok(())
    }

    fn stroke_rect(
        &mut self,
        page: usize,
        rect: Rect,
        _color: Color,
        _line_width: f64,
    ) -> Result<()> {
        self.check_page(page)?;
        self.ops.push(DrawOp::Stroke { page, rect });
        Ok(())
    }

    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        x: f64,
        baseline: f64,
        font: &FontSpec<'_>,
        _color: Color,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;
        if text.is_empty() {
            return Ok(());
        }
        self.ops.push(DrawOp::Text {
            page,
            text: text.to_string(),
            x,
            baseline,
            bold: font.bold,
            align,
        });
        Ok(())
    }

    fn draw_image(&mut self, page: usize, image: &RasterImage, rect: Rect) -> Result<()> {
        self.check_page(page)?;
        self.ops.push(DrawOp::Image {
            page,
            rect,
            pixels: (image.width, image.height),
        });
        Ok(())
    }

    fn ascent(&self, font: &FontSpec<'_>) -> Result<f64> {
        Ok(Self::builtin(font).ascender() as f64 / 1000.0 * font.size as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rect_inset() {
        let rect = Rect::new(10.0, 20.0, 100.0, 16.0).inset(3.0);
        assert_eq!(rect, Rect::new(13.0, 23.0, 94.0, 10.0));
        assert_eq!(Rect::new(0.0, 0.0, 4.0, 4.0).inset(3.0).width, 0.0);
    }

    #[test]
    fn test_recorder_pages_and_text() {
        let mut recorder = LayoutRecorder::new();
        let page = recorder.begin_page(PageSize::A4);
        let font = FontSpec::bold("helvetica", 10.0);

        recorder
            .draw_text(page, "Lot", 10.0, 20.0, &font, Color::black(), Align::Left)
            .unwrap();
        recorder
            .draw_text(page, "", 10.0, 30.0, &font, Color::black(), Align::Left)
            .unwrap();

        assert_eq!(recorder.page_count(), 1);
        assert_eq!(recorder.texts_on_page(1), vec!["Lot"]);
        assert!(recorder
            .fill_rect(2, Rect::new(0.0, 0.0, 1.0, 1.0), Color::white())
            .is_err());
    }

    #[test]
    fn test_recorder_matches_pdf_metrics() {
        let recorder = LayoutRecorder::new();
        let doc = PdfDocument::default();
        let font = FontSpec::regular("helvetica", 8.5);

        let text = "Poids net (kg)";
        assert_eq!(
            recorder.text_width(&font, text).unwrap(),
            doc.text_width(&font, text).unwrap()
        );
        assert_eq!(
            Surface::ascent(&recorder, &font).unwrap(),
            Surface::ascent(&doc, &font).unwrap()
        );
    }
}
