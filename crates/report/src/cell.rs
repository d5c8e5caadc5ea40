//! Cell and row drawing

use crate::images::ImageSource;
use crate::measure::FontSpec;
use crate::row::{CellContent, CellLayout, RowLayout};
use crate::schema::Align;
use crate::surface::{Rect, Surface};
use crate::Result;
use pdf_core::{calculate_scaled_dimensions, Color, ImageScaleMode};

/// Visual style of a row of cells
#[derive(Debug, Clone, Copy)]
pub struct CellStyle<'a> {
    pub font: FontSpec<'a>,
    pub text_color: Color,
    pub fill: Option<Color>,
    pub border_color: Color,
    pub border_width: f64,
    pub padding: f64,
    pub line_height: f64,
}

/// What happened to the image of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    NoImage,
    Placed,
    Failed,
}

/// Draw one cell: fill, border, then content
///
/// Text lines start at the top inset; the first baseline sits one ascent
/// below it and each further line `line_height` lower. An image that cannot
/// be loaded or drawn is logged and the cell stays blank.
pub fn draw_cell<S, I>(
    surface: &mut S,
    images: &I,
    page: usize,
    rect: Rect,
    cell: &CellLayout,
    style: &CellStyle<'_>,
) -> Result<ImageOutcome>
where
    S: Surface + ?Sized,
    I: ImageSource + ?Sized,
{
    if let Some(fill) = style.fill {
        surface.fill_rect(page, rect, fill)?;
    }
    if style.border_width > 0.0 {
        surface.stroke_rect(page, rect, style.border_color, style.border_width)?;
    }

    match &cell.content {
        CellContent::Text(lines) => {
            draw_lines(surface, page, rect, lines, cell.align, style)?;
            Ok(ImageOutcome::NoImage)
        }
        CellContent::Image(reference) if reference.is_empty() => Ok(ImageOutcome::NoImage),
        CellContent::Image(reference) => {
            let area = rect.inset(style.padding);
            match place_image(surface, images, page, reference, area) {
                Ok(()) => Ok(ImageOutcome::Placed),
                Err(e) => {
                    log::warn!("Image '{reference}' skipped on page {page}: {e}");
                    Ok(ImageOutcome::Failed)
                }
            }
        }
    }
}

fn draw_lines<S: Surface + ?Sized>(
    surface: &mut S,
    page: usize,
    rect: Rect,
    lines: &[String],
    align: Align,
    style: &CellStyle<'_>,
) -> Result<()> {
    let ascent = surface.ascent(&style.font)?;
    let x = match align {
        Align::Left => rect.x + style.padding,
        Align::Center => rect.x + rect.width / 2.0,
        Align::Right => rect.right() - style.padding,
    };

    let mut baseline = rect.y + style.padding + ascent;
    for line in lines {
        surface.draw_text(page, line, x, baseline, &style.font, style.text_color, align)?;
        baseline += style.line_height;
    }
    Ok(())
}

/// Load an image and draw it centred in `area`, keeping its aspect ratio
pub fn place_image<S, I>(
    surface: &mut S,
    images: &I,
    page: usize,
    reference: &str,
    area: Rect,
) -> Result<()>
where
    S: Surface + ?Sized,
    I: ImageSource + ?Sized,
{
    let image = images.load(reference)?;
    surface.draw_image(page, &image, fit_centered(image.width, image.height, area))
}

/// Largest rectangle with the image's aspect ratio, centred in `area`
pub fn fit_centered(width: u32, height: u32, area: Rect) -> Rect {
    let (w, h) =
        calculate_scaled_dimensions(width, height, area.width, area.height, ImageScaleMode::FitBox);
    Rect::new(
        area.x + (area.width - w) / 2.0,
        area.y + (area.height - h) / 2.0,
        w,
        h,
    )
}

/// Image counts for one drawn row
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowImages {
    pub placed: usize,
    pub failed: usize,
}

/// Draw every cell of a row left to right starting at (`x`, `y`)
#[allow(clippy::too_many_arguments)]
pub fn draw_row<S, I>(
    surface: &mut S,
    images: &I,
    page: usize,
    x: f64,
    y: f64,
    row: &RowLayout,
    style: &CellStyle<'_>,
) -> Result<RowImages>
where
    S: Surface + ?Sized,
    I: ImageSource + ?Sized,
{
    let mut counts = RowImages::default();
    let mut left = x;

    for cell in &row.cells {
        let rect = Rect::new(left, y, cell.width, row.height);
        match draw_cell(surface, images, page, rect, cell, style)? {
            ImageOutcome::Placed => counts.placed += 1,
            ImageOutcome::Failed => counts.failed += 1,
            ImageOutcome::NoImage => {}
        }
        left += cell.width;
    }

    Ok(counts)
}
