//! Layout configuration
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration.

use crate::schema::Orientation;
use crate::{ReportError, Result};
use pdf_core::{Color, PageSize, BUILTIN_FAMILY};
use serde::{Deserialize, Serialize};

/// Page margins in points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 36.0,
            bottom: 36.0,
            left: 28.0,
            right: 28.0,
        }
    }
}

/// Colours as 0-255 RGB triples
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Palette {
    pub text: [u8; 3],
    pub title: [u8; 3],
    pub border: [u8; 3],
    /// Background of alternate data rows
    pub shading: [u8; 3],
    /// Background of column header and summary rows
    pub header_fill: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: [0, 0, 0],
            title: [0, 97, 0],
            border: [64, 64, 64],
            shading: [242, 242, 242],
            header_fill: [217, 234, 211],
        }
    }
}

pub(crate) fn color(rgb: [u8; 3]) -> Color {
    Color::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Geometry of the trailing photo grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageGrid {
    pub title: String,
    pub columns: usize,
    pub height: f64,
    pub caption_height: f64,
    pub gap: f64,
}

impl Default for ImageGrid {
    fn default() -> Self {
        Self {
            title: "Photos".to_string(),
            columns: 2,
            height: 160.0,
            caption_height: 14.0,
            gap: 8.0,
        }
    }
}

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Portrait page size; landscape swaps the sides
    pub page_width: f64,
    pub page_height: f64,
    /// Forces an orientation over the template default
    pub orientation: Option<Orientation>,
    pub margins: Margins,

    pub font_family: String,
    pub font_size: f32,
    pub title_size: f32,
    pub header_font_size: f32,
    pub footer_font_size: f32,

    pub line_height: f64,
    pub cell_padding: f64,
    pub min_row_height: f64,
    pub border_width: f64,

    pub section_title_height: f64,
    pub section_gap: f64,
    /// Appended to a section title repeated after a page break
    pub continued_suffix: String,

    /// Height reserved at the bottom of every page for the page label
    pub footer_height: f64,
    /// Columns of the metadata grid in the header block
    pub header_columns: usize,
    pub header_line_height: f64,
    pub logo_width: f64,
    pub logo_height: f64,

    /// Height of an image inside a table cell
    pub image_cell_height: f64,
    pub images: ImageGrid,

    pub colors: Palette,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: PageSize::A4.width,
            page_height: PageSize::A4.height,
            orientation: None,
            margins: Margins::default(),
            font_family: BUILTIN_FAMILY.to_string(),
            font_size: 8.5,
            title_size: 14.0,
            header_font_size: 8.5,
            footer_font_size: 7.5,
            line_height: 10.5,
            cell_padding: 3.0,
            min_row_height: 16.0,
            border_width: 0.5,
            section_title_height: 16.0,
            section_gap: 10.0,
            continued_suffix: " (suite)".to_string(),
            footer_height: 14.0,
            header_columns: 2,
            header_line_height: 11.0,
            logo_width: 90.0,
            logo_height: 40.0,
            image_cell_height: 40.0,
            images: ImageGrid::default(),
            colors: Palette::default(),
        }
    }
}

impl LayoutConfig {
    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReportError::InvalidLayout(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Page size for an orientation
    pub fn page_size(&self, orientation: Orientation) -> PageSize {
        let portrait = PageSize {
            width: self.page_width,
            height: self.page_height,
        };
        match orientation {
            Orientation::Portrait => portrait,
            Orientation::Landscape => portrait.landscape(),
        }
    }

    /// Width between the side margins
    pub fn usable_width(&self, page: PageSize) -> f64 {
        page.width - self.margins.left - self.margins.right
    }

    /// Reject values that cannot produce a layout
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ReportError::InvalidLayout(msg.to_string()));

        let positive = [
            self.page_width,
            self.page_height,
            self.line_height,
            self.min_row_height,
            self.header_line_height,
            self.image_cell_height,
            self.images.height,
        ];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return invalid("page size, line heights, row and image heights must be > 0");
        }
        if [self.font_size, self.title_size, self.header_font_size, self.footer_font_size]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return invalid("font sizes must be > 0");
        }
        let margins = [
            self.margins.top,
            self.margins.bottom,
            self.margins.left,
            self.margins.right,
            self.cell_padding,
            self.border_width,
            self.section_gap,
            self.section_title_height,
            self.footer_height,
        ];
        if margins.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return invalid("margins, padding and spacing must not be negative");
        }
        if self.header_columns == 0 || self.images.columns == 0 {
            return invalid("header and image grid need at least one column");
        }

        let narrowest = self.page_width.min(self.page_height);
        if narrowest - self.margins.left - self.margins.right <= 2.0 * self.cell_padding {
            return invalid("side margins leave no usable width");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(LayoutConfig::from_json("{}").unwrap(), LayoutConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            LayoutConfig::from_json(r#"{"min_row_height": 20, "margins": {"top": 50}}"#).unwrap();
        assert_eq!(config.min_row_height, 20.0);
        assert_eq!(config.margins.top, 50.0);
        assert_eq!(config.margins.left, 28.0);
        assert_eq!(config.font_size, 8.5);
    }

    #[test]
    fn test_landscape_page() {
        let config = LayoutConfig::default();
        let page = config.page_size(Orientation::Landscape);
        assert!(page.width > page.height);
        assert!((config.usable_width(page) - (page.width - 56.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            LayoutConfig::from_json(r#"{"line_height": 0}"#),
            Err(ReportError::InvalidLayout(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json(r#"{"margins": {"left": 400, "right": 400}}"#),
            Err(ReportError::InvalidLayout(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json(r#"{"font_size": "big"}"#),
            Err(ReportError::InvalidLayout(_))
        ));
    }
}
