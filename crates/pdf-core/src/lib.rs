//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating PDF documents page by page
//! - Built-in Helvetica fonts and embedded TrueType font families
//! - Inserting text, rectangles and lines at specific coordinates
//! - Inserting images (JPEG, PNG, decoded RGB pixels)
//! - Measuring text for layout
//!
//! All drawing coordinates are in points with the origin at the top-left
//! corner of the page; conversion to PDF's bottom-left origin happens here.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new(PageSize::A4);
//! let page = doc.add_page();
//! doc.set_font("helvetica", 12.0)?;
//! doc.insert_text("Hello, World!", page, 50.0, 60.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod builtin;
mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use builtin::BuiltinFont;
pub use document::{Color, PageSize, PdfDocument, BUILTIN_FAMILY};
pub use font::{FontData, FontFamily, FontFamilyBuilder, FontWeight};
pub use image::{calculate_scaled_dimensions, ImageScaleMode, RasterImage};
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
