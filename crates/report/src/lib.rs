//! Report Engine - paginated tabular PDF reports
//!
//! This crate provides:
//! - Report JSON schema types and validation
//! - Built-in templates (quality control, waste tracking, packing list, invoice)
//! - Text wrapping and row-height calculation
//! - A flow controller that paginates tables with repeated headers
//! - A document assembler producing PDF bytes and a suggested file name
//!
//! # Example
//!
//! ```ignore
//! use report::{parse_report, LayoutConfig, ReportRenderer};
//!
//! let report = parse_report(json)?;
//! let renderer = ReportRenderer::new(LayoutConfig::default())?;
//! let rendered = renderer.render(report)?;
//! std::fs::write(&rendered.file_name, &rendered.bytes)?;
//! ```

pub mod assembler;
pub mod cell;
pub mod config;
pub mod filename;
pub mod flow;
pub mod images;
pub mod measure;
pub mod parser;
pub mod row;
mod schema;
pub mod surface;
pub mod templates;

pub use assembler::{
    RenderSummary, RenderedReport, ReportRenderer, RowKind, RowPlacement, SectionSummary,
};
pub use config::LayoutConfig;
pub use filename::report_file_name;
pub use flow::{FlowController, FlowState};
pub use images::{FileImageSource, ImageSource, MemoryImageSource, NoImages};
pub use measure::{wrap_text, FontSpec, TextMeasure};
pub use parser::{parse_report, prepare};
pub use schema::*;
pub use surface::{DrawOp, LayoutRecorder, Rect, Surface};

use thiserror::Error;

/// Errors that can occur while preparing or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to parse report: {0}")]
    ParseError(String),

    #[error("Invalid columns in section '{section}': {reason}")]
    InvalidColumns { section: String, reason: String },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Section '{section}' has {rows} rows but only {slots} slots")]
    TooManyRows {
        section: String,
        rows: usize,
        slots: usize,
    },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Short message for the person who asked for the document
    ///
    /// The `Display` text carries the detail for the operator log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::ParseError(_) | ReportError::Json(_) => {
                "The report data could not be read."
            }
            ReportError::InvalidColumns { .. } => "The report columns are not set up correctly.",
            ReportError::InvalidLayout(_) => "The page layout settings cannot fit this report.",
            ReportError::TooManyRows { .. } => "Too many rows for this template.",
            ReportError::UnknownTemplate(_) => "This report template does not exist.",
            ReportError::ImageError(_)
            | ReportError::Pdf(_)
            | ReportError::Io(_) => "PDF generation failed.",
        }
    }
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Parse, validate and render a JSON report with the default layout
pub fn render_json(json: &str) -> Result<RenderedReport> {
    let report = parse_report(json)?;
    ReportRenderer::new(LayoutConfig::default())?.render(report)
}
