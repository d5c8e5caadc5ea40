//! Document assembler
//!
//! Lays a prepared [`ReportDocument`] out on a [`Surface`]: the page header
//! block on every page, each section as a paginated table, the trailing
//! photo grid, and finally the `Page i / N` footers once the page total is
//! known.

use crate::cell::{draw_row, fit_centered, place_image, CellStyle};
use crate::config::{color, LayoutConfig};
use crate::filename::report_file_name;
use crate::flow::{FlowController, FlowState};
use crate::images::{ImageSource, NoImages};
use crate::measure::{wrap_text, FontSpec};
use crate::parser;
use crate::row::{column_widths, layout_cells, layout_header, layout_row, RowLayout, RowMetrics};
use crate::schema::{header_entries, Align, ColumnKind, ReportDocument, Section};
use crate::surface::{LayoutRecorder, Rect, Surface};
use crate::{ReportError, Result};
use pdf_core::{PageSize, PdfDocument, RasterImage};
use serde::Serialize;

/// Space between the logo and the header text
const LOGO_GAP: f64 = 8.0;
/// Space between the header text and the rule below it
const RULE_GAP: f64 = 4.0;
/// Title line height as a multiple of the title size
const TITLE_LEADING: f64 = 1.25;

/// Kind of a drawn table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Column header row (drawn again on every continuation page)
    Header,
    Data,
    /// Padding row of a fixed-slot section
    Blank,
    Summary,
}

/// Where a row (or a piece of a split row) was drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowPlacement {
    pub section: String,
    pub kind: RowKind,
    /// Row index within the section; blank rows continue after the data rows
    pub index: usize,
    pub page: usize,
    pub y: f64,
    pub height: f64,
    pub cell_widths: Vec<f64>,
}

/// Per-section result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub key: String,
    pub data_rows: usize,
    pub blank_rows: usize,
    /// Rows too tall for one page body, continued on the next page
    pub split_rows: usize,
    pub first_page: usize,
    pub last_page: usize,
}

/// What a layout pass produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderSummary {
    pub pages: usize,
    pub page_labels: Vec<String>,
    pub sections: Vec<SectionSummary>,
    /// Table and photo-grid images drawn
    pub images_placed: usize,
    /// Image references that could not be drawn, logo included
    pub images_failed: usize,
    pub placements: Vec<RowPlacement>,
}

impl RenderSummary {
    /// Data rows across all sections
    pub fn data_rows(&self) -> usize {
        self.sections.iter().map(|s| s.data_rows).sum()
    }
}

/// A finished PDF
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub summary: RenderSummary,
}

/// Renders reports with one layout configuration and image source
pub struct ReportRenderer {
    config: LayoutConfig,
    images: Box<dyn ImageSource>,
}

impl ReportRenderer {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            images: Box::new(NoImages),
        })
    }

    /// Resolve logos, photos and image cells through `images`
    pub fn with_images(mut self, images: impl ImageSource + 'static) -> Self {
        self.images = Box::new(images);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Page size for a report: configured orientation, then the report's
    pub fn page_size(&self, report: &ReportDocument) -> PageSize {
        let orientation = self
            .config
            .orientation
            .or(report.orientation)
            .unwrap_or_default();
        self.config.page_size(orientation)
    }

    /// Validate, lay out and serialize a report
    pub fn render(&self, report: ReportDocument) -> Result<RenderedReport> {
        let report = parser::prepare(report)?;
        let doc = PdfDocument::new(self.page_size(&report));
        self.render_prepared(&report, doc)
    }

    /// Like [`render`](Self::render) into a caller-provided document
    ///
    /// Used when the configured font family has been registered on `doc`.
    pub fn render_document(&self, report: ReportDocument, doc: PdfDocument) -> Result<RenderedReport> {
        let report = parser::prepare(report)?;
        self.render_prepared(&report, doc)
    }

    fn render_prepared(&self, report: &ReportDocument, mut doc: PdfDocument) -> Result<RenderedReport> {
        let summary = self.layout(report, &mut doc)?;
        let bytes = doc.to_bytes()?;
        let file_name = report_file_name(&report.template, &report.header);

        log::info!(
            "Rendered {file_name}: {} pages, {} rows, {} images ({} failed), {} bytes",
            summary.pages,
            summary.data_rows(),
            summary.images_placed,
            summary.images_failed,
            bytes.len()
        );

        Ok(RenderedReport {
            bytes,
            file_name,
            summary,
        })
    }

    /// Lay a report out without producing a PDF
    pub fn dry_run(&self, report: ReportDocument) -> Result<(RenderSummary, LayoutRecorder)> {
        let report = parser::prepare(report)?;
        let mut recorder = LayoutRecorder::new();
        let summary = self.layout(&report, &mut recorder)?;
        Ok((summary, recorder))
    }

    /// Lay out an already prepared report on any surface
    pub fn layout<S: Surface + ?Sized>(
        &self,
        report: &ReportDocument,
        surface: &mut S,
    ) -> Result<RenderSummary> {
        parser::validate(report)?;
        let mut pass = Pass::new(self, report, surface)?;
        pass.run()?;
        Ok(pass.summary)
    }
}

/// One text block of the header metadata grid
struct HeaderCell {
    x: f64,
    y: f64,
    lines: Vec<String>,
}

/// Page header geometry, computed once per render
struct HeaderBlock {
    title_lines: Vec<String>,
    cells: Vec<HeaderCell>,
    rule_y: f64,
    /// First y available to the body
    body_top: f64,
}

/// State of one layout run
struct Pass<'a, S: Surface + ?Sized> {
    renderer: &'a ReportRenderer,
    config: &'a LayoutConfig,
    report: &'a ReportDocument,
    surface: &'a mut S,
    page_size: PageSize,
    usable_width: f64,
    metrics: RowMetrics,
    regular: FontSpec<'a>,
    bold: FontSpec<'a>,
    heading: FontSpec<'a>,
    title: String,
    logo: Option<RasterImage>,
    header: HeaderBlock,
    flow: FlowController,
    pages: Vec<usize>,
    summary: RenderSummary,
}

impl<'a, S: Surface + ?Sized> Pass<'a, S> {
    fn new(
        renderer: &'a ReportRenderer,
        report: &'a ReportDocument,
        surface: &'a mut S,
    ) -> Result<Self> {
        let config = &renderer.config;
        let family = config.font_family.as_str();
        let page_size = renderer.page_size(report);
        let usable_width = config.usable_width(page_size);

        let mut summary = RenderSummary::default();
        let logo = match report.logo.as_deref() {
            Some(reference) => match renderer.images.load(reference) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Logo '{reference}' skipped: {e}");
                    summary.images_failed += 1;
                    None
                }
            },
            None => None,
        };

        let title = report
            .title
            .clone()
            .unwrap_or_else(|| report.template.clone());
        let header = Self::header_block(&*surface, config, report, &title, logo.is_some(), usable_width)?;

        let body_bottom = page_size.height - config.margins.bottom - config.footer_height;
        let flow = FlowController::new(header.body_top, body_bottom);
        if flow.capacity() <= 0.0 {
            return Err(ReportError::InvalidLayout(format!(
                "header block and footer leave no room for content ({:.1}pt header)",
                header.body_top - config.margins.top
            )));
        }

        Ok(Self {
            renderer,
            config,
            report,
            surface,
            page_size,
            usable_width,
            metrics: RowMetrics::from_config(config),
            regular: FontSpec::regular(family, config.font_size),
            bold: FontSpec::bold(family, config.font_size),
            heading: FontSpec::bold(family, config.font_size + 1.5),
            title,
            logo,
            header,
            flow,
            pages: Vec::new(),
            summary,
        })
    }

    /// Wrap the title and metadata grid and derive the body top
    fn header_block(
        measure: &S,
        config: &LayoutConfig,
        report: &ReportDocument,
        title: &str,
        has_logo: bool,
        usable_width: f64,
    ) -> Result<HeaderBlock> {
        let family = config.font_family.as_str();
        let top = config.margins.top;
        let left = config.margins.left;

        let logo_space = if has_logo {
            config.logo_width + LOGO_GAP
        } else {
            0.0
        };
        let text_width = (usable_width - logo_space).max(1.0);

        let title_font = FontSpec::bold(family, config.title_size);
        let title_lines = wrap_text(measure, &title_font, title, text_width)?;
        let mut y = top + title_lines.len() as f64 * config.title_size as f64 * TITLE_LEADING;

        let entries = header_entries(&report.header);
        let columns = config.header_columns;
        let column_width = text_width / columns as f64;
        let header_font = FontSpec::regular(family, config.header_font_size);
        let mut cells = Vec::with_capacity(entries.len());

        if !entries.is_empty() {
            y += RULE_GAP;
        }
        for chunk in entries.chunks(columns) {
            let mut tallest = 1;
            for (i, (label, value)) in chunk.iter().enumerate() {
                let text = format!("{label} : {value}");
                let lines = wrap_text(measure, &header_font, &text, (column_width - 6.0).max(1.0))?;
                tallest = tallest.max(lines.len());
                cells.push(HeaderCell {
                    x: left + i as f64 * column_width,
                    y,
                    lines,
                });
            }
            y += tallest as f64 * config.header_line_height;
        }

        if has_logo {
            y = y.max(top + config.logo_height);
        }
        let rule_y = y + RULE_GAP;

        Ok(HeaderBlock {
            title_lines,
            cells,
            rule_y,
            body_top: rule_y + config.border_width + config.section_gap,
        })
    }

    fn run(&mut self) -> Result<()> {
        let report = self.report;
        for section in &report.sections {
            self.section(section)?;
        }
        if !report.images.is_empty() {
            self.photo_grid()?;
        }
        if self.pages.is_empty() {
            self.new_page()?;
        }
        self.write_footers()
    }

    fn new_page(&mut self) -> Result<usize> {
        let page = self.surface.begin_page(self.page_size);
        self.pages.push(page);
        self.draw_page_header(page)?;
        self.flow.start_page(page);
        Ok(page)
    }

    fn draw_page_header(&mut self, page: usize) -> Result<()> {
        let config = self.config;
        let family = config.font_family.as_str();
        let left = config.margins.left;
        let top = config.margins.top;

        if let Some(logo) = &self.logo {
            let area = Rect::new(
                self.page_size.width - config.margins.right - config.logo_width,
                top,
                config.logo_width,
                config.logo_height,
            );
            let rect = fit_centered(logo.width, logo.height, area);
            if let Err(e) = self.surface.draw_image(page, logo, rect) {
                log::warn!("Logo not drawn on page {page}: {e}");
            }
        }

        let title_font = FontSpec::bold(family, config.title_size);
        let mut baseline = top + self.surface.ascent(&title_font)?;
        for line in &self.header.title_lines {
            self.surface.draw_text(
                page,
                line,
                left,
                baseline,
                &title_font,
                color(config.colors.title),
                Align::Left,
            )?;
            baseline += config.title_size as f64 * TITLE_LEADING;
        }

        let header_font = FontSpec::regular(family, config.header_font_size);
        let ascent = self.surface.ascent(&header_font)?;
        for cell in &self.header.cells {
            for (i, line) in cell.lines.iter().enumerate() {
                self.surface.draw_text(
                    page,
                    line,
                    cell.x,
                    cell.y + ascent + i as f64 * config.header_line_height,
                    &header_font,
                    color(config.colors.text),
                    Align::Left,
                )?;
            }
        }

        if config.border_width > 0.0 {
            let rule = Rect::new(left, self.header.rule_y, self.usable_width, config.border_width);
            self.surface.fill_rect(page, rule, color(config.colors.border))?;
        }

        Ok(())
    }

    /// Draw a section or photo-grid heading at the cursor
    fn heading(&mut self, text: &str, continued: bool) -> Result<()> {
        let config = self.config;
        let top = self.flow.advance(config.section_title_height);
        let text = if continued {
            format!("{text}{}", config.continued_suffix)
        } else {
            text.to_string()
        };
        let size = self.heading.size as f64;
        let baseline = top + (config.section_title_height - size).max(0.0) / 2.0
            + self.surface.ascent(&self.heading)?;
        self.surface.draw_text(
            self.flow.page(),
            &text,
            config.margins.left,
            baseline,
            &self.heading,
            color(config.colors.title),
            Align::Left,
        )
    }

    fn style(&self, font: FontSpec<'a>, fill: Option<[u8; 3]>) -> CellStyle<'a> {
        let config = self.config;
        CellStyle {
            font,
            text_color: color(config.colors.text),
            fill: fill.map(color),
            border_color: color(config.colors.border),
            border_width: config.border_width,
            padding: config.cell_padding,
            line_height: config.line_height,
        }
    }

    /// Section title (possibly continued) and column header row
    fn section_heading(&mut self, section: &Section, continued: bool, header: &RowLayout) -> Result<()> {
        self.heading(section.display_name(), continued)?;

        let y = self.flow.headers_drawn(header.height);
        let style = self.style(self.bold, Some(self.config.colors.header_fill));
        let page = self.flow.page();
        draw_row(
            &mut *self.surface,
            self.renderer.images.as_ref(),
            page,
            self.config.margins.left,
            y,
            header,
            &style,
        )?;
        self.record(section, RowKind::Header, 0, y, header);
        Ok(())
    }

    fn continue_section(&mut self, section: &Section, header: &RowLayout) -> Result<()> {
        self.new_page()?;
        self.section_heading(section, true, header)
    }

    fn record(&mut self, section: &Section, kind: RowKind, index: usize, y: f64, row: &RowLayout) {
        self.summary.placements.push(RowPlacement {
            section: section.key.clone(),
            kind,
            index,
            page: self.flow.page(),
            y,
            height: row.height,
            cell_widths: row.widths(),
        });
    }

    fn section(&mut self, section: &Section) -> Result<()> {
        let config = self.config;
        let widths = column_widths(&section.columns, self.usable_width);
        let header = layout_header(&*self.surface, &self.bold, &section.columns, &widths, &self.metrics)?;

        let mut smallest_row = self.metrics.height_for_lines(1);
        if section.columns.iter().any(|c| c.kind == ColumnKind::Image) {
            smallest_row = smallest_row.max(self.metrics.image_height + 2.0 * self.metrics.cell_padding);
        }
        let fixed = config.section_title_height + header.height;
        if fixed + smallest_row > self.flow.capacity() + 1e-6 {
            return Err(ReportError::InvalidLayout(format!(
                "section '{}': a page body of {:.1}pt cannot hold the title, column headers \
                 and one row ({:.1}pt)",
                section.key,
                self.flow.capacity(),
                fixed + smallest_row
            )));
        }

        let rows = self.section_rows(section, &widths)?;
        let blank_rows = rows.iter().filter(|(kind, _, _)| *kind == RowKind::Blank).count();

        let gap = if self.flow.state() == FlowState::AtTop {
            0.0
        } else {
            config.section_gap
        };
        let first = rows.first().map_or(0.0, |(_, _, row)| row.height);
        if !self.flow.fits(gap + fixed + first) && self.flow.state() != FlowState::AtTop {
            log::debug!("Section '{}' starts on a new page", section.key);
            self.new_page()?;
        } else {
            self.flow.advance(gap);
        }

        let mut summary = SectionSummary {
            key: section.key.clone(),
            data_rows: section.rows.len(),
            blank_rows,
            split_rows: 0,
            first_page: self.flow.page(),
            last_page: self.flow.page(),
        };

        self.section_heading(section, false, &header)?;
        for (kind, index, row) in rows {
            if self.place_row(section, &header, kind, index, row)? {
                summary.split_rows += 1;
            }
        }

        summary.last_page = self.flow.page();
        log::debug!(
            "Section '{}': {} rows on pages {}..={}",
            section.key,
            summary.data_rows,
            summary.first_page,
            summary.last_page
        );
        self.summary.sections.push(summary);
        Ok(())
    }

    /// Data rows, blank padding up to the slot count, then the summary row
    fn section_rows(&self, section: &Section, widths: &[f64]) -> Result<Vec<(RowKind, usize, RowLayout)>> {
        let measure = &*self.surface;
        let mut rows = Vec::with_capacity(section.rows.len());

        for (index, record) in section.rows.iter().enumerate() {
            let row = layout_row(measure, &self.regular, &section.columns, widths, record, &self.metrics)?;
            rows.push((RowKind::Data, index, row));
        }

        let blanks = section
            .slots
            .map_or(0, |slots| slots.saturating_sub(section.rows.len()));
        for i in 0..blanks {
            let empty = section.columns.iter().map(|_| "");
            let row = layout_cells(measure, &self.regular, &section.columns, widths, empty, &self.metrics)?;
            rows.push((RowKind::Blank, section.rows.len() + i, row));
        }

        if let Some(totals) = &section.summary {
            let row = layout_row(measure, &self.bold, &section.columns, widths, totals, &self.metrics)?;
            rows.push((RowKind::Summary, 0, row));
        }

        Ok(rows)
    }

    /// Place one row, breaking or splitting as needed
    ///
    /// Returns whether the row was split across pages.
    fn place_row(
        &mut self,
        section: &Section,
        header: &RowLayout,
        kind: RowKind,
        index: usize,
        row: RowLayout,
    ) -> Result<bool> {
        let mut pending = row;
        let mut split = false;

        loop {
            if self.flow.check(pending.height) != FlowState::NeedsBreak {
                self.draw_body_row(section, kind, index, &pending)?;
                return Ok(split);
            }

            if self.flow.rows_on_page() > 0 {
                log::debug!(
                    "Section '{}': page break before row {} (page {})",
                    section.key,
                    index,
                    self.flow.page()
                );
                self.continue_section(section, header)?;
                continue;
            }

            let max_lines = self.metrics.lines_fitting(self.flow.remaining());
            match pending.split(max_lines, &self.metrics) {
                Some((head, tail)) if max_lines > 0 => {
                    log::debug!(
                        "Section '{}': row {} split after {} lines on page {}",
                        section.key,
                        index,
                        max_lines,
                        self.flow.page()
                    );
                    self.draw_body_row(section, kind, index, &head)?;
                    self.continue_section(section, header)?;
                    pending = tail;
                    split = true;
                }
                _ => {
                    log::warn!(
                        "Section '{}': row {} is taller than the page body",
                        section.key,
                        index
                    );
                    self.draw_body_row(section, kind, index, &pending)?;
                    return Ok(split);
                }
            }
        }
    }

    fn draw_body_row(&mut self, section: &Section, kind: RowKind, index: usize, row: &RowLayout) -> Result<()> {
        let colors = self.config.colors;
        let style = match kind {
            RowKind::Summary => self.style(self.bold, Some(colors.header_fill)),
            _ if index % 2 == 1 => self.style(self.regular, Some(colors.shading)),
            _ => self.style(self.regular, None),
        };

        let y = self.flow.place_row(row.height);
        let page = self.flow.page();
        let counts = draw_row(
            &mut *self.surface,
            self.renderer.images.as_ref(),
            page,
            self.config.margins.left,
            y,
            row,
            &style,
        )?;
        self.summary.images_placed += counts.placed;
        self.summary.images_failed += counts.failed;
        self.record(section, kind, index, y, row);
        Ok(())
    }

    /// Trailing photos, laid out in a grid
    fn photo_grid(&mut self) -> Result<()> {
        let config = self.config;
        let grid = &config.images;
        let columns = grid.columns;
        let cell_width = (self.usable_width - grid.gap * (columns - 1) as f64) / columns as f64;
        let cell_height = grid.height + grid.caption_height;

        if cell_width <= 0.0 || config.section_title_height + cell_height > self.flow.capacity() + 1e-6 {
            return Err(ReportError::InvalidLayout(format!(
                "photo grid cells of {:.1}x{:.1}pt do not fit the page body",
                cell_width, cell_height
            )));
        }

        let gap = if self.flow.state() == FlowState::AtTop {
            0.0
        } else {
            config.section_gap
        };
        if !self.flow.fits(gap + config.section_title_height + cell_height) {
            self.new_page()?;
        } else {
            self.flow.advance(gap);
        }
        self.heading(&grid.title, false)?;
        self.flow.headers_drawn(0.0);

        let caption_font = FontSpec::regular(config.font_family.as_str(), config.footer_font_size);
        let report = self.report;

        for (row, chunk) in report.images.chunks(columns).enumerate() {
            let spacing = if row > 0 { grid.gap } else { 0.0 };
            if !self.flow.fits(spacing + cell_height) {
                log::debug!("Photo grid: page break before row {row}");
                self.new_page()?;
                self.heading(&grid.title, true)?;
                self.flow.headers_drawn(0.0);
            } else {
                self.flow.advance(spacing);
            }

            let y = self.flow.place_row(cell_height);
            let page = self.flow.page();

            for (i, entry) in chunk.iter().enumerate() {
                let x = config.margins.left + i as f64 * (cell_width + grid.gap);
                let frame = Rect::new(x, y, cell_width, grid.height);
                self.surface
                    .stroke_rect(page, frame, color(config.colors.border), config.border_width)?;

                let area = frame.inset(config.cell_padding);
                match place_image(&mut *self.surface, self.renderer.images.as_ref(), page, &entry.source, area) {
                    Ok(()) => self.summary.images_placed += 1,
                    Err(e) => {
                        log::warn!("Photo '{}' skipped on page {page}: {e}", entry.source);
                        self.summary.images_failed += 1;
                    }
                }

                // Captions are clipped to one line
                let caption = wrap_text(&*self.surface, &caption_font, &entry.caption, cell_width)?;
                if let Some(line) = caption.first() {
                    let baseline = y
                        + grid.height
                        + (grid.caption_height - caption_font.size as f64).max(0.0) / 2.0
                        + self.surface.ascent(&caption_font)?;
                    self.surface.draw_text(
                        page,
                        line,
                        x + cell_width / 2.0,
                        baseline,
                        &caption_font,
                        color(config.colors.text),
                        Align::Center,
                    )?;
                }
            }
        }

        Ok(())
    }

    /// `Page i / N` on the right and the title on the left of every page
    fn write_footers(&mut self) -> Result<()> {
        let config = self.config;
        let font = FontSpec::regular(config.font_family.as_str(), config.footer_font_size);
        let box_top = self.page_size.height - config.margins.bottom - config.footer_height;
        let baseline = box_top
            + (config.footer_height - font.size as f64).max(0.0) / 2.0
            + self.surface.ascent(&font)?;
        let total = self.pages.len();
        let footer_title = self.header.title_lines.first().cloned().unwrap_or_default();

        let pages = std::mem::take(&mut self.pages);
        for (i, page) in pages.iter().enumerate() {
            let label = format!("Page {} / {}", i + 1, total);
            self.surface.draw_text(
                *page,
                &footer_title,
                config.margins.left,
                baseline,
                &font,
                color(config.colors.text),
                Align::Left,
            )?;
            self.surface.draw_text(
                *page,
                &label,
                self.page_size.width - config.margins.right,
                baseline,
                &font,
                color(config.colors.text),
                Align::Right,
            )?;
            self.summary.page_labels.push(label);
        }

        self.summary.pages = total;
        self.pages = pages;
        Ok(())
    }
}
