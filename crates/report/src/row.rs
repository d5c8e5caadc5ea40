//! Column widths and row heights

use crate::config::LayoutConfig;
use crate::measure::{wrap_text, FontSpec, TextMeasure};
use crate::schema::{Align, Column, ColumnKind, RowRecord};
use crate::Result;

/// Vertical metrics shared by every row of a render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowMetrics {
    pub line_height: f64,
    pub cell_padding: f64,
    pub min_row_height: f64,
    pub image_height: f64,
}

impl RowMetrics {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            line_height: config.line_height,
            cell_padding: config.cell_padding,
            min_row_height: config.min_row_height,
            image_height: config.image_cell_height,
        }
    }

    /// Height of a row showing `lines` lines of text
    pub fn height_for_lines(&self, lines: usize) -> f64 {
        let text = lines.max(1) as f64 * self.line_height + 2.0 * self.cell_padding;
        text.max(self.min_row_height)
    }

    /// Most text lines that fit in `height`
    pub fn lines_fitting(&self, height: f64) -> usize {
        let usable = height - 2.0 * self.cell_padding;
        if usable < self.line_height {
            return 0;
        }
        (usable / self.line_height + 1e-9).floor() as usize
    }
}

/// Absolute column widths in points
///
/// Every column gets `fraction * usable_width` except the last, which takes
/// whatever remains so the widths add up to exactly `usable_width`.
pub fn column_widths(columns: &[Column], usable_width: f64) -> Vec<f64> {
    let mut widths: Vec<f64> = columns.iter().map(|c| c.width * usable_width).collect();
    if let Some(last) = widths.len().checked_sub(1) {
        let others: f64 = widths[..last].iter().sum();
        widths[last] = usable_width - others;
    }
    widths
}

/// Content of one laid-out cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(Vec<String>),
    /// Image reference, empty when the cell has no image
    Image(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub content: CellContent,
    pub width: f64,
    pub align: Align,
}

impl CellLayout {
    fn line_count(&self) -> usize {
        match &self.content {
            CellContent::Text(lines) => lines.len(),
            CellContent::Image(_) => 1,
        }
    }
}

/// A measured row ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub cells: Vec<CellLayout>,
    /// Largest wrapped line count across text cells
    pub line_count: usize,
    pub height: f64,
}

impl RowLayout {
    /// Cell widths in drawing order
    pub fn widths(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.width).collect()
    }

    /// Split after `max_lines` text lines
    ///
    /// The head keeps the first `max_lines` lines of every cell and all
    /// images; the tail gets the remaining lines. Returns `None` when the
    /// row already fits.
    pub fn split(&self, max_lines: usize, metrics: &RowMetrics) -> Option<(RowLayout, RowLayout)> {
        let max_lines = max_lines.max(1);
        if self.line_count <= max_lines {
            return None;
        }

        let mut head = Vec::with_capacity(self.cells.len());
        let mut tail = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let (first, rest) = match &cell.content {
                CellContent::Text(lines) => {
                    let cut = lines.len().min(max_lines);
                    let rest = if cut < lines.len() {
                        lines[cut..].to_vec()
                    } else {
                        vec![String::new()]
                    };
                    (CellContent::Text(lines[..cut].to_vec()), CellContent::Text(rest))
                }
                CellContent::Image(source) => (
                    CellContent::Image(source.clone()),
                    CellContent::Image(String::new()),
                ),
            };
            head.push(CellLayout {
                content: first,
                ..cell.clone()
            });
            tail.push(CellLayout {
                content: rest,
                ..cell.clone()
            });
        }

        Some((
            RowLayout::from_cells(head, metrics),
            RowLayout::from_cells(tail, metrics),
        ))
    }

    fn from_cells(cells: Vec<CellLayout>, metrics: &RowMetrics) -> Self {
        let line_count = cells
            .iter()
            .filter(|c| matches!(c.content, CellContent::Text(_)))
            .map(CellLayout::line_count)
            .max()
            .unwrap_or(1);
        let has_image = cells
            .iter()
            .any(|c| matches!(&c.content, CellContent::Image(s) if !s.is_empty()));

        let mut height = metrics.height_for_lines(line_count);
        if has_image {
            height = height.max(metrics.image_height + 2.0 * metrics.cell_padding);
        }

        Self {
            cells,
            line_count,
            height,
        }
    }
}

/// Measure one row: wrap every text cell to its column's inner width
///
/// `values` yields the text for each column in order.
pub fn layout_cells<'v, M, I>(
    measure: &M,
    font: &FontSpec<'_>,
    columns: &[Column],
    widths: &[f64],
    values: I,
    metrics: &RowMetrics,
) -> Result<RowLayout>
where
    M: TextMeasure + ?Sized,
    I: IntoIterator<Item = &'v str>,
{
    let mut cells = Vec::with_capacity(columns.len());

    for ((column, width), value) in columns.iter().zip(widths).zip(values) {
        let content = match column.kind {
            ColumnKind::Text => {
                let inner = (width - 2.0 * metrics.cell_padding).max(1.0);
                CellContent::Text(wrap_text(measure, font, value, inner)?)
            }
            ColumnKind::Image => CellContent::Image(value.trim().to_string()),
        };
        cells.push(CellLayout {
            content,
            width: *width,
            align: column.align,
        });
    }

    Ok(RowLayout::from_cells(cells, metrics))
}

/// Measure a data row
pub fn layout_row<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec<'_>,
    columns: &[Column],
    widths: &[f64],
    record: &RowRecord,
    metrics: &RowMetrics,
) -> Result<RowLayout> {
    let values = columns.iter().map(|c| record.get(&c.field));
    layout_cells(measure, font, columns, widths, values, metrics)
}

/// Measure the column header row (labels, never images)
pub fn layout_header<M: TextMeasure + ?Sized>(
    measure: &M,
    font: &FontSpec<'_>,
    columns: &[Column],
    widths: &[f64],
    metrics: &RowMetrics,
) -> Result<RowLayout> {
    let text_columns: Vec<Column> = columns
        .iter()
        .map(|c| Column {
            kind: ColumnKind::Text,
            align: Align::Center,
            ..c.clone()
        })
        .collect();
    let labels = columns.iter().map(|c| c.label.as_str());
    layout_cells(measure, font, &text_columns, widths, labels, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::tests::FixedWidth;
    use pretty_assertions::assert_eq;

    const METRICS: RowMetrics = RowMetrics {
        line_height: 10.0,
        cell_padding: 3.0,
        min_row_height: 16.0,
        image_height: 40.0,
    };

    fn font() -> FontSpec<'static> {
        FontSpec::regular("test", 10.0)
    }

    fn two_columns() -> Vec<Column> {
        vec![
            Column::new("n", "N°", 0.1, Align::Center),
            Column::new("value", "Value", 0.9, Align::Left),
        ]
    }

    #[test]
    fn test_height_formula() {
        assert_eq!(METRICS.height_for_lines(0), 16.0);
        assert_eq!(METRICS.height_for_lines(1), 16.0);
        assert_eq!(METRICS.height_for_lines(2), 26.0);
        assert_eq!(METRICS.height_for_lines(5), 56.0);
    }

    #[test]
    fn test_lines_fitting() {
        assert_eq!(METRICS.lines_fitting(56.0), 5);
        assert_eq!(METRICS.lines_fitting(55.9), 4);
        assert_eq!(METRICS.lines_fitting(10.0), 0);
    }

    #[test]
    fn test_column_widths_sum_exactly() {
        let columns = vec![
            Column::new("a", "A", 0.3333, Align::Left),
            Column::new("b", "B", 0.3333, Align::Left),
            Column::new("c", "C", 0.3334, Align::Left),
        ];
        let widths = column_widths(&columns, 539.28);
        assert_eq!(widths.iter().sum::<f64>(), 539.28);
    }

    #[test]
    fn test_missing_field_renders_empty() {
        let widths = column_widths(&two_columns(), 200.0);
        let row = layout_row(&FixedWidth, &font(), &two_columns(), &widths, &RowRecord::new(), &METRICS)
            .unwrap();

        assert_eq!(row.line_count, 1);
        assert_eq!(row.height, 16.0);
        assert_eq!(row.cells[0].content, CellContent::Text(vec![String::new()]));
    }

    #[test]
    fn test_tallest_cell_sets_height() {
        let widths = column_widths(&two_columns(), 200.0);
        let record: RowRecord = [("n", "1"), ("value", &"x".repeat(150) as &str)]
            .into_iter()
            .collect();
        // Inner width 174 fits 34 characters -> 5 lines
        let row = layout_row(&FixedWidth, &font(), &two_columns(), &widths, &record, &METRICS).unwrap();
        assert_eq!(row.line_count, 5);
        assert_eq!(row.height, 56.0);
    }

    #[test]
    fn test_image_cell_height() {
        let columns = vec![
            Column::new("n", "N°", 0.5, Align::Left),
            Column::image("photo", "Photo", 0.5),
        ];
        let widths = column_widths(&columns, 200.0);
        let record: RowRecord = [("n", "1"), ("photo", "lot.png")].into_iter().collect();
        let row = layout_row(&FixedWidth, &font(), &columns, &widths, &record, &METRICS).unwrap();
        assert_eq!(row.height, 46.0);

        let empty = layout_row(&FixedWidth, &font(), &columns, &widths, &RowRecord::new(), &METRICS)
            .unwrap();
        assert_eq!(empty.height, 16.0);
    }

    #[test]
    fn test_split_row() {
        let widths = column_widths(&two_columns(), 200.0);
        let record: RowRecord = [("n", "7"), ("value", &"y".repeat(150) as &str)]
            .into_iter()
            .collect();
        let row = layout_row(&FixedWidth, &font(), &two_columns(), &widths, &record, &METRICS).unwrap();

        let (head, tail) = row.split(3, &METRICS).unwrap();
        assert_eq!(head.line_count, 3);
        assert_eq!(tail.line_count, 2);
        assert_eq!(head.cells[0].content, CellContent::Text(vec!["7".to_string()]));
        assert_eq!(tail.cells[0].content, CellContent::Text(vec![String::new()]));
        assert_eq!(head.widths(), row.widths());
        assert!(row.split(5, &METRICS).is_none());
    }

    #[test]
    fn test_header_row_is_text() {
        let columns = vec![
            Column::new("n", "N°", 0.5, Align::Right),
            Column::image("photo", "Photo", 0.5),
        ];
        let widths = column_widths(&columns, 200.0);
        let header = layout_header(&FixedWidth, &font(), &columns, &widths, &METRICS).unwrap();
        assert_eq!(header.cells[1].content, CellContent::Text(vec!["Photo".to_string()]));
        assert_eq!(header.cells[0].align, Align::Center);
    }
}
