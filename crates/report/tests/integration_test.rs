//! Integration tests for the report engine

use pretty_assertions::assert_eq;
use report::{
    parse_report, Align, Column, DrawOp, FontSpec, ImageEntry, LayoutConfig, LayoutRecorder,
    MemoryImageSource, OverflowPolicy, RenderSummary, ReportDocument, ReportError,
    ReportRenderer, RowKind, RowRecord, Section, TextMeasure,
};
use std::collections::BTreeSet;

fn renderer() -> ReportRenderer {
    ReportRenderer::new(LayoutConfig::default()).unwrap()
}

/// Header `{lotNumber}` and columns `[("N°", 10%), ("Value", 90%)]`
fn lot_report(rows: usize) -> ReportDocument {
    let mut report = ReportDocument::new("lot-sheet");
    report.header.insert("lotNumber", "AV-240101-001");

    let mut section = Section::new("values");
    section.columns = vec![
        Column::new("n", "N°", 0.1, Align::Center),
        Column::new("value", "Value", 0.9, Align::Left),
    ];
    section.rows = (1..=rows)
        .map(|i| row(&[("n", &i.to_string()), ("value", "ok")]))
        .collect();
    report.sections.push(section);
    report
}

fn row(pairs: &[(&str, &str)]) -> RowRecord {
    pairs.iter().copied().collect()
}

/// Distinct data rows drawn per section
fn drawn_rows(summary: &RenderSummary, section: &str) -> usize {
    summary
        .placements
        .iter()
        .filter(|p| p.kind == RowKind::Data && p.section == section)
        .map(|p| p.index)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Hex form of a built-in font text operand
fn hex(text: &str) -> String {
    let body: String = text.chars().map(|c| format!("{:02X}", c as u32)).collect();
    format!("<{body}> Tj")
}

fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(*id).unwrap()).into_owned())
        .collect()
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_fn(width, height, |x, _| image::Rgb([x as u8, 120, 40]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_every_row_is_rendered() {
    for rows in [0, 1, 39, 40, 41, 80, 137] {
        let (summary, _) = renderer().dry_run(lot_report(rows)).unwrap();
        assert_eq!(drawn_rows(&summary, "values"), rows, "{rows} rows");
        assert_eq!(summary.data_rows(), rows);
    }
}

#[test]
fn test_drawn_widths_match_usable_width() {
    let config = LayoutConfig::default();
    let usable = config.usable_width(config.page_size(Default::default()));

    let mut report = lot_report(60);
    report.sections[0].summary = Some(row(&[("value", "Total")]));
    let (summary, _) = renderer().dry_run(report).unwrap();

    assert!(!summary.placements.is_empty());
    for placement in &summary.placements {
        let total: f64 = placement.cell_widths.iter().sum();
        assert!((total - usable).abs() < 1e-9, "{placement:?}");
    }
}

#[test]
fn test_page_labels_are_monotonic() {
    let json = r#"{
        "template": "quality-control",
        "header": { "lotNumber": "AV-1" },
        "sections": [
            { "key": "weight", "rows": [] },
            { "key": "quality", "rows": [] }
        ],
        "images": [
            { "source": "a.png" }, { "source": "b.png" }, { "source": "c.png" },
            { "source": "d.png" }, { "source": "e.png" }, { "source": "f.png" },
            { "source": "g.png" }, { "source": "h.png" }, { "source": "i.png" }
        ]
    }"#;
    let mut report = parse_report(json).unwrap();
    report.sections[0].rows = (0..50).map(|i| row(&[("n", &i.to_string())])).collect();
    report.sections[1].rows = (0..50).map(|i| row(&[("n", &i.to_string())])).collect();

    let (summary, _) = renderer().dry_run(report).unwrap();
    assert!(summary.pages >= 4);

    let expected: Vec<String> = (1..=summary.pages)
        .map(|i| format!("Page {i} / {}", summary.pages))
        .collect();
    assert_eq!(summary.page_labels, expected);
}

#[test]
fn test_rendering_is_byte_identical() {
    let mut report = lot_report(70);
    report.header.insert("date", "2024-01-01");

    let first = renderer().render(report.clone()).unwrap();
    let second = renderer().render(report).unwrap();
    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.file_name, second.file_name);
}

#[test]
fn test_wrapped_text_stays_inside_its_column() {
    let long = "Présence de lenticelles et de taches brunes sur l'épiderme, fermeté correcte, \
                calibre homogène, aucune trace de pourriture pédonculaire observée sur l'échantillon"
        .repeat(3);
    let mut report = lot_report(3);
    report.sections[0].rows[1] = row(&[("n", "2"), ("value", &long)]);

    let config = LayoutConfig::default();
    let usable = config.usable_width(config.page_size(Default::default()));
    let value_left = config.margins.left + 0.1 * usable;
    let value_right = config.margins.left + usable;
    let (summary, recorder) = renderer().dry_run(report).unwrap();

    let font = FontSpec::regular("helvetica", config.font_size);
    let mut lines = 0;
    for op in recorder.ops() {
        if let DrawOp::Text { text, x, bold: false, .. } = op {
            if (*x - (value_left + config.cell_padding)).abs() < 1e-9 {
                let width = recorder.text_width(&font, text).unwrap();
                assert!(x + width <= value_right - config.cell_padding + 1e-9, "{text:?}");
                lines += 1;
            }
        }
    }
    assert!(lines > 3);

    let heights: Vec<f64> = summary
        .placements
        .iter()
        .filter(|p| p.kind == RowKind::Data)
        .map(|p| p.height)
        .collect();
    assert!(heights[1] > heights[0]);
}

#[test]
fn test_thirty_rows_scenario() {
    let config = LayoutConfig {
        min_row_height: 30.0,
        ..LayoutConfig::default()
    };
    let renderer = ReportRenderer::new(config).unwrap();

    let (probe, _) = renderer.dry_run(lot_report(200)).unwrap();
    let rows_per_page = probe
        .placements
        .iter()
        .filter(|p| p.kind == RowKind::Data && p.page == 1)
        .count();
    assert!(rows_per_page > 0 && rows_per_page < 30);

    let rendered = renderer.render(lot_report(30)).unwrap();
    let expected_pages = 30_usize.div_ceil(rows_per_page);
    assert_eq!(rendered.summary.pages, expected_pages);
    assert_eq!(rendered.file_name, "lot_sheet_AV-240101-001.pdf");

    let pages = page_contents(&rendered.bytes);
    assert_eq!(pages.len(), expected_pages);
    for content in &pages {
        assert!(content.contains(&hex("N° de lot : AV-240101-001")));
        assert!(content.contains(&hex("Value")));
    }
    let last = format!("Page {expected_pages} / {expected_pages}");
    assert!(pages[expected_pages - 1].contains(&hex(&last)));
}

#[test]
fn test_tall_row_keeps_neighbours_at_minimum() {
    let mut report = lot_report(5);
    report.sections[0].rows[2] = row(&[("n", "3"), ("value", "un\ndeux\ntrois\nquatre\ncinq")]);

    let config = LayoutConfig::default();
    let one_line = (config.line_height + 2.0 * config.cell_padding).max(config.min_row_height);
    let five_lines = 5.0 * config.line_height + 2.0 * config.cell_padding;

    let (summary, _) = renderer().dry_run(report).unwrap();
    let heights: Vec<f64> = summary
        .placements
        .iter()
        .filter(|p| p.kind == RowKind::Data)
        .map(|p| p.height)
        .collect();

    assert_eq!(heights, vec![one_line, one_line, five_lines, one_line, one_line]);
}

#[test]
fn test_row_taller_than_a_page_is_split() {
    let text = (1..=200).map(|i| format!("ligne {i}")).collect::<Vec<_>>().join("\n");
    let mut report = lot_report(3);
    report.sections[0].rows[0] = row(&[("n", "1"), ("value", &text)]);

    let (summary, recorder) = renderer().dry_run(report).unwrap();
    let section = &summary.sections[0];

    assert_eq!(section.split_rows, 1);
    assert_eq!(drawn_rows(&summary, "values"), 3);
    assert!(summary.pages >= 3);
    for page in 1..=summary.pages {
        let texts = recorder.texts_on_page(page);
        assert!(texts.iter().any(|t| t.starts_with("ligne")), "page {page}");
    }
    assert!(recorder.texts_on_page(summary.pages).contains(&"ligne 200"));
}

#[test]
fn test_sections_share_a_page() {
    let json = r#"{
        "template": "quality-control",
        "header": { "date": "2024-01-15", "product": "Avocat", "variety": "Hass" },
        "sections": [
            { "key": "weight", "rows": [ { "n": 1, "pallet": "P-01", "netWeight": 1040.5 } ] },
            { "key": "quality", "rows": [ { "n": 1, "defect": "Lenticelles", "rate": 2.5 } ] }
        ]
    }"#;
    let (summary, recorder) = renderer().dry_run(parse_report(json).unwrap()).unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.sections[1].first_page, 1);
    let texts = recorder.texts_on_page(1);
    assert!(texts.contains(&"I. Contrôle du poids"));
    assert!(texts.contains(&"II. Contrôle qualité"));
    assert!(texts.contains(&"1040.5"));
}

#[test]
fn test_waste_sheet_pads_blank_rows() {
    let mut report = ReportDocument::new("waste-tracking");
    let mut section = Section::new("waste");
    section.rows = (1..=10).map(|i| row(&[("n", &i.to_string())])).collect();
    report.sections.push(section);

    let (summary, _) = renderer().dry_run(report).unwrap();
    let waste = &summary.sections[0];
    assert_eq!(waste.data_rows, 10);
    assert_eq!(waste.blank_rows, 16);
    assert_eq!(
        summary.placements.iter().filter(|p| p.kind == RowKind::Blank).count(),
        16
    );
}

#[test]
fn test_waste_sheet_overflow() {
    let build = |policy: Option<OverflowPolicy>| {
        let mut report = ReportDocument::new("waste-tracking");
        let mut section = Section::new("waste");
        section.rows = (1..=40).map(|i| row(&[("n", &i.to_string())])).collect();
        section.overflow = policy;
        report.sections.push(section);
        report
    };

    let (summary, _) = renderer().dry_run(build(None)).unwrap();
    assert_eq!(summary.sections[0].data_rows, 40);
    assert_eq!(summary.sections[0].blank_rows, 0);
    assert_eq!(drawn_rows(&summary, "waste"), 40);

    match renderer().render(build(Some(OverflowPolicy::Reject))) {
        Err(err @ ReportError::TooManyRows { .. }) => {
            assert_eq!(err.user_message(), "Too many rows for this template.");
        }
        other => panic!("expected TooManyRows, got {:?}", other.map(|r| r.summary)),
    }
}

#[test]
fn test_malformed_columns_fail_before_drawing() {
    let mut report = lot_report(3);
    report.sections[0].columns[1].width = 0.5;

    assert!(matches!(
        renderer().render(report),
        Err(ReportError::InvalidColumns { .. })
    ));
}

#[test]
fn test_missing_images_do_not_abort() {
    let mut images = MemoryImageSource::new();
    images.insert("pallet.png", png(40, 20));
    let renderer = renderer().with_images(images);

    let mut report = lot_report(2);
    report.logo = Some("logo.png".to_string());
    report.images = vec![
        ImageEntry {
            source: "pallet.png".to_string(),
            caption: "Palette P-01".to_string(),
        },
        ImageEntry {
            source: "missing.jpg".to_string(),
            caption: String::new(),
        },
    ];

    let rendered = renderer.render(report).unwrap();
    assert_eq!(rendered.summary.images_placed, 1);
    assert_eq!(rendered.summary.images_failed, 2);

    let pages = page_contents(&rendered.bytes);
    assert!(pages.iter().any(|c| c.contains("/Im1 Do")));
    assert!(pages.iter().any(|c| c.contains(&hex("Palette P-01"))));
}

#[test]
fn test_image_cells() {
    let mut images = MemoryImageSource::new();
    images.insert("a.png", png(8, 8));

    let mut report = ReportDocument::new("photos");
    let mut section = Section::new("lots");
    section.columns = vec![
        Column::new("lot", "Lot", 0.7, Align::Left),
        Column::image("photo", "Photo", 0.3),
    ];
    section.rows = vec![
        row(&[("lot", "A"), ("photo", "a.png")]),
        row(&[("lot", "B"), ("photo", "b.png")]),
        row(&[("lot", "C")]),
    ];
    report.sections.push(section);

    let (summary, recorder) = renderer().with_images(images).dry_run(report).unwrap();
    assert_eq!(summary.images_placed, 1);
    assert_eq!(summary.images_failed, 1);
    assert_eq!(
        recorder
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count(),
        1
    );
}

#[test]
fn test_packing_list_is_landscape() {
    let json = r#"{
        "template": "packing-list",
        "header": { "container": "MSKU 123456-7", "date": "12/03/2024" },
        "sections": [ { "key": "pallets", "rows": [ { "pallet": "P-01", "variety": "Hass" } ] } ]
    }"#;
    let rendered = renderer().render(parse_report(json).unwrap()).unwrap();
    assert_eq!(rendered.file_name, "packing_list_20240312.pdf");

    let doc = lopdf::Document::load_mem(&rendered.bytes).unwrap();
    let page = doc.get_pages()[&1];
    let media_box: Vec<f32> = doc
        .get_object(page)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f32().or_else(|_| v.as_i64().map(|i| i as f32)).unwrap())
        .collect();
    assert!(media_box[2] > media_box[3]);
}

#[test]
fn test_recorder_and_pdf_agree() {
    let doc = lot_report(90);
    let (dry, _) = renderer().dry_run(doc.clone()).unwrap();
    let rendered = renderer().render(doc).unwrap();

    assert_eq!(dry, rendered.summary);
    let mut recorder = LayoutRecorder::new();
    let prepared = report::prepare(lot_report(90)).unwrap();
    let summary = renderer().layout(&prepared, &mut recorder).unwrap();
    assert_eq!(summary.pages, dry.pages);
}
