//! Integration tests for pdf-core

use pdf_core::{
    Align, Color, FontWeight, ImageScaleMode, PageSize, PdfDocument, PdfError, RasterImage,
    BUILTIN_FAMILY,
};
use pretty_assertions::assert_eq;

/// Create a small PNG image for testing
fn create_test_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_fn(16, 8, |x, _| Rgb([x as u8 * 16, 128, 0]));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

/// Create a minimal JPEG image for testing
fn create_test_jpeg() -> Vec<u8> {
    vec![
        0xFF, 0xD8, // SOI marker
        0xFF, 0xC0, // SOF0 marker (baseline DCT)
        0x00, 0x11, // Length (17 bytes)
        0x08, // Precision (8 bits)
        0x00, 0x10, // Height (16 pixels)
        0x00, 0x10, // Width (16 pixels)
        0x03, // Number of components (RGB)
        0x01, 0x22, 0x00, // Component 1
        0x02, 0x11, 0x01, // Component 2
        0x03, 0x11, 0x01, // Component 3
        0xFF, 0xD9, // EOI marker
    ]
}

fn sample_document() -> PdfDocument {
    let mut doc = PdfDocument::new(PageSize::A4);
    let first = doc.add_page();
    let second = doc.add_page_with_size(PageSize::A4.landscape());

    doc.set_font(BUILTIN_FAMILY, 12.0).unwrap();
    doc.insert_text("Contrôle qualité", first, 36.0, 50.0, Align::Left)
        .unwrap();
    doc.set_font_weight(FontWeight::Bold);
    doc.set_text_color(Color::from_rgb(0, 97, 0));
    doc.insert_text("Lot 42", second, 400.0, 50.0, Align::Center)
        .unwrap();
    doc.fill_rect(first, 36.0, 60.0, 200.0, 16.0, Color::from_rgb(242, 242, 242))
        .unwrap();
    doc.stroke_rect(first, 36.0, 60.0, 200.0, 16.0, Color::black(), 0.5)
        .unwrap();
    doc.draw_line(second, 36.0, 80.0, 800.0, 80.0, Color::black(), 0.5)
        .unwrap();
    doc
}

#[test]
fn test_document_round_trips_through_lopdf() {
    let bytes = sample_document().to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();

    let pages = loaded.get_pages();
    assert_eq!(pages.len(), 2);

    let first_content = loaded.get_page_content(pages[&1]).unwrap();
    let first_content = String::from_utf8_lossy(&first_content);
    assert!(first_content.contains("Tj"));
    assert!(first_content.contains("re\nf"));
}

#[test]
fn test_page_sizes_are_written() {
    let bytes = sample_document().to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = loaded.get_pages();

    let media_box = |page: u32| -> Vec<f32> {
        let dict = loaded.get_object(pages[&page]).unwrap().as_dict().unwrap();
        dict.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f32().or_else(|_| v.as_i64().map(|i| i as f32)).unwrap())
            .collect()
    };

    assert!((media_box(1)[3] - 841.89).abs() < 0.01);
    assert!((media_box(2)[2] - 841.89).abs() < 0.01);
    assert!((media_box(2)[3] - 595.28).abs() < 0.01);
}

/// BaseFont names of the fonts in a page's resources
fn page_base_fonts(doc: &lopdf::Document, page: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page];
    let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = page_dict.get(b"Resources").unwrap().as_dict().unwrap();
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();

    fonts
        .iter()
        .map(|(_, font_ref)| {
            let font = doc
                .get_object(font_ref.as_reference().unwrap())
                .unwrap()
                .as_dict()
                .unwrap();
            String::from_utf8_lossy(font.get(b"BaseFont").unwrap().as_name().unwrap())
                .into_owned()
        })
        .collect()
}

#[test]
fn test_builtin_fonts_are_referenced_per_page() {
    let bytes = sample_document().to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();

    assert_eq!(page_base_fonts(&loaded, 1), vec!["Helvetica".to_string()]);
    assert_eq!(page_base_fonts(&loaded, 2), vec!["Helvetica-Bold".to_string()]);
}

#[test]
fn test_output_is_deterministic() {
    let first = sample_document().to_bytes().unwrap();
    let second = sample_document().to_bytes().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_to_bytes_does_not_consume_state() {
    let doc = sample_document();
    assert_eq!(doc.to_bytes().unwrap(), doc.to_bytes().unwrap());
}

#[test]
fn test_insert_png_and_jpeg() {
    let mut doc = PdfDocument::default();
    let page = doc.add_page();

    doc.insert_image(&create_test_png(), page, 36.0, 100.0, 160.0, 80.0)
        .unwrap();
    doc.insert_image_scaled(
        &create_test_jpeg(),
        page,
        220.0,
        100.0,
        100.0,
        50.0,
        ImageScaleMode::FitBox,
    )
    .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let content = loaded
        .get_page_content(loaded.get_pages()[&1])
        .unwrap();
    let content = String::from_utf8_lossy(&content);

    assert!(content.contains("/Im1 Do"));
    assert!(content.contains("/Im2 Do"));
    // 16x16 JPEG fitted into 100x50 becomes 50x50
    assert!(content.contains("50 0 0 50 220"));
}

#[test]
fn test_insert_invalid_image_fails() {
    let mut doc = PdfDocument::default();
    let page = doc.add_page();

    let result = doc.insert_image(b"definitely not an image", page, 0.0, 0.0, 10.0, 10.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_insert_raster() {
    let mut doc = PdfDocument::default();
    let page = doc.add_page();
    let raster = RasterImage::decode(&create_test_png()).unwrap();

    doc.insert_raster(&raster, page, 0.0, 0.0, 32.0, 32.0, ImageScaleMode::FitWidth)
        .unwrap();

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let content = loaded.get_page_content(loaded.get_pages()[&1]).unwrap();
    // 16x8 scaled to width 32 keeps its 2:1 ratio
    assert!(String::from_utf8_lossy(&content).contains("32 0 0 16 0"));
}

#[test]
fn test_unknown_family_is_rejected() {
    let mut doc = PdfDocument::default();
    assert!(matches!(
        doc.set_font("sarabun", 12.0),
        Err(PdfError::FontNotFound(_))
    ));
    assert!(matches!(
        doc.measure_text("sarabun", FontWeight::Regular, 12.0, "x"),
        Err(PdfError::FontNotFound(_))
    ));
}

#[test]
fn test_right_aligned_text_ends_at_anchor() {
    let mut doc = PdfDocument::new(PageSize {
        width: 300.0,
        height: 100.0,
    });
    let page = doc.add_page();
    doc.set_font(BUILTIN_FAMILY, 10.0).unwrap();
    // "AV" is 13.34pt wide at 10pt
    doc.insert_text("AV", page, 100.0, 20.0, Align::Right).unwrap();

    let bytes = doc.to_bytes().unwrap();
    let loaded = lopdf::Document::load_mem(&bytes).unwrap();
    let content = loaded.get_page_content(loaded.get_pages()[&1]).unwrap();
    assert!(String::from_utf8_lossy(&content).contains("86.66 80 Td"));
}
