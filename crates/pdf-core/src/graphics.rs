//! Vector drawing operators (rectangles and lines)

use crate::document::Color;

/// Format a number for a content stream: at most 3 decimals, no trailing zeros
pub(crate) fn fmt_num(value: f64) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Generate operators for a filled rectangle
///
/// Coordinates are PDF coordinates (`y` is the bottom edge).
pub(crate) fn fill_rect_operators(x: f64, y: f64, width: f64, height: f64, fill: Color) -> Vec<u8> {
    format!(
        "q\n{} {} {} rg\n{} {} {} {} re\nf\nQ\n",
        fmt_num(fill.r as f64),
        fmt_num(fill.g as f64),
        fmt_num(fill.b as f64),
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    )
    .into_bytes()
}

/// Generate operators for a stroked rectangle outline
pub(crate) fn stroke_rect_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    stroke: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{} w\n{} {} {} {} re\nS\nQ\n",
        fmt_num(stroke.r as f64),
        fmt_num(stroke.g as f64),
        fmt_num(stroke.b as f64),
        fmt_num(line_width),
        fmt_num(x),
        fmt_num(y),
        fmt_num(width),
        fmt_num(height)
    )
    .into_bytes()
}

/// Generate operators for a straight line
pub(crate) fn line_operators(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    stroke: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{} w\n{} {} m\n{} {} l\nS\nQ\n",
        fmt_num(stroke.r as f64),
        fmt_num(stroke.g as f64),
        fmt_num(stroke.b as f64),
        fmt_num(line_width),
        fmt_num(x1),
        fmt_num(y1),
        fmt_num(x2),
        fmt_num(y2)
    )
    .into_bytes()
}
