//! Suggested file names for rendered reports

use crate::schema::FieldMap;
use chrono::{DateTime, NaiveDate};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Parse a header date in one of the accepted formats
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
}

/// Keep ASCII letters, digits, `_` and `-`; everything else becomes `-`
pub fn sanitize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `<template>_<identifier>.pdf`
///
/// The identifier is the lot number when present, otherwise the header
/// date as `YYYYMMDD`, otherwise `undated`. Dashes in the template name
/// become underscores.
pub fn report_file_name(template: &str, header: &FieldMap) -> String {
    let template = sanitize(template).replace('-', "_");
    let template = if template.is_empty() {
        "report".to_string()
    } else {
        template
    };

    let lot = header.get("lotNumber").trim();
    let identifier = if !lot.is_empty() {
        sanitize(lot)
    } else if let Some(date) = parse_date(header.get("date")) {
        date.format("%Y%m%d").to_string()
    } else {
        let raw = header.get("date").trim();
        if raw.is_empty() {
            "undated".to_string()
        } else {
            sanitize(raw)
        }
    };

    format!("{template}_{identifier}.pdf")
}
