//! Report JSON parsing and validation

use crate::schema::{Column, ColumnKind, OverflowPolicy, ReportDocument};
use crate::templates;
use crate::{ReportError, Result};

/// Tolerance on the sum of column width fractions
pub const WIDTH_TOLERANCE: f64 = 1e-3;

/// Parse a report from JSON string
pub fn parse_report(json: &str) -> Result<ReportDocument> {
    serde_json::from_str(json).map_err(|e| ReportError::ParseError(e.to_string()))
}

/// Convert a JSON value to string for rendering
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
    }
}

/// Fill template defaults into a report and validate it
///
/// Sections naming a built-in template section inherit its columns, display
/// name, slot count and overflow policy when they do not set their own.
/// Fails before anything is drawn when a column spec is malformed or a
/// `reject` section holds more rows than slots.
pub fn prepare(mut report: ReportDocument) -> Result<ReportDocument> {
    let template = templates::builtin(&report.template);

    if let Some(template) = &template {
        if report.title.is_none() {
            report.title = Some(template.title.to_string());
        }
        if report.orientation.is_none() {
            report.orientation = Some(template.orientation);
        }
    }

    for section in &mut report.sections {
        let spec = template.as_ref().and_then(|t| t.section(&section.key));

        match spec {
            Some(spec) => {
                if section.columns.is_empty() {
                    section.columns = spec.columns.clone();
                }
                if section.name.is_none() {
                    section.name = Some(spec.name.to_string());
                }
                if section.slots.is_none() {
                    section.slots = spec.slots;
                }
                if section.overflow.is_none() {
                    section.overflow = Some(spec.overflow);
                }
            }
            None if section.columns.is_empty() => {
                return Err(match template {
                    Some(_) => ReportError::InvalidColumns {
                        section: section.key.clone(),
                        reason: "no columns given and no template section with this key"
                            .to_string(),
                    },
                    None => ReportError::UnknownTemplate(report.template.clone()),
                });
            }
            None => {}
        }
    }

    validate(&report)?;
    Ok(report)
}

/// Validate column specs and slot overflow
pub fn validate(report: &ReportDocument) -> Result<()> {
    for section in &report.sections {
        validate_columns(&section.key, &section.columns)?;

        if let Some(slots) = section.slots {
            if section.rows.len() > slots && section.overflow_policy() == OverflowPolicy::Reject {
                return Err(ReportError::TooManyRows {
                    section: section.key.clone(),
                    rows: section.rows.len(),
                    slots,
                });
            }
        }
    }

    for (index, image) in report.images.iter().enumerate() {
        if image.source.trim().is_empty() {
            return Err(ReportError::ParseError(format!(
                "image {} has an empty source",
                index + 1
            )));
        }
    }

    Ok(())
}

/// Check that a column list is usable for layout
pub fn validate_columns(section: &str, columns: &[Column]) -> Result<()> {
    let invalid = |reason: String| ReportError::InvalidColumns {
        section: section.to_string(),
        reason,
    };

    if columns.is_empty() {
        return Err(invalid("no columns".to_string()));
    }

    for column in columns {
        if column.field.is_empty() {
            return Err(invalid("column with an empty field name".to_string()));
        }
        if !column.width.is_finite() || column.width <= 0.0 {
            return Err(invalid(format!(
                "column '{}' has width {} (must be > 0)",
                column.field, column.width
            )));
        }
    }

    let total: f64 = columns.iter().map(|c| c.width).sum();
    if (total - 1.0).abs() > WIDTH_TOLERANCE {
        return Err(invalid(format!("column widths sum to {total:.4}, expected 1.0")));
    }

    if columns.iter().all(|c| c.kind == ColumnKind::Image) {
        return Err(invalid("at least one text column is required".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Align, Section};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn columns(widths: &[f64]) -> Vec<Column> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| Column::new(&format!("c{i}"), "C", *w, Align::Left))
            .collect()
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
    }

    #[test]
    fn test_parse_report() {
        let json = r#"{
            "template": "quality-control",
            "header": { "lotNumber": "AV-240101-001" },
            "sections": [ { "key": "weight", "rows": [ { "n": 1 } ] } ]
        }"#;

        let report = parse_report(json).unwrap();
        assert_eq!(report.template, "quality-control");
        assert_eq!(report.header.get("lotNumber"), "AV-240101-001");
        assert_eq!(report.sections[0].rows[0].get("n"), "1");
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            parse_report("{ not json"),
            Err(ReportError::ParseError(_))
        ));
    }

    #[test]
    fn test_widths_must_sum_to_one() {
        assert!(validate_columns("s", &columns(&[0.1, 0.9])).is_ok());
        assert!(validate_columns("s", &columns(&[0.3333, 0.3333, 0.3334])).is_ok());
        assert!(matches!(
            validate_columns("s", &columns(&[0.1, 0.8])),
            Err(ReportError::InvalidColumns { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_width() {
        assert!(validate_columns("s", &columns(&[1.2, -0.2])).is_err());
        assert!(validate_columns("s", &columns(&[1.0, 0.0])).is_err());
        assert!(validate_columns("s", &columns(&[])).is_err());
    }

    #[test]
    fn test_prepare_fills_template_columns() {
        let mut report = ReportDocument::new("waste-tracking");
        report.sections.push(Section::new("waste"));

        let report = prepare(report).unwrap();
        let section = &report.sections[0];
        assert!(!section.columns.is_empty());
        assert_eq!(section.slots, Some(26));
        assert!(report.title.is_some());
    }

    #[test]
    fn test_prepare_unknown_template_without_columns() {
        let mut report = ReportDocument::new("delivery-note");
        report.sections.push(Section::new("lines"));

        assert!(matches!(
            prepare(report),
            Err(ReportError::UnknownTemplate(name)) if name == "delivery-note"
        ));
    }

    #[test]
    fn test_prepare_custom_template_with_columns() {
        let mut report = ReportDocument::new("custom");
        let mut section = Section::new("lines");
        section.columns = columns(&[0.5, 0.5]);
        report.sections.push(section);

        assert!(prepare(report).is_ok());
    }

    #[test]
    fn test_reject_overflow() {
        let mut report = ReportDocument::new("custom");
        let mut section = Section::new("lines");
        section.columns = columns(&[1.0]);
        section.slots = Some(2);
        section.overflow = Some(OverflowPolicy::Reject);
        section.rows = vec![Default::default(); 3];
        report.sections.push(section);

        match prepare(report) {
            Err(ReportError::TooManyRows {
                section,
                rows,
                slots,
            }) => {
                assert_eq!(section, "lines");
                assert_eq!(rows, 3);
                assert_eq!(slots, 2);
            }
            other => panic!("expected TooManyRows, got {other:?}"),
        }
    }
}
