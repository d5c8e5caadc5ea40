//! Report JSON schema types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text alignment inside a cell
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Page orientation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// What happens when a fixed-slot section receives more rows than slots
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Continue on additional pages
    #[default]
    Paginate,
    /// Refuse to render
    Reject,
}

/// Kind of content a column holds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    /// Cell value is an image reference resolved through the image source
    Image,
}

/// Flat mapping of field name to display string
///
/// JSON numbers and booleans are accepted and converted to their display
/// form; `null` becomes an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>")]
pub struct FieldMap(BTreeMap<String, String>);

/// One table row
pub type RowRecord = FieldMap;

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, empty when missing
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for FieldMap {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(k, v)| (k, crate::parser::value_to_string(&v)))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Column specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Field name in row object
    pub field: String,

    /// Header label
    pub label: String,

    /// Fraction of the usable page width (all columns sum to 1.0)
    pub width: f64,

    #[serde(default)]
    pub align: Align,

    #[serde(default)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(field: &str, label: &str, width: f64, align: Align) -> Self {
        Self {
            field: field.to_string(),
            label: label.to_string(),
            width,
            align,
            kind: ColumnKind::Text,
        }
    }

    pub fn image(field: &str, label: &str, width: f64) -> Self {
        Self {
            kind: ColumnKind::Image,
            ..Self::new(field, label, width, Align::Center)
        }
    }
}

/// Named table section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    /// Section identifier (matches a built-in template section)
    pub key: String,

    /// Display name; defaults to the template section name
    #[serde(default)]
    pub name: Option<String>,

    /// Column specs; filled from the template when empty
    #[serde(default)]
    pub columns: Vec<Column>,

    #[serde(default)]
    pub rows: Vec<RowRecord>,

    /// Bold totals row drawn after the data rows
    #[serde(default)]
    pub summary: Option<RowRecord>,

    /// Fixed number of row slots, padded with blank rows
    #[serde(default)]
    pub slots: Option<usize>,

    #[serde(default)]
    pub overflow: Option<OverflowPolicy>,
}

impl Section {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            name: None,
            columns: Vec::new(),
            rows: Vec::new(),
            summary: None,
            slots: None,
            overflow: None,
        }
    }

    /// Display name, falling back to the key
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow.unwrap_or_default()
    }
}

/// Photo in the trailing images section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageEntry {
    /// Reference resolved through the image source
    pub source: String,

    #[serde(default)]
    pub caption: String,
}

/// Root report structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    /// Template name (e.g. "quality-control")
    pub template: String,

    /// Title drawn at the top of every page
    #[serde(default)]
    pub title: Option<String>,

    /// Header metadata (date, product, variety, lotNumber, ...)
    #[serde(default)]
    pub header: FieldMap,

    /// Logo image reference
    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub orientation: Option<Orientation>,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

impl ReportDocument {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            title: None,
            header: FieldMap::new(),
            logo: None,
            orientation: None,
            sections: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// Header metadata keys with a fixed position and label
pub const HEADER_LABELS: &[(&str, &str)] = &[
    ("date", "Date"),
    ("product", "Produit"),
    ("variety", "Variété"),
    ("campaign", "Campagne"),
    ("lotNumber", "N° de lot"),
    ("controller", "Contrôleur"),
    ("responsible", "Responsable"),
    ("client", "Client"),
    ("destination", "Destination"),
    ("invoiceNumber", "N° de facture"),
    ("container", "Conteneur"),
];

/// Header entries in display order: known keys first, then the rest by key
pub fn header_entries(header: &FieldMap) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = HEADER_LABELS
        .iter()
        .filter(|(key, _)| header.contains(key))
        .map(|(key, label)| (label.to_string(), header.get(key).to_string()))
        .collect();

    entries.extend(
        header
            .iter()
            .filter(|(key, _)| !HEADER_LABELS.iter().any(|(known, _)| known == key))
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );

    entries
}
