//! Built-in document templates
//!
//! Each template is plain data: a title, a default orientation and the
//! column layout of its sections. The flow controller treats every
//! template the same way.

use crate::schema::{Align, Column, Orientation, OverflowPolicy};

/// Section layout provided by a template
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub columns: Vec<Column>,
    pub slots: Option<usize>,
    pub overflow: OverflowPolicy,
}

/// Built-in template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub orientation: Orientation,
    pub sections: Vec<SectionSpec>,
}

impl TemplateSpec {
    /// Find a section by key
    pub fn section(&self, key: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.key == key)
    }
}

/// Names of all built-in templates
pub const TEMPLATE_NAMES: &[&str] = &[
    "quality-control",
    "waste-tracking",
    "packing-list",
    "invoice",
];

/// Look up a built-in template by name
pub fn builtin(name: &str) -> Option<TemplateSpec> {
    match name {
        "quality-control" => Some(quality_control()),
        "waste-tracking" => Some(waste_tracking()),
        "packing-list" => Some(packing_list()),
        "invoice" => Some(invoice()),
        _ => None,
    }
}

fn section(key: &'static str, name: &'static str, columns: Vec<Column>) -> SectionSpec {
    SectionSpec {
        key,
        name,
        columns,
        slots: None,
        overflow: OverflowPolicy::Paginate,
    }
}

fn quality_control() -> TemplateSpec {
    use Align::*;

    TemplateSpec {
        name: "quality-control",
        title: "Rapport de contrôle qualité",
        orientation: Orientation::Portrait,
        sections: vec![
            section(
                "weight",
                "I. Contrôle du poids",
                vec![
                    Column::new("n", "N°", 0.06, Center),
                    Column::new("pallet", "Palette", 0.12, Left),
                    Column::new("size", "Calibre", 0.10, Center),
                    Column::new("boxes", "Nb colis", 0.10, Right),
                    Column::new("grossWeight", "Poids brut (kg)", 0.14, Right),
                    Column::new("netWeight", "Poids net (kg)", 0.14, Right),
                    Column::new("deviation", "Écart (%)", 0.10, Right),
                    Column::new("remarks", "Observations", 0.24, Left),
                ],
            ),
            section(
                "quality",
                "II. Contrôle qualité",
                vec![
                    Column::new("n", "N°", 0.06, Center),
                    Column::new("defect", "Défaut", 0.22, Left),
                    Column::new("sampled", "Fruits contrôlés", 0.12, Right),
                    Column::new("defective", "Fruits défectueux", 0.12, Right),
                    Column::new("rate", "Taux (%)", 0.10, Right),
                    Column::new("tolerance", "Tolérance (%)", 0.10, Right),
                    Column::new("decision", "Décision", 0.28, Left),
                ],
            ),
        ],
    }
}

fn waste_tracking() -> TemplateSpec {
    use Align::*;

    TemplateSpec {
        name: "waste-tracking",
        title: "Fiche de suivi des écarts de tri",
        orientation: Orientation::Portrait,
        sections: vec![SectionSpec {
            slots: Some(26),
            ..section(
                "waste",
                "Écarts de tri",
                vec![
                    Column::new("n", "N°", 0.06, Center),
                    Column::new("date", "Date", 0.12, Center),
                    Column::new("lot", "Lot", 0.14, Left),
                    Column::new("variety", "Variété", 0.14, Left),
                    Column::new("reason", "Motif", 0.26, Left),
                    Column::new("quantity", "Quantité (kg)", 0.12, Right),
                    Column::new("signature", "Visa", 0.16, Center),
                ],
            )
        }],
    }
}

fn packing_list() -> TemplateSpec {
    use Align::*;

    TemplateSpec {
        name: "packing-list",
        title: "Liste de colisage",
        orientation: Orientation::Landscape,
        sections: vec![section(
            "pallets",
            "Palettes",
            vec![
                Column::new("pallet", "N° palette", 0.08, Left),
                Column::new("variety", "Variété", 0.12, Left),
                Column::new("size", "Calibre", 0.08, Center),
                Column::new("category", "Catégorie", 0.08, Center),
                Column::new("boxes", "Nb colis", 0.08, Right),
                Column::new("netWeight", "Poids net (kg)", 0.10, Right),
                Column::new("grossWeight", "Poids brut (kg)", 0.10, Right),
                Column::new("grower", "Producteur", 0.16, Left),
                Column::new("harvestDate", "Date de récolte", 0.10, Center),
                Column::new("remarks", "Observations", 0.10, Left),
            ],
        )],
    }
}

fn invoice() -> TemplateSpec {
    use Align::*;

    TemplateSpec {
        name: "invoice",
        title: "Facture",
        orientation: Orientation::Portrait,
        sections: vec![section(
            "lines",
            "Détail",
            vec![
                Column::new("description", "Désignation", 0.34, Left),
                Column::new("size", "Calibre", 0.10, Center),
                Column::new("boxes", "Nb colis", 0.12, Right),
                Column::new("netWeight", "Poids net (kg)", 0.14, Right),
                Column::new("unitPrice", "Prix unitaire", 0.14, Right),
                Column::new("amount", "Montant", 0.16, Right),
            ],
        )],
    }
}
