//! Stored entities

use crate::Entity;
use serde::{Deserialize, Serialize};

/// A generated report and where its PDF was archived
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    pub id: String,
    pub template: String,
    pub file_name: String,
    #[serde(default)]
    pub lot_number: Option<String>,
    pub pages: usize,
    /// Blob store URL of the PDF
    pub url: String,
    #[serde(default)]
    pub created_by: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl Entity for ReportRecord {
    const COLLECTION: &'static str = "reports";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Controller,
    Operator,
    Viewer,
}

impl Role {
    /// Whether the role may produce and archive reports
    pub fn can_export(&self) -> bool {
        matches!(self, Role::Admin | Role::Controller)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A pallet placed in a cold-room location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    pub lot_number: String,
    pub pallet: String,
    pub location: String,
    pub boxes: u32,
    /// RFC 3339 timestamp
    pub placed_at: String,
}

impl Entity for Placement {
    const COLLECTION: &'static str = "placements";

    fn id(&self) -> &str {
        &self.id
    }
}
