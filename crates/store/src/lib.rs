//! Store - persistence boundary for generated reports
//!
//! This crate provides:
//! - A narrow repository interface per entity (reports, users, placements)
//! - In-memory and JSON-file repositories
//! - A blob store interface with in-memory and filesystem backends
//!
//! # Example
//!
//! ```ignore
//! use store::{BlobStore, FsBlobStore, JsonFileRepository, ReportRecord, Repository};
//!
//! let mut blobs = FsBlobStore::new("archive");
//! let url = blobs.put("reports/qc_AV-1.pdf", &bytes, "application/pdf")?;
//!
//! let mut reports = JsonFileRepository::<ReportRecord>::open("data")?;
//! reports.create(record)?;
//! ```

mod blob;
mod entities;
mod repository;

pub use blob::{validate_path, BlobStore, FsBlobStore, MemoryBlobStore};
pub use entities::{Placement, ReportRecord, Role, User};
pub use repository::{JsonFileRepository, MemoryRepository};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in repositories and blob stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("{collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// A record kept in a named collection
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Collection name, also the JSON file stem
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Create, read, update, delete and query-by-field for one entity type
pub trait Repository<T: Entity> {
    /// Insert a new record; fails if the id is taken
    fn create(&mut self, entity: T) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<T>>;

    /// Replace an existing record; fails if the id is unknown
    fn update(&mut self, entity: T) -> Result<()>;

    /// Remove a record; fails if the id is unknown
    fn delete(&mut self, id: &str) -> Result<()>;

    /// All records ordered by id
    fn list(&self) -> Result<Vec<T>>;

    /// Records whose serialized `field` equals `value`
    fn find_by_field(&self, field: &str, value: &serde_json::Value) -> Result<Vec<T>>;
}

/// Compare one field of an entity's JSON form
pub(crate) fn field_matches<T: Entity>(
    entity: &T,
    field: &str,
    value: &serde_json::Value,
) -> Result<bool> {
    let json = serde_json::to_value(entity)?;
    Ok(json.get(field) == Some(value))
}

pub(crate) fn not_found<T: Entity>(id: &str) -> StoreError {
    StoreError::NotFound {
        collection: T::COLLECTION.to_string(),
        id: id.to_string(),
    }
}

pub(crate) fn already_exists<T: Entity>(id: &str) -> StoreError {
    StoreError::AlreadyExists {
        collection: T::COLLECTION.to_string(),
        id: id.to_string(),
    }
}
