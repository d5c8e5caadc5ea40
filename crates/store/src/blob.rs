//! Blob storage for rendered documents

use crate::{Result, StoreError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores byte blobs under slash-separated paths
pub trait BlobStore {
    /// Store `bytes` at `path` and return a URL for it
    fn put(&mut self, path: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    fn get(&self, path: &str) -> Result<Vec<u8>>;
}

/// Reject empty, absolute or parent-relative paths
pub fn validate_path(path: &str) -> Result<()> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part.is_empty() || part == "..");
    if invalid {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

fn missing(path: &str) -> StoreError {
    StoreError::NotFound {
        collection: "blobs".to_string(),
        id: path.to_string(),
    }
}

/// Blobs kept in memory; URLs look like `mem://<path>`
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: BTreeMap<String, (String, Vec<u8>)>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(&self, path: &str) -> Option<&str> {
        self.blobs.get(path).map(|(content_type, _)| content_type.as_str())
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, path: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        validate_path(path)?;
        self.blobs
            .insert(path.to_string(), (content_type.to_string(), bytes.to_vec()));
        Ok(format!("mem://{path}"))
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        validate_path(path)?;
        self.blobs
            .get(path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| missing(path))
    }
}

/// Blobs written below a root directory; URLs look like `file://<absolute path>`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&mut self, path: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;

        let absolute = fs::canonicalize(&target)?;
        log::info!(
            "Stored {} ({} bytes, {content_type}) at {}",
            path,
            bytes.len(),
            absolute.display()
        );
        Ok(format!("file://{}", absolute.display()))
    }

    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        match fs::read(&target) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(missing(path)),
            Err(e) => Err(e.into()),
        }
    }
}
