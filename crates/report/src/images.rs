//! Image sources
//!
//! Logos, photos and image cells refer to pictures by a string reference.
//! An [`ImageSource`] turns that reference into decoded pixels; the
//! assembler treats every failure as non-fatal.

use crate::{ReportError, Result};
use pdf_core::RasterImage;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Resolves image references to decoded pixels
pub trait ImageSource {
    fn load(&self, reference: &str) -> Result<RasterImage>;
}

fn decode(reference: &str, bytes: &[u8]) -> Result<RasterImage> {
    RasterImage::decode(bytes)
        .map_err(|e| ReportError::ImageError(format!("{reference}: {e}")))
}

/// Source that resolves nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImages;

impl ImageSource for NoImages {
    fn load(&self, reference: &str) -> Result<RasterImage> {
        Err(ReportError::ImageError(format!(
            "{reference}: no image source configured"
        )))
    }
}

/// Encoded images held in memory, keyed by reference
#[derive(Debug, Default, Clone)]
pub struct MemoryImageSource {
    images: BTreeMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add PNG or JPEG bytes under a reference
    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(reference.into(), bytes);
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, reference: &str) -> Result<RasterImage> {
        let bytes = self
            .images
            .get(reference)
            .ok_or_else(|| ReportError::ImageError(format!("{reference}: not found")))?;
        decode(reference, bytes)
    }
}

/// Images read from files below a root directory
///
/// References are relative paths; absolute paths and `..` components are
/// refused so a document cannot read outside the root.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference);
        let safe = !reference.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(ReportError::ImageError(format!(
                "{reference}: path must be relative to the image directory"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ImageSource for FileImageSource {
    fn load(&self, reference: &str) -> Result<RasterImage> {
        let path = self.resolve(reference)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| ReportError::ImageError(format!("{reference}: {e}")))?;
        decode(reference, &bytes)
    }
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    fn load(&self, reference: &str) -> Result<RasterImage> {
        (**self).load(reference)
    }
}

impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    fn load(&self, reference: &str) -> Result<RasterImage> {
        (**self).load(reference)
    }
}
