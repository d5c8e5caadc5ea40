//! Repository backends

use crate::{already_exists, field_matches, not_found, Entity, Repository, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Records held in memory, keyed by id
#[derive(Debug, Clone)]
pub struct MemoryRepository<T: Entity> {
    items: BTreeMap<String, T>,
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn insert_new<T: Entity>(items: &mut BTreeMap<String, T>, entity: T) -> Result<()> {
    if items.contains_key(entity.id()) {
        return Err(already_exists::<T>(entity.id()));
    }
    items.insert(entity.id().to_string(), entity);
    Ok(())
}

fn replace<T: Entity>(items: &mut BTreeMap<String, T>, entity: T) -> Result<()> {
    match items.get_mut(entity.id()) {
        Some(slot) => {
            *slot = entity;
            Ok(())
        }
        None => Err(not_found::<T>(entity.id())),
    }
}

fn remove<T: Entity>(items: &mut BTreeMap<String, T>, id: &str) -> Result<()> {
    items.remove(id).map(|_| ()).ok_or_else(|| not_found::<T>(id))
}

fn find<T: Entity>(
    items: &BTreeMap<String, T>,
    field: &str,
    value: &serde_json::Value,
) -> Result<Vec<T>> {
    let mut found = Vec::new();
    for item in items.values() {
        if field_matches(item, field, value)? {
            found.push(item.clone());
        }
    }
    Ok(found)
}

impl<T: Entity> Repository<T> for MemoryRepository<T> {
    fn create(&mut self, entity: T) -> Result<()> {
        insert_new(&mut self.items, entity)
    }

    fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.items.get(id).cloned())
    }

    fn update(&mut self, entity: T) -> Result<()> {
        replace(&mut self.items, entity)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        remove::<T>(&mut self.items, id)
    }

    fn list(&self) -> Result<Vec<T>> {
        Ok(self.items.values().cloned().collect())
    }

    fn find_by_field(&self, field: &str, value: &serde_json::Value) -> Result<Vec<T>> {
        find(&self.items, field, value)
    }
}

/// Whole collection kept in `<dir>/<collection>.json`
///
/// The file is rewritten after every successful mutation.
#[derive(Debug)]
pub struct JsonFileRepository<T: Entity> {
    path: PathBuf,
    items: BTreeMap<String, T>,
}

impl<T: Entity> JsonFileRepository<T> {
    /// Open the collection file in `dir`, starting empty if it does not exist
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", T::COLLECTION));

        let items = if path.exists() {
            let data = fs::read(&path)?;
            let records: Vec<T> = serde_json::from_slice(&data)?;
            log::info!("Loaded {} records from {}", records.len(), path.display());
            records
                .into_iter()
                .map(|r| (r.id().to_string(), r))
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let records: Vec<&T> = self.items.values().collect();
        let json = serde_json::to_vec_pretty(&records)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("{} persisted ({} records)", self.path.display(), records.len());
        Ok(())
    }

    /// Apply a mutation and persist it, rolling back the memory copy on failure
    fn mutate<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, T>) -> Result<()>,
    {
        let before = self.items.clone();
        change(&mut self.items)?;
        if let Err(e) = self.persist() {
            log::error!("Failed to persist {}: {}", self.path.display(), e);
            self.items = before;
            return Err(e);
        }
        Ok(())
    }
}

impl<T: Entity> Repository<T> for JsonFileRepository<T> {
    fn create(&mut self, entity: T) -> Result<()> {
        self.mutate(|items| insert_new(items, entity))
    }

    fn get(&self, id: &str) -> Result<Option<T>> {
        Ok(self.items.get(id).cloned())
    }

    fn update(&mut self, entity: T) -> Result<()> {
        self.mutate(|items| replace(items, entity))
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.mutate(|items| remove::<T>(items, id))
    }

    fn list(&self) -> Result<Vec<T>> {
        Ok(self.items.values().cloned().collect())
    }

    fn find_by_field(&self, field: &str, value: &serde_json::Value) -> Result<Vec<T>> {
        find(&self.items, field, value)
    }
}
