use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutStoreError {
    #[error("preference file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] bincode::Error),
}

/// Flat key/value storage behind the layout store.
pub trait Preferences {
    fn get_float(&self, key: &str, default: f32) -> f32;
    fn put_float(&mut self, key: &str, value: f32);
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn put_bool(&mut self, key: &str, value: bool);
    /// Makes every pending `put_*` durable.
    fn commit(&mut self) -> Result<(), LayoutStoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PrefValue {
    Float(f32),
    Bool(bool),
}

type PrefMap = BTreeMap<String, PrefValue>;

fn float_of(map: &PrefMap, key: &str, default: f32) -> f32 {
    match map.get(key) {
        Some(PrefValue::Float(value)) => *value,
        _ => default,
    }
}

fn bool_of(map: &PrefMap, key: &str, default: bool) -> bool {
    match map.get(key) {
        Some(PrefValue::Bool(value)) => *value,
        _ => default,
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: PrefMap,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        float_of(&self.values, key, default)
    }

    fn put_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), PrefValue::Float(value));
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        bool_of(&self.values, key, default)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), PrefValue::Bool(value));
    }

    fn commit(&mut self) -> Result<(), LayoutStoreError> {
        Ok(())
    }
}

/// Preferences kept in a bincode file. Writes go to memory until `commit`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: PrefMap,
    dirty: bool,
}

impl FilePreferences {
    /// Opens `path`. A missing file starts empty; an unreadable one is
    /// logged and also starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match read_map(&path) {
            Ok(values) => values,
            Err(LayoutStoreError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                PrefMap::new()
            }
            Err(err) => {
                log::warn!("ignoring preferences at {}: {err}", path.display());
                PrefMap::new()
            }
        };
        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Preferences for FilePreferences {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        float_of(&self.values, key, default)
    }

    fn put_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), PrefValue::Float(value));
        self.dirty = true;
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        bool_of(&self.values, key, default)
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), PrefValue::Bool(value));
        self.dirty = true;
    }

    fn commit(&mut self) -> Result<(), LayoutStoreError> {
        if !self.dirty {
            return Ok(());
        }
        write_map(&self.path, &self.values)?;
        self.dirty = false;
        log::debug!("saved {} preferences to {}", self.values.len(), self.path.display());
        Ok(())
    }
}

fn read_map(path: &Path) -> Result<PrefMap, LayoutStoreError> {
    let bytes = std::fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

// Temp file + rename so a crash never leaves a torn file behind.
fn write_map(path: &Path, values: &PrefMap) -> Result<(), LayoutStoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = bincode::serialize(values)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
