//! File-based key-value storage
//!
//! One `key=value` pair per line. No sections, comments, quoting or
//! multi-line values. Keys compare case-insensitively, values are kept as
//! written. Every read and write works on a full snapshot of the file, which
//! is fine for small, rarely written configuration files.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use crate::application::errors::StorageError;
use crate::domain::traits::Store;

/// Characters that may not appear in a key
const RESERVED: [char; 4] = ['=', ';', '\n', '\r'];

/// How many parent directories to search when the file is not where we were told
const MAX_SEARCH_HOPS: usize = 10;

/// Flat `key=value` file store
pub struct KvStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl KvStore {
    /// Open a store, resolving the path through parent directories if needed.
    ///
    /// The file does not have to exist; it is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let start = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let resolved = locate(&start, path).unwrap_or_else(|| path.to_path_buf());

        if resolved != path {
            tracing::info!("Using store at {}", resolved.display());
        }

        Self {
            path: resolved,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn snapshot(&self) -> Result<Vec<(String, String)>, StorageError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let text = std::fs::read_to_string(&self.path)?;
        Ok(parse(&text))
    }
}

#[cfg(test)]
impl KvStore {
    /// Open exactly `path`, skipping the parent search
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl Store for KvStore {
    fn read_item(&self, key: &str) -> Option<String> {
        // The lock guards no data, so a poisoned one is still usable
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Store lock for {} was poisoned", self.path.display());
            poisoned.into_inner()
        });

        match self.snapshot() {
            Ok(pairs) => pairs
                .into_iter()
                .find(|(k, _)| key_eq(k, key))
                .map(|(_, v)| v),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn write_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.trim().is_empty() {
            return Err(StorageError::EmptyKey);
        }
        if key.contains(&RESERVED[..]) {
            return Err(StorageError::ReservedKey(key.to_string()));
        }
        if value.contains(&['\n', '\r'][..]) {
            return Err(StorageError::MultilineValue(key.to_string()));
        }

        let _guard = self.lock.lock().map_err(|_| StorageError::Lock)?;

        let mut pairs = self.snapshot()?;
        match pairs.iter_mut().find(|(k, _)| key_eq(k, key)) {
            Some(pair) => *pair = (key.to_string(), value.to_string()),
            None => pairs.push((key.to_string(), value.to_string())),
        }

        std::fs::write(&self.path, compose(&pairs)).map_err(|e| {
            tracing::warn!("Failed to write {}: {}", self.path.display(), e);
            StorageError::Io(e)
        })
    }

    fn last_modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path).ok()?.modified().ok()
    }
}

fn key_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn parse(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

fn compose(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}\n", k, v))
        .collect()
}

/// Find `path`, trying `start` and then up to `MAX_SEARCH_HOPS` of its parents.
///
/// Absolute paths are searched by file name from their own parent upwards.
fn locate(start: &Path, path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    let (mut dir, relative) = if path.is_absolute() {
        (path.parent()?.to_path_buf(), PathBuf::from(path.file_name()?))
    } else {
        (start.to_path_buf(), path.to_path_buf())
    };

    for _ in 0..=MAX_SEARCH_HOPS {
        let candidate = dir.join(&relative);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?.to_path_buf();
    }

    None
}
