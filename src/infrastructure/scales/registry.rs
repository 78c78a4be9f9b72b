//! Scale registry - the set of scales a bot knows about

use std::path::{Path, PathBuf};

use super::scale::{scale_name, Scale};
use super::SCALE_EXTENSION;
use crate::application::errors::ScaleError;

/// What one reconciliation pass changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub refreshed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.refreshed.is_empty()
    }
}

/// In-memory scales for one bot, kept in sync with its scales directory
pub struct ScaleRegistry {
    directory: PathBuf,
    scales: Vec<Scale>,
}

impl ScaleRegistry {
    /// Create an empty registry, creating the directory if it is missing
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, ScaleError> {
        let directory = directory.into();
        if !directory.is_dir() {
            std::fs::create_dir_all(&directory)?;
            tracing::info!("Created scales directory {}", directory.display());
        }

        Ok(Self {
            directory,
            scales: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where a scale with this name lives on disk
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", name, SCALE_EXTENSION))
    }

    /// Sync with the directory: drop scales whose file is gone, reload
    /// changed ones, then pick up new files.
    ///
    /// When two files differ only by case, the first in file-name order wins
    /// and the other is ignored.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for i in (0..self.scales.len()).rev() {
            if !self.scales[i].exists() {
                let scale = self.scales.remove(i);
                tracing::info!("Scale '{}' was deleted", scale.name());
                report.removed.push(scale.name().to_string());
                continue;
            }

            let scale = &mut self.scales[i];
            if scale.has_changed() {
                match scale.refresh() {
                    Ok(()) => tracing::info!("Reloaded scale '{}'", scale.name()),
                    Err(e) => tracing::warn!("Keeping previous version: {}", e),
                }
                report.refreshed.push(scale.name().to_string());
            }
        }

        for path in self.list_files() {
            let Some(name) = scale_name(&path) else {
                continue;
            };
            if self.find(&name).is_some() {
                continue;
            }

            let scale = Scale::load(path);
            tracing::info!("Found new scale '{}'", scale.name());
            report.added.push(scale.name().to_string());
            self.scales.push(scale);
        }

        if !report.is_empty() {
            tracing::debug!("Reconciled scales: {:?}", report);
        }
        report
    }

    /// Regular, non-hidden files in the directory, sorted by file name
    fn list_files(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to read scales directory {}: {}", self.directory.display(), e);
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| !n.starts_with('.'))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    /// Find a scale by case-insensitive name
    pub fn find(&self, name: &str) -> Option<&Scale> {
        self.scales.iter().find(|s| s.is_named(name))
    }

    /// Add a scale unless one with the same name exists. Returns whether it was added.
    pub fn insert(&mut self, scale: Scale) -> bool {
        if self.find(scale.name()).is_some() {
            return false;
        }
        self.scales.push(scale);
        true
    }

    /// Forget a scale by name
    pub fn remove(&mut self, name: &str) -> Option<Scale> {
        let index = self.scales.iter().position(|s| s.is_named(name))?;
        Some(self.scales.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scale> {
        self.scales.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scales.iter().map(Scale::name)
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}
