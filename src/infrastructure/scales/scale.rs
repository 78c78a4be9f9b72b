use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::runtime::ScriptRuntime;
use crate::application::errors::ScaleError;

/// One scale: a script file plus its loaded runtime.
///
/// Change detection uses a SHA-256 of the file content, so editors that
/// rewrite identical content and coarse filesystem timestamps do not cause
/// reloads. The fingerprint is recorded for every load attempt, and a failed
/// reload keeps the previous runtime.
pub struct Scale {
    name: String,
    path: PathBuf,
    fingerprint: Option<String>,
    runtime: Option<ScriptRuntime>,
    generation: u64,
}

impl Scale {
    /// Create a scale for `path` and try to load it.
    ///
    /// A script that fails to load still yields a scale, just one that
    /// produces no replies until its file is fixed.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut scale = Self {
            name: scale_name(&path).unwrap_or_default(),
            path,
            fingerprint: None,
            runtime: None,
            generation: 0,
        };

        if let Err(e) = scale.refresh() {
            tracing::warn!("{}", e);
        }

        scale
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Whether the backing file is still present
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn is_loaded(&self) -> bool {
        self.runtime.is_some()
    }

    /// Number of successful loads so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the file content differs from the last load attempt
    pub fn has_changed(&self) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(source) => self.fingerprint.as_deref() != Some(fingerprint(&source).as_str()),
            Err(e) => {
                tracing::debug!("Can't read scale {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Reload the script from disk.
    ///
    /// The runtime is only replaced when the new source loads cleanly.
    pub fn refresh(&mut self) -> Result<(), ScaleError> {
        let source = std::fs::read_to_string(&self.path)?;
        self.fingerprint = Some(fingerprint(&source));

        let runtime = ScriptRuntime::compile(&self.name, &source)?;
        self.runtime = Some(runtime);
        self.generation += 1;
        Ok(())
    }

    /// Run the scale and collect its replies
    pub fn invoke(&self, is_indicated: bool, argument_text: &str) -> Result<Vec<String>, ScaleError> {
        match &self.runtime {
            Some(runtime) => runtime.invoke(&self.name, is_indicated, argument_text),
            None => Err(ScaleError::Load {
                name: self.name.clone(),
                message: "script has never loaded successfully".to_string(),
            }),
        }
    }

    /// Current source text on disk
    pub fn source(&self) -> Result<String, ScaleError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// Command name for a scale file: its trimmed file stem
pub fn scale_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?.trim();
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn fingerprint(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HISS: &str = "function plugin(p, m) return 'hiss' end";
    const BLEP: &str = "function plugin(p, m) return 'blep' end";

    #[test]
    fn test_load_and_invoke() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Poke.lua");
        std::fs::write(&path, HISS).unwrap();

        let scale = Scale::load(&path);
        assert_eq!(scale.name(), "Poke");
        assert!(scale.is_named("poke"));
        assert!(scale.is_loaded());
        assert!(!scale.has_changed());
        assert_eq!(scale.invoke(false, "hello").unwrap(), vec!["hiss"]);
    }

    #[test]
    fn test_change_detection_by_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poke.lua");
        std::fs::write(&path, HISS).unwrap();
        let mut scale = Scale::load(&path);

        // Same bytes rewritten
        std::fs::write(&path, HISS).unwrap();
        assert!(!scale.has_changed());

        std::fs::write(&path, BLEP).unwrap();
        assert!(scale.has_changed());

        scale.refresh().unwrap();
        assert_eq!(scale.generation(), 2);
        assert_eq!(scale.invoke(false, "").unwrap(), vec!["blep"]);
    }

    #[test]
    fn test_bad_edit_keeps_previous_runtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poke.lua");
        std::fs::write(&path, HISS).unwrap();
        let mut scale = Scale::load(&path);

        std::fs::write(&path, "function plugin(").unwrap();
        assert!(scale.has_changed());
        assert!(matches!(scale.refresh(), Err(ScaleError::Load { .. })));

        // Broken content is remembered, the old script keeps working
        assert!(!scale.has_changed());
        assert_eq!(scale.generation(), 1);
        assert_eq!(scale.invoke(false, "").unwrap(), vec!["hiss"]);
    }

    #[test]
    fn test_broken_scale_still_registers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.lua");
        std::fs::write(&path, "this is not lua").unwrap();

        let scale = Scale::load(&path);
        assert_eq!(scale.name(), "broken");
        assert!(!scale.is_loaded());
        assert!(scale.invoke(true, "").is_err());
    }

    #[test]
    fn test_exists_follows_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("poke.lua");
        std::fs::write(&path, HISS).unwrap();
        let scale = Scale::load(&path);

        assert!(scale.exists());
        std::fs::remove_file(&path).unwrap();
        assert!(!scale.exists());
    }

    #[test]
    fn test_scale_name_trims_stem() {
        assert_eq!(scale_name(Path::new("scales/ Poke .lua")).as_deref(), Some("Poke"));
        assert_eq!(scale_name(Path::new("scales/boop")).as_deref(), Some("boop"));
        assert_eq!(scale_name(Path::new("scales/ .lua")), None);
    }
}
