//! Configuration management
//!
//! Bot configuration lives in a flat `key=value` file read through the
//! key-value store. `name`, `token` and `indicator` are required; the rest
//! fall back to defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::application::errors::ConfigError;
use crate::domain::traits::Store;

pub const DEFAULT_SCALE_PATH: &str = "./scales/";
pub const DEFAULT_PACING_MS: u64 = 1000;

/// Which bot variant a config runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotKind {
    /// Built-in scale management plus user scales
    Scales,
    /// Hisses at every indicated message
    Hiss,
}

impl FromStr for BotKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scales" | "scale" => Ok(BotKind::Scales),
            "hiss" => Ok(BotKind::Hiss),
            other => Err(ConfigError::InvalidValue(format!("unknown kind '{}'", other))),
        }
    }
}

/// Which chat transport a config connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Telegram,
    Console,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" => Ok(TransportKind::Telegram),
            "console" => Ok(TransportKind::Console),
            other => Err(ConfigError::InvalidValue(format!("unknown transport '{}'", other))),
        }
    }
}

/// Bot configuration
#[derive(Clone)]
pub struct BotConfig {
    pub name: String,
    pub token: String,
    pub indicator: String,
    pub scales_directory: PathBuf,
    pub kind: BotKind,
    pub transport: TransportKind,
    pub pacing: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("indicator", &self.indicator)
            .field("scales_directory", &self.scales_directory)
            .field("kind", &self.kind)
            .field("transport", &self.transport)
            .field("pacing", &self.pacing)
            .finish()
    }
}

impl BotConfig {
    pub fn load(store: &dyn Store) -> Result<Self, ConfigError> {
        let scales_directory = optional(store, "scalepath")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCALE_PATH));

        let kind = optional(store, "kind")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(BotKind::Scales);

        let transport = optional(store, "transport")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(TransportKind::Telegram);

        let pacing = match optional(store, "pacing") {
            Some(ms) => ms
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidValue(format!("pacing '{}' is not a number", ms)))?,
            None => Duration::from_millis(DEFAULT_PACING_MS),
        };

        Ok(Self {
            name: required(store, "name")?,
            token: required(store, "token")?,
            indicator: required(store, "indicator")?,
            scales_directory,
            kind,
            transport,
            pacing,
        })
    }

    /// Template config printed by `init-config`
    pub fn template() -> String {
        format!(
            "name=Garter\ntoken=YOUR_BOT_TOKEN\nindicator=!\nscalepath={}\nkind=scales\ntransport=telegram\npacing={}\n",
            DEFAULT_SCALE_PATH, DEFAULT_PACING_MS
        )
    }
}

fn optional(store: &dyn Store, key: &str) -> Option<String> {
    store
        .read_item(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(store: &dyn Store, key: &str) -> Result<String, ConfigError> {
    optional(store, key).ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

/// Tracks the indicator, re-reading it when the config file is rewritten
pub struct IndicatorWatch {
    store: Arc<dyn Store>,
    indicator: String,
    seen: Option<SystemTime>,
}

impl IndicatorWatch {
    pub fn new(store: Arc<dyn Store>, indicator: impl Into<String>) -> Self {
        let seen = store.last_modified();
        Self {
            store,
            indicator: indicator.into(),
            seen,
        }
    }

    pub fn indicator(&self) -> &str {
        &self.indicator
    }

    /// Re-read the indicator if the config changed on disk. Returns true if it changed.
    pub fn refresh(&mut self) -> bool {
        let modified = self.store.last_modified();
        if modified.is_none() || modified == self.seen {
            return false;
        }
        self.seen = modified;

        match optional(self.store.as_ref(), "indicator") {
            Some(indicator) if indicator != self.indicator => {
                tracing::info!("Indicator changed from '{}' to '{}'", self.indicator, indicator);
                self.indicator = indicator;
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!("Config no longer has an indicator, keeping '{}'", self.indicator);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::KvStore;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, text: &str) -> Arc<KvStore> {
        let path = dir.path().join("bot.cfg");
        std::fs::write(&path, text).unwrap();
        Arc::new(KvStore::at(path))
    }

    fn bump_mtime(store: &KvStore) {
        let file = std::fs::File::options().write(true).open(store.path()).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn test_load_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\ntoken=secret\nindicator=!\n");

        let config = BotConfig::load(store.as_ref()).unwrap();
        assert_eq!(config.name, "Garter");
        assert_eq!(config.indicator, "!");
        assert_eq!(config.scales_directory, PathBuf::from(DEFAULT_SCALE_PATH));
        assert_eq!(config.kind, BotKind::Scales);
        assert_eq!(config.transport, TransportKind::Telegram);
        assert_eq!(config.pacing, Duration::from_millis(DEFAULT_PACING_MS));
    }

    #[test]
    fn test_load_optional_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            "name=Garter\ntoken=secret\nindicator=?\nscalepath=/tmp/s\nkind=hiss\ntransport=Console\npacing=250\n",
        );

        let config = BotConfig::load(store.as_ref()).unwrap();
        assert_eq!(config.scales_directory, PathBuf::from("/tmp/s"));
        assert_eq!(config.kind, BotKind::Hiss);
        assert_eq!(config.transport, TransportKind::Console);
        assert_eq!(config.pacing, Duration::from_millis(250));
    }

    #[test]
    fn test_missing_required_key() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\nindicator=!\ntoken=  \n");

        match BotConfig::load(store.as_ref()) {
            Err(ConfigError::MissingKey(key)) => assert_eq!(key, "token"),
            other => panic!("expected missing token, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_kind() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\ntoken=t\nindicator=!\nkind=python\n");
        assert!(matches!(
            BotConfig::load(store.as_ref()),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\ntoken=hunter2\nindicator=!\n");
        let config = BotConfig::load(store.as_ref()).unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_template_loads() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &BotConfig::template());
        assert!(BotConfig::load(store.as_ref()).is_ok());
    }

    #[test]
    fn test_indicator_reloads_after_rewrite() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\ntoken=t\nindicator=!\n");
        let mut watch = IndicatorWatch::new(store.clone(), "!");

        assert!(!watch.refresh());
        assert_eq!(watch.indicator(), "!");

        store.write_item("indicator", "$").unwrap();
        bump_mtime(&store);

        assert!(watch.refresh());
        assert_eq!(watch.indicator(), "$");
        assert!(!watch.refresh());
    }

    #[test]
    fn test_indicator_kept_when_removed() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "name=Garter\ntoken=t\nindicator=!\n");
        let mut watch = IndicatorWatch::new(store.clone(), "!");

        std::fs::write(store.path(), "name=Garter\ntoken=t\n").unwrap();
        bump_mtime(&store);

        assert!(!watch.refresh());
        assert_eq!(watch.indicator(), "!");
    }
}
