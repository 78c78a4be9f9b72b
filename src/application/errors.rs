//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scale error: {0}")]
    Scale(#[from] ScaleError),

    #[error("Transport closed")]
    Closed,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Scale loading and invocation errors
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("Failed to load scale '{name}': {message}")]
    Load { name: String, message: String },

    #[error("Scale '{0}' does not define a plugin function")]
    MissingEntryPoint(String),

    #[error("Scale '{name}' failed while running: {message}")]
    Runtime { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScaleError {
    /// The message produced by the script runtime, without our framing.
    pub fn detail(&self) -> String {
        match self {
            ScaleError::Load { message, .. } | ScaleError::Runtime { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Key contains a reserved character: {0:?}")]
    ReservedKey(String),

    #[error("Key is empty")]
    EmptyKey,

    #[error("Value for {0:?} spans multiple lines")]
    MultilineValue(String),

    #[error("Store lock poisoned")]
    Lock,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
