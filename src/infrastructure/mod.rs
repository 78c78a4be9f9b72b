//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Bot configuration and indicator reloading
//! - Storage: Flat key-value file persistence
//! - Scales: Lua scale scripts and their registry
//! - Adapters: Chat transports (Telegram, console)

pub mod config;
pub mod storage;
pub mod scales;
pub mod adapters;
