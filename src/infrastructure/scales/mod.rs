//! Scales - user-authored Lua command handlers
//!
//! Each scale is one `.lua` file in the scales directory. The file stem is the
//! command name and the script must define `plugin(prefixed, message)`.
//! Scales are reconciled against the directory before every dispatch, so
//! files can be added, edited and deleted while the bot runs.

pub mod registry;
pub mod runtime;
pub mod scale;
pub mod source;

pub use registry::{ReconcileReport, ScaleRegistry};
pub use runtime::ScriptRuntime;
pub use scale::Scale;
pub use source::{extract_source, normalize_name, ScaleSource};

/// File extension for scale scripts
pub const SCALE_EXTENSION: &str = "lua";
