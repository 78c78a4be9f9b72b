//! Message handling - Classification, built-in commands and dispatch

pub mod builtins;
pub mod dispatcher;
pub mod hiss;
pub mod parser;


pub use builtins::{BuiltinReply, ScaleAdmin};
pub use dispatcher::ScaleBot;
pub use hiss::HissBot;
pub use parser::MessageParser;
