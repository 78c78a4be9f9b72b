//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod message;
pub mod reply;

pub use command::Command;
pub use message::InboundMessage;
pub use reply::ReplyBatch;
