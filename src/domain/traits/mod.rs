//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod responder;
pub mod store;

pub use bot::{Bot, BotInfo};
pub use responder::{Outcome, Responder};
pub use store::Store;
