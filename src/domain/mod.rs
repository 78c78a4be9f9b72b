//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (InboundMessage, Command, ReplyBatch)
//! - Traits: Abstractions for infrastructure (Bot, Store) and bot kinds (Responder)

pub mod entities;
pub mod traits;
