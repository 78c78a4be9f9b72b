//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Running a bot against a transport, paced reply delivery
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, built-in commands, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
