use async_trait::async_trait;
use crate::domain::entities::InboundMessage;
use crate::application::errors::BotError;

/// Bot trait - abstraction for chat transport adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Connect and resolve the bot's own identity
    async fn start(&self) -> Result<(), BotError>;

    /// Wait for the next batch of inbound messages.
    ///
    /// Returns `BotError::Closed` once the transport has no more input.
    async fn receive(&self) -> Result<Vec<InboundMessage>, BotError>;

    /// Send a message to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
