use crate::domain::entities::{InboundMessage, ReplyBatch};

/// What a bot decided to do with one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not addressed to the bot, or nothing to say
    Ignored,
    /// Send these messages, in order
    Reply(ReplyBatch),
    /// Stop the process
    Shutdown,
}

impl From<ReplyBatch> for Outcome {
    fn from(batch: ReplyBatch) -> Self {
        if batch.is_empty() {
            Outcome::Ignored
        } else {
            Outcome::Reply(batch)
        }
    }
}

/// A kind of bot: handles one inbound message given its own state.
///
/// Implementations are shared across concurrently running message tasks and
/// serialize whatever internal state they need.
pub trait Responder: Send + Sync {
    /// Display identity
    fn name(&self) -> &str;

    /// Decide the reply for one message. `self_id` is the transport's id for this bot.
    fn respond(&self, message: &InboundMessage, self_id: &str) -> Outcome;
}
