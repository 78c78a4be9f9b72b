//! The minimal bot: hisses at anything addressed to it

use crate::domain::entities::{InboundMessage, ReplyBatch};
use crate::domain::traits::{Outcome, Responder};

pub const HISS: &str = "*hiss*";

/// Replies `*hiss*` to every indicated message and nothing else
pub struct HissBot {
    name: String,
    indicator: String,
}

impl HissBot {
    pub fn new(name: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indicator: indicator.into(),
        }
    }
}

impl Responder for HissBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn respond(&self, message: &InboundMessage, self_id: &str) -> Outcome {
        if message.author_id == self_id {
            return Outcome::Ignored;
        }

        let text = message.text.trim();
        if !text.is_empty() && text.starts_with(&self.indicator) {
            Outcome::Reply(ReplyBatch::single(HISS))
        } else {
            Outcome::Ignored
        }
    }
}
