use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, ReplyBatch};
use crate::domain::traits::{Bot, Outcome, Responder};

/// Binds one transport to one bot kind and pumps messages between them
pub struct MessageService {
    bot: Arc<dyn Bot>,
    responder: Arc<dyn Responder>,
    pacing: Duration,
}

impl MessageService {
    pub fn new(bot: Arc<dyn Bot>, responder: Arc<dyn Responder>, pacing: Duration) -> Self {
        Self {
            bot,
            responder,
            pacing,
        }
    }

    /// Receive messages until the transport closes, handling each in its own task.
    ///
    /// A `Shutdown` outcome exits the process immediately.
    pub async fn run(self: Arc<Self>) -> Result<(), BotError> {
        self.bot.start().await?;
        let info = self.bot.bot_info();
        tracing::info!("{} started as @{}", self.responder.name(), info.username);

        loop {
            let messages = match self.bot.receive().await {
                Ok(messages) => messages,
                Err(BotError::Closed) => {
                    tracing::info!("{} transport closed", self.responder.name());
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Failed to receive messages: {}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            };

            for message in messages {
                let service = self.clone();
                tokio::spawn(async move {
                    if service.process(message).await == Outcome::Shutdown {
                        tracing::info!("Shutting down");
                        std::process::exit(0);
                    }
                });
            }
        }
    }

    /// Handle one message end to end and report what happened
    pub async fn process(&self, message: InboundMessage) -> Outcome {
        tracing::debug!("[{}] {}: {}", message.chat_id, message.author_id, message.preview());

        let responder = self.responder.clone();
        let self_id = self.bot.bot_info().id;
        let chat_id = message.chat_id.clone();

        // Responders take a lock and may run scripts for a while
        let outcome = match tokio::task::spawn_blocking(move || responder.respond(&message, &self_id)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Message handler panicked: {}", e);
                return Outcome::Ignored;
            }
        };

        if let Outcome::Reply(batch) = &outcome {
            deliver(self.bot.as_ref(), &chat_id, batch, self.pacing).await;
        }
        outcome
    }
}

/// Send a batch in order, waiting `pacing` between consecutive messages.
///
/// Failed sends are logged and skipped. Returns how many were sent.
pub async fn deliver(bot: &dyn Bot, chat_id: &str, batch: &ReplyBatch, pacing: Duration) -> usize {
    let mut sent = 0;

    for (index, text) in batch.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(pacing).await;
        }

        match bot.send_message(chat_id, text).await {
            Ok(_) => sent += 1,
            Err(e) => tracing::warn!("[{}] Failed to send reply: {}", chat_id, e),
        }
    }

    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    use crate::application::messaging::HissBot;
    use crate::domain::traits::BotInfo;

    /// Records sends and when they happened
    #[derive(Default)]
    struct RecordingBot {
        sent: Mutex<Vec<(String, String, Instant)>>,
    }

    impl RecordingBot {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t, _)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl Bot for RecordingBot {
        async fn start(&self) -> Result<(), BotError> {
            Ok(())
        }

        async fn receive(&self) -> Result<Vec<InboundMessage>, BotError> {
            Err(BotError::Closed)
        }

        async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
            if text == "fail" {
                return Err(BotError::Network("refused".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string(), Instant::now()));
            Ok("1".to_string())
        }

        fn bot_info(&self) -> BotInfo {
            BotInfo {
                id: "me".to_string(),
                name: "Garter".to_string(),
                username: "garter".to_string(),
            }
        }
    }

    fn batch(items: &[&str]) -> ReplyBatch {
        ReplyBatch::from(items.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_replies_wait_twice() {
        let bot = RecordingBot::default();
        let pacing = Duration::from_millis(1000);
        let start = Instant::now();

        let sent = deliver(&bot, "chat", &batch(&["a", "b", "c"]), pacing).await;

        assert_eq!(sent, 3);
        assert_eq!(bot.texts(), vec!["a", "b", "c"]);
        // No wait before the first send, one before each of the others
        let times: Vec<Instant> = bot.sent.lock().unwrap().iter().map(|(_, _, t)| *t).collect();
        assert!(times[0] - start < pacing);
        assert!(times[1] - times[0] >= pacing);
        assert!(times[2] - times[1] >= pacing);
        assert!(start.elapsed() < pacing * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_and_empty_batches_do_not_wait() {
        let bot = RecordingBot::default();
        let start = Instant::now();

        assert_eq!(deliver(&bot, "chat", &ReplyBatch::new(), Duration::from_secs(1)).await, 0);
        assert_eq!(deliver(&bot, "chat", &batch(&["only"]), Duration::from_secs(1)).await, 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_send_does_not_stop_batch() {
        let bot = RecordingBot::default();
        let sent = deliver(&bot, "chat", &batch(&["a", "fail", "c"]), Duration::from_millis(10)).await;
        assert_eq!(sent, 2);
        assert_eq!(bot.texts(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_process_replies_to_originating_chat() {
        let bot = Arc::new(RecordingBot::default());
        let service = MessageService::new(
            bot.clone(),
            Arc::new(HissBot::new("Garter", "!")),
            Duration::from_millis(1),
        );

        let outcome = service.process(InboundMessage::new("room-7", "someone", "!hey")).await;
        assert_eq!(outcome, Outcome::Reply(ReplyBatch::single("*hiss*")));

        let sent = bot.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "room-7");
    }

    #[tokio::test]
    async fn test_run_stops_when_transport_closes() {
        let service = Arc::new(MessageService::new(
            Arc::new(RecordingBot::default()),
            Arc::new(HissBot::new("Garter", "!")),
            Duration::from_millis(1),
        ));
        assert!(service.run().await.is_ok());
    }
}
