//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::InboundMessage;
use crate::domain::traits::{Bot, BotInfo};

const CONSOLE_CHAT: &str = "console";
const CONSOLE_USER: &str = "console-user";

/// Console bot adapter: stdin lines in, stdout lines out
pub struct ConsoleAdapter {
    info: BotInfo,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            info: BotInfo {
                id: "console".to_string(),
                username: name.to_lowercase(),
                name,
            },
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn receive(&self) -> Result<Vec<InboundMessage>, BotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(vec![InboundMessage::new(CONSOLE_CHAT, CONSOLE_USER, line)]),
            Ok(None) => Err(BotError::Closed),
            Err(e) => Err(BotError::Internal(format!("Failed to read stdin: {}", e))),
        }
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[{}] {}", self.info.name, text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
