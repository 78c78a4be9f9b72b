use chrono::{DateTime, Utc};

/// A chat message delivered by a transport. Never persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub chat_id: String,
    pub author_id: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(chat_id: impl Into<String>, author_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            author_id: author_id.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Short single-line preview for logs
    pub fn preview(&self) -> String {
        let mut preview: String = self.text.chars().take(50).collect();
        if let Some(pos) = preview.find('\n') {
            preview.truncate(pos);
        }
        preview
    }
}
