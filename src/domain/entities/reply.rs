/// Ordered outbound messages produced by one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyBatch {
    messages: Vec<String>,
}

impl ReplyBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(text: impl Into<String>) -> Self {
        Self {
            messages: vec![text.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Number of pacing delays needed to send the whole batch
    pub fn pauses(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.messages
    }
}

impl From<Vec<String>> for ReplyBatch {
    fn from(messages: Vec<String>) -> Self {
        Self { messages }
    }
}
