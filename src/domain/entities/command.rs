/// A chat message classified into a verb and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Whether the raw text began with the indicator
    pub is_indicated: bool,
    /// First token, lower-cased, indicator stripped
    pub verb: String,
    /// Remainder of the message, trimmed
    pub argument_text: String,
}

impl Command {
    pub fn new(is_indicated: bool, verb: impl Into<String>, argument_text: impl Into<String>) -> Self {
        Self {
            is_indicated,
            verb: verb.into(),
            argument_text: argument_text.into(),
        }
    }
}

/// Split text at its first whitespace run.
///
/// Returns the first word and the trimmed remainder. Interior whitespace of
/// the remainder, newlines included, is preserved.
pub fn split_first_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    }
}
