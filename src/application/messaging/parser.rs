//! Message parser - Classifies raw chat text into commands

use crate::domain::entities::command::split_first_word;
use crate::domain::entities::Command;

/// Splits messages into verb and arguments, noting whether they were indicated
pub struct MessageParser<'a> {
    indicator: &'a str,
}

impl<'a> MessageParser<'a> {
    pub fn new(indicator: &'a str) -> Self {
        Self { indicator }
    }

    /// Classify a message. Returns `None` for empty or whitespace-only text.
    ///
    /// The verb is the first whitespace-delimited token with the indicator
    /// prefix removed, so `! scale list` has an empty verb and matches nothing.
    pub fn classify(&self, text: &str) -> Option<Command> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (token, argument_text) = split_first_word(text);
        let (is_indicated, verb) = match token.strip_prefix(self.indicator) {
            Some(rest) if !self.indicator.is_empty() => (true, rest),
            _ => (false, token),
        };

        Some(Command::new(is_indicated, verb.to_lowercase(), argument_text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicated_command() {
        let parser = MessageParser::new("!");
        let cmd = parser.classify("  !Scale  list all ").unwrap();
        assert!(cmd.is_indicated);
        assert_eq!(cmd.verb, "scale");
        assert_eq!(cmd.argument_text, "list all");
    }

    #[test]
    fn test_plain_message() {
        let parser = MessageParser::new("!");
        let cmd = parser.classify("poke hello there").unwrap();
        assert!(!cmd.is_indicated);
        assert_eq!(cmd.verb, "poke");
        assert_eq!(cmd.argument_text, "hello there");
    }

    #[test]
    fn test_multi_character_indicator() {
        let parser = MessageParser::new("snek,");
        let cmd = parser.classify("snek,scales help").unwrap();
        assert!(cmd.is_indicated);
        assert_eq!(cmd.verb, "scales");
        assert_eq!(cmd.argument_text, "help");
    }

    #[test]
    fn test_detached_indicator_has_empty_verb() {
        let cmd = MessageParser::new("!").classify("! scale list").unwrap();
        assert!(cmd.is_indicated);
        assert_eq!(cmd.verb, "");
        assert_eq!(cmd.argument_text, "scale list");
    }

    #[test]
    fn test_verb_only() {
        let cmd = MessageParser::new("!").classify("!poke").unwrap();
        assert_eq!(cmd.verb, "poke");
        assert_eq!(cmd.argument_text, "");
    }

    #[test]
    fn test_empty_message() {
        let parser = MessageParser::new("!");
        assert_eq!(parser.classify(""), None);
        assert_eq!(parser.classify(" \n\t "), None);
    }

    #[test]
    fn test_indicator_alone() {
        let cmd = MessageParser::new("!").classify("!").unwrap();
        assert!(cmd.is_indicated);
        assert_eq!(cmd.verb, "");
    }

    #[test]
    fn test_multiline_arguments_preserved() {
        let cmd = MessageParser::new("!")
            .classify("!scale add poke ```lua\nfunction plugin() end\n```")
            .unwrap();
        assert_eq!(cmd.argument_text, "add poke ```lua\nfunction plugin() end\n```");
    }
}
