//! Pulling a scale name and script out of a chat message
//!
//! `add` and `update` take `<name> <code block>`. The name is everything
//! before the first backtick. The body is the fenced block with its
//! backticks, surrounding whitespace and an optional `lua` language tag
//! removed.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::SCALE_EXTENSION;

static OPENING_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s`]*(?:(?i:lua)(?:\s+|$))?").expect("opening fence pattern is valid")
});

/// A scale name and script body taken from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSource {
    pub name: String,
    pub body: String,
}

/// Split `<name> ```lua ... ```` into name and body.
///
/// Returns `None` when there is no backtick at all. The name is trimmed and
/// lower-cased but not validated; see [`normalize_name`].
pub fn extract_source(argument_text: &str) -> Option<ScaleSource> {
    let start = argument_text.find('`')?;
    let name = argument_text[..start].trim().to_lowercase();

    let fenced = &argument_text[start..];
    let opened = OPENING_FENCE.replace(fenced, "");
    let body = opened.trim_end_matches(|c: char| c == '`' || c.is_whitespace());

    Some(ScaleSource {
        name,
        body: body.to_string(),
    })
}

/// Turn user input into a scale name that is safe to use as a file stem.
///
/// Lower-cases, drops a trailing `.lua`, and rejects anything empty, hidden,
/// containing whitespace, or able to escape the scales directory.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    let suffix = format!(".{}", SCALE_EXTENSION);
    let name = name.strip_suffix(&suffix).unwrap_or(&name).trim();

    let unsafe_name = name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains(|c: char| c == '/' || c == '\\' || c.is_whitespace() || c == '`');

    if unsafe_name {
        None
    } else {
        Some(name.to_string())
    }
}
