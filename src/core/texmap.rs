//! LaTeX-safe text handling for imported values

use crate::settings::Settings;
use regex::Regex;
use std::sync::OnceLock;

/// Paragraph break written into the database.
pub const PARAGRAPH_BREAK: &str = "\\DTLpar ";

fn paragraph_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\r?\n[ \t]*(?:\r?\n\s*)+").ok())
        .as_ref()
}

/// Drop a trailing unescaped `%` that is followed only by whitespace.
///
/// Values copied out of LaTeX sources often end in a comment character used
/// to suppress the end-of-line space.
pub fn strip_empty_comment(text: &str) -> &str {
    let trimmed = text.trim_end();
    let Some(before) = trimmed.strip_suffix('%') else {
        return text;
    };
    let backslashes = before.chars().rev().take_while(|&c| c == '\\').count();
    if backslashes % 2 == 1 {
        text
    } else {
        before
    }
}

/// Replace every mapped character with its replacement text.
pub fn apply_text_map(text: &str, settings: &Settings) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match settings.text_map.get(&ch) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

/// Collapse a blank line into a single paragraph-break token.
pub fn normalize_paragraphs(text: &str) -> String {
    match paragraph_pattern() {
        Some(pattern) => pattern.replace_all(text, PARAGRAPH_BREAK).into_owned(),
        None => text.to_string(),
    }
}

/// Prepare imported text: code-point mapping for literal content, then
/// paragraph normalisation. Empty text is returned unchanged.
pub fn map_text(text: &str, settings: &Settings) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mapped = if settings.maps_text() {
        apply_text_map(text, settings)
    } else {
        text.to_string()
    };
    normalize_paragraphs(&mapped)
}
