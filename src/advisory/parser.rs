//! Advisory Response Parser
//!
//! Reads the generative service's reply line by line. Until a `Suggestions:`
//! marker appears every `Label: value` line is matched against the label
//! table; afterwards every non-blank line is a suggestion candidate. The
//! switch is one-way. Nothing here fails: an unusable reply simply yields
//! empty fields for reconciliation to repair.

use super::fields::{AdvisoryFields, FieldKey};
use regex::Regex;

pub const SUGGESTIONS_MARKER: &str = "Suggestions:";

lazy_static::lazy_static! {
    static ref EMPHASIS: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref NUMBERED: Regex = Regex::new(r"^\d+[.)]\s+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Fields,
    Suggestions,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAdvisory {
    pub fields: AdvisoryFields,
    pub suggestions: Vec<String>,
}

pub fn parse(raw: &str) -> ParsedAdvisory {
    let mut parsed = ParsedAdvisory::default();
    let mut mode = Mode::Fields;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(SUGGESTIONS_MARKER) {
            mode = Mode::Suggestions;
            continue;
        }
        match mode {
            Mode::Fields => {
                if let Some((key, value)) = parse_field_line(trimmed) {
                    parsed.fields.insert(key, value);
                }
            }
            Mode::Suggestions => {
                if let Some(suggestion) = clean_suggestion(trimmed) {
                    parsed.suggestions.push(suggestion);
                }
            }
        }
    }

    parsed
}

fn parse_field_line(line: &str) -> Option<(FieldKey, String)> {
    let (label, value) = line.split_once(':')?;
    let key = FieldKey::from_label(label.trim())?;
    let mut value = value.trim();
    if key == FieldKey::RecommendedCrop {
        // "Rice (Kharif)" -> "Rice"
        value = value.split('(').next().unwrap_or_default().trim();
    }
    if value.is_empty() {
        return None;
    }
    Some((key, value.to_string()))
}

fn clean_suggestion(line: &str) -> Option<String> {
    if line.is_empty() {
        return None;
    }
    // Commentary about the score itself, not advice
    if line.to_lowercase().contains("model confidence") || line.contains('%') {
        return None;
    }
    let stripped = strip_bullet(line);
    let stripped = NUMBERED.replace(stripped, "");
    if stripped.is_empty() {
        return None;
    }
    // Stray single-asterisk emphasis left after `**` pairs are converted
    let cleaned = highlight(&stripped).replace('*', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    Some(cleaned.to_string())
}

/// Drops leading `-`, `*` and `•` bullets but keeps a leading `**` emphasis.
fn strip_bullet(mut line: &str) -> &str {
    loop {
        line = line.trim_start();
        if line.starts_with("**") {
            return line.trim_end();
        }
        match line.chars().next() {
            Some(c @ ('-' | '*' | '•')) => line = &line[c.len_utf8()..],
            _ => return line.trim_end(),
        }
    }
}

/// `**text**` -> `<span class="bold-green">text</span>`
pub fn highlight(text: &str) -> String {
    EMPHASIS
        .replace_all(text, r#"<span class="bold-green">$1</span>"#)
        .into_owned()
}
