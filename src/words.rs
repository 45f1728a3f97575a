//! Word list loading
//!
//! Input is one word or phrase per line. The image extraction step upstream
//! emits a single comma-separated line instead, so a delimited variant is
//! provided for that shape.

use std::path::Path;

use crate::error::{GlossError, Result};

/// Split text into trimmed, non-empty lines
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Split text on newlines and commas (ASCII and full-width)
pub fn parse_delimited_word_list(text: &str) -> Vec<String> {
    text.split(|c: char| matches!(c, '\n' | '\r' | ',' | '，'))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Read a word list file, failing if it is unreadable or holds no words
pub fn load_word_list(path: impl AsRef<Path>, comma_separated: bool) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GlossError::InputRead {
        path: path.display().to_string(),
        source,
    })?;

    let words = if comma_separated {
        parse_delimited_word_list(&text)
    } else {
        parse_word_list(&text)
    };

    if words.is_empty() {
        return Err(GlossError::EmptyInput {
            source_name: path.display().to_string(),
        });
    }

    tracing::info!(path = %path.display(), count = words.len(), "Loaded word list");
    Ok(words)
}
