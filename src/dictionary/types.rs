//! Dictionary API types and response classification

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GlossError;

/// Status code the dictionary service uses for a hit
pub const FOUND_CODE: i64 = 200;

/// Result of looking one word up in the primary source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// Newline-joined `"<pos>. <translation>"` lines
    Found(String),
    NotFound,
    /// Short diagnostic for a transport or payload failure
    SourceError(String),
}

/// `data` block of a successful response
#[derive(Debug, Clone, Deserialize)]
pub struct WordData {
    pub translations: Vec<Translation>,
}

/// One part-of-speech sense
#[derive(Debug, Clone, Deserialize)]
pub struct Translation {
    pub pos: String,
    pub tran_cn: String,
}

impl Translation {
    pub fn gloss_line(&self) -> String {
        format!("{}. {}", self.pos.trim(), self.tran_cn.trim())
    }
}

fn malformed(detail: impl Into<String>) -> LookupOutcome {
    LookupOutcome::SourceError(GlossError::MalformedResponse(detail.into()).to_string())
}

/// Classify a response body from the dictionary service.
///
/// `code` decides between hit and miss; only a hit needs the `data` block to
/// be well formed. Anything that cannot be read is a `SourceError`.
pub fn classify_body(body: &str) -> LookupOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return malformed(e.to_string()),
    };

    let Some(code) = value.get("code").and_then(Value::as_i64) else {
        return malformed("missing status code");
    };

    if code != FOUND_CODE {
        return LookupOutcome::NotFound;
    }

    let data = match value.get("data") {
        Some(data) if !data.is_null() => data.clone(),
        _ => return malformed("missing data"),
    };

    let data: WordData = match serde_json::from_value(data) {
        Ok(d) => d,
        Err(e) => return malformed(e.to_string()),
    };

    if data.translations.is_empty() {
        return LookupOutcome::NotFound;
    }

    let gloss = data
        .translations
        .iter()
        .map(Translation::gloss_line)
        .collect::<Vec<_>>()
        .join("\n");

    LookupOutcome::Found(gloss)
}
