//! Tolerant parsing of model replies
//!
//! The model is asked for bare JSON but may still wrap it in a markdown fence
//! or add a sentence around it. Parsing never panics or errors out: it returns
//! `ParsedReply::Malformed` and the caller fails the batch.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Glosses the model returned for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelReply {
    /// Batch word -> meaning; keys are always words of the requested batch
    pub meanings: HashMap<String, String>,
    /// Batch words the reply did not cover, in batch order
    pub missing: Vec<String>,
}

impl ModelReply {
    pub fn meaning(&self, word: &str) -> Option<&str> {
        self.meanings.get(word).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    Parsed(ModelReply),
    Malformed(String),
}

fn fence_regex() -> &'static Regex {
    static FENCE_RE: OnceLock<Regex> = OnceLock::new();
    FENCE_RE.get_or_init(|| {
        Regex::new(r"```[A-Za-z0-9_-]*[ \t]*\r?\n?([\s\S]*?)\s*```")
            .expect("fence pattern is valid")
    })
}

/// Remove a markdown code fence around the payload, if there is one
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    match fence_regex().captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}

/// Every JSON reading of the payload: the whole text, then the outermost
/// `{...}` and `[...]` spans
fn json_candidates(text: &str) -> Vec<Value> {
    if let Ok(v) = serde_json::from_str(text) {
        return vec![v];
    }

    let mut candidates = Vec::new();
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if start < end {
                if let Ok(v) = serde_json::from_str(&text[start..=end]) {
                    candidates.push(v);
                }
            }
        }
    }
    candidates
}

fn is_record(value: &Value) -> bool {
    value.get("word").is_some_and(Value::is_string)
}

fn holds_records(items: &[Value]) -> bool {
    items.iter().any(is_record)
}

/// Locate the records: `{"words": [...]}` (or `results`, `items`, `entries`),
/// the only record-holding array field, a bare array, or a single record.
/// Arrays without any `{"word": ..}` object (an echoed word list) are skipped.
fn record_list(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(items) if holds_records(items) => Some(items.as_slice()),
        Value::Object(map) => {
            for key in ["words", "results", "items", "entries"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    if holds_records(items) {
                        return Some(items.as_slice());
                    }
                }
            }
            let mut arrays = map
                .values()
                .filter_map(Value::as_array)
                .filter(|items| holds_records(items));
            match (arrays.next(), arrays.next()) {
                (Some(only), None) => Some(only.as_slice()),
                (None, _) if is_record(value) => Some(std::slice::from_ref(value)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// A well-formed reply that simply lists nothing
fn is_empty_list(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => ["words", "results", "items", "entries"]
            .iter()
            .any(|key| matches!(map.get(*key), Some(Value::Array(items)) if items.is_empty())),
        _ => false,
    }
}

fn meaning_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(lines) => lines
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Parse a model reply against the batch that was requested.
///
/// Record words are matched to batch words exactly (after trimming), then
/// ASCII case-insensitively. Records for words outside the batch are dropped,
/// as are records without a usable meaning; their batch words end up in
/// `missing`.
pub fn parse_model_reply(text: &str, batch: &[String]) -> ParsedReply {
    let payload = strip_code_fence(text);
    if payload.is_empty() {
        return ParsedReply::Malformed("empty reply".to_string());
    }

    let candidates = json_candidates(payload);
    if candidates.is_empty() {
        return ParsedReply::Malformed(format!(
            "not JSON: {}",
            payload.chars().take(80).collect::<String>()
        ));
    }

    let records: &[Value] = match candidates.iter().find_map(record_list) {
        Some(records) => records,
        None if candidates.iter().any(is_empty_list) => &[],
        None => return ParsedReply::Malformed("no word list in reply".to_string()),
    };

    let mut by_lowercase: HashMap<String, Option<&String>> = HashMap::new();
    for word in batch {
        by_lowercase
            .entry(word.to_ascii_lowercase())
            .and_modify(|slot| {
                if slot.map_or(false, |w| w != word) {
                    *slot = None;
                }
            })
            .or_insert(Some(word));
    }

    let mut meanings: HashMap<String, String> = HashMap::new();
    for record in records {
        let Some(record_word) = record.get("word").and_then(Value::as_str).map(str::trim) else {
            tracing::debug!(?record, "Skipping model record without a word");
            continue;
        };
        let Some(meaning) = record
            .get("meaning")
            .or_else(|| record.get("translation"))
            .and_then(meaning_text)
        else {
            tracing::debug!(word = record_word, "Skipping model record without a meaning");
            continue;
        };

        let key = batch.iter().find(|w| w.as_str() == record_word).or_else(|| {
            by_lowercase
                .get(&record_word.to_ascii_lowercase())
                .copied()
                .flatten()
        });

        match key {
            Some(key) => {
                meanings.entry(key.clone()).or_insert(meaning);
            }
            None => {
                tracing::debug!(
                    word = record_word,
                    "Ignoring model record for unrequested word"
                );
            }
        }
    }

    let mut missing: Vec<String> = Vec::new();
    for word in batch {
        if !meanings.contains_key(word) && !missing.contains(word) {
            missing.push(word.clone());
        }
    }

    ParsedReply::Parsed(ModelReply { meanings, missing })
}
