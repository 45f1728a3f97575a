//! In-memory fakes for the dictionary and model sources
//!
//! `FakeDictionary` answers from a fixed table. `FakeModel` reads the word list
//! back out of the user prompt (its last line is a JSON array) and answers
//! from its own glossary, with switches for the failure shapes real models
//! produce.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use dictation_gloss::{DictionarySource, LlmClient, LookupOutcome};

#[derive(Default)]
pub struct FakeDictionary {
    found: HashMap<String, String>,
    errors: HashSet<String>,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, word: &str, gloss: &str) -> Self {
        self.found.insert(word.to_string(), gloss.to_string());
        self
    }

    pub fn with_error(mut self, word: &str) -> Self {
        self.errors.insert(word.to_string());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl DictionarySource for FakeDictionary {
    async fn lookup(&self, word: &str) -> LookupOutcome {
        self.lookups.lock().unwrap().push(word.to_string());
        if self.errors.contains(word) {
            return LookupOutcome::SourceError("request failed: timed out".to_string());
        }
        match self.found.get(word) {
            Some(gloss) => LookupOutcome::Found(gloss.clone()),
            None => LookupOutcome::NotFound,
        }
    }

    fn source_name(&self) -> &str {
        "fake-dictionary"
    }
}

/// How the fake model answers a given call (1-based)
#[derive(Clone, Debug)]
pub enum CallBehavior {
    Answer,
    Fail,
    Garbage,
    Fenced,
}

#[derive(Default)]
pub struct FakeModel {
    behaviors: HashMap<usize, CallBehavior>,
    omit: HashSet<String>,
    /// Words omitted only the first time they are asked for
    omit_once: Mutex<HashSet<String>>,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_call(mut self, call: usize, behavior: CallBehavior) -> Self {
        self.behaviors.insert(call, behavior);
        self
    }

    pub fn omitting(mut self, word: &str) -> Self {
        self.omit.insert(word.to_string());
        self
    }

    pub fn omitting_once(self, word: &str) -> Self {
        self.omit_once.lock().unwrap().insert(word.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    /// Gloss the fake model gives for a word
    pub fn meaning_of(word: &str) -> String {
        format!("n. {}-释义", word)
    }
}

#[async_trait]
impl LlmClient for FakeModel {
    async fn chat(&self, _system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let list = user_prompt.lines().last().unwrap_or_default();
        let words: Vec<String> = serde_json::from_str(list)?;

        let call = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(words.clone());
            batches.len()
        };

        let behavior = self
            .behaviors
            .get(&call)
            .cloned()
            .unwrap_or(CallBehavior::Answer);

        let records: Vec<serde_json::Value> = {
            let mut omit_once = self.omit_once.lock().unwrap();
            words
                .iter()
                .filter(|w| !self.omit.contains(*w))
                .filter(|w| !omit_once.remove(*w))
                .map(|w| serde_json::json!({"word": w, "meaning": Self::meaning_of(w)}))
                .collect()
        };
        let body = serde_json::json!({ "words": records }).to_string();

        match behavior {
            CallBehavior::Answer => Ok(body),
            CallBehavior::Fenced => Ok(format!("```json\n{}\n```", body)),
            CallBehavior::Garbage => {
                Ok("I'm sorry, here are the words: apple = 苹果".to_string())
            }
            CallBehavior::Fail => Err(anyhow!("model endpoint unavailable")),
        }
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }

    fn provider_name(&self) -> &str {
        "fake"
    }
}

pub fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|w| w.to_string()).collect()
}

/// `prefix-0`, `prefix-1`, ... `prefix-(n-1)`
pub fn numbered(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}-{}", prefix, i)).collect()
}
