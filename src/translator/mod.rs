//! Fallback gloss source: batched generative-model translation
//!
//! Words the dictionary could not resolve are sent to the model in chunks of
//! at most [`MAX_CHUNK_SIZE`] words, one round-trip per chunk. A chunk whose
//! call fails or whose reply cannot be parsed fails as a whole; other chunks
//! are unaffected.

pub mod prompt;
pub mod reply;

use std::sync::Arc;

use serde::Serialize;

use crate::config::{ModelConfig, MAX_CHUNK_SIZE};
use crate::error::GlossError;
use crate::llm::LlmClient;

pub use reply::{parse_model_reply, strip_code_fence, ModelReply, ParsedReply};

/// Placeholder for a word the model left out of a valid reply
pub const NO_GLOSS_PLACEHOLDER: &str = "[no gloss returned]";

/// Placeholder for every word of a batch that failed
pub fn batch_failure_placeholder(reason: &str) -> String {
    format!("[translation failed: {}]", reason)
}

/// Result of one batch call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Replied(ModelReply),
    Failed { reason: String },
}

impl BatchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, BatchOutcome::Failed { .. })
    }

    /// Meaning for a batch word, or the placeholder explaining its absence
    pub fn gloss_for(&self, word: &str) -> Result<&str, String> {
        match self {
            BatchOutcome::Replied(reply) => reply
                .meaning(word)
                .ok_or_else(|| NO_GLOSS_PLACEHOLDER.to_string()),
            BatchOutcome::Failed { reason } => Err(batch_failure_placeholder(reason)),
        }
    }
}

/// Translates unresolved words through an LLM, one call per chunk
pub struct BatchTranslator {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    chunk_size: usize,
    json_mode: bool,
}

impl BatchTranslator {
    /// Create a translator with default settings
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self::with_config(client, &ModelConfig::default())
    }

    /// Create a translator using the prompt language and JSON mode from config
    pub fn with_config(client: Arc<dyn LlmClient>, config: &ModelConfig) -> Self {
        Self {
            client,
            system_prompt: prompt::build_system_prompt(&config.target_language),
            chunk_size: MAX_CHUNK_SIZE,
            json_mode: config.json_mode,
        }
    }

    /// Set the chunk size, clamped to `1..=MAX_CHUNK_SIZE`
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Translate one chunk of words with a single model call
    pub async fn translate_batch(&self, words: &[String]) -> BatchOutcome {
        if words.is_empty() {
            return BatchOutcome::Replied(ModelReply::default());
        }
        if words.len() > self.chunk_size {
            tracing::error!(
                size = words.len(),
                limit = self.chunk_size,
                "Refusing oversized batch"
            );
            return BatchOutcome::Failed {
                reason: format!(
                    "batch of {} words exceeds limit of {}",
                    words.len(),
                    self.chunk_size
                ),
            };
        }

        let user_prompt = prompt::build_user_prompt(words);
        let response = if self.json_mode {
            self.client.chat_json(&self.system_prompt, &user_prompt).await
        } else {
            self.client.chat(&self.system_prompt, &user_prompt).await
        };

        let text = match response {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    size = words.len(),
                    provider = self.client.provider_name(),
                    error = %e,
                    "Model call failed"
                );
                return BatchOutcome::Failed {
                    reason: "model call failed".to_string(),
                };
            }
        };

        match parse_model_reply(&text, words) {
            ParsedReply::Parsed(reply) => {
                if !reply.missing.is_empty() {
                    tracing::warn!(
                        missing = ?reply.missing,
                        "Model reply omitted words"
                    );
                }
                BatchOutcome::Replied(reply)
            }
            ParsedReply::Malformed(reason) => {
                tracing::warn!(size = words.len(), %reason, "Unparseable model reply");
                BatchOutcome::Failed {
                    reason: GlossError::BatchParseFailure(reason).to_string(),
                }
            }
        }
    }

    /// Translate any number of words, chunk by chunk, in order.
    ///
    /// Returns one outcome per chunk; chunk `i` covers
    /// `words[i * chunk_size..]` up to `chunk_size` words.
    pub async fn translate_all(&self, words: &[String]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(words.len().div_ceil(self.chunk_size));
        for (index, chunk) in words.chunks(self.chunk_size).enumerate() {
            tracing::info!(batch = index + 1, size = chunk.len(), "Translating batch");
            outcomes.push(self.translate_batch(chunk).await);
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with canned text and records each prompt
    struct ScriptedClient {
        replies: Mutex<Vec<anyhow::Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<anyhow::Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat(&self, _system: &str, user: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Err(anyhow!("no scripted reply"))
            } else {
                replies.remove(0)
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reply_parsed_into_meanings() {
        let client = ScriptedClient::new(vec![Ok(
            r#"```json
{"words": [{"word": "apple", "meaning": "n. 苹果"}]}
```"#
                .to_string(),
        )]);
        let translator = BatchTranslator::new(client.clone());
        let outcome = translator.translate_batch(&words(&["apple"])).await;
        assert_eq!(outcome.gloss_for("apple"), Ok("n. 苹果"));
        assert_eq!(client.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_model_error_fails_batch() {
        let client = ScriptedClient::new(vec![Err(anyhow!("connection reset"))]);
        let translator = BatchTranslator::new(client);
        let outcome = translator.translate_batch(&words(&["a", "b"])).await;
        assert!(outcome.is_failed());
        assert_eq!(
            outcome.gloss_for("a"),
            Err("[translation failed: model call failed]".to_string())
        );
    }

    #[tokio::test]
    async fn test_garbage_reply_fails_batch() {
        let client = ScriptedClient::new(vec![Ok("Sorry, I can't do that.".to_string())]);
        let translator = BatchTranslator::new(client);
        let outcome = translator.translate_batch(&words(&["a"])).await;
        match outcome {
            BatchOutcome::Failed { reason } => {
                assert!(reason.starts_with("unparseable reply: not JSON"), "got {}", reason)
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_never_sent() {
        let client = ScriptedClient::new(vec![]);
        let translator = BatchTranslator::new(client.clone()).with_chunk_size(2);
        let outcome = translator.translate_batch(&words(&["a", "b", "c"])).await;
        assert!(outcome.is_failed());
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        let client = ScriptedClient::new(vec![]);
        let translator = BatchTranslator::new(client.clone());
        let outcome = translator.translate_batch(&[]).await;
        assert_eq!(outcome, BatchOutcome::Replied(ModelReply::default()));
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_all_continues_after_failure() {
        let client = ScriptedClient::new(vec![
            Ok("not json".to_string()),
            Ok(r#"{"words": [{"word": "c", "meaning": "n. 丙"}]}"#.to_string()),
        ]);
        let translator = BatchTranslator::new(client.clone()).with_chunk_size(2);
        let outcomes = translator.translate_all(&words(&["a", "b", "c"])).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_failed());
        assert_eq!(outcomes[1].gloss_for("c"), Ok("n. 丙"));
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_chunk_size_clamped() {
        let client = ScriptedClient::new(vec![]);
        assert_eq!(BatchTranslator::new(client.clone()).with_chunk_size(50).chunk_size(), 20);
        assert_eq!(BatchTranslator::new(client).with_chunk_size(0).chunk_size(), 1);
    }
}
