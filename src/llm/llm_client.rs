//! LLM client abstraction
//!
//! Provider-agnostic chat interface used by the batch translator.

use anyhow::Result;
use async_trait::async_trait;

/// A chat-completion backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Plain chat completion; returns the reply text
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Chat completion asking the provider for a JSON object reply.
    ///
    /// Providers without a JSON mode fall back to `chat`; callers must still
    /// treat the reply as untrusted text.
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.chat(system_prompt, user_prompt).await
    }

    fn model_name(&self) -> &str;

    fn provider_name(&self) -> &str;
}
