//! OpenAI-compatible Client
//!
//! LLM client for any endpoint speaking the OpenAI chat-completions protocol
//! (the Ark/Doubao endpoint by default).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::llm_client::LlmClient;
use crate::config::ModelConfig;

/// OpenAI-compatible API client
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    api_key: String,
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleClient {
    /// Create a client with an explicit API key
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Create a client reading the key from `config.api_key_env`
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": self.temperature
        });

        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }

    /// Internal API call implementation
    async fn call_api(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String> {
        tracing::debug!(model = %self.model, json_mode, "Calling model");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system_prompt, user_prompt, json_mode))
            .send()
            .await
            .context("Model request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Model API error {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ));
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse model response")?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("Model returned no content"))?;

        tracing::debug!(
            "Model raw reply: {}",
            content.chars().take(1000).collect::<String>()
        );
        Ok(content)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.call_api(system_prompt, user_prompt, false).await
    }

    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.call_api(system_prompt, user_prompt, true).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "OpenAI-compatible"
    }
}
