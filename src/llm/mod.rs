//! Generative model access

pub mod llm_client;
pub mod openai_client;

pub use llm_client::LlmClient;
pub use openai_client::OpenAiCompatibleClient;
