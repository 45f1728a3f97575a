//! Dictionary API Client
//!
//! HTTP client for the per-word English dictionary service. One GET per word,
//! no retries; every failure is folded into `LookupOutcome::SourceError`.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::types::{classify_body, LookupOutcome};
use super::DictionarySource;
use crate::config::DictionaryConfig;
use crate::error::{GlossError, Result};

pub struct DictionaryClient {
    client: Client,
    base_url: Url,
}

impl DictionaryClient {
    pub fn new(config: &DictionaryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            GlossError::Config(format!("invalid dictionary URL {}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GlossError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Lookup URL with the word as a properly encoded query parameter
    pub fn lookup_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("word", word);
        url
    }

    async fn fetch(&self, word: &str) -> Result<String> {
        let response = self.client.get(self.lookup_url(word)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GlossError::TransportFailure(format!("HTTP {}", status)));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl DictionarySource for DictionaryClient {
    async fn lookup(&self, word: &str) -> LookupOutcome {
        match self.fetch(word).await {
            Ok(body) => {
                let outcome = classify_body(&body);
                if let LookupOutcome::SourceError(message) = &outcome {
                    tracing::warn!(word, error = %message, "Dictionary returned unusable payload");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(word, error = %e, "Dictionary lookup failed");
                LookupOutcome::SourceError(e.to_string())
            }
        }
    }

    fn source_name(&self) -> &str {
        "dictionary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    fn client_for(base_url: &str) -> DictionaryClient {
        let config = DictionaryConfig {
            base_url: base_url.to_string(),
            ..DictionaryConfig::default()
        };
        DictionaryClient::new(&config).unwrap()
    }

    #[test]
    fn test_lookup_url_encodes_phrase() {
        let client = client_for("https://v2.xxapi.cn/api/englishwords");
        assert_eq!(
            client.lookup_url("take on").as_str(),
            "https://v2.xxapi.cn/api/englishwords?word=take+on"
        );
        assert_eq!(
            client.lookup_url("rock&roll").as_str(),
            "https://v2.xxapi.cn/api/englishwords?word=rock%26roll"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = DictionaryConfig {
            base_url: "::nope".to_string(),
            ..DictionaryConfig::default()
        };
        assert!(matches!(
            DictionaryClient::new(&config),
            Err(GlossError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_source_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let client = client_for("http://127.0.0.1:9/api/englishwords");
        let outcome = client.lookup("apple").await;
        assert!(matches!(outcome, LookupOutcome::SourceError(_)));
    }

    #[tokio::test]
    async fn test_found_body_flows_through() {
        let body = r#"{"code": 200, "data": {"translations": [{"pos": "n", "tran_cn": "苹果"}]}}"#;
        let base = serve_once("200 OK", body).await;
        let client = client_for(&format!("{}/api/englishwords", base));

        let outcome = client.lookup("apple").await;
        assert_eq!(outcome, LookupOutcome::Found("n. 苹果".to_string()));
    }

    #[tokio::test]
    async fn test_not_found_code_flows_through() {
        let base = serve_once("200 OK", r#"{"code": -2, "msg": "未找到单词"}"#).await;
        let client = client_for(&format!("{}/api/englishwords", base));

        assert_eq!(client.lookup("xylophone").await, LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_source_error() {
        let base = serve_once("500 Internal Server Error", "oops").await;
        let client = client_for(&format!("{}/api/englishwords", base));

        assert_eq!(
            client.lookup("apple").await,
            LookupOutcome::SourceError(
                "request failed: HTTP 500 Internal Server Error".to_string()
            )
        );
    }
}
