//! Primary gloss source: per-word dictionary lookups
//!
//! This module provides:
//! - API types and response classification for the dictionary service
//! - HTTP client implementing `DictionarySource`

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::DictionaryClient;
pub use types::{classify_body, LookupOutcome};

/// A per-word gloss source.
///
/// Implementations never fail: transport and payload problems are reported
/// as `LookupOutcome::SourceError` so the caller can route the word onward.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    async fn lookup(&self, word: &str) -> LookupOutcome;

    /// Name for logging
    fn source_name(&self) -> &str;
}
