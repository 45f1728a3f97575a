//! Pipeline result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source produced an entry's gloss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlossSource {
    Dictionary,
    Model,
    /// Neither source produced a gloss; the text is a diagnostic placeholder
    Unresolved,
}

impl std::fmt::Display for GlossSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dictionary => write!(f, "dictionary"),
            Self::Model => write!(f, "model"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Final (word, gloss) pair, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub word: String,
    /// A real gloss, or a diagnostic placeholder when `source` is `Unresolved`
    pub gloss: String,
    pub source: GlossSource,
}

impl ResolvedEntry {
    pub fn is_resolved(&self) -> bool {
        self.source != GlossSource::Unresolved
    }
}

/// Counters for one `resolve` run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub total_words: usize,
    pub dictionary_found: usize,
    pub dictionary_not_found: usize,
    pub dictionary_errors: usize,
    pub model_resolved: usize,
    pub unresolved: usize,
    pub batches_attempted: usize,
    pub batches_failed: usize,
    /// Occurrences re-sent after the model omitted them
    pub retried_words: usize,
}

/// Entries plus run statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub entries: Vec<ResolvedEntry>,
    pub stats: EnrichmentStats,
    pub generated_at: DateTime<Utc>,
}

impl EnrichmentReport {
    /// The (word, gloss) sequence handed to a document renderer
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.word.as_str(), e.gloss.as_str()))
    }
}
