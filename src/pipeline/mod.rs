//! Enrichment pipeline
//!
//! Resolves an ordered word list in two passes over a position-indexed slot
//! vector:
//!
//! ```text
//! words ─► DictionarySource (per word) ─► Found ───────────────► slot[i]
//!                                      └► NotFound / SourceError
//!                                           │
//!                                           ▼
//!                           BatchTranslator (chunks of ≤ 20) ─► slot[i]
//! ```
//!
//! Every input occurrence gets exactly one entry, in input order. Lookups may
//! complete concurrently but are recombined by position; model batches run
//! one at a time so a failure is attributable to exactly one batch.

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::config::{GlossConfig, OmittedWordPolicy};
use crate::dictionary::{DictionarySource, LookupOutcome};
use crate::translator::{BatchOutcome, BatchTranslator, NO_GLOSS_PLACEHOLDER};

pub use types::{EnrichmentReport, EnrichmentStats, GlossSource, ResolvedEntry};

/// Orchestrates the dictionary and model sources
pub struct EnrichmentPipeline {
    dictionary: Arc<dyn DictionarySource>,
    translator: BatchTranslator,
    lookup_concurrency: usize,
    omitted_word_policy: OmittedWordPolicy,
}

/// A word waiting for the fallback source
struct PendingSlot {
    index: usize,
    word: String,
}

impl EnrichmentPipeline {
    /// Sequential lookups, placeholder for omitted words
    pub fn new(dictionary: Arc<dyn DictionarySource>, translator: BatchTranslator) -> Self {
        Self {
            dictionary,
            translator,
            lookup_concurrency: 1,
            omitted_word_policy: OmittedWordPolicy::Placeholder,
        }
    }

    /// Build a pipeline with chunking, concurrency and retry policy from config
    pub fn from_config(
        config: &GlossConfig,
        dictionary: Arc<dyn DictionarySource>,
        translator: BatchTranslator,
    ) -> Self {
        Self::new(
            dictionary,
            translator.with_chunk_size(config.pipeline.chunk_size),
        )
        .with_lookup_concurrency(config.pipeline.lookup_concurrency)
        .with_omitted_word_policy(config.pipeline.omitted_word_policy)
    }

    /// Allow up to `n` dictionary lookups in flight (minimum 1)
    pub fn with_lookup_concurrency(mut self, n: usize) -> Self {
        self.lookup_concurrency = n.max(1);
        self
    }

    pub fn with_omitted_word_policy(mut self, policy: OmittedWordPolicy) -> Self {
        self.omitted_word_policy = policy;
        self
    }

    /// Resolve every word; output has the input's length and order
    pub async fn resolve(&self, words: &[String]) -> Vec<ResolvedEntry> {
        self.resolve_with_report(words).await.entries
    }

    /// Resolve every word and report how each source performed
    pub async fn resolve_with_report(&self, words: &[String]) -> EnrichmentReport {
        let mut stats = EnrichmentStats {
            total_words: words.len(),
            ..EnrichmentStats::default()
        };
        tracing::info!(
            words = words.len(),
            source = self.dictionary.source_name(),
            concurrency = self.lookup_concurrency,
            "Starting dictionary pass"
        );

        // Pass 1: primary source
        let outcomes = self.lookup_all(words).await;
        let mut slots: Vec<Option<(String, GlossSource)>> = vec![None; words.len()];
        let mut pending: Vec<PendingSlot> = Vec::new();

        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                LookupOutcome::Found(gloss) => {
                    stats.dictionary_found += 1;
                    slots[index] = Some((gloss, GlossSource::Dictionary));
                }
                LookupOutcome::NotFound => {
                    stats.dictionary_not_found += 1;
                    pending.push(PendingSlot {
                        index,
                        word: words[index].clone(),
                    });
                }
                LookupOutcome::SourceError(message) => {
                    stats.dictionary_errors += 1;
                    tracing::debug!(word = %words[index], %message, "Routing to fallback");
                    pending.push(PendingSlot {
                        index,
                        word: words[index].clone(),
                    });
                }
            }
        }

        // Pass 2: fallback source
        if !pending.is_empty() {
            self.resolve_pending(&pending, &mut slots, &mut stats).await;
        }

        let entries: Vec<ResolvedEntry> = words
            .iter()
            .zip(slots)
            .map(|(word, slot)| {
                let (gloss, source) = slot.unwrap_or_else(|| {
                    (NO_GLOSS_PLACEHOLDER.to_string(), GlossSource::Unresolved)
                });
                ResolvedEntry {
                    word: word.clone(),
                    gloss,
                    source,
                }
            })
            .collect();

        stats.unresolved = entries.iter().filter(|e| !e.is_resolved()).count();
        tracing::info!(
            total = stats.total_words,
            dictionary = stats.dictionary_found,
            model = stats.model_resolved,
            unresolved = stats.unresolved,
            batches_failed = stats.batches_failed,
            "Enrichment complete"
        );

        EnrichmentReport {
            entries,
            stats,
            generated_at: Utc::now(),
        }
    }

    /// Look every word up, recombining results in input order
    async fn lookup_all(&self, words: &[String]) -> Vec<LookupOutcome> {
        let dictionary = &self.dictionary;
        stream::iter(words.iter().map(|word| dictionary.lookup(word)))
            .buffered(self.lookup_concurrency)
            .collect()
            .await
    }

    async fn resolve_pending(
        &self,
        pending: &[PendingSlot],
        slots: &mut [Option<(String, GlossSource)>],
        stats: &mut EnrichmentStats,
    ) {
        let chunk_size = self.translator.chunk_size();
        let pending_words: Vec<String> = pending.iter().map(|p| p.word.clone()).collect();
        tracing::info!(
            pending = pending_words.len(),
            chunk_size,
            "Starting fallback pass"
        );

        let batches = self.translator.translate_all(&pending_words).await;
        stats.batches_attempted += batches.len();
        stats.batches_failed += batches.iter().filter(|b| b.is_failed()).count();

        let mut table = merge_replies(&batches);

        if self.omitted_word_policy == OmittedWordPolicy::RetryOnce {
            let omitted: Vec<String> = pending
                .iter()
                .enumerate()
                .filter(|(k, p)| {
                    !batches[k / chunk_size].is_failed() && !table.contains_key(&p.word)
                })
                .map(|(_, p)| p.word.clone())
                .collect();

            if !omitted.is_empty() {
                tracing::info!(words = omitted.len(), "Retrying words the model omitted");
                stats.retried_words += omitted.len();
                let retries = self.translator.translate_all(&omitted).await;
                stats.batches_attempted += retries.len();
                stats.batches_failed += retries.iter().filter(|b| b.is_failed()).count();
                for (word, meaning) in merge_replies(&retries) {
                    table.entry(word).or_insert(meaning);
                }
            }
        }

        for (k, slot) in pending.iter().enumerate() {
            let resolved = match table.get(&slot.word) {
                Some(meaning) => {
                    stats.model_resolved += 1;
                    (meaning.clone(), GlossSource::Model)
                }
                None => {
                    let placeholder = match batches[k / chunk_size].gloss_for(&slot.word) {
                        Err(placeholder) => placeholder,
                        Ok(_) => NO_GLOSS_PLACEHOLDER.to_string(),
                    };
                    (placeholder, GlossSource::Unresolved)
                }
            };
            slots[slot.index] = Some(resolved);
        }
    }
}

/// Merge every replied batch into one word -> meaning table; first reply wins
fn merge_replies(batches: &[BatchOutcome]) -> HashMap<String, String> {
    let mut table = HashMap::new();
    for batch in batches {
        if let BatchOutcome::Replied(reply) = batch {
            for (word, meaning) in &reply.meanings {
                table
                    .entry(word.clone())
                    .or_insert_with(|| meaning.clone());
            }
        }
    }
    table
}
