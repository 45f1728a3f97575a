//! Dictation gloss enrichment
//!
//! Turns an ordered list of English words and phrases into (word, gloss)
//! pairs for printing dictation sheets. A per-word dictionary service is the
//! primary source; words it cannot resolve are sent to a generative model in
//! batches of at most 20.
//!
//! ## Architecture
//!
//! ```text
//! word list → EnrichmentPipeline ─► DictionarySource (per word)
//!                                └► BatchTranslator (≤ 20 words per LlmClient call)
//!           → ordered ResolvedEntry list → export
//! ```
//!
//! Every input occurrence yields exactly one entry, in input order. Failures
//! stay local to the word or batch that hit them and show up as diagnostic
//! placeholder glosses.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod llm;
pub mod pipeline;
pub mod translator;
pub mod words;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::{GlossConfig, OmittedWordPolicy, MAX_CHUNK_SIZE};
pub use dictionary::{DictionaryClient, DictionarySource, LookupOutcome};
pub use error::{GlossError, Result};
pub use export::{export_to_path, write_export, ExportFormat};
pub use llm::{LlmClient, OpenAiCompatibleClient};
pub use pipeline::{EnrichmentPipeline, EnrichmentReport, GlossSource, ResolvedEntry};
pub use translator::{BatchOutcome, BatchTranslator, ModelReply};
pub use words::load_word_list;
