//! Error types for the gloss pipeline
//!
//! Only input, configuration and export failures are fatal. Source failures
//! (`TransportFailure`, `MalformedResponse`, `BatchParseFailure`) are caught at
//! the word or batch that produced them and turned into outcomes.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlossError>;

#[derive(Error, Debug)]
pub enum GlossError {
    #[error("request failed: {0}")]
    TransportFailure(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unparseable reply: {0}")]
    BatchParseFailure(String),

    #[error("no words found in {source_name}")]
    EmptyInput { source_name: String },

    #[error("failed to read word list {path}: {source}")]
    InputRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<reqwest::Error> for GlossError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GlossError::TransportFailure("timed out".to_string())
        } else if e.is_connect() {
            GlossError::TransportFailure("connection error".to_string())
        } else if let Some(status) = e.status() {
            GlossError::TransportFailure(format!("HTTP {}", status))
        } else if e.is_decode() {
            GlossError::MalformedResponse("undecodable body".to_string())
        } else {
            GlossError::TransportFailure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        assert_eq!(
            GlossError::TransportFailure("timed out".into()).to_string(),
            "request failed: timed out"
        );
        assert_eq!(
            GlossError::MalformedResponse("missing field `code`".into()).to_string(),
            "malformed response: missing field `code`"
        );
        assert_eq!(
            GlossError::BatchParseFailure("empty reply".into()).to_string(),
            "unparseable reply: empty reply"
        );
        assert_eq!(
            GlossError::EmptyInput {
                source_name: "word.txt".into()
            }
            .to_string(),
            "no words found in word.txt"
        );
    }
}
