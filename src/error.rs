//! Error types for phishing classification

use thiserror::Error;

/// Errors that can occur while configuring or running the classifier
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Lexicon document declares a schema this crate cannot read
    #[error("Unsupported lexicon schema version {found} (supported: {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    /// A phrase entry in the lexicon is malformed
    #[error("Invalid phrase in {set}: {details}")]
    InvalidPhrase { set: String, details: String },

    /// Phrase automaton could not be built
    #[error("Failed to build phrase matcher: {0}")]
    Matcher(String),

    /// Fusion policy constants are inconsistent
    #[error("Invalid policy configuration: {0}")]
    InvalidPolicy(String),

    /// Statistical adapter returned a pair that breaks its contract
    #[error("Invalid probability pair: {0}")]
    InvalidProbability(String),

    /// Model does not expose one of the expected class labels
    #[error("Model classes do not include {0:?}")]
    MissingClass(String),

    /// Model failed to produce a prediction
    #[error("Model failure: {0}")]
    Model(String),

    /// Malformed JSON document
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for classification operations
pub type Result<T> = std::result::Result<T, ClassifyError>;
