//! Error types for the RXGUARD safety engine.
//!
//! The enrichment pipeline itself never fails: degraded inputs produce fewer
//! findings, not errors. `SafetyError` covers the edges around it, namely
//! configuration, knowledge-base fetches and the draft parsing boundary.

use thiserror::Error;

/// The unified error type for the RXGUARD crates.
#[derive(Debug, Error)]
pub enum SafetyError {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A knowledge source could not deliver a collection.
    ///
    /// The provider treats this as "collection unavailable" and falls back.
    #[error("knowledge fetch from '{source_name}' failed: {reason}")]
    KnowledgeFetch { source_name: String, reason: String },

    /// A knowledge-base record carried a value outside its closed vocabulary.
    #[error("malformed knowledge entry: {reason}")]
    MalformedEntry { reason: String },

    /// A draft or patient document failed JSON Schema validation.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A document passed structural checks but could not be decoded into
    /// its typed form.
    #[error("failed to parse {document}: {reason}")]
    DraftParse { document: String, reason: String },

    /// Reading an input file failed.
    #[error("i/o error on '{path}': {reason}")]
    Io { path: String, reason: String },
}

/// Convenience alias used throughout the RXGUARD crates.
pub type SafetyResult<T> = Result<T, SafetyError>;
