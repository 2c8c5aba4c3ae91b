//! Error types for metadata gathering and serialization

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// The identifier does not resolve to any known resource.
    ///
    /// Fatal for a seed identifier; recoverable (skip and continue) for a
    /// reference discovered mid-walk.
    #[error("no resource found for guid '{0}'")]
    NotFound(String),

    /// A gatherer produced a tuple that is not a valid triple after
    /// normalization. Always a programming or data-integrity error; fails
    /// the whole walk.
    #[error("malformed triple: {0}")]
    MalformedTriple(String),

    /// The accumulated graph lacks information a format builder requires.
    #[error("cannot serialize metadata for {focus_iri}: {detail}")]
    Serialization { focus_iri: String, detail: String },

    /// The assembled DataCite document fails the structural schema check.
    /// Indicates a builder bug; never suppressed.
    #[error("datacite schema validation failed: {0}")]
    SchemaValidation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
