// src/error.rs

use thiserror::Error;

/// Failures surfaced by the store. Expected misses (pattern misses, failed
/// normalization, unknown ids) are modeled as data, not errors — only real
/// faults end up here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode field list: {0}")]
    Json(#[from] serde_json::Error),

    /// A job was asked to transition to Verified without its required
    /// fields. Recoverable: the caller shows the list and the user fills
    /// the gaps.
    #[error("job is missing required fields: {0:?}")]
    MissingRequiredFields(Vec<String>),
}

/// A stored enumeration label that matches no known member. Indicates a
/// migration or hand-edit problem, so reads fail loudly instead of
/// coercing.
#[derive(Debug, Error)]
#[error("unknown {kind} label in storage: {value:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLabel {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        UnknownLabel {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
