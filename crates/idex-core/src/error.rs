//! Error types for the idex-core library.

use thiserror::Error;

use crate::models::document::{MissingField, NearMiss, RejectedCandidate};

/// Main error type for the idex library.
#[derive(Error, Debug)]
pub enum IdexError {
    /// Identity field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A mandatory identity field could not be extracted.
///
/// Only these two failures ever reach the caller. Individual rejected
/// candidates are carried inside the variant together with the
/// human-readable report built by the diagnostics module.
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    /// No date candidate passed the birthdate plausibility filter.
    #[error("missing birthdate\n{report}")]
    MissingBirthdate {
        report: String,
        rejected: Vec<RejectedCandidate>,
    },

    /// No pattern produced a qualifying document number.
    #[error("missing document number\n{report}")]
    MissingDocumentNumber {
        report: String,
        near_misses: Vec<NearMiss>,
    },
}

impl ExtractionError {
    /// Which mandatory field was missing.
    pub fn missing_field(&self) -> MissingField {
        match self {
            Self::MissingBirthdate { .. } => MissingField::Birthdate,
            Self::MissingDocumentNumber { .. } => MissingField::DocumentNumber,
        }
    }

    /// The multi-line diagnostic message.
    pub fn report(&self) -> &str {
        match self {
            Self::MissingBirthdate { report, .. } => report,
            Self::MissingDocumentNumber { report, .. } => report,
        }
    }
}

/// Result type for the idex library.
pub type Result<T> = std::result::Result<T, IdexError>;
