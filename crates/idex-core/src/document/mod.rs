//! Identity document field extraction module.

mod parser;
pub mod rules;
pub mod trace;

pub use parser::{DocumentParser, ExtractionResult, IdentityParser};
pub use trace::{ExtractionTrace, Stage, TraceEvent};

use crate::error::ExtractionError;
use crate::models::document::{DocumentType, ExtractedFields};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for identity field extractors.
pub trait IdentityExtractor {
    /// Extract identity fields from OCR text.
    fn extract_fields(&self, text: &str, document_type: DocumentType) -> Result<ExtractedFields>;
}

/// Extract identity fields with default settings, judging ages as of the
/// local date.
pub fn extract_identity(text: &str, document_type: DocumentType) -> Result<ExtractedFields> {
    IdentityParser::new().extract_fields(text, document_type)
}
