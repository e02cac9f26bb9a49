//! Core library for identity document field extraction.
//!
//! This crate provides:
//! - OCR confusion correction for dates and names
//! - Date candidate discovery and parsing across common notations
//! - Birthdate resolution with plausibility checks
//! - Document number, holder name and country extraction
//! - Diagnostic reports when a mandatory field cannot be found

pub mod document;
pub mod error;
pub mod models;

pub use document::{
    extract_identity, DocumentParser, ExtractionResult, ExtractionTrace, IdentityExtractor,
    IdentityParser, Stage,
};
pub use error::{ExtractionError, IdexError, Result};
pub use models::config::{CountryEntry, ExtractionConfig, IdexConfig, OutputConfig};
pub use models::document::{
    DocumentType, ExtractedFields, MissingField, NearMiss, NearMissReason, ParsedDate,
    RejectReason, RejectedCandidate,
};
