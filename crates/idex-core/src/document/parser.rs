//! Identity document parser combining the rule-based field extractors.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::document::{DocumentType, ExtractedFields};

use super::rules::birthdate::{BirthdateResolver, BirthdateSource};
use super::rules::diagnostics::{birthdate_report, document_number_report};
use super::rules::{
    normalize, CountryExtractor, DocumentNumberExtractor, FieldExtractor, NameExtractor,
};
use super::trace::{ExtractionTrace, Stage};
use super::{IdentityExtractor, Result};

/// Result of identity extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Missing optional fields.
    pub warnings: Vec<String>,
    /// Step-by-step record, empty unless tracing is enabled.
    pub trace: ExtractionTrace,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for identity document parsing.
pub trait DocumentParser {
    /// Parse identity fields from OCR text.
    fn parse(&self, text: &str, document_type: DocumentType) -> Result<ExtractionResult>;
}

/// Rule-based identity document parser.
///
/// Holds no mutable state; one instance can serve many threads.
pub struct IdentityParser {
    config: ExtractionConfig,
    /// Date ages are judged against. `None` means the local date at parse time.
    reference_date: Option<NaiveDate>,
    numbers: DocumentNumberExtractor,
    names: NameExtractor,
    countries: CountryExtractor,
}

impl IdentityParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self::from_config(ExtractionConfig::default())
    }

    pub fn from_config(config: ExtractionConfig) -> Self {
        Self {
            numbers: DocumentNumberExtractor::new(),
            names: NameExtractor::from_config(&config),
            countries: CountryExtractor::from_config(&config),
            reference_date: None,
            config,
        }
    }

    /// Replace the configuration, keeping the reference date.
    pub fn with_config(self, config: ExtractionConfig) -> Self {
        let reference_date = self.reference_date;
        Self {
            reference_date,
            ..Self::from_config(config)
        }
    }

    /// Judge birthdate plausibility as of `date` instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Set trace recording.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.config.trace = enabled;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for IdentityParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for IdentityParser {
    fn parse(&self, text: &str, document_type: DocumentType) -> Result<ExtractionResult> {
        let start = Instant::now();
        let today = self.today();
        let mut warnings = Vec::new();
        let mut trace = ExtractionTrace::new(self.config.trace);

        info!(
            "Extracting {} fields from {} characters of text",
            document_type,
            text.len()
        );

        let corrected = text
            .bytes()
            .zip(normalize(text).bytes())
            .filter(|(a, b)| a != b)
            .count();
        trace.record(Stage::Normalize, format!("characters corrected: {}", corrected));

        // Birthdate
        let resolver = BirthdateResolver::from_config(&self.config, today);
        let resolution = resolver.resolve(text);
        for rejected in &resolution.rejected {
            trace.record(
                Stage::Birthdate,
                format!("rejected \"{}\" ({})", rejected.text, rejected.reason),
            );
        }

        let Some(birthdate) = resolution.date else {
            let rejected = resolver.rejected_candidates(text);
            warn!(
                "No plausible birthdate among {} date candidates",
                rejected.len()
            );
            return Err(ExtractionError::MissingBirthdate {
                report: birthdate_report(&rejected),
                rejected,
            });
        };

        match &resolution.source {
            Some(BirthdateSource::Keyword(keyword)) => trace.record(
                Stage::Birthdate,
                format!("{} found near \"{}\"", birthdate, keyword),
            ),
            Some(BirthdateSource::Document) => trace.record(
                Stage::Birthdate,
                format!("{} is the earliest plausible date", birthdate),
            ),
            None => {}
        }

        // Document number
        let Some(number) = self.numbers.extract(text) else {
            let near_misses = self.numbers.near_misses(text);
            warn!(
                "No document number among {} number-like tokens",
                near_misses.len()
            );
            return Err(ExtractionError::MissingDocumentNumber {
                report: document_number_report(&near_misses),
                near_misses,
            });
        };
        trace.record(
            Stage::DocumentNumber,
            format!("{} from {} rule", number.value, number.rule),
        );

        // Optional fields
        let full_name = self.names.extract(text);
        match &full_name {
            Some(m) => trace.record(Stage::FullName, format!("{} from {} rule", m.value, m.rule)),
            None => warnings.push("Could not extract full name".to_string()),
        }

        let country = self.countries.extract(text);
        match &country {
            Some(m) => trace.record(Stage::Country, format!("{} from {} rule", m.value, m.rule)),
            None => warnings.push("Could not extract country".to_string()),
        }

        let fields = ExtractedFields {
            birthdate,
            document_number: number.value,
            document_type,
            full_name: full_name.map(|m| m.value),
            country: country.map(|m| m.value),
            raw_text: text.to_string(),
        };

        debug!(
            "Extracted {} {} with {} warnings",
            fields.document_type,
            fields.document_number,
            warnings.len()
        );

        Ok(ExtractionResult {
            fields,
            warnings,
            trace,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl IdentityExtractor for IdentityParser {
    fn extract_fields(&self, text: &str, document_type: DocumentType) -> Result<ExtractedFields> {
        self.parse(text, document_type).map(|r| r.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{MissingField, ParsedDate};
    use pretty_assertions::assert_eq;

    fn parser() -> IdentityParser {
        IdentityParser::new().with_reference_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    #[test]
    fn test_parse_passport() {
        let text = "PASSPORT JOHN SMITH NATIONALITY KEN DATE OF BIRTH: 15 JAN 1990 PASSPORT NO AK1626595";
        let result = parser().parse(text, DocumentType::Passport).unwrap();

        assert_eq!(result.fields.birthdate, ParsedDate::new(1990, 1, 15).unwrap());
        assert_eq!(result.fields.document_number, "AK1626595");
        assert_eq!(result.fields.full_name.as_deref(), Some("JOHN SMITH"));
        assert_eq!(result.fields.country.as_deref(), Some("KEN"));
        assert!(result.warnings.is_empty());
        assert!(result.trace.is_empty());
    }

    #[test]
    fn test_missing_optional_fields_are_warnings() {
        let result = parser()
            .parse("DOB 01.02.1985 ID NUMBER 12345678", DocumentType::NationalId)
            .unwrap();
        assert_eq!(result.fields.full_name, None);
        assert_eq!(result.fields.country, None);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_missing_birthdate_comes_first() {
        let err = parser()
            .parse("NOTHING USEFUL", DocumentType::Passport)
            .unwrap_err();
        assert_eq!(err.missing_field(), MissingField::Birthdate);
    }

    #[test]
    fn test_missing_document_number() {
        let err = parser()
            .parse("DATE OF BIRTH 15.01.1990 PASSPORT NO A1234", DocumentType::Passport)
            .unwrap_err();
        match err {
            ExtractionError::MissingDocumentNumber { near_misses, report } => {
                assert!(near_misses.iter().any(|m| m.text == "A1234"));
                assert!(report.contains("A1234"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trace_records_stages() {
        let text = "DATE OF BIRTH: 17 0CT 2001 PASSPORT NO AK1626595";
        let result = parser().with_trace(true).parse(text, DocumentType::Passport).unwrap();
        let stages: Vec<Stage> = result.trace.events().iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Normalize, Stage::Birthdate, Stage::DocumentNumber]
        );
        assert_eq!(result.trace.events()[0].message, "characters corrected: 1");
    }

    #[test]
    fn test_with_config_keeps_reference_date() {
        let text = "DOB 2026-10-10 PASSPORT NO AK1626595";
        let result = parser().parse(text, DocumentType::Passport).unwrap();
        assert_eq!(result.fields.birthdate, ParsedDate::new(2026, 10, 10).unwrap());

        let earlier = IdentityParser::new()
            .with_reference_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
            .with_config(ExtractionConfig::default());
        let err = earlier.parse(text, DocumentType::Passport).unwrap_err();
        assert_eq!(err.missing_field(), MissingField::Birthdate);
    }
}
