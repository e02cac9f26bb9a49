//! Rule-based field extractors for identity documents.

pub mod birthdate;
pub mod country;
pub mod dates;
pub mod diagnostics;
pub mod document_number;
pub mod name;
pub mod normalize;
pub mod patterns;

pub use birthdate::{is_valid_birthdate, resolve_birthdate, BirthdateResolution, BirthdateResolver};
pub use country::{extract_country, CountryExtractor};
pub use dates::{find_all_dates, parse_date, parse_date_detailed};
pub use diagnostics::build_failure_report;
pub use document_number::{extract_document_number, DocumentNumberExtractor};
pub use name::{extract_full_name, NameExtractor};
pub use normalize::{normalize, prepare_text};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
    /// Name of the rule that produced the match.
    pub rule: &'static str,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
            rule: "",
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_rule(mut self, rule: &'static str) -> Self {
        self.rule = rule;
        self
    }
}

/// Byte offsets of `word` in `text` where it stands as a whole word.
pub(crate) fn word_positions<'a>(text: &'a str, word: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(word).filter_map(move |(start, _)| {
        let end = start + word.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        let bounded = !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(char::is_alphanumeric);
        bounded.then_some(start)
    })
}

/// Strip punctuation OCR tends to glue onto words.
pub(crate) fn clean_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}
