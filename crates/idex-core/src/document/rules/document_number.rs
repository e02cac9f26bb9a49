//! Document number extraction (passport, ID card and license numbers).

use std::ops::RangeInclusive;

use regex::Regex;

use crate::models::document::{NearMiss, NearMissReason, RejectReason};

use super::dates::parse_date_detailed;
use super::normalize::{normalize, prepare_text};
use super::patterns::{
    DOC_NUMBER_ALPHANUMERIC, DOC_NUMBER_COUNTRY_PREFIXED, DOC_NUMBER_DIGITS, DOC_NUMBER_GENERIC,
    DOC_NUMBER_LABELED, NUMBER_LIKE_TOKEN,
};
use super::{ExtractionMatch, FieldExtractor};

struct NumberRule {
    name: &'static str,
    pattern: &'static Regex,
    confidence: f32,
    length: RangeInclusive<usize>,
}

fn number_rules() -> [NumberRule; 5] {
    [
        NumberRule {
            name: "labeled",
            pattern: &*DOC_NUMBER_LABELED,
            confidence: 0.95,
            length: 6..=20,
        },
        NumberRule {
            name: "country_prefixed",
            pattern: &*DOC_NUMBER_COUNTRY_PREFIXED,
            confidence: 0.85,
            length: 7..=15,
        },
        NumberRule {
            name: "alphanumeric",
            pattern: &*DOC_NUMBER_ALPHANUMERIC,
            confidence: 0.75,
            length: 7..=15,
        },
        NumberRule {
            name: "digits",
            pattern: &*DOC_NUMBER_DIGITS,
            confidence: 0.6,
            length: 8..=12,
        },
        NumberRule {
            name: "generic",
            pattern: &*DOC_NUMBER_GENERIC,
            confidence: 0.5,
            length: 6..=15,
        },
    ]
}

/// Check whether a token can stand as a document number.
///
/// It must be at least 6 characters, must not read as a date, and must
/// mix letters with digits unless it is a run of 8 or more digits.
pub fn check_document_number(value: &str) -> Result<(), NearMissReason> {
    if value.chars().count() < 6 {
        return Err(NearMissReason::TooShort);
    }
    if parse_date_detailed(value) != Err(RejectReason::Unparsable) {
        return Err(NearMissReason::DateShaped);
    }

    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let all_digits = value.chars().all(|c| c.is_ascii_digit());

    if (has_letter && has_digit) || (all_digits && value.len() >= 8) {
        Ok(())
    } else {
        Err(NearMissReason::MissingLetterOrDigit)
    }
}

/// Document number field extractor.
pub struct DocumentNumberExtractor;

impl DocumentNumberExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Number-like tokens that did not qualify, with the reason each failed.
    pub fn near_misses(&self, text: &str) -> Vec<NearMiss> {
        let prepared = prepare_text(text);
        let mut misses: Vec<NearMiss> = Vec::new();

        for caps in NUMBER_LIKE_TOKEN.captures_iter(&prepared) {
            let token = caps[1].replace('-', "");
            if !token.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            if misses.iter().any(|m| m.text == token) {
                continue;
            }
            let reason = check_document_number(&token)
                .err()
                .unwrap_or(NearMissReason::NoLayoutMatch);
            misses.push(NearMiss { text: token, reason });
        }

        misses
    }
}

impl Default for DocumentNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DocumentNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let original = prepare_text(text);
        let normalized = prepare_text(&normalize(text));
        let mut variants = vec![original];
        if normalized != variants[0] {
            variants.push(normalized);
        }

        let mut results: Vec<Self::Output> = Vec::new();

        for rule in number_rules() {
            for prepared in &variants {
                for caps in rule.pattern.captures_iter(prepared) {
                    let Some(m) = caps.get(1) else {
                        continue;
                    };
                    let value = m.as_str().replace('-', "");

                    if !rule.length.contains(&value.len()) || check_document_number(&value).is_err()
                    {
                        continue;
                    }
                    if results.iter().any(|r| r.value == value) {
                        continue;
                    }

                    results.push(
                        ExtractionMatch::new(value, rule.confidence, m.as_str())
                            .with_position(m.start(), m.end())
                            .with_rule(rule.name),
                    );
                }
            }
        }

        results
    }
}

/// Extract the most likely document number.
pub fn extract_document_number(text: &str) -> Option<String> {
    DocumentNumberExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_number() {
        let extractor = DocumentNumberExtractor::new();
        let result = extractor
            .extract("PASSPORT JOHN SMITH PASSPORT NO AK1626595")
            .unwrap();
        assert_eq!(result.value, "AK1626595");
        assert_eq!(result.rule, "labeled");

        assert_eq!(
            extract_document_number("Passport No. : A1234567"),
            Some("A1234567".to_string())
        );
        assert_eq!(
            extract_document_number("ID NUMBER 12345678"),
            Some("12345678".to_string())
        );
    }

    #[test]
    fn test_country_prefixed_number() {
        let extractor = DocumentNumberExtractor::new();
        let result = extractor.extract("TYPE P KEN AK1626595").unwrap();
        assert_eq!(result.value, "AK1626595");
        assert_eq!(result.rule, "country_prefixed");
    }

    #[test]
    fn test_standalone_numbers() {
        assert_eq!(
            extract_document_number("holder b12345678x signature"),
            Some("B12345678X".to_string())
        );
        assert_eq!(
            extract_document_number("identity card 123456789"),
            Some("123456789".to_string())
        );
    }

    #[test]
    fn test_rejects_dates_and_short_tokens() {
        assert_eq!(extract_document_number("DOCUMENT NO 17OCT2001"), None);
        assert_eq!(extract_document_number("PASSPORT NO A1234"), None);
        assert_eq!(extract_document_number("PASSPORT NO ABCDEFGH"), None);
        assert_eq!(extract_document_number("BORN 15.01.1990"), None);
    }

    #[test]
    fn test_check_document_number() {
        assert_eq!(check_document_number("AK1626595"), Ok(()));
        assert_eq!(check_document_number("12345678"), Ok(()));
        assert_eq!(check_document_number("1234567"), Err(NearMissReason::MissingLetterOrDigit));
        assert_eq!(check_document_number("A123"), Err(NearMissReason::TooShort));
        assert_eq!(check_document_number("17OCT2001"), Err(NearMissReason::DateShaped));
    }

    #[test]
    fn test_near_misses() {
        let extractor = DocumentNumberExtractor::new();
        let misses = extractor.near_misses("PASSPORT NO A1234 ISSUED 17OCT2001 REF 9AB12345");
        assert_eq!(
            misses,
            vec![
                NearMiss { text: "A1234".to_string(), reason: NearMissReason::TooShort },
                NearMiss { text: "17OCT2001".to_string(), reason: NearMissReason::DateShaped },
                NearMiss { text: "9AB12345".to_string(), reason: NearMissReason::NoLayoutMatch },
            ]
        );
    }
}
