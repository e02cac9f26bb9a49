//! Common regex patterns for identity document extraction.
//!
//! Date templates used for searching are unanchored and carry no word
//! boundaries; callers check that a match is not glued to other digits.
//! Templates used for parsing a single candidate are anchored and expect
//! upper-case input.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date search templates, in discovery order.
    pub static ref DATE_DMY: Regex = Regex::new(
        r"(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})"
    ).unwrap();

    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)(\d{1,2})[\s./\-]*(JANUARY|FEBRUARY|MARCH|APRIL|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER|JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEPT|SEP|OCT|NOV|DEC)\.?[\s./\-,]*(\d{4}|\d{2})"
    ).unwrap();

    pub static ref DATE_SPACED: Regex = Regex::new(
        r"(\d{1,2})[ \t]+(\d{1,2})[ \t]+(\d{4})"
    ).unwrap();

    // Anchored parse templates.
    pub static ref PARSE_SPACED_MONTH: Regex = Regex::new(
        r"^(\d{1,2})\s*([A-Z0-9]{3,9}?)\.?\s*,?\s*(\d{4}|\d{2})$"
    ).unwrap();

    pub static ref PARSE_YMD: Regex = Regex::new(
        r"^(\d{4})[./\-\s]+(\d{1,2})[./\-\s]+(\d{1,2})$"
    ).unwrap();

    pub static ref PARSE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[./\-\s]+(\d{1,2})[./\-\s]+(\d{4}|\d{2})$"
    ).unwrap();

    pub static ref PARSE_SEPARATED_MONTH: Regex = Regex::new(
        r"^(\d{1,2})\s*[./\-]\s*([A-Z0-9]{3,9})\.?\s*[./\-]\s*(\d{4}|\d{2})$"
    ).unwrap();

    // Document number patterns, in priority order.
    pub static ref DOC_NUMBER_LABELED: Regex = Regex::new(
        r"\b(?:PASSPORT|DOCUMENT|DOC|ID|IDENTITY|CARD|LICEN[CS]E|SERIAL)\s*(?:NO\b|NUMBER\b|NUM\b|NR\b|#)\.?\s*[:#]?\s*([A-Z0-9][A-Z0-9\-]{4,19})"
    ).unwrap();

    pub static ref DOC_NUMBER_COUNTRY_PREFIXED: Regex = Regex::new(
        r"\b[A-Z]{2,4}\s+([A-Z]{1,3}\d{6,12})\b"
    ).unwrap();

    pub static ref DOC_NUMBER_ALPHANUMERIC: Regex = Regex::new(
        r"\b([A-Z]{1,3}\d[A-Z0-9]{5,13})\b"
    ).unwrap();

    pub static ref DOC_NUMBER_DIGITS: Regex = Regex::new(
        r"\b(\d{8,12})\b"
    ).unwrap();

    pub static ref DOC_NUMBER_GENERIC: Regex = Regex::new(
        r"\b(?:NO|NUMBER)\b\.?\s*[:#]?\s*([A-Z0-9]{6,15})\b"
    ).unwrap();

    pub static ref NUMBER_LIKE_TOKEN: Regex = Regex::new(
        r"\b([A-Z0-9][A-Z0-9\-]{3,19})\b"
    ).unwrap();

    // Name labels.
    pub static ref FULL_NAME_LABEL: Regex = Regex::new(
        r"\bFULL\s+NAMES?\b"
    ).unwrap();

    pub static ref SURNAME_LABEL: Regex = Regex::new(
        r"\b(?:SURNAMES?|LAST\s+NAME|FAMILY\s+NAME)\b"
    ).unwrap();

    pub static ref GIVEN_NAMES_LABEL: Regex = Regex::new(
        r"\b(?:GIVEN\s+NAMES?|FORENAMES?|FIRST\s+NAMES?)\b"
    ).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(
        r"\bNAMES?\b"
    ).unwrap();

    pub static ref PASSPORT_MARKER: Regex = Regex::new(
        r"\bPASSPORT\b"
    ).unwrap();

    // Country labels.
    pub static ref COUNTRY_LABEL: Regex = Regex::new(
        r"\b(?:COUNTRY\s+CODE|ISSUING\s+COUNTRY|COUNTRY\s+OF\s+ISSUE|NATIONALITY|CITIZENSHIP)\b\s*[:/.\-]?\s*"
    ).unwrap();

    pub static ref COUNTRY_CONTEXT: Regex = Regex::new(
        r"\b(?:COUNTRY|NATIONALITY|CITIZENSHIP|ISSUING|CODE)\b"
    ).unwrap();

    pub static ref THREE_LETTER_CODE: Regex = Regex::new(
        r"^([A-Z]{3})\b"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
