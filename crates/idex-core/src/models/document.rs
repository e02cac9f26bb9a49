//! Identity document data models.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Earliest year a parsed date may carry.
pub const MIN_YEAR: i32 = 1900;

/// Latest year a parsed date may carry.
pub const MAX_YEAR: i32 = 2100;

/// Kind of identity document the OCR text was taken from.
///
/// Currently only recorded on the output; extraction rules are the same
/// for every type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Passport booklet data page.
    Passport,
    /// National identity card.
    NationalId,
    /// Driver's license.
    DriverLicense,
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::Passport
    }
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::NationalId => "national_id",
            Self::DriverLicense => "driver_license",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passport" => Ok(Self::Passport),
            "national_id" | "national-id" | "id" => Ok(Self::NationalId),
            "driver_license" | "driver-license" | "dl" => Ok(Self::DriverLicense),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

/// A validated calendar date between 1900-01-01 and 2100-12-31.
///
/// Construction goes through [`ParsedDate::new`], so every value honours
/// month and day ranges including leap years. Ordering is chronological,
/// which coincides with the ordering of the canonical `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParsedDate {
    year: i32,
    month: u32,
    day: u32,
}

impl ParsedDate {
    /// Build a date, returning `None` when the triple is not a real
    /// calendar date or the year is out of range.
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self { year, month, day })
    }

    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month(), date.day())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn to_naive_date(&self) -> NaiveDate {
        // Validated in `new`.
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for ParsedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for ParsedDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date {:?}: {}", s, e))?;
        Self::from_naive(date).ok_or_else(|| format!("date out of range: {}", s))
    }
}

impl TryFrom<String> for ParsedDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParsedDate> for String {
    fn from(date: ParsedDate) -> Self {
        date.to_string()
    }
}

/// Which text a date candidate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Text after OCR confusion correction.
    Normalized,
    /// Text exactly as recognized.
    Original,
}

/// A date-shaped substring. Purely syntactic; not yet a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCandidate {
    /// Matched text.
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Pass that produced the candidate.
    pub source: CandidateSource,
}

/// Structured identity fields extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    /// Date of birth.
    pub birthdate: ParsedDate,

    /// Passport / card / license number.
    pub document_number: String,

    /// Declared document type.
    pub document_type: DocumentType,

    /// Holder's full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Issuing country or nationality code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// OCR text the fields were extracted from.
    pub raw_text: String,
}

/// Why a date candidate was not accepted as a birthdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Structurally a date, but not a real calendar date.
    InvalidDate,
    /// Later than today (beyond the allowed skew).
    FutureDate,
    /// Before 1900-01-01.
    TooOld,
    /// Implied age outside the accepted range.
    AgeOutOfRange,
    /// No date notation matched.
    Unparsable,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidDate => "invalid_date",
            Self::FutureDate => "future_date",
            Self::TooOld => "too_old",
            Self::AgeOutOfRange => "age_out_of_range",
            Self::Unparsable => "unparsable",
        }
    }

    /// Explanation shown in failure reports.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::InvalidDate => "not a valid calendar date",
            Self::FutureDate => "date is in the future",
            Self::TooOld => "date is before 1900-01-01",
            Self::AgeOutOfRange => "implied age is out of range",
            Self::Unparsable => "could not be read as a date",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A date candidate rejected during birthdate resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    /// Candidate text as found.
    pub text: String,
    /// Rejection reason.
    pub reason: RejectReason,
    /// The calendar reading, when the candidate parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<ParsedDate>,
}

/// Why a number-like token was not accepted as a document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearMissReason {
    /// Fewer than six characters.
    TooShort,
    /// Reads as a date.
    DateShaped,
    /// Neither mixed letters and digits nor a long digit run.
    MissingLetterOrDigit,
    /// Well-formed, but not in any recognised document number layout.
    NoLayoutMatch,
}

impl NearMissReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::TooShort => "shorter than 6 characters",
            Self::DateShaped => "looks like a date",
            Self::MissingLetterOrDigit => "needs letters and digits, or at least 8 digits",
            Self::NoLayoutMatch => "not in a recognised document number layout",
        }
    }
}

/// A token that almost qualified as a document number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMiss {
    pub text: String,
    pub reason: NearMissReason,
}

/// Mandatory output fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Birthdate,
    DocumentNumber,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Birthdate => "missing_birthdate",
            Self::DocumentNumber => "missing_document_number",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
