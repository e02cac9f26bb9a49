//! Configuration structures for the extraction engine.

use serde::{Deserialize, Serialize};

use crate::document::rules::birthdate::DEFAULT_BIRTH_KEYWORDS;
use crate::document::rules::country::default_country_table;
use crate::document::rules::name::{DEFAULT_NAME_DENYLIST, DEFAULT_NAME_END_MARKERS};
use crate::error::{IdexError, Result};

/// Main configuration for the idex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdexConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output formatting configuration.
    pub output: OutputConfig,
}

/// Known country, addressed by its output code and the spellings that
/// identify it in OCR text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    /// Code reported in the extracted fields (e.g. "KEN").
    pub code: String,

    /// Upper-case spellings mapped to `code`, longest first.
    pub aliases: Vec<String>,
}

impl CountryEntry {
    pub fn new(code: &str, aliases: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Identity field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Birthdate keywords, highest priority first.
    pub birth_keywords: Vec<String>,

    /// Characters searched before a birthdate keyword.
    pub keyword_window_before: usize,

    /// Characters searched after a birthdate keyword.
    pub keyword_window_after: usize,

    /// Days a birthdate may lie in the future (timezone skew).
    pub future_tolerance_days: i64,

    /// Oldest accepted holder age in years.
    pub max_age_years: i32,

    /// Words that disqualify a name candidate.
    pub name_denylist: Vec<String>,

    /// Words that end the name block following the PASSPORT header.
    pub name_end_markers: Vec<String>,

    /// Known countries and their spellings.
    pub countries: Vec<CountryEntry>,

    /// Max distance between a bare 3-letter code and a country keyword.
    pub country_context_distance: usize,

    /// Leading span of the document in which a bare 3-letter code is trusted.
    pub country_header_span: usize,

    /// Code reported when it appears as a bare token and nothing else matched.
    pub country_fallback: Option<String>,

    /// Record a diagnostic trace alongside the result.
    pub trace: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            birth_keywords: DEFAULT_BIRTH_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            keyword_window_before: 75,
            keyword_window_after: 150,
            future_tolerance_days: 1,
            max_age_years: 150,
            name_denylist: DEFAULT_NAME_DENYLIST.iter().map(|w| w.to_string()).collect(),
            name_end_markers: DEFAULT_NAME_END_MARKERS.iter().map(|w| w.to_string()).collect(),
            countries: default_country_table(),
            country_context_distance: 20,
            country_header_span: 100,
            country_fallback: None,
            trace: false,
        }
    }
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Include the OCR text in JSON output.
    pub include_raw_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: false,
            include_raw_text: true,
        }
    }
}

impl IdexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        if extraction.birth_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(IdexError::Config("birth keywords must not be empty".to_string()));
        }
        if extraction.max_age_years < 0 {
            return Err(IdexError::Config("max_age_years must not be negative".to_string()));
        }
        if extraction.future_tolerance_days < 0 {
            return Err(IdexError::Config(
                "future_tolerance_days must not be negative".to_string(),
            ));
        }
        if let Some(entry) = extraction.countries.iter().find(|c| c.code.trim().is_empty()) {
            return Err(IdexError::Config(format!(
                "country entry with aliases {:?} has no code",
                entry.aliases
            )));
        }
        Ok(())
    }
}
