//! Issuing country / nationality extraction.

use crate::models::config::{CountryEntry, ExtractionConfig};

use super::normalize::{normalize, prepare_text};
use super::patterns::{COUNTRY_CONTEXT, COUNTRY_LABEL, THREE_LETTER_CODE};
use super::{word_positions, ExtractionMatch, FieldExtractor};

/// Three-letter words that follow a country label without being codes.
const NON_CODES: &[&str] = &["THE", "AND", "FOR", "SEX", "DOB", "NON", "NIL", "NONE"];

/// Countries recognized out of the box.
pub fn default_country_table() -> Vec<CountryEntry> {
    vec![
        CountryEntry::new("KEN", &["KENYA", "KENYAN", "KEN"]),
        CountryEntry::new("UGA", &["UGANDA", "UGANDAN", "UGA"]),
        CountryEntry::new("TZA", &["TANZANIA", "TANZANIAN", "TZA"]),
        CountryEntry::new(
            "USA",
            &["UNITED STATES OF AMERICA", "UNITED STATES", "USA"],
        ),
        CountryEntry::new("UK", &["UNITED KINGDOM", "GREAT BRITAIN", "GBR", "UK"]),
        CountryEntry::new("NGA", &["NIGERIA", "NIGERIAN", "NGA"]),
        CountryEntry::new("ZAF", &["SOUTH AFRICA", "ZAF"]),
    ]
}

/// Country field extractor.
#[derive(Debug, Clone)]
pub struct CountryExtractor {
    table: Vec<CountryEntry>,
    context_distance: usize,
    header_span: usize,
    fallback: Option<String>,
}

impl CountryExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        let table = config
            .countries
            .iter()
            .map(|entry| CountryEntry {
                code: entry.code.trim().to_uppercase(),
                aliases: entry
                    .aliases
                    .iter()
                    .map(|a| a.trim().to_uppercase())
                    .filter(|a| !a.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            table,
            context_distance: config.country_context_distance,
            header_span: config.country_header_span,
            fallback: config.country_fallback.as_ref().map(|c| c.trim().to_uppercase()),
        }
    }

    /// Report `code` when it appears as a bare token and nothing else matched.
    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        self.fallback = Some(code.into().to_uppercase());
        self
    }

    /// Country whose alias starts `text`, longest alias first.
    fn leading_alias(&self, text: &str) -> Option<&str> {
        let mut aliases: Vec<(&str, &str)> = self
            .table
            .iter()
            .flat_map(|entry| {
                entry
                    .aliases
                    .iter()
                    .map(move |alias| (alias.as_str(), entry.code.as_str()))
            })
            .collect();
        aliases.sort_by_key(|(alias, _)| std::cmp::Reverse(alias.len()));

        aliases.into_iter().find_map(|(alias, code)| {
            let rest = text.strip_prefix(alias)?;
            let bounded = !rest.chars().next().is_some_and(char::is_alphanumeric);
            bounded.then_some(code)
        })
    }

    fn from_label(&self, text: &str) -> Option<String> {
        COUNTRY_LABEL.find_iter(text).find_map(|m| {
            let after = &text[m.end()..];
            if let Some(code) = self.leading_alias(after) {
                return Some(code.to_string());
            }
            let caps = THREE_LETTER_CODE.captures(after)?;
            let code = &caps[1];
            (!NON_CODES.contains(&code)).then(|| code.to_string())
        })
    }

    fn from_table(&self, text: &str) -> Option<String> {
        for entry in &self.table {
            for alias in &entry.aliases {
                let short = alias.chars().count() <= 3;
                let found = word_positions(text, alias)
                    .any(|pos| !short || self.in_context(text, pos, pos + alias.len()));
                if found {
                    return Some(entry.code.clone());
                }
            }
        }
        None
    }

    /// A short code counts when it sits in the document header or close
    /// to a country keyword.
    fn in_context(&self, text: &str, start: usize, end: usize) -> bool {
        if text[..start].chars().count() < self.header_span {
            return true;
        }

        COUNTRY_CONTEXT.find_iter(text).any(|m| {
            let gap = if m.end() <= start {
                text[m.end()..start].chars().count()
            } else if m.start() >= end {
                text[end..m.start()].chars().count()
            } else {
                0
            };
            gap <= self.context_distance
        })
    }

    fn from_fallback(&self, text: &str) -> Option<String> {
        let code = self.fallback.as_ref()?;
        word_positions(text, code).next().map(|_| code.clone())
    }
}

impl Default for CountryExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CountryExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let original = prepare_text(text);
        let normalized = prepare_text(&normalize(text));

        let mut found: Vec<(String, f32, &'static str)> = Vec::new();
        for prepared in [&original, &normalized] {
            if let Some(code) = self.from_label(prepared) {
                found.push((code, 0.95, "country_label"));
            }
        }
        for prepared in [&original, &normalized] {
            if let Some(code) = self.from_table(prepared) {
                found.push((code, 0.8, "known_country"));
            }
        }
        if let Some(code) = self.from_fallback(&original) {
            found.push((code, 0.4, "fallback_code"));
        }

        let mut results: Vec<Self::Output> = Vec::new();
        for (code, confidence, rule) in found {
            if results.iter().any(|r| r.value == code) {
                continue;
            }
            results.push(ExtractionMatch::new(code.clone(), confidence, code).with_rule(rule));
        }
        results
    }
}

/// Extract the issuing country or nationality code.
pub fn extract_country(text: &str) -> Option<String> {
    CountryExtractor::new().extract(text).map(|m| m.value)
}
