//! Holder name extraction.

use std::collections::HashSet;

use regex::Regex;

use crate::models::config::ExtractionConfig;

use super::normalize::{normalize, prepare_text};
use super::patterns::{
    FULL_NAME_LABEL, GIVEN_NAMES_LABEL, NAME_LABEL, PASSPORT_MARKER, SURNAME_LABEL, WHITESPACE,
};
use super::{clean_token, word_positions, ExtractionMatch, FieldExtractor};

/// Words that never form part of a holder name.
pub const DEFAULT_NAME_DENYLIST: &[&str] = &[
    // Document furniture
    "REPUBLIC", "GOVERNMENT", "PASSPORT", "PASSEPORT", "NATIONALITY", "CITIZENSHIP", "COUNTRY",
    "CODE", "TYPE", "DOCUMENT", "NUMBER", "SURNAME", "SURNAMES", "GIVEN", "NAME", "NAMES",
    "FULL", "FIRST", "LAST", "FAMILY", "FORENAME", "FORENAMES", "DATE", "BIRTH", "BORN",
    "PLACE", "ISSUE", "ISSUED", "ISSUING", "EXPIRY", "EXPIRES", "EXPIRATION", "AUTHORITY",
    "SIGNATURE", "HOLDER", "SEX", "MALE", "FEMALE", "NATIONAL", "IDENTITY", "CARD", "DRIVING",
    "DRIVER", "DRIVERS", "LICENCE", "LICENSE", "PERMIT", "SERIAL", "IMMIGRATION", "DEPARTMENT",
    "MINISTRY", "INTERIOR", "STATE", "THE", "AND", "FOR", "DOB", "VALID", "UNTIL",
    // Countries and demonyms
    "KENYA", "KENYAN", "UGANDA", "UGANDAN", "TANZANIA", "TANZANIAN", "NIGERIA", "NIGERIAN",
    "SOUTH", "AFRICA", "AFRICAN", "UNITED", "STATES", "AMERICA", "AMERICAN", "KINGDOM",
    "GREAT", "BRITAIN", "BRITISH",
    // Months
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "SEPT", "OCT", "NOV", "DEC",
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "JUNE", "JULY", "AUGUST", "SEPTEMBER", "OCTOBER",
    "NOVEMBER", "DECEMBER",
];

/// Words closing the name block that follows the PASSPORT header.
pub const DEFAULT_NAME_END_MARKERS: &[&str] = &["NATIONALITY", "CITIZENSHIP", "KENYAN"];

const MAX_NAME_WORDS: usize = 5;
const MIN_WORD_LEN: usize = 3;

/// Name field extractor.
#[derive(Debug, Clone)]
pub struct NameExtractor {
    denylist: HashSet<String>,
    end_markers: Vec<String>,
}

impl NameExtractor {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            denylist: config
                .name_denylist
                .iter()
                .map(|w| w.trim().to_uppercase())
                .collect(),
            end_markers: config
                .name_end_markers
                .iter()
                .map(|w| w.trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Add words to the denylist.
    pub fn with_denylist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denylist
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_uppercase()));
        self
    }

    fn is_name_word(&self, word: &str) -> bool {
        word.chars().count() >= MIN_WORD_LEN
            && word.chars().next().is_some_and(char::is_alphabetic)
            && word
                .chars()
                .all(|c| c.is_alphabetic() || c == '\'' || c == '-')
            && !self.denylist.contains(&word.to_uppercase())
    }

    /// Join `words` into a name if together they look like one.
    fn accept(&self, words: &[String]) -> Option<String> {
        if !(2..=MAX_NAME_WORDS).contains(&words.len()) {
            return None;
        }
        if !words.iter().all(|w| self.is_name_word(w)) {
            return None;
        }
        let name = words.join(" ").to_uppercase();
        (5..=60).contains(&name.chars().count()).then_some(name)
    }

    /// Leading name words of `text`, stopping at the first non-name token.
    fn take_name_words(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        for token in text.split_whitespace() {
            let word = clean_token(token);
            if word.is_empty() {
                if words.is_empty() {
                    continue;
                }
                break;
            }
            if !self.is_name_word(word) {
                break;
            }
            words.push(word.to_string());
            if words.len() == MAX_NAME_WORDS {
                break;
            }
        }
        words
    }

    fn words_after(&self, label: &Regex, text: &str) -> Option<Vec<String>> {
        label
            .find_iter(text)
            .map(|m| self.take_name_words(&text[m.end()..]))
            .find(|words| !words.is_empty())
    }

    fn from_labels(&self, text: &str) -> Option<(String, &'static str)> {
        if let Some(name) = self
            .words_after(&FULL_NAME_LABEL, text)
            .and_then(|w| self.accept(&w))
        {
            return Some((name, "full_name_label"));
        }

        let surname = self.words_after(&SURNAME_LABEL, text);
        let given = self.words_after(&GIVEN_NAMES_LABEL, text);

        if let (Some(given), Some(surname)) = (&given, &surname) {
            let mut words = given.clone();
            words.extend(surname.iter().cloned());
            if let Some(name) = self.accept(&words) {
                return Some((name, "given_and_surname"));
            }
        }

        for (words, rule) in [(surname, "surname_label"), (given, "given_names_label")] {
            if let Some(name) = words.and_then(|w| self.accept(&w)) {
                return Some((name, rule));
            }
        }

        self.words_after(&NAME_LABEL, text)
            .and_then(|w| self.accept(&w))
            .map(|name| (name, "name_label"))
    }

    /// Text between each PASSPORT header and the nearest end marker after it.
    fn passport_segments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        PASSPORT_MARKER
            .find_iter(text)
            .filter_map(|m| {
                let end = self
                    .end_markers
                    .iter()
                    .filter_map(|marker| word_positions(text, marker).find(|&pos| pos >= m.end()))
                    .min()?;
                Some(&text[m.end()..end])
            })
            .collect()
    }

    fn from_passport_block(&self, text: &str) -> Option<String> {
        self.passport_segments(text).into_iter().find_map(|segment| {
            let words = segment_words(segment);
            if (2..=3).contains(&words.len()) {
                self.accept(&words)
            } else {
                None
            }
        })
    }

    fn from_title_case(&self, text: &str) -> Option<String> {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(clean_token)
            .filter(|t| !t.is_empty())
            .collect();

        self.sliding_span(&tokens, is_title_case)
    }

    fn from_passport_window(&self, text: &str) -> Option<String> {
        self.passport_segments(text).into_iter().find_map(|segment| {
            let words = segment_words(segment);
            let tokens: Vec<&str> = words.iter().map(String::as_str).collect();
            self.sliding_span(&tokens, |_| true)
        })
    }

    /// First run of three, then two, consecutive tokens forming a name.
    fn sliding_span(&self, tokens: &[&str], shape: impl Fn(&str) -> bool) -> Option<String> {
        for start in 0..tokens.len() {
            for len in [3, 2] {
                let Some(span) = tokens.get(start..start + len) else {
                    continue;
                };
                if !span.iter().all(|t| shape(*t)) {
                    continue;
                }
                let words: Vec<String> = span.iter().map(|t| t.to_uppercase()).collect();
                if let Some(name) = self.accept(&words) {
                    return Some(name);
                }
            }
        }
        None
    }
}

impl Default for NameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NameExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let normalized = normalize(text);
        let prepared = [prepare_text(&normalized), prepare_text(text)];
        let spaced = [
            WHITESPACE.replace_all(normalized.trim(), " ").into_owned(),
            WHITESPACE.replace_all(text.trim(), " ").into_owned(),
        ];

        let mut found: Vec<(String, f32, &'static str)> = Vec::new();

        for variant in &prepared {
            if let Some((name, rule)) = self.from_labels(variant) {
                found.push((name, 0.9, rule));
            }
        }
        for variant in &prepared {
            if let Some(name) = self.from_passport_block(variant) {
                found.push((name, 0.8, "passport_block"));
            }
        }
        for variant in &spaced {
            if let Some(name) = self.from_title_case(variant) {
                found.push((name, 0.6, "title_case"));
            }
        }
        for variant in &prepared {
            if let Some(name) = self.from_passport_window(variant) {
                found.push((name, 0.5, "passport_window"));
            }
        }

        let mut results: Vec<Self::Output> = Vec::new();
        for (name, confidence, rule) in found {
            if results.iter().any(|r| r.value == name) {
                continue;
            }
            results.push(ExtractionMatch::new(name.clone(), confidence, name).with_rule(rule));
        }
        results
    }
}

fn segment_words(segment: &str) -> Vec<String> {
    segment
        .split_whitespace()
        .map(clean_token)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_title_case(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(char::is_uppercase)
        && chars.all(|c| c.is_lowercase() || c == '\'' || c == '-')
}

/// Extract the holder's full name, upper-cased.
pub fn extract_full_name(text: &str) -> Option<String> {
    NameExtractor::new().extract(text).map(|m| m.value)
}
