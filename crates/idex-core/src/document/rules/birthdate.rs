//! Birthdate resolution: keyword proximity first, whole document second.

use chrono::{Datelike, Days, Local, NaiveDate};
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::document::{ParsedDate, RejectReason, RejectedCandidate, MIN_YEAR};

use super::dates::{find_all_dates, parse_date_detailed};
use super::normalize::normalize;

/// Birthdate keywords, highest priority first. Colon-suffixed spellings
/// ("DOB:") are found through the bare keyword.
pub const DEFAULT_BIRTH_KEYWORDS: &[&str] = &["DATE OF BIRTH", "DOB", "BIRTH DATE", "BORN", "BIRTH"];

/// Limits a parsed date must respect to count as a birthdate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plausibility {
    /// Days a date may lie after today.
    pub future_tolerance_days: u64,
    /// Oldest accepted age in full years.
    pub max_age_years: i32,
}

impl Default for Plausibility {
    fn default() -> Self {
        Self {
            future_tolerance_days: 1,
            max_age_years: 150,
        }
    }
}

impl Plausibility {
    /// Check a date against the filter, naming the first rule it breaks.
    pub fn check(&self, date: &ParsedDate, today: NaiveDate) -> Result<(), RejectReason> {
        let birth = date.to_naive_date();

        let latest = today
            .checked_add_days(Days::new(self.future_tolerance_days))
            .unwrap_or(today);
        if birth > latest {
            return Err(RejectReason::FutureDate);
        }

        if birth.year() < MIN_YEAR {
            return Err(RejectReason::TooOld);
        }

        // Inside the tolerance window the holder is a newborn.
        let age = if birth > today { 0 } else { age_on(birth, today) };
        if age < 0 || age > self.max_age_years {
            return Err(RejectReason::AgeOutOfRange);
        }

        Ok(())
    }
}

/// Full years elapsed between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Default plausibility filter: not more than a day ahead, not before
/// 1900, age 0-150.
pub fn is_valid_birthdate(date: &ParsedDate, today: NaiveDate) -> bool {
    Plausibility::default().check(date, today).is_ok()
}

/// Where the resolved birthdate came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdateSource {
    /// Found near the given keyword.
    Keyword(String),
    /// Earliest plausible date anywhere in the document.
    Document,
}

/// Outcome of birthdate resolution.
#[derive(Debug, Clone, Default)]
pub struct BirthdateResolution {
    /// Chosen birthdate.
    pub date: Option<ParsedDate>,
    /// How it was found.
    pub source: Option<BirthdateSource>,
    /// Candidates looked at and turned down, in the order seen.
    pub rejected: Vec<RejectedCandidate>,
}

/// Picks the most likely birthdate out of OCR text.
#[derive(Debug, Clone)]
pub struct BirthdateResolver {
    keywords: Vec<String>,
    window_before: usize,
    window_after: usize,
    plausibility: Plausibility,
    today: NaiveDate,
}

impl BirthdateResolver {
    /// Resolver with default keywords and limits, judging ages as of `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::from_config(&ExtractionConfig::default(), today)
    }

    pub fn from_config(config: &ExtractionConfig, today: NaiveDate) -> Self {
        Self {
            keywords: config
                .birth_keywords
                .iter()
                .map(|k| k.trim().to_ascii_uppercase())
                .filter(|k| !k.is_empty())
                .collect(),
            window_before: config.keyword_window_before,
            window_after: config.keyword_window_after,
            plausibility: Plausibility {
                future_tolerance_days: config.future_tolerance_days.max(0) as u64,
                max_age_years: config.max_age_years,
            },
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Parse a candidate and apply the plausibility filter.
    pub fn evaluate(&self, candidate: &str) -> Result<ParsedDate, RejectedCandidate> {
        let date = parse_date_detailed(candidate).map_err(|reason| RejectedCandidate {
            text: candidate.to_string(),
            reason,
            parsed: None,
        })?;

        self.plausibility
            .check(&date, self.today)
            .map(|()| date)
            .map_err(|reason| RejectedCandidate {
                text: candidate.to_string(),
                reason,
                parsed: Some(date),
            })
    }

    /// Resolve the birthdate of a document.
    pub fn resolve(&self, text: &str) -> BirthdateResolution {
        let mut resolution = BirthdateResolution::default();

        // Same byte layout as `text`: normalization and ASCII upper-casing
        // are both length-preserving.
        let haystack = normalize(text).to_ascii_uppercase();

        for keyword in &self.keywords {
            for (pos, _) in haystack.match_indices(keyword.as_str()) {
                let window = window_around(
                    text,
                    pos,
                    pos + keyword.len(),
                    self.window_before,
                    self.window_after,
                );

                for candidate in find_all_dates(window) {
                    match self.evaluate(&candidate.text) {
                        Ok(date) => {
                            debug!("Birthdate {} found near keyword {:?}", date, keyword);
                            resolution.date = Some(date);
                            resolution.source = Some(BirthdateSource::Keyword(keyword.clone()));
                            return resolution;
                        }
                        Err(rejected) => push_unique(&mut resolution.rejected, rejected),
                    }
                }
            }
        }

        let mut accepted = Vec::new();
        for candidate in find_all_dates(text) {
            match self.evaluate(&candidate.text) {
                Ok(date) => accepted.push(date),
                Err(rejected) => push_unique(&mut resolution.rejected, rejected),
            }
        }

        // An earlier date is more likely a birthdate than an issue or
        // expiry date.
        if let Some(date) = accepted.into_iter().min() {
            debug!("Birthdate {} chosen as earliest date in document", date);
            resolution.date = Some(date);
            resolution.source = Some(BirthdateSource::Document);
        }

        resolution
    }

    /// Every date candidate in the document that fails to parse or fails
    /// the plausibility filter.
    pub fn rejected_candidates(&self, text: &str) -> Vec<RejectedCandidate> {
        let mut rejected = Vec::new();
        for candidate in find_all_dates(text) {
            if let Err(r) = self.evaluate(&candidate.text) {
                push_unique(&mut rejected, r);
            }
        }
        rejected
    }
}

/// Resolve a birthdate with default settings as of the local date.
pub fn resolve_birthdate(text: &str) -> Option<ParsedDate> {
    BirthdateResolver::new(Local::now().date_naive())
        .resolve(text)
        .date
}

fn push_unique(list: &mut Vec<RejectedCandidate>, candidate: RejectedCandidate) {
    if !list.iter().any(|c| c.text == candidate.text) {
        list.push(candidate);
    }
}

/// Slice `before` characters ahead of `start` through `after` characters
/// past `end`.
fn window_around(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(i, _)| end + i);
    &text[from..to]
}
