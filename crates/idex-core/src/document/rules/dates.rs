//! Date candidate discovery and date parsing.

use chrono::NaiveDate;
use regex::Regex;

use crate::models::document::{
    CandidateSource, DateCandidate, ParsedDate, RejectReason, MAX_YEAR, MIN_YEAR,
};

use super::normalize::{correct_month_token, normalize};
use super::patterns::{
    DATE_DAY_MONTH_NAME, DATE_DMY, DATE_SPACED, DATE_YMD, PARSE_DMY, PARSE_SEPARATED_MONTH,
    PARSE_SPACED_MONTH, PARSE_YMD,
};

const MONTH_NAMES: [&str; 12] = [
    "JANUARY",
    "FEBRUARY",
    "MARCH",
    "APRIL",
    "MAY",
    "JUNE",
    "JULY",
    "AUGUST",
    "SEPTEMBER",
    "OCTOBER",
    "NOVEMBER",
    "DECEMBER",
];

/// Letters an OCR engine commonly reads as the given digit.
const DIGIT_CONFUSIONS: &[(char, &str)] = &[
    ('0', "ODQ"),
    ('1', "IJL"),
    ('2', "Z"),
    ('4', "A"),
    ('5', "S"),
    ('6', "G"),
    ('7', "T"),
    ('8', "B"),
];

type Reading = (i32, u32, u32);

fn search_templates() -> [&'static Regex; 4] {
    [&*DATE_DMY, &*DATE_YMD, &*DATE_DAY_MONTH_NAME, &*DATE_SPACED]
}

/// Find every date-shaped substring in normalized and original text.
///
/// Candidates keep discovery order: the normalized pass first, then the
/// original pass; within a pass, template order and then position.
/// Identical spellings are reported once.
pub fn find_all_dates(text: &str) -> Vec<DateCandidate> {
    let normalized = normalize(text);
    let mut candidates = Vec::new();

    collect_candidates(&normalized, CandidateSource::Normalized, &mut candidates);
    collect_candidates(text, CandidateSource::Original, &mut candidates);

    candidates
}

fn collect_candidates(text: &str, source: CandidateSource, out: &mut Vec<DateCandidate>) {
    for template in search_templates() {
        for m in template.find_iter(text) {
            if !is_isolated(text, m.start(), m.end()) {
                continue;
            }
            if out.iter().any(|c| c.text == m.as_str()) {
                continue;
            }
            out.push(DateCandidate {
                text: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
                source,
            });
        }
    }
}

/// The match must not continue a longer digit run on either side.
fn is_isolated(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}

/// Parse one candidate into a calendar date.
pub fn parse_date(candidate: &str) -> Option<ParsedDate> {
    parse_date_detailed(candidate).ok()
}

/// Parse one candidate, reporting why it failed.
///
/// Notations are tried in a fixed order and the first one that matches
/// structurally decides the outcome:
/// 1. day, month name, year joined by spaces (or nothing)
/// 2. `YYYY-MM-DD`
/// 3. numeric day/month/year, day-first on ties
/// 4. day, month name, year joined by `-`, `.` or `/`
///
/// A real calendar date outside 1900-2100 is reported as `TooOld` or
/// `FutureDate` rather than `InvalidDate`.
pub fn parse_date_detailed(candidate: &str) -> Result<ParsedDate, RejectReason> {
    let text = candidate.trim().to_uppercase();

    let readings = parse_month_name(&PARSE_SPACED_MONTH, &text)
        .or_else(|| parse_year_first(&text))
        .or_else(|| parse_day_month_numeric(&text))
        .or_else(|| parse_month_name(&PARSE_SEPARATED_MONTH, &text))
        .ok_or(RejectReason::Unparsable)?;

    if let Some(date) = readings
        .iter()
        .find_map(|&(year, month, day)| ParsedDate::new(year, month, day))
    {
        return Ok(date);
    }

    let out_of_range = readings
        .iter()
        .find(|&&(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).is_some());
    match out_of_range {
        Some(&(year, _, _)) if year < MIN_YEAR => Err(RejectReason::TooOld),
        Some(&(year, _, _)) if year > MAX_YEAR => Err(RejectReason::FutureDate),
        _ => Err(RejectReason::InvalidDate),
    }
}

fn parse_month_name(pattern: &Regex, text: &str) -> Option<Vec<Reading>> {
    let caps = pattern.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = resolve_month(&caps[2])?;
    let year = expand_year(&caps[3])?;
    Some(vec![(year, month, day)])
}

fn parse_year_first(text: &str) -> Option<Vec<Reading>> {
    let caps = PARSE_YMD.captures(text)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    Some(vec![(year, month, day)])
}

fn parse_day_month_numeric(text: &str) -> Option<Vec<Reading>> {
    let caps = PARSE_DMY.captures(text)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year = expand_year(&caps[3])?;

    let readings = match (first > 12, second > 12) {
        // Only a day can exceed 12.
        (true, false) => vec![(year, second, first)],
        (false, true) => vec![(year, first, second)],
        (true, true) => vec![(year, second, first)],
        // Day-first wins ties.
        (false, false) => vec![(year, second, first), (year, first, second)],
    };
    Some(readings)
}

/// Two-digit years below 50 are 20xx, the rest 19xx.
fn expand_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        Some(if year < 50 { 2000 + year } else { 1900 + year })
    } else {
        Some(year)
    }
}

/// Map a (possibly misread) month token to its number.
pub fn resolve_month(token: &str) -> Option<u32> {
    let token = correct_month_token(token.trim_end_matches('.'));
    if !token.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let exact = MONTH_NAMES.iter().position(|name| {
        token == *name || token == name[..3] || (*name == "SEPTEMBER" && token == "SEPT")
    });
    if let Some(index) = exact {
        return Some(index as u32 + 1);
    }

    MONTH_NAMES
        .iter()
        .position(|name| ocr_equivalent(&token, &name[..3]) || ocr_equivalent(&token, name))
        .map(|index| index as u32 + 1)
}

fn ocr_equivalent(token: &str, month: &str) -> bool {
    token.len() == month.len()
        && token.chars().zip(month.chars()).all(|(t, m)| {
            t == m
                || DIGIT_CONFUSIONS
                    .iter()
                    .any(|(digit, letters)| *digit == t && letters.contains(m))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> ParsedDate {
        ParsedDate::new(y, m, d).unwrap()
    }

    #[test]
    fn test_ambiguous_order_prefers_day_first() {
        assert_eq!(parse_date("05/03/1990"), Some(date(1990, 3, 5)));
    }

    #[test]
    fn test_unambiguous_day_overrides_preference() {
        assert_eq!(parse_date("13/02/1990"), Some(date(1990, 2, 13)));
        assert_eq!(parse_date("02/13/1990"), Some(date(1990, 2, 13)));
    }

    #[test]
    fn test_ocr_month_correction() {
        assert_eq!(parse_date("17 0CT 2001"), Some(date(2001, 10, 17)));
        assert_eq!(parse_date("170CT2001"), Some(date(2001, 10, 17)));
        assert_eq!(parse_date("3 AU6 1975"), Some(date(1975, 8, 3)));
    }

    #[test]
    fn test_month_name_notations() {
        assert_eq!(parse_date("15 JAN 1990"), Some(date(1990, 1, 15)));
        assert_eq!(parse_date("15 january 1990"), Some(date(1990, 1, 15)));
        assert_eq!(parse_date("15 Sept. 1990"), Some(date(1990, 9, 15)));
        assert_eq!(parse_date("15-JAN-1990"), Some(date(1990, 1, 15)));
        assert_eq!(parse_date("15.MAR.85"), Some(date(1985, 3, 15)));
    }

    #[test]
    fn test_year_first() {
        assert_eq!(parse_date("1990-01-15"), Some(date(1990, 1, 15)));
        assert_eq!(parse_date("1990/1/5"), Some(date(1990, 1, 5)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_date("15.01.49"), Some(date(2049, 1, 15)));
        assert_eq!(parse_date("15.01.50"), Some(date(1950, 1, 15)));
        assert_eq!(parse_date("15 JAN 90"), Some(date(1990, 1, 15)));
    }

    #[test]
    fn test_calendar_invariant() {
        assert_eq!(parse_date("29/02/2024"), Some(date(2024, 2, 29)));
        assert_eq!(parse_date_detailed("29/02/2023"), Err(RejectReason::InvalidDate));
        assert_eq!(parse_date_detailed("31 APR 1990"), Err(RejectReason::InvalidDate));
        assert_eq!(parse_date_detailed("31/31/1990"), Err(RejectReason::InvalidDate));
    }

    #[test]
    fn test_out_of_range_years() {
        assert_eq!(parse_date_detailed("01/01/1850"), Err(RejectReason::TooOld));
        assert_eq!(parse_date_detailed("12 MAR 1850"), Err(RejectReason::TooOld));
        assert_eq!(parse_date_detailed("01/01/2150"), Err(RejectReason::FutureDate));
        assert_eq!(parse_date_detailed("31/02/1850"), Err(RejectReason::InvalidDate));
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_date_detailed("hello"), Err(RejectReason::Unparsable));
        assert_eq!(parse_date_detailed("15 XYZ 1990"), Err(RejectReason::Unparsable));
        assert_eq!(parse_date_detailed(""), Err(RejectReason::Unparsable));
    }

    #[test]
    fn test_find_all_dates_order() {
        let candidates = find_all_dates("Issued 2020-05-01, born 15.01.1990 and 3 MAR 1985");
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["15.01.1990", "2020-05-01", "3 MAR 1985"]);
    }

    #[test]
    fn test_find_all_dates_skips_embedded_digits() {
        assert!(find_all_dates("AK1626595").is_empty());
        assert!(find_all_dates("ref 123/04/19901").is_empty());
    }

    #[test]
    fn test_find_all_dates_uses_normalized_text() {
        let candidates = find_all_dates("born 17 0CT 2001");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "17 OCT 2001");
        assert_eq!(candidates[0].source, CandidateSource::Normalized);
        assert_eq!(&"born 17 0CT 2001"[candidates[0].start..candidates[0].end], "17 0CT 2001");
    }

    #[test]
    fn test_find_all_dates_spaced_numeric() {
        let candidates = find_all_dates("DOB 15 01 1990");
        assert_eq!(candidates[0].text, "15 01 1990");
        assert_eq!(parse_date(&candidates[0].text), Some(date(1990, 1, 15)));
    }
}
