//! Human-readable reports for failed extractions.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::document::{MissingField, NearMiss, RejectedCandidate};

use super::birthdate::BirthdateResolver;
use super::document_number::DocumentNumberExtractor;

/// Explain why a mandatory field could not be extracted.
///
/// Rescans `text` with default settings, judging birthdate plausibility as
/// of `today`.
pub fn build_failure_report(text: &str, missing: MissingField, today: NaiveDate) -> String {
    match missing {
        MissingField::Birthdate => {
            birthdate_report(&BirthdateResolver::new(today).rejected_candidates(text))
        }
        MissingField::DocumentNumber => {
            document_number_report(&DocumentNumberExtractor::new().near_misses(text))
        }
    }
}

/// Report listing every rejected date candidate.
pub fn birthdate_report(rejected: &[RejectedCandidate]) -> String {
    let mut report = String::from("Could not determine the date of birth.\n");

    if rejected.is_empty() {
        report.push_str("No date-shaped text was found (0 candidates).\n");
    } else {
        let _ = writeln!(
            report,
            "Found {} date {}, none plausible:",
            rejected.len(),
            plural(rejected.len(), "candidate", "candidates")
        );
        for candidate in rejected {
            let _ = write!(report, "  - \"{}\": ", candidate.text);
            if let Some(parsed) = candidate.parsed {
                let _ = write!(report, "read as {}, ", parsed);
            }
            let _ = writeln!(
                report,
                "rejected ({}): {}",
                candidate.reason,
                candidate.reason.describe()
            );
        }
    }

    report.push_str("Check that the date of birth is legible and scan the document again.");
    report
}

/// Report listing tokens that came close to being a document number.
pub fn document_number_report(near_misses: &[NearMiss]) -> String {
    let mut report = String::from("Could not find a document number.\n");

    if near_misses.is_empty() {
        report.push_str("No number-like text was found (0 candidates).\n");
    } else {
        let _ = writeln!(
            report,
            "Found {} number-like {}, none qualified:",
            near_misses.len(),
            plural(near_misses.len(), "token", "tokens")
        );
        for miss in near_misses {
            let _ = writeln!(report, "  - \"{}\": {}", miss.text, miss.reason.describe());
        }
    }

    report.push_str("Check that the document number is legible and scan the document again.");
    report
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
