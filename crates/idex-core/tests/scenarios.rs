//! End-to-end extraction scenarios.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use idex_core::document::rules::birthdate::{BirthdateResolver, Plausibility};
use idex_core::document::rules::{normalize, parse_date, parse_date_detailed};
use idex_core::{
    DocumentParser, DocumentType, ExtractionConfig, ExtractionError, IdentityParser,
    MissingField, ParsedDate, RejectReason,
};

const PASSPORT_TEXT: &str =
    "PASSPORT JOHN SMITH NATIONALITY KEN DATE OF BIRTH: 15 JAN 1990 PASSPORT NO AK1626595";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn parser() -> IdentityParser {
    IdentityParser::new().with_reference_date(today())
}

fn date(y: i32, m: u32, d: u32) -> ParsedDate {
    ParsedDate::new(y, m, d).unwrap()
}

#[test]
fn passport_end_to_end() {
    let result = parser().parse(PASSPORT_TEXT, DocumentType::Passport).unwrap();
    let json = serde_json::to_value(&result.fields).unwrap();

    assert_eq!(json["birthdate"], "1990-01-15");
    assert_eq!(json["documentNumber"], "AK1626595");
    assert_eq!(json["fullName"], "JOHN SMITH");
    assert_eq!(json["country"], "KEN");
    assert_eq!(json["documentType"], "passport");
}

#[test]
fn kenyan_id_with_ocr_noise() {
    let text = "REPUBLIC OF KENYA\n\
                NATIONAL IDENTITY CARD\n\
                SERIAL NUMBER: 2345678901\n\
                FULL NAMES: PETER K1OKO MUTUA\n\
                DATE OF BIRTH 03.N0V.1985\n\
                SEX MALE";

    let result = parser().parse(text, DocumentType::NationalId).unwrap();
    assert_eq!(result.fields.birthdate, date(1985, 11, 3));
    assert_eq!(result.fields.document_number, "2345678901");
    assert_eq!(result.fields.full_name.as_deref(), Some("PETER KIOKO MUTUA"));
    assert_eq!(result.fields.country.as_deref(), Some("KEN"));
}

#[test]
fn normalization_is_idempotent() {
    let samples = [
        PASSPORT_TEXT,
        "DOB 17 0CT 2001",
        "0C7 0CT OC7 N0V 0EC DE0 FE8 J4N M4R 4PR M4Y JU1 4UG AU6 5EP",
        "W1A K1O M1E 1A A1 11E",
        "",
    ];
    for sample in samples {
        let once = normalize(sample);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn parsed_dates_respect_the_calendar() {
    assert_eq!(parse_date("29/02/2024"), Some(date(2024, 2, 29)));
    assert_eq!(parse_date_detailed("29/02/2023"), Err(RejectReason::InvalidDate));
    assert_eq!(parse_date_detailed("31.04.1990"), Err(RejectReason::InvalidDate));

    for text in ["05/03/1990", "13/02/1990", "1990-12-31", "1 MAR 00", "31 DEC 1999"] {
        let parsed = parse_date(text).unwrap();
        assert!((1..=12).contains(&parsed.month()));
        assert!(parsed.to_naive_date().format("%Y-%m-%d").to_string() == parsed.to_string());
    }
}

#[test]
fn day_month_order() {
    assert_eq!(parse_date("05/03/1990"), Some(date(1990, 3, 5)));
    assert_eq!(parse_date("13/02/1990"), Some(date(1990, 2, 13)));
}

#[test]
fn ocr_month_correction() {
    assert_eq!(parse_date("17 0CT 2001"), Some(date(2001, 10, 17)));
}

#[test]
fn plausibility_rejections() {
    let policy = Plausibility::default();
    let far_future = NaiveDate::from_ymd_opt(2100, 6, 1).unwrap();
    assert_eq!(
        policy.check(&date(1900, 1, 1), far_future),
        Err(RejectReason::AgeOutOfRange)
    );
    assert_eq!(
        policy.check(&date(2027, 10, 17), today()),
        Err(RejectReason::FutureDate)
    );
}

#[test]
fn keyword_proximity_wins_over_earlier_date() {
    let text = format!(
        "ISSUED ON 01/01/1960 BY THE REGISTRAR {} DATE OF BIRTH: 22.08.1994",
        "-".repeat(120)
    );
    let resolution = BirthdateResolver::new(today()).resolve(&text);
    assert_eq!(resolution.date, Some(date(1994, 8, 22)));
}

#[test]
fn no_dates_means_missing_birthdate() {
    let err = parser()
        .parse("PASSPORT NO AK1626595 NO DATES ANYWHERE", DocumentType::Passport)
        .unwrap_err();

    assert_eq!(err.missing_field(), MissingField::Birthdate);
    match &err {
        ExtractionError::MissingBirthdate { rejected, report } => {
            assert!(rejected.is_empty());
            assert!(report.contains("0 candidates"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("missing birthdate"));
}

#[test]
fn implausible_dates_are_listed() {
    let err = parser()
        .parse("DOB 01/01/2090 PASSPORT NO AK1626595", DocumentType::Passport)
        .unwrap_err();
    match err {
        ExtractionError::MissingBirthdate { rejected, report } => {
            assert_eq!(rejected.len(), 1);
            assert_eq!(rejected[0].reason, RejectReason::FutureDate);
            assert!(report.contains("future_date"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn country_fallback_is_opt_in() {
    let text = format!("DOB 1990-01-15 PASSPORT NO AK1626595 {} KEN", "X".repeat(120));

    let default = parser().parse(&text, DocumentType::Passport).unwrap();
    assert_eq!(default.fields.country, None);

    let config = ExtractionConfig {
        country_fallback: Some("KEN".to_string()),
        ..ExtractionConfig::default()
    };
    let with_fallback = parser().with_config(config);
    let result = with_fallback.parse(&text, DocumentType::Passport).unwrap();
    assert_eq!(result.fields.country.as_deref(), Some("KEN"));
}

#[test]
fn parser_is_shareable_across_threads() {
    let parser = std::sync::Arc::new(parser());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = parser.clone();
            std::thread::spawn(move || {
                parser
                    .parse(PASSPORT_TEXT, DocumentType::Passport)
                    .map(|r| r.fields.document_number)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "AK1626595");
    }
}
