use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSPORT_TEXT: &str =
    "PASSPORT JOHN SMITH NATIONALITY KEN DATE OF BIRTH: 15 JAN 1990 PASSPORT NO AK1626595";

fn idex(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("idex").unwrap();
    // Keep the user's own configuration out of the way.
    cmd.env("XDG_CONFIG_HOME", home.path());
    cmd
}

#[test]
fn extract_json_from_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("passport.txt");
    fs::write(&input, PASSPORT_TEXT).unwrap();

    idex(&dir)
        .args(["extract", "--today", "2026-10-17"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""birthdate":"1990-01-15""#))
        .stdout(predicate::str::contains(r#""documentNumber":"AK1626595""#))
        .stdout(predicate::str::contains(r#""fullName":"JOHN SMITH""#))
        .stdout(predicate::str::contains(r#""country":"KEN""#));
}

#[test]
fn extract_text_from_stdin() {
    let dir = TempDir::new().unwrap();

    idex(&dir)
        .args(["extract", "-", "--format", "text", "-t", "national_id"])
        .write_stdin("DOB 01.02.1985\nID NUMBER 12345678")
        .assert()
        .success()
        .stdout(predicate::str::contains("Document type:   national_id"))
        .stdout(predicate::str::contains("Birthdate:       1985-02-01"))
        .stdout(predicate::str::contains("Full name:       -"));
}

#[test]
fn extract_reports_missing_birthdate() {
    let dir = TempDir::new().unwrap();

    idex(&dir)
        .args(["extract", "-"])
        .write_stdin("PASSPORT NO AK1626595")
        .assert()
        .failure()
        .stderr(predicate::str::contains("0 candidates"))
        .stderr(predicate::str::contains("missing_birthdate"));
}

#[test]
fn extract_missing_file() {
    let dir = TempDir::new().unwrap();

    idex(&dir)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), PASSPORT_TEXT).unwrap();
    fs::write(inputs.join("b.txt"), "NOTHING READABLE").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());
    idex(&dir)
        .args(["batch", &pattern, "--summary", "--continue-on-error", "--today", "2026-10-17"])
        .arg("--output-dir")
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"))
        .stdout(predicate::str::contains("No date-shaped text was found (0 candidates)."));

    let json = fs::read_to_string(outputs.join("a.json")).unwrap();
    assert!(json.contains("AK1626595"));
    assert!(!outputs.join("b.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,passport,1990-01-15,AK1626595,JOHN SMITH,KEN"));
    assert!(summary.contains("b.txt,error"));
    assert!(summary.contains("missing_birthdate"));
    assert!(summary.lines().next().unwrap().ends_with(",error,details"));
    assert!(summary.contains("Could not determine the date of birth."));
}

#[test]
fn batch_stops_on_first_error_by_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.txt"), "NOTHING READABLE").unwrap();

    let pattern = format!("{}/*.txt", dir.path().display());
    idex(&dir)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("idex.json");
    let config = config.to_str().unwrap();

    idex(&dir)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    idex(&dir)
        .args(["--config", config, "config", "get", "extraction.max_age_years"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150"));

    idex(&dir)
        .args(["--config", config, "config", "set", "extraction.country_fallback", "KEN"])
        .assert()
        .success();

    idex(&dir)
        .args(["--config", config, "config", "get", "extraction.country_fallback"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"KEN\""));

    idex(&dir)
        .args(["--config", config, "config", "set", "extraction.max_age_years", "--", "-5"])
        .assert()
        .failure();

    idex(&dir)
        .args(["--config", config, "config", "get", "extraction.no_such_key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn extract_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("idex.json");
    fs::write(
        &config,
        r#"{"output": {"include_raw_text": false, "pretty_json": true}}"#,
    )
    .unwrap();

    idex(&dir)
        .args(["--config", config.to_str().unwrap(), "extract", "-", "--today", "2026-10-17"])
        .write_stdin(PASSPORT_TEXT)
        .assert()
        .success()
        .stdout(predicate::str::contains("rawText").not())
        .stdout(predicate::str::contains("\"documentNumber\": \"AK1626595\""));
}
