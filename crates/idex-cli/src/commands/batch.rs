//! Batch command - extract identity fields from many OCR text files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use idex_core::{DocumentParser, DocumentType, ExtractionResult, IdentityParser};

use super::extract::{build_parser, format_result, OutputFormat};
use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching OCR text files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Declared document type of every file
    #[arg(short = 't', long, default_value = "passport")]
    document_type: DocumentType,

    /// Judge birthdates as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileOutcome {
    path: PathBuf,
    result: Option<ExtractionResult>,
    error: Option<String>,
    report: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(build_parser(&config, args.today, false));
    let jobs = args.jobs.max(1);
    let document_type = args.document_type;

    let mut pending = files.into_iter().enumerate();
    let mut workers = JoinSet::new();
    let mut outcomes: Vec<(usize, FileOutcome)> = Vec::new();

    loop {
        while workers.len() < jobs {
            let Some((index, path)) = pending.next() else {
                break;
            };
            let parser = Arc::clone(&parser);
            workers.spawn_blocking(move || (index, process_file(path, &parser, document_type)));
        }

        let Some(joined) = workers.join_next().await else {
            break;
        };
        let (index, outcome) = joined?;
        overall_pb.inc(1);

        if let Some(error_msg) = &outcome.error {
            let details = outcome.report.as_deref().unwrap_or("");
            if args.continue_on_error {
                warn!("Failed to process {}: {}\n{}", outcome.path.display(), error_msg, details);
            } else {
                error!("Failed to process {}: {}\n{}", outcome.path.display(), error_msg, details);
                overall_pb.abandon();
                anyhow::bail!(
                    "Processing failed for {}: {}",
                    outcome.path.display(),
                    error_msg
                );
            }
        }

        outcomes.push((index, outcome));
    }

    overall_pb.finish_with_message("Complete");

    outcomes.sort_by_key(|(index, _)| *index);
    let results: Vec<FileOutcome> = outcomes.into_iter().map(|(_, outcome)| outcome).collect();

    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for outcome in &successful {
            let Some(result) = &outcome.result else {
                continue;
            };
            let output_name = outcome
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, format_result(result, args.format, &config.output)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in &failed {
            println!(
                "  - {}: {}",
                outcome.path.display(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            if let Some(report) = &outcome.report {
                for line in report.lines() {
                    println!("      {}", line);
                }
            }
        }
    }

    Ok(())
}

fn process_file(path: PathBuf, parser: &IdentityParser, document_type: DocumentType) -> FileOutcome {
    let file_start = Instant::now();

    let outcome = fs::read_to_string(&path)
        .map_err(|e| (e.to_string(), None))
        .and_then(|text| {
            parser
                .parse(&text, document_type)
                .map_err(|e| (e.missing_field().to_string(), Some(e.report().to_string())))
        });

    let processing_time_ms = file_start.elapsed().as_millis() as u64;
    match outcome {
        Ok(result) => FileOutcome {
            path,
            result: Some(result),
            error: None,
            report: None,
            processing_time_ms,
        },
        Err((error, report)) => FileOutcome {
            path,
            result: None,
            error: Some(error),
            report,
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[FileOutcome]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "document_type",
        "birthdate",
        "document_number",
        "full_name",
        "country",
        "processing_time_ms",
        "error",
        "details",
    ])?;

    for outcome in results {
        let filename = outcome.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        if let Some(result) = &outcome.result {
            let fields = &result.fields;
            wtr.write_record([
                filename,
                "success",
                fields.document_type.as_str(),
                &fields.birthdate.to_string(),
                &fields.document_number,
                fields.full_name.as_deref().unwrap_or(""),
                fields.country.as_deref().unwrap_or(""),
                &outcome.processing_time_ms.to_string(),
                "",
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &outcome.processing_time_ms.to_string(),
                outcome.error.as_deref().unwrap_or(""),
                outcome.report.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
