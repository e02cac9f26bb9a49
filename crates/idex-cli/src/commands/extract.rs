//! Extract command - pull identity fields out of one OCR text file.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::{debug, info};

use idex_core::{
    DocumentParser, DocumentType, ExtractionResult, IdentityParser, IdexConfig, OutputConfig,
};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text file, or "-" to read standard input
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Declared document type (passport, national_id, driver_license)
    #[arg(short = 't', long, default_value = "passport")]
    document_type: DocumentType,

    /// Judge birthdates as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print the extraction trace to stderr
    #[arg(long)]
    trace: bool,

    /// Show warnings and processing time
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!(
        "Extracting {} fields from {}",
        args.document_type,
        args.input.display()
    );

    let parser = build_parser(&config, args.today, args.trace);

    let result = match parser.parse(&text, args.document_type) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{} {}", style("✗").red(), err.report());
            anyhow::bail!("{}", err.missing_field());
        }
    };

    if args.trace {
        eprint!("{}", result.trace);
    }

    let output = format_result(&result, args.format, &config.output)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings {
        for warning in &result.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a parser from configuration and command-line overrides.
pub fn build_parser(config: &IdexConfig, today: Option<NaiveDate>, trace: bool) -> IdentityParser {
    let parser = IdentityParser::from_config(config.extraction.clone())
        .with_trace(trace || config.extraction.trace);

    match today {
        Some(date) => parser.with_reference_date(date),
        None => parser,
    }
}

fn read_input(input: &PathBuf) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

/// Render an extraction result in the requested format.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(result, output),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_json(result: &ExtractionResult, output: &OutputConfig) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(&result.fields)?;
    if !output.include_raw_text {
        if let Some(obj) = value.as_object_mut() {
            obj.remove("rawText");
        }
    }

    let json = if output.pretty_json {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(json)
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let fields = &result.fields;

    wtr.write_record([
        "document_type",
        "birthdate",
        "document_number",
        "full_name",
        "country",
    ])?;

    wtr.write_record([
        fields.document_type.as_str(),
        &fields.birthdate.to_string(),
        &fields.document_number,
        fields.full_name.as_deref().unwrap_or(""),
        fields.country.as_deref().unwrap_or(""),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let fields = &result.fields;
    let mut output = String::new();

    output.push_str(&format!("Document type:   {}\n", fields.document_type));
    output.push_str(&format!("Birthdate:       {}\n", fields.birthdate));
    output.push_str(&format!("Document number: {}\n", fields.document_number));
    output.push_str(&format!(
        "Full name:       {}\n",
        fields.full_name.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Country:         {}",
        fields.country.as_deref().unwrap_or("-")
    ));

    output
}
