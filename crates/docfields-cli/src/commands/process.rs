//! Process command - extract fields from a single PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docfields_core::models::document::{LineItem, ProcessResponse, Table};
use docfields_core::{ExtractionOrchestrator, StagedUpload};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Write formatted output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Directory for extracted_*.json result files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip AI extraction even when credentials are set
    #[arg(long)]
    local_only: bool,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON response envelope
    Json,
    /// CSV rows of key, value, confidence
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.local_only {
        config = config.without_ai();
    }
    if let Some(dir) = &args.output_dir {
        config.output.output_dir = dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {} (only PDF is accepted)", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let orchestrator = ExtractionOrchestrator::from_config(&config)?;
    pb.set_message(if orchestrator.is_ai_configured() {
        "Extracting with AI..."
    } else {
        "Extracting locally..."
    });

    let upload = stage_input(&args.input)?;
    let response = orchestrator.process_upload(upload).await;
    pb.finish_and_clear();
    let response = response?;

    if let Some(details) = &response.ai_error_details {
        eprintln!(
            "{} AI extraction failed, used local processing: {}",
            style("⚠").yellow(),
            details.error
        );
    }

    let output = format_response(&response, args.format)?;

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

    if args.show_confidence {
        let processing = &response.data.processing;
        println!();
        println!(
            "{} Fields found: {}/{}",
            style("ℹ").blue(),
            processing.fields_found,
            processing.fields_total
        );
        println!(
            "{} Average confidence: {:.1}%",
            style("ℹ").blue(),
            processing.average_confidence * 100.0
        );
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            processing.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Copy the input into a temporary file the orchestrator takes ownership of.
fn stage_input(input: &Path) -> anyhow::Result<StagedUpload> {
    let staged = tempfile::Builder::new()
        .prefix("docfields-")
        .suffix(".pdf")
        .tempfile()?;
    fs::copy(input, staged.path())?;
    let (file, path) = staged.keep()?;
    drop(file);

    let original_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());

    debug!("Staged {} at {}", original_name, path.display());
    Ok(StagedUpload::new(path, original_name))
}

fn format_response(response: &ProcessResponse, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Csv => format_csv(response),
        OutputFormat::Text => Ok(format_text(response)),
    }
}

fn format_csv(response: &ProcessResponse) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["key", "value", "confidence"])?;
    for field in &response.data.key_value_pairs {
        wtr.write_record([
            field.key.as_str(),
            field.value.as_str(),
            format!("{:.2}", field.confidence).as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(response: &ProcessResponse) -> String {
    let data = &response.data;
    let mut output = String::new();

    output.push_str(&format!(
        "Document: {} ({}, {} page(s))\n",
        data.document.name, data.document_type, data.document.page_count
    ));
    output.push_str(&format!("Method: {}\n", data.processing.method));
    output.push_str(&format!("{}\n", response.message));
    output.push('\n');

    output.push_str("Fields:\n");
    for field in &data.key_value_pairs {
        output.push_str(&format!("  {}: {}\n", field.key, field.value));
    }

    for table in &data.tables {
        output.push('\n');
        match table {
            Table::LineItems { items, .. } => {
                output.push_str(&format!("Line items ({}):\n", items.len()));
                for item in items {
                    output.push_str(&format!("  {}\n", line_item_summary(item)));
                }
            }
            Table::Generic {
                row_count,
                column_count,
                ..
            } => {
                output.push_str(&format!(
                    "Table: {} rows x {} columns\n",
                    row_count, column_count
                ));
            }
        }
    }

    output.push_str(&format!("\nSaved to: {}\n", response.output_file));
    output
}

fn line_item_summary(item: &LineItem) -> String {
    let mut parts = vec![item.item_number.as_str()];
    for value in [
        &item.quantity,
        &item.unit,
        &item.part_number,
        &item.description,
        &item.line_total,
    ] {
        if !value.is_empty() {
            parts.push(value);
        }
    }
    parts.join("  ")
}
