//! AI-first extraction with local fallback.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::ai::{AiExtraction, AiExtractionClient};
use crate::error::{PdfError, Result};
use crate::fields::{PatternFieldExtractor, classify_document_type};
use crate::models::config::DocfieldsConfig;
use crate::models::document::{
    AiErrorDetails, Document, DocumentInfo, ExtractedField, ExtractionResult, ProcessResponse,
    ProcessingInfo, ProcessingMethod, Table, confidence_summary,
};
use crate::output::OutputWriter;
use crate::pdf::extract_document;
use crate::tables::TableReconstructor;

const MESSAGE_NOT_CONFIGURED: &str = "Data extracted using local processing (AI not configured)";

/// A document written to a temporary location before processing.
///
/// The file at `path` is owned by the orchestrator once handed over and is
/// removed when processing ends.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub original_name: String,
}

impl StagedUpload {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
        }
    }
}

/// Outcome of extracting one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub result: ExtractionResult,
    pub message: String,
    /// Present when an AI failure was replaced by local processing.
    pub ai_error: Option<AiErrorDetails>,
}

/// Chooses between AI and local extraction and assembles results.
pub struct ExtractionOrchestrator {
    ai: Option<AiExtractionClient>,
    fields: PatternFieldExtractor,
    tables: TableReconstructor,
    writer: OutputWriter,
}

impl ExtractionOrchestrator {
    /// Build from configuration. AI is enabled only when credentials are present.
    pub fn from_config(config: &DocfieldsConfig) -> Result<Self> {
        let ai = match config.ai.credentials() {
            Some(_) => Some(AiExtractionClient::from_config(&config.ai)?),
            None => {
                info!("AI credentials not configured, using local extraction only");
                None
            }
        };

        Ok(Self {
            ai,
            fields: PatternFieldExtractor::new()
                .with_address_max_chars(config.extraction.address_max_chars),
            tables: TableReconstructor::new()
                .with_line_items(config.extraction.line_items)
                .with_generic_tables(config.extraction.generic_tables),
            writer: OutputWriter::from_config(&config.output),
        })
    }

    /// Replace the AI client.
    pub fn with_ai_client(mut self, client: AiExtractionClient) -> Self {
        self.ai = Some(client);
        self
    }

    /// Replace the output writer.
    pub fn with_writer(mut self, writer: OutputWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn is_ai_configured(&self) -> bool {
        self.ai.is_some()
    }

    /// Extract fields and tables from a document.
    ///
    /// Never fails: AI errors are absorbed by the local extractor.
    pub async fn extract(&self, document: &Document) -> Extraction {
        let started = Instant::now();

        let Some(client) = &self.ai else {
            let result = self.local_result(document, started);
            return Extraction {
                result,
                message: MESSAGE_NOT_CONFIGURED.to_string(),
                ai_error: None,
            };
        };

        match client.extract(&document.text).await {
            Ok(extraction) => {
                let message = format!(
                    "Data extracted successfully using Azure AI Foundry (deployment {})",
                    extraction.deployment
                );
                Extraction {
                    result: self.ai_result(document, extraction, started),
                    message,
                    ai_error: None,
                }
            }
            Err(err) => {
                warn!("AI extraction failed, falling back to local processing: {}", err);
                let details = AiErrorDetails {
                    error: err.to_string(),
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    fallback_used: true,
                };
                Extraction {
                    result: self.local_result(document, started),
                    message: format!(
                        "Data extracted using local processing (AI extraction failed: {err})"
                    ),
                    ai_error: Some(details),
                }
            }
        }
    }

    /// Extract from in-memory PDF bytes and persist the result.
    pub async fn process_bytes(&self, name: &str, data: &[u8]) -> Result<ProcessResponse> {
        let document = load_document(name, data)?;
        let extraction = self.extract(&document).await;
        let output_file = self.writer.persist(&extraction.result, name)?;

        Ok(ProcessResponse {
            success: true,
            message: extraction.message,
            output_file: output_file.to_string_lossy().into_owned(),
            data: extraction.result,
            ai_error_details: extraction.ai_error,
        })
    }

    /// Process a staged upload. The staged file is removed whether or not
    /// processing succeeds.
    pub async fn process_upload(&self, upload: StagedUpload) -> Result<ProcessResponse> {
        let outcome = match std::fs::read(&upload.path) {
            Ok(data) => self.process_bytes(&upload.original_name, &data).await,
            Err(e) => Err(e.into()),
        };

        remove_staged(&upload.path);
        outcome
    }

    fn local_result(&self, document: &Document, started: Instant) -> ExtractionResult {
        let fields = self.fields.extract_fields(&document.text);
        let tables = self.tables.reconstruct(&document.text);
        let processing = processing_info(ProcessingMethod::LocalPatternMatching, &fields, started);
        assemble(document, fields, tables, processing)
    }

    /// AI results carry the model's fields only; tables belong to the local path.
    fn ai_result(
        &self,
        document: &Document,
        extraction: AiExtraction,
        started: Instant,
    ) -> ExtractionResult {
        let mut processing = processing_info(ProcessingMethod::Ai, &extraction.fields, started);
        processing.deployment = Some(extraction.deployment);
        processing.api_version = Some(extraction.api_version);
        processing.probe_attempts = Some(extraction.attempts.len());
        assemble(document, extraction.fields, Vec::new(), processing)
    }
}

fn assemble(
    document: &Document,
    key_value_pairs: Vec<ExtractedField>,
    tables: Vec<Table>,
    processing: ProcessingInfo,
) -> ExtractionResult {
    debug!(
        "{}: {} fields, {} tables via {}",
        document.name,
        key_value_pairs.len(),
        tables.len(),
        processing.method
    );

    ExtractionResult {
        document: DocumentInfo::from(document),
        document_type: classify_document_type(&document.text),
        key_value_pairs,
        tables,
        processing,
    }
}

fn processing_info(
    method: ProcessingMethod,
    fields: &[ExtractedField],
    started: Instant,
) -> ProcessingInfo {
    let (fields_found, average_confidence) = confidence_summary(fields);
    ProcessingInfo {
        method,
        processing_time_ms: started.elapsed().as_millis() as u64,
        timestamp: chrono::Utc::now().to_rfc3339(),
        fields_found,
        fields_total: fields.len(),
        average_confidence,
        deployment: None,
        api_version: None,
        probe_attempts: None,
    }
}

/// Parse PDF bytes. A PDF without text becomes an empty document.
fn load_document(name: &str, data: &[u8]) -> Result<Document> {
    match extract_document(name, data) {
        Ok(document) => Ok(document),
        Err(PdfError::EmptyDocument { page_count }) => {
            warn!("{} has no extractable text", name);
            Ok(Document::from_text(name, data.len() as u64, "", page_count))
        }
        Err(e) => Err(e.into()),
    }
}

fn remove_staged(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed staged file {}", path.display()),
        Err(e) => warn!("Failed to remove staged file {}: {}", path.display(), e),
    }
}
