//! Core library for business document field extraction.
//!
//! This crate provides:
//! - PDF text extraction
//! - AI field extraction over a chat-completion endpoint, with deployment probing
//! - Rule-based field extraction used when AI is unavailable or fails
//! - Line-item and generic table reconstruction
//! - An orchestrator that picks a path and persists the result

pub mod ai;
pub mod error;
pub mod fields;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod pdf;
pub mod tables;

pub use ai::{AiExtraction, AiExtractionClient, ChatRequest, ChatTransport, ProbePlan, ProbeTarget};
pub use error::{AiError, DocfieldsError, ExtractionError, PdfError, Result};
pub use fields::{FieldKind, PatternFieldExtractor, classify_document_type};
pub use models::config::DocfieldsConfig;
pub use models::document::{
    AiErrorDetails, Document, ExtractedField, ExtractionResult, LineItem, ProcessResponse,
    ProcessingMethod, Table,
};
pub use orchestrator::{Extraction, ExtractionOrchestrator, StagedUpload};
pub use output::OutputWriter;
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, extract_document};
pub use tables::{LayoutTemplate, LineItemReconstructor, TableReconstructor};
