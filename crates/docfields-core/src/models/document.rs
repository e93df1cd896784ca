//! Document and extraction result models.

use serde::{Deserialize, Serialize};

/// Value recorded for a known field the local extractor could not find.
pub const NOT_FOUND: &str = "Not found in document";

/// An input document after text extraction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Original file name.
    pub name: String,
    /// Size of the uploaded file in bytes.
    pub size: u64,
    /// Extracted plain text.
    pub text: String,
    /// Number of pages.
    pub page_count: u32,
}

impl Document {
    /// Build a document from already extracted text.
    pub fn from_text(
        name: impl Into<String>,
        size: u64,
        text: impl Into<String>,
        page_count: u32,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            text: text.into(),
            page_count,
        }
    }
}

/// A single extracted key-value pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub key: String,
    pub value: String,
    /// Heuristic certainty in `[0, 1]`.
    pub confidence: f32,
}

impl ExtractedField {
    pub fn new(key: impl Into<String>, value: impl Into<String>, confidence: f32) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Placeholder entry for a field that was not found.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::new(key, NOT_FOUND, 0.0)
    }

    /// Whether this entry carries a real value.
    pub fn is_found(&self) -> bool {
        self.confidence > 0.0 && self.value != NOT_FOUND
    }
}

/// One row of the purchase-order item table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_number: String,
    pub unit: String,
    pub quantity: String,
    pub part_number: String,
    pub description: String,
    pub due_date: String,
    pub price: String,
    pub tax_percent: String,
    pub discount: String,
    pub line_total: String,
}

impl LineItem {
    /// Column labels in serialization order.
    pub const HEADERS: [&'static str; 10] = [
        "Item",
        "Unit",
        "Quantity",
        "Part Number",
        "Description",
        "Due Date",
        "Price",
        "Tax %",
        "Discount",
        "Line Total",
    ];

    /// Whether at least one identifying column was populated.
    pub fn has_identity(&self) -> bool {
        !self.unit.is_empty()
            || !self.quantity.is_empty()
            || !self.part_number.is_empty()
            || !self.description.is_empty()
    }
}

/// A cell of a generic whitespace-aligned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub content: String,
    pub row_index: usize,
    pub column_index: usize,
    pub confidence: f32,
}

/// A table found in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Table {
    /// Fixed-schema line items reconstructed from a known layout.
    #[serde(rename_all = "camelCase")]
    LineItems {
        row_count: usize,
        column_count: usize,
        headers: Vec<String>,
        items: Vec<LineItem>,
    },
    /// Rows of whitespace-delimited columns.
    #[serde(rename_all = "camelCase")]
    Generic {
        row_count: usize,
        column_count: usize,
        cells: Vec<TableCell>,
    },
}

impl Table {
    /// Wrap reconstructed line items in a table record.
    pub fn line_items(items: Vec<LineItem>) -> Self {
        Table::LineItems {
            row_count: items.len(),
            column_count: LineItem::HEADERS.len(),
            headers: LineItem::HEADERS.iter().map(|h| h.to_string()).collect(),
            items,
        }
    }
}

/// How a result was produced. Exactly one per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMethod {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "local pattern matching")]
    LocalPatternMatching,
}

impl ProcessingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::Ai => "AI",
            ProcessingMethod::LocalPatternMatching => "local pattern matching",
        }
    }
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of the input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub size: u64,
    pub page_count: u32,
    pub text_length: usize,
}

impl From<&Document> for DocumentInfo {
    fn from(document: &Document) -> Self {
        Self {
            name: document.name.clone(),
            size: document.size,
            page_count: document.page_count,
            text_length: document.text.chars().count(),
        }
    }
}

/// Processing metadata attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingInfo {
    pub method: ProcessingMethod,
    pub processing_time_ms: u64,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub fields_found: usize,
    pub fields_total: usize,
    /// Mean confidence over found fields.
    pub average_confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_attempts: Option<usize>,
}

/// Aggregate extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub document: DocumentInfo,
    pub document_type: String,
    pub key_value_pairs: Vec<ExtractedField>,
    pub tables: Vec<Table>,
    pub processing: ProcessingInfo,
}

impl ExtractionResult {
    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&ExtractedField> {
        self.key_value_pairs.iter().find(|f| f.key == key)
    }
}

/// Confidence summary over a field set.
pub fn confidence_summary(fields: &[ExtractedField]) -> (usize, f32) {
    let found: Vec<&ExtractedField> = fields.iter().filter(|f| f.is_found()).collect();
    if found.is_empty() {
        return (0, 0.0);
    }
    let sum: f32 = found.iter().map(|f| f.confidence).sum();
    (found.len(), sum / found.len() as f32)
}

/// Details of an AI failure that was absorbed by the local fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiErrorDetails {
    pub error: String,
    /// RFC 3339 time of the failure.
    pub timestamp: String,
    pub fallback_used: bool,
}

/// Caller-facing response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    pub message: String,
    pub output_file: String,
    pub data: ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error_details: Option<AiErrorDetails>,
}
