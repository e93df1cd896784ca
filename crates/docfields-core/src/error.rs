//! Error types for the docfields-core library.

use thiserror::Error;

/// Main error type for the docfields library.
#[derive(Error, Debug)]
pub enum DocfieldsError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Local field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// AI extraction error.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF parsed but contains no extractable text.
    #[error("PDF contains no extractable text ({page_count} pages)")]
    EmptyDocument { page_count: u32 },
}

/// Errors related to local field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A layout template rejected its configuration.
    #[error("invalid layout template {name}: {reason}")]
    Layout { name: String, reason: String },
}

/// Errors raised by the AI extraction client.
#[derive(Error, Debug)]
pub enum AiError {
    /// API key or URL is missing.
    #[error("AI credentials are not configured")]
    NotConfigured,

    /// There is no text to send.
    #[error("document has no extractable text")]
    EmptyDocument,

    /// The endpoint rejected the credentials. Never retried.
    #[error("authentication failed (HTTP {status}) for deployment {deployment} with API version {api_version}")]
    Authentication {
        status: u16,
        deployment: String,
        api_version: String,
    },

    /// Every deployment/API version pair failed.
    #[error("all {attempts} deployment/API version combinations failed; last error: {last}")]
    ProbeExhausted { attempts: usize, last: Box<AiError> },

    /// Non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The call exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    /// Whether this failure must abort deployment probing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AiError::Status { status: 401 | 403, .. } | AiError::Authentication { .. }
        )
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else if let Some(status) = err.status() {
            AiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AiError::Network(err.to_string())
        }
    }
}

/// Result type for the docfields library.
pub type Result<T> = std::result::Result<T, DocfieldsError>;
