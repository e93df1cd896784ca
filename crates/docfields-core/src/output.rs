//! Persistence of extraction results.

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};

use tracing::info;

use crate::error::Result;
use crate::models::config::OutputConfig;
use crate::models::document::ExtractionResult;

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp that never repeats within the process.
pub fn next_timestamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let previous = LAST_TIMESTAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}

/// Reduce an uploaded file name to a safe final path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes `extracted_{timestamp}_{name}.json` files.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    pretty: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: true,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            dir: config.output_dir.clone(),
            pretty: config.pretty,
        }
    }

    /// Output file name for a document.
    pub fn file_name(&self, original_name: &str) -> String {
        format!(
            "extracted_{}_{}.json",
            next_timestamp(),
            sanitize_file_name(original_name)
        )
    }

    /// Serialize the result and write it. Returns the written path.
    pub fn persist(&self, result: &ExtractionResult, original_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let json = if self.pretty {
            serde_json::to_string_pretty(result)?
        } else {
            serde_json::to_string(result)?
        };

        let path = self.dir.join(self.file_name(original_name));
        std::fs::write(&path, json)?;
        info!("Saved extraction result to {}", path.display());
        Ok(path)
    }
}
