//! Table and line-item reconstruction from extracted text.

pub mod generic;
pub mod layout;

pub use generic::{detect_tables, split_columns};
pub use layout::{LayoutTemplate, PurchaseOrderLayout};

use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::document::{LineItem, Table};

/// A second header this far past the first ends the table.
const SPURIOUS_HEADER_DISTANCE: usize = 20;

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Scans text for a layout's header and reads item blocks after it.
pub struct LineItemReconstructor {
    layout: Box<dyn LayoutTemplate>,
}

impl LineItemReconstructor {
    /// Create a reconstructor for the purchase order layout.
    pub fn new() -> Self {
        Self {
            layout: Box::new(PurchaseOrderLayout::new()),
        }
    }

    /// Create a reconstructor for a custom layout.
    pub fn with_layout(layout: Box<dyn LayoutTemplate>) -> Result<Self> {
        if layout.stride() == 0 || layout.header_window() == 0 {
            return Err(ExtractionError::Layout {
                name: layout.name().to_string(),
                reason: "stride and header window must be at least one line".to_string(),
            });
        }
        Ok(Self { layout })
    }

    /// Reconstruct line items. Returns nothing when no header is found.
    pub fn reconstruct(&self, text: &str) -> Vec<LineItem> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let Some((header_start, header_end)) = self.find_header(&lines) else {
            debug!("No {} item header found", self.layout.name());
            return Vec::new();
        };
        trace!("Item header spans lines {}..={}", header_start, header_end);

        let stride = self.layout.stride();
        let mut items = Vec::new();
        let mut idx = header_end + 1;

        while idx < lines.len() {
            let line = lines[idx];

            if self.layout.is_terminator(line) {
                trace!("Totals marker at line {}", idx);
                break;
            }
            if idx > header_start + SPURIOUS_HEADER_DISTANCE
                && self.layout.is_repeated_header(line)
            {
                trace!("Repeated header at line {}", idx);
                break;
            }

            if self.layout.is_item_boundary(line) {
                let end = self.block_end(&lines, idx, stride);
                match self.layout.parse_block(&lines[idx..end]) {
                    Some(item) => {
                        items.push(item);
                        idx = end;
                        continue;
                    }
                    None => trace!("Discarding item boundary at line {}", idx),
                }
            }

            idx += 1;
        }

        debug!("Reconstructed {} line items", items.len());
        items
    }

    fn find_header(&self, lines: &[&str]) -> Option<(usize, usize)> {
        (0..lines.len())
            .find_map(|start| self.layout.header_end(lines, start).map(|end| (start, end)))
    }

    /// End of a block: one stride, cut short by the end of text or a totals marker.
    fn block_end(&self, lines: &[&str], start: usize, stride: usize) -> usize {
        let limit = (start + stride).min(lines.len());
        (start + 1..limit)
            .find(|i| self.layout.is_terminator(lines[*i]))
            .unwrap_or(limit)
    }
}

impl Default for LineItemReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs line-item reconstruction and generic table detection.
pub struct TableReconstructor {
    line_items: Option<LineItemReconstructor>,
    generic_tables: bool,
}

impl TableReconstructor {
    /// Create a reconstructor with both strategies enabled.
    pub fn new() -> Self {
        Self {
            line_items: Some(LineItemReconstructor::new()),
            generic_tables: true,
        }
    }

    /// Enable or disable line-item reconstruction.
    pub fn with_line_items(mut self, enabled: bool) -> Self {
        self.line_items = enabled.then(LineItemReconstructor::new);
        self
    }

    /// Replace the line-item reconstructor.
    pub fn with_line_item_reconstructor(mut self, reconstructor: LineItemReconstructor) -> Self {
        self.line_items = Some(reconstructor);
        self
    }

    /// Enable or disable generic table detection.
    pub fn with_generic_tables(mut self, enabled: bool) -> Self {
        self.generic_tables = enabled;
        self
    }

    /// Line-item table first (if any), then generic tables.
    pub fn reconstruct(&self, text: &str) -> Vec<Table> {
        let mut tables = Vec::new();

        if let Some(reconstructor) = &self.line_items {
            let items = reconstructor.reconstruct(text);
            if !items.is_empty() {
                tables.push(Table::line_items(items));
            }
        }

        if self.generic_tables {
            tables.extend(detect_tables(text));
        }

        tables
    }
}

impl Default for TableReconstructor {
    fn default() -> Self {
        Self::new()
    }
}
