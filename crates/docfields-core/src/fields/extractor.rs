//! Pattern-based field extractor with confidence scoring.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::patterns::*;
use super::{FieldCategory, FieldKind};
use crate::models::document::ExtractedField;

/// Confidence assigned to values found by a fallback extractor.
pub const FALLBACK_CONFIDENCE: f32 = 0.70;

const DOCUMENT_TYPES: [(&str, &str); 5] = [
    ("invoice", "Invoice"),
    ("receipt", "Receipt"),
    ("purchase order", "Purchase Order"),
    ("bill of lading", "Bill of Lading"),
    ("packing slip", "Packing Slip"),
];

const DEFAULT_DOCUMENT_TYPE: &str = "Business Document";

/// Extracts the eleven known fields using ordered regex pattern groups.
pub struct PatternFieldExtractor {
    /// Maximum characters kept for address fields.
    address_max_chars: usize,
}

impl PatternFieldExtractor {
    /// Create a new extractor with default settings.
    pub fn new() -> Self {
        Self {
            address_max_chars: 300,
        }
    }

    /// Set the address truncation limit.
    pub fn with_address_max_chars(mut self, max_chars: usize) -> Self {
        self.address_max_chars = max_chars;
        self
    }

    /// Extract all known fields. Always returns one entry per field.
    pub fn extract_fields(&self, text: &str) -> Vec<ExtractedField> {
        let fields: Vec<ExtractedField> = FieldKind::ALL
            .iter()
            .map(|kind| self.extract_field(*kind, text))
            .collect();

        debug!(
            "Pattern extraction found {}/{} fields",
            fields.iter().filter(|f| f.is_found()).count(),
            fields.len()
        );
        fields
    }

    /// Extract a single field: primary patterns, then fallback, then placeholder.
    pub fn extract_field(&self, kind: FieldKind, text: &str) -> ExtractedField {
        for (index, pattern) in kind.patterns().iter().enumerate() {
            if let Some(value) = first_capture(pattern, text).map(|raw| self.clean(kind, raw))
                && !value.is_empty()
            {
                trace!("{} matched primary pattern {}", kind, index);
                let confidence = score(kind, &value);
                return ExtractedField::new(kind.name(), value, confidence);
            }
        }

        if let Some(value) = self.fallback(kind, text).map(|raw| self.clean(kind, &raw))
            && !value.is_empty()
        {
            trace!("{} matched fallback extractor", kind);
            return ExtractedField::new(kind.name(), value, FALLBACK_CONFIDENCE);
        }

        ExtractedField::not_found(kind.name())
    }

    fn clean(&self, kind: FieldKind, raw: &str) -> String {
        match kind.category() {
            FieldCategory::Address => normalize_address(raw, self.address_max_chars),
            _ => raw.trim().to_string(),
        }
    }

    fn fallback(&self, kind: FieldKind, text: &str) -> Option<String> {
        match kind {
            FieldKind::PoNumber => first_capture(&FALLBACK_PO_TOKEN, text).map(str::to_string),
            FieldKind::VendorName => {
                first_capture(&FALLBACK_COMPANY_LINE, text).map(str::to_string)
            }
            FieldKind::VendorAddress => first_capture(&FALLBACK_STREET, text).map(str::to_string),
            FieldKind::ShipToAddress => {
                first_capture(&FALLBACK_SHIP_BLOCK, text).map(str::to_string)
            }
            FieldKind::OrderDate => first_capture(&FALLBACK_DATE, text).map(str::to_string),
            FieldKind::RequiredDate => {
                // Second distinct date on the page; the first is usually the order date.
                let mut dates = FALLBACK_DATE
                    .captures_iter(text)
                    .filter_map(|c| c.get(1).map(|m| m.as_str()));
                let first = dates.next()?;
                dates.find(|d| *d != first).map(str::to_string)
            }
            FieldKind::TotalAmount => largest_amount(text),
            FieldKind::Subtotal => first_capture(&FALLBACK_SUBTOTAL_LINE, text).map(str::to_string),
            FieldKind::PhoneNumber => first_capture(&FALLBACK_PHONE, text).map(str::to_string),
            FieldKind::FaxNumber => first_capture(&FALLBACK_FAX, text).map(str::to_string),
            FieldKind::ShipVia => first_capture(&FALLBACK_CARRIER, text).map(str::to_string),
        }
    }
}

impl Default for PatternFieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a document by the first matching keyword.
pub fn classify_document_type(text: &str) -> String {
    let lower = text.to_lowercase();
    DOCUMENT_TYPES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string())
}

/// First non-blank capture of group 1 across all matches.
fn first_capture<'t>(pattern: &Regex, text: &'t str) -> Option<&'t str> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|value| !value.trim().is_empty())
}

fn score(kind: FieldKind, value: &str) -> f32 {
    match kind.category() {
        FieldCategory::Numeric => {
            if STRICT_VALUE.is_match(value) {
                0.95
            } else {
                0.75
            }
        }
        FieldCategory::Address => {
            if value.chars().count() > 10 {
                0.85
            } else {
                0.60
            }
        }
        FieldCategory::Text => 0.80,
    }
}

/// Collapse whitespace runs and bound the length.
fn normalize_address(raw: &str, max_chars: usize) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ").into_owned();
    if collapsed.chars().count() > max_chars {
        let mut truncated: String = collapsed.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    } else {
        collapsed
    }
}

fn largest_amount(text: &str) -> Option<String> {
    FALLBACK_CURRENCY
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            let amount = Decimal::from_str(&raw.replace(',', "")).ok()?;
            Some((amount, raw))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw.to_string())
}
