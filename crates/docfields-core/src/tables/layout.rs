//! Document layout templates for line-item reconstruction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::document::LineItem;

lazy_static! {
    static ref ITEM_BOUNDARY: Regex = Regex::new(r"^\d{2,3}$").unwrap();
    static ref UNIT_CODE: Regex = Regex::new(r"^[A-Z]{1,4}$").unwrap();
    static ref QUANTITY: Regex = Regex::new(r"^\d{1,6}$").unwrap();
    static ref PART_NUMBER: Regex = Regex::new(r"^\d{10,}$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"^\$?\d[\d,]*\.\d{2,4}$").unwrap();
    static ref PERCENT: Regex = Regex::new(r"^\d{1,3}(?:\.\d+)?\s?%$").unwrap();
    static ref TOTALS_MARKER: Regex =
        Regex::new(r"(?i)^(?:sub[\s\-]?total|grand\s+total)\b").unwrap();
}

/// Describes how one document layout prints its item table.
///
/// The scan loop in [`super::LineItemReconstructor`] is layout-agnostic; a
/// template only answers questions about individual lines and blocks.
pub trait LayoutTemplate: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Number of lines searched for the header tokens.
    fn header_window(&self) -> usize {
        10
    }

    /// If a header starts at `start`, return the index of its last line.
    fn header_end(&self, lines: &[&str], start: usize) -> Option<usize>;

    /// Whether the line opens a new item block.
    fn is_item_boundary(&self, line: &str) -> bool;

    /// Whether the line ends the item table.
    fn is_terminator(&self, line: &str) -> bool;

    /// Whether the line looks like the header printed again.
    fn is_repeated_header(&self, line: &str) -> bool;

    /// Number of lines in one item block, boundary line included.
    fn stride(&self) -> usize;

    /// Populate a line item from a block starting at its boundary line.
    fn parse_block(&self, block: &[&str]) -> Option<LineItem>;
}

/// Purchase order layout: one value per line, eleven lines per item.
///
/// | offset | column                  |
/// |--------|-------------------------|
/// | 0      | item number (10, 20, …) |
/// | 1      | unit code               |
/// | 2      | quantity                |
/// | 3      | part number (10+ digits)|
/// | 4, 5   | description             |
/// | 6      | due date (ISO)          |
/// | 7      | price                   |
/// | 8      | tax percent             |
/// | 9      | discount percent        |
/// | 10     | line total              |
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderLayout;

const HEADER_TOKENS: [&str; 4] = ["ITEM", "UNIT", "QTY", "DESCRIPTION"];

impl PurchaseOrderLayout {
    pub fn new() -> Self {
        Self
    }
}

fn tokens(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_uppercase())
}

fn has_token(line: &str, token: &str) -> bool {
    tokens(line).any(|t| t == token)
}

fn field_at(block: &[&str], offset: usize, pattern: &Regex) -> String {
    block
        .get(offset)
        .map(|line| line.trim())
        .filter(|line| pattern.is_match(line))
        .map(str::to_string)
        .unwrap_or_default()
}

fn description_at(block: &[&str], offsets: &[usize]) -> String {
    offsets
        .iter()
        .filter_map(|offset| block.get(*offset))
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !ISO_DATE.is_match(line) && !AMOUNT.is_match(line))
        .collect::<Vec<_>>()
        .join(" ")
}

impl LayoutTemplate for PurchaseOrderLayout {
    fn name(&self) -> &str {
        "purchase-order-11-line"
    }

    fn header_end(&self, lines: &[&str], start: usize) -> Option<usize> {
        if !has_token(lines.get(start)?, "ITEM") {
            return None;
        }

        let end = (start + self.header_window()).min(lines.len());
        let mut seen = [false; HEADER_TOKENS.len()];

        // The header ends on the line that completes the token set. Item
        // text after it may repeat a token and must not extend the header.
        for (idx, line) in lines.iter().enumerate().take(end).skip(start) {
            if idx > start && self.is_item_boundary(line) {
                return None;
            }
            for (token, found) in HEADER_TOKENS.iter().zip(seen.iter_mut()) {
                *found |= has_token(line, token);
            }
            if seen.iter().all(|found| *found) {
                return Some(idx);
            }
        }
        None
    }

    fn is_item_boundary(&self, line: &str) -> bool {
        let line = line.trim();
        ITEM_BOUNDARY.is_match(line) && line.parse::<u32>().is_ok_and(|n| n >= 10)
    }

    fn is_terminator(&self, line: &str) -> bool {
        TOTALS_MARKER.is_match(line.trim())
    }

    fn is_repeated_header(&self, line: &str) -> bool {
        line.trim_start().starts_with("ITEM")
    }

    fn stride(&self) -> usize {
        11
    }

    fn parse_block(&self, block: &[&str]) -> Option<LineItem> {
        let item = LineItem {
            item_number: block.first()?.trim().to_string(),
            unit: field_at(block, 1, &UNIT_CODE),
            quantity: field_at(block, 2, &QUANTITY),
            part_number: field_at(block, 3, &PART_NUMBER),
            description: description_at(block, &[4, 5]),
            due_date: field_at(block, 6, &ISO_DATE),
            price: field_at(block, 7, &AMOUNT),
            tax_percent: field_at(block, 8, &PERCENT),
            discount: field_at(block, 9, &PERCENT),
            line_total: field_at(block, 10, &AMOUNT),
        };

        item.has_identity().then_some(item)
    }
}
