//! Regex patterns for business document field extraction.
//!
//! Each field has an ordered group of primary patterns (most specific first)
//! and a small set of looser fallback patterns. Every pattern captures the
//! value in group 1.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // PO number
    pub static ref PO_NUMBER_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\bP\.?\s?O\.?\s*(?:No\.?|Number|#)\s*[:#]?\s*([A-Z]{2}\d{6})\b",
        r"(?i)\bPurchase\s+Order\s*(?:No\.?|Number|#)?\s*[:#]?\s*(\d{5,})\b",
        r"(?i)\bP\.?\s?O\.?\s*(?:No\.?|Number|#)\s*[:#]?\s*([A-Z0-9][A-Z0-9\-/]{2,})",
        r"(?i)\bOrder\s*(?:No\.?|Number|#)\s*[:#]?\s*([A-Z0-9][A-Z0-9\-/]{2,})",
    ]);

    // Vendor name
    pub static ref VENDOR_NAME_PATTERNS: Vec<Regex> = compile(&[
        r"(?im)^[ \t]*Vendor(?:[ \t]+Name)?[ \t]*:[ \t]*([^\n]+)$",
        r"(?im)^[ \t]*(?:Supplier|Seller|Sold[ \t]+By)(?:[ \t]+Name)?[ \t]*:[ \t]*([^\n]+)$",
        r"(?im)^[ \t]*(?:Vendor|Supplier)[ \t]*:?[ \t]*\n[ \t]*([^\n]+)$",
        r"(?im)^[ \t]*From[ \t]*:[ \t]*([^\n]+)$",
    ]);

    // Vendor address
    pub static ref VENDOR_ADDRESS_PATTERNS: Vec<Regex> = compile(&[
        r"(?is)Vendor\s+Address\s*:?\s*(.+?)(?:\n[ \t]*\n|Ship\s+To|Bill\s+To\b|Phone|Fax|\z)",
        r"(?is)(?:Vendor|Supplier)[ \t]*:?[ \t]*\n(.+?)(?:\n[ \t]*\n|Ship\s+To|Bill\s+To\b|Phone|Fax|\z)",
        r"(?is)Remit\s+To\s*:?\s*(.+?)(?:\n[ \t]*\n|Ship\s+To|\z)",
    ]);

    // Ship-to address
    pub static ref SHIP_TO_PATTERNS: Vec<Regex> = compile(&[
        r"(?is)\bShip\s+To\b(?:\s+Address)?\s*:?\s*(.+?)(?:\n[ \t]*\n|Bill\s+To\b|Vendor|Phone|Fax|Ship\s+Via|\z)",
        r"(?is)Deliver(?:y)?\s+To\s*:?\s*(.+?)(?:\n[ \t]*\n|Bill\s+To\b|Phone|\z)",
        r"(?is)Shipping\s+Address\s*:?\s*(.+?)(?:\n[ \t]*\n|Bill\s+To\b|Phone|\z)",
    ]);

    // Order date
    pub static ref ORDER_DATE_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\bOrder\s+Date\s*:?\s*(\d{4}-\d{2}-\d{2})",
        r"(?i)\bOrder\s+Date\s*:?\s*(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
        r"(?i)\b(?:PO|Issue|Document)\s+Date\s*:?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
        r"(?i)\bOrder\s+Date\s*:?\s*([A-Z][a-z]{2,8}\.?\s+\d{1,2},?\s+\d{4})",
        r"(?i)\bDate\s*:?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
    ]);

    // Required date
    pub static ref REQUIRED_DATE_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\b(?:Required|Req\.?)\s+(?:Date|By)\s*:?\s*(\d{4}-\d{2}-\d{2})",
        r"(?i)\b(?:Required|Req\.?)\s+(?:Date|By)\s*:?\s*(\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
        r"(?i)\b(?:Due|Delivery|Need\s+By)\s+Date\s*:?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
        r"(?i)\b(?:Required|Req\.?)\s+(?:Date|By)\s*:?\s*([A-Z][a-z]{2,8}\.?\s+\d{1,2},?\s+\d{4})",
    ]);

    // Total amount
    pub static ref TOTAL_AMOUNT_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\b(?:Order|Grand|Invoice)\s+Total\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
        r"(?i)\bTotal\s+(?:Amount|Due)\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
        r"(?i)\bAmount\s+Due\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
        r"(?i)\bTotal\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
    ]);

    // Subtotal
    pub static ref SUBTOTAL_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\bSub[\s\-]?Total\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
        r"(?i)\b(?:Net|Merchandise)\s+(?:Total|Amount)\s*:?\s*\$?\s*(\d[\d,]*\.\d{2})",
    ]);

    // Phone number
    pub static ref PHONE_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\b(?:Phone|Telephone|Tel\.?|Ph\.?)\s*(?:No\.?|#)?\s*:?\s*(\+?1?[\s.\-]?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4})",
        r"(?i)\b(?:Phone|Telephone|Tel\.?)\s*:?\s*(\+?[\d(][\d\s().\-]{5,18}\d)",
    ]);

    // Fax number
    pub static ref FAX_PATTERNS: Vec<Regex> = compile(&[
        r"(?i)\bFax\s*(?:No\.?|#)?\s*:?\s*(\+?1?[\s.\-]?\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4})",
        r"(?i)\bFax\s*:?\s*(\+?[\d(][\d\s().\-]{5,18}\d)",
    ]);

    // Ship via
    pub static ref SHIP_VIA_PATTERNS: Vec<Regex> = compile(&[
        r"(?im)\bShip[ \t]+Via[ \t]*:?[ \t]*([^\s][^\n]*)$",
        r"(?im)\b(?:Carrier|Shipping[ \t]+Method|Ship[ \t]+Method)[ \t]*:?[ \t]*([^\s][^\n]*)$",
        r"(?im)\bShip[ \t]+Via[ \t]*:?[ \t]*\n[ \t]*([^\s][^\n]*)$",
    ]);

    // Fallbacks
    pub static ref FALLBACK_PO_TOKEN: Regex = Regex::new(
        r"\b([A-Z]{2}\d{6}|PO[\-\s]?\d{4,})\b"
    ).unwrap();

    pub static ref FALLBACK_COMPANY_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*([A-Za-z0-9&.,' \-]*\b(?:Inc|LLC|Ltd|Corp|Corporation|Company|Co|GmbH|LLP)\b\.?)[ \t]*$"
    ).unwrap();

    pub static ref FALLBACK_STREET: Regex = Regex::new(
        r"(?m)^[ \t]*(\d{1,6}[ \t]+[A-Za-z0-9 .]+?\b(?:St|Street|Ave|Avenue|Rd|Road|Blvd|Boulevard|Dr|Drive|Ln|Lane|Way|Pkwy|Parkway|Ct|Court)\b\.?[^\n]*(?:\n[ \t]*[A-Za-z .]+,[ \t]*[A-Z]{2}[ \t]+\d{5}(?:-\d{4})?)?)"
    ).unwrap();

    pub static ref FALLBACK_SHIP_BLOCK: Regex = Regex::new(
        r"(?im)^[ \t]*Ship(?:ping)?[ \t]*:?[ \t]*\n[ \t]*([^\n]+(?:\n[ \t]*[^\n]+)?)"
    ).unwrap();

    pub static ref FALLBACK_DATE: Regex = Regex::new(
        r"\b(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4})\b"
    ).unwrap();

    pub static ref FALLBACK_CURRENCY: Regex = Regex::new(
        r"\$\s*(\d[\d,]*\.\d{2})\b"
    ).unwrap();

    pub static ref FALLBACK_SUBTOTAL_LINE: Regex = Regex::new(
        r"(?im)^[^\n]*\bsub[^\n]*?(\d[\d,]*\.\d{2})"
    ).unwrap();

    pub static ref FALLBACK_PHONE: Regex = Regex::new(
        r"(\(?\b\d{3}\)?[\s.\-]\d{3}[\s.\-]\d{4})\b"
    ).unwrap();

    pub static ref FALLBACK_FAX: Regex = Regex::new(
        r"(?im)\bF\b[ \t]*[:.]?[ \t]*(\(?\d{3}\)?[\s.\-]?\d{3}[\s.\-]?\d{4})"
    ).unwrap();

    pub static ref FALLBACK_CARRIER: Regex = Regex::new(
        r"(?i)\b(UPS(?:\s+Ground)?|FedEx(?:\s+Ground)?|USPS|DHL|Best\s+Way|Will\s+Call|Common\s+Carrier|LTL\s+Freight)\b"
    ).unwrap();

    // Confidence shape check for numeric and date fields
    pub static ref STRICT_VALUE: Regex = Regex::new(
        r"^[A-Za-z0-9][A-Za-z0-9\-/.,]*$"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
}
