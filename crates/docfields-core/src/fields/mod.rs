//! Rule-based field extraction for business documents.

mod extractor;
pub mod patterns;

pub use extractor::{PatternFieldExtractor, classify_document_type};

use regex::Regex;

use patterns::*;

/// The eleven fields the local extractor always reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    PoNumber,
    VendorName,
    VendorAddress,
    ShipToAddress,
    OrderDate,
    RequiredDate,
    TotalAmount,
    Subtotal,
    PhoneNumber,
    FaxNumber,
    ShipVia,
}

/// How primary-pattern matches are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// Identifiers, amounts, dates and phone numbers.
    Numeric,
    /// Multi-line postal addresses.
    Address,
    /// Free text.
    Text,
}

impl FieldKind {
    /// All fields, in reporting order.
    pub const ALL: [FieldKind; 11] = [
        FieldKind::PoNumber,
        FieldKind::VendorName,
        FieldKind::VendorAddress,
        FieldKind::ShipToAddress,
        FieldKind::OrderDate,
        FieldKind::RequiredDate,
        FieldKind::TotalAmount,
        FieldKind::Subtotal,
        FieldKind::PhoneNumber,
        FieldKind::FaxNumber,
        FieldKind::ShipVia,
    ];

    /// Canonical display name.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::PoNumber => "PO Number",
            FieldKind::VendorName => "Vendor Name",
            FieldKind::VendorAddress => "Vendor Address",
            FieldKind::ShipToAddress => "Ship To Address",
            FieldKind::OrderDate => "Order Date",
            FieldKind::RequiredDate => "Required Date",
            FieldKind::TotalAmount => "Total Amount",
            FieldKind::Subtotal => "Subtotal",
            FieldKind::PhoneNumber => "Phone Number",
            FieldKind::FaxNumber => "Fax Number",
            FieldKind::ShipVia => "Ship Via",
        }
    }

    pub fn category(&self) -> FieldCategory {
        match self {
            FieldKind::VendorAddress | FieldKind::ShipToAddress => FieldCategory::Address,
            FieldKind::VendorName | FieldKind::ShipVia => FieldCategory::Text,
            _ => FieldCategory::Numeric,
        }
    }

    /// Primary patterns in priority order.
    pub fn patterns(&self) -> &'static [Regex] {
        match self {
            FieldKind::PoNumber => PO_NUMBER_PATTERNS.as_slice(),
            FieldKind::VendorName => VENDOR_NAME_PATTERNS.as_slice(),
            FieldKind::VendorAddress => VENDOR_ADDRESS_PATTERNS.as_slice(),
            FieldKind::ShipToAddress => SHIP_TO_PATTERNS.as_slice(),
            FieldKind::OrderDate => ORDER_DATE_PATTERNS.as_slice(),
            FieldKind::RequiredDate => REQUIRED_DATE_PATTERNS.as_slice(),
            FieldKind::TotalAmount => TOTAL_AMOUNT_PATTERNS.as_slice(),
            FieldKind::Subtotal => SUBTOTAL_PATTERNS.as_slice(),
            FieldKind::PhoneNumber => PHONE_PATTERNS.as_slice(),
            FieldKind::FaxNumber => FAX_PATTERNS.as_slice(),
            FieldKind::ShipVia => SHIP_VIA_PATTERNS.as_slice(),
        }
    }

    /// Resolve a display name or loosely written key to a field.
    ///
    /// Matching ignores case and any non-alphanumeric characters, so
    /// `po_number`, `poNumber` and `PO Number` all resolve.
    pub fn from_key(key: &str) -> Option<FieldKind> {
        let normalized: String = key
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let kind = match normalized.as_str() {
            "ponumber" | "po" | "pono" | "purchaseorder" | "purchaseordernumber"
            | "purchaseorderno" | "ordernumber" => FieldKind::PoNumber,
            "vendorname" | "vendor" | "supplier" | "suppliername" | "seller" | "sellername" => {
                FieldKind::VendorName
            }
            "vendoraddress" | "supplieraddress" | "selleraddress" | "remitto"
            | "remittoaddress" => FieldKind::VendorAddress,
            "shiptoaddress" | "shipto" | "shippingaddress" | "deliveryaddress" | "deliverto" => {
                FieldKind::ShipToAddress
            }
            "orderdate" | "podate" | "date" | "issuedate" | "documentdate" => FieldKind::OrderDate,
            "requireddate" | "requiredby" | "duedate" | "deliverydate" | "needbydate" => {
                FieldKind::RequiredDate
            }
            "totalamount" | "total" | "ordertotal" | "grandtotal" | "amountdue" => {
                FieldKind::TotalAmount
            }
            "subtotal" | "subtotalamount" | "nettotal" => FieldKind::Subtotal,
            "phonenumber" | "phone" | "telephone" | "tel" | "vendorphone" => {
                FieldKind::PhoneNumber
            }
            "faxnumber" | "fax" | "vendorfax" => FieldKind::FaxNumber,
            "shipvia" | "shippingmethod" | "shipmethod" | "carrier" => FieldKind::ShipVia,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a raw key onto its canonical field name, keeping unknown keys as-is.
pub fn canonical_key(key: &str) -> String {
    FieldKind::from_key(key)
        .map(|kind| kind.name().to_string())
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_variants_resolve() {
        for key in ["po_number", "poNumber", "purchaseOrder", "PO Number", "PO-No"] {
            assert_eq!(FieldKind::from_key(key), Some(FieldKind::PoNumber), "{key}");
        }
        assert_eq!(FieldKind::from_key("vendor.name"), Some(FieldKind::VendorName));
        assert_eq!(FieldKind::from_key("ship_via"), Some(FieldKind::ShipVia));
        assert_eq!(FieldKind::from_key("buyer_email"), None);
    }

    #[test]
    fn test_canonical_key_defaults_to_raw() {
        assert_eq!(canonical_key("vendorName"), "Vendor Name");
        assert_eq!(canonical_key("terms"), "terms");
    }

    #[test]
    fn test_names_round_trip() {
        for kind in FieldKind::ALL {
            assert_eq!(FieldKind::from_key(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(FieldKind::ShipToAddress.category(), FieldCategory::Address);
        assert_eq!(FieldKind::OrderDate.category(), FieldCategory::Numeric);
        assert_eq!(FieldKind::ShipVia.category(), FieldCategory::Text);
    }
}
