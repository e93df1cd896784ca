//! Parsing of chat-completion content into fields.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::error::AiError;
use crate::fields::canonical_key;
use crate::models::document::ExtractedField;

/// Confidence of fields read from a JSON response.
pub const JSON_FIELD_CONFIDENCE: f32 = 0.90;
/// Confidence of fields read from a free-text response.
pub const TEXT_FIELD_CONFIDENCE: f32 = 0.85;

/// Parse model output into canonical fields.
///
/// Strict JSON is preferred; anything else goes through the line parser.
/// A response that yields no fields at all is rejected.
pub fn parse_response(content: &str) -> Result<Vec<ExtractedField>, AiError> {
    let body = strip_code_fences(content);

    let fields = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => flatten_json(Value::Object(map)),
        Ok(other) => {
            debug!("AI response is JSON but not an object ({})", json_kind(&other));
            parse_text(body)
        }
        Err(e) => {
            debug!("AI response is not JSON ({}), using line parser", e);
            parse_text(body)
        }
    };

    if fields.is_empty() {
        let preview: String = body.chars().take(200).collect();
        return Err(AiError::InvalidResponse(format!("no fields in response: {preview}")));
    }
    Ok(fields)
}

/// Remove markdown code fences around the payload.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let inner = &trimmed[start + 3..];
    let inner = match inner.find('\n') {
        Some(newline) if is_language_tag(inner[..newline].trim()) => &inner[newline + 1..],
        _ => inner,
    };
    inner.split("```").next().unwrap_or(inner).trim()
}

/// `json`, `c++`, `objective-c` and the like. An empty tag counts.
fn is_language_tag(line: &str) -> bool {
    line.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_sentinel(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.is_empty()
        || lower.contains("not found")
        || matches!(lower.as_str(), "null" | "none" | "n/a")
}

fn is_scalar(value: &Value) -> bool {
    !value.is_object() && !value.is_array()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flatten a JSON object into dotted key paths using an explicit stack.
fn flatten_json(root: Value) -> Vec<ExtractedField> {
    let mut fields = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<(String, Value)> = vec![(String::new(), root)];

    while let Some((path, value)) = stack.pop() {
        match value {
            Value::Object(map) => {
                let children: Vec<_> = map
                    .into_iter()
                    .map(|(key, child)| (join_path(&path, &key), child))
                    .collect();
                stack.extend(children.into_iter().rev());
            }
            Value::Array(items) if items.iter().all(is_scalar) => {
                let joined = items
                    .iter()
                    .filter_map(scalar_text)
                    .filter(|s| !is_sentinel(s))
                    .collect::<Vec<_>>()
                    .join(", ");
                push_field(&mut fields, &mut seen, &path, joined);
            }
            Value::Array(items) => {
                let children: Vec<_> = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| (format!("{path}[{i}]"), child))
                    .collect();
                stack.extend(children.into_iter().rev());
            }
            Value::Null => {}
            scalar => {
                if let Some(text) = scalar_text(&scalar) {
                    push_field(&mut fields, &mut seen, &path, text);
                }
            }
        }
    }

    fields
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn push_field(
    fields: &mut Vec<ExtractedField>,
    seen: &mut HashSet<String>,
    path: &str,
    value: String,
) {
    if path.is_empty() || is_sentinel(&value) {
        return;
    }
    let key = canonical_key(path);
    if seen.insert(key.clone()) {
        fields.push(ExtractedField::new(key, value, JSON_FIELD_CONFIDENCE));
    }
}

/// Parse `key: value` and `key - value` lines.
fn parse_text(body: &str) -> Vec<ExtractedField> {
    let mut fields = Vec::new();
    let mut seen = HashSet::new();

    for line in body.lines() {
        let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
        let Some((key, value)) = line.split_once(':').or_else(|| line.split_once(" - ")) else {
            continue;
        };

        let key = key.trim().trim_matches(|c: char| c == '"' || c == '*').trim();
        let value = value.trim().trim_matches(|c: char| c == '"' || c == ',').trim();
        if key.is_empty() || key.len() > 60 || is_sentinel(value) {
            continue;
        }

        let key = canonical_key(key);
        if seen.insert(key.clone()) {
            fields.push(ExtractedField::new(key, value, TEXT_FIELD_CONFIDENCE));
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fenced_json() {
        let fields = parse_response("```json\n{\"vendorName\": \"Acme LLC\"}\n```").unwrap();
        assert_eq!(fields, vec![ExtractedField::new("Vendor Name", "Acme LLC", 0.90)]);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_compact_json_after_fence_is_kept() {
        let content = "```{\"po_number\":\"PR028561\",\n\"ship_via\":\"UPS\"}```";
        assert_eq!(
            strip_code_fences(content),
            "{\"po_number\":\"PR028561\",\n\"ship_via\":\"UPS\"}"
        );

        let fields = parse_response(content).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], ExtractedField::new("Ship Via", "UPS", 0.90));
    }

    #[test]
    fn test_nested_objects_flatten_in_order() {
        let content = r#"{
            "po_number": "PR028561",
            "vendor": {"name": "Acme LLC", "contact": {"email": "ap@acme.test"}},
            "total": 689.25,
            "fax": null,
            "ship_via": ""
        }"#;
        let fields = parse_response(content).unwrap();
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("PO Number", "PR028561"),
                ("Vendor Name", "Acme LLC"),
                ("vendor.contact.email", "ap@acme.test"),
                ("Total Amount", "689.25"),
            ]
        );
    }

    #[test]
    fn test_arrays() {
        let content = r#"{"notes": ["net 30", "fob origin"], "lines": [{"sku": "A1"}, {"sku": "B2"}]}"#;
        let fields = parse_response(content).unwrap();

        assert_eq!(fields[0].key, "notes");
        assert_eq!(fields[0].value, "net 30, fob origin");
        assert_eq!(fields[1].key, "lines[0].sku");
        assert_eq!(fields[2].key, "lines[1].sku");
        assert_eq!(fields[2].value, "B2");
    }

    #[test]
    fn test_first_duplicate_wins() {
        let fields = parse_response(r#"{"poNumber": "A1", "po_number": "B2"}"#).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "A1");
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100;
        let content = format!("{}\"x\"{}", "{\"a\":".repeat(depth), "}".repeat(depth));
        let fields = parse_response(&content).unwrap();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key.matches('.').count(), depth - 1);
        assert_eq!(fields[0].value, "x");
    }

    #[test]
    fn test_text_fallback() {
        let content = "Here is what I found:\nPO Number: PR028561\nVendor Name - Acme LLC\nFax Number: Not found\n";
        let fields = parse_response(content).unwrap();

        assert_eq!(
            fields,
            vec![
                ExtractedField::new("PO Number", "PR028561", 0.85),
                ExtractedField::new("Vendor Name", "Acme LLC", 0.85),
            ]
        );
    }

    #[test]
    fn test_empty_response_is_invalid() {
        assert!(matches!(parse_response("{}"), Err(AiError::InvalidResponse(_))));
        assert!(matches!(
            parse_response("I could not read this document."),
            Err(AiError::InvalidResponse(_))
        ));
    }
}
