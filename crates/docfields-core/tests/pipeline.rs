//! End-to-end extraction scenarios.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docfields_core::models::config::AiConfig;
use docfields_core::{
    AiError, AiExtractionClient, ChatRequest, ChatTransport, DocfieldsConfig, Document,
    ExtractionOrchestrator, ExtractionResult, OutputWriter, ProcessingMethod, StagedUpload, Table,
};
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use pretty_assertions::assert_eq;

const PURCHASE_ORDER: &str = "PURCHASE ORDER
PO No.: PR028561
Order Date: 2024-03-15
Vendor: Acme Industrial Supply LLC
Ship Via: UPS Ground
ITEM UNIT QTY PART NUMBER DESCRIPTION DUE DATE PRICE TAX DISC TOTAL
10
EA
5
4412000193
Hex bolt M8
Zinc plated
2024-04-01
$12.50
7.25%
0%
$62.50
Subtotal: $650.00
Order Total: $689.25
";

struct Replay {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Mutex<usize>,
}

impl Replay {
    fn new(responses: Vec<Result<String, AiError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatTransport for Replay {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, AiError> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Network("connection refused".to_string())))
    }
}

fn ai_config() -> AiConfig {
    AiConfig {
        api_key: Some("test-key".to_string()),
        api_url: Some("https://example.openai.azure.com".to_string()),
        ..AiConfig::default()
    }
}

fn local_orchestrator(out: &std::path::Path) -> ExtractionOrchestrator {
    ExtractionOrchestrator::from_config(&DocfieldsConfig::default())
        .unwrap()
        .with_writer(OutputWriter::new(out))
}

fn ai_orchestrator(transport: Arc<Replay>, out: &std::path::Path) -> ExtractionOrchestrator {
    local_orchestrator(out)
        .with_ai_client(AiExtractionClient::with_transport(transport, &ai_config()))
}

fn document() -> Document {
    Document::from_text("po.pdf", 4096, PURCHASE_ORDER, 1)
}

fn pdf_bytes(lines: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 11.into()]),
        Operation::new("TL", vec![13.into()]),
        Operation::new("Td", vec![40.into(), 800.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        Content { operations }.encode().unwrap(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

#[tokio::test]
async fn local_only_without_credentials() {
    let out = tempfile::tempdir().unwrap();
    let extraction = local_orchestrator(out.path()).extract(&document()).await;

    assert!(extraction.message.contains("AI not configured"));
    assert!(extraction.ai_error.is_none());

    let result = extraction.result;
    let po = result.field("PO Number").unwrap();
    assert_eq!(po.value, "PR028561");
    assert!(po.confidence >= 0.90);
    assert_eq!(result.field("Total Amount").unwrap().value, "689.25");
    assert_eq!(result.key_value_pairs.len(), 11);
    assert!(result.key_value_pairs.iter().all(|f| (0.0..=1.0).contains(&f.confidence)));

    match &result.tables[0] {
        Table::LineItems { items, .. } => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].description, "Hex bolt M8 Zinc plated");
        }
        other => panic!("expected line items first, got {other:?}"),
    }
}

#[tokio::test]
async fn ai_success_uses_model_fields() {
    let out = tempfile::tempdir().unwrap();
    let transport = Replay::new(vec![Ok(
        "```json\n{\"vendorName\":\"Acme LLC\"}\n```".to_string(),
    )]);

    let extraction = ai_orchestrator(transport.clone(), out.path()).extract(&document()).await;

    assert!(extraction.message.contains("AI Foundry"));
    let vendor = extraction.result.field("Vendor Name").unwrap();
    assert_eq!(vendor.value, "Acme LLC");
    assert_eq!(vendor.confidence, 0.90);
    assert!(extraction.result.field("PO Number").is_none());
    assert_eq!(extraction.result.processing.method, ProcessingMethod::Ai);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn ai_failure_falls_back_to_local() {
    let out = tempfile::tempdir().unwrap();
    let transport = Replay::new(Vec::new());

    let extraction = ai_orchestrator(transport.clone(), out.path()).extract(&document()).await;

    assert_eq!(transport.calls(), 28);
    assert!(extraction.message.contains("local processing"));
    assert!(extraction.message.contains("connection refused"));

    let details = extraction.ai_error.unwrap();
    assert!(details.fallback_used);
    assert!(details.error.contains("connection refused"));

    assert_eq!(
        extraction.result.processing.method,
        ProcessingMethod::LocalPatternMatching
    );
    assert_eq!(extraction.result.field("PO Number").unwrap().value, "PR028561");
}

#[tokio::test]
async fn staged_upload_is_persisted_once_and_removed() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("outputs");
    let staged = work.path().join("staged.bin");
    std::fs::write(&staged, pdf_bytes(&["PURCHASE ORDER", "PO No.: PR028561"])).unwrap();

    let response = local_orchestrator(&out)
        .process_upload(StagedUpload::new(&staged, "uploads/po 1042.pdf"))
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.message.contains("AI not configured"));
    assert!(!staged.exists());

    let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(written.len(), 1);

    let name = written[0].as_ref().unwrap().file_name().into_string().unwrap();
    assert!(name.starts_with("extracted_"));
    assert!(name.ends_with("_po_1042.pdf.json"));

    let saved: ExtractionResult =
        serde_json::from_str(&std::fs::read_to_string(&response.output_file).unwrap()).unwrap();
    assert_eq!(saved.document.name, "uploads/po 1042.pdf");
    assert_eq!(saved.document.page_count, 1);
}

#[tokio::test]
async fn corrupt_upload_is_removed_without_output() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("outputs");
    let staged = work.path().join("staged.bin");
    std::fs::write(&staged, b"%PDF-1.4 truncated").unwrap();

    let result = local_orchestrator(&out)
        .process_upload(StagedUpload::new(&staged, "broken.pdf"))
        .await;

    assert!(result.is_err());
    assert!(!staged.exists());
    assert!(!out.exists());
}

#[tokio::test]
async fn envelope_serializes_camel_case() {
    let out = tempfile::tempdir().unwrap();
    let transport = Replay::new(vec![Err(AiError::Status {
        status: 403,
        message: "forbidden".to_string(),
    })]);

    let response = ai_orchestrator(transport, out.path())
        .process_bytes("po.pdf", &pdf_bytes(&["PO No.: PR028561"]))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert!(json["outputFile"].as_str().unwrap().contains("extracted_"));
    assert_eq!(json["aiErrorDetails"]["fallbackUsed"], true);
    assert_eq!(json["data"]["processing"]["method"], "local pattern matching");
    assert!(json["data"]["keyValuePairs"].is_array());
}
