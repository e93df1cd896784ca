use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;

fn write_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![14.into()]),
        Operation::new("Td", vec![50.into(), 780.into()]),
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
    doc.save(path).unwrap();
}

/// A command isolated from the caller's credentials and config files.
fn docfields(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docfields").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("AZURE_OPENAI_API_KEY")
        .env_remove("AZURE_OPENAI_ENDPOINT")
        .env_remove("AZURE_OPENAI_DEPLOYMENT")
        .env_remove("AZURE_OPENAI_API_VERSION")
        .env_remove("DOCFIELDS_OUTPUT_DIR");
    cmd
}

#[test]
fn process_without_credentials_runs_locally() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("po.pdf");
    write_pdf(&input, &["PURCHASE ORDER", "PO No.: PR028561", "Order Total: $689.25"]);

    docfields(dir.path())
        .args(["process", "po.pdf", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AI not configured"))
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("_po.pdf.json"));

    let written = std::fs::read_dir(dir.path().join("out")).unwrap().count();
    assert_eq!(written, 1);
    assert!(input.exists());
}

#[test]
fn process_local_only_ignores_credentials() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("po.pdf"), &["PO No.: PR028561"]);

    docfields(dir.path())
        .env("AZURE_OPENAI_API_KEY", "unused")
        .env("AZURE_OPENAI_ENDPOINT", "http://127.0.0.1:9")
        .args(["process", "po.pdf", "--local-only", "--format", "csv", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("key,value,confidence"))
        .stdout(predicate::str::contains("PO Number"));
}

#[test]
fn process_text_format_with_confidence() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("po.pdf"), &["PO No.: PR028561"]);

    docfields(dir.path())
        .args(["process", "po.pdf", "-f", "text", "--show-confidence", "--output-dir", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Method: local pattern matching"))
        .stdout(predicate::str::contains("Average confidence"));
}

#[test]
fn process_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    docfields(dir.path())
        .args(["process", "missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "PO No.: PR028561").unwrap();

    docfields(dir.path())
        .args(["process", "notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();

    docfields(dir.path())
        .args(["config", "init", "--output", "docfields.json"])
        .assert()
        .success();

    docfields(dir.path())
        .args(["config", "init", "--output", "docfields.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    docfields(dir.path())
        .env("AZURE_OPENAI_API_KEY", "super-secret")
        .args(["--config", "docfields.json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"timeout_secs\": 30"))
        .stdout(predicate::str::contains("super-secret").not());
}
