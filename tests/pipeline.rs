//! End-to-end pipeline runs against a real PDF and a mock store endpoint.

use corpus_ingest::config::IngestOptions;
use corpus_ingest::ingest::IngestService;
use corpus_ingest::ledger::ChecksumLedger;
use corpus_ingest::store::HttpChunkStore;
use httpmock::{Method::POST, MockServer};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::Path;

/// Build a minimal but valid PDF with one text page per entry.
fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (index, line) in text.lines().enumerate() {
            if index > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

const PAGE_TEXT: &str = "The coastal field guide opens with an overview of tidal flats.\n\
    Mudflats shelter burrowing clams, ragworms, and wading birds.\n\
    Salt marshes develop behind the flats where sediment settles.\n\
    Each habitat section lists the species a visitor is likely to meet.";

fn service_for(server: &MockServer, ledger_path: &Path) -> IngestService {
    let store = HttpChunkStore::with_endpoint(&server.base_url(), "library", None)
        .expect("store client");
    let ledger = ChecksumLedger::load(ledger_path);
    IngestService::new(Box::new(store), ledger, IngestOptions::default())
}

#[tokio::test]
async fn batch_ingests_a_real_pdf_then_skips_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf_dir = dir.path().join("pdfs");
    std::fs::create_dir(&pdf_dir).expect("mkdir");
    std::fs::write(pdf_dir.join("field_guide.pdf"), build_pdf(&[PAGE_TEXT])).expect("write pdf");
    let ledger_path = dir.path().join("ledger.json");

    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/collections/library/documents")
                .body_contains("Field Guide");
            then.status(200).json_body(serde_json::json!({ "status": "ok" }));
        })
        .await;

    let mut service = service_for(&server, &ledger_path);
    let stats = service.run_batch(&pdf_dir, false).await;
    assert_eq!(stats.files_processed, 1, "errors: {:?}", stats.errors);
    assert_eq!(stats.files_skipped, 0);
    assert!(stats.total_chunks >= 1);
    assert!(stats.errors.is_empty());
    assert_eq!(mock.hits_async().await, 1);

    // A fresh service reloading the persisted ledger must skip the file.
    let mut service = service_for(&server, &ledger_path);
    let stats = service.run_batch(&pdf_dir, false).await;
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(mock.hits_async().await, 1);

    // Forcing reprocesses even though the checksum is unchanged.
    let mut service = service_for(&server, &ledger_path);
    let stats = service.run_batch(&pdf_dir, true).await;
    assert_eq!(stats.files_processed, 1);
    assert_eq!(mock.hits_async().await, 2);
}

#[tokio::test]
async fn store_rejection_keeps_the_file_retryable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pdf_dir = dir.path().join("pdfs");
    std::fs::create_dir(&pdf_dir).expect("mkdir");
    std::fs::write(pdf_dir.join("field_guide.pdf"), build_pdf(&[PAGE_TEXT])).expect("write pdf");
    let ledger_path = dir.path().join("ledger.json");

    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(POST).path("/collections/library/documents");
            then.status(500).body("unavailable");
        })
        .await;

    let mut service = service_for(&server, &ledger_path);
    let stats = service.run_batch(&pdf_dir, false).await;
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.errors[0].message.contains("Store rejected"));

    failing.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/collections/library/documents");
            then.status(200);
        })
        .await;

    // No checksum was recorded, so the next run reattempts the file.
    let mut service = service_for(&server, &ledger_path);
    let stats = service.run_batch(&pdf_dir, false).await;
    assert_eq!(stats.files_processed, 1);
    assert!(stats.errors.is_empty());
}

#[tokio::test]
async fn empty_directory_yields_zeroed_stats() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = MockServer::start_async().await;

    let mut service = service_for(&server, &dir.path().join("ledger.json"));
    let stats = service.run_batch(dir.path(), false).await;
    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(stats.total_chunks, 0);
    assert!(stats.errors.is_empty());
}
