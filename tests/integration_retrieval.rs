#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end retrieval against mocked embedding and completion endpoints

use cdmo_reports::config::{EmbeddingsConfig, LlmConfig};
use cdmo_reports::embeddings::{ChunkingConfig, OpenAiEmbedder, chunk_document};
use cdmo_reports::http::JsonHttpClient;
use cdmo_reports::index::RetrievalContext;
use cdmo_reports::llm::LlmBackend;
use cdmo_reports::rag::{NOTHING_INDEXED, NOTHING_RELEVANT, query_with_rag};
use serde_json::{Value, json};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const DIMENSION: usize = 4;

const DOC1: &str = "\
Acrylic acid is produced by propylene oxidation.
The boiling point of acrylic acid is 141 C.
Inhibitors prevent polymerization during storage.
Major capacity sits in Europe and Asia-Pacific.";

const DOC2: &str = "\
Supplier Zeta has two plants.
Payment terms are net 60 days.";

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}

// Vector from simple character statistics of the request input
fn embed_request(request: &Request) -> ResponseTemplate {
    let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
    let input = body["input"].as_str().unwrap_or_default();
    let count = |predicate: fn(&char) -> bool| input.chars().filter(predicate).count() as f32;

    let vector = vec![
        count(|c| c.is_alphabetic()),
        count(|c| c.is_ascii_digit()),
        count(|c| c.is_whitespace()),
        count(|c| "aeiouAEIOU".contains(*c)),
    ];
    ResponseTemplate::new(200).set_body_json(json!({"data": [{"embedding": vector}]}))
}

async fn start_mock_services() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(embed_request)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Acrylic acid boils at 141 C."}}]
        })))
        .mount(&server)
        .await;
    server
}

fn embedder_for(server: &MockServer) -> OpenAiEmbedder {
    let config = EmbeddingsConfig {
        base_url: Some(server.uri()),
        api_key: Some("sk-test".to_string()),
        dimension: DIMENSION,
        ..EmbeddingsConfig::default()
    };
    OpenAiEmbedder::new(&config)
        .expect("should create embedder")
        .with_http_client(
            JsonHttpClient::new(Duration::from_secs(5), 2)
                .with_backoff_unit(Duration::from_millis(5)),
        )
}

fn llm_for(server: &MockServer) -> LlmBackend {
    let config = LlmConfig {
        model: "gpt-4".to_string(),
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: server.uri(),
        timeout_seconds: 5,
        ..LlmConfig::default()
    };
    LlmBackend::from_config(&config).expect("should select OpenAI backend")
}

// One line per chunk
fn line_chunking() -> ChunkingConfig {
    ChunkingConfig {
        max_tokens: 50,
        chars_per_token: 1,
    }
}

#[tokio::test]
async fn ingest_then_query_round_trip() {
    init_test_tracing();
    let server = start_mock_services().await;
    let embedder = embedder_for(&server);
    let llm = llm_for(&server);
    let temp_dir = TempDir::new().expect("should create temp dir");
    let reports = temp_dir.path().join("reports");

    let mut context = RetrievalContext::new(&reports, DIMENSION);
    assert_eq!(
        query_with_rag(&mut context, &embedder, &llm, "anything")
            .await
            .expect("query on empty index"),
        NOTHING_INDEXED
    );

    let chunks = chunk_document("doc1.pdf", DOC1, &line_chunking());
    assert_eq!(chunks.len(), 4);

    let report = context
        .ingest(&chunks, &embedder)
        .await
        .expect("ingest should succeed");
    assert_eq!(report.stored, 4);
    assert!(reports.join("faiss_index.bin").exists());
    assert!(reports.join("faiss_metadata.json").exists());

    // a fresh context sees the persisted state
    let mut fresh = RetrievalContext::new(&reports, DIMENSION);
    let answer = query_with_rag(
        &mut fresh,
        &embedder,
        &llm,
        "What is the boiling point of acrylic acid?",
    )
    .await
    .expect("query should succeed");

    assert_eq!(answer, "Acrylic acid boils at 141 C.");
    assert_ne!(answer, NOTHING_RELEVANT);
    assert_eq!(fresh.len(), 4);

    let hits = fresh
        .search(&[34.0, 3.0, 8.0, 13.0], 3)
        .expect("search should succeed");
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|hit| hit.record.file_name == "doc1.pdf"));
}

#[tokio::test]
async fn second_document_appends_to_index() {
    init_test_tracing();
    let server = start_mock_services().await;
    let embedder = embedder_for(&server);
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut context = RetrievalContext::new(temp_dir.path(), DIMENSION);
    context
        .ingest(&chunk_document("doc1.pdf", DOC1, &line_chunking()), &embedder)
        .await
        .expect("ingest doc1");
    context
        .ingest(&chunk_document("doc2.pdf", DOC2, &line_chunking()), &embedder)
        .await
        .expect("ingest doc2");

    let mut reloaded = RetrievalContext::new(temp_dir.path(), DIMENSION);
    assert!(reloaded.load().await.expect("load should succeed"));
    assert_eq!(reloaded.len(), 6);

    let labels_match_positions = reloaded
        .metadata()
        .iter()
        .zip(["doc1.pdf"; 4].iter().chain(["doc2.pdf"; 2].iter()))
        .all(|(record, expected)| record.file_name == *expected);
    assert!(labels_match_positions);

    let hits = reloaded
        .search(&[22.0, 2.0, 5.0, 7.0], 1)
        .expect("search should succeed");
    assert_eq!(hits[0].record.file_name, "doc2.pdf");
    assert_eq!(hits[0].record.chunk_id, 1);
}
