use super::*;
use crate::http::JsonHttpClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config(base_url: &str, dimension: usize) -> EmbeddingsConfig {
    EmbeddingsConfig {
        base_url: Some(base_url.to_string()),
        api_key: Some("sk-test".to_string()),
        dimension,
        ..EmbeddingsConfig::default()
    }
}

fn fast_http() -> JsonHttpClient {
    JsonHttpClient::new(Duration::from_secs(5), 2).with_backoff_unit(Duration::from_millis(5))
}

#[test]
fn openai_requires_api_key() {
    let config = EmbeddingsConfig::default();
    assert!(matches!(
        OpenAiEmbedder::new(&config),
        Err(ReportError::Config(_))
    ));
}

#[test]
fn build_embedder_respects_provider() {
    let config = EmbeddingsConfig {
        provider: EmbeddingProvider::Ollama,
        dimension: 768,
        ..EmbeddingsConfig::default()
    };
    let embedder = build_embedder(&config).expect("ollama needs no key");
    assert_eq!(embedder.dimension(), 768);
}

#[tokio::test]
async fn openai_embedding_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "text-embedding-ada-002",
            "input": "acrylic acid"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config(&server.uri(), 3))
        .expect("should create embedder")
        .with_http_client(fast_http());

    let vector = embedder
        .embed("acrylic acid")
        .await
        .expect("embedding should succeed");
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn openai_dimension_mismatch_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1, 0.2]}]
        })))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config(&server.uri(), 1536))
        .expect("should create embedder")
        .with_http_client(fast_http());

    let result = embedder.embed("text").await;
    assert!(matches!(
        result,
        Err(ReportError::DimensionMismatch {
            expected: 1536,
            actual: 2
        })
    ));
}

#[tokio::test]
async fn openai_empty_data_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config(&server.uri(), 3))
        .expect("should create embedder")
        .with_http_client(fast_http());

    assert!(matches!(
        embedder.embed("text").await,
        Err(ReportError::Embedding(_))
    ));
}

#[tokio::test]
async fn openai_server_errors_surface_as_embedding_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(&openai_config(&server.uri(), 3))
        .expect("should create embedder")
        .with_http_client(fast_http());

    assert!(matches!(
        embedder.embed("text").await,
        Err(ReportError::Embedding(_))
    ));
}

#[tokio::test]
async fn ollama_embedding_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({"model": "nomic-embed-text", "input": "supplier"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[1.0, 0.0, -1.0]]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = EmbeddingsConfig {
        provider: EmbeddingProvider::Ollama,
        model: "nomic-embed-text".to_string(),
        dimension: 3,
        base_url: Some(server.uri()),
        ..EmbeddingsConfig::default()
    };
    let embedder = OllamaEmbedder::new(&config)
        .expect("should create embedder")
        .with_http_client(fast_http());

    let vector = embedder
        .embed("supplier")
        .await
        .expect("embedding should succeed");
    assert_eq!(vector, vec![1.0, 0.0, -1.0]);
}
