//! HTTP client implementation of the chunk store capability.

use super::{ChunkStore, StoreError};
use crate::config::get_config;
use crate::ingest::Chunk;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use time::OffsetDateTime;

/// Lightweight HTTP client pushing chunk documents to a store collection.
pub struct HttpChunkStore {
    client: Client,
    base_url: String,
    collection: String,
    api_key: Option<String>,
}

impl HttpChunkStore {
    /// Construct a client using configuration derived from the environment.
    pub fn new() -> Result<Self, StoreError> {
        let config = get_config();
        Self::with_endpoint(
            &config.store_url,
            &config.store_collection,
            config.store_api_key.clone(),
        )
    }

    /// Construct a client against an explicit endpoint.
    pub fn with_endpoint(
        base_url: &str,
        collection: &str,
        api_key: Option<String>,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent("corpus-ingest/0.1")
            .build()?;
        let base_url = normalize_base_url(base_url).map_err(StoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            collection,
            has_api_key = api_key.as_deref().map(|key| !key.is_empty()).unwrap_or(false),
            "Initialized chunk store HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            collection: collection.to_string(),
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut request = self.client.request(method, format!("{base}/{path}"));
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            request = request.header("api-key", api_key);
        }
        request
    }
}

#[async_trait]
impl ChunkStore for HttpChunkStore {
    async fn accept(&self, chunks: &[Chunk]) -> Result<(), StoreError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let now = current_timestamp_rfc3339();
        let documents: Vec<Value> = chunks
            .iter()
            .map(|chunk| build_document(chunk, &now))
            .collect();

        let response = self
            .request(
                Method::POST,
                &format!("collections/{}/documents", self.collection),
            )
            .json(&json!({ "documents": documents }))
            .send()
            .await?;

        if response.status().is_success() {
            tracing::debug!(
                collection = %self.collection,
                chunks = chunks.len(),
                "Chunks accepted by store"
            );
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection = %self.collection, error = %error, "Store rejected chunks");
            Err(error)
        }
    }
}

/// Build the `{text, metadata}` tuple stored for one chunk.
fn build_document(chunk: &Chunk, timestamp_rfc3339: &str) -> Value {
    json!({
        "text": chunk.text,
        "metadata": {
            "source_title": chunk.source_title,
            "page_number": chunk.page_number,
            "chunk_id": chunk.id,
            "chunk_index": chunk.chunk_index,
            "extraction_strategy": chunk.strategy.as_str(),
            "ingested_at": timestamp_rfc3339,
        }
    })
}

/// Current timestamp formatted for document metadata.
fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionStrategy;
    use httpmock::{Method::POST, MockServer};

    fn sample_chunk() -> Chunk {
        Chunk::new(
            "A passage of retrievable text.",
            "Sample Source",
            3,
            1,
            ExtractionStrategy::Lopdf,
        )
        .expect("non-empty chunk")
    }

    #[tokio::test]
    async fn accept_posts_documents_with_metadata() {
        let server = MockServer::start_async().await;
        let chunk = sample_chunk();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/collections/library/documents")
                    .header("api-key", "secret")
                    .body_contains("A passage of retrievable text.")
                    .body_contains("Sample Source")
                    .body_contains("lopdf")
                    .body_contains(&chunk.id);
                then.status(200).json_body(json!({ "status": "ok" }));
            })
            .await;

        let store =
            HttpChunkStore::with_endpoint(&server.base_url(), "library", Some("secret".into()))
                .expect("store client");
        store.accept(&[chunk]).await.expect("accept");
        mock.assert();
    }

    #[tokio::test]
    async fn accept_surfaces_unexpected_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/library/documents");
                then.status(503).body("overloaded");
            })
            .await;

        let store = HttpChunkStore::with_endpoint(&server.base_url(), "library", None)
            .expect("store client");
        let error = store.accept(&[sample_chunk()]).await.unwrap_err();
        assert!(matches!(
            error,
            StoreError::UnexpectedStatus { status, .. } if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn empty_batches_are_not_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/collections/library/documents");
                then.status(200);
            })
            .await;

        let store = HttpChunkStore::with_endpoint(&server.base_url(), "library", None)
            .expect("store client");
        store.accept(&[]).await.expect("accept");
        mock.assert_hits(0);
    }

    #[test]
    fn document_payload_carries_required_metadata() {
        let chunk = sample_chunk();
        let document = build_document(&chunk, "2025-01-01T00:00:00Z");
        assert_eq!(document["text"], "A passage of retrievable text.");
        let metadata = &document["metadata"];
        assert_eq!(metadata["source_title"], "Sample Source");
        assert_eq!(metadata["page_number"], 3);
        assert_eq!(metadata["chunk_index"], 1);
        assert_eq!(metadata["extraction_strategy"], "lopdf");
        assert_eq!(metadata["chunk_id"], chunk.id.as_str());
        assert_eq!(metadata["ingested_at"], "2025-01-01T00:00:00Z");
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(
            normalize_base_url("http://localhost:9000/").expect("url"),
            "http://localhost:9000/"
        );
        assert!(normalize_base_url("not a url").is_err());
    }
}
