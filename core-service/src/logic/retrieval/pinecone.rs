//! Pinecone API Client
//!
//! Data-plane calls against one index host: upsert, query, stats.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::vector_store::{KnowledgeDocument, VectorMatch, VectorStore};
use crate::error::RetrievalError;

/// Pinecone index configuration
#[derive(Debug, Clone)]
pub struct PineconeConfig {
    pub index_host: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Pinecone index client
pub struct PineconeIndex {
    config: PineconeConfig,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: DocumentMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct DocumentMetadata<'a> {
    text: &'a str,
    source: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct IndexStatsResponse {
    dimension: Option<usize>,
}

impl PineconeIndex {
    pub fn new(config: PineconeConfig) -> Result<Self, RetrievalError> {
        if config.index_host.is_empty() || config.api_key.is_empty() {
            return Err(RetrievalError::NotConfigured("PINECONE_INDEX_HOST / PINECONE_API_KEY"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.index_host.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, RetrievalError> {
        let response = self.http_client
            .post(self.url(path))
            .header("Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            log::error!("Pinecone {} failed ({}): {}", path, status, error_text);
            Err(RetrievalError::Server(status))
        }
    }
}

#[async_trait]
impl VectorStore for PineconeIndex {
    async fn upsert(&self, documents: Vec<KnowledgeDocument>) -> Result<(), RetrievalError> {
        let request = UpsertRequest {
            vectors: documents
                .iter()
                .map(|d| UpsertVector {
                    id: &d.id,
                    values: &d.embedding,
                    metadata: DocumentMetadata { text: &d.text, source: &d.source },
                })
                .collect(),
        };

        self.post("vectors/upsert", &request).await?;
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<VectorMatch>, RetrievalError> {
        let request = QueryRequest {
            vector: embedding,
            top_k,
            include_metadata: true,
        };

        let result: QueryResponse = self.post("query", &request).await?
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        Ok(result.matches.into_iter().map(|m| {
            let field = |name: &str| {
                m.metadata.as_ref()
                    .and_then(|meta| meta.get(name))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            };
            VectorMatch {
                text: field("text"),
                source: field("source"),
                id: m.id.clone(),
                score: m.score,
            }
        }).collect())
    }

    async fn dimension(&self) -> Result<Option<usize>, RetrievalError> {
        let stats: IndexStatsResponse = self.post("describe_index_stats", &serde_json::json!({}))
            .await?
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;
        Ok(stats.dimension)
    }
}
