//! Seed the knowledge corpus
//!
//! Usage: `ingest-documents [DIR]` (default `rag_ingest/documents`).
//! Every `.txt` file becomes one document, tagged with its file name.

use std::path::PathBuf;
use std::sync::Arc;

use fraud_rag_core::config::PipelineConfig;
use fraud_rag_core::logic::openai::{OpenAiClient, OpenAiConfig};
use fraud_rag_core::logic::retrieval::{KnowledgeBase, PineconeConfig, PineconeIndex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("rag_ingest/documents"));

    let config = PipelineConfig::from_env();

    let embedder = Arc::new(OpenAiClient::new(OpenAiConfig {
        base_url: config.openai_base_url.clone(),
        api_key: config.openai_api_key.clone(),
        embed_model: config.embed_model.clone(),
        chat_model: config.chat_model.clone(),
        timeout: config.http_timeout,
    })?);
    let index = Arc::new(PineconeIndex::new(PineconeConfig {
        index_host: config.pinecone_index_host.clone(),
        api_key: config.pinecone_api_key.clone(),
        timeout: config.http_timeout,
    })?);

    let corpus = KnowledgeBase::connect(embedder, index, config.vector_dimension).await;
    let count = corpus.ingest_directory(&dir).await?;

    log::info!("Upserted {} documents from {}", count, dir.display());
    Ok(())
}
