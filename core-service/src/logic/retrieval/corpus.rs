//! Knowledge corpus - embedding + vector store behind one handle
//!
//! Every write and every query goes through `embed`, so all vectors get
//! the same dimension adjustment.

use std::path::Path;
use std::sync::Arc;

use super::embedding::{adjust_dimension, EmbeddingClient};
use super::vector_store::{KnowledgeDocument, VectorMatch, VectorStore};
use crate::error::RetrievalError;

pub struct KnowledgeBase {
    embedder: Arc<dyn EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    dimension: Option<usize>,
}

impl KnowledgeBase {
    /// `dimension = None` leaves embeddings at their native length
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        dimension: Option<usize>,
    ) -> Self {
        Self { embedder, store, dimension }
    }

    /// Resolve the target dimension once: explicit override first,
    /// then whatever the index reports. Unknown means no adjustment.
    pub async fn connect(
        embedder: Arc<dyn EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        dimension_override: Option<usize>,
    ) -> Self {
        let dimension = match dimension_override {
            Some(d) => Some(d),
            None => match store.dimension().await {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("Could not read vector index dimension: {}", e);
                    None
                }
            },
        };

        match dimension {
            Some(d) => log::info!("Knowledge corpus dimension: {}", d),
            None => log::warn!("Knowledge corpus dimension unknown; embeddings are not adjusted"),
        }

        Self::new(embedder, store, dimension)
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let embedding = self.embedder.embed(text).await?;
        Ok(match self.dimension {
            Some(d) => adjust_dimension(embedding, d),
            None => embedding,
        })
    }

    pub async fn search_matches(&self, text: &str, top_k: usize) -> Result<Vec<VectorMatch>, RetrievalError> {
        let embedding = self.embed(text).await?;
        self.store.query(&embedding, top_k).await
    }

    /// Texts of the `top_k` nearest documents; matches without text are skipped
    pub async fn search(&self, text: &str, top_k: usize) -> Result<Vec<String>, RetrievalError> {
        Ok(self
            .search_matches(text, top_k)
            .await?
            .into_iter()
            .filter_map(|m| m.text)
            .collect())
    }

    /// Add one document under a fresh id; returns the id
    pub async fn index(&self, text: String, source: &str) -> Result<String, RetrievalError> {
        let embedding = self.embed(&text).await?;
        let id = uuid::Uuid::new_v4().to_string();

        self.store
            .upsert(vec![KnowledgeDocument {
                id: id.clone(),
                embedding,
                text,
                source: source.to_string(),
            }])
            .await?;

        Ok(id)
    }

    /// Seed the corpus from every `.txt` file in `dir` (one document per
    /// file, `source` = file name). Returns the number of documents.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<usize, RetrievalError> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "txt") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = tokio::fs::read_to_string(&path).await?;
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            documents.push(KnowledgeDocument {
                id: uuid::Uuid::new_v4().to_string(),
                embedding: self.embed(&text).await?,
                text,
                source,
            });
        }

        let count = documents.len();
        if count > 0 {
            self.store.upsert(documents).await?;
        }
        log::info!("Ingested {} documents from {}", count, dir.display());
        Ok(count)
    }
}
