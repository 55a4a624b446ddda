//! OpenAI API Client
//!
//! Embeddings and chat completions over the REST API. Any
//! OpenAI-compatible endpoint works via `base_url`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{GenerationError, RetrievalError};
use crate::logic::explain::{ChatModel, ChatRequest};
use crate::logic::retrieval::EmbeddingClient;

/// OpenAI client configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub embed_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

/// OpenAI API client
pub struct OpenAiClient {
    config: OpenAiConfig,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, RetrievalError> {
        if config.api_key.is_empty() {
            return Err(RetrievalError::NotConfigured("OPENAI_API_KEY"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body; non-2xx becomes `Err((status, body))`
    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Result<reqwest::Response, (u16, String)>, reqwest::Error> {
        let response = self.http_client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(Ok(response))
        } else {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            log::error!("OpenAI {} failed ({}): {}", path, status, error_text);
            Ok(Err((status, error_text)))
        }
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let request = EmbeddingRequest {
            model: &self.config.embed_model,
            input: text,
        };

        let response = self.post("embeddings", &request)
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?
            .map_err(|(status, _)| RetrievalError::Server(status))?;

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Parse(e.to_string()))?;

        result.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RetrievalError::Parse("no embedding in response".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let body = ChatCompletionRequest {
            model: &self.config.chat_model,
            temperature: request.temperature,
            messages: [
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.user },
            ],
        };

        let response = self.post("chat/completions", &body)
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?
            .map_err(|(status, text)| GenerationError::Request(format!("{}: {}", status, text)))?;

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Request(format!("invalid response: {}", e)))?;

        result.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
