// src/util/rag.rs
//! Client for the remote retrieval-augmented-generation endpoint.
//!
//! One POST per user query. The request carries the accumulated chat history
//! and the fixed model/retriever configuration; the response is read as a
//! single JSON body even though `stream: true` is sent.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::document::Document;
use crate::chat::message::{Message, MessageRole};
use crate::error::{AssistantError, Result};
use crate::util::config::RagConfig;
use crate::log_debug;

/// Shown in place of an answer whenever the request fails
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub docs: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagRequest {
    pub query: String,
    pub chat_history: Vec<String>,
    pub collection_name: String,
    pub model_configuration: ModelConfiguration,
    pub prompt_template: String,
    pub retriever_config: RetrieverPayload,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfiguration {
    pub name: String,
    pub parameters: ModelParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParameters {
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrieverPayload {
    pub compressor_model_name: String,
    pub top_k: u32,
    pub search_type: String,
    pub search_kwargs: SearchKwargs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchKwargs {
    pub k: u32,
}

/// Anything that can answer a query with supporting documents.
#[async_trait]
pub trait RagBackend: Send + Sync + std::fmt::Debug {
    /// `chat_history` holds the prior turns, oldest first, without the greeting seed.
    async fn answer(&self, query: &str, chat_history: &[String]) -> Result<RagResponse>;
}

/// One history line per prior message. Empty assistant placeholders are skipped.
pub fn format_chat_history(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter(|msg| !msg.content.is_empty())
        .map(|msg| match msg.role {
            MessageRole::User => format!("User: {}", msg.content),
            MessageRole::Assistant => format!("Assistant: {}", msg.content),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RagClient {
    client: reqwest::Client,
    config: RagConfig,
}

impl RagClient {
    pub fn new(config: RagConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn build_request(&self, query: &str, chat_history: &[String]) -> RagRequest {
        let mut history = Vec::with_capacity(chat_history.len() + 1);
        history.push(self.config.greeting.clone());
        history.extend(chat_history.iter().cloned());

        let model = &self.config.model;
        let retriever = &self.config.retriever;

        RagRequest {
            query: query.to_string(),
            chat_history: history,
            collection_name: self.config.collection_name.clone(),
            model_configuration: ModelConfiguration {
                name: model.name.clone(),
                parameters: ModelParameters {
                    temperature: model.temperature,
                    max_tokens: model.max_tokens,
                },
            },
            prompt_template: self.config.prompt_template.clone(),
            retriever_config: RetrieverPayload {
                compressor_model_name: retriever.compressor_model_name.clone(),
                top_k: retriever.top_k,
                search_type: retriever.search_type.clone(),
                search_kwargs: SearchKwargs { k: retriever.k },
            },
            stream: true,
        }
    }
}

#[async_trait]
impl RagBackend for RagClient {
    async fn answer(&self, query: &str, chat_history: &[String]) -> Result<RagResponse> {
        let payload = self.build_request(query, chat_history);
        log_debug!("POST {} ({} history lines)", self.config.endpoint, payload.chat_history.len());

        let response = self.client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssistantError::StatusError(status));
        }

        let body: RagResponse = response.json().await?;
        log_debug!("Answer received: {} chars, {} docs", body.answer.len(), body.docs.len());

        Ok(body)
    }
}
