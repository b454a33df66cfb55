// src/util/config.rs
//! Application configuration, read from a YAML file.
//!
//! Every field has a default, so a missing file or a partial file both work.
//! The file location is `$RAG_ASSISTANT_CONFIG`, falling back to `./config.yml`.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CONFIG_ENV_VAR: &str = "RAG_ASSISTANT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the sqlite database
    pub data_dir: PathBuf,
    /// Directory for the per-level log files
    pub log_dir: PathBuf,
    /// Enables debug.log output
    pub debug: bool,
    pub rag: RagConfig,
    pub stream: StreamConfig,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db"),
            log_dir: PathBuf::from("./logs"),
            debug: false,
            rag: RagConfig::default(),
            stream: StreamConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub endpoint: String,
    pub collection_name: String,
    pub model: ModelConfig,
    pub prompt_template: String,
    pub retriever: RetrieverConfig,
    /// Seed line placed at the head of every chat history
    pub greeting: String,
    /// No timeout unless set
    pub request_timeout_secs: Option<u64>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/retrievers/oma-rag/answer".to_string(),
            collection_name: "oma".to_string(),
            model: ModelConfig::default(),
            prompt_template: "Answer the question based only on the following context:\n\
                              Context: {context} \n\
                              Question: {question}"
                .to_string(),
            retriever: RetrieverConfig::default(),
            greeting: "Assistant: Hello! How can I help you today?".to_string(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "openai/gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub compressor_model_name: String,
    pub top_k: u32,
    pub search_type: String,
    pub k: u32,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            compressor_model_name: "mixedbread-ai/mxbai-rerank-xsmall-v1".to_string(),
            top_k: 5,
            search_type: "similarity".to_string(),
            k: 6,
        }
    }
}

/// Typewriter timings for the simulated stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub min_delay_ms: u64,
    /// Exclusive upper bound
    pub max_delay_ms: u64,
    /// Pause between the last word and attaching sources
    pub settle_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 30,
            max_delay_ms: 80,
            settle_delay_ms: 300,
        }
    }
}

impl StreamConfig {
    /// No delays at all; used by tests.
    pub fn instant() -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            settle_delay_ms: 0,
        }
    }
}

/// Capability flags for the conversation view and sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub show_sources: bool,
    pub show_documents: bool,
    pub sidebar_delete: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_sources: true,
            show_documents: true,
            sidebar_delete: true,
        }
    }
}

impl Config {
    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if std::env::var("DEBUG").unwrap_or_default() == "true" {
            config.debug = true;
        }

        Ok(config)
    }

    /// Load from `$RAG_ASSISTANT_CONFIG` or `./config.yml`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("assistant.db")
    }
}
