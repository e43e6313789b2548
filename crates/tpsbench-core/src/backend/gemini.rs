//! Hosted Gemini backend via the Generative Language API v1beta.

use super::{Generation, GenerationBackend};
use crate::error::{BenchError, BenchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default benchmark prompt for this backend.
pub const DEFAULT_PROMPT: &str = "Tell me a bedtime story with at least 2000 words";

/// Gemini backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key.
    pub api_key: String,
    /// Base URL (default: https://generativelanguage.googleapis.com)
    pub base_url: String,
    /// Model id, e.g. gemini-1.5-flash.
    pub model: String,
    /// Max output tokens per generation.
    pub max_output_tokens: u32,
    /// Request timeout in seconds; `None` lets slow generations run to
    /// completion.
    pub timeout_secs: Option<u64>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 1000,
            timeout_secs: None,
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Read configuration from `GEMINI_API_KEY`, `GEMINI_MODEL` and
    /// `GEMINI_BASE_URL`.
    pub fn from_env() -> Self {
        let mut cfg = Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            ..Default::default()
        };

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            cfg.model = model;
        }
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            cfg.base_url = base_url;
        }
        cfg
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// Gemini backend. Reports native completion token counts from the
/// response usage metadata.
#[derive(Debug)]
pub struct GeminiBackend {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn from_env() -> BenchResult<Self> {
        Self::with_config(GeminiConfig::from_env())
    }

    pub fn with_config(config: GeminiConfig) -> BenchResult<Self> {
        if config.api_key.is_empty() {
            return Err(BenchError::Config("GEMINI_API_KEY is not set".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| BenchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "candidatesTokenCount")]
    candidates_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage: Option<GeminiUsage>,
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> BenchResult<Generation> {
        let body = serde_json::json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
            }
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(BenchError::from_reqwest)?;

        let status = resp.status();
        let text = resp.text().await.map_err(BenchError::from_reqwest)?;

        if !status.is_success() {
            return Err(BenchError::Api {
                status: Some(status.as_u16()),
                message: text,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| BenchError::Api {
            status: None,
            message: format!("unparseable response body: {e}"),
        })?;

        let generated = parsed
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .unwrap_or_default();

        let completion_tokens = parsed.usage.map(|u| u64::from(u.candidates_tokens));

        debug!(
            tokens = ?completion_tokens,
            chars = generated.len(),
            "gemini generation complete"
        );

        Ok(Generation {
            text: generated,
            completion_tokens,
        })
    }
}
