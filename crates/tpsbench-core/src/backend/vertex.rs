//! Self-managed Vertex AI endpoint backend.
//!
//! Talks to a deployed model endpoint through the `:predict` surface with
//! one instance per request, so a batch of N concurrent requests really is
//! N independent calls. The endpoint returns raw text and no usage
//! metadata; token counts come from the fallback tokenizer.

use super::{Generation, GenerationBackend};
use crate::error::{BenchError, BenchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default benchmark prompt for this backend.
pub const DEFAULT_PROMPT: &str = "Write me a very long story with at least 10000 words";

/// Vertex endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexEndpointConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Deployed endpoint id.
    pub endpoint_id: String,
    /// Endpoint region, e.g. us-central1.
    pub region: String,
    /// OAuth bearer token for the prediction calls.
    pub access_token: String,
    /// Base URL override, mainly for tests. The regional aiplatform host
    /// is derived from `region` when unset.
    pub base_url: Option<String>,
    /// Max tokens per generation.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds; `None` lets slow generations run to
    /// completion.
    pub timeout_secs: Option<u64>,
}

impl Default for VertexEndpointConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            endpoint_id: String::new(),
            region: String::new(),
            access_token: String::new(),
            base_url: None,
            max_tokens: 1000,
            temperature: 0.0,
            timeout_secs: None,
        }
    }
}

impl VertexEndpointConfig {
    /// Read configuration from `PROJECT_ID`, `ENDPOINT_ID`, `REGION`,
    /// `VERTEX_ACCESS_TOKEN` and `VERTEX_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            project_id: std::env::var("PROJECT_ID").unwrap_or_default(),
            endpoint_id: std::env::var("ENDPOINT_ID").unwrap_or_default(),
            region: std::env::var("REGION").unwrap_or_default(),
            access_token: std::env::var("VERTEX_ACCESS_TOKEN").unwrap_or_default(),
            base_url: std::env::var("VERTEX_BASE_URL").ok(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn predict_url(&self) -> String {
        let host = match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.region),
        };
        format!(
            "{}/v1/projects/{}/locations/{}/endpoints/{}:predict",
            host, self.project_id, self.region, self.endpoint_id
        )
    }
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<String>,
}

/// Vertex endpoint backend. Returns raw generated text without native
/// token counts.
#[derive(Debug)]
pub struct VertexEndpointBackend {
    client: reqwest::Client,
    config: VertexEndpointConfig,
}

impl VertexEndpointBackend {
    pub fn from_env() -> BenchResult<Self> {
        Self::with_config(VertexEndpointConfig::from_env())
    }

    pub fn with_config(config: VertexEndpointConfig) -> BenchResult<Self> {
        for (value, var) in [
            (&config.project_id, "PROJECT_ID"),
            (&config.endpoint_id, "ENDPOINT_ID"),
            (&config.region, "REGION"),
            (&config.access_token, "VERTEX_ACCESS_TOKEN"),
        ] {
            if value.is_empty() {
                return Err(BenchError::Config(format!("{var} is not set")));
            }
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

#[async_trait]
impl GenerationBackend for VertexEndpointBackend {
    fn name(&self) -> &str {
        "vertex"
    }

    async fn generate(&self, prompt: &str) -> BenchResult<Generation> {
        let body = PredictRequest {
            instances: vec![PredictInstance {
                prompt,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            }],
        };

        let resp = self
            .client
            .post(self.config.predict_url())
            .bearer_auth(&self.config.access_token)
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

        let parsed: PredictResponse = serde_json::from_str(&text).map_err(|e| BenchError::Api {
            status: None,
            message: format!("unparseable response body: {e}"),
        })?;

        let generated = parsed
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::Api {
                status: None,
                message: "response contained no predictions".to_string(),
            })?;

        debug!(chars = generated.len(), "vertex generation complete");

        Ok(Generation {
            text: generated,
            completion_tokens: None,
        })
    }
}
