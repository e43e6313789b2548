//! Command implementations

pub mod report;
pub mod run;
pub mod single;

use std::sync::Arc;

use tpsbench_core::backend::{
    GEMINI_DEFAULT_PROMPT, GeminiBackend, GeminiConfig, GenerationBackend, VERTEX_DEFAULT_PROMPT,
    VertexEndpointBackend, VertexEndpointConfig,
};
use tpsbench_core::tokens::BpeTokenCounter;

use crate::cli::BackendKind;

/// Build the backend selected on the command line from environment
/// configuration. Missing credentials surface here, as a configuration
/// error, before any request is issued.
pub fn build_backend(
    kind: BackendKind,
    max_output_tokens: u32,
    timeout_secs: Option<u64>,
) -> anyhow::Result<Arc<dyn GenerationBackend>> {
    match kind {
        BackendKind::Gemini => {
            let mut config = GeminiConfig::from_env().with_max_output_tokens(max_output_tokens);
            if let Some(secs) = timeout_secs {
                config = config.with_timeout(secs);
            }
            Ok(Arc::new(GeminiBackend::with_config(config)?))
        }
        BackendKind::Vertex => {
            let mut config = VertexEndpointConfig::from_env().with_max_tokens(max_output_tokens);
            if let Some(secs) = timeout_secs {
                config = config.with_timeout(secs);
            }
            Ok(Arc::new(VertexEndpointBackend::with_config(config)?))
        }
    }
}

/// The standard benchmark prompt for the selected backend.
pub fn default_prompt(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Gemini => GEMINI_DEFAULT_PROMPT,
        BackendKind::Vertex => VERTEX_DEFAULT_PROMPT,
    }
}

/// Construct the fallback tokenizer used when a backend reports no usage.
pub fn build_tokenizer() -> anyhow::Result<Arc<BpeTokenCounter>> {
    Ok(Arc::new(BpeTokenCounter::cl100k_base()?))
}
