//! Generation backends under measurement.
//!
//! Every backend exposes the same narrow surface: one prompt in, one
//! completion out. Timing and throughput bookkeeping live with the
//! caller, so a backend implementation only has to issue its request.

mod gemini;
mod mock;
mod vertex;

pub use gemini::{DEFAULT_PROMPT as GEMINI_DEFAULT_PROMPT, GeminiBackend, GeminiConfig};
pub use mock::{MockBackend, MockBackendConfig};
pub use vertex::{
    DEFAULT_PROMPT as VERTEX_DEFAULT_PROMPT, VertexEndpointBackend, VertexEndpointConfig,
};

use crate::error::BenchResult;
use async_trait::async_trait;

/// A single generated completion.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The generated text.
    pub text: String,
    /// Completion token count as reported by the backend. `None` when the
    /// backend does not report usage; the caller then falls back to a
    /// [`TokenCounter`](crate::tokens::TokenCounter).
    pub completion_tokens: Option<u64>,
}

/// A text-generation backend.
///
/// Implementations are invoked once per concurrent request and must be
/// safe to call from many requests in flight at once.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logs and reports.
    fn name(&self) -> &str;

    /// Generate one completion for `prompt`.
    async fn generate(&self, prompt: &str) -> BenchResult<Generation>;
}
