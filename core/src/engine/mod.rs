//! Answer engine seam: the only place the core talks to a generative backend.
//!
//! Cancellation is by drop. When the batch deadline fires the orchestrator
//! drops the in-flight future, which aborts the underlying request.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Incremental answer: text deltas in arrival order, possibly ending with an error.
pub type ChunkStream = BoxStream<'static, Result<String, EngineError>>;

/// Backend-side capabilities passed through opaquely with a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    WebSearch,
    UrlContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRequest {
    pub prompt: String,
    pub system_instruction: String,
    pub tools: Vec<ToolCapability>,
    /// Effort knob forwarded to the backend as-is.
    pub thinking_budget: Option<u32>,
}

#[async_trait]
pub trait AnswerEngine: Send + Sync {
    fn name(&self) -> &str;

    /// One-shot generation. An `Ok` with empty text is a valid, if useless, answer.
    async fn generate(&self, request: &AnswerRequest) -> Result<String, EngineError>;

    /// Incremental generation. The returned stream is finite and not restartable.
    async fn generate_stream(&self, request: &AnswerRequest) -> Result<ChunkStream, EngineError>;
}
