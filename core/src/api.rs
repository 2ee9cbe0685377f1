//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `gsearch_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from, parse_duration, AppConfig, BackendConfig, BatchConfig, SearchConfig,
    SearchSettings, MAX_WORKERS, MIN_WORKERS,
};
pub use crate::engine::{AnswerEngine, AnswerRequest, ChunkStream, ToolCapability};
pub use crate::error::{CliError, ConfigError, EngineError, SummaryError};
pub use crate::outcome::{BatchOutcome, QueryOutcome};
pub use crate::render::{
    render_batch, render_outcome, render_stream_tail, OutputFormat, RenderOpts, Rendered,
    TextMarkers,
};
pub use crate::search::{run_batch, BatchOpts, QueryExecutor, RetryPolicy, SUMMARY_FAILED};
