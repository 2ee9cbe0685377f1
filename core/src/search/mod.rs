//! Query execution: retrying and streaming executors, summarizer, batch orchestrator.

mod batch;
mod executor;
mod prompt;
mod retry;
mod stream;
mod summary;

pub use batch::{run_batch, BatchOpts};
pub use executor::QueryExecutor;
pub use prompt::{search_prompt, summary_prompt};
pub use retry::{
    AttemptFailure, AttemptOutput, RetryPolicy, RetryResult, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY,
};

pub const SEARCH_FAILED: &str = "Search failed";
pub const EMPTY_RESPONSE: &str = "Empty response";
pub const STREAM_SEARCH_FAILED: &str = "Stream search failed";
pub const EMPTY_STREAM_RESPONSE: &str = "Empty stream response";
pub const BATCH_DEADLINE_EXCEEDED: &str = "Search cancelled: batch deadline exceeded";

/// Degraded summary used whenever summarization fails.
pub const SUMMARY_FAILED: &str = "Summary generation failed";
