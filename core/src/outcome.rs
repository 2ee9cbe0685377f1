//! Outcome records produced by the executors and the batch orchestrator.
//!
//! Both records are built once by their owner and handed to the renderer
//! read-only. Field names on the wire follow the JSON output of the CLI.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Result of one query.
///
/// Either `success` is true and `answer_text` is non-empty, or `success` is
/// false and `failure_reason` is set with an empty `answer_text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub query: String,

    #[serde(rename = "response")]
    pub answer_text: String,

    #[serde(rename = "summary", skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<String>,

    pub success: bool,

    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Executor wall-clock time, retry delay included, summarization excluded.
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,

    #[serde(rename = "timestamp")]
    pub started_at: DateTime<Utc>,
}

impl QueryOutcome {
    pub fn succeeded(
        query: impl Into<String>,
        answer_text: impl Into<String>,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        let answer_text = answer_text.into();
        debug_assert!(!answer_text.is_empty(), "successful outcome needs an answer");
        Self {
            query: query.into(),
            answer_text,
            summary_text: None,
            success: true,
            failure_reason: None,
            elapsed,
            started_at,
        }
    }

    pub fn failed(
        query: impl Into<String>,
        reason: impl Into<String>,
        elapsed: Duration,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            query: query.into(),
            answer_text: String::new(),
            summary_text: None,
            success: false,
            failure_reason: Some(reason.into()),
            elapsed,
            started_at,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary_text = Some(summary.into());
        self
    }

    /// Failure reason, or an empty string for successful outcomes.
    pub fn reason(&self) -> &str {
        self.failure_reason.as_deref().unwrap_or("")
    }
}

/// Result of a multi-query run, index-aligned with the input queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    #[serde(rename = "results")]
    pub outcomes: Vec<QueryOutcome>,

    #[serde(rename = "total_time_ms", serialize_with = "serialize_millis")]
    pub total_elapsed: Duration,

    #[serde(rename = "success")]
    pub all_succeeded: bool,

    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub failure_summary: Option<String>,
}

impl BatchOutcome {
    pub fn new(outcomes: Vec<QueryOutcome>, total_elapsed: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let all_succeeded = succeeded == outcomes.len();
        let failure_summary = (!all_succeeded).then(|| {
            format!(
                "Completed {}/{} queries successfully",
                succeeded,
                outcomes.len()
            )
        });
        Self {
            outcomes,
            total_elapsed,
            all_succeeded,
            failure_summary,
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
