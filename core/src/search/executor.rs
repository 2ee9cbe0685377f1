use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::time::{Duration, Instant};

use super::prompt::{search_prompt, summary_prompt};
use super::retry::{AttemptFailure, AttemptOutput, RetryPolicy, RetryResult};
use super::{EMPTY_RESPONSE, SEARCH_FAILED};
use crate::config::SearchSettings;
use crate::engine::{AnswerEngine, AnswerRequest};
use crate::outcome::QueryOutcome;

/// Runs queries against one answer engine with a fixed retry policy.
///
/// Cheap to clone; settings and engine are shared.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn AnswerEngine>,
    settings: Arc<SearchSettings>,
    retry: RetryPolicy,
    today: Option<NaiveDate>,
}

pub(super) struct FailureReasons {
    pub errored: &'static str,
    pub empty: &'static str,
}

impl QueryExecutor {
    pub fn new(engine: Arc<dyn AnswerEngine>, settings: SearchSettings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
            retry: RetryPolicy::default(),
            today: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pins the date sent as time context instead of reading the local clock.
    pub fn with_date(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub(super) fn engine(&self) -> &dyn AnswerEngine {
        self.engine.as_ref()
    }

    pub(super) fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(super) fn search_request(&self, query: &str) -> AnswerRequest {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        AnswerRequest {
            prompt: search_prompt(query, today),
            system_instruction: self.settings.system_instruction.clone(),
            tools: self.settings.tools.clone(),
            thinking_budget: Some(self.settings.thinking_budget),
        }
    }

    pub(super) fn summary_request(&self, query: &str, answer: &str) -> AnswerRequest {
        AnswerRequest {
            prompt: summary_prompt(query, answer),
            system_instruction: self.settings.summary_instruction.clone(),
            tools: Vec::new(),
            thinking_budget: Some(self.settings.thinking_budget),
        }
    }

    /// One-shot search with up to two attempts.
    pub async fn execute(&self, query: &str) -> QueryOutcome {
        let started_at = Utc::now();
        let started = Instant::now();
        let request = self.search_request(query);

        tracing::info!(target: "gsearch.search", query, "performing search");

        let engine = self.engine();
        let request = &request;
        let result = self
            .retry
            .run(
                move |_| async move {
                    match engine.generate(request).await {
                        Ok(text) => AttemptOutput::completed(text),
                        Err(e) => AttemptOutput::errored(String::new(), e),
                    }
                },
                |attempt, prev| {
                    tracing::info!(
                        target: "gsearch.search",
                        query,
                        attempt,
                        error = prev.error.as_ref().map(tracing::field::display),
                        "retrying search request"
                    );
                },
            )
            .await;

        finish(
            query,
            result,
            started.elapsed(),
            started_at,
            FailureReasons {
                errored: SEARCH_FAILED,
                empty: EMPTY_RESPONSE,
            },
        )
    }
}

pub(super) fn finish(
    query: &str,
    result: RetryResult,
    elapsed: Duration,
    started_at: DateTime<Utc>,
    reasons: FailureReasons,
) -> QueryOutcome {
    let attempts = result.attempts;
    match result.failure() {
        None => {
            if let Some(e) = &result.output.error {
                tracing::warn!(
                    target: "gsearch.search",
                    query,
                    attempts,
                    error = %e,
                    "answer interrupted on final attempt, keeping partial text"
                );
            }
            QueryOutcome::succeeded(query, result.output.text, elapsed, started_at)
        }
        Some(AttemptFailure::Errored) => {
            if let Some(e) = result.error() {
                tracing::warn!(
                    target: "gsearch.search",
                    query,
                    attempts,
                    error = %e,
                    "search failed after retries"
                );
            }
            QueryOutcome::failed(query, reasons.errored, elapsed, started_at)
        }
        Some(AttemptFailure::Empty) => {
            tracing::warn!(
                target: "gsearch.search",
                query,
                attempts,
                "received empty response after retries"
            );
            QueryOutcome::failed(query, reasons.empty, elapsed, started_at)
        }
    }
}
