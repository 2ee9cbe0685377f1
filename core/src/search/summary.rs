use super::executor::QueryExecutor;
use super::retry::{AttemptFailure, AttemptOutput};
use super::SUMMARY_FAILED;
use crate::error::SummaryError;

impl QueryExecutor {
    /// Short summary of a finished answer, same retry policy as the search.
    pub async fn summarize(&self, query: &str, answer: &str) -> Result<String, SummaryError> {
        let request = self.summary_request(query, answer);
        let engine = self.engine();
        let request = &request;

        let result = self
            .retry_policy()
            .run(
                move |_| async move {
                    match engine.generate(request).await {
                        Ok(text) => AttemptOutput::completed(text),
                        Err(e) => AttemptOutput::errored(String::new(), e),
                    }
                },
                |attempt, _| {
                    tracing::debug!(target: "gsearch.search", query, attempt, "retrying summary request");
                },
            )
            .await;

        match result.failure() {
            None => Ok(result.output.text),
            Some(AttemptFailure::Errored) => match result.into_error() {
                Some(e) => Err(SummaryError::Engine(e)),
                None => Err(SummaryError::Empty),
            },
            Some(AttemptFailure::Empty) => Err(SummaryError::Empty),
        }
    }

    /// Never fails: a summary error degrades to the sentinel text.
    pub async fn summarize_or_sentinel(&self, query: &str, answer: &str) -> String {
        match self.summarize(query, answer).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(target: "gsearch.search", query, error = %e, "summary generation failed");
                SUMMARY_FAILED.to_string()
            }
        }
    }
}
