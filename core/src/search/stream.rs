use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use futures::StreamExt;
use tokio::time::Instant;

use super::executor::{finish, FailureReasons, QueryExecutor};
use super::retry::AttemptOutput;
use super::{EMPTY_STREAM_RESPONSE, STREAM_SEARCH_FAILED};
use crate::outcome::QueryOutcome;
use crate::render::TextMarkers;

impl QueryExecutor {
    /// Streaming search for a lone top-level query.
    ///
    /// Chunks are echoed to `out` as they arrive; that output is never taken
    /// back, even when the attempt is later retried.
    pub async fn execute_streaming<W>(
        &self,
        query: &str,
        out: &mut W,
        markers: &TextMarkers,
    ) -> QueryOutcome
    where
        W: Write + Send,
    {
        let started_at = Utc::now();
        let started = Instant::now();
        let request = self.search_request(query);

        tracing::info!(target: "gsearch.search", query, "performing search");

        let sink = Mutex::new(out);
        emit(&sink, &format!("\n=== {query} ===\n"));

        let engine = self.engine();
        let request = &request;
        let sink_ref = &sink;
        let result = self
            .retry_policy()
            .run(
                move |_| async move {
                    let mut chunks = match engine.generate_stream(request).await {
                        Ok(s) => s,
                        Err(e) => return AttemptOutput::errored(String::new(), e),
                    };
                    let mut text = String::new();
                    while let Some(item) = chunks.next().await {
                        match item {
                            Ok(chunk) => {
                                emit(sink_ref, &chunk);
                                text.push_str(&chunk);
                            }
                            Err(e) => return AttemptOutput::errored(text, e),
                        }
                    }
                    AttemptOutput::completed(text)
                },
                |attempt, prev| {
                    tracing::info!(
                        target: "gsearch.search",
                        query,
                        attempt,
                        error = prev.error.as_ref().map(tracing::field::display),
                        "retrying stream search request"
                    );
                    emit(sink_ref, &format!("\n{}\n", markers.retry));
                },
            )
            .await;

        emit(&sink, &format!("\n{}\n", markers.rule));

        finish(
            query,
            result,
            started.elapsed(),
            started_at,
            FailureReasons {
                errored: STREAM_SEARCH_FAILED,
                empty: EMPTY_STREAM_RESPONSE,
            },
        )
    }
}

fn emit<W: Write>(sink: &Mutex<&mut W>, s: &str) {
    let mut w = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(e) = w.write_all(s.as_bytes()).and_then(|_| w.flush()) {
        tracing::debug!(target: "gsearch.search", error = %e, "live output write failed");
    }
}
