use chrono::Utc;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Duration, Instant};

use super::executor::QueryExecutor;
use super::{BATCH_DEADLINE_EXCEEDED, SUMMARY_FAILED};
use crate::config::{BatchConfig, MAX_WORKERS, MIN_WORKERS};
use crate::outcome::{BatchOutcome, QueryOutcome};

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

#[derive(Debug, Clone)]
pub struct BatchOpts {
    /// Concurrency ceiling, clamped to 1..=5.
    pub workers: usize,
    /// One deadline for the whole batch.
    pub timeout: Duration,
    pub include_summary: bool,
    pub verbose: bool,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self::from(&BatchConfig::default())
    }
}

impl From<&BatchConfig> for BatchOpts {
    fn from(cfg: &BatchConfig) -> Self {
        Self {
            workers: cfg.workers,
            timeout: Duration::from_secs(cfg.timeout_secs),
            include_summary: true,
            verbose: false,
        }
    }
}

/// Runs every query with at most `opts.workers` in flight.
///
/// Results land at their input index whatever the completion order. Queries
/// still queued or running when the deadline fires are recorded as failures.
pub async fn run_batch(
    executor: &QueryExecutor,
    queries: &[String],
    opts: &BatchOpts,
) -> BatchOutcome {
    let started = Instant::now();
    let deadline = started
        .checked_add(opts.timeout)
        .unwrap_or_else(|| started + FAR_FUTURE);
    let workers = opts.workers.clamp(MIN_WORKERS, MAX_WORKERS);
    let sem = Semaphore::new(workers);

    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();
    for (index, query) in queries.iter().enumerate() {
        let sem = &sem;
        futs.push(async move {
            let outcome = run_slot(executor, sem, query, deadline, opts.include_summary).await;
            (index, outcome)
        });
    }

    let mut slots: Vec<Option<QueryOutcome>> = vec![None; queries.len()];
    while let Some((index, outcome)) = futs.next().await {
        if opts.verbose {
            tracing::info!(
                target: "gsearch.batch",
                query = %outcome.query,
                success = outcome.success,
                duration_ms = outcome.elapsed.as_millis() as u64,
                "query completed"
            );
        }
        slots[index] = Some(outcome);
    }

    let outcomes: Vec<QueryOutcome> = slots
        .into_iter()
        .zip(queries)
        .map(|(slot, query)| {
            slot.unwrap_or_else(|| {
                QueryOutcome::failed(query, BATCH_DEADLINE_EXCEEDED, Duration::ZERO, Utc::now())
            })
        })
        .collect();

    let batch = BatchOutcome::new(outcomes, started.elapsed());
    if opts.verbose {
        tracing::info!(
            target: "gsearch.batch",
            total_queries = queries.len(),
            successful = batch.succeeded_count(),
            total_duration_ms = batch.total_elapsed.as_millis() as u64,
            "query execution completed"
        );
    }
    batch
}

async fn run_slot(
    executor: &QueryExecutor,
    sem: &Semaphore,
    query: &str,
    deadline: Instant,
    include_summary: bool,
) -> QueryOutcome {
    let started_at = Utc::now();
    let started = Instant::now();

    let searched = timeout_at(deadline, async {
        let permit = sem.acquire().await.ok()?;
        Some((permit, executor.execute(query).await))
    })
    .await;

    let (permit, outcome) = match searched {
        Ok(Some(done)) => done,
        Ok(None) | Err(_) => {
            tracing::warn!(target: "gsearch.batch", query, "batch deadline exceeded");
            return QueryOutcome::failed(query, BATCH_DEADLINE_EXCEEDED, started.elapsed(), started_at);
        }
    };

    if !(outcome.success && include_summary) {
        return outcome;
    }

    let summary = timeout_at(deadline, executor.summarize_or_sentinel(query, &outcome.answer_text))
        .await
        .unwrap_or_else(|_| SUMMARY_FAILED.to_string());
    drop(permit);
    outcome.with_summary(summary)
}
