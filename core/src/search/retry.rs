//! Fixed-delay retry shared by the one-shot, streaming and summary calls.

use std::future::Future;

use tokio::time::Duration;

use crate::error::EngineError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// What one attempt produced.
///
/// `text` is whatever was accumulated, even when the attempt errored part way.
#[derive(Debug, Default)]
pub struct AttemptOutput {
    pub text: String,
    pub complete: bool,
    pub error: Option<EngineError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    Errored,
    Empty,
}

impl AttemptOutput {
    pub fn completed(text: String) -> Self {
        Self {
            text,
            complete: true,
            error: None,
        }
    }

    pub fn errored(partial: String, error: EngineError) -> Self {
        Self {
            text: partial,
            complete: false,
            error: Some(error),
        }
    }

    /// Non-empty text from an attempt that finished without error.
    pub fn is_clean(&self) -> bool {
        !self.text.is_empty() && self.error.is_none()
    }

    /// Any accumulated text; only the final attempt is judged this way.
    pub fn is_usable(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn failure(&self) -> Option<AttemptFailure> {
        if self.is_usable() {
            None
        } else if self.error.is_some() {
            Some(AttemptFailure::Errored)
        } else {
            Some(AttemptFailure::Empty)
        }
    }
}

#[derive(Debug)]
pub struct RetryResult {
    /// Output of the last attempt made.
    pub output: AttemptOutput,
    pub attempts: u32,
    /// Most recent error from an earlier attempt.
    pub earlier_error: Option<EngineError>,
}

impl RetryResult {
    /// An error from any attempt marks an empty result as errored.
    pub fn failure(&self) -> Option<AttemptFailure> {
        if self.output.is_usable() {
            None
        } else if self.error().is_some() {
            Some(AttemptFailure::Errored)
        } else {
            Some(AttemptFailure::Empty)
        }
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.output.error.as_ref().or(self.earlier_error.as_ref())
    }

    pub fn into_error(self) -> Option<EngineError> {
        self.output.error.or(self.earlier_error)
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Runs `attempt` until one finishes cleanly with text or attempts run out.
    ///
    /// An attempt that errors after producing text is retried; only the final
    /// attempt keeps such partial text. `on_retry` fires with the upcoming
    /// attempt number before the delay.
    pub async fn run<F, Fut, R>(&self, mut attempt: F, mut on_retry: R) -> RetryResult
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutput>,
        R: FnMut(u32, &AttemptOutput),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut n = 1;
        let mut earlier_error = None;
        loop {
            let output = attempt(n).await;
            if output.is_clean() || n >= max_attempts {
                return RetryResult {
                    output,
                    attempts: n,
                    earlier_error,
                };
            }
            n += 1;
            on_retry(n, &output);
            if let Some(e) = output.error {
                earlier_error = Some(e);
            }
            tokio::time::sleep(self.delay).await;
        }
    }
}
